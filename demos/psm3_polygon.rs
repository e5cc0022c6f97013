use std::time::Duration;

use anyhow::Result;
use nsrdb::{ApiResponse, Client, DataRequest, QueryLocation};

fn main() -> Result<()> {
    env_logger::init();

    let client = Client::new()?;

    // Ring must be closed: the first and last coordinates are the same.
    let ring = [
        (-93.1968498, 44.6402006),
        (-93.1961632, 44.639712),
        (-93.1939316, 44.6086792),
        (-93.1202888, 44.6084348),
        (-93.1202888, 44.6411777),
        (-93.1968498, 44.6402006),
    ];
    let location = QueryLocation::polygon(&ring)?;

    let request = DataRequest::new(location)
        .with_names(2019)
        .with_timeout(Duration::from_secs(300))
        .with_output_dir("./downloads");

    match client.psm3(&request)? {
        ApiResponse::Table(table) => println!(
            "combined {} rows from {} files",
            table.num_rows(),
            table.metadata.len()
        ),
        ApiResponse::Pending(reply) => {
            println!("still generating, re-poll later: {reply}")
        }
        other => eprintln!("{:?}", other.error_messages()),
    }
    Ok(())
}
