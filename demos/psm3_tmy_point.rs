use anyhow::Result;
use nsrdb::{ApiResponse, Client, DataRequest};

fn main() -> Result<()> {
    env_logger::init();

    // Example program that calls the library API.
    // Put your API key in an `.nsrdbrc` file or pass it via CredentialOverrides.
    let client = Client::new()?;

    let request = DataRequest::new((-93.1567288182409, 45.15793882400205))
        .with_names("tmy-2020")
        .with_attributes(["ghi", "dni", "dhi", "air_temperature"]);

    match client.psm3_tmy(&request)? {
        ApiResponse::Table(table) => {
            println!(
                "received {} rows x {} columns",
                table.num_rows(),
                table.columns.len()
            );
            for (source, meta) in &table.metadata {
                println!("{source}: location {:?}", meta.get("Location ID"));
            }
        }
        other => eprintln!("request not resolved: {:?}", other.error_messages()),
    }
    Ok(())
}
