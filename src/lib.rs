//! A Rust client for the NREL National Solar Radiation Database (NSRDB) API.
//!
//! This crate implements the NSRDB request flow: assemble a geographic query,
//! pick the right endpoint for its shape, and either download the CSV result
//! directly (single point, single dataset name) or submit a file-generation
//! job, poll its download URL, and merge the resulting archive of CSVs into
//! one table.
//!
//! ## Quick start
//! - Put your API key in an `.nsrdbrc` file (`api_key=...`, searched for in
//!   the working directory and your home directory, or pointed at with the
//!   `NSRDB_RC` environment variable), or pass it per request.
//! - Call one of the dataset methods on [`Client`] with a [`DataRequest`].
//!
//! ```no_run
//! use nsrdb::{ApiResponse, Client, DataRequest};
//!
//! fn main() -> Result<(), nsrdb::Error> {
//!     let client = Client::new()?;
//!     let request = DataRequest::new((-93.1567288182409, 45.15793882400205))
//!         .with_names("tmy-2020")
//!         .with_attributes(["ghi", "dni", "air_temperature"]);
//!     match client.psm3_tmy(&request)? {
//!         ApiResponse::Table(table) => println!("{} rows", table.num_rows()),
//!         other => eprintln!("not resolved: {:?}", other.error_messages()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors vs. rejected requests
//! Problems the client can detect locally — unresolvable credentials, a
//! location that cannot be expressed as WKT — are returned as [`Error`].
//! Requests the **server** rejects are not errors here: they resolve to
//! [`ApiResponse::ParameterError`] (structured JSON) or
//! [`ApiResponse::AuthError`] (raw text), and a deferred job that has not
//! finished within the timeout resolves to [`ApiResponse::Pending`] carrying
//! the submission payload for a later [`Client::poll_download`]. Callers
//! running many queries match on the variant instead of catching errors.

#![forbid(unsafe_code)]

mod client;
mod config;
mod dataset;
mod error;
mod output;
mod params;
mod poll;
mod table;
mod util;

pub use client::{ApiResponse, Client, DataRequest};
pub use config::CredentialOverrides;
pub use dataset::Dataset;
pub use error::Error;
pub use params::{ListParam, QueryLocation};
pub use table::{DataTable, SourceMetadata};
