//! Persists request outcomes into a caller-supplied output location.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::client::ApiResponse;
use crate::error::Error;
use crate::table::DataTable;
use crate::util::filename_from_url;

/// Writes the outcome under `out` (a directory, or a file path to use as-is).
///
/// Tables save as CSV; pending submissions and structured server rejections
/// save as JSON so the payload (and its embedded download URL) survives for a
/// later re-poll. Raw auth-error text is not persisted.
pub(crate) fn save_response(response: &ApiResponse, out: &Path) -> Result<Option<PathBuf>, Error> {
    match response {
        ApiResponse::Table(table) => save_table(table, out).map(Some),
        ApiResponse::Pending(reply) | ApiResponse::ParameterError(reply) => {
            save_reply(reply, out).map(Some)
        }
        ApiResponse::AuthError(_) => {
            log::warn!("not saving auth-error response text");
            Ok(None)
        }
    }
}

fn save_table(table: &DataTable, out: &Path) -> Result<PathBuf, Error> {
    let path = if out.is_dir() {
        out.join(table_filename(table))
    } else {
        out.to_path_buf()
    };

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
    if table.metadata.len() == 1 {
        if let Some(meta) = table.metadata.values().next() {
            // Reconstruct the structure as received: metadata keys, metadata
            // values, column names, data.
            writer.write_record(meta.keys())?;
            writer.write_record(meta.values())?;
        }
    }
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    if table.metadata.len() > 1 {
        // A combined CSV has no slot for several preambles; the per-source
        // metadata goes into a sidecar instead.
        let sidecar = path.with_extension("metadata.json");
        let mut file = File::create(&sidecar)?;
        file.write_all(serde_json::to_string_pretty(&table.metadata)?.as_bytes())?;
    }

    Ok(path)
}

fn table_filename(table: &DataTable) -> String {
    if table.metadata.is_empty() {
        return "nsrdb_data.csv".to_string();
    }
    let stems: Vec<&str> = table
        .metadata
        .keys()
        .take(3)
        .map(|name| name.strip_suffix(".csv").unwrap_or(name))
        .collect();
    format!("{}.csv", stems.join("_"))
}

fn save_reply(reply: &Value, out: &Path) -> Result<PathBuf, Error> {
    let id = reply
        .pointer("/outputs/downloadUrl")
        .and_then(Value::as_str)
        .and_then(filename_from_url)
        .map(|name| match name.strip_suffix(".zip") {
            Some(stem) => stem.to_string(),
            None => name,
        })
        .unwrap_or_else(|| digest_id(reply));

    let path = if out.is_dir() {
        out.join(format!("NSRDB_request_{id}.json"))
    } else {
        out.to_path_buf()
    };

    let mut file = File::create(&path)?;
    file.write_all(serde_json::to_string_pretty(reply)?.as_bytes())?;
    Ok(path)
}

fn digest_id(reply: &Value) -> String {
    // serde_json renders object keys in sorted order, so the digest is stable
    // for equal payloads.
    let digest = Sha256::digest(reply.to_string().as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_table(sources: &[&str]) -> DataTable {
        let mut table = DataTable {
            columns: vec!["Year".into(), "GHI".into()],
            rows: vec![
                vec!["2020".into(), "0".into()],
                vec!["2020".into(), "12".into()],
            ],
            metadata: Default::default(),
        };
        for source in sources {
            let mut meta = crate::table::SourceMetadata::new();
            meta.insert("Location ID".into(), "145809".into());
            meta.insert("Elevation".into(), "280".into());
            table.metadata.insert(source.to_string(), meta);
        }
        table
    }

    #[test]
    fn single_source_table_keeps_received_structure() {
        let dir = tempdir().unwrap();
        let path = save_table(&sample_table(&["station.csv"]), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "station.csv");
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Elevation,Location ID");
        assert_eq!(lines[1], "280,145809");
        assert_eq!(lines[2], "Year,GHI");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn multi_source_table_writes_metadata_sidecar() {
        let dir = tempdir().unwrap();
        let path = save_table(&sample_table(&["p1.csv", "p2.csv"]), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "p1_p2.csv");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Year,GHI\n"));

        let sidecar = path.with_extension("metadata.json");
        let meta: Value =
            serde_json::from_str(&std::fs::read_to_string(&sidecar).unwrap()).unwrap();
        assert!(meta.get("p1.csv").is_some());
        assert!(meta.get("p2.csv").is_some());
    }

    #[test]
    fn pending_reply_is_named_after_the_download_url() {
        let dir = tempdir().unwrap();
        let reply = json!({"outputs": {"downloadUrl": "https://host/files/req42.zip"}});
        let path = save_reply(&reply, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "NSRDB_request_req42.json");
        let read_back: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read_back, reply);
    }

    #[test]
    fn reply_without_url_gets_a_digest_name() {
        let dir = tempdir().unwrap();
        let reply = json!({"errors": ["required 'names' is missing"]});
        let path = save_reply(&reply, dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("NSRDB_request_"));
        assert!(name.ends_with(".json"));
        // Same payload, same name.
        assert_eq!(path, save_reply(&reply, dir.path()).unwrap());
    }

    #[test]
    fn auth_error_text_is_not_saved() {
        let dir = tempdir().unwrap();
        let saved = save_response(
            &ApiResponse::AuthError("API_KEY_INVALID".to_string()),
            dir.path(),
        )
        .unwrap();
        assert!(saved.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
