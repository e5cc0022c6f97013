use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;

use crate::error::Error;
use crate::table::{self, DataTable};
use crate::util::{filename_from_url, is_zip_payload};

/// Submission receipt for a deferred (file-generation) request.
#[derive(Debug, serde::Deserialize)]
struct SubmissionReply {
    #[serde(default)]
    outputs: Option<SubmissionOutputs>,
}

#[derive(Debug, serde::Deserialize)]
struct SubmissionOutputs {
    #[serde(default, alias = "downloadUrl")]
    download_url: Option<String>,
}

/// Extracts `outputs.downloadUrl` from a submission payload.
pub(crate) fn download_url(submission: &Value) -> Option<String> {
    let reply: SubmissionReply = serde_json::from_value(submission.clone()).ok()?;
    reply.outputs?.download_url.filter(|url| !url.is_empty())
}

/// One poll attempt: fetch the generated file and unpack it into a table.
///
/// Any failure here — the archive not existing yet (404), a connection error,
/// a half-written archive — means "not ready"; the caller decides whether to
/// keep waiting.
pub(crate) fn fetch_generated_file(http: &HttpClient, url: &str) -> Result<DataTable, Error> {
    let response = http.get(url).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    if is_zip_payload(&bytes) {
        table::from_zip(&bytes)
    } else {
        let identifier = filename_from_url(url).unwrap_or_else(|| "download.csv".to_string());
        table::from_single_csv(&identifier, &bytes)
    }
}

pub(crate) fn generation_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]").unwrap());
    pb.set_message("waiting for NSRDB file generation");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn download_url_extracted_from_outputs() {
        let submission = json!({
            "outputs": {"downloadUrl": "https://host/files/out.zip"},
            "inputs": {"wkt": "POINT(-90 45)"}
        });
        assert_eq!(
            download_url(&submission).as_deref(),
            Some("https://host/files/out.zip")
        );
    }

    #[test]
    fn missing_or_empty_url_is_none() {
        assert_eq!(download_url(&json!({"outputs": {}})), None);
        assert_eq!(download_url(&json!({"outputs": {"downloadUrl": ""}})), None);
        assert_eq!(download_url(&json!({"errors": ["bad request"]})), None);
    }
}
