use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::{CredentialOverrides, resolve_credentials};
use crate::dataset::{
    DATA_QUERY_TYPES, DATA_QUERY_URL, Dataset, DatasetProfile, ResponseFormat, select_endpoint,
};
use crate::error::{Error, ErrorReply};
use crate::output;
use crate::params::{ListParam, QueryLocation, wire_bool};
use crate::poll;
use crate::table::{self, DataTable};
use crate::util::filename_from_url;

/// Blocking client for the NSRDB download endpoints.
///
/// One underlying HTTP client is built at construction; credentials are
/// resolved per request call from the `.nsrdbrc` file merged with the
/// request's explicit overrides.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    poll_interval: Duration,
    progress: bool,
    rc_key_required: bool,
    rc_path: Option<PathBuf>,
}

impl Client {
    pub fn new() -> Result<Self, Error> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("nsrdb-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("nsrdb-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            poll_interval: Duration::from_secs(5),
            progress: true,
            rc_key_required: true,
            rc_path: None,
        })
    }

    /// Interval between poll attempts while a deferred file is generated.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Show a spinner while waiting for file generation.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Whether a credentials file without an `api_key` entry is an error even
    /// when the caller passes a key explicitly (the historical contract, and
    /// the default). Pass `false` to only require a key after the merge.
    pub fn with_rc_key_required(mut self, rc_key_required: bool) -> Self {
        self.rc_key_required = rc_key_required;
        self
    }

    /// Read credentials from this file instead of searching `NSRDB_RC`, the
    /// working directory, and the home directory.
    pub fn with_rc_path(mut self, rc_path: impl Into<PathBuf>) -> Self {
        self.rc_path = Some(rc_path.into());
        self
    }

    /// Requests Physical Solar Model v3 data.
    pub fn psm3(&self, request: &DataRequest) -> Result<ApiResponse, Error> {
        self.request(Dataset::Psm3, request)
    }

    /// Requests PSM v3 typical meteorological year data.
    pub fn psm3_tmy(&self, request: &DataRequest) -> Result<ApiResponse, Error> {
        self.request(Dataset::Psm3Tmy, request)
    }

    /// Requests PSM v3 five-minute temporal resolution data.
    pub fn psm3_five_minute(&self, request: &DataRequest) -> Result<ApiResponse, Error> {
        self.request(Dataset::Psm3FiveMinute, request)
    }

    /// Submits a data request for the given dataset.
    ///
    /// A single point with a single dataset name downloads CSV synchronously
    /// and resolves to [`ApiResponse::Table`] directly. Every other shape
    /// submits a file-generation job and polls its download URL until the
    /// request's timeout elapses.
    ///
    /// Local failures (credentials, location) are `Err`; server-side
    /// rejections come back as `Ok` values — see [`ApiResponse`].
    pub fn request(&self, dataset: Dataset, request: &DataRequest) -> Result<ApiResponse, Error> {
        let profile = dataset.profile();
        let credentials = resolve_credentials(
            &request.credentials,
            self.rc_key_required,
            self.rc_path.as_deref(),
        )?;
        let params = assemble_query(profile, request, credentials);
        let (url, format) = select_endpoint(profile.base_url, &params["wkt"], &params["names"]);

        let response = self.http.get(&url).query(&params).send()?;
        let outcome = self.route_response(response, format, request.timeout)?;

        if let Some(dir) = &request.output_dir {
            output::save_response(&outcome, dir)?;
        }
        Ok(outcome)
    }

    /// Lists the datasets available at a location.
    ///
    /// `query_type` filters to station or satellite products; `show_empty`
    /// includes datasets with no data at the location. The reply is the
    /// server's JSON verbatim.
    pub fn data_query(
        &self,
        location: &QueryLocation,
        query_type: Option<&ListParam>,
        show_empty: bool,
        credentials: &CredentialOverrides,
    ) -> Result<Value, Error> {
        let resolved =
            resolve_credentials(credentials, self.rc_key_required, self.rc_path.as_deref())?;

        let mut params = BTreeMap::new();
        params.insert(
            "api_key".to_string(),
            resolved.get("api_key").cloned().unwrap_or_default(),
        );
        if let Some(query_type) = query_type {
            params.insert(
                "type".to_string(),
                query_type.normalize(Some(DATA_QUERY_TYPES), true),
            );
        }
        params.insert("wkt".to_string(), location.to_wkt());
        params.insert("show_empty".to_string(), wire_bool(show_empty).to_string());
        params.insert("format".to_string(), "json".to_string());

        let text = self.http.get(DATA_QUERY_URL).query(&params).send()?.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Polls a deferred job's download URL until the data is ready or
    /// `timeout` elapses.
    ///
    /// Takes the submission payload a previous call returned as
    /// [`ApiResponse::Pending`]; if it carries no download URL the payload is
    /// handed back unchanged. On timeout the submission payload is also
    /// returned as `Pending` — never an error — so the job can be re-polled
    /// later with this same method.
    pub fn poll_download(
        &self,
        submission: &Value,
        timeout: Duration,
    ) -> Result<ApiResponse, Error> {
        let Some(url) = poll::download_url(submission) else {
            return Ok(ApiResponse::Pending(submission.clone()));
        };

        let spinner = if self.progress {
            Some(poll::generation_spinner())
        } else {
            None
        };

        let start = Instant::now();
        let outcome = loop {
            if start.elapsed() >= timeout {
                break ApiResponse::Pending(submission.clone());
            }
            match poll::fetch_generated_file(&self.http, &url) {
                Ok(data) => break ApiResponse::Table(data),
                Err(err) => {
                    log::debug!("generated file not ready: {err}");
                    thread::sleep(self.poll_interval);
                }
            }
        };

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        Ok(outcome)
    }

    fn route_response(
        &self,
        response: reqwest::blocking::Response,
        format: ResponseFormat,
        timeout: Duration,
    ) -> Result<ApiResponse, Error> {
        let status = response.status();
        let url = response.url().clone();
        let text = response.text()?;

        if !status.is_success() {
            log::warn!("NSRDB request returned an error (HTTP {status})");
            // Parameter problems come back as structured JSON; an invalid
            // API key sometimes answers with plain text. Callers tell the
            // two apart by the payload type.
            return Ok(match serde_json::from_str::<Value>(&text) {
                Ok(body) => ApiResponse::ParameterError(body),
                Err(_) => ApiResponse::AuthError(text),
            });
        }

        match format {
            ResponseFormat::Json => {
                log::info!("NSRDB request successfully submitted, file generation in progress");
                let submission: Value = serde_json::from_str(&text)?;
                self.poll_download(&submission, timeout)
            }
            ResponseFormat::Csv => {
                let identifier =
                    filename_from_url(url.as_str()).unwrap_or_else(|| "download.csv".to_string());
                Ok(ApiResponse::Table(table::from_single_csv(
                    &identifier,
                    text.as_bytes(),
                )?))
            }
        }
    }
}

/// One data request: where, which attributes, which dataset names, and how
/// long to wait for deferred file generation.
#[derive(Debug, Clone)]
pub struct DataRequest {
    pub location: QueryLocation,
    /// Attributes to include; `None` requests the dataset's full set.
    pub attributes: Option<ListParam>,
    /// Dataset names (years, or tmy/tdy/tgy labels); `None` selects the most
    /// recent one.
    pub names: Option<ListParam>,
    /// Report timestamps in UTC instead of local standard time.
    pub utc: bool,
    pub leap_day: bool,
    /// Sampling interval in minutes, where the dataset supports one.
    pub interval: Option<u32>,
    pub credentials: CredentialOverrides,
    /// Where to save the outcome, in addition to returning it.
    pub output_dir: Option<PathBuf>,
    /// How long to wait for deferred file generation.
    pub timeout: Duration,
}

impl DataRequest {
    pub fn new(location: impl Into<QueryLocation>) -> Self {
        Self {
            location: location.into(),
            attributes: None,
            names: None,
            utc: false,
            leap_day: false,
            interval: None,
            credentials: CredentialOverrides::default(),
            output_dir: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_attributes(mut self, attributes: impl Into<ListParam>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    pub fn with_names(mut self, names: impl Into<ListParam>) -> Self {
        self.names = Some(names.into());
        self
    }

    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn with_leap_day(mut self, leap_day: bool) -> Self {
        self.leap_day = leap_day;
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialOverrides) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of a data request.
///
/// Only [`ApiResponse::Table`] carries data. The other variants reproduce
/// the server's reply as a value: a still-pending submission payload, a
/// structured parameter rejection, or raw auth-failure text. Returning these
/// as values rather than errors is deliberate — batch callers match on the
/// variant instead of unwinding per request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Resolved tabular data.
    Table(DataTable),
    /// Submission payload for a deferred job that has not produced a file
    /// yet; feed it back to [`Client::poll_download`] to keep waiting.
    Pending(Value),
    /// Structured rejection, e.g. `{"errors": ["required 'names' ..."]}`.
    ParameterError(Value),
    /// Raw response text, typically for an invalid API key.
    AuthError(String),
}

impl ApiResponse {
    pub fn table(&self) -> Option<&DataTable> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Download URL embedded in a pending submission payload, if any.
    pub fn download_url(&self) -> Option<String> {
        match self {
            Self::Pending(reply) => poll::download_url(reply),
            _ => None,
        }
    }

    /// Human-readable messages carried by an error variant.
    pub fn error_messages(&self) -> Vec<String> {
        match self {
            Self::Table(_) | Self::Pending(_) => Vec::new(),
            Self::AuthError(text) => vec![text.clone()],
            Self::ParameterError(body) => {
                let Ok(reply) = serde_json::from_value::<ErrorReply>(body.clone()) else {
                    return vec![body.to_string()];
                };
                let mut messages = reply.errors;
                if let Some(detail) = reply.error {
                    match (detail.code, detail.message) {
                        (Some(code), Some(message)) => messages.push(format!("{code}: {message}")),
                        (_, Some(message)) => messages.push(message),
                        (Some(code), None) => messages.push(code),
                        (None, None) => {}
                    }
                }
                messages
            }
        }
    }
}

fn assemble_query(
    profile: &DatasetProfile,
    request: &DataRequest,
    credentials: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();

    if let Some(attributes) = &request.attributes {
        params.insert(
            "attributes".to_string(),
            attributes.normalize(Some(profile.allowed_attributes), false),
        );
    }
    params.insert("wkt".to_string(), request.location.to_wkt());
    params.extend(credentials);

    let names = match &request.names {
        Some(names) => names.normalize(Some(profile.allowed_names), profile.single_name),
        None => profile.default_name.to_string(),
    };
    params.insert("names".to_string(), names);
    params.insert("utc".to_string(), wire_bool(request.utc).to_string());

    if profile.temporal_params {
        params.insert(
            "leap_day".to_string(),
            wire_bool(request.leap_day).to_string(),
        );
        if let Some(interval) = request.interval.or(profile.default_interval) {
            params.insert("interval".to_string(), interval.to_string());
        }
    }

    params
}
