use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::params::wire_bool;

/// Identity fields sent along with every data request.
///
/// Values given here take precedence over the credentials file; anything left
/// as `None` falls back to the file entry of the same (lower-cased) name.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub api_key: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub affiliation: Option<String>,
    pub reason: Option<String>,
    pub mailing_list: Option<bool>,
}

impl CredentialOverrides {
    /// Overrides carrying only an API key.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_mailing_list(mut self, mailing_list: bool) -> Self {
        self.mailing_list = Some(mailing_list);
        self
    }
}

/// Resolves the credentials sent with a request: file values first, explicit
/// overrides on top.
///
/// `rc_key_required` keeps the historical contract that a credentials file
/// without an `api_key` entry is a configuration error even when the caller
/// supplies a key explicitly; pass `false` to defer the check until after the
/// merge.
pub(crate) fn resolve_credentials(
    overrides: &CredentialOverrides,
    rc_key_required: bool,
    rc_path: Option<&Path>,
) -> Result<BTreeMap<String, String>, Error> {
    let candidates = match rc_path {
        Some(path) => vec![path.to_path_buf()],
        None => rc_candidates(),
    };

    let mut credentials = BTreeMap::new();
    match candidates.iter().find(|path| path.exists()) {
        Some(path) => {
            credentials = read_rc(path)?;
            if rc_key_required && !credentials.contains_key("api_key") {
                return Err(Error::Configuration { path: path.clone() });
            }
        }
        None => {
            if overrides.api_key.is_none() {
                return Err(Error::MissingCredentials);
            }
        }
    }

    if let Some(v) = &overrides.api_key {
        credentials.insert("api_key".to_string(), v.clone());
    }
    if let Some(v) = &overrides.full_name {
        credentials.insert("full_name".to_string(), v.clone());
    }
    if let Some(v) = &overrides.email {
        credentials.insert("email".to_string(), v.clone());
    }
    if let Some(v) = &overrides.affiliation {
        credentials.insert("affiliation".to_string(), v.clone());
    }
    if let Some(v) = &overrides.reason {
        credentials.insert("reason".to_string(), v.clone());
    }
    if let Some(v) = overrides.mailing_list {
        credentials.insert("mailing_list".to_string(), wire_bool(v).to_string());
    }

    if !credentials.contains_key("api_key") {
        return Err(Error::MissingCredentials);
    }

    Ok(credentials)
}

fn read_rc(path: &Path) -> Result<BTreeMap<String, String>, Error> {
    let text = std::fs::read_to_string(path)?;
    let mut values = BTreeMap::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            values.insert(key, strip_quotes(value.trim()).to_string());
        }
    }

    Ok(values)
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Search order: `NSRDB_RC` (explicit), then `./.nsrdbrc`, then `~/.nsrdbrc`.
fn rc_candidates() -> Vec<PathBuf> {
    if let Ok(path) = std::env::var("NSRDB_RC") {
        return vec![PathBuf::from(path)];
    }

    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(".nsrdbrc"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".nsrdbrc"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_rc(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(".nsrdbrc");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn explicit_key_without_file_is_the_only_entry() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join(".nsrdbrc");
        let creds =
            resolve_credentials(&CredentialOverrides::api_key("X"), true, Some(&missing)).unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds["api_key"], "X");
    }

    #[test]
    fn explicit_key_overrides_file_value() {
        let dir = tempdir().unwrap();
        let rc = write_rc(&dir, "API_KEY=Y\nFULL_NAME=Jane Doe\n");
        let creds =
            resolve_credentials(&CredentialOverrides::api_key("X"), true, Some(&rc)).unwrap();
        assert_eq!(creds["api_key"], "X");
        assert_eq!(creds["full_name"], "Jane Doe");
    }

    #[test]
    fn file_without_key_fails_even_with_explicit_key() {
        let dir = tempdir().unwrap();
        let rc = write_rc(&dir, "FULL_NAME=Jane Doe\n");
        let err =
            resolve_credentials(&CredentialOverrides::api_key("X"), true, Some(&rc)).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn merged_check_accepts_explicit_key_with_keyless_file() {
        let dir = tempdir().unwrap();
        let rc = write_rc(&dir, "FULL_NAME=Jane Doe\n");
        let creds =
            resolve_credentials(&CredentialOverrides::api_key("X"), false, Some(&rc)).unwrap();
        assert_eq!(creds["api_key"], "X");
        assert_eq!(creds["full_name"], "Jane Doe");
    }

    #[test]
    fn merged_check_still_requires_some_key() {
        let dir = tempdir().unwrap();
        let rc = write_rc(&dir, "FULL_NAME=Jane Doe\n");
        let err = resolve_credentials(&CredentialOverrides::default(), false, Some(&rc)).unwrap_err();
        assert!(matches!(err, Error::MissingCredentials));
    }

    #[test]
    fn no_file_and_no_key_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join(".nsrdbrc");
        let err =
            resolve_credentials(&CredentialOverrides::default(), true, Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::MissingCredentials));
    }

    #[test]
    fn file_keys_are_lowercased_and_quotes_stripped() {
        let dir = tempdir().unwrap();
        let rc = write_rc(
            &dir,
            "# personal credentials\nAPI_KEY=\"abc123\"\nEMAIL='me@example.com'\n",
        );
        let creds = resolve_credentials(&CredentialOverrides::default(), true, Some(&rc)).unwrap();
        assert_eq!(creds["api_key"], "abc123");
        assert_eq!(creds["email"], "me@example.com");
    }

    #[test]
    fn mailing_list_override_serializes_to_wire_string() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join(".nsrdbrc");
        let overrides = CredentialOverrides::api_key("X").with_mailing_list(true);
        let creds = resolve_credentials(&overrides, true, Some(&missing)).unwrap();
        assert_eq!(creds["mailing_list"], "true");
    }
}
