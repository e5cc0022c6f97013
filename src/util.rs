pub(crate) fn filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => None,
    }
}

/// Local-file ZIP signature, plus the empty- and spanned-archive variants.
pub(crate) fn is_zip_payload(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK\x03\x04")
        || bytes.starts_with(b"PK\x05\x06")
        || bytes.starts_with(b"PK\x07\x08")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_strips_query_and_fragment() {
        assert_eq!(
            filename_from_url("https://host/api/psm3-download.csv?api_key=K"),
            Some("psm3-download.csv".to_string())
        );
        assert_eq!(
            filename_from_url("https://host/files/out.zip#part"),
            Some("out.zip".to_string())
        );
    }

    #[test]
    fn filename_absent_for_trailing_slash() {
        assert_eq!(filename_from_url("https://host/files/"), None);
    }

    #[test]
    fn zip_signature_detection() {
        assert!(is_zip_payload(b"PK\x03\x04rest"));
        assert!(!is_zip_payload(b"Source,Location ID\n"));
    }
}
