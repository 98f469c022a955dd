use crate::base::Sanitizer;

/// Schemes accepted when a field does not configure its own allow-list.
pub const DEFAULT_PROTOCOLS: &[&str] = &["http", "https"];

///
/// UrlScheme
/// Trims whitespace and enforces a scheme allow-list; a bare authority gets
/// the first allowed scheme prepended.
///

pub struct UrlScheme {
    allowed: Vec<String>,
}

impl UrlScheme {
    #[must_use]
    pub fn new<I: IntoIterator<Item = S>, S: Into<String>>(allowed: I) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn default_protocols() -> Self {
        Self::new(DEFAULT_PROTOCOLS.iter().copied())
    }

    fn scheme_of(value: &str) -> Option<&str> {
        let (scheme, rest) = value.split_once("://")?;

        if scheme.is_empty() || rest.is_empty() {
            return None;
        }

        Some(scheme)
    }
}

impl Sanitizer<String> for UrlScheme {
    fn sanitize(&self, value: &mut String) -> Result<(), String> {
        let trimmed = value.trim();

        let normalized = match Self::scheme_of(trimmed) {
            Some(scheme) => {
                if !self.allowed.iter().any(|a| a.eq_ignore_ascii_case(scheme)) {
                    return Err(format!("scheme '{scheme}' is not allowed"));
                }

                trimmed.to_owned()
            }
            None => {
                let Some(default_scheme) = self.allowed.first() else {
                    return Err("no allowed schemes configured".to_owned());
                };

                format!("{default_scheme}://{trimmed}")
            }
        };

        *value = normalized;
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_scheme_keeps_allowed_schemes() {
        let sanitizer = UrlScheme::default_protocols();

        let mut v = " https://example.com ".to_string();
        sanitizer.sanitize(&mut v).unwrap();
        assert_eq!(v, "https://example.com");

        let mut v = "http://example.com".to_string();
        sanitizer.sanitize(&mut v).unwrap();
        assert_eq!(v, "http://example.com");
    }

    #[test]
    fn test_url_scheme_prepends_default_when_missing() {
        let sanitizer = UrlScheme::default_protocols();

        let mut v = "example.com/page".to_string();
        sanitizer.sanitize(&mut v).unwrap();
        assert_eq!(v, "http://example.com/page");
    }

    #[test]
    fn test_url_scheme_rejects_disallowed_schemes() {
        let sanitizer = UrlScheme::default_protocols();

        let mut v = "javascript://alert(1)".to_string();
        assert!(sanitizer.sanitize(&mut v).is_err());

        let mut v = "ftp://example.com/f".to_string();
        assert!(sanitizer.sanitize(&mut v).is_err());
    }

    #[test]
    fn test_url_scheme_honors_custom_allow_list() {
        let sanitizer = UrlScheme::new(["ftp"]);

        let mut v = "ftp://example.com/f".to_string();
        sanitizer.sanitize(&mut v).unwrap();
        assert_eq!(v, "ftp://example.com/f");
    }
}
