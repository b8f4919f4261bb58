use serde::Serialize;
use std::fmt;

/// Credential-bearing string.
///
/// `Debug` never shows the value. Serialization is transparent so the
/// exported record carries the exact bytes read from the environment.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// The raw value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Short description safe to print: whether the value is set and its length.
    pub fn redacted(&self) -> String {
        if self.0.is_empty() {
            "(empty)".to_string()
        } else {
            format!("set ({} chars)", self.0.chars().count())
        }
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let secret = Secret::new("0xdeadbeef");
        let shown = format!("{:?}", secret);
        assert!(!shown.contains("deadbeef"));
        assert_eq!(shown, "Secret(***)");
    }

    #[test]
    fn test_redacted_reports_length_only() {
        assert_eq!(Secret::new("KEY123").redacted(), "set (6 chars)");
        assert_eq!(Secret::default().redacted(), "(empty)");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Secret::new("KEY123")).unwrap();
        assert_eq!(json, "\"KEY123\"");
    }
}
