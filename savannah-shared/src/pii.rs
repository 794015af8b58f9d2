use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps guest contact data so `tracing` fields and `{:?}` never print it in full.
///
/// Serialization is transparent: API responses still carry the real value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    fn redacted(&self) -> String {
        let raw = self.0.as_ref();
        match raw.split_once('@') {
            Some((local, domain)) => {
                let head: String = local.chars().take(1).collect();
                format!("{}***@{}", head, domain)
            }
            None if raw.is_empty() => String::new(),
            None => "********".to_string(),
        }
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_keeps_domain_only() {
        let email = Masked("kofi.mensah@example.com".to_string());
        assert_eq!(format!("{}", email), "k***@example.com");
        assert_eq!(format!("{:?}", email), "k***@example.com");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let phone = Masked("+233201234567".to_string());
        assert_eq!(phone.to_string(), "********");
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+233201234567\"");
    }
}
