use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for customer-identifying values (emails, display names) that
/// masks the content in Debug and Display output. Serialization passes the
/// real value through, so API responses are unaffected; the guard exists to
/// keep raw PII out of `tracing` output.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", mask(&self.0.to_string()))
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", mask(&self.0.to_string()))
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

/// Keeps the first character and the domain of an email-shaped value,
/// masks everything else.
fn mask(raw: &str) -> String {
    match raw.split_once('@') {
        Some((local, domain)) => {
            let head = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", head, domain)
        }
        None => {
            let head = raw.chars().next().map(String::from).unwrap_or_default();
            format!("{}***", head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_masks_email() {
        let email = Masked("alice@example.com".to_string());
        assert_eq!(format!("{:?}", email), "\"a***@example.com\"");
    }

    #[test]
    fn serialization_passes_through() {
        let email = Masked("alice@example.com".to_string());
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"alice@example.com\"");
    }
}
