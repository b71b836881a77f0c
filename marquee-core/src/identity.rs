use marquee_shared::Masked;
use serde::{Deserialize, Serialize};

/// The identity the upstream auth provider vouches for. The reservation
/// flow only ever needs a stable opaque subject and a contact email; no
/// credential material crosses this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Email wrapped for log output.
    pub fn masked_email(&self) -> Masked<&str> {
        Masked(self.email.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_email_hides_local_part() {
        let who = UserIdentity::new("user-1", "carol@example.com");
        assert_eq!(format!("{}", who.masked_email()), "c***@example.com");
    }
}
