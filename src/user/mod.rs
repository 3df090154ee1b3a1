//! User-data canonicalization and credential checks.
//!
//! Canonical forms are what gets stored and compared: uniqueness checks on
//! usernames and emails run on the canonical form, never the raw input.
//! The authenticator verifies credentials against their canonical form.

pub mod auth;

/// Canonical form of a username: trimmed and lowercased.
///
/// Total and idempotent; there is no failure mode.
pub fn canonicalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Canonical form of an email address: trimmed and lowercased.
// TODO: provider-specific alias folding (Gmail dots and plus suffixes)
pub fn canonicalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_username() {
        assert_eq!(canonicalize_username(" HELLO World"), "hello world");
    }

    #[test]
    fn test_canonicalize_username_idempotent() {
        let once = canonicalize_username("  MixedCase Name ");
        assert_eq!(canonicalize_username(&once), once);
    }

    #[test]
    fn test_canonicalize_email() {
        assert_eq!(canonicalize_email(" Alice@Example.COM "), "alice@example.com");
    }
}
