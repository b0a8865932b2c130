//! Stored admin credential format.
//!
//! The admin password lives in a single `admin_settings` row as either
//! `"<salt hex>:<sha-256 hex>"` or, for installs that predate hashing, the bare
//! plaintext password. Hashing itself lives in the API crate; this module only
//! classifies the stored string.

/// A classified `password_hash` value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StoredCredential<'a> {
    /// `salt:digest`, split at the first colon.
    Salted {
        salt_hex: &'a str,
        digest_hex: &'a str,
    },
    /// No colon present; compared verbatim against the submitted password.
    LegacyPlaintext(&'a str),
}

impl<'a> StoredCredential<'a> {
    /// Classify a stored credential string.
    #[must_use]
    pub fn parse(stored: &'a str) -> Self {
        match stored.split_once(':') {
            Some((salt_hex, digest_hex)) => Self::Salted {
                salt_hex,
                digest_hex,
            },
            None => Self::LegacyPlaintext(stored),
        }
    }
}

// Never print the stored secret.
impl std::fmt::Debug for StoredCredential<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Salted { .. } => f.write_str("StoredCredential::Salted([REDACTED])"),
            Self::LegacyPlaintext(_) => {
                f.write_str("StoredCredential::LegacyPlaintext([REDACTED])")
            }
        }
    }
}
