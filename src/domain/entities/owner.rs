//! Owner entity and its opaque identifier.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Serialize, Serializer};
use serde_json::json;

use crate::error::AppError;

/// Length of an owner identifier in bytes.
pub const OWNER_ID_LEN: usize = 12;

/// Opaque 12-byte owner identifier.
///
/// The first four bytes hold the creation time in unix seconds (big-endian),
/// the remaining eight are random. Rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId([u8; OWNER_ID_LEN]);

impl OwnerId {
    /// Generates a fresh identifier from the thread-local random source.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng(), Utc::now())
    }

    /// Generates an identifier from an explicit random source and timestamp.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; OWNER_ID_LEN];
        let seconds = now.timestamp().clamp(0, u32::MAX as i64) as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        rng.fill(&mut bytes[4..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; OWNER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an identifier from a database column.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the slice is not exactly 12 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AppError> {
        let bytes: [u8; OWNER_ID_LEN] = bytes.try_into().map_err(|_| {
            AppError::bad_request(
                "Owner id must be 12 bytes",
                json!({ "provided_length": bytes.len() }),
            )
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Creation time encoded in the identifier.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(seconds), 0).unwrap_or_default()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for OwnerId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|e| {
            AppError::bad_request(
                "Owner id must be 24 hex characters",
                json!({ "owner": s, "reason": e.to_string() }),
            )
        })?;
        Self::from_slice(&decoded)
    }
}

impl Serialize for OwnerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An owner of short URLs.
#[derive(Debug, Clone, Serialize)]
pub struct Owner {
    pub id: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(id: OwnerId, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_owner_id_hex_round_trip() {
        let id = OwnerId::generate();
        let text = id.to_string();

        assert_eq!(text.len(), 24);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(text.parse::<OwnerId>().unwrap(), id);
    }

    #[test]
    fn test_owner_id_encodes_timestamp() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let id = OwnerId::generate_with(&mut StdRng::seed_from_u64(7), now);

        assert_eq!(id.timestamp(), now);
        assert_eq!(&id.to_string()[..8], "6553f100");
    }

    #[test]
    fn test_owner_id_random_tail_differs() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        let a = OwnerId::generate_with(&mut rng, now);
        let b = OwnerId::generate_with(&mut rng, now);

        assert_eq!(a.as_bytes()[..4], b.as_bytes()[..4]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_owner_id_rejects_bad_hex() {
        let result = "not-hex".parse::<OwnerId>();
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_owner_id_rejects_wrong_length() {
        let result = "abcdef".parse::<OwnerId>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("12 bytes"));
    }

    #[test]
    fn test_owner_id_serializes_as_hex_string() {
        let id = OwnerId::from_bytes([0xab; OWNER_ID_LEN]);
        let value = serde_json::to_value(id).unwrap();

        assert_eq!(value, json!("abababababababababababab"));
    }
}
