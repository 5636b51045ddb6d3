//! Wall-clock timestamps and identifier minting.
//!
//! Timestamps are UTC nanoseconds since the Unix epoch. They only order
//! last-writer-wins fields, so no causal information is carried.

use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Current UTC time in nanoseconds since the Unix epoch.
#[must_use]
pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Mint a fresh random (version 4) identifier.
///
/// Reads from the operating system entropy source and fails with
/// [`Error::Unknown`] if it is unavailable.
pub fn random_id() -> Result<Uuid> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::unknown("item creation failed with nested error", e))?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
}
