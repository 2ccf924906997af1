//! Storage-boundary validation of sharing metadata.
//!
//! Sharing lists live in the database as JSON text columns. They are parsed
//! and normalized exactly once, here; past this point the rest of the crate
//! only sees the typed shapes from [`crate::structs`]. A row that fails to
//! parse is reported as unusable rather than crashing a request.

use serde::Deserialize;

use crate::errors::{LinkmarkError, Result};
use crate::structs::{ShareEntry, SharePermission};
use crate::utils::normalize_email;

#[derive(Deserialize)]
struct RawShareEntry {
    email: String,
    #[serde(default = "default_permission")]
    permission: SharePermission,
}

fn default_permission() -> SharePermission {
    SharePermission::View
}

/// Parse a resource's restriction list (JSON array of email strings).
pub fn parse_shared_emails(raw: &str) -> Result<Vec<String>> {
    let emails: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| LinkmarkError::validation(format!("Bad shared_emails blob: {}", e)))?;

    Ok(emails.iter().map(|e| normalize_email(e)).collect())
}

/// Parse a collection's share list (JSON array of `{email, permission}`).
pub fn parse_share_entries(raw: &str) -> Result<Vec<ShareEntry>> {
    let entries: Vec<RawShareEntry> = serde_json::from_str(raw)
        .map_err(|e| LinkmarkError::validation(format!("Bad shared_with blob: {}", e)))?;

    Ok(entries
        .into_iter()
        .map(|entry| ShareEntry {
            email: normalize_email(&entry.email),
            permission: entry.permission,
        })
        .collect())
}

pub fn serialize_shared_emails(emails: &[String]) -> Result<String> {
    Ok(serde_json::to_string(emails)?)
}

pub fn serialize_share_entries(entries: &[ShareEntry]) -> Result<String> {
    Ok(serde_json::to_string(entries)?)
}
