//! Represents a media reference attached to an external parent record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored reference string keyed by its parent record.
///
/// The parent record (a job posting, a profile) lives elsewhere; only the
/// opaque string is kept here.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct MediaNote {
    /// Identifier of the parent record.
    pub record_id: String,

    /// Composite reference or a manually pasted link.
    pub reference: String,

    /// Container URL when the reference is composite.
    pub container_url: Option<String>,

    /// Number of chunk locators carried by the reference.
    pub part_count: i64,

    /// When the reference was last replaced.
    pub updated_at: DateTime<Utc>,
}
