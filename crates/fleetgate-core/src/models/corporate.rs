//! Corporate (tenant) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corporate {
    pub id: Uuid,
    pub name: String,
    /// Unique derived code, e.g. `CORP-ACMELO-3F2A`. Source of the
    /// tenant fragment in login identifiers.
    pub code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCorporate {
    pub name: String,
    pub code: String,
}
