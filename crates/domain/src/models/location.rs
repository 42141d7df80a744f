//! Location domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A facility owned by exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    /// Owning company. Set from the creator at insert time and never changed.
    pub company_id: i64,
    pub name: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub company_id: i64,
    pub name: String,
    pub postal_code: String,
}

/// Editable location fields. The owning company is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl LocationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.postal_code.is_none()
    }
}

/// Request payload for creating a location.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: String,

    #[serde(alias = "pincode")]
    #[validate(custom(function = "shared::validation::validate_postal_code"))]
    pub postal_code: String,
}

/// Request payload for updating a location.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Name must be between 1 and 200 characters"
    ))]
    pub name: Option<String>,

    #[serde(alias = "pincode")]
    #[validate(custom(function = "shared::validation::validate_postal_code"))]
    pub postal_code: Option<String>,
}

impl From<UpdateLocationRequest> for LocationChanges {
    fn from(req: UpdateLocationRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            postal_code: req.postal_code.map(|p| p.trim().to_uppercase()),
        }
    }
}
