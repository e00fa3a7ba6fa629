//! Request and response payloads for the farm portal API.
//!
//! # Design
//! Field names match the backend's snake_case JSON. These types are defined
//! independently from the mock-server crate; the integration tests catch
//! schema drift between the two. Unknown response fields are ignored (the
//! `/auth/me` payload carries more than the client needs).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body returned by a successful login. `token_type` is filled in as
/// `bearer` when the backend leaves it out, so the value can carry a field
/// the response body did not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub role: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// The authenticated user as reported by `/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComplaint {
    pub category: String,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateComplaintStatus {
    pub status: String,
}

/// Acknowledgement returned when a complaint is filed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplaintReceipt {
    pub complaint_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Complaint {
    pub id: i64,
    pub complaint_id: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub category: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub ai_classification: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCertificate {
    pub farmer_name: String,
    pub farm_name: String,
    pub level: String,
    pub valid_until: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Certificate {
    pub id: i64,
    pub cert_number: String,
    pub farmer_name: String,
    pub farm_name: String,
    pub level: String,
    pub status: String,
    pub issued_date: String,
    pub valid_until: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Acknowledgement returned when a certificate is issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateReceipt {
    pub cert_number: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// A worker's rating of a farmer. Each score is sent as-is; range checks
/// belong to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRating {
    pub farmer_id: i64,
    pub transport_rating: i32,
    pub conditions_rating: i32,
    pub equipment_rating: i32,
    pub wages_rating: i32,
    pub comments: Option<String>,
}

/// Aggregated ratings for one farmer. Averages are `None` when nobody has
/// rated the farmer yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmerRatings {
    #[serde(default)]
    pub avg_transport: Option<f64>,
    #[serde(default)]
    pub avg_conditions: Option<f64>,
    #[serde(default)]
    pub avg_equipment: Option<f64>,
    #[serde(default)]
    pub avg_wages: Option<f64>,
    #[serde(default)]
    pub total_ratings: i64,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsStats {
    pub active_certificates: i64,
    pub total_workers: i64,
    pub pending_complaints: i64,
    pub complaints_by_category: Vec<CategoryCount>,
}

/// Generic `{"message": ...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}
