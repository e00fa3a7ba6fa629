//! Stateless HTTP request builder and response parser for the portal API.
//!
//! # Design
//! `FarmClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Authenticated builders take the bearer token as an argument; the session
//! that owns it lives in `PortalClient`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AnalyticsStats, Certificate, CertificateReceipt, Complaint, ComplaintReceipt,
    CreateCertificate, CreateComplaint, CreateRating, FarmerRatings, LoginRequest, Message,
    TokenResponse, UpdateComplaintStatus, User,
};

/// Backend the browser build talked to.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const LOGIN_FAILED: &str = "Login failed";

/// Synchronous, stateless request builder and response parser.
#[derive(Debug, Clone)]
pub struct FarmClient {
    base_url: String,
}

impl Default for FarmClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl FarmClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// Login never carries a bearer header, even if a stale token exists.
    pub fn build_login(&self, username: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let body = encode(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        Ok(self.request(HttpMethod::Post, "/auth/login", json_headers(None), Some(body)))
    }

    /// Non-2xx responses surface the backend's `detail` string when it has
    /// one, otherwise a generic message.
    pub fn parse_login(&self, response: HttpResponse) -> Result<TokenResponse, ApiError> {
        if !response.is_success() {
            let message = error_detail(&response.body).unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!(status = response.status, "login rejected");
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }
        deserialize(&response.body)
    }

    pub fn build_get_current_user(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/auth/me", json_headers(token), None)
    }

    pub fn parse_get_current_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        decode(response, "Failed to get user info")
    }

    // -----------------------------------------------------------------------
    // Complaints
    // -----------------------------------------------------------------------

    pub fn build_create_complaint(
        &self,
        token: Option<&str>,
        input: &CreateComplaint,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(input)?;
        Ok(self.request(HttpMethod::Post, "/complaints", json_headers(token), Some(body)))
    }

    pub fn parse_create_complaint(&self, response: HttpResponse) -> Result<ComplaintReceipt, ApiError> {
        decode(response, "Failed to create complaint")
    }

    pub fn build_get_complaints(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/complaints", json_headers(token), None)
    }

    pub fn parse_get_complaints(&self, response: HttpResponse) -> Result<Vec<Complaint>, ApiError> {
        decode(response, "Failed to fetch complaints")
    }

    pub fn build_update_complaint_status(
        &self,
        token: Option<&str>,
        complaint_id: &str,
        status: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(&UpdateComplaintStatus {
            status: status.to_string(),
        })?;
        Ok(self.request(
            HttpMethod::Patch,
            &format!("/complaints/{}", urlencoding::encode(complaint_id)),
            json_headers(token),
            Some(body),
        ))
    }

    pub fn parse_update_complaint_status(&self, response: HttpResponse) -> Result<Message, ApiError> {
        decode(response, "Failed to update complaint")
    }

    // -----------------------------------------------------------------------
    // Certificates
    // -----------------------------------------------------------------------

    pub fn build_get_certificates(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/certificates", json_headers(token), None)
    }

    pub fn parse_get_certificates(&self, response: HttpResponse) -> Result<Vec<Certificate>, ApiError> {
        decode(response, "Failed to fetch certificates")
    }

    /// Public lookup: sent without any headers.
    pub fn build_verify_certificate(&self, cert_number: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/certificates/{}", urlencoding::encode(cert_number)),
            Vec::new(),
            None,
        )
    }

    /// A 404 means "no such certificate" and yields `Ok(None)`.
    pub fn parse_verify_certificate(
        &self,
        response: HttpResponse,
    ) -> Result<Option<Certificate>, ApiError> {
        if response.status == 404 {
            return Ok(None);
        }
        decode(response, "Failed to verify certificate").map(Some)
    }

    pub fn build_create_certificate(
        &self,
        token: Option<&str>,
        input: &CreateCertificate,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(input)?;
        Ok(self.request(HttpMethod::Post, "/certificates", json_headers(token), Some(body)))
    }

    pub fn parse_create_certificate(
        &self,
        response: HttpResponse,
    ) -> Result<CertificateReceipt, ApiError> {
        decode(response, "Failed to create certificate")
    }

    pub fn build_revoke_certificate(&self, token: Option<&str>, cert_number: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            &format!("/certificates/{}", urlencoding::encode(cert_number)),
            json_headers(token),
            None,
        )
    }

    pub fn parse_revoke_certificate(&self, response: HttpResponse) -> Result<Message, ApiError> {
        decode(response, "Failed to revoke certificate")
    }

    // -----------------------------------------------------------------------
    // Ratings
    // -----------------------------------------------------------------------

    pub fn build_submit_rating(
        &self,
        token: Option<&str>,
        input: &CreateRating,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(input)?;
        Ok(self.request(HttpMethod::Post, "/ratings", json_headers(token), Some(body)))
    }

    pub fn parse_submit_rating(&self, response: HttpResponse) -> Result<Message, ApiError> {
        decode(response, "Failed to submit rating")
    }

    pub fn build_get_farmer_ratings(&self, token: Option<&str>, farmer_id: i64) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/ratings/farmer/{farmer_id}"),
            json_headers(token),
            None,
        )
    }

    pub fn parse_get_farmer_ratings(&self, response: HttpResponse) -> Result<FarmerRatings, ApiError> {
        decode(response, "Failed to fetch ratings")
    }

    // -----------------------------------------------------------------------
    // Analytics
    // -----------------------------------------------------------------------

    pub fn build_get_analytics(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/analytics/stats", json_headers(token), None)
    }

    pub fn parse_get_analytics(&self, response: HttpResponse) -> Result<AnalyticsStats, ApiError> {
        decode(response, "Failed to fetch analytics")
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }
}

/// `content-type` always, `authorization` only for a non-empty token.
fn json_headers(token: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("authorization".to_string(), format!("Bearer {token}")));
    }
    headers
}

fn encode<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn deserialize<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Any 2xx decodes as `T`; everything else becomes `Status` with `message`.
fn decode<T: DeserializeOwned>(response: HttpResponse, message: &str) -> Result<T, ApiError> {
    if !response.is_success() {
        warn!(status = response.status, "{message}");
        return Err(ApiError::Status {
            status: response.status,
            message: message.to_string(),
        });
    }
    deserialize(&response.body)
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extract a string `detail` from an error body. Validation errors carry a
/// list there instead, which is not a usable message.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(detail) if !detail.is_empty() => Some(detail),
        _ => None,
    }
}
