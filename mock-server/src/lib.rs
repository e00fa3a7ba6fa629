use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: String,
    pub full_name: Option<String>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub complaint_id: String,
    pub user_id: Option<i64>,
    pub category: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub ai_classification: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub cert_number: String,
    pub farmer_name: String,
    pub farm_name: String,
    pub level: String,
    pub status: String,
    pub issued_date: String,
    pub valid_until: String,
    pub user_id: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct Rating {
    pub user_id: i64,
    pub farmer_id: i64,
    pub transport_rating: i32,
    pub conditions_rating: i32,
    pub equipment_rating: i32,
    pub wages_rating: i32,
    pub comments: Option<String>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ComplaintInput {
    pub category: String,
    pub subject: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct ComplaintUpdate {
    pub status: String,
}

#[derive(Deserialize)]
pub struct CertificateInput {
    pub farmer_name: String,
    pub farm_name: String,
    pub level: String,
    pub valid_until: String,
}

#[derive(Deserialize)]
pub struct RatingInput {
    pub farmer_id: i64,
    pub transport_rating: i32,
    pub conditions_rating: i32,
    pub equipment_rating: i32,
    pub wages_rating: i32,
    pub comments: Option<String>,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub tokens: HashMap<String, i64>,
    pub complaints: Vec<Complaint>,
    pub certificates: Vec<Certificate>,
    pub ratings: Vec<Rating>,
}

impl Store {
    /// Demo accounts and records the portal ships with.
    pub fn seeded() -> Self {
        let created_at = "2025-01-01 00:00:00".to_string();
        let user = |id: i64, username: &str, password: &str, role: &str, full_name: &str| User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
            full_name: Some(full_name.to_string()),
            created_at: created_at.clone(),
        };
        let users = vec![
            user(1, "admin", "admin123", "admin", "Admin User"),
            user(2, "worker1", "worker123", "worker", "John Worker"),
            user(3, "farmer1", "farmer123", "farmer", "Ahmed Ben Salem"),
        ];

        let certificates = vec![
            Certificate {
                id: 1,
                cert_number: "CERT-2025-001".to_string(),
                farmer_name: "Ahmed Ben Salem".to_string(),
                farm_name: "Green Valley Farm".to_string(),
                level: "Gold".to_string(),
                status: "Active".to_string(),
                issued_date: "2025-01-01".to_string(),
                valid_until: "2025-12-31".to_string(),
                user_id: Some(3),
            },
            Certificate {
                id: 2,
                cert_number: "CERT-2025-002".to_string(),
                farmer_name: "Fatima Khelifi".to_string(),
                farm_name: "Sunrise Orchards".to_string(),
                level: "Gold".to_string(),
                status: "Active".to_string(),
                issued_date: "2025-01-05".to_string(),
                valid_until: "2025-12-31".to_string(),
                user_id: None,
            },
        ];

        let complaints = vec![Complaint {
            id: 1,
            complaint_id: "CPL-001".to_string(),
            user_id: Some(2),
            category: "Transportation".to_string(),
            subject: "Vehicle Overcrowding".to_string(),
            description: "Too many workers in one vehicle".to_string(),
            status: "New".to_string(),
            ai_classification: Some("Safety Risk - High Priority".to_string()),
            created_at: created_at.clone(),
            updated_at: created_at.clone(),
        }];

        Self {
            users,
            tokens: HashMap::new(),
            complaints,
            certificates,
            ratings: Vec::new(),
        }
    }

    fn user_for_token(&self, token: &str) -> Option<&User> {
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error response in the backend's `{"detail": ...}` shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    detail: &'static str,
}

impl ApiFailure {
    fn new(status: StatusCode, detail: &'static str) -> Self {
        Self { status, detail }
    }

    fn forbidden(detail: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, detail)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiFailure>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/complaints", get(list_complaints).post(create_complaint))
        .route("/complaints/{complaint_id}", patch(update_complaint))
        .route("/certificates", get(list_certificates).post(create_certificate))
        .route(
            "/certificates/{cert_number}",
            get(verify_certificate).delete(revoke_certificate),
        )
        .route("/ratings", post(create_rating))
        .route("/ratings/farmer/{farmer_id}", get(farmer_ratings))
        .route("/analytics/stats", get(analytics))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn current_user(store: &Store, headers: &HeaderMap) -> ApiResult<User> {
    let token = bearer(headers)
        .ok_or_else(|| ApiFailure::new(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    store
        .user_for_token(token)
        .cloned()
        .ok_or_else(|| ApiFailure::new(StatusCode::UNAUTHORIZED, "Invalid token"))
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = db.write().await;
    let user = store
        .users
        .iter()
        .find(|u| u.username == input.username && u.password == input.password)
        .cloned()
        .ok_or_else(|| ApiFailure::new(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = Uuid::new_v4().to_string();
    store.tokens.insert(token.clone(), user.id);
    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "role": user.role,
    })))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<User>> {
    let store = db.read().await;
    current_user(&store, &headers).map(Json)
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

async fn create_complaint(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ComplaintInput>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;

    let id = store.complaints.len() as i64 + 1;
    let complaint_id = format!("CPL-{id:03}");
    let timestamp = now();
    store.complaints.push(Complaint {
        id,
        complaint_id: complaint_id.clone(),
        user_id: Some(user.id),
        category: input.category,
        subject: input.subject,
        description: input.description,
        status: "New".to_string(),
        ai_classification: None,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    });
    Ok(Json(json!({ "complaint_id": complaint_id, "status": "submitted" })))
}

/// Admins see every complaint, everyone else only their own. Newest first.
async fn list_complaints(
    State(db): State<Db>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Complaint>>> {
    let store = db.read().await;
    let user = current_user(&store, &headers)?;
    let complaints = store
        .complaints
        .iter()
        .rev()
        .filter(|c| user.role == "admin" || c.user_id == Some(user.id))
        .cloned()
        .collect();
    Ok(Json(complaints))
}

async fn update_complaint(
    State(db): State<Db>,
    Path(complaint_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<ComplaintUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    if user.role != "admin" {
        return Err(ApiFailure::forbidden("Only admins can update complaints"));
    }

    let timestamp = now();
    if let Some(complaint) = store
        .complaints
        .iter_mut()
        .find(|c| c.complaint_id == complaint_id)
    {
        complaint.status = input.status;
        complaint.updated_at = timestamp;
    }
    Ok(Json(json!({ "message": "Complaint updated successfully" })))
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

async fn list_certificates(
    State(db): State<Db>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Certificate>>> {
    let store = db.read().await;
    current_user(&store, &headers)?;
    let active = store
        .certificates
        .iter()
        .filter(|c| c.status == "Active")
        .cloned()
        .collect();
    Ok(Json(active))
}

async fn verify_certificate(
    State(db): State<Db>,
    Path(cert_number): Path<String>,
) -> ApiResult<Json<Certificate>> {
    let store = db.read().await;
    store
        .certificates
        .iter()
        .find(|c| c.cert_number == cert_number)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, "Certificate not found"))
}

async fn create_certificate(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CertificateInput>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    if user.role != "admin" {
        return Err(ApiFailure::forbidden("Only admins can issue certificates"));
    }

    let today = chrono::Utc::now().date_naive();
    let id = store.certificates.len() as i64 + 1;
    let cert_number = format!("CERT-{}-{id:03}", today.format("%Y"));
    store.certificates.push(Certificate {
        id,
        cert_number: cert_number.clone(),
        farmer_name: input.farmer_name,
        farm_name: input.farm_name,
        level: input.level,
        status: "Active".to_string(),
        issued_date: today.to_string(),
        valid_until: input.valid_until,
        user_id: None,
    });
    Ok(Json(json!({ "cert_number": cert_number, "status": "issued" })))
}

async fn revoke_certificate(
    State(db): State<Db>,
    Path(cert_number): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    if user.role != "admin" {
        return Err(ApiFailure::forbidden("Only admins can revoke certificates"));
    }

    if let Some(cert) = store
        .certificates
        .iter_mut()
        .find(|c| c.cert_number == cert_number)
    {
        cert.status = "Revoked".to_string();
    }
    Ok(Json(json!({ "message": "Certificate revoked" })))
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

async fn create_rating(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<RatingInput>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut store = db.write().await;
    let user = current_user(&store, &headers)?;
    if user.role != "worker" {
        return Err(ApiFailure::forbidden("Only workers can submit ratings"));
    }

    store.ratings.push(Rating {
        user_id: user.id,
        farmer_id: input.farmer_id,
        transport_rating: input.transport_rating,
        conditions_rating: input.conditions_rating,
        equipment_rating: input.equipment_rating,
        wages_rating: input.wages_rating,
        comments: input.comments,
    });
    Ok(Json(json!({ "message": "Rating submitted successfully" })))
}

fn average(ratings: &[&Rating], score: impl Fn(&Rating) -> i32) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: i64 = ratings.iter().map(|&r| i64::from(score(r))).sum();
    Some(total as f64 / ratings.len() as f64)
}

async fn farmer_ratings(
    State(db): State<Db>,
    Path(farmer_id): Path<i64>,
) -> Json<serde_json::Value> {
    let store = db.read().await;
    let ratings: Vec<&Rating> = store
        .ratings
        .iter()
        .filter(|r| r.farmer_id == farmer_id)
        .collect();
    Json(json!({
        "avg_transport": average(&ratings, |r| r.transport_rating),
        "avg_conditions": average(&ratings, |r| r.conditions_rating),
        "avg_equipment": average(&ratings, |r| r.equipment_rating),
        "avg_wages": average(&ratings, |r| r.wages_rating),
        "total_ratings": ratings.len(),
    }))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

async fn analytics(
    State(db): State<Db>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let store = db.read().await;
    let user = current_user(&store, &headers)?;
    if user.role != "admin" {
        return Err(ApiFailure::forbidden("Only admins can view analytics"));
    }

    let active_certificates = store
        .certificates
        .iter()
        .filter(|c| c.status == "Active")
        .count();
    let total_workers = store.users.iter().filter(|u| u.role == "worker").count();
    let pending_complaints = store
        .complaints
        .iter()
        .filter(|c| c.status == "New" || c.status == "In Review")
        .count();

    let mut by_category: Vec<(String, usize)> = Vec::new();
    for complaint in &store.complaints {
        match by_category.iter_mut().find(|(c, _)| *c == complaint.category) {
            Some((_, count)) => *count += 1,
            None => by_category.push((complaint.category.clone(), 1)),
        }
    }
    let complaints_by_category: Vec<_> = by_category
        .into_iter()
        .map(|(category, count)| json!({ "category": category, "count": count }))
        .collect();

    Ok(Json(json!({
        "active_certificates": active_certificates,
        "total_workers": total_workers,
        "pending_complaints": pending_complaints,
        "complaints_by_category": complaints_by_category,
    })))
}
