//! Synchronous client for the Farm Worker Portal API.
//!
//! # Overview
//! `FarmClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. `PortalClient` wraps it with a `Transport`
//! that performs the round-trip and a `SessionStore` that keeps the bearer
//! token and role between runs.
//!
//! # Design
//! - `FarmClient` is stateless; it holds only `base_url`. Authenticated
//!   builders take the token as an argument.
//! - Each endpoint is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and testable with plain data.
//! - The session is an explicit value owned by `PortalClient`, loaded at
//!   construction, replaced on login and cleared on logout.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod portal;
pub mod session;
pub mod types;

pub use client::{FarmClient, DEFAULT_BASE_URL};
pub use config::Config;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use portal::{PortalClient, LANDING_PAGE};
pub use session::{FileStore, MemoryStore, Session, SessionStore};
pub use types::{
    AnalyticsStats, CategoryCount, Certificate, CertificateReceipt, Complaint, ComplaintReceipt,
    CreateCertificate, CreateComplaint, CreateRating, FarmerRatings, LoginRequest, Message,
    TokenResponse, UpdateComplaintStatus, User,
};
