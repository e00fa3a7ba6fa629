//! Session-holding client that executes requests.
//!
//! # Design
//! `PortalClient` pairs the stateless `FarmClient` with a `Transport` and a
//! `SessionStore`. Every endpoint method performs exactly one round-trip:
//! build with the current token, execute, parse. Only `login` and `logout`
//! touch the session, and both take `&mut self`.

use tracing::info;

use crate::client::FarmClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{Transport, UreqTransport};
use crate::session::{FileStore, Session, SessionStore};
use crate::types::{
    AnalyticsStats, Certificate, CertificateReceipt, Complaint, ComplaintReceipt,
    CreateCertificate, CreateComplaint, CreateRating, FarmerRatings, Message, TokenResponse, User,
};

/// Page the caller should navigate to after logging out.
pub const LANDING_PAGE: &str = "index.html";

pub struct PortalClient<T, S> {
    client: FarmClient,
    transport: T,
    store: S,
    session: Session,
}

impl PortalClient<UreqTransport, FileStore> {
    /// Blocking client for `config.base_url`, persisting to `config.session_file`.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            FarmClient::new(&config.base_url),
            UreqTransport::new(),
            FileStore::new(&config.session_file),
        )
    }
}

impl<T: Transport, S: SessionStore> PortalClient<T, S> {
    /// Loads whatever session the store already holds.
    pub fn new(client: FarmClient, transport: T, store: S) -> Result<Self, ApiError> {
        let session = store.load()?;
        Ok(Self {
            client,
            transport,
            store,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.token().is_some()
    }

    pub fn user_role(&self) -> Option<&str> {
        self.session.role()
    }

    /// Authenticate and persist the returned token and role. A failed login
    /// leaves the current session as it was.
    pub fn login(&mut self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let request = self.client.build_login(username, password)?;
        let token = self.client.parse_login(self.transport.execute(request)?)?;

        let session = Session::new(token.access_token.clone(), token.role.clone());
        self.store.save(&session)?;
        self.session = session;
        info!(username, role = %token.role, "logged in");
        Ok(token)
    }

    /// Forget the session and return the page to show next. The in-memory
    /// session is kept if the store cannot be cleared.
    pub fn logout(&mut self) -> Result<&'static str, ApiError> {
        self.store.clear()?;
        self.session = Session::default();
        info!("logged out");
        Ok(LANDING_PAGE)
    }

    pub fn get_current_user(&self) -> Result<User, ApiError> {
        let request = self.client.build_get_current_user(self.token());
        self.client.parse_get_current_user(self.transport.execute(request)?)
    }

    pub fn create_complaint(
        &self,
        category: &str,
        subject: &str,
        description: &str,
    ) -> Result<ComplaintReceipt, ApiError> {
        let input = CreateComplaint {
            category: category.to_string(),
            subject: subject.to_string(),
            description: description.to_string(),
        };
        let request = self.client.build_create_complaint(self.token(), &input)?;
        self.client.parse_create_complaint(self.transport.execute(request)?)
    }

    pub fn get_complaints(&self) -> Result<Vec<Complaint>, ApiError> {
        let request = self.client.build_get_complaints(self.token());
        self.client.parse_get_complaints(self.transport.execute(request)?)
    }

    pub fn update_complaint_status(
        &self,
        complaint_id: &str,
        status: &str,
    ) -> Result<Message, ApiError> {
        let request = self
            .client
            .build_update_complaint_status(self.token(), complaint_id, status)?;
        self.client.parse_update_complaint_status(self.transport.execute(request)?)
    }

    pub fn get_certificates(&self) -> Result<Vec<Certificate>, ApiError> {
        let request = self.client.build_get_certificates(self.token());
        self.client.parse_get_certificates(self.transport.execute(request)?)
    }

    /// `Ok(None)` when the certificate does not exist.
    pub fn verify_certificate(&self, cert_number: &str) -> Result<Option<Certificate>, ApiError> {
        let request = self.client.build_verify_certificate(cert_number);
        self.client.parse_verify_certificate(self.transport.execute(request)?)
    }

    pub fn create_certificate(
        &self,
        farmer_name: &str,
        farm_name: &str,
        level: &str,
        valid_until: &str,
    ) -> Result<CertificateReceipt, ApiError> {
        let input = CreateCertificate {
            farmer_name: farmer_name.to_string(),
            farm_name: farm_name.to_string(),
            level: level.to_string(),
            valid_until: valid_until.to_string(),
        };
        let request = self.client.build_create_certificate(self.token(), &input)?;
        self.client.parse_create_certificate(self.transport.execute(request)?)
    }

    pub fn revoke_certificate(&self, cert_number: &str) -> Result<Message, ApiError> {
        let request = self.client.build_revoke_certificate(self.token(), cert_number);
        self.client.parse_revoke_certificate(self.transport.execute(request)?)
    }

    pub fn submit_rating(&self, rating: &CreateRating) -> Result<Message, ApiError> {
        let request = self.client.build_submit_rating(self.token(), rating)?;
        self.client.parse_submit_rating(self.transport.execute(request)?)
    }

    pub fn get_farmer_ratings(&self, farmer_id: i64) -> Result<FarmerRatings, ApiError> {
        let request = self.client.build_get_farmer_ratings(self.token(), farmer_id);
        self.client.parse_get_farmer_ratings(self.transport.execute(request)?)
    }

    pub fn get_analytics(&self) -> Result<AnalyticsStats, ApiError> {
        let request = self.client.build_get_analytics(self.token());
        self.client.parse_get_analytics(self.transport.execute(request)?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::session::MemoryStore;

    /// Replays canned responses and records every request it was given.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses.borrow_mut().push_back(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            });
            self
        }

        fn last(&self) -> HttpRequest {
            self.seen.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("no scripted response".to_string()))
        }
    }

    fn portal(transport: &Scripted, store: MemoryStore) -> PortalClient<&Scripted, MemoryStore> {
        PortalClient::new(FarmClient::new("http://mock"), transport, store).unwrap()
    }

    #[test]
    fn login_persists_token_and_role() {
        let transport = Scripted::default().reply(200, r#"{"access_token":"T1","role":"inspector"}"#);
        let mut portal = portal(&transport, MemoryStore::new());
        assert!(!portal.is_logged_in());

        let body = portal.login("alice", "pw").unwrap();

        assert_eq!(body.access_token, "T1");
        assert_eq!(body.role, "inspector");
        assert!(portal.is_logged_in());
        assert_eq!(portal.token(), Some("T1"));
        assert_eq!(portal.user_role(), Some("inspector"));
        assert_eq!(portal.store().snapshot(), Session::new("T1", "inspector"));
        assert_eq!(transport.last().header("authorization"), None);
    }

    #[test]
    fn failed_login_keeps_previous_session() {
        let transport = Scripted::default().reply(401, r#"{"detail":"Invalid credentials"}"#);
        let mut portal = portal(&transport, MemoryStore::with_session(Session::new("OLD", "worker")));

        let err = portal.login("alice", "wrong").unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(portal.token(), Some("OLD"));
        assert_eq!(portal.store().snapshot().token(), Some("OLD"));
    }

    #[test]
    fn stored_session_is_picked_up_on_construction() {
        let transport = Scripted::default().reply(200, "[]");
        let portal = portal(&transport, MemoryStore::with_session(Session::new("T9", "admin")));

        assert!(portal.is_logged_in());
        assert!(portal.get_complaints().unwrap().is_empty());
        assert_eq!(transport.last().header("authorization"), Some("Bearer T9"));
    }

    #[test]
    fn logout_clears_session_and_drops_bearer() {
        let transport = Scripted::default()
            .reply(200, r#"{"access_token":"T1","role":"admin"}"#)
            .reply(200, "[]");
        let mut portal = portal(&transport, MemoryStore::new());
        portal.login("admin", "admin123").unwrap();

        assert_eq!(portal.logout().unwrap(), "index.html");
        assert!(!portal.is_logged_in());
        assert_eq!(portal.user_role(), None);
        assert!(portal.store().snapshot().is_empty());

        portal.get_certificates().unwrap();
        let request = transport.last();
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn empty_stored_token_is_logged_out() {
        let transport = Scripted::default().reply(401, r#"{"detail":"Not authenticated"}"#);
        let portal = portal(&transport, MemoryStore::with_session(Session::new("", "worker")));

        assert!(!portal.is_logged_in());
        assert_eq!(portal.token(), None);
        portal.get_current_user().unwrap_err();
        assert_eq!(transport.last().header("authorization"), None);
    }

    /// Store whose `clear` always fails.
    struct StuckStore(Session);

    impl SessionStore for StuckStore {
        fn load(&self) -> Result<Session, ApiError> {
            Ok(self.0.clone())
        }

        fn save(&self, _session: &Session) -> Result<(), ApiError> {
            Ok(())
        }

        fn clear(&self) -> Result<(), ApiError> {
            Err(ApiError::Session("read-only".to_string()))
        }
    }

    #[test]
    fn failed_logout_keeps_session() {
        let transport = Scripted::default();
        let mut portal = PortalClient::new(
            FarmClient::new("http://mock"),
            &transport,
            StuckStore(Session::new("T1", "admin")),
        )
        .unwrap();

        assert!(matches!(portal.logout(), Err(ApiError::Session(_))));
        assert!(portal.is_logged_in());
        assert_eq!(portal.token(), Some("T1"));
    }

    #[test]
    fn verify_certificate_with_space_not_found_is_none() {
        let transport = Scripted::default().reply(404, r#"{"detail":"Certificate not found"}"#);
        let portal = portal(&transport, MemoryStore::new());

        assert!(portal.verify_certificate("CERT 2025").unwrap().is_none());
        assert_eq!(transport.last().path, "http://mock/certificates/CERT%202025");
    }

    #[test]
    fn update_complaint_status_forbidden() {
        let transport = Scripted::default().reply(403, r#"{"detail":"Only admins can update complaints"}"#);
        let portal = portal(&transport, MemoryStore::with_session(Session::new("T1", "worker")));

        let err = portal.update_complaint_status("42", "resolved").unwrap_err();

        assert_eq!(err.to_string(), "Failed to update complaint");
        let request = transport.last();
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.path, "http://mock/complaints/42");
        assert_eq!(request.header("authorization"), Some("Bearer T1"));
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "resolved"}));
    }

    #[test]
    fn verify_certificate_not_found_is_none() {
        let transport = Scripted::default()
            .reply(404, r#"{"detail":"Certificate not found"}"#)
            .reply(502, "bad gateway");
        let portal = portal(&transport, MemoryStore::with_session(Session::new("T1", "admin")));

        assert!(portal.verify_certificate("CERT-0000-000").unwrap().is_none());
        // Public endpoint: the token is never sent.
        assert!(transport.last().headers.is_empty());

        let err = portal.verify_certificate("CERT-0000-000").unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn transport_failure_propagates() {
        let transport = Scripted::default();
        let portal = portal(&transport, MemoryStore::new());
        assert!(matches!(portal.get_analytics(), Err(ApiError::Transport(_))));
    }
}
