//! HTTP client for the rental API (one method per backend endpoint).
//!
//! Every request reads the bearer token from local storage at send time, the
//! same way the browser apps read it before each call, so a login or logout in
//! the session store is picked up without rebuilding the client.
//! No retry, no timeout, no backoff: failures go straight back to the caller.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::AppProfile;
use crate::drafts::{AmenityDraft, BookingRequest, TowerDraft, UnitDraft};
use crate::error::ApiError;
use crate::models::{
    Acknowledgement, Amenity, ApiErrorBody, Booking, BookingStatus, Credentials, Identity, Lease,
    LeaseStatus, LoginResponse, Payment, RecordId, Registration, Stats, Tower, Unit, UnitStatus,
};
use crate::storage::Storage;

/// Authentication endpoints, split out so the session store can be driven by a fake.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn register(&self, registration: &Registration) -> Result<LoginResponse, ApiError>;
}

/// Query string of `GET /units`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct UnitQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tower_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UnitStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
}

impl UnitQuery {
    pub fn in_tower(tower_id: RecordId) -> Self {
        Self {
            tower_id: Some(tower_id),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct StatusFilter<S: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<S>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    storage: Storage,
    token_key: &'static str,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, storage: Storage, profile: AppProfile) -> Self {
        Self::with_http(Client::new(), base_url, storage, profile)
    }

    pub fn with_http(
        http: Client,
        base_url: impl Into<String>,
        storage: Storage,
        profile: AppProfile,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            storage,
            token_key: profile.token_key(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Current token, if one is stored. A storage failure counts as "no token".
    fn bearer(&self) -> Option<String> {
        match self.storage.get_item(self.token_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read stored token, sending request without it");
                None
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(%method, path, "api request");
        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "api transport failure");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(%method, path, error = %e, "could not read error body");
                    String::new()
                }
            };
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::into_message);
            debug!(%method, path, status = status.as_u16(), ?message, "api error response");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path);
        self.send(Method::GET, path, request).await
    }

    async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path).query(query);
        self.send(Method::GET, path, request).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, request).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, request).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, request).await
    }

    // --- auth ---

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post_json("auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<LoginResponse, ApiError> {
        self.post_json("auth/register", registration).await
    }

    /// Profile of the account the stored token belongs to.
    pub async fn me(&self) -> Result<Identity, ApiError> {
        self.get_json("auth/me").await
    }

    // --- towers ---

    pub async fn list_towers(&self) -> Result<Vec<Tower>, ApiError> {
        self.get_json("towers").await
    }

    pub async fn get_tower(&self, id: RecordId) -> Result<Tower, ApiError> {
        self.get_json(&format!("towers/{id}")).await
    }

    pub async fn create_tower(&self, draft: &TowerDraft) -> Result<Acknowledgement, ApiError> {
        self.post_json("towers", draft).await
    }

    pub async fn update_tower(
        &self,
        id: RecordId,
        draft: &TowerDraft,
    ) -> Result<Acknowledgement, ApiError> {
        self.put_json(&format!("towers/{id}"), draft).await
    }

    pub async fn delete_tower(&self, id: RecordId) -> Result<Acknowledgement, ApiError> {
        self.delete_json(&format!("towers/{id}")).await
    }

    // --- units ---

    pub async fn list_units(&self, query: &UnitQuery) -> Result<Vec<Unit>, ApiError> {
        self.get_json_with_query("units", query).await
    }

    pub async fn get_unit(&self, id: RecordId) -> Result<Unit, ApiError> {
        self.get_json(&format!("units/{id}")).await
    }

    pub async fn create_unit(&self, draft: &UnitDraft) -> Result<Acknowledgement, ApiError> {
        self.post_json("units", draft).await
    }

    pub async fn update_unit(
        &self,
        id: RecordId,
        draft: &UnitDraft,
    ) -> Result<Acknowledgement, ApiError> {
        self.put_json(&format!("units/{id}"), draft).await
    }

    pub async fn delete_unit(&self, id: RecordId) -> Result<Acknowledgement, ApiError> {
        self.delete_json(&format!("units/{id}")).await
    }

    // --- amenities ---

    pub async fn list_amenities(&self) -> Result<Vec<Amenity>, ApiError> {
        self.get_json("amenities").await
    }

    pub async fn get_amenity(&self, id: RecordId) -> Result<Amenity, ApiError> {
        self.get_json(&format!("amenities/{id}")).await
    }

    pub async fn create_amenity(&self, draft: &AmenityDraft) -> Result<Acknowledgement, ApiError> {
        self.post_json("amenities", draft).await
    }

    pub async fn update_amenity(
        &self,
        id: RecordId,
        draft: &AmenityDraft,
    ) -> Result<Acknowledgement, ApiError> {
        self.put_json(&format!("amenities/{id}"), draft).await
    }

    pub async fn delete_amenity(&self, id: RecordId) -> Result<Acknowledgement, ApiError> {
        self.delete_json(&format!("amenities/{id}")).await
    }

    // --- bookings ---

    /// All bookings for an admin token, the caller's own for anyone else.
    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, ApiError> {
        self.get_json_with_query("bookings", &StatusFilter { status })
            .await
    }

    pub async fn get_booking(&self, id: RecordId) -> Result<Booking, ApiError> {
        self.get_json(&format!("bookings/{id}")).await
    }

    pub async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<Acknowledgement, ApiError> {
        self.post_json("bookings", request).await
    }

    pub async fn approve_booking(
        &self,
        id: RecordId,
        comments: &str,
    ) -> Result<Acknowledgement, ApiError> {
        self.put_json(
            &format!("bookings/{id}/approve"),
            &json!({ "admin_comments": comments }),
        )
        .await
    }

    pub async fn reject_booking(
        &self,
        id: RecordId,
        comments: &str,
    ) -> Result<Acknowledgement, ApiError> {
        self.put_json(&format!("bookings/{id}/reject"), &json!({ "comments": comments }))
            .await
    }

    // --- leases, stats, payments ---

    pub async fn list_leases(&self, status: Option<LeaseStatus>) -> Result<Vec<Lease>, ApiError> {
        self.get_json_with_query("leases", &StatusFilter { status })
            .await
    }

    pub async fn get_lease(&self, id: RecordId) -> Result<Lease, ApiError> {
        self.get_json(&format!("leases/{id}")).await
    }

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get_json("stats").await
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, ApiError> {
        self.get_json("payments").await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        ApiClient::login(self, credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<LoginResponse, ApiError> {
        ApiClient::register(self, registration).await
    }
}
