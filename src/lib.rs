//! estate_console: terminal clients for the residential rental REST API
//!
//! Two front ends share this library: the admin console (towers, units,
//! amenities, booking review, leases, dashboard) and the tenant portal
//! (browse towers and units, request bookings, track them).
//!
//! Session state lives in a local sled store keyed per front end, so a login
//! survives between invocations the way a browser keeps `localStorage`.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
// Local key-value store standing in for browser localStorage
pub mod storage;
pub mod auth;
// HTTP client: one method per backend endpoint, bearer token from storage
pub mod api;
pub mod session;
pub mod router;
pub mod drafts;
// List + modal controllers (towers, units, amenities) and the special screens
pub mod crud;
pub mod screens;
pub mod console;

pub use api::ApiClient;
pub use config::{AppProfile, ClientConfig};
pub use console::AppContext;
pub use error::{ApiError, ConsoleError};
pub use session::SessionStore;
