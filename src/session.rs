//! Session store: the in-memory identity, mirrored to local storage.
//!
//! A `SessionStore` belongs to the `AppContext` built at startup; it is not a
//! global. Only `login`, `register` and `logout` mutate it. The guard and the
//! screens read it.

use tracing::{info, warn};

use crate::api::AuthApi;
use crate::config::AppProfile;
use crate::error::{AuthError, StorageError};
use crate::models::{Credentials, Identity, LoginResponse, Registration, Session};
use crate::router::View;
use crate::storage::Storage;

pub struct SessionStore {
    profile: AppProfile,
    storage: Storage,
    identity: Option<Identity>,
}

impl SessionStore {
    /// Rebuild the in-memory identity from storage. A stored identity that
    /// no longer parses is treated as absent.
    pub fn restore(profile: AppProfile, storage: Storage) -> Self {
        let identity = match storage.get_item(profile.identity_key()) {
            Ok(Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!(error = %e, key = profile.identity_key(), "discarding unreadable stored identity");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read stored identity");
                None
            }
        };

        Self {
            profile,
            storage,
            identity,
        }
    }

    pub fn profile(&self) -> AppProfile {
        self.profile
    }

    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Token as currently persisted.
    pub fn token(&self) -> Option<String> {
        match self.storage.get_item(self.profile.token_key()) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read stored token");
                None
            }
        }
    }

    /// True iff a token is persisted and the in-memory identity has a role
    /// this app accepts.
    pub fn is_authenticated(&self) -> bool {
        let role_ok = self
            .identity
            .as_ref()
            .is_some_and(|identity| self.profile.accepts(&identity.role));
        role_ok && self.token().is_some()
    }

    pub async fn login<A>(&mut self, api: &A, credentials: &Credentials) -> Result<Session, AuthError>
    where
        A: AuthApi + ?Sized,
    {
        let response = api.login(credentials).await?;
        self.establish(response)
    }

    pub async fn register<A>(
        &mut self,
        api: &A,
        registration: &Registration,
    ) -> Result<Session, AuthError>
    where
        A: AuthApi + ?Sized,
    {
        let response = api.register(registration).await?;
        self.establish(response)
    }

    /// Check the role, then persist token and identity together and update memory.
    /// A rejected role leaves storage and memory untouched.
    fn establish(&mut self, response: LoginResponse) -> Result<Session, AuthError> {
        let LoginResponse {
            access_token, user, ..
        } = response;

        if !self.profile.accepts(&user.role) {
            warn!(
                user_id = user.id,
                role = %user.role,
                app = self.profile.display_name(),
                "login refused for role"
            );
            return Err(AuthError::NotAuthorizedRole {
                role: user.role.to_string(),
                app: self.profile.display_name(),
            });
        }

        let serialized = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage.set_items(&[
            (self.profile.token_key(), access_token.as_str()),
            (self.profile.identity_key(), serialized.as_str()),
        ])?;

        info!(user_id = user.id, role = %user.role, "session established");
        self.identity = Some(user.clone());
        Ok(Session {
            identity: Some(user),
            token: Some(access_token),
        })
    }

    /// Forget the session. Never fails; a storage error is logged and memory
    /// is cleared regardless. Returns the view to show next.
    pub fn logout(&mut self) -> View {
        if let Err(e) = self
            .storage
            .remove_items(&[self.profile.token_key(), self.profile.identity_key()])
        {
            warn!(error = %e, "could not clear stored session");
        }
        if let Some(identity) = self.identity.take() {
            info!(user_id = identity.id, "logged out");
        }
        View::Login
    }
}
