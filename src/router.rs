//! Views, route tables and the guard in front of protected views.

use std::fmt;

use tracing::debug;

use crate::config::AppProfile;
use crate::models::RecordId;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Towers,
    /// Admin: all units. Tenant: units of one tower.
    Units { tower_id: Option<RecordId> },
    Amenities,
    Bookings,
    Leases,
    MyBookings,
}

impl View {
    pub fn path(&self) -> String {
        match self {
            View::Login => "/login".to_string(),
            View::Dashboard => "/dashboard".to_string(),
            View::Towers => "/towers".to_string(),
            View::Units { tower_id: None } => "/units".to_string(),
            View::Units {
                tower_id: Some(id),
            } => format!("/units/{id}"),
            View::Amenities => "/amenities".to_string(),
            View::Bookings => "/bookings".to_string(),
            View::Leases => "/leases".to_string(),
            View::MyBookings => "/my-bookings".to_string(),
        }
    }

    /// Everything except the login view sits behind the guard.
    pub fn is_protected(&self) -> bool {
        !matches!(self, View::Login)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Path -> view mapping of one front end. Empty and unknown paths go to login.
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    profile: AppProfile,
}

impl RouteTable {
    pub fn new(profile: AppProfile) -> Self {
        Self { profile }
    }

    pub fn resolve(&self, path: &str) -> Option<View> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (self.profile, segments.as_slice()) {
            (_, ["login"]) => Some(View::Login),
            (_, ["towers"]) => Some(View::Towers),
            (_, ["amenities"]) => Some(View::Amenities),
            (AppProfile::Admin, ["dashboard"]) => Some(View::Dashboard),
            (AppProfile::Admin, ["units"]) => Some(View::Units { tower_id: None }),
            (AppProfile::Admin, ["bookings"]) => Some(View::Bookings),
            (AppProfile::Admin, ["leases"]) => Some(View::Leases),
            (AppProfile::Tenant, ["units", id]) => id
                .parse::<RecordId>()
                .ok()
                .map(|id| View::Units { tower_id: Some(id) }),
            (AppProfile::Tenant, ["my-bookings"]) => Some(View::MyBookings),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        to: View,
        /// Originally requested path, for the post-login redirect.
        return_url: Option<String>,
    },
}

/// Stateless pre-navigation check; reads only the session store.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(session: &SessionStore, view: &View) -> GuardDecision {
        if !view.is_protected() || session.is_authenticated() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect {
                to: View::Login,
                return_url: Some(view.path()),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Entered(View),
    Redirected {
        view: View,
        return_url: Option<String>,
    },
}

impl Navigation {
    pub fn view(&self) -> &View {
        match self {
            Navigation::Entered(view) => view,
            Navigation::Redirected { view, .. } => view,
        }
    }
}

/// Current view plus the path to resume after login.
pub struct Navigator {
    routes: RouteTable,
    current: View,
    return_url: Option<String>,
}

impl Navigator {
    pub fn new(profile: AppProfile) -> Self {
        Self {
            routes: RouteTable::new(profile),
            current: View::Login,
            return_url: None,
        }
    }

    pub fn current(&self) -> &View {
        &self.current
    }

    pub fn return_url(&self) -> Option<&str> {
        self.return_url.as_deref()
    }

    pub fn navigate(&mut self, session: &SessionStore, path: &str) -> Navigation {
        let Some(view) = self.routes.resolve(path) else {
            debug!(path, "unknown route, redirecting to login");
            self.current = View::Login;
            self.return_url = None;
            return Navigation::Redirected {
                view: View::Login,
                return_url: None,
            };
        };

        match RouteGuard::check(session, &view) {
            GuardDecision::Allow => {
                self.current = view.clone();
                Navigation::Entered(view)
            }
            GuardDecision::Redirect { to, return_url } => {
                debug!(path, "guard denied navigation");
                self.current = to.clone();
                self.return_url = return_url.clone();
                Navigation::Redirected {
                    view: to,
                    return_url,
                }
            }
        }
    }

    /// After a successful login: the preserved path, else the app's home view.
    pub fn after_login(&mut self, session: &SessionStore) -> Navigation {
        let target = self
            .return_url
            .take()
            .unwrap_or_else(|| session.profile().home_path().to_string());
        self.navigate(session, &target)
    }

    pub fn to_login(&mut self) {
        self.current = View::Login;
        self.return_url = None;
    }
}
