//! Terminal front end: the per-process `AppContext`, the stdin/stderr dialog,
//! and table rendering for the list screens.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use tabled::{
    builder::Builder,
    settings::{object::Rows, Color, Style},
};
use tracing::debug;

use crate::api::ApiClient;
use crate::config::{AppProfile, ClientConfig};
use crate::crud::Dialog;
use crate::error::{AuthError, ConsoleError};
use crate::models::{
    Amenity, Booking, Credentials, Identity, Lease, Payment, Registration, Stats, Tower, Unit,
};
use crate::router::{Navigation, Navigator, View};
use crate::screens::Overview;
use crate::session::SessionStore;
use crate::storage::Storage;

/// Everything one front-end process needs, built once at startup.
pub struct AppContext {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub session: SessionStore,
    pub navigator: Navigator,
}

impl AppContext {
    /// Open the on-disk store under `config.data_dir` and restore the session.
    pub fn open(profile: AppProfile, config: ClientConfig) -> Result<Self, ConsoleError> {
        let storage = Storage::open(&config.data_dir, profile.namespace())?;
        Ok(Self::with_storage(profile, config, storage))
    }

    pub fn with_storage(profile: AppProfile, config: ClientConfig, storage: Storage) -> Self {
        let api = ApiClient::new(config.base_url(), storage.clone(), profile);
        let session = SessionStore::restore(profile, storage);
        Self {
            config,
            api,
            session,
            navigator: Navigator::new(profile),
        }
    }

    pub fn profile(&self) -> AppProfile {
        self.session.profile()
    }

    /// Navigate to `path` through the guard. A redirect to login surfaces as
    /// [`ConsoleError::LoginRequired`].
    pub fn enter(&mut self, path: &str) -> Result<View, ConsoleError> {
        match self.navigator.navigate(&self.session, path) {
            Navigation::Entered(view) => Ok(view),
            Navigation::Redirected { return_url, .. } => {
                Err(ConsoleError::LoginRequired { return_url })
            }
        }
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<Navigation, ConsoleError> {
        self.session.login(&self.api, credentials).await?;
        Ok(self.navigator.after_login(&self.session))
    }

    pub async fn register(
        &mut self,
        registration: &Registration,
    ) -> Result<Navigation, ConsoleError> {
        self.session.register(&self.api, registration).await?;
        Ok(self.navigator.after_login(&self.session))
    }

    pub fn logout(&mut self) -> View {
        self.navigator.to_login();
        self.session.logout()
    }
}

/// Alert text for a failed login or registration.
pub fn auth_failure_message(profile: AppProfile, registering: bool, err: &AuthError) -> String {
    let fallback = match (profile, registering) {
        (_, true) => "Registration failed",
        (AppProfile::Admin, false) => "Login failed. Please check your credentials.",
        (AppProfile::Tenant, false) => "Login failed",
    };
    err.alert_message(fallback)
}

/// Confirm on stdin, alert on stderr. `assume_yes` answers every prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalDialog {
    pub assume_yes: bool,
}

impl TerminalDialog {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Dialog for TerminalDialog {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            debug!(message, "confirmation assumed");
            return true;
        }
        eprint!("{message} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// --- tables ---

fn cell<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn write_table<W: Write>(
    out: &mut W,
    what: &str,
    header: &[&str],
    rows: Vec<Vec<String>>,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No {what} found.");
    }
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    writeln!(out, "{table}")
}

pub fn render_towers<W: Write>(out: &mut W, towers: &[Tower]) -> io::Result<()> {
    let rows = towers
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.name.clone(),
                t.address.clone(),
                cell(&t.total_floors),
                cell(&t.unit_count),
                cell(&t.description),
            ]
        })
        .collect();
    write_table(
        out,
        "towers",
        &["ID", "Name", "Address", "Floors", "Units", "Description"],
        rows,
    )
}

pub fn render_units<W: Write>(out: &mut W, units: &[Unit]) -> io::Result<()> {
    let rows = units
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.tower_name.clone().unwrap_or_else(|| u.tower_id.to_string()),
                u.unit_number.clone(),
                cell(&u.floor),
                cell(&u.bedrooms),
                cell(&u.bathrooms),
                cell(&u.size_sqft),
                money(u.rent_amount),
                u.status.to_string(),
            ]
        })
        .collect();
    write_table(
        out,
        "units",
        &["ID", "Tower", "Unit", "Floor", "Beds", "Baths", "Sq ft", "Rent", "Status"],
        rows,
    )
}

pub fn render_amenities<W: Write>(out: &mut W, amenities: &[Amenity]) -> io::Result<()> {
    let rows = amenities
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                cell(&a.availability_hours),
                if a.is_active { "yes" } else { "no" }.to_string(),
                cell(&a.description),
            ]
        })
        .collect();
    write_table(
        out,
        "amenities",
        &["ID", "Name", "Hours", "Active", "Description"],
        rows,
    )
}

pub fn render_bookings<W: Write>(out: &mut W, bookings: &[Booking]) -> io::Result<()> {
    let rows = bookings
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                cell(&b.user_name),
                cell(&b.tower_name),
                b.unit_number.clone().unwrap_or_else(|| b.unit_id.to_string()),
                cell(&b.requested_move_in_date),
                cell(&b.lease_duration),
                b.status.to_string(),
                cell(&b.admin_comments),
            ]
        })
        .collect();
    write_table(
        out,
        "bookings",
        &["ID", "Tenant", "Tower", "Unit", "Move-in", "Months", "Status", "Comments"],
        rows,
    )
}

pub fn render_leases<W: Write>(out: &mut W, leases: &[Lease]) -> io::Result<()> {
    let rows = leases
        .iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                cell(&l.user_name),
                cell(&l.tower_name),
                l.unit_number.clone().unwrap_or_else(|| l.unit_id.to_string()),
                l.start_date.to_string(),
                l.end_date.to_string(),
                money(l.monthly_rent),
                l.status.to_string(),
            ]
        })
        .collect();
    write_table(
        out,
        "leases",
        &["ID", "Tenant", "Tower", "Unit", "Start", "End", "Rent", "Status"],
        rows,
    )
}

pub fn render_payments<W: Write>(out: &mut W, payments: &[Payment]) -> io::Result<()> {
    let rows = payments
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.lease_id.to_string(),
                money(p.amount),
                p.payment_date.to_string(),
                cell(&p.payment_method),
                cell(&p.status),
            ]
        })
        .collect();
    write_table(
        out,
        "payments",
        &["ID", "Lease", "Amount", "Date", "Method", "Status"],
        rows,
    )
}

fn write_figures<W: Write>(out: &mut W, figures: &[(&str, String)]) -> io::Result<()> {
    let mut builder = Builder::default();
    for (label, value) in figures {
        builder.push_record([label.to_string(), value.clone()]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    writeln!(out, "{table}")
}

pub fn render_stats<W: Write>(out: &mut W, stats: &Stats) -> io::Result<()> {
    write_figures(
        out,
        &[
            ("Towers", stats.total_towers.to_string()),
            ("Units", stats.total_units.to_string()),
            ("Available", stats.available_units.to_string()),
            ("Occupied", stats.occupied_units.to_string()),
            ("Occupancy", format!("{}%", stats.occupancy_rate())),
            ("Pending bookings", stats.pending_bookings.to_string()),
            ("Active leases", stats.active_leases.to_string()),
        ],
    )
}

pub fn render_overview<W: Write>(out: &mut W, overview: &Overview) -> io::Result<()> {
    write_figures(
        out,
        &[
            ("Towers", overview.total_towers.to_string()),
            ("Units", overview.total_units.to_string()),
            ("Available", overview.available_units.to_string()),
            ("Occupied", overview.occupied_units.to_string()),
            ("Occupancy", format!("{}%", overview.occupancy_rate)),
            ("Pending bookings", overview.pending_bookings.to_string()),
            ("Active leases", overview.active_leases.to_string()),
            ("Amenities", overview.amenities.to_string()),
        ],
    )
}

pub fn render_identity<W: Write>(out: &mut W, identity: &Identity) -> io::Result<()> {
    write_figures(
        out,
        &[
            ("ID", identity.id.to_string()),
            ("Name", identity.name.clone()),
            ("Email", identity.email.clone()),
            ("Role", identity.role.to_string()),
            ("Phone", cell(&identity.phone)),
        ],
    )
}
