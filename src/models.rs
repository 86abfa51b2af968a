//! Wire shapes of the rental API.
//!
//! These are plain DTOs: the client never owns them, it only keeps the last
//! fetched list of each in screen-local state. Field names follow the JSON the
//! backend emits (`requested_move_in_date`, `monthly_rent`, `access_token`).

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub type RecordId = i64;

/// Account role as sent by the backend. Kept verbatim; only `admin` is special.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const ADMIN: &'static str = "admin";

    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::new(role)
    }
}

/// The authenticated user's profile. Replaced wholesale on the next login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: RecordId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Token + identity pairing, as held by the session store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub token: Option<String>,
}

#[derive(Serialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body. The tenant booking screen also honours the `msg` key.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.msg)
    }
}

/// Reply to create/update/delete calls: a `message` plus the touched record,
/// which the screens ignore because they re-fetch the list.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

// --- status enums ---

macro_rules! status_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

status_enum!(UnitStatus {
    Available => "available",
    Occupied => "occupied",
    Maintenance => "maintenance",
});

status_enum!(BookingStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

status_enum!(LeaseStatus {
    Active => "active",
    Expired => "expired",
    Terminated => "terminated",
});

/// Records that carry one of the enumerated status fields.
pub trait HasStatus {
    type Status: Copy + PartialEq;

    fn status(&self) -> Self::Status;
}

/// Keep the records whose status equals `status`, in their original order.
pub fn filter_by_status<T: HasStatus>(items: &[T], status: T::Status) -> Vec<&T> {
    items.iter().filter(|item| item.status() == status).collect()
}

/// Number of records whose status equals `status`.
pub fn count_by_status<T: HasStatus>(items: &[T], status: T::Status) -> usize {
    items.iter().filter(|item| item.status() == status).count()
}

// --- domain records ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tower {
    pub id: RecordId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub total_floors: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: RecordId,
    pub tower_id: RecordId,
    #[serde(default)]
    pub tower_name: Option<String>,
    pub unit_number: String,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub size_sqft: Option<i32>,
    pub rent_amount: f64,
    pub status: UnitStatus,
    #[serde(default)]
    pub description: Option<String>,
}

impl HasStatus for Unit {
    type Status = UnitStatus;

    fn status(&self) -> UnitStatus {
        self.status
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Amenity {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub availability_hours: Option<String>,
    #[serde(default = "default_true", deserialize_with = "active_or_default")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// the column is nullable; null reads as active
fn active_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: RecordId,
    pub user_id: RecordId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_phone: Option<String>,
    pub unit_id: RecordId,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub tower_name: Option<String>,
    #[serde(default)]
    pub rent_amount: Option<f64>,
    #[serde(default)]
    pub requested_move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub lease_duration: Option<u32>,
    pub status: BookingStatus,
    #[serde(default)]
    pub admin_comments: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl HasStatus for Booking {
    type Status = BookingStatus;

    fn status(&self) -> BookingStatus {
        self.status
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lease {
    pub id: RecordId,
    #[serde(default)]
    pub booking_id: Option<RecordId>,
    pub user_id: RecordId,
    #[serde(default)]
    pub user_name: Option<String>,
    pub unit_id: RecordId,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub tower_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: f64,
    #[serde(default)]
    pub security_deposit: Option<f64>,
    pub status: LeaseStatus,
}

impl HasStatus for Lease {
    type Status = LeaseStatus;

    fn status(&self) -> LeaseStatus {
        self.status
    }
}

/// `GET /stats`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Stats {
    pub total_towers: u64,
    pub total_units: u64,
    pub occupied_units: u64,
    pub available_units: u64,
    pub pending_bookings: u64,
    pub active_leases: u64,
}

/// Payment recorded against a lease (read-only on the client).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: RecordId,
    pub lease_id: RecordId,
    pub amount: f64,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
