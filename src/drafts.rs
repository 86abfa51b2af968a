//! Editable forms for the create/update screens.
//!
//! A draft is what the modal is bound to. It is validated as a whole before
//! anything is sent, so a half-filled form never reaches the backend.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::ValidationError;
use crate::models::{Amenity, RecordId, Tower, Unit, UnitStatus};

/// A form the list/modal controller can submit.
pub trait Draft: Serialize + Clone {
    /// Singular entity name used in messages.
    const ENTITY: &'static str;

    /// Form contents when the "add" modal opens.
    fn blank() -> Self;

    /// Every missing or invalid required field, or `Ok` when submittable.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Collects field problems and turns them into one error.
struct Problems {
    entity: &'static str,
    problems: Vec<String>,
}

impl Problems {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            problems: Vec::new(),
        }
    }

    fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.problems.push(format!("{field} is required"));
        }
    }

    fn check(&mut self, ok: bool, problem: impl Into<String>) {
        if !ok {
            self.problems.push(problem.into());
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                entity: self.entity,
                problems: self.problems,
            })
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TowerDraft {
    pub name: String,
    pub address: String,
    pub total_floors: Option<i32>,
    pub description: Option<String>,
}

impl Draft for TowerDraft {
    const ENTITY: &'static str = "tower";

    fn blank() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            total_floors: Some(1),
            description: Some(String::new()),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Problems::new(Self::ENTITY);
        problems.require_text("name", &self.name);
        problems.require_text("address", &self.address);
        if let Some(floors) = self.total_floors {
            problems.check(floors >= 1, "total_floors must be at least 1");
        }
        problems.finish()
    }
}

impl From<&Tower> for TowerDraft {
    fn from(tower: &Tower) -> Self {
        Self {
            name: tower.name.clone(),
            address: tower.address.clone(),
            total_floors: tower.total_floors,
            description: tower.description.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UnitDraft {
    pub tower_id: Option<RecordId>,
    pub unit_number: String,
    pub floor: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub size_sqft: Option<i32>,
    pub rent_amount: Option<f64>,
    pub status: UnitStatus,
    pub description: Option<String>,
}

impl UnitDraft {
    /// Blank form preselecting the first tower of the loaded list.
    pub fn for_tower(tower_id: Option<RecordId>) -> Self {
        Self {
            tower_id,
            ..Self::blank()
        }
    }
}

impl Draft for UnitDraft {
    const ENTITY: &'static str = "unit";

    fn blank() -> Self {
        Self {
            tower_id: None,
            unit_number: String::new(),
            floor: Some(1),
            bedrooms: Some(1),
            bathrooms: Some(1),
            size_sqft: Some(500),
            rent_amount: Some(10000.0),
            status: UnitStatus::Available,
            description: Some(String::new()),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Problems::new(Self::ENTITY);
        problems.check(self.tower_id.is_some(), "tower_id is required");
        problems.require_text("unit_number", &self.unit_number);
        match self.rent_amount {
            None => problems.check(false, "rent_amount is required"),
            Some(rent) => problems.check(
                rent.is_finite() && rent >= 0.0,
                "rent_amount must be a non-negative number",
            ),
        }
        for (field, value) in [
            ("bedrooms", self.bedrooms),
            ("bathrooms", self.bathrooms),
            ("size_sqft", self.size_sqft),
        ] {
            if let Some(value) = value {
                problems.check(value >= 0, format!("{field} cannot be negative"));
            }
        }
        problems.finish()
    }
}

impl From<&Unit> for UnitDraft {
    fn from(unit: &Unit) -> Self {
        Self {
            tower_id: Some(unit.tower_id),
            unit_number: unit.unit_number.clone(),
            floor: unit.floor,
            bedrooms: unit.bedrooms,
            bathrooms: unit.bathrooms,
            size_sqft: unit.size_sqft,
            rent_amount: Some(unit.rent_amount),
            status: unit.status,
            description: unit.description.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AmenityDraft {
    pub name: String,
    pub description: Option<String>,
    pub availability_hours: Option<String>,
    pub is_active: bool,
}

impl Draft for AmenityDraft {
    const ENTITY: &'static str = "amenity";

    fn blank() -> Self {
        Self {
            name: String::new(),
            description: Some(String::new()),
            availability_hours: Some(String::new()),
            is_active: true,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Problems::new(Self::ENTITY);
        problems.require_text("name", &self.name);
        problems.finish()
    }
}

impl From<&Amenity> for AmenityDraft {
    fn from(amenity: &Amenity) -> Self {
        Self {
            name: amenity.name.clone(),
            description: amenity.description.clone(),
            availability_hours: amenity.availability_hours.clone(),
            is_active: amenity.is_active,
        }
    }
}

pub const DEFAULT_LEASE_MONTHS: u32 = 12;

/// Tenant booking request (`POST /bookings`).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub unit_id: RecordId,
    pub requested_move_in_date: NaiveDate,
    pub lease_duration: u32,
}

impl BookingRequest {
    /// Move-in defaults to the day after `today`, lease to twelve months.
    pub fn for_unit(unit_id: RecordId, today: NaiveDate) -> Self {
        Self {
            unit_id,
            requested_move_in_date: today.checked_add_days(Days::new(1)).unwrap_or(today),
            lease_duration: DEFAULT_LEASE_MONTHS,
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        let mut problems = Problems::new("booking");
        problems.check(
            self.requested_move_in_date > today,
            "move-in date must be in the future",
        );
        problems.check(
            (1..=60).contains(&self.lease_duration),
            "lease duration must be between 1 and 60 months",
        );
        problems.finish()
    }
}
