//! Screens that do not fit the list/modal CRUD shape: booking review, the
//! tenant's unit browser with its booking form, and the dashboard figures.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::api::{ApiClient, UnitQuery};
use crate::crud::Dialog;
use crate::drafts::BookingRequest;
use crate::error::{ApiError, ConsoleError, CrudError};
use crate::models::{
    count_by_status, Acknowledgement, Amenity, Booking, BookingStatus, Lease, LeaseStatus,
    RecordId, Stats, Tower, Unit, UnitStatus,
};
use crate::router::View;

/// Rounded share of occupied units, 0 when there are none.
pub fn occupancy_rate(occupied: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((occupied as f64 / total as f64) * 100.0).round() as u32
}

impl Stats {
    pub fn occupancy_rate(&self) -> u32 {
        occupancy_rate(self.occupied_units, self.total_units)
    }
}

/// Amenities the tenant portal shows: active ones only, order kept.
pub fn active_amenities(amenities: Vec<Amenity>) -> Vec<Amenity> {
    amenities.into_iter().filter(|a| a.is_active).collect()
}

// --- dashboard ---

/// Figures computed client-side from the raw lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub total_towers: usize,
    pub total_units: usize,
    pub available_units: usize,
    pub occupied_units: usize,
    pub pending_bookings: usize,
    pub active_leases: usize,
    pub amenities: usize,
    pub occupancy_rate: u32,
}

impl Overview {
    pub fn from_lists(
        towers: &[Tower],
        units: &[Unit],
        amenities: &[Amenity],
        bookings: &[Booking],
        leases: &[Lease],
    ) -> Self {
        let occupied = count_by_status(units, UnitStatus::Occupied);
        Self {
            total_towers: towers.len(),
            total_units: units.len(),
            available_units: count_by_status(units, UnitStatus::Available),
            occupied_units: occupied,
            pending_bookings: count_by_status(bookings, BookingStatus::Pending),
            active_leases: count_by_status(leases, LeaseStatus::Active),
            amenities: amenities.len(),
            occupancy_rate: occupancy_rate(occupied as u64, units.len() as u64),
        }
    }

    /// Fetch the five lists concurrently and fail on the first error.
    pub async fn gather(api: &ApiClient) -> Result<Self, ApiError> {
        let all_units = UnitQuery::default();
        let (towers, units, amenities, bookings, leases) = tokio::try_join!(
            api.list_towers(),
            api.list_units(&all_units),
            api.list_amenities(),
            api.list_bookings(None),
            api.list_leases(None),
        )?;
        Ok(Self::from_lists(&towers, &units, &amenities, &bookings, &leases))
    }
}

// --- admin booking review ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn default_comment(self) -> &'static str {
        match self {
            ReviewAction::Approve => "Approved",
            ReviewAction::Reject => "Rejected",
        }
    }
}

#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn bookings(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>, ApiError>;
    async fn approve(&self, id: RecordId, comments: &str) -> Result<Acknowledgement, ApiError>;
    async fn reject(&self, id: RecordId, comments: &str) -> Result<Acknowledgement, ApiError>;
}

#[async_trait]
impl ReviewApi for ApiClient {
    async fn bookings(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>, ApiError> {
        self.list_bookings(status).await
    }

    async fn approve(&self, id: RecordId, comments: &str) -> Result<Acknowledgement, ApiError> {
        self.approve_booking(id, comments).await
    }

    async fn reject(&self, id: RecordId, comments: &str) -> Result<Acknowledgement, ApiError> {
        self.reject_booking(id, comments).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewModal {
    pub booking: Booking,
    pub action: ReviewAction,
    pub comments: String,
}

#[derive(Default)]
pub struct BookingReview {
    bookings: Vec<Booking>,
    modal: Option<ReviewModal>,
}

impl BookingReview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn modal(&self) -> Option<&ReviewModal> {
        self.modal.as_ref()
    }

    pub async fn load<A>(&mut self, api: &A, status: Option<BookingStatus>) -> Result<&[Booking], ApiError>
    where
        A: ReviewApi + ?Sized,
    {
        self.bookings = api.bookings(status).await?;
        Ok(&self.bookings)
    }

    /// Open the approve/reject modal. Only pending bookings can be reviewed;
    /// returns false otherwise.
    pub fn open(&mut self, booking_id: RecordId, action: ReviewAction) -> bool {
        let Some(booking) = self
            .bookings
            .iter()
            .find(|b| b.id == booking_id && b.status == BookingStatus::Pending)
        else {
            return false;
        };
        self.modal = Some(ReviewModal {
            booking: booking.clone(),
            action,
            comments: String::new(),
        });
        true
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) {
        if let Some(modal) = self.modal.as_mut() {
            modal.comments = comments.into();
        }
    }

    pub fn close(&mut self) {
        self.modal = None;
    }

    /// Send the decision. Blank comments become "Approved"/"Rejected".
    /// Success closes the modal and reloads; failure alerts and keeps it open.
    pub async fn submit<A, D>(&mut self, api: &A, dialog: &D) -> Result<Option<ReviewAction>, ApiError>
    where
        A: ReviewApi + ?Sized,
        D: Dialog + ?Sized,
    {
        let Some(modal) = self.modal.as_ref() else {
            return Ok(None);
        };
        let comments = if modal.comments.trim().is_empty() {
            modal.action.default_comment().to_string()
        } else {
            modal.comments.clone()
        };
        let (id, action) = (modal.booking.id, modal.action);

        let result = match action {
            ReviewAction::Approve => api.approve(id, &comments).await,
            ReviewAction::Reject => api.reject(id, &comments).await,
        };

        match result {
            Ok(_) => {
                info!(booking_id = id, ?action, "booking reviewed");
                self.close();
                if let Err(e) = self.load(api, None).await {
                    debug!(error = %e, "refresh after review failed");
                }
                Ok(Some(action))
            }
            Err(e) => {
                dialog.alert(&format!("Error: {}", e.alert_message("Unknown error")));
                Err(e)
            }
        }
    }
}

// --- tenant unit browser ---

pub const BOOKING_SUBMITTED: &str = "Booking request submitted successfully!";

#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn units(&self, tower_id: RecordId) -> Result<Vec<Unit>, ApiError>;
    async fn book(&self, request: &BookingRequest) -> Result<Acknowledgement, ApiError>;
}

#[async_trait]
impl BookingApi for ApiClient {
    async fn units(&self, tower_id: RecordId) -> Result<Vec<Unit>, ApiError> {
        self.list_units(&UnitQuery::in_tower(tower_id)).await
    }

    async fn book(&self, request: &BookingRequest) -> Result<Acknowledgement, ApiError> {
        self.create_booking(request).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingModal {
    pub unit: Unit,
    pub request: BookingRequest,
    pub message: Option<String>,
}

/// Units of one tower plus the booking form.
pub struct UnitBrowser {
    tower_id: RecordId,
    units: Vec<Unit>,
    modal: Option<BookingModal>,
}

impl UnitBrowser {
    pub fn new(tower_id: RecordId) -> Self {
        Self {
            tower_id,
            units: Vec::new(),
            modal: None,
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn modal(&self) -> Option<&BookingModal> {
        self.modal.as_ref()
    }

    pub async fn load<A: BookingApi + ?Sized>(&mut self, api: &A) -> Result<&[Unit], ApiError> {
        self.units = api.units(self.tower_id).await?;
        Ok(&self.units)
    }

    /// Open the form for a listed unit, move-in defaulting to tomorrow.
    pub fn open(&mut self, unit_id: RecordId, today: NaiveDate) -> bool {
        let Some(unit) = self.units.iter().find(|u| u.id == unit_id) else {
            return false;
        };
        self.modal = Some(BookingModal {
            unit: unit.clone(),
            request: BookingRequest::for_unit(unit.id, today),
            message: None,
        });
        true
    }

    pub fn request_mut(&mut self) -> Option<&mut BookingRequest> {
        self.modal.as_mut().map(|m| &mut m.request)
    }

    pub fn close(&mut self) {
        self.modal = None;
    }

    /// Submit the booking. On success the modal closes and the caller shows
    /// [`BOOKING_SUBMITTED`] then moves to "my bookings". On failure the error
    /// text is kept on the form.
    pub async fn submit<A: BookingApi + ?Sized>(
        &mut self,
        api: &A,
        today: NaiveDate,
    ) -> Result<View, ConsoleError> {
        let Some(modal) = self.modal.as_mut() else {
            return Err(CrudError::NoOpenForm.into());
        };

        if let Err(invalid) = modal.request.validate(today) {
            modal.message = Some(invalid.to_string());
            return Err(invalid.into());
        }

        match api.book(&modal.request).await {
            Ok(_) => {
                info!(unit_id = modal.request.unit_id, "booking requested");
                self.close();
                Ok(View::MyBookings)
            }
            Err(e) => {
                modal.message = Some(e.alert_message("Failed to submit booking"));
                Err(e.into())
            }
        }
    }
}
