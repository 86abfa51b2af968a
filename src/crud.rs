//! Generic list + modal controller shared by the tower, unit and amenity screens.
//!
//! Pattern: load the list; open a modal bound to a draft (blank for "add", a
//! copy of the record for "edit"); submit creates or updates depending on the
//! edit flag; on success close the modal and re-fetch; on failure alert with
//! the server's message and keep everything as it was. Deleting asks for
//! confirmation first and sends nothing when declined.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{ApiClient, UnitQuery};
use crate::drafts::{AmenityDraft, Draft, TowerDraft, UnitDraft};
use crate::error::{ApiError, CrudError};
use crate::models::{Acknowledgement, Amenity, RecordId, Tower, Unit};

/// Blocking prompts shown to the operator.
pub trait Dialog {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

/// A record managed through a list/modal screen.
pub trait Entity: DeserializeOwned + Clone + Send + Sync + 'static {
    type Draft: Draft + for<'a> From<&'a Self> + Send + Sync;

    /// API collection path, e.g. `towers`.
    const COLLECTION: &'static str;
    /// Alert prefixes for a failed create and a failed update.
    const CREATE_ALERT: &'static str = "Error";
    const UPDATE_ALERT: &'static str = "Error";
    /// Alert text when a save fails without a server message.
    const SAVE_FALLBACK: &'static str = "Unknown error";
    /// Alert text when a delete fails without a server message.
    const DELETE_FALLBACK: &'static str = "Unknown error";

    fn id(&self) -> RecordId;
}

impl Entity for Tower {
    type Draft = TowerDraft;
    const COLLECTION: &'static str = "towers";
    const CREATE_ALERT: &'static str = "Error creating tower";
    const UPDATE_ALERT: &'static str = "Error updating tower";
    const DELETE_FALLBACK: &'static str = "Cannot delete tower with associated units";

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Entity for Unit {
    type Draft = UnitDraft;
    const COLLECTION: &'static str = "units";
    const DELETE_FALLBACK: &'static str = "Cannot delete unit with bookings";

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Entity for Amenity {
    type Draft = AmenityDraft;
    const COLLECTION: &'static str = "amenities";

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Endpoint set of one entity.
#[async_trait]
pub trait CrudApi<E: Entity>: Send + Sync {
    async fn list(&self) -> Result<Vec<E>, ApiError>;
    async fn create(&self, draft: &E::Draft) -> Result<Acknowledgement, ApiError>;
    async fn update(&self, id: RecordId, draft: &E::Draft) -> Result<Acknowledgement, ApiError>;
    async fn delete(&self, id: RecordId) -> Result<Acknowledgement, ApiError>;
}

#[async_trait]
impl<E: Entity> CrudApi<E> for ApiClient {
    async fn list(&self) -> Result<Vec<E>, ApiError> {
        self.get_json(E::COLLECTION).await
    }

    async fn create(&self, draft: &E::Draft) -> Result<Acknowledgement, ApiError> {
        self.post_json(E::COLLECTION, draft).await
    }

    async fn update(&self, id: RecordId, draft: &E::Draft) -> Result<Acknowledgement, ApiError> {
        self.put_json(&format!("{}/{id}", E::COLLECTION), draft).await
    }

    async fn delete(&self, id: RecordId) -> Result<Acknowledgement, ApiError> {
        self.delete_json(&format!("{}/{id}", E::COLLECTION)).await
    }
}

/// Units narrowed to one query (e.g. a single tower) for the list call.
pub struct FilteredUnits<'a> {
    pub api: &'a ApiClient,
    pub query: UnitQuery,
}

#[async_trait]
impl CrudApi<Unit> for FilteredUnits<'_> {
    async fn list(&self) -> Result<Vec<Unit>, ApiError> {
        self.api.list_units(&self.query).await
    }

    async fn create(&self, draft: &UnitDraft) -> Result<Acknowledgement, ApiError> {
        self.api.create_unit(draft).await
    }

    async fn update(&self, id: RecordId, draft: &UnitDraft) -> Result<Acknowledgement, ApiError> {
        self.api.update_unit(id, draft).await
    }

    async fn delete(&self, id: RecordId) -> Result<Acknowledgement, ApiError> {
        self.api.delete_unit(id).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modal<D> {
    pub draft: D,
    editing: Option<RecordId>,
}

impl<D> Modal<D> {
    pub fn edit_mode(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<RecordId> {
        self.editing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated(RecordId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(RecordId),
    Cancelled,
}

pub struct CrudController<E: Entity> {
    items: Vec<E>,
    loading: bool,
    modal: Option<Modal<E::Draft>>,
}

impl<E: Entity> Default for CrudController<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> CrudController<E> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            modal: None,
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: RecordId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn modal(&self) -> Option<&Modal<E::Draft>> {
        self.modal.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut E::Draft> {
        self.modal.as_mut().map(|modal| &mut modal.draft)
    }

    /// Fetch the list. On failure the previous list stays.
    pub async fn load<A>(&mut self, api: &A) -> Result<&[E], ApiError>
    where
        A: CrudApi<E> + ?Sized,
    {
        self.loading = true;
        let result = api.list().await;
        self.loading = false;
        match result {
            Ok(items) => {
                debug!(collection = E::COLLECTION, count = items.len(), "list loaded");
                self.items = items;
                Ok(&self.items)
            }
            Err(e) => {
                warn!(collection = E::COLLECTION, error = %e, "list failed to load");
                Err(e)
            }
        }
    }

    pub fn open_add(&mut self) {
        self.open_add_with(E::Draft::blank());
    }

    /// "Add" modal with a prepared draft (e.g. a unit preselecting a tower).
    pub fn open_add_with(&mut self, draft: E::Draft) {
        self.modal = Some(Modal {
            draft,
            editing: None,
        });
    }

    pub fn open_edit(&mut self, record: &E) {
        self.modal = Some(Modal {
            draft: E::Draft::from(record),
            editing: Some(record.id()),
        });
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Submit the open modal. Validation and API failures raise an alert and
    /// leave the modal open with its draft intact.
    pub async fn save<A, D>(&mut self, api: &A, dialog: &D) -> Result<SaveOutcome, CrudError>
    where
        A: CrudApi<E> + ?Sized,
        D: Dialog + ?Sized,
    {
        let Some(modal) = self.modal.as_ref() else {
            return Err(CrudError::NoOpenForm);
        };

        if let Err(invalid) = modal.draft.validate() {
            dialog.alert(&format!("Error: {invalid}"));
            return Err(invalid.into());
        }

        let result = match modal.editing {
            Some(id) => api.update(id, &modal.draft).await.map(|_| SaveOutcome::Updated(id)),
            None => api.create(&modal.draft).await.map(|_| SaveOutcome::Created),
        };

        match result {
            Ok(outcome) => {
                debug!(collection = E::COLLECTION, ?outcome, "saved");
                self.close_modal();
                self.reload(api).await;
                Ok(outcome)
            }
            Err(e) => {
                dialog.alert(&save_alert::<E>(modal.edit_mode(), &e));
                Err(e.into())
            }
        }
    }

    /// Delete after confirmation. Declining sends nothing.
    pub async fn delete<A, D>(
        &mut self,
        api: &A,
        dialog: &D,
        id: RecordId,
    ) -> Result<DeleteOutcome, CrudError>
    where
        A: CrudApi<E> + ?Sized,
        D: Dialog + ?Sized,
    {
        let prompt = format!(
            "Are you sure you want to delete this {}?",
            <E::Draft as Draft>::ENTITY
        );
        if !dialog.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        match api.delete(id).await {
            Ok(_) => {
                self.reload(api).await;
                Ok(DeleteOutcome::Deleted(id))
            }
            Err(e) => {
                dialog.alert(&format!("Error: {}", e.alert_message(E::DELETE_FALLBACK)));
                Err(e.into())
            }
        }
    }

    /// Re-fetch after a successful write. The write already happened, so a
    /// failed refresh is only logged.
    async fn reload<A>(&mut self, api: &A)
    where
        A: CrudApi<E> + ?Sized,
    {
        if let Err(e) = self.load(api).await {
            warn!(collection = E::COLLECTION, error = %e, "refresh after write failed");
        }
    }
}

fn save_alert<E: Entity>(editing: bool, err: &ApiError) -> String {
    let prefix = if editing { E::UPDATE_ALERT } else { E::CREATE_ALERT };
    format!("{prefix}: {}", err.alert_message(E::SAVE_FALLBACK))
}
