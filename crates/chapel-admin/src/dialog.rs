//! Create/edit/delete dialog
//!
//! ```text
//! Closed -> CheckingPermissions -> Open -> Saving -> Closed
//!                                       -> ConfirmingDelete -> Deleting -> Closed
//! ```
//!
//! Every failure returns the dialog to the state the action started from,
//! with the message kept in `error()`. Nothing is retried.

use crate::client::ApiClient;
use crate::error::{AdminError, Result};
use crate::resources::{self, Draft, Id, Resource};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides whether the current user may edit a resource
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// `resource` is the resource's `NAME`, e.g. `bulletins`
    async fn can_edit(&self, resource: &str) -> Result<bool>;
}

#[derive(Debug, Default, Deserialize)]
struct CurrentUser {
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
}

/// Asks the server who the current user is
///
/// Admins may edit everything; anyone else needs `<resource>:edit`.
pub struct ApiPermissionChecker {
    client: ApiClient,
}

impl ApiPermissionChecker {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PermissionChecker for ApiPermissionChecker {
    async fn can_edit(&self, resource: &str) -> Result<bool> {
        let user: CurrentUser = self.client.get("/auth/me").await?;
        let wanted = format!("{}:edit", resource);
        Ok(user.is_admin
            || user.role.as_deref() == Some("admin")
            || user.permissions.iter().any(|p| *p == wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    CheckingPermissions,
    Open,
    Saving,
    ConfirmingDelete,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(Id),
}

pub struct EditDialog<R: Resource> {
    client: ApiClient,
    permissions: Arc<dyn PermissionChecker>,
    on_change: Option<Box<dyn Fn() + Send + Sync>>,
    state: DialogState,
    mode: Option<DialogMode>,
    draft: R::Draft,
    error: Option<String>,
}

impl<R: Resource> EditDialog<R> {
    pub fn new(client: ApiClient, permissions: Arc<dyn PermissionChecker>) -> Self {
        Self {
            client,
            permissions,
            on_change: None,
            state: DialogState::Closed,
            mode: None,
            draft: R::Draft::default(),
            error: None,
        }
    }

    /// Called after every successful save or delete, typically to reload
    /// the table behind the dialog
    pub fn on_change(mut self, refresh: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(refresh));
        self
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn mode(&self) -> Option<DialogMode> {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed | DialogState::CheckingPermissions)
    }

    /// Last failure message, cleared when the next action starts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> Result<&mut R::Draft> {
        self.expect(DialogState::Open, "edit")?;
        Ok(&mut self.draft)
    }

    pub async fn open_create(&mut self) -> Result<()> {
        self.authorize().await?;
        self.open(DialogMode::Create, R::Draft::default());
        Ok(())
    }

    /// Open on `record`, the latest copy the caller has from the server
    pub async fn open_edit(&mut self, record: &R::Record) -> Result<()> {
        self.authorize().await?;
        self.open(DialogMode::Edit(R::id(record)), R::Draft::from_record(record));
        Ok(())
    }

    /// Fetch the record and open on it
    pub async fn open_edit_by_id(&mut self, id: Id) -> Result<()> {
        self.authorize().await?;
        match resources::get::<R>(&self.client, id).await {
            Ok(record) => {
                self.open(DialogMode::Edit(id), R::Draft::from_record(&record));
                Ok(())
            }
            Err(e) => Err(self.fail(DialogState::Closed, e)),
        }
    }

    pub async fn save(&mut self) -> Result<R::Record> {
        self.expect(DialogState::Open, "save")?;
        self.error = None;
        if let Err(e) = self.draft.validate() {
            return Err(self.fail(DialogState::Open, e));
        }

        self.state = DialogState::Saving;
        let result = match self.mode {
            Some(DialogMode::Edit(id)) => resources::update::<R>(&self.client, id, &self.draft).await,
            _ => resources::create::<R>(&self.client, &self.draft).await,
        };
        match result {
            Ok(record) => {
                info!(resource = R::NAME, id = R::id(&record), "saved");
                self.finish();
                Ok(record)
            }
            Err(e) => Err(self.fail(DialogState::Open, e)),
        }
    }

    /// First step of a delete, nothing is sent yet
    pub fn request_delete(&mut self) -> Result<()> {
        self.expect(DialogState::Open, "delete")?;
        if !matches!(self.mode, Some(DialogMode::Edit(_))) {
            return Err(AdminError::InvalidState("nothing to delete while creating".into()));
        }
        self.error = None;
        self.state = DialogState::ConfirmingDelete;
        Ok(())
    }

    pub fn cancel_delete(&mut self) -> Result<()> {
        self.expect(DialogState::ConfirmingDelete, "cancel delete")?;
        self.state = DialogState::Open;
        Ok(())
    }

    pub async fn confirm_delete(&mut self) -> Result<()> {
        self.expect(DialogState::ConfirmingDelete, "confirm delete")?;
        let Some(DialogMode::Edit(id)) = self.mode else {
            return Err(AdminError::InvalidState("nothing to delete".into()));
        };

        self.state = DialogState::Deleting;
        match resources::delete::<R>(&self.client, id).await {
            Ok(()) => {
                info!(resource = R::NAME, id, "deleted");
                self.finish();
                Ok(())
            }
            Err(e) => Err(self.fail(DialogState::Open, e)),
        }
    }

    /// Close and discard the draft
    pub fn cancel(&mut self) {
        debug!(resource = R::NAME, "dialog cancelled");
        self.close();
    }

    async fn authorize(&mut self) -> Result<()> {
        self.expect(DialogState::Closed, "open")?;
        self.error = None;
        self.state = DialogState::CheckingPermissions;

        let denied = match self.permissions.can_edit(R::NAME).await {
            Ok(true) => return Ok(()),
            Ok(false) => AdminError::PermissionDenied(format!(
                "You do not have permission to edit {}",
                R::NAME
            )),
            Err(e) => e,
        };
        warn!(resource = R::NAME, error = %denied, "dialog not opened");
        Err(self.fail(DialogState::Closed, denied))
    }

    fn open(&mut self, mode: DialogMode, draft: R::Draft) {
        debug!(resource = R::NAME, ?mode, "dialog opened");
        self.mode = Some(mode);
        self.draft = draft;
        self.state = DialogState::Open;
    }

    fn finish(&mut self) {
        self.close();
        if let Some(refresh) = &self.on_change {
            refresh();
        }
    }

    fn close(&mut self) {
        self.state = DialogState::Closed;
        self.mode = None;
        self.draft = R::Draft::default();
        self.error = None;
    }

    fn fail(&mut self, back_to: DialogState, e: AdminError) -> AdminError {
        self.state = back_to;
        self.error = Some(e.to_string());
        e
    }

    fn expect(&self, state: DialogState, action: &str) -> Result<()> {
        if self.state != state {
            return Err(AdminError::InvalidState(format!(
                "cannot {} while {:?}",
                action, self.state
            )));
        }
        Ok(())
    }
}
