//! One admin panel: list, create form, edit form.
//!
//! ```text
//!            start_create            submit_succeeded
//!  Listing ───────────────▶ Creating ────────────────▶ Listing + toast
//!     │  start_edit(id)                                      ▲
//!     └───────────────────▶ Editing(id) ─────────────────────┘
//! ```
//!
//! Deletes go through `request_delete` then `confirm_delete` or
//! `cancel_delete`; the confirmed delete is in flight until `delete_succeeded`
//! or `delete_failed`. A submit or delete in flight blocks any other submit,
//! delete request, or confirmation.

use super::page_count;

/// How long a success toast stays up.
pub const TOAST_DURATION_MS: u64 = 3_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelMode<Id> {
    Listing,
    Creating,
    Editing(Id),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("a submit is already in flight")]
    Busy,
    #[error("no form is open")]
    NoForm,
    #[error("no delete is awaiting confirmation")]
    NothingToConfirm,
}

#[derive(Clone, Debug)]
pub struct AdminPanel<Id> {
    mode: PanelMode<Id>,
    toast: Option<Toast>,
    pending_delete: Option<Id>,
    submitting: bool,
    page: i64,
    limit: i64,
    total: i64,
}

impl<Id: Clone + PartialEq> AdminPanel<Id> {
    #[must_use]
    pub fn new(limit: i64) -> Self {
        Self {
            mode: PanelMode::Listing,
            toast: None,
            pending_delete: None,
            submitting: false,
            page: 1,
            limit: limit.max(1),
            total: 0,
        }
    }

    #[must_use]
    pub fn mode(&self) -> &PanelMode<Id> {
        &self.mode
    }

    #[must_use]
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&Id> {
        self.pending_delete.as_ref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    pub fn start_create(&mut self) {
        self.mode = PanelMode::Creating;
    }

    pub fn start_edit(&mut self, id: Id) {
        self.mode = PanelMode::Editing(id);
    }

    /// Close the form without saving. Ignored while a submit is in flight.
    pub fn back_to_list(&mut self) {
        if !self.submitting {
            self.mode = PanelMode::Listing;
        }
    }

    /// Mark a form submit as started.
    ///
    /// # Errors
    ///
    /// [`PanelError::Busy`] if one is already running, [`PanelError::NoForm`]
    /// from the listing.
    pub fn begin_submit(&mut self) -> Result<(), PanelError> {
        if self.submitting {
            return Err(PanelError::Busy);
        }
        if self.mode == PanelMode::Listing {
            return Err(PanelError::NoForm);
        }
        self.submitting = true;
        Ok(())
    }

    /// Saved: back to the listing with a toast until `now_ms + TOAST_DURATION_MS`.
    pub fn submit_succeeded(&mut self, message: impl Into<String>, now_ms: u64) {
        if matches!(self.mode, PanelMode::Creating) {
            self.total += 1;
        }
        self.submitting = false;
        self.mode = PanelMode::Listing;
        self.toast = Some(Toast { message: message.into(), expires_at_ms: now_ms.saturating_add(TOAST_DURATION_MS) });
    }

    /// Save failed: the form stays open for another try.
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    /// Drop the toast once it has expired.
    pub fn tick(&mut self, now_ms: u64) {
        if self.toast.as_ref().is_some_and(|toast| now_ms >= toast.expires_at_ms) {
            self.toast = None;
        }
    }

    // -------------------------------------------------------------------------
    // Delete confirmation
    // -------------------------------------------------------------------------

    /// Open the confirmation step for `id`.
    ///
    /// # Errors
    ///
    /// [`PanelError::Busy`] while a submit is in flight.
    pub fn request_delete(&mut self, id: Id) -> Result<(), PanelError> {
        if self.submitting {
            return Err(PanelError::Busy);
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirm the pending delete and hand back the id to send to the server.
    ///
    /// The panel stays busy until `delete_succeeded` or `delete_failed`.
    ///
    /// # Errors
    ///
    /// [`PanelError::Busy`] while a submit or delete is in flight, and
    /// [`PanelError::NothingToConfirm`] without a prior `request_delete`.
    pub fn confirm_delete(&mut self) -> Result<Id, PanelError> {
        if self.submitting {
            return Err(PanelError::Busy);
        }
        let id = self.pending_delete.take().ok_or(PanelError::NothingToConfirm)?;
        self.submitting = true;
        Ok(id)
    }

    /// The server removed `id`: shrink the total and close its edit form.
    pub fn delete_succeeded(&mut self, id: &Id) {
        self.submitting = false;
        if self.mode == PanelMode::Editing(id.clone()) {
            self.mode = PanelMode::Listing;
        }
        self.set_total(self.total - 1);
    }

    /// The server refused the delete; nothing changes.
    pub fn delete_failed(&mut self) {
        self.submitting = false;
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
    }

    #[must_use]
    pub fn page_count(&self) -> i64 {
        page_count(self.total, self.limit)
    }

    /// Record the server's total and pull the page back into range.
    pub fn set_total(&mut self, total: i64) {
        self.total = total.max(0);
        self.page = self.page.clamp(1, self.page_count());
    }

    /// Returns `true` if the page changed.
    pub fn go_to(&mut self, page: i64) -> bool {
        let target = page.clamp(1, self.page_count());
        let changed = target != self.page;
        self.page = target;
        changed
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to(self.page - 1)
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
