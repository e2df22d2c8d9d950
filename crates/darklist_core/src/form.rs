//! Submission form controller.
//!
//! # Responsibility
//! - Hold the transient name/link draft between submissions.
//! - Derive the per-field inline error messages reactively from current
//!   field state.
//! - Turn a valid draft into exactly one create-request per submit.
//!
//! # Invariants
//! - Setters store input verbatim: no trimming, no length limit.
//! - `submit` with any empty field is a no-op; the draft survives unchanged.
//! - A successful submit resets both fields to empty.

use crate::model::entry::EntryId;

/// Inline error shown under an empty name field.
pub const NAME_ERROR_MESSAGE: &str = "Please enter app name";
/// Inline error shown under an empty link field.
pub const LINK_ERROR_MESSAGE: &str = "Please enter the url link";

/// Create-request emitted by a successful submit.
///
/// `id` is a freshly minted provisional id; the networked variant sends it as
/// the mutation's `id` variable so the server echo can be matched back to the
/// optimistic row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub id: EntryId,
    pub name: String,
    pub link: String,
}

/// Two-field draft state for the submission form.
#[derive(Debug, Default)]
pub struct FormController {
    name: String,
    link: String,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Replaces the name field verbatim.
    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
    }

    /// Replaces the link field verbatim.
    pub fn set_link(&mut self, value: impl Into<String>) {
        self.link = value.into();
    }

    /// Reactive inline error for the name field.
    ///
    /// Derived from current state on every read, not latched at submit time,
    /// so the message clears as soon as the user types.
    pub fn name_error(&self) -> Option<&'static str> {
        self.name.is_empty().then_some(NAME_ERROR_MESSAGE)
    }

    /// Reactive inline error for the link field.
    pub fn link_error(&self) -> Option<&'static str> {
        self.link.is_empty().then_some(LINK_ERROR_MESSAGE)
    }

    /// Whether a submit would currently succeed.
    pub fn is_submittable(&self) -> bool {
        !self.name.is_empty() && !self.link.is_empty()
    }

    /// Validates the draft and emits at most one create-request.
    ///
    /// # Contract
    /// - Both fields non-empty: returns the request, resets both fields.
    /// - Either field empty: returns `None` and leaves the draft untouched;
    ///   the inline errors keep reporting the empty fields.
    pub fn submit(&mut self) -> Option<CreateRequest> {
        if !self.is_submittable() {
            return None;
        }
        Some(CreateRequest {
            id: EntryId::fresh_provisional(),
            name: std::mem::take(&mut self.name),
            link: std::mem::take(&mut self.link),
        })
    }
}
