//! Display-list reconciler.
//!
//! # Responsibility
//! - Track the fetch lifecycle of the display list (`Loading` until the first
//!   authoritative load, then `Ready` or `Failed`).
//! - Merge three entry sources into one ordered list: the fetched list,
//!   optimistic provisional rows appended on submit, and confirmed entries
//!   arriving from the mutation ack or the subscription feed.
//!
//! # Invariants
//! - No two entries share a canonical id after any reconciliation step.
//! - Confirmation supersedes a matching provisional row in place; it never
//!   reorders the list.
//! - Only confirmed ids may enter through the merge path; a provisional id
//!   arriving there is dropped.
//! - Once `Ready`, the list never regresses to `Failed`; a failed refresh
//!   keeps the last good list.
//!
//! # See also
//! - `model::entry` for id matching rules.
//! - `store` for the event layer that drives these operations.

use crate::model::entry::Entry;

/// Lifecycle of the authoritative list fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPhase {
    Loading,
    Ready,
    Failed(String),
}

/// What the reconciler asked the merge path to do with a confirmed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Incoming id was still provisional; the merge path only accepts
    /// server-issued ids, so the event was dropped.
    DroppedProvisional,
    /// Replaced the matching in-flight provisional row, position preserved.
    Superseded,
    /// Canonical id already present; repeated delivery ignored.
    AlreadyPresent,
    /// Unseen id (creation by another client); appended at the end.
    Appended,
}

/// Render-ready projection of the reconciler state.
#[derive(Debug, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Failed(&'a str),
    Empty,
    Rows(&'a [Entry]),
}

/// Ordered display list plus its fetch phase.
#[derive(Debug)]
pub struct ListReconciler {
    phase: FetchPhase,
    entries: Vec<Entry>,
}

impl ListReconciler {
    /// Networked variant: empty list awaiting the first authoritative load.
    pub fn new_loading() -> Self {
        Self {
            phase: FetchPhase::Loading,
            entries: Vec::new(),
        }
    }

    /// Local variant: no fetch happens, the list starts ready and empty.
    pub fn new_ready() -> Self {
        Self {
            phase: FetchPhase::Ready,
            entries: Vec::new(),
        }
    }

    pub fn phase(&self) -> &FetchPhase {
        &self.phase
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces list state with an authoritative fetched list.
    ///
    /// Fetched items are deduplicated by canonical id, first occurrence wins.
    /// Provisional rows still awaiting confirmation survive the load by being
    /// re-appended after the fetched items; provisionals the fetch already
    /// covers are dropped. Moves the phase to `Ready`, also recovering from
    /// `Failed` when an external refetch eventually succeeds.
    pub fn load(&mut self, fetched: Vec<Entry>) {
        let mut next: Vec<Entry> = Vec::with_capacity(fetched.len());
        for entry in fetched {
            if !next.iter().any(|e| e.id.same_entry(&entry.id)) {
                next.push(entry);
            }
        }
        for entry in self.entries.drain(..) {
            if entry.id.is_provisional() && !next.iter().any(|e| e.id.same_entry(&entry.id)) {
                next.push(entry);
            }
        }
        self.entries = next;
        self.phase = FetchPhase::Ready;
    }

    /// Records a failed authoritative fetch.
    ///
    /// No-op once `Ready`: refetch policy belongs to the external client, and
    /// stale rows beat an error placeholder.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.phase != FetchPhase::Ready {
            self.phase = FetchPhase::Failed(message.into());
        }
    }

    /// Optimistic append at the end, before any network response.
    ///
    /// Returns false (and leaves the list untouched) when the id is already
    /// present.
    pub fn append_provisional(&mut self, entry: Entry) -> bool {
        if self.entries.iter().any(|e| e.id.same_entry(&entry.id)) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Merges one confirmed entry, from the mutation ack or the subscription
    /// feed; both sources go through this same path, in either arrival order.
    pub fn apply_confirmed(&mut self, entry: Entry) -> ConfirmOutcome {
        if entry.id.is_provisional() {
            return ConfirmOutcome::DroppedProvisional;
        }
        match self.entries.iter().position(|e| e.id.same_entry(&entry.id)) {
            Some(index) if self.entries[index].id.is_provisional() => {
                self.entries[index] = entry;
                ConfirmOutcome::Superseded
            }
            Some(_) => ConfirmOutcome::AlreadyPresent,
            None => {
                self.entries.push(entry);
                ConfirmOutcome::Appended
            }
        }
    }

    /// Link of the row at `index`, for the platform opener. Never mutates;
    /// a stale index yields nothing.
    pub fn link_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.link.as_str())
    }

    pub fn view(&self) -> ListView<'_> {
        match &self.phase {
            FetchPhase::Loading => ListView::Loading,
            FetchPhase::Failed(message) => ListView::Failed(message),
            FetchPhase::Ready if self.entries.is_empty() => ListView::Empty,
            FetchPhase::Ready => ListView::Rows(&self.entries),
        }
    }
}
