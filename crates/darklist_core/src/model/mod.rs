//! Domain model for submitted name/link entries.
//!
//! # Responsibility
//! - Define the canonical record shown in the display list.
//! - Distinguish provisional (client-minted) from confirmed (server-issued)
//!   identity.
//!
//! # Invariants
//! - An `Entry` never exists with an empty `name` or `link`.
//! - Entries are immutable once created; there is no update or delete.

pub mod entry;
