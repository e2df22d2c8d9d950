//! Flutter-facing FFI crate for the dark-mode app list.
//! The bridge surface lives in one module so codegen scans a single file.

pub mod api;
