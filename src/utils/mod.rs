//! Shared helpers.

pub mod date;
pub mod format;
pub mod species_list;
