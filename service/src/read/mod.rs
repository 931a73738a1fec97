//! Read models.

pub mod listing;

