//! Domain model of the marketplace.

pub mod listing;
pub mod message;
pub mod user;

pub use self::{listing::Listing, message::Message, user::User};
