//! Marker types describing what a typed value (like a [`DateTimeOf`]) is
//! about.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing an expiration of something (a session, a token).
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
