//! Domain types shared by passwordless services.
//!
//! Pure types with no framework dependencies.

pub mod channel;
