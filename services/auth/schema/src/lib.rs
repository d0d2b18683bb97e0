//! sea-orm entities owned by the passwordless auth service.

pub mod outbox_events;
pub mod passwordless_tokens;
pub mod users;
