pub mod exchange;
pub mod health;
pub mod request;
