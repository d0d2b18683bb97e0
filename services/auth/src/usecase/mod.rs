pub mod exchange;
pub mod generator;
pub mod rate_limit;
pub mod request;
pub mod session;
