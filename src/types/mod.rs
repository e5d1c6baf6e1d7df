pub mod holding;
pub mod money;
pub mod transaction;
pub mod user;
