pub mod audit;
pub mod lifecycle;
pub mod payment;
pub mod transaction;
pub mod user;
