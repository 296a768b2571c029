pub mod error;
pub mod health;
pub mod job;
pub mod prediction;
pub mod production;
pub mod upload;
