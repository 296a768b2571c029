pub mod api;
pub mod dashboard;
pub mod health;
pub mod poller;
pub mod retry;
pub mod scheduler;
pub mod upload;

pub use api::{SolarApi, SolarClient};
pub use scheduler::{BrowserScheduler, Scheduler, TaskHandle};
