pub mod activity_log;
pub mod backup_service;
pub mod scheduler;
pub mod sensor_client;

pub use activity_log::*;
pub use backup_service::*;
pub use scheduler::*;
pub use sensor_client::*;
