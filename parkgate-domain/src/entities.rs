pub mod activity;
pub mod backup;
pub mod card;
pub mod config;
pub mod scheduler;
pub mod sensor;
pub mod unknown_card;

pub use activity::*;
pub use backup::*;
pub use card::*;
pub use config::*;
pub use scheduler::*;
pub use sensor::*;
pub use unknown_card::*;
