pub mod backup_queries;
pub mod card_queries;
pub mod log_queries;
pub mod scheduler_queries;
pub mod sensor_queries;

pub use backup_queries::*;
pub use card_queries::*;
pub use log_queries::*;
pub use scheduler_queries::*;
pub use sensor_queries::*;
