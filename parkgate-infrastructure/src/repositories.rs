pub mod card_table;
pub mod json_store;

pub use card_table::*;
pub use json_store::*;
