pub mod config;
pub mod ingest;
pub mod nlu;
pub mod types;

pub use types::*;
