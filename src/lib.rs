pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{checkmarx::CheckmarxClient, port::PortClient};
pub use config::SyncConfig;
pub use core::sync::{run_from_config, SyncEngine, SyncReport, SyncSettings};
pub use utils::error::{Result, SyncError};
