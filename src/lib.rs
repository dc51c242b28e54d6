pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::SiteConfig;

pub use adapters::{FileSubmissionStore, MemorySubmissionStore, MemoryTransport};
pub use crate::core::{contact::ContactFormProcessor, site::Site};
pub use utils::error::{Result, SiteError};
