// Adapters layer: concrete implementations of the domain ports
// (submission storage, outbound mail).

pub mod mail;
pub mod storage;

pub use mail::{transport_from_config, ConsoleTransport, MemoryTransport, SmtpTransport};
pub use storage::{FileSubmissionStore, MemorySubmissionStore};
