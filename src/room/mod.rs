// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use errors::{RoomError, RoomErrorKind};
pub use handlers::room_stats;
pub use registry::{Dispatch, RegistryLimits, RoomRegistry};
pub use service::{RoomStats, SessionCoordinator};

// Internal modules
mod cleanup_task;
pub mod errors;
pub mod generators;
mod handlers;
pub mod models;
pub mod registry;
mod service;
