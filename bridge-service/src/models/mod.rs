pub mod firefly;
pub mod snapshot;
pub mod up;

pub use snapshot::{MirroredAccount, SyncSnapshot};
