//! Backend bridge: the consumer queues fetch commands, a background runtime
//! runs each one as its own task and delivers the classified result.

pub mod commands;
pub mod runtime;

pub use commands::{FetchCommand, QueuedFetch};
pub use runtime::{launch, BackendOptions};
