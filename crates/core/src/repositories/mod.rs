//! Gateway implementations.
//!
//! - [`memory`]: mutex-guarded in-process tables and a recording notifier.
//! - [`yaml`]: one YAML file per table under the configured data directory.
//! - [`outbox`]: notifications written to `<data_dir>/outbox/`.

pub mod memory;
pub mod outbox;
pub mod shared;
pub mod yaml;
