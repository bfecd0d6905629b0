//! Filesystem layer for filestate
//!
//! Everything the reconciliation engine needs to observe and mutate the
//! local filesystem: entry probing, atomic writes with advisory locking,
//! content hashing, relative tree paths and config file loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod probe;

pub use checksum::{HashAlgorithm, HashSpec};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::TreePath;
pub use probe::EntryKind;
