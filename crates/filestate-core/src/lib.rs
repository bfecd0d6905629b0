//! Declarative file-state reconciliation
//!
//! `filestate-core` converges filesystem entities (files, symlinks,
//! directories, text content, patches) to a declared state. Each request
//! names a [`StateKind`], a target path and its parameters; the [`Engine`]
//! validates them into a typed declaration, compares the declaration with
//! what is on disk and performs the smallest mutation that closes the gap.
//!
//! Every state follows the same protocol:
//!
//! - already converged: [`Outcome::Succeeded`] with no changes
//! - dry run with a pending change: [`Outcome::WouldChange`], nothing touched
//! - otherwise: mutate, re-verify, report [`Outcome::Succeeded`] or
//!   [`Outcome::Failed`]
//!
//! # Architecture
//!
//! ```text
//!            filestate-cli
//!                  |
//!            filestate-core
//!     (engine, states, fetch, patch)
//!                  |
//!      +-----------+-----------+
//!      |                       |
//! filestate-fs         filestate-content
//! ```
//!
//! # Example
//!
//! ```no_run
//! use filestate_core::{Engine, EngineConfig, Outcome, StateKind, StateRequest};
//!
//! # async fn example() {
//! let engine = Engine::new(EngineConfig::default().with_file_root("/srv/filestate"));
//!
//! let request = StateRequest::new(StateKind::Managed, "/etc/motd")
//!     .with_param("source", "fs://motd");
//! let result = engine.reconcile(request).await;
//! assert_ne!(result.outcome, Outcome::Failed);
//! # }
//! ```

pub mod config;
pub mod declaration;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod lock;
pub mod outcome;
pub mod patcher;
pub mod request;
pub mod statefile;
mod states;

pub use config::EngineConfig;
pub use declaration::Declaration;
pub use engine::Engine;
pub use error::{Error, Result};
pub use fetch::{ByteStream, ContentDescriptor, Fetcher, LocalFetcher, TreeEntry, TreeListing};
pub use lock::PathLocks;
pub use outcome::{Changes, Outcome, Plan, StateResult};
pub use patcher::{GnuPatch, PatchInterpreter};
pub use request::{Parameters, StateKind, StateRequest};
pub use statefile::{StateEntry, StateFile};
