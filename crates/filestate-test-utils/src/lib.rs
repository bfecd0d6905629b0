//! Shared test utilities for the filestate workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`], a temporary directory with setup, snapshot and
//!   assertion helpers
//! - [`fetch`]: [`MemoryFetcher`], an in-memory fetcher with optional delay
//! - [`patcher`]: [`FakePatcher`], a scripted patch interpreter
//! - [`fixtures`]: paths into `test-fixtures/` and tool probes

pub mod fetch;
pub mod fixtures;
pub mod patcher;
pub mod tree;

pub use fetch::MemoryFetcher;
pub use fixtures::{file_root, patch_available};
pub use patcher::FakePatcher;
pub use tree::{Entry, TestTree};
