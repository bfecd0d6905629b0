//! Text mutation primitives for filestate
//!
//! Line-oriented edits used by the `sed`, `comment`, `uncomment` and
//! `append` states. Every mutator is a pure function from the current file
//! content to an [`EditOutcome`]; none of them touch the filesystem. An
//! edit that is already in place is reported as [`EditOutcome::AlreadyApplied`]
//! so callers can short-circuit before writing.
//!
//! # Example
//!
//! ```
//! use filestate_content::{Commenter, EditOutcome};
//!
//! let commenter = Commenter::new("^comment", "#").unwrap();
//! let once = match commenter.comment("comment_me\n") {
//!     EditOutcome::Changed(edit) => edit.content,
//!     other => panic!("unexpected {other:?}"),
//! };
//! assert_eq!(once, "#comment_me\n");
//! assert!(matches!(commenter.comment(&once), EditOutcome::AlreadyApplied));
//! ```

pub mod append;
pub mod comment;
pub mod diff;
pub mod edit;
pub mod error;
mod lines;
pub mod sed;

pub use append::append_lines;
pub use comment::Commenter;
pub use diff::LineDiff;
pub use edit::{EditOutcome, TextEdit};
pub use error::{Error, Result};
pub use sed::Sed;
