//! Typed declarations
//!
//! Raw request parameters are validated into a [`Declaration`] before the
//! engine looks at the filesystem. Unknown keys, missing required keys,
//! malformed regexes and hash specs all surface here as
//! [`Error::InvalidParameter`].

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filestate_content::{Commenter, Sed};
use filestate_fs::HashSpec;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::fetch::ContentDescriptor;
use crate::request::{Parameters, StateKind};
use crate::{Error, Result};

/// A validated declaration, one variant per state kind
#[derive(Debug, Clone)]
pub enum Declaration {
    Symlink(SymlinkSpec),
    Absent,
    Managed(ManagedSpec),
    Directory(DirectorySpec),
    Recurse(RecurseSpec),
    Sed(Sed),
    Comment(Commenter),
    Uncomment(Commenter),
    Append(AppendSpec),
    Touch(TouchSpec),
    Patch(PatchSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymlinkSpec {
    /// Link text the symlink must carry
    pub target: PathBuf,
    /// Replace a non-symlink entity in the way
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub makedirs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorySpec {
    #[serde(default = "default_true")]
    pub makedirs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchSpec {
    pub makedirs: bool,
    /// Modification time to set; now when `None`
    pub mtime: Option<SystemTime>,
}

/// Where managed content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Remote(ContentDescriptor),
    Inline(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedSpec {
    pub source: ContentSource,
    pub makedirs: bool,
    /// When false an existing file is left alone whatever its content
    pub replace: bool,
}

impl ManagedSpec {
    pub fn expected_hash(&self) -> Option<&HashSpec> {
        match &self.source {
            ContentSource::Remote(descriptor) => descriptor.expected_hash.as_ref(),
            ContentSource::Inline(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecurseSpec {
    pub source: String,
    /// Remove local files missing from the source tree
    pub clean: bool,
    /// Relative paths matching this are neither synced nor cleaned
    pub exclude: Option<Regex>,
    pub makedirs: bool,
}

impl RecurseSpec {
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.as_ref().is_some_and(|re| re.is_match(relative))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendSpec {
    /// Lines to ensure, in order
    pub lines: Vec<String>,
    pub makedirs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSpec {
    pub source: ContentDescriptor,
    /// Hash of the target once patched
    pub hash: HashSpec,
    /// Extra interpreter arguments
    pub options: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoParams {}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TouchParams {
    #[serde(default)]
    makedirs: bool,
    mtime: Option<u64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ManagedParams {
    source: Option<String>,
    contents: Option<String>,
    source_hash: Option<String>,
    #[serde(default)]
    makedirs: bool,
    #[serde(default = "default_true")]
    replace: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RecurseParams {
    source: String,
    #[serde(default)]
    clean: bool,
    exclude_pat: Option<String>,
    #[serde(default)]
    makedirs: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SedParams {
    before: String,
    after: String,
    limit: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CommentParams {
    regex: String,
    #[serde(rename = "char")]
    marker: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextParam {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AppendParams {
    text: TextParam,
    #[serde(default)]
    makedirs: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchParams {
    source: String,
    hash: String,
    options: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Declaration {
    /// Validate `parameters` for a `kind` state at `target`.
    pub fn parse(
        kind: StateKind,
        target: &Path,
        parameters: &Parameters,
        config: &EngineConfig,
    ) -> Result<Self> {
        if !target.is_absolute() {
            return Err(Error::invalid(
                kind,
                format!("target path {} must be absolute", target.display()),
            ));
        }

        let declaration = match kind {
            StateKind::Symlink => Self::Symlink(params(kind, parameters)?),
            StateKind::Absent => {
                let NoParams {} = params(kind, parameters)?;
                Self::Absent
            }
            StateKind::Directory => Self::Directory(params(kind, parameters)?),
            StateKind::Touch => {
                let raw: TouchParams = params(kind, parameters)?;
                let mtime = raw
                    .mtime
                    .map(|secs| {
                        SystemTime::UNIX_EPOCH
                            .checked_add(Duration::from_secs(secs))
                            .ok_or_else(|| Error::invalid(kind, format!("mtime {secs} out of range")))
                    })
                    .transpose()?;
                Self::Touch(TouchSpec {
                    makedirs: raw.makedirs,
                    mtime,
                })
            }
            StateKind::Managed => Self::Managed(managed(kind, params(kind, parameters)?)?),
            StateKind::Recurse => {
                let raw: RecurseParams = params(kind, parameters)?;
                let exclude = raw
                    .exclude_pat
                    .as_deref()
                    .map(Regex::new)
                    .transpose()
                    .map_err(|e| Error::invalid(kind, format!("exclude_pat: {e}")))?;
                Self::Recurse(RecurseSpec {
                    source: raw.source,
                    clean: raw.clean,
                    exclude,
                    makedirs: raw.makedirs,
                })
            }
            StateKind::Sed => {
                let raw: SedParams = params(kind, parameters)?;
                let sed = Sed::new(&raw.before, &raw.after, raw.limit.as_deref())
                    .map_err(|e| Error::invalid(kind, e.to_string()))?;
                Self::Sed(sed)
            }
            StateKind::Comment | StateKind::Uncomment => {
                let raw: CommentParams = params(kind, parameters)?;
                let marker = raw.marker.as_deref().unwrap_or(&config.comment_char);
                let commenter = Commenter::new(&raw.regex, marker)
                    .map_err(|e| Error::invalid(kind, e.to_string()))?;
                if kind == StateKind::Comment {
                    Self::Comment(commenter)
                } else {
                    Self::Uncomment(commenter)
                }
            }
            StateKind::Append => {
                let raw: AppendParams = params(kind, parameters)?;
                let lines = match raw.text {
                    TextParam::One(text) => vec![text],
                    TextParam::Many(texts) => texts,
                };
                if lines.iter().all(|text| text.is_empty()) {
                    return Err(Error::invalid(kind, "text must not be empty"));
                }
                Self::Append(AppendSpec {
                    lines,
                    makedirs: raw.makedirs,
                })
            }
            StateKind::Patch => {
                let raw: PatchParams = params(kind, parameters)?;
                Self::Patch(PatchSpec {
                    source: ContentDescriptor::new(raw.source),
                    hash: hash_spec(kind, "hash", &raw.hash)?,
                    options: raw
                        .options
                        .map(|opts| opts.split_whitespace().map(str::to_string).collect())
                        .unwrap_or_default(),
                })
            }
        };

        tracing::debug!(kind = %kind, path = %target.display(), "validated declaration");
        Ok(declaration)
    }
}

fn params<T: DeserializeOwned>(kind: StateKind, parameters: &Parameters) -> Result<T> {
    serde_json::from_value(Value::Object(parameters.clone()))
        .map_err(|e| Error::invalid(kind, e.to_string()))
}

fn hash_spec(kind: StateKind, key: &str, value: &str) -> Result<HashSpec> {
    value
        .parse()
        .map_err(|e| Error::invalid(kind, format!("{key}: {e}")))
}

fn managed(kind: StateKind, raw: ManagedParams) -> Result<ManagedSpec> {
    let source = match (raw.source, raw.contents) {
        (Some(uri), None) => {
            let mut descriptor = ContentDescriptor::new(uri);
            if let Some(hash) = &raw.source_hash {
                descriptor = descriptor.with_hash(hash_spec(kind, "source_hash", hash)?);
            }
            ContentSource::Remote(descriptor)
        }
        (None, Some(contents)) => {
            if raw.source_hash.is_some() {
                return Err(Error::invalid(kind, "source_hash requires source"));
            }
            ContentSource::Inline(contents)
        }
        (Some(_), Some(_)) => {
            return Err(Error::invalid(kind, "source and contents are mutually exclusive"));
        }
        (None, None) => return Err(Error::invalid(kind, "one of source or contents is required")),
    };

    Ok(ManagedSpec {
        source,
        makedirs: raw.makedirs,
        replace: raw.replace,
    })
}
