// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::resolve_path;
use crate::GeeError;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The three literal markers of the block grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syntax {
    pub begin: String,
    #[serde(rename = "continue")]
    pub cont: String,
    pub end: String,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            begin: "{{".into(),
            cont: "||".into(),
            end: "}}".into(),
        }
    }
}

impl Syntax {
    /// Build a delimiter set. Markers must be non-empty and distinct.
    pub fn new(begin: &str, cont: &str, end: &str) -> Result<Self, GeeError> {
        let syntax = Syntax {
            begin: begin.to_string(),
            cont: cont.to_string(),
            end: end.to_string(),
        };
        syntax.validate()?;
        Ok(syntax)
    }

    pub fn validate(&self) -> Result<(), GeeError> {
        let markers = [&self.begin, &self.cont, &self.end];
        if markers.iter().any(|m| m.trim().is_empty()) {
            return Err(GeeError::Config {
                message: "Delimiters cannot be empty or whitespace".into(),
                hint: Some("The defaults are '{{', '||' and '}}'".into()),
                code: Some(501),
            });
        }
        if self.begin == self.cont || self.begin == self.end || self.cont == self.end {
            return Err(GeeError::Config {
                message: format!(
                    "Delimiters must be distinct, got '{}', '{}', '{}'",
                    self.begin, self.cont, self.end
                ),
                hint: None,
                code: Some(502),
            });
        }
        Ok(())
    }
}

/// Everything one generation run needs, built once at start-up.
///
/// Relative paths, both these and the ones a script passes to the host
/// functions, resolve against `work_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub entry_template: PathBuf,
    pub data_path: PathBuf,
    pub work_dir: PathBuf,
    pub syntax: Syntax,
    pub max_depth: usize,
}

impl RunConfig {
    pub fn new(entry_template: impl AsRef<Path>, data_path: impl AsRef<Path>, work_dir: impl AsRef<Path>) -> Self {
        RunConfig {
            entry_template: entry_template.as_ref().to_path_buf(),
            data_path: data_path.as_ref().to_path_buf(),
            work_dir: work_dir.as_ref().to_path_buf(),
            syntax: Syntax::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve a path as seen from the work folder.
    pub fn resolve(&self, raw_path: &str) -> PathBuf {
        resolve_path(raw_path, &self.work_dir)
    }

    pub fn entry_path(&self) -> PathBuf {
        self.resolve(&self.entry_template.to_string_lossy())
    }

    pub fn data_file(&self) -> PathBuf {
        self.resolve(&self.data_path.to_string_lossy())
    }
}
