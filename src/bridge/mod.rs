// Author: Dustin Pilgrim
// License: MIT

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::ast::Document;
use crate::config::RunConfig;
use crate::convert::globals_from_json;
use crate::parser::parse_template;
use crate::render::Renderer;
use crate::store::Store;
use crate::utils::read_text;
use crate::value::Value;
use crate::GeeError;

mod host;

pub use host::{run_script, run_templated_script};

/// One metadata entry passed along with a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPair {
    pub key: String,
    pub value: String,
}

impl fmt::Display for MetadataPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

pub fn build_metadata_pair(key: impl Into<String>, value: impl Into<String>) -> MetadataPair {
    MetadataPair { key: key.into(), value: value.into() }
}

/// The operations a driving script can call, bound to one run.
///
/// Holds the read-only global store built from the data file and a cache
/// of parsed templates keyed by resolved path.
pub struct Bridge {
    config: RunConfig,
    globals: Store<'static>,
    renderer: Renderer,
    documents: RefCell<HashMap<PathBuf, Rc<Document>>>,
}

impl Bridge {
    pub fn new(config: RunConfig, globals: Store<'static>) -> Self {
        let renderer = Renderer::new(config.max_depth);
        Bridge { config, globals, renderer, documents: RefCell::new(HashMap::new()) }
    }

    /// Read the data file named by `config` and build the global store.
    pub fn load(config: RunConfig) -> Result<Self, GeeError> {
        config.syntax.validate()?;

        let data_path = config.data_file();
        let text = read_text(&data_path)
            .map_err(|e| GeeError::data(data_path.display().to_string(), e.to_string()))?;
        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| GeeError::data(data_path.display().to_string(), format!("Invalid JSON: {}", e)))?;

        debug!("Loaded data file {}", data_path.display());
        Ok(Self::new(config, globals_from_json(&json)?))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Parsed template at `path`, parsing it on first use.
    pub fn document(&self, path: &Path) -> Result<Rc<Document>, GeeError> {
        if let Some(document) = self.documents.borrow().get(path) {
            return Ok(Rc::clone(document));
        }

        let source = read_text(path)
            .map_err(|e| GeeError::template_not_found(path.display().to_string(), e.to_string()))?;
        let document = parse_template(&source, &self.config.syntax).map_err(|err| {
            warn!("Failed to parse template {}", path.display());
            err
        })?;

        debug!("Parsed template {} ({} top-level node(s))", path.display(), document.nodes.len());
        let document = Rc::new(document);
        self.documents.borrow_mut().insert(path.to_path_buf(), Rc::clone(&document));
        Ok(document)
    }

    /// Render the template at `path` with `metadata` layered over the globals.
    ///
    /// Later pairs win over earlier ones, and any pair wins over a global
    /// of the same name.
    pub fn render_file(&self, path: &Path, metadata: &[MetadataPair]) -> Result<String, GeeError> {
        let document = self.document(path)?;
        let mut store = self.globals.scope();
        for pair in metadata {
            store.set(pair.key.as_str(), Value::String(pair.value.clone()));
        }
        self.renderer.render(&document, &store)
    }

    /// Render the entry template. Its output is the driving script.
    pub fn render_entry(&self) -> Result<String, GeeError> {
        self.render_file(&self.config.entry_path(), &[])
    }

    pub fn render_template(&self, template: &str, output: &str, metadata: &[MetadataPair]) -> Result<(), GeeError> {
        let text = self.render_file(&self.config.resolve(template), metadata)?;
        let output_path = self.config.resolve(output);
        write_output(&output_path, &text)?;
        info!("Wrote {} ({} bytes)", output_path.display(), text.len());
        Ok(())
    }

    /// Copy the files directly inside `source` into `dest`.
    ///
    /// Subdirectories are skipped. A missing `source` is not an error and
    /// leaves `dest` untouched.
    pub fn copy_folder(&self, source: &str, dest: &str) -> Result<(), GeeError> {
        let source_dir = self.config.resolve(source);
        if !source_dir.is_dir() {
            debug!("Skipping copy, {} does not exist", source_dir.display());
            return Ok(());
        }

        let dest_dir = self.config.resolve(dest);
        let fail = |path: &Path, e: std::io::Error| GeeError::output_write(path.display().to_string(), e.to_string());

        fs::create_dir_all(&dest_dir).map_err(|e| fail(&dest_dir, e))?;

        let mut copied = 0;
        for entry in fs::read_dir(&source_dir).map_err(|e| fail(&source_dir, e))? {
            let path = entry.map_err(|e| fail(&source_dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name() else { continue };
            let target = dest_dir.join(name);
            fs::copy(&path, &target).map_err(|e| fail(&target, e))?;
            copied += 1;
        }

        info!("Copied {} file(s) from {} to {}", copied, source_dir.display(), dest_dir.display());
        Ok(())
    }
}

/// Write UTF-8 text (no byte-order mark), creating parent folders.
fn write_output(path: &Path, text: &str) -> Result<(), GeeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| GeeError::output_write(parent.display().to_string(), e.to_string()))?;
    }
    fs::write(path, text.as_bytes()).map_err(|e| GeeError::output_write(path.display().to_string(), e.to_string()))
}
