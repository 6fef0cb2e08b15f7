//! Template sources for partials, `block`, `embedded` and
//! [`Engine::compile_path`](crate::Engine::compile_path).
//!
//! A [`TemplateLoader`] maps a template path to its source text. Three
//! loaders are provided:
//!
//! - [`MapLoader`]: inline templates held in memory
//! - [`FileLoader`]: files under a root directory
//! - [`ChainLoader`]: several loaders tried in registration order
//!
//! # Path Resolution
//!
//! Paths are relative; a leading `/` is ignored. Each loader first tries the
//! path as given, then the path with its suffix (`.hbs` by default) added or,
//! when the path already ends with the suffix, removed. `"user"` and
//! `"user.hbs"` therefore find a template stored as either name.
//!
//! # Example
//!
//! ```rust
//! use whisker::{ChainLoader, MapLoader, TemplateLoader};
//!
//! let loader = ChainLoader::new()
//!     .with(MapLoader::new().with("header", "<h1>{{title}}</h1>"));
//!
//! assert_eq!(loader.load("/header.hbs").unwrap(), "<h1>{{title}}</h1>");
//! assert!(loader.load("footer").is_err());
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, WhiskerError};

/// Suffix appended to template paths that do not resolve as given.
pub const TEMPLATE_SUFFIX: &str = ".hbs";

pub trait TemplateLoader: Send + Sync {
    /// Returns the source of the template at `path`.
    ///
    /// Fails with [`WhiskerError::TemplateNotFound`] when there is none.
    fn load(&self, path: &str) -> Result<String>;
}

/// The names a path may be stored under, in lookup order.
fn candidates(path: &str, suffix: &str) -> Vec<String> {
    let path = path.trim_start_matches('/');
    let mut names = vec![path.to_string()];
    if suffix.is_empty() {
        return names;
    }
    match path.strip_suffix(suffix) {
        Some("") => {}
        Some(stem) => names.push(stem.to_string()),
        None => names.push(format!("{}{}", path, suffix)),
    }
    names
}

/// In-memory templates.
#[derive(Debug, Clone)]
pub struct MapLoader {
    templates: HashMap<String, String>,
    suffix: String,
}

impl MapLoader {
    pub fn new() -> Self {
        MapLoader {
            templates: HashMap::new(),
            suffix: TEMPLATE_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Adds a template, replacing any template of the same name.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for MapLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLoader for MapLoader {
    fn load(&self, path: &str) -> Result<String> {
        candidates(path, &self.suffix)
            .iter()
            .find_map(|name| self.templates.get(name))
            .cloned()
            .ok_or_else(|| WhiskerError::TemplateNotFound(path.to_string()))
    }
}

/// Templates read from files under a root directory.
///
/// Files are read on every load, so edits show up without rebuilding the
/// engine.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    suffix: String,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileLoader {
            root: root.into(),
            suffix: TEMPLATE_SUFFIX.to_string(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl TemplateLoader for FileLoader {
    fn load(&self, path: &str) -> Result<String> {
        for name in candidates(path, &self.suffix) {
            let file = self.root.join(&name);
            if file.is_file() {
                log::trace!("loading template '{}' from {}", path, file.display());
                return Ok(fs::read_to_string(&file)?);
            }
        }
        Err(WhiskerError::TemplateNotFound(path.to_string()))
    }
}

/// Loaders tried in registration order; the first that finds a path wins.
#[derive(Default)]
pub struct ChainLoader {
    loaders: Vec<Box<dyn TemplateLoader>>,
}

impl ChainLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, loader: impl TemplateLoader + 'static) {
        self.loaders.push(Box::new(loader));
    }

    pub fn with(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.push(loader);
        self
    }
}

impl TemplateLoader for ChainLoader {
    fn load(&self, path: &str) -> Result<String> {
        for loader in &self.loaders {
            match loader.load(path) {
                Err(WhiskerError::TemplateNotFound(_)) => continue,
                other => return other,
            }
        }
        Err(WhiskerError::TemplateNotFound(path.to_string()))
    }
}

impl std::fmt::Debug for ChainLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainLoader")
            .field("loaders", &self.loaders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        assert_eq!(candidates("/user", ".hbs"), vec!["user", "user.hbs"]);
        assert_eq!(candidates("user.hbs", ".hbs"), vec!["user.hbs", "user"]);
        assert_eq!(candidates("/.hbs", ".hbs"), vec![".hbs"]);
        assert_eq!(candidates("user", ""), vec!["user"]);
    }

    #[test]
    fn test_map_loader_suffix() {
        let loader = MapLoader::new().with("sub/user.hbs", "hi");
        assert_eq!(loader.load("sub/user").unwrap(), "hi");
        assert_eq!(loader.load("/sub/user.hbs").unwrap(), "hi");
        assert!(matches!(
            loader.load("user"),
            Err(WhiskerError::TemplateNotFound(path)) if path == "user"
        ));
    }

    #[test]
    fn test_suffixed_path_finds_bare_name() {
        let loader = MapLoader::new().with("header", "<h1>{{title}}</h1>");
        assert_eq!(loader.load("/header.hbs").unwrap(), "<h1>{{title}}</h1>");
        assert_eq!(loader.load("header").unwrap(), "<h1>{{title}}</h1>");
    }

    #[test]
    fn test_map_loader_custom_suffix() {
        let loader = MapLoader::new().with_suffix(".mustache").with("a.mustache", "x");
        assert_eq!(loader.load("a").unwrap(), "x");
        assert!(loader.load("a.hbs").is_err());
    }

    #[test]
    fn test_file_loader() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/user.hbs"), "{{name}}").unwrap();

        let loader = FileLoader::new(dir.path());
        assert_eq!(loader.load("sub/user").unwrap(), "{{name}}");
        assert_eq!(loader.load("/sub/user.hbs").unwrap(), "{{name}}");
        assert!(matches!(
            loader.load("sub"),
            Err(WhiskerError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_chain_loader_order() {
        let loader = ChainLoader::new()
            .with(MapLoader::new().with("a", "first"))
            .with(MapLoader::new().with("a", "second").with("b", "only"));
        assert_eq!(loader.load("a").unwrap(), "first");
        assert_eq!(loader.load("b").unwrap(), "only");
        assert!(loader.load("c").is_err());
    }
}
