//! The engine: configuration shared by every template it compiles.
//!
//! An [`Engine`] holds the helpers, the resolver chain, the template loader,
//! the default delimiters and the default locale. It is cheap to clone and
//! safe to share across threads; templates keep a handle to the engine that
//! compiled them.
//!
//! # Example
//!
//! ```rust
//! use whisker::{Engine, MapLoader, Value};
//!
//! let engine = Engine::builder()
//!     .loader(MapLoader::new().with("item", "<li>{{.}}</li>"))
//!     .default_locale("en_US")
//!     .build()
//!     .unwrap();
//!
//! let template = engine.compile("<ul>{{#items}}{{> item}}{{/items}}</ul>").unwrap();
//! let out = template.render(&Value::map([("items", vec!["a", "b"])])).unwrap();
//! assert_eq!(out, "<ul><li>a</li><li>b</li></ul>");
//! ```

use std::fmt;
use std::sync::Arc;

use whisker_syntax::{DEFAULT_END_DELIMITER, DEFAULT_START_DELIMITER};

use crate::error::{Result, WhiskerError};
use crate::helpers::{Helper, HelperRegistry};
use crate::loader::{MapLoader, TemplateLoader};
use crate::locale::Locale;
use crate::resolver::{default_resolvers, ValueResolver};
use crate::template::Template;
use crate::value::Value;

struct EngineState {
    helpers: HelperRegistry,
    resolvers: Vec<Arc<dyn ValueResolver>>,
    loader: Box<dyn TemplateLoader>,
    start_delimiter: String,
    end_delimiter: String,
    default_locale: Locale,
}

#[derive(Clone)]
pub struct Engine {
    state: Arc<EngineState>,
}

impl Engine {
    /// An engine with the built-in helpers and resolvers, no templates to
    /// load, `{{ }}` delimiters and the platform locale.
    pub fn new() -> Self {
        EngineBuilder::new().build_unchecked()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Compiles `source` with the engine's delimiters.
    pub fn compile(&self, source: &str) -> Result<Template> {
        self.compile_with_delimiters(source, &self.state.start_delimiter, &self.state.end_delimiter)
    }

    pub fn compile_with_delimiters(
        &self,
        source: &str,
        start_delimiter: &str,
        end_delimiter: &str,
    ) -> Result<Template> {
        let fragment =
            whisker_syntax::parse_with_delimiters(source, start_delimiter, end_delimiter)?;
        Ok(Template::new(self.clone(), fragment, source, None))
    }

    /// Loads the template at `path` through the loader and compiles it.
    pub fn compile_path(&self, path: &str) -> Result<Template> {
        let source = self.state.loader.load(path)?;
        let fragment = whisker_syntax::parse_with_delimiters(
            &source,
            &self.state.start_delimiter,
            &self.state.end_delimiter,
        )?;
        log::trace!("compiled template '{}'", path);
        Ok(Template::new(self.clone(), fragment, &source, Some(path)))
    }

    /// Compiles and renders `source` in one step.
    pub fn render(&self, source: &str, model: &Value) -> Result<String> {
        self.compile(source)?.render(model)
    }

    pub fn helper(&self, name: &str) -> Option<&Arc<dyn Helper>> {
        self.state.helpers.get(name)
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.state.helpers
    }

    pub fn resolvers(&self) -> &[Arc<dyn ValueResolver>] {
        &self.state.resolvers
    }

    pub fn start_delimiter(&self) -> &str {
        &self.state.start_delimiter
    }

    pub fn end_delimiter(&self) -> &str {
        &self.state.end_delimiter
    }

    pub fn default_locale(&self) -> &Locale {
        &self.state.default_locale
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("helpers", &self.state.helpers)
            .field("resolvers", &self.state.resolvers.len())
            .field("start_delimiter", &self.state.start_delimiter)
            .field("end_delimiter", &self.state.end_delimiter)
            .field("default_locale", &self.state.default_locale.to_string())
            .finish()
    }
}

/// Configures an [`Engine`].
pub struct EngineBuilder {
    helpers: HelperRegistry,
    resolvers: Vec<Arc<dyn ValueResolver>>,
    loader: Option<Box<dyn TemplateLoader>>,
    start_delimiter: String,
    end_delimiter: String,
    default_locale: Option<String>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        EngineBuilder {
            helpers: HelperRegistry::with_builtins(),
            resolvers: Vec::new(),
            loader: None,
            start_delimiter: DEFAULT_START_DELIMITER.to_string(),
            end_delimiter: DEFAULT_END_DELIMITER.to_string(),
            default_locale: None,
        }
    }

    /// Registers a helper. A helper named like a built-in replaces it.
    pub fn helper(mut self, name: impl Into<String>, helper: impl Helper + 'static) -> Self {
        self.helpers.register(name, helper);
        self
    }

    /// Adds a resolver. Added resolvers run in the order they were added,
    /// before the built-in ones.
    pub fn resolver(mut self, resolver: impl ValueResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn loader(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_delimiter = start.into();
        self.end_delimiter = end.into();
        self
    }

    /// Sets the locale `dateFormat` uses when a template does not name one.
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// Builds the engine, validating the delimiters and default locale.
    pub fn build(self) -> Result<Engine> {
        if self.start_delimiter.is_empty() || self.end_delimiter.is_empty() {
            return Err(WhiskerError::argument_type(
                format!("{:?} {:?}", self.start_delimiter, self.end_delimiter),
                "non-empty delimiters",
            ));
        }
        let default_locale = match &self.default_locale {
            Some(locale) => Some(Locale::parse(locale)?),
            None => None,
        };
        Ok(self.finish(default_locale))
    }

    fn build_unchecked(self) -> Engine {
        self.finish(None)
    }

    fn finish(self, default_locale: Option<Locale>) -> Engine {
        let mut resolvers = self.resolvers;
        resolvers.extend(default_resolvers());
        Engine {
            state: Arc::new(EngineState {
                helpers: self.helpers,
                resolvers,
                loader: self.loader.unwrap_or_else(|| Box::new(MapLoader::new())),
                start_delimiter: self.start_delimiter,
                end_delimiter: self.end_delimiter,
                default_locale: default_locale.unwrap_or_else(Locale::platform),
            }),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
