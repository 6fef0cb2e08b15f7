//! Helpers: named functions invoked from sections and variables.
//!
//! A helper receives the value of its first argument (or the current scope
//! when the tag has none) and an [`Options`] record with everything else.
//! It returns [`Output`] to write, or `None` to write nothing.
//!
//! ```text
//! {{#each items}}...{{/each}}       each(items, options)
//! {{dateFormat when "short" "fr"}}  dateFormat(when, options.params = ["short", "fr"])
//! ```
//!
//! Section names that are not registered helpers go through implicit
//! dispatch: depending on the value they resolve to, the section behaves
//! like `unless`, `each`, `if` or `with`. See [`BuiltIn`].
//!
//! # Registering a Helper
//!
//! Any `Fn(&Value, &mut Options) -> HelperResult` is a helper:
//!
//! ```rust
//! use whisker::{Engine, HelperResult, Options, Output, Value};
//!
//! fn shout(value: &Value, _options: &mut Options<'_>) -> HelperResult {
//!     Ok(Some(Output::Text(value.to_string().to_uppercase())))
//! }
//!
//! let engine = Engine::builder().helper("shout", shout).build().unwrap();
//! let out = engine.render("{{shout name}}", &Value::map([("name", "ada")])).unwrap();
//! assert_eq!(out, "ADA");
//! ```

mod builtin;
mod date;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::options::Options;
use crate::value::Value;

/// Text produced by a helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Escaped when written through an escaping variable tag.
    Text(String),
    /// Written as-is, even through an escaping variable tag.
    Safe(String),
}

impl Output {
    pub fn as_str(&self) -> &str {
        match self {
            Output::Text(s) | Output::Safe(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Output::Text(s) | Output::Safe(s) => s,
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Output::Safe(_))
    }
}

impl From<String> for Output {
    fn from(s: String) -> Self {
        Output::Text(s)
    }
}

impl From<&str> for Output {
    fn from(s: &str) -> Self {
        Output::Text(s.to_string())
    }
}

pub type HelperResult = Result<Option<Output>>;

pub trait Helper: Send + Sync {
    fn call(&self, value: &Value, options: &mut Options<'_>) -> HelperResult;
}

impl<F> Helper for F
where
    F: Fn(&Value, &mut Options<'_>) -> HelperResult + Send + Sync,
{
    fn call(&self, value: &Value, options: &mut Options<'_>) -> HelperResult {
        self(value, options)
    }
}

/// The helpers every engine starts with.
///
/// | Name | Behavior |
/// |------|----------|
/// | `with` | Body against the value, even a falsy one |
/// | `each` | Body once per element with `@index`, `@first`, `@last`; inverse when empty |
/// | `if` | Body when truthy, inverse otherwise |
/// | `unless` | Inverse when truthy, body otherwise |
/// | `block` | Partial of that name, else the template at that path, else the body |
/// | `partial` | Registers the body as a partial; writes nothing |
/// | `embedded` | The template at that path wrapped in a `<script>` tag |
/// | `dateFormat` | A date in a named style or pattern, in a locale |
/// | `log` | Logs the value at info level; writes nothing |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    With,
    Each,
    If,
    Unless,
    Block,
    Partial,
    Embedded,
    DateFormat,
    Log,
}

impl BuiltIn {
    pub const ALL: [BuiltIn; 9] = [
        BuiltIn::With,
        BuiltIn::Each,
        BuiltIn::If,
        BuiltIn::Unless,
        BuiltIn::Block,
        BuiltIn::Partial,
        BuiltIn::Embedded,
        BuiltIn::DateFormat,
        BuiltIn::Log,
    ];

    /// The name templates use to call this helper.
    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::With => "with",
            BuiltIn::Each => "each",
            BuiltIn::If => "if",
            BuiltIn::Unless => "unless",
            BuiltIn::Block => "block",
            BuiltIn::Partial => "partial",
            BuiltIn::Embedded => "embedded",
            BuiltIn::DateFormat => "dateFormat",
            BuiltIn::Log => "log",
        }
    }
}

impl Helper for BuiltIn {
    fn call(&self, value: &Value, options: &mut Options<'_>) -> HelperResult {
        match self {
            BuiltIn::With => builtin::with(value, options),
            BuiltIn::Each => builtin::each(value, options),
            BuiltIn::If => builtin::if_(value, options),
            BuiltIn::Unless => builtin::unless(value, options),
            BuiltIn::Block => builtin::block(value, options),
            BuiltIn::Partial => builtin::partial(value, options),
            BuiltIn::Embedded => builtin::embedded(value, options),
            BuiltIn::DateFormat => date::date_format(value, options),
            BuiltIn::Log => builtin::log(value, options),
        }
    }
}

impl fmt::Display for BuiltIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Helpers by name.
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: HashMap<String, Arc<dyn Helper>>,
}

impl HelperRegistry {
    /// A registry with no helpers at all.
    pub fn empty() -> Self {
        HelperRegistry {
            helpers: HashMap::new(),
        }
    }

    /// A registry holding every [`BuiltIn`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for builtin in BuiltIn::ALL {
            registry.register(builtin.name(), builtin);
        }
        registry
    }

    /// Adds a helper, replacing any helper of the same name.
    pub fn register(&mut self, name: impl Into<String>, helper: impl Helper + 'static) {
        self.helpers.insert(name.into(), Arc::new(helper));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Helper>> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
