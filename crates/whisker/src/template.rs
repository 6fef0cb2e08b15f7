//! Compiled templates.

use std::fmt;
use std::io;
use std::sync::Arc;

use serde::Serialize;
use whisker_syntax::Fragment;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::Result;
use crate::partials::PartialRegistry;
use crate::render::{self, IoSink};
use crate::value::Value;

/// A compiled template, ready to render any number of times.
///
/// Templates are immutable and can be rendered from several threads at once.
/// Each render starts with an empty partial registry.
#[derive(Clone)]
pub struct Template {
    engine: Engine,
    fragment: Fragment,
    source: Arc<str>,
    name: Option<String>,
}

impl Template {
    pub(crate) fn new(engine: Engine, fragment: Fragment, source: &str, name: Option<&str>) -> Self {
        Template {
            engine,
            fragment,
            source: Arc::from(source),
            name: name.map(str::to_string),
        }
    }

    /// Renders against `model`, writing to `writer` as rendering proceeds.
    ///
    /// On error, whatever was written before the failure stays written.
    pub fn apply<W: io::Write>(&self, model: &Value, writer: W) -> Result<()> {
        let scope = Context::root(model.clone(), self.engine.resolvers());
        let mut partials = PartialRegistry::new();
        let mut sink = IoSink(writer);
        render::render_fragment(&self.engine, &self.fragment, &scope, &mut partials, &mut sink)?;
        sink.flush()
    }

    /// Renders against `model` into a string.
    pub fn render(&self, model: &Value) -> Result<String> {
        let scope = Context::root(model.clone(), self.engine.resolvers());
        let mut partials = PartialRegistry::new();
        render::render_to_string(&self.engine, &self.fragment, &scope, &mut partials)
    }

    /// Renders against any serializable type.
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        self.render(&Value::from_serialize(data)?)
    }

    /// The template re-serialized from its syntax tree.
    pub fn text(&self) -> String {
        self.fragment.text()
    }

    /// The source text the template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The path the template was loaded from, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
