//! The invocation record handed to helpers.
//!
//! [`Options`] bundles everything a helper may need beyond its first
//! argument: the section body and inverse, the remaining positional
//! arguments, the `key=value` arguments, the current scope and the partials
//! registered so far in this render.

use std::collections::BTreeMap;

use whisker_syntax::Fragment;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::Result;
use crate::partials::PartialRegistry;
use crate::render;
use crate::template::Template;
use crate::value::Value;

pub struct Options<'a> {
    engine: &'a Engine,
    body: Fragment,
    inverse: Option<Fragment>,
    scope: &'a Context<'a>,
    params: Vec<Value>,
    hash: BTreeMap<String, Value>,
    partials: &'a mut PartialRegistry,
    in_place: bool,
}

impl<'a> Options<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        scope: &'a Context<'a>,
        partials: &'a mut PartialRegistry,
    ) -> Self {
        Options {
            engine,
            body: Fragment::empty(),
            inverse: None,
            scope,
            params: Vec::new(),
            hash: BTreeMap::new(),
            partials,
            in_place: false,
        }
    }

    pub(crate) fn with_body(mut self, body: Fragment, inverse: Option<Fragment>) -> Self {
        self.body = body;
        self.inverse = inverse;
        self
    }

    pub(crate) fn with_arguments(
        mut self,
        params: Vec<Value>,
        hash: BTreeMap<String, Value>,
    ) -> Self {
        self.params = params;
        self.hash = hash;
        self
    }

    /// Marks the scope as already holding the helper's value.
    pub(crate) fn in_place(mut self) -> Self {
        self.in_place = true;
        self
    }

    pub(crate) fn renders_in_place(&self) -> bool {
        self.in_place
    }

    pub fn engine(&self) -> &Engine {
        self.engine
    }

    pub fn scope(&self) -> &Context<'a> {
        self.scope
    }

    pub fn body(&self) -> &Fragment {
        &self.body
    }

    pub fn inverse(&self) -> Option<&Fragment> {
        self.inverse.as_ref()
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    /// The positional argument at `index` when it is a string.
    pub fn param_str(&self, index: usize) -> Option<&str> {
        self.param(index).and_then(Value::as_str)
    }

    pub fn hash(&self, name: &str) -> Option<&Value> {
        self.hash.get(name)
    }

    pub fn hash_map(&self) -> &BTreeMap<String, Value> {
        &self.hash
    }

    /// Renders the body against the current scope.
    pub fn render_body(&mut self) -> Result<String> {
        render::render_to_string(self.engine, &self.body, self.scope, self.partials)
    }

    /// Renders the body in a child scope holding `value`.
    pub fn render_body_with(&mut self, value: Value) -> Result<String> {
        let child = self.scope.child(value);
        render::render_to_string(self.engine, &self.body, &child, self.partials)
    }

    /// Renders the body in a child scope holding `value` and the given locals.
    pub fn render_body_with_locals<I, K, V>(&mut self, value: Value, locals: I) -> Result<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let child = locals
            .into_iter()
            .fold(self.scope.child(value), |scope, (k, v)| scope.with_local(k, v));
        render::render_to_string(self.engine, &self.body, &child, self.partials)
    }

    /// Renders the inverse against the current scope, or nothing without one.
    pub fn render_inverse(&mut self) -> Result<String> {
        match &self.inverse {
            Some(inverse) => {
                render::render_to_string(self.engine, inverse, self.scope, self.partials)
            }
            None => Ok(String::new()),
        }
    }

    /// Renders any fragment against the current scope.
    pub fn render(&mut self, fragment: &Fragment) -> Result<String> {
        render::render_to_string(self.engine, fragment, self.scope, self.partials)
    }

    pub fn partial(&self, name: &str) -> Option<Fragment> {
        self.partials.get(name).cloned()
    }

    /// Registers a partial for the rest of this render.
    pub fn register_partial(&mut self, name: impl Into<String>, fragment: Fragment) {
        let name = name.into();
        log::trace!("registering partial '{}'", name);
        self.partials.insert(name, fragment);
    }

    /// Loads and compiles a template through the engine's loader.
    pub fn compile_path(&self, path: &str) -> Result<Template> {
        self.engine.compile_path(path)
    }
}

impl std::fmt::Debug for Options<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("body", &self.body.text())
            .field("inverse", &self.inverse.as_ref().map(Fragment::text))
            .field("params", &self.params)
            .field("hash", &self.hash)
            .field("scope", self.scope)
            .finish()
    }
}
