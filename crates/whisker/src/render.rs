//! The render walk.
//!
//! Nodes are rendered in order straight into a [`Sink`]. Sections dispatch to
//! a helper: the one registered under the section's name, or, when there is
//! none, a built-in picked from the section's value:
//!
//! 1. inverted sections go to `unless`
//! 2. sequences go to `each`
//! 3. booleans go to `if`
//! 4. lambdas go to `with`, with the body replaced by the lambda's output
//! 5. anything else goes to `with`, in a child scope holding the value
//!
//! A value can satisfy several of these; the first match wins.

use std::collections::BTreeMap;
use std::io;

use whisker_syntax::{Block, Fragment, Hash, Node, Param, Partial, Variable};

use crate::context::Context;
use crate::engine::Engine;
use crate::error::{Result, WhiskerError};
use crate::helpers::{BuiltIn, Helper, Output};
use crate::lambda;
use crate::options::Options;
use crate::partials::PartialRegistry;
use crate::util::escape_html;
use crate::value::Value;

/// Destination of rendered text.
pub(crate) trait Sink {
    fn write_str(&mut self, text: &str) -> Result<()>;
}

impl Sink for String {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.push_str(text);
        Ok(())
    }
}

pub(crate) struct IoSink<W>(pub W);

impl<W: io::Write> Sink for IoSink<W> {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.0
            .write_all(text.as_bytes())
            .map_err(|err| WhiskerError::render_caused_by("writing output failed", err))
    }
}

impl<W: io::Write> IoSink<W> {
    pub(crate) fn flush(&mut self) -> Result<()> {
        self.0
            .flush()
            .map_err(|err| WhiskerError::render_caused_by("flushing output failed", err))
    }
}

pub(crate) fn render_to_string(
    engine: &Engine,
    fragment: &Fragment,
    scope: &Context<'_>,
    partials: &mut PartialRegistry,
) -> Result<String> {
    let mut buffer = String::new();
    render_fragment(engine, fragment, scope, partials, &mut buffer)?;
    Ok(buffer)
}

pub(crate) fn render_fragment(
    engine: &Engine,
    fragment: &Fragment,
    scope: &Context<'_>,
    partials: &mut PartialRegistry,
    out: &mut dyn Sink,
) -> Result<()> {
    for node in fragment.nodes() {
        match node {
            Node::Literal(text) => out.write_str(text)?,
            Node::Comment(_) => {}
            Node::Variable(variable) => render_variable(engine, variable, scope, partials, out)?,
            Node::Partial(partial) => render_partial(engine, partial, scope, partials, out)?,
            Node::Block(block) => render_block(engine, block, scope, partials, out)?,
        }
    }
    Ok(())
}

fn render_variable(
    engine: &Engine,
    variable: &Variable,
    scope: &Context<'_>,
    partials: &mut PartialRegistry,
    out: &mut dyn Sink,
) -> Result<()> {
    let escape = variable.escape.escapes();

    if let Some(helper) = engine.helper(&variable.name) {
        let (value, params) = split_arguments(&variable.params, scope);
        let hash = evaluate_hash(&variable.hash, scope);
        let mut options = Options::new(engine, scope, partials).with_arguments(params, hash);
        return match helper.call(&value, &mut options)? {
            Some(Output::Text(text)) if escape => out.write_str(&escape_html(&text)),
            Some(output) => out.write_str(output.as_str()),
            None => Ok(()),
        };
    }

    let Some(value) = scope.get(&variable.name) else {
        log::trace!("'{}' not found", variable.name);
        return Ok(());
    };
    let text = match value.as_lambda() {
        Some(lambda) => {
            let fragment = lambda::compile(
                lambda,
                scope,
                &Fragment::empty(),
                engine.start_delimiter(),
                engine.end_delimiter(),
            )?;
            render_to_string(engine, &fragment, scope, partials)?
        }
        None => value.to_string(),
    };
    if escape {
        out.write_str(&escape_html(&text))
    } else {
        out.write_str(&text)
    }
}

fn render_partial(
    engine: &Engine,
    partial: &Partial,
    scope: &Context<'_>,
    partials: &mut PartialRegistry,
    out: &mut dyn Sink,
) -> Result<()> {
    let fragment = match partials.get(&partial.path) {
        Some(fragment) => fragment.clone(),
        None => engine
            .compile_path(&partial.path)
            .map_err(|err| {
                WhiskerError::render_caused_by(
                    format!("cannot load partial '{}'", partial.path),
                    err,
                )
            })?
            .fragment()
            .clone(),
    };
    render_fragment(engine, &fragment, scope, partials, out)
}

fn render_block(
    engine: &Engine,
    block: &Block,
    scope: &Context<'_>,
    partials: &mut PartialRegistry,
    out: &mut dyn Sink,
) -> Result<()> {
    let body = block
        .body()
        .ok_or_else(|| WhiskerError::render(format!("section '{}' has no body", block.name())))?;
    let inverse = block.inverse().cloned();

    if let Some(helper) = engine.helper(block.name()) {
        let (value, params) = split_arguments(block.params(), scope);
        let hash = evaluate_hash(block.hash(), scope);
        let mut options = Options::new(engine, scope, partials)
            .with_body(body.clone(), inverse)
            .with_arguments(params, hash);
        return write_block_output(helper.call(&value, &mut options)?, out);
    }

    let value = scope.get(block.name()).unwrap_or(Value::Null);

    let output = if block.inverted() {
        let (params, hash) = section_arguments(block, scope, scope);
        let mut options = Options::new(engine, scope, partials)
            .with_body(body.clone(), inverse)
            .with_arguments(params, hash);
        BuiltIn::Unless.call(&value, &mut options)?
    } else if value.is_iterable() {
        let (params, hash) = section_arguments(block, scope, scope);
        let mut options = Options::new(engine, scope, partials)
            .with_body(body.clone(), inverse)
            .with_arguments(params, hash);
        BuiltIn::Each.call(&value, &mut options)?
    } else if matches!(value, Value::Bool(_)) {
        let (params, hash) = section_arguments(block, scope, scope);
        let mut options = Options::new(engine, scope, partials)
            .with_body(body.clone(), inverse)
            .with_arguments(params, hash);
        BuiltIn::If.call(&value, &mut options)?
    } else if let Some(lambda) = value.as_lambda() {
        let fragment = lambda::compile(
            lambda,
            scope,
            body,
            block.start_delimiter(),
            block.end_delimiter(),
        )?;
        let (params, hash) = section_arguments(block, scope, scope);
        let mut options = Options::new(engine, scope, partials)
            .with_body(fragment, inverse)
            .with_arguments(params, hash)
            .in_place();
        BuiltIn::With.call(&value, &mut options)?
    } else {
        let child = scope.child(value.clone());
        let (params, hash) = section_arguments(block, scope, &child);
        let mut options = Options::new(engine, &child, partials)
            .with_body(body.clone(), inverse)
            .with_arguments(params, hash)
            .in_place();
        BuiltIn::With.call(&value, &mut options)?
    };
    write_block_output(output, out)
}

fn write_block_output(output: Option<Output>, out: &mut dyn Sink) -> Result<()> {
    match output {
        Some(output) => out.write_str(output.as_str()),
        None => Ok(()),
    }
}

/// Arguments of a section without a helper: params are read from the scope
/// the body renders in, the hash from the scope enclosing the section.
fn section_arguments(
    block: &Block,
    enclosing: &Context<'_>,
    inner: &Context<'_>,
) -> (Vec<Value>, BTreeMap<String, Value>) {
    (
        evaluate_params(block.params(), inner),
        evaluate_hash(block.hash(), enclosing),
    )
}

/// Splits evaluated arguments into the helper's value and the rest.
///
/// Without arguments the value is the current scope's data.
fn split_arguments(params: &[Param], scope: &Context<'_>) -> (Value, Vec<Value>) {
    let mut values = evaluate_params(params, scope);
    if values.is_empty() {
        (scope.data().clone(), values)
    } else {
        let value = values.remove(0);
        (value, values)
    }
}

fn evaluate_params(params: &[Param], scope: &Context<'_>) -> Vec<Value> {
    params.iter().map(|param| evaluate(param, scope)).collect()
}

fn evaluate_hash(hash: &Hash, scope: &Context<'_>) -> BTreeMap<String, Value> {
    hash.iter()
        .map(|(key, param)| (key.clone(), evaluate(param, scope)))
        .collect()
}

fn evaluate(param: &Param, scope: &Context<'_>) -> Value {
    match param {
        Param::Path(path) => scope.get(path).unwrap_or(Value::Null),
        Param::Str(s) => Value::String(s.clone()),
        Param::Int(n) => Value::Int(*n),
        Param::Float(n) => Value::Float(*n),
        Param::Bool(b) => Value::Bool(*b),
        Param::Null => Value::Null,
    }
}
