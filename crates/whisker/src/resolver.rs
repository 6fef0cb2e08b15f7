//! Pluggable member lookup.
//!
//! A [`ValueResolver`] answers one question: given a value and a member name,
//! what is the member? Resolvers are consulted in order and the first one that
//! answers wins, so an explicit [`Value::Null`] stops the search just like any
//! other value. Only [`Resolved::Unresolved`] moves on to the next resolver.
//!
//! The built-in chain is [`MapResolver`], [`IndexResolver`] and
//! [`ObjectResolver`]. Resolvers registered on the engine builder run before
//! them.
//!
//! # Example
//!
//! ```rust
//! use whisker::{Engine, Resolved, Value};
//!
//! // Expose the upper-cased form of any string as `upper`.
//! let engine = Engine::builder()
//!     .resolver(|data: &Value, name: &str| match (data, name) {
//!         (Value::String(s), "upper") => Resolved::Value(Value::from(s.to_uppercase())),
//!         _ => Resolved::Unresolved,
//!     })
//!     .build()
//!     .unwrap();
//!
//! let out = engine.render("{{name.upper}}", &Value::map([("name", "ada")])).unwrap();
//! assert_eq!(out, "ADA");
//! ```

use std::sync::Arc;

use crate::value::Value;

/// Outcome of a single resolver lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The resolver knows the member. `Value::Null` is a valid answer.
    Value(Value),
    /// The resolver does not know the member; the next one is asked.
    Unresolved,
}

impl Resolved {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolved::Value(_))
    }

    pub fn into_option(self) -> Option<Value> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::Unresolved => None,
        }
    }
}

impl From<Option<Value>> for Resolved {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Resolved::Unresolved, Resolved::Value)
    }
}

/// Looks up a named member of a value.
pub trait ValueResolver: Send + Sync {
    fn resolve(&self, data: &Value, name: &str) -> Resolved;
}

impl<F> ValueResolver for F
where
    F: Fn(&Value, &str) -> Resolved + Send + Sync,
{
    fn resolve(&self, data: &Value, name: &str) -> Resolved {
        self(data, name)
    }
}

/// Resolves keys of [`Value::Map`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MapResolver;

impl ValueResolver for MapResolver {
    fn resolve(&self, data: &Value, name: &str) -> Resolved {
        match data {
            Value::Map(map) => map.get(name).cloned().into(),
            _ => Resolved::Unresolved,
        }
    }
}

/// Resolves numeric indexes and `length` on sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexResolver;

impl ValueResolver for IndexResolver {
    fn resolve(&self, data: &Value, name: &str) -> Resolved {
        match data {
            Value::Array(items) => index(items, name),
            Value::Object(object) => match object.elements() {
                Some(items) => index(&items, name),
                None => Resolved::Unresolved,
            },
            _ => Resolved::Unresolved,
        }
    }
}

fn index(items: &[Value], name: &str) -> Resolved {
    if name == "length" {
        return Resolved::Value(Value::from(items.len()));
    }
    match name.parse::<usize>() {
        Ok(i) => items.get(i).cloned().into(),
        Err(_) => Resolved::Unresolved,
    }
}

/// Resolves members of host [`Object`](crate::Object)s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectResolver;

impl ValueResolver for ObjectResolver {
    fn resolve(&self, data: &Value, name: &str) -> Resolved {
        match data {
            Value::Object(object) => object.get(name).into(),
            _ => Resolved::Unresolved,
        }
    }
}

/// The built-in resolver chain.
pub fn default_resolvers() -> Vec<Arc<dyn ValueResolver>> {
    vec![
        Arc::new(MapResolver),
        Arc::new(IndexResolver),
        Arc::new(ObjectResolver),
    ]
}
