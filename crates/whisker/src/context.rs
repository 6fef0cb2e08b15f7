//! Scopes for variable lookup during rendering.
//!
//! A [`Context`] wraps one model value and points at the scope it was pushed
//! from. Sections push child scopes, so a template can see every value on the
//! path from the root model down to the current element.
//!
//! # Lookup
//!
//! [`Context::get`] understands these path forms:
//!
//! | Path | Meaning |
//! |------|---------|
//! | `this`, `.` | The current value |
//! | `name` | Locals, then the resolver chain, then the enclosing scopes |
//! | `a.b.c` | `a` as above, then `b` and `c` as members of the result |
//! | `this.name`, `./name` | `name` on the current value only |
//! | `../name` | `name` looked up from the parent scope |
//!
//! Locals are per-scope bindings such as `@index` inside `each`.
//!
//! Lookups return `None` when nothing resolves, and `Some(Value::Null)` when a
//! resolver answered with null. The two are distinct: a null answer stops the
//! search instead of falling back to an outer scope.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::resolver::{Resolved, ValueResolver};
use crate::value::Value;

/// One level of the scope chain.
pub struct Context<'a> {
    data: Value,
    parent: Option<&'a Context<'a>>,
    locals: HashMap<String, Value>,
    resolvers: &'a [Arc<dyn ValueResolver>],
}

impl<'a> Context<'a> {
    /// Creates the outermost scope for a render.
    pub fn root(data: Value, resolvers: &'a [Arc<dyn ValueResolver>]) -> Self {
        Context {
            data,
            parent: None,
            locals: HashMap::new(),
            resolvers,
        }
    }

    /// Creates a scope whose parent is `self`.
    pub fn child(&'a self, data: Value) -> Context<'a> {
        Context {
            data,
            parent: Some(self),
            locals: HashMap::new(),
            resolvers: self.resolvers,
        }
    }

    /// Binds a local visible to this scope and its children.
    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(name.into(), value.into());
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn parent(&self) -> Option<&Context<'a>> {
        self.parent
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn resolvers(&self) -> &'a [Arc<dyn ValueResolver>] {
        self.resolvers
    }

    /// Number of scopes above this one.
    pub fn depth(&self) -> usize {
        self.parent.map_or(0, |p| p.depth() + 1)
    }

    /// Resolves `path` against this scope.
    pub fn get(&self, path: &str) -> Option<Value> {
        if path == "this" || path == "." {
            return Some(self.data.clone());
        }
        if let Some(rest) = path.strip_prefix("../") {
            return self.parent.and_then(|p| p.get(rest));
        }

        let (mut value, rest) =
            match path.strip_prefix("this.").or_else(|| path.strip_prefix("./")) {
                Some(rest) => (self.data.clone(), rest),
                None => {
                    let (first, rest) = path.split_once('.').unwrap_or((path, ""));
                    (self.lookup(first)?, rest)
                }
            };

        if rest.is_empty() {
            return Some(value);
        }
        for segment in rest.split('.') {
            value = self.resolve_member(&value, segment).into_option()?;
        }
        Some(value)
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.locals.get(name) {
            return Some(value.clone());
        }
        if let Resolved::Value(value) = self.resolve_member(&self.data, name) {
            return Some(value);
        }
        self.parent.and_then(|p| p.lookup(name))
    }

    fn resolve_member(&self, data: &Value, name: &str) -> Resolved {
        for resolver in self.resolvers {
            let resolved = resolver.resolve(data, name);
            if resolved.is_resolved() {
                return resolved;
            }
        }
        Resolved::Unresolved
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("data", &self.data)
            .field("locals", &self.locals)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::default_resolvers;

    #[test]
    fn test_this_and_dot() {
        let resolvers = default_resolvers();
        let root = Context::root(Value::from("hi"), &resolvers);
        assert_eq!(root.get("this"), Some(Value::from("hi")));
        assert_eq!(root.get("."), Some(Value::from("hi")));
    }

    #[test]
    fn test_dotted_path() {
        let resolvers = default_resolvers();
        let data = Value::map([("user", Value::map([("name", "Ada")]))]);
        let root = Context::root(data, &resolvers);
        assert_eq!(root.get("user.name"), Some(Value::from("Ada")));
        assert_eq!(root.get("user.email"), None);
        assert_eq!(root.get("missing.name"), None);
    }

    #[test]
    fn test_lookup_falls_back_to_parent() {
        let resolvers = default_resolvers();
        let root = Context::root(Value::map([("title", "Home")]), &resolvers);
        let child = root.child(Value::map([("name", "item")]));
        assert_eq!(child.get("name"), Some(Value::from("item")));
        assert_eq!(child.get("title"), Some(Value::from("Home")));
        assert_eq!(child.get("this.title"), None);
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_null_stops_fallback() {
        let resolvers = default_resolvers();
        let root = Context::root(Value::map([("title", "Home")]), &resolvers);
        let child = root.child(Value::map([("title", Value::Null)]));
        assert_eq!(child.get("title"), Some(Value::Null));
        assert_eq!(child.get("../title"), Some(Value::from("Home")));
    }

    #[test]
    fn test_locals_shadow_data() {
        let resolvers = default_resolvers();
        let root = Context::root(Value::map([("@index", 9)]), &resolvers);
        let child = root.child(Value::from("x")).with_local("@index", 2);
        assert_eq!(child.get("@index"), Some(Value::Int(2)));
        let grandchild = child.child(Value::Null);
        assert_eq!(grandchild.get("@index"), Some(Value::Int(2)));
    }

    #[test]
    fn test_parent_of_root_is_none() {
        let resolvers = default_resolvers();
        let root = Context::root(Value::map([("a", 1)]), &resolvers);
        assert_eq!(root.get("../a"), None);
    }
}
