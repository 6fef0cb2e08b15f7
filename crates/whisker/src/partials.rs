//! Named fragments registered while a template renders.
//!
//! The `partial` helper stores its body here and `block` (or a `{{> name}}`
//! tag) reads it back. A registry lives for exactly one render, so
//! registrations never leak between renders of the same template.

use std::collections::HashMap;

use whisker_syntax::Fragment;

#[derive(Debug, Default, Clone)]
pub struct PartialRegistry {
    partials: HashMap<String, Fragment>,
}

impl PartialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.partials.get(name)
    }

    /// Registers `fragment` under `name`, returning the fragment it replaced.
    pub fn insert(&mut self, name: impl Into<String>, fragment: Fragment) -> Option<Fragment> {
        self.partials.insert(name.into(), fragment)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.partials.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.partials.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }
}
