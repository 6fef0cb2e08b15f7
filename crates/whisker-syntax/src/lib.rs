//! Mustache-style template syntax for Whisker.
//!
//! This crate turns template source into an immutable abstract syntax tree.
//! It knows nothing about data or rendering; the `whisker` crate walks the
//! tree produced here.
//!
//! # Example
//!
//! ```rust
//! use whisker_syntax::{parse, Node};
//!
//! let fragment = parse("{{#items}}<li>{{name}}</li>{{else}}empty{{/items}}").unwrap();
//!
//! let Node::Block(block) = &fragment.nodes()[0] else { unreachable!() };
//! assert_eq!(block.name(), "items");
//! assert_eq!(block.body().unwrap().text(), "<li>{{name}}</li>");
//! assert_eq!(block.inverse().unwrap().text(), "empty");
//! ```
//!
//! # Tag Syntax
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{name}}` | HTML-escaped variable or inline helper call |
//! | `{{{name}}}`, `{{&name}}` | Unescaped variable |
//! | `{{#name args}}...{{/name}}` | Section |
//! | `{{^name}}...{{/name}}` | Inverted section |
//! | `{{else}}`, `{{^}}` | Start of a section's inverse branch |
//! | `{{> path}}` | Partial |
//! | `{{! text}}` | Comment |
//! | `{{=<% %>=}}` | Change delimiters for the rest of the template |
//!
//! Arguments are separated by whitespace: quoted strings, integers, floats,
//! `true`, `false`, `null`, `key=value` pairs, and paths for anything else.

pub mod ast;
mod error;
mod parser;
mod tokenizer;

pub use ast::{
    Block, Escape, Fragment, Hash, Node, Param, Partial, Variable, DEFAULT_END_DELIMITER,
    DEFAULT_START_DELIMITER,
};
pub use error::SyntaxError;
pub use parser::{parse, parse_with_delimiters};
