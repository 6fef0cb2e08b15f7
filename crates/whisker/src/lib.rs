//! # Whisker - Logic-Light Templates
//!
//! `whisker` renders mustache/handlebars-style templates against a loosely
//! typed model. Templates are compiled once by an [`Engine`] and rendered any
//! number of times, from any thread.
//!
//! The syntax itself lives in the `whisker-syntax` crate; this crate adds
//! data lookup, helpers, partials and rendering.
//!
//! ## Core Concepts
//!
//! - [`Engine`]: helpers, resolvers, loader, delimiters and default locale
//! - [`Template`]: a compiled template
//! - [`Value`]: the model, with [`Object`] and [`Lambda`] for host types
//! - [`Context`]: the scope chain variables are looked up in
//! - [`ValueResolver`]: pluggable member lookup
//! - [`Helper`]: named functions called from sections and variables
//! - [`TemplateLoader`]: where partials and `block` templates come from
//!
//! ## Quick Start
//!
//! ```rust
//! use whisker::Engine;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Summary {
//!     title: String,
//!     items: Vec<String>,
//! }
//!
//! let engine = Engine::new();
//! let template = engine
//!     .compile("{{title}}:{{#items}} {{.}}{{/items}}{{^items}} none{{/items}}")
//!     .unwrap();
//!
//! let out = template
//!     .render_serialize(&Summary {
//!         title: "Todo".into(),
//!         items: vec!["write".into(), "test".into()],
//!     })
//!     .unwrap();
//! assert_eq!(out, "Todo: write test");
//! ```
//!
//! ## Sections
//!
//! A section named after a helper calls it. Otherwise the section's value
//! decides what happens:
//!
//! | Value | Behavior |
//! |-------|----------|
//! | any, in an inverted section `{{^x}}` | body when falsy |
//! | sequence | body once per element |
//! | boolean | body when true, inverse otherwise |
//! | lambda | the lambda's output, rendered in place |
//! | anything else, absent included | body in a child scope holding the value |
//!
//! ```rust
//! use whisker::{Engine, Value};
//!
//! let engine = Engine::new();
//! let model = Value::map([
//!     ("user", Value::map([("name", "Ada")])),
//!     ("bold", Value::lambda(|body| format!("<b>{}</b>", body))),
//! ]);
//!
//! let out = engine.render("{{#user}}{{#bold}}{{name}}{{/bold}}{{/user}}", &model).unwrap();
//! assert_eq!(out, "<b>Ada</b>");
//! ```
//!
//! ## Layouts
//!
//! `partial` registers a named fragment and `block` renders it, falling back
//! to a template from the loader and then to its own body:
//!
//! ```rust
//! use whisker::{Engine, MapLoader, Value};
//!
//! let engine = Engine::builder()
//!     .loader(MapLoader::new().with(
//!         "layout",
//!         "<title>{{#block \"title\"}}Untitled{{/block}}</title>",
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let page = engine
//!     .compile("{{#partial \"title\"}}Home{{/partial}}{{> layout}}")
//!     .unwrap();
//! assert_eq!(page.render(&Value::Null).unwrap(), "<title>Home</title>");
//! ```

mod context;
mod engine;
mod error;
pub mod helpers;
mod lambda;
pub mod loader;
mod locale;
mod options;
mod partials;
pub mod prelude;
mod render;
pub mod resolver;
mod template;
mod util;
mod value;

pub use context::Context;
pub use engine::{Engine, EngineBuilder};
pub use error::{Result, WhiskerError};
pub use helpers::{BuiltIn, Helper, HelperRegistry, HelperResult, Output};
pub use loader::{ChainLoader, FileLoader, MapLoader, TemplateLoader, TEMPLATE_SUFFIX};
pub use locale::Locale;
pub use options::Options;
pub use partials::PartialRegistry;
pub use resolver::{
    default_resolvers, IndexResolver, MapResolver, ObjectResolver, Resolved, ValueResolver,
};
pub use template::Template;
pub use util::escape_html;
pub use value::{Lambda, Object, Value};

pub use whisker_syntax::{Fragment, SyntaxError};
