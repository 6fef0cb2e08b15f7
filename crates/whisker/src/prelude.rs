//! Commonly used types in one import.
//!
//! ```rust
//! use whisker::prelude::*;
//!
//! fn upper(value: &Value, _options: &mut Options<'_>) -> HelperResult {
//!     Ok(Some(Output::Text(value.to_string().to_uppercase())))
//! }
//!
//! let engine = Engine::builder().helper("upper", upper).build()?;
//! assert_eq!(engine.render("{{upper \"hi\"}}", &Value::Null)?, "HI");
//! # Ok::<(), WhiskerError>(())
//! ```

pub use crate::{
    Context, Engine, EngineBuilder, HelperResult, Lambda, MapLoader, Object, Options, Output,
    Template, TemplateLoader, Value, WhiskerError,
};
