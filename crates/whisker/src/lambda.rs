//! Turning a lambda's result into something renderable.

use whisker_syntax::Fragment;

use crate::context::Context;
use crate::error::Result;
use crate::value::{Lambda, Value};

/// Calls `lambda` with the text of `body` and compiles what it returns.
///
/// The body text is written with the section's delimiters, and string
/// results are parsed with them too. Any other value becomes literal text.
/// Results are not cached: the lambda runs every time the section renders.
pub(crate) fn compile(
    lambda: &dyn Lambda,
    scope: &Context<'_>,
    body: &Fragment,
    start_delimiter: &str,
    end_delimiter: &str,
) -> Result<Fragment> {
    match lambda.apply(scope, &body.text_with(start_delimiter, end_delimiter))? {
        Value::String(source) => {
            log::trace!("compiling lambda output: {:?}", source);
            Ok(whisker_syntax::parse_with_delimiters(
                &source,
                start_delimiter,
                end_delimiter,
            )?)
        }
        other => Ok(Fragment::literal(other.to_string())),
    }
}
