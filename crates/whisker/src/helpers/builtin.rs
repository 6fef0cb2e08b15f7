use crate::error::{Result, WhiskerError};
use crate::helpers::{HelperResult, Output};
use crate::options::Options;
use crate::value::Value;

/// Requires a string argument, naming what was found otherwise.
fn expect_str(value: &Value) -> Result<&str> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Err(WhiskerError::argument_type("null", "string")),
        other => Err(WhiskerError::argument_type(other.to_string(), "string")),
    }
}

/// Renders the body against the value, whatever the value is.
pub(super) fn with(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let text = if options.renders_in_place() {
        options.render_body()?
    } else {
        options.render_body_with(value.clone())?
    };
    Ok(Some(text.into()))
}

pub(super) fn each(value: &Value, options: &mut Options<'_>) -> HelperResult {
    if value.is_falsy() {
        return Ok(Some(options.render_inverse()?.into()));
    }

    let mut buffer = String::new();
    if let Some(elements) = value.elements() {
        let last = elements.len().saturating_sub(1);
        for (index, element) in elements.into_iter().enumerate() {
            buffer.push_str(&options.render_body_with_locals(
                element,
                [
                    ("@index", Value::from(index)),
                    ("@first", Value::Bool(index == 0)),
                    ("@last", Value::Bool(index == last)),
                ],
            )?);
        }
    } else {
        buffer = options.render_body_with(value.clone())?;
    }
    Ok(Some(buffer.into()))
}

pub(super) fn if_(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let text = if value.is_falsy() {
        options.render_inverse()?
    } else {
        options.render_body()?
    };
    Ok(Some(text.into()))
}

pub(super) fn unless(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let text = if value.is_falsy() {
        options.render_body()?
    } else {
        options.render_inverse()?
    };
    Ok(Some(text.into()))
}

pub(super) fn block(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let path = expect_str(value)?;
    let fragment = match options.partial(path) {
        Some(fragment) => fragment,
        None => match options.compile_path(path) {
            Ok(template) => {
                let fragment = template.fragment().clone();
                options.register_partial(path, fragment.clone());
                fragment
            }
            Err(err) => {
                log::debug!("block '{}' uses its default content: {}", path, err);
                options.body().clone()
            }
        },
    };
    Ok(Some(options.render(&fragment)?.into()))
}

pub(super) fn partial(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let name = expect_str(value)?;
    let body = options.body().clone();
    options.register_partial(name, body);
    Ok(None)
}

pub(super) fn embedded(value: &Value, options: &mut Options<'_>) -> HelperResult {
    let path = expect_str(value)?;
    let id = match options.param(0) {
        Some(Value::Null) | None => format!("{}-hbs", path.replace(['/', '.'], "-")),
        Some(id) => id.to_string(),
    };
    let template = options.compile_path(path).map_err(|err| {
        WhiskerError::render_caused_by(format!("cannot embed template '{}'", path), err)
    })?;
    Ok(Some(Output::Safe(format!(
        "<script id=\"{}\" type=\"text/x-handlebars\">\n{}\n</script>",
        id,
        template.source()
    ))))
}

pub(super) fn log(value: &Value, _options: &mut Options<'_>) -> HelperResult {
    log::info!("Context {}", value);
    Ok(None)
}
