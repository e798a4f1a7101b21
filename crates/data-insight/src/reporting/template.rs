//! Report templates and rendering.

use crate::error::{InsightError, Result};
use minijinja::{AutoEscape, Environment, Value};
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::debug;

/// Template compiled into the binary and used when no override is given.
pub const BUNDLED_TEMPLATE: &str = include_str!("../../templates/report_template.html");

/// Where the report template comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSource {
    /// The default template shipped with the crate.
    #[default]
    Bundled,
    /// Template source text held in memory.
    Inline(String),
    /// Template file on disk.
    File(PathBuf),
}

impl TemplateSource {
    /// Load the template text.
    ///
    /// A file that does not exist is reported as [`InsightError::TemplateNotFound`].
    pub fn load(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Bundled => Ok(Cow::Borrowed(BUNDLED_TEMPLATE)),
            Self::Inline(source) => Ok(Cow::Borrowed(source.as_str())),
            Self::File(path) => match std::fs::read_to_string(path) {
                Ok(source) => Ok(Cow::Owned(source)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                    InsightError::TemplateNotFound(path.display().to_string()),
                ),
                Err(e) => Err(InsightError::from(e)
                    .with_context(format!("Reading template '{}'", path.display()))),
            },
        }
    }

    /// Short description used in logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Bundled => "bundled template".to_string(),
            Self::Inline(source) => format!("inline template ({} bytes)", source.len()),
            Self::File(path) => format!("template file '{}'", path.display()),
        }
    }
}

/// Render a template with HTML auto-escaping enabled.
///
/// Values that must be inserted verbatim have to be marked safe by the
/// caller (see [`Value::from_safe_string`]).
pub fn render_template<S: Serialize>(source: &TemplateSource, context: S) -> Result<String> {
    let text = source.load()?;
    debug!("Rendering {}", source.describe());
    render_str(&text, context)
}

/// Render template text with HTML auto-escaping enabled.
pub(crate) fn render_str<S: Serialize>(text: &str, context: S) -> Result<String> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    let template = env.template_from_str(text)?;
    Ok(template.render(context)?)
}

/// Convert any serializable value into a template value.
pub(crate) fn to_value<T: Serialize>(value: &T) -> Value {
    Value::from_serialize(value)
}
