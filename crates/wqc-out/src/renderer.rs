//! Template rendering for WQC-OUT.
//!
//! Uses Handlebars with custom helpers:
//! - percent: Format a 0-1 ratio as a percentage
//! - truncate: Truncate a string to a maximum number of characters
//! - default: Fallback text for null or missing values

use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext};
use serde_json::Value;

use crate::templates::TemplatesFile;

/// Compiled renderer with registered helpers
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a new renderer from a templates file
    pub fn new(templates: TemplatesFile) -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(false);
        // Output feeds a render-agnostic model, not markup.
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("percent", Box::new(PercentHelper));
        handlebars.register_helper("truncate", Box::new(TruncateHelper));
        handlebars.register_helper("default", Box::new(DefaultHelper));

        for (name, template) in &templates.templates {
            if let Err(e) = handlebars.register_template_string(name, &template.template) {
                tracing::warn!(template = %name, error = %e, "skipping invalid template");
            }
        }

        TemplateRenderer { handlebars }
    }

    /// Render a named template with data
    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, String> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| format!("Render error: {}", e))
    }

    /// Render a named template, or return `fallback` when it is missing or
    /// fails to render.
    pub fn render_or(&self, template_name: &str, data: &Value, fallback: impl FnOnce() -> String) -> String {
        match self.render(template_name, data) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(template = %template_name, error = %e, "template fallback");
                fallback()
            }
        }
    }
}

// ============================================================================
// Custom Helpers
// ============================================================================

/// Format a ratio as a percentage (0.92 -> "92%")
struct PercentHelper;

impl HelperDef for PercentHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h.param(0).and_then(|v| v.value().as_f64()).unwrap_or(0.0);

        let percent = (value * 100.0).round() as i64;
        out.write(&format!("{}%", percent))?;
        Ok(())
    }
}

/// Truncate a string to max characters with ellipsis
struct TruncateHelper;

impl HelperDef for TruncateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");

        let max_chars = h.param(1).and_then(|v| v.value().as_u64()).unwrap_or(100) as usize;

        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                out.write(&text[..cut])?;
                out.write("...")?;
            }
            None => out.write(text)?,
        }
        Ok(())
    }
}

/// Default value helper
struct DefaultHelper;

impl HelperDef for DefaultHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h.param(0).map(|v| v.value());
        let default = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

        match value {
            Some(v) if !v.is_null() => {
                if let Some(s) = v.as_str() {
                    out.write(s)?;
                } else {
                    out.write(&v.to_string())?;
                }
            }
            _ => out.write(default)?,
        }

        Ok(())
    }
}
