use crate::{Config, error::SchemaError, registry::TypeRegistry, walker::Walker};
use std::{fs, path::Path};

/// Metadata about a configuration field for documentation generation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldInfo {
    /// Fully qualified environment variable name
    pub env_var: String,
    /// Whether this field is required
    pub required: bool,
    /// Default value, if any
    pub default: Option<String>,
    /// Human-readable description
    pub doc: String,
    /// Short Rust type name
    pub type_name: String,
}

/// List the variables `T` reads, without reading any of them
pub fn describe<T: Config>(prefix: &str) -> Result<Vec<FieldInfo>, SchemaError> {
    let mut config = T::default();
    let mut walker = Walker::new(prefix, TypeRegistry::global());
    config.visit(&mut walker)?;

    let fields = walker
        .fields()
        .iter()
        .map(|field| FieldInfo {
            env_var: field.env_var.clone(),
            required: field.required,
            default: field.default.clone(),
            doc: field.doc.clone(),
            type_name: field.type_name.clone(),
        })
        .collect();
    Ok(fields)
}

/// Render a markdown summary table of the fields
pub fn render_markdown(fields: &[FieldInfo]) -> String {
    let mut md = String::new();

    md.push_str("## Environment Variables Summary\n\n");
    md.push_str("| Variable | Type | Required | Description | Default |\n");
    md.push_str("|----------|------|----------|-------------|---------|\n");
    for field in fields {
        let required_str = if field.required { "Yes" } else { "No" };
        let default_display = field.default.as_deref().unwrap_or("-");
        let doc_display = if field.doc.is_empty() { "-" } else { field.doc.as_str() };
        md.push_str(&format!(
            "| {} | `{}` | {} | {} | {} |\n",
            field.env_var, field.type_name, required_str, doc_display, default_display
        ));
    }

    md
}

/// Write configuration documentation to a markdown file
///
/// # Example
/// ```no_run
/// use envdecode::{Config, docs};
///
/// #[derive(Default, Config)]
/// pub struct Settings {
///     /// Server port
///     #[field(default = "8080")]
///     pub port: u16,
/// }
///
/// let fields = docs::describe::<Settings>("APP_").unwrap();
/// docs::write_docs("CONFIG.md", &fields).unwrap();
/// ```
pub fn write_docs(path: impl AsRef<Path>, fields: &[FieldInfo]) -> std::io::Result<()> {
    fs::write(path, render_markdown(fields))
}

/// Plain-text help listing every variable, suitable for `--help` output
pub fn usage(fields: &[FieldInfo]) -> String {
    let mut out = String::from("Environment variables:\n");
    for field in fields {
        out.push_str(&format!("  {} {}", field.env_var, field.type_name));
        if field.required {
            out.push_str(" (required)");
        } else if let Some(default) = &field.default {
            out.push_str(&format!(" (default {default:?})"));
        }
        out.push('\n');
        if !field.doc.is_empty() {
            out.push_str(&format!("        {}\n", field.doc));
        }
    }
    out
}
