//! Rendering of extracted templates.
//!
//! Each template yields a Closure message module, the input of the XTB
//! generator and of the compiled bundle:
//!
//! ```text
//! /** @desc greeting */
//! var MSG_FOO_0 = goog.getMsg("Hello");
//!
//! export default "<h1>" + MSG_FOO_0 + "</h1>";
//! ```
//!
//! and an HTML rendition in the source language for development builds.

use anyhow::{Context, Result};

use crate::core::{
    allocator::{Allocation, KeyOrigin},
    namespace::Namespace,
    placeholder::PlaceholderMatch,
};

/// A message emitted by a template, ready for bundle generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: String,
    pub text: String,
    pub description: String,
    pub origin: KeyOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Template path relative to the template root, with `/` separators.
    pub relative_path: String,
    pub namespace: Namespace,
    pub messages: Vec<Message>,
    /// JavaScript module declaring every message and exporting the template.
    pub module: String,
    /// Template with each placeholder replaced by its text.
    pub html: String,
}

/// Render one template from its placeholders and their allocations.
///
/// `placeholders` and `allocations` are parallel slices in source order.
pub fn render_template(
    relative_path: &str,
    namespace: &Namespace,
    template: &str,
    placeholders: &[PlaceholderMatch],
    allocations: &[Allocation],
) -> Result<RenderedTemplate> {
    let messages: Vec<Message> = placeholders
        .iter()
        .zip(allocations)
        .map(|(placeholder, allocation)| Message {
            key: allocation.key.clone(),
            text: placeholder.text.clone(),
            description: placeholder.description().to_string(),
            origin: allocation.origin,
        })
        .collect();

    let mut module = String::new();
    for message in &messages {
        module.push_str(&format!(
            "/** @desc {} */\nvar {} = goog.getMsg({});\n\n",
            doc_comment_safe(&message.description),
            message.key,
            js_string(&message.text)?,
        ));
    }
    module.push_str(&format!(
        "export default {};\n",
        template_expression(template, placeholders, &messages)?
    ));

    let mut html = String::with_capacity(template.len());
    let mut cursor = 0;
    for (placeholder, message) in placeholders.iter().zip(&messages) {
        html.push_str(&template[cursor..placeholder.span.start]);
        html.push_str(&message.text);
        cursor = placeholder.span.end;
    }
    html.push_str(&template[cursor..]);

    Ok(RenderedTemplate {
        relative_path: relative_path.to_string(),
        namespace: namespace.clone(),
        messages,
        module,
        html,
    })
}

/// `"<p>" + MSG_FOO_0 + "</p>"`
fn template_expression(
    template: &str,
    placeholders: &[PlaceholderMatch],
    messages: &[Message],
) -> Result<String> {
    let mut parts = Vec::new();
    let mut cursor = 0;

    for (placeholder, message) in placeholders.iter().zip(messages) {
        let literal = &template[cursor..placeholder.span.start];
        if !literal.is_empty() {
            parts.push(js_string(literal)?);
        }
        parts.push(message.key.clone());
        cursor = placeholder.span.end;
    }

    let tail = &template[cursor..];
    if !tail.is_empty() || parts.is_empty() {
        parts.push(js_string(tail)?);
    }

    Ok(parts.join(" + "))
}

fn js_string(text: &str) -> Result<String> {
    serde_json::to_string(text).context("Failed to encode JavaScript string literal")
}

fn doc_comment_safe(text: &str) -> String {
    text.replace("*/", "*\\/")
}
