//! Template rendering for event messages.
//!
//! Templates use `{{field}}` placeholders, e.g.
//! `"{{player}} said '{{message}}'"`. Unknown placeholders are left in
//! place so a typo in a template is visible in the delivered message.

/// Render a template against a set of named fields.
pub fn render(template: &str, fields: &[(&'static str, String)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in fields {
        rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
    }
    rendered
}
