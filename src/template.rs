// src/template.rs

/// Token replaced by the caller's test input.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Substitute every occurrence of `{input}` in `template` with `input`.
///
/// Plain literal replacement: no escaping, no other placeholders, and the
/// inserted text is never rescanned.
pub fn render_prompt(template: &str, input: &str) -> String {
    template.replace(INPUT_PLACEHOLDER, input)
}
