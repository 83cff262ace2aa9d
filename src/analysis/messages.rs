// src/analysis/messages.rs

//! Finding message templates: a `code = template` resource embedded at
//! compile time, with positional `{0}`/`{1}` substitution.
//!
//! Wording lives in [`messages.properties`] so it can change without
//! touching the finding taxonomy. A code with no template renders as
//! the code string itself, so a missing entry is visible in the report
//! rather than a panic.

use std::collections::HashMap;

use ::lazy_static::lazy_static;
use ::si_trace_print::defñ;

lazy_static! {
    static ref TEMPLATES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        for line in include_str!("messages.properties").lines() {
            let line: &str = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, template)) = line.split_once('=') {
                map.insert(key.trim(), template.trim());
            }
        }
        map
    };
}

/// Render the template for `code`, substituting `{0}`, `{1}`, ... with
/// `args` in order. An unknown code renders as the code itself.
pub fn render(
    code: &str,
    args: &[&str],
) -> String {
    let template: &str = match TEMPLATES.get(code) {
        Some(template) => template,
        None => {
            defñ!("no template for code {:?}", code);
            return code.to_string();
        }
    };
    let mut rendered: String = template.to_string();
    for (index, arg) in args.iter().enumerate() {
        let placeholder: String = format!("{{{}}}", index);
        rendered = rendered.replace(placeholder.as_str(), arg);
    }
    rendered
}
