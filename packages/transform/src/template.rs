// Message Template
//
// Renders the warning text baked into generated forwarders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// The substitution token.
pub const NAME_TOKEN: &str = "{{name}}";

/// `{{name}}` not preceded by a backslash. The leading group keeps the
/// preceding character so it can be written back.
static NAME_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\\])\{\{name\}\}").expect("token pattern is valid"));

/// Replace the first unescaped `{{name}}` in `template` with `name`.
///
/// Only one occurrence is substituted. An escaped token (`\{{name}}`) is
/// left as written, backslash included.
pub fn render_message(template: &str, name: &str) -> String {
    if !template.contains(NAME_TOKEN) {
        return template.to_string();
    }
    NAME_TOKEN_RE
        .replacen(template, 1, |caps: &Captures| format!("{}{}", &caps[1], name))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MESSAGE_TEMPLATE;

    #[test]
    fn should_substitute_the_display_name() {
        assert_eq!(render_message("{{name}} is internal", "Foo.bar"), "Foo.bar is internal");
    }

    #[test]
    fn should_render_the_default_template() {
        assert_eq!(
            render_message(DEFAULT_MESSAGE_TEMPLATE, "internalFunctionDecl"),
            "internalFunctionDecl is an internal API and may change without notice"
        );
    }

    #[test]
    fn should_leave_escaped_tokens_alone() {
        assert_eq!(render_message(r"\{{name}} literal", "Foo"), r"\{{name}} literal");
    }

    #[test]
    fn should_only_replace_the_first_occurrence() {
        assert_eq!(render_message("{{name}} and {{name}}", "a"), "a and {{name}}");
    }

    #[test]
    fn should_skip_escaped_token_and_replace_next() {
        assert_eq!(
            render_message(r"\{{name}} is {{name}}", "Foo"),
            r"\{{name}} is Foo"
        );
    }

    #[test]
    fn should_keep_preceding_character() {
        assert_eq!(render_message("use of `{{name}}`", "x"), "use of `x`");
    }

    #[test]
    fn should_return_templates_without_token_unchanged() {
        assert_eq!(render_message("internal API used", "x"), "internal API used");
    }
}
