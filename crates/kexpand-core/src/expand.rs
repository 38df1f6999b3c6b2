//! Token expansion for templates.
//!
//! Supports three token forms, expanded in this order:
//! - `$(key)` - value as a double-quoted string
//! - `$((key))` - value unquoted
//! - `{{key}}` - value unquoted (legacy form)
//!
//! Keys are one or more of `[a-z_.]`. Anything else inside the delimiters is
//! not a token and passes through untouched.
//!
//! Each pass works on the output of the previous one, so a value inserted by
//! an earlier pass that looks like `{{key}}` is expanded by the legacy pass.

use crate::{Error, Result, ValueTable};
use regex::bytes::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

static QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(([a-z_.]+)\)").unwrap());

static UNQUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(\(([a-z_.]+)\)\)").unwrap());

static LEGACY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([a-z_.]+)\}\}").unwrap());

/// A token syntax, one per expansion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `$(key)` => `"value"`
    Quoted,
    /// `$((key))` => `value`
    Unquoted,
    /// `{{key}}` => `value`
    Legacy,
}

impl Syntax {
    /// All syntaxes in pass order.
    pub const ALL: [Syntax; 3] = [Syntax::Quoted, Syntax::Unquoted, Syntax::Legacy];

    fn regex(self) -> &'static Regex {
        match self {
            Syntax::Quoted => &QUOTED_REGEX,
            Syntax::Unquoted => &UNQUOTED_REGEX,
            Syntax::Legacy => &LEGACY_REGEX,
        }
    }

    fn format(self, value: &str) -> String {
        match self {
            Syntax::Quoted => format!("\"{}\"", value),
            Syntax::Unquoted | Syntax::Legacy => value.to_string(),
        }
    }
}

/// Result of expanding a template.
///
/// `output` is always populated, even when a key was not found; unresolved
/// tokens are left verbatim.
#[derive(Debug)]
pub struct Expansion {
    pub output: Vec<u8>,
    /// The first key that could not be resolved.
    pub unresolved: Option<Error>,
}

impl Expansion {
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self.unresolved {
            Some(err) => Err(err),
            None => Ok(self.output),
        }
    }
}

/// Run every pass over `template`, stopping after the first pass that hits
/// an unresolved key.
pub fn expand(template: &[u8], table: &ValueTable) -> Expansion {
    let mut output = template.to_vec();

    for syntax in Syntax::ALL {
        let pass = expand_pass(syntax, &output, table);
        if pass.unresolved.is_some() {
            debug!(?syntax, "unresolved key, skipping remaining passes");
            return pass;
        }
        output = pass.output;
    }

    Expansion {
        output,
        unresolved: None,
    }
}

/// Replace every token of one syntax in `input`.
pub fn expand_pass(syntax: Syntax, input: &[u8], table: &ValueTable) -> Expansion {
    let mut unresolved = None;

    let output = syntax.regex().replace_all(input, |caps: &Captures| {
        // The key charset is ASCII, so this never loses data
        let key = String::from_utf8_lossy(&caps[1]);
        match table.lookup(&key) {
            Some(value) => syntax.format(&value).into_bytes(),
            None => {
                if unresolved.is_none() {
                    unresolved = Some(Error::KeyNotFound(key.into_owned()));
                }
                caps[0].to_vec()
            }
        }
    });

    Expansion {
        output: output.into_owned(),
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> ValueTable {
        let mut table = ValueTable::new();
        for (k, v) in pairs {
            table.insert(*k, *v);
        }
        table
    }

    fn expand_str(template: &str, table: &ValueTable) -> Result<String> {
        expand(template.as_bytes(), table)
            .into_result()
            .map(|out| String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_no_tokens_unchanged() {
        let template = "plain text with $ and ( and {braces} and $(UPPER)";
        let result = expand_str(template, &ValueTable::new()).unwrap();
        assert_eq!(result, template);
    }

    #[test]
    fn test_quoted_form() {
        let ctx = table(&[("name", "world")]);
        assert_eq!(expand_str("Hello, $(name)!", &ctx).unwrap(), r#"Hello, "world"!"#);
    }

    #[test]
    fn test_unquoted_form() {
        let ctx = table(&[("name", "world")]);
        assert_eq!(expand_str("Hello, $((name))!", &ctx).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_legacy_form() {
        let ctx = table(&[("name", "world")]);
        assert_eq!(expand_str("Hello, {{name}}!", &ctx).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_dotted_keys() {
        let ctx = table(&[("image.tag", "v1.2"), ("dns_zone", "example.com")]);
        let result = expand_str("image: app:$((image.tag)) zone: $(dns_zone)", &ctx).unwrap();
        assert_eq!(result, r#"image: app:v1.2 zone: "example.com""#);
    }

    #[test]
    fn test_charset_mismatch_passes_through() {
        let ctx = table(&[("name", "world")]);
        let template = "$(Name) $((name1)) {{na-me}} {{ name }} $()";
        assert_eq!(expand_str(template, &ctx).unwrap(), template);
    }

    #[test]
    fn test_all_forms_together() {
        let ctx = table(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let result = expand_str("$(a) $((b)) {{c}}", &ctx).unwrap();
        assert_eq!(result, r#""1" 2 3"#);
    }

    #[test]
    fn test_unresolved_token_preserved() {
        let ctx = table(&[("known", "yes")]);
        let expansion = expand(b"$(known) $(missing) $(other)", &ctx);

        assert_eq!(expansion.output, br#""yes" $(missing) $(other)"#);
        assert!(matches!(
            expansion.unresolved,
            Some(Error::KeyNotFound(ref k)) if k == "missing"
        ));
    }

    #[test]
    fn test_unresolved_stops_later_passes() {
        let ctx = table(&[("a", "1")]);
        let expansion = expand(b"$((missing)) {{a}}", &ctx);

        assert_eq!(expansion.output, b"$((missing)) {{a}}");
        let err = expansion.into_result().unwrap_err();
        assert_eq!(err.to_string(), r#"key not found: "missing""#);
    }

    #[test]
    fn test_legacy_pass_expands_earlier_values() {
        let ctx = table(&[("outer", "{{inner}}"), ("inner", "done")]);
        assert_eq!(expand_str("$((outer))", &ctx).unwrap(), "done");
    }

    #[test]
    fn test_single_pass_does_not_rescan() {
        let ctx = table(&[("outer", "$((inner))"), ("inner", "done")]);
        let pass = expand_pass(Syntax::Unquoted, b"$((outer))", &ctx);
        assert_eq!(pass.output, b"$((inner))");
        assert!(pass.unresolved.is_none());
    }

    #[test]
    fn test_quoted_pass_ignores_double_parens() {
        let ctx = table(&[("name", "world")]);
        let pass = expand_pass(Syntax::Quoted, b"$((name))", &ctx);
        assert_eq!(pass.output, b"$((name))");
    }

    #[test]
    fn test_non_utf8_template() {
        let ctx = table(&[("name", "world")]);
        let result = expand(b"\xff$((name))\xfe", &ctx).into_result().unwrap();
        assert_eq!(result, b"\xffworld\xfe");
    }

    #[test]
    fn test_non_string_values() {
        let mut ctx = ValueTable::new();
        ctx.insert("replicas", 3);
        ctx.insert("enabled", true);
        let result = expand_str("$(replicas) {{enabled}}", &ctx).unwrap();
        assert_eq!(result, r#""3" true"#);
    }
}
