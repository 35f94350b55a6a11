//! Line-preserving rewrite of Python 2 constructs into Python 3 syntax.
//!
//! Only used after a parse failure, so the rules favour common idioms over
//! completeness. Every rule keeps the line count intact so spans computed on
//! the rewritten source still address the original text.

use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

/// Rules that fail to compile are dropped with a warning
fn rule(pattern: &str, replacement: &'static str) -> Option<Rule> {
    match Regex::new(pattern) {
        Ok(pattern) => Some(Rule {
            pattern,
            replacement,
        }),
        Err(e) => {
            log::warn!("Skipping legacy rule {pattern}: {e}");
            None
        }
    }
}

/// Statement rules, matched against a whole line
static STATEMENT_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"^(\s*)print\s*>>\s*([^,]+?)\s*,\s*(.+?)\s*$", "${1}print(${3}, file=${2})"),
        rule(r"^(\s*)print\s*$", "${1}print()"),
        rule(r"^(\s*)print\s+([^(\s=.,)\[].*?)\s*,\s*$", "${1}print(${2}, end=' ')"),
        rule(r"^(\s*)print\s+([^(\s=.,)\[].*?)\s*$", "${1}print(${2})"),
        rule(r"^(\s*)exec\s+([^(\s].*?)\s+in\s+(.+?)\s*$", "${1}exec(${2}, ${3})"),
        rule(r"^(\s*)exec\s+([^(\s=].*?)\s*$", "${1}exec(${2})"),
        rule(r"^(\s*)raise\s+([\w.]+)\s*,\s*(.+?)\s*$", "${1}raise ${2}(${3})"),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// Expression rules, applied anywhere on a line
static INLINE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"except\s+(\([^)]*\)|[\w.]+)\s*,\s*(\w+)\s*:", "except ${1} as ${2}:"),
        rule(r"<>", "!="),
        rule(r"`([^`\n]+)`", "repr(${1})"),
        rule(r"\b(\d+)[lL]\b", "${1}"),
        rule(r"(^|[^\w.])0([0-7]+)\b", "${1}0o${2}"),
        rule(r#"\b[uU]([rR]["'])"#, "${1}"),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// Rewrite legacy constructs. Returns `None` when no rule applied.
pub fn rewrite_legacy_syntax(source: &str) -> Option<String> {
    let mut changed = false;
    let mut in_triple_quote = false;
    let mut out = Vec::new();

    for line in source.split('\n') {
        if in_triple_quote || line.contains("\"\"\"") || line.contains("'''") {
            // Docstring bodies are left untouched
            let toggles = line.matches("\"\"\"").count() + line.matches("'''").count();
            if toggles % 2 == 1 {
                in_triple_quote = !in_triple_quote;
            }
            out.push(line.to_string());
            continue;
        }

        let rewritten = rewrite_line(line);
        if rewritten != line {
            changed = true;
        }
        out.push(rewritten);
    }

    changed.then(|| out.join("\n"))
}

fn rewrite_line(line: &str) -> String {
    let (code, comment) = split_comment(line);
    let (code, trailing) = code.split_at(code.trim_end().len());
    let mut code = code.to_string();

    for rule in STATEMENT_RULES.iter() {
        if rule.pattern.is_match(&code) {
            code = rule.pattern.replace(&code, rule.replacement).into_owned();
            break;
        }
    }

    for rule in INLINE_RULES.iter() {
        code = rule.pattern.replace_all(&code, rule.replacement).into_owned();
    }

    format!("{code}{trailing}{comment}")
}

/// Split a line into code and a trailing `#` comment outside string literals.
fn split_comment(line: &str) -> (&str, &str) {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '#') => return line.split_at(idx),
            _ => {}
        }
    }
    (line, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(src: &str) -> String {
        rewrite_legacy_syntax(src).unwrap_or_else(|| src.to_string())
    }

    #[test]
    fn every_rule_compiles() {
        assert_eq!(STATEMENT_RULES.len(), 7);
        assert_eq!(INLINE_RULES.len(), 6);
    }

    #[test]
    fn print_statements_become_calls() {
        assert_eq!(rewrite("print 'hi'"), "print('hi')");
        assert_eq!(rewrite("    print"), "    print()");
        assert_eq!(rewrite("print a, b,"), "print(a, b, end=' ')");
        assert_eq!(rewrite("print >>sys.stderr, 'oops'"), "print('oops', file=sys.stderr)");
    }

    #[test]
    fn modern_print_is_untouched() {
        assert_eq!(rewrite_legacy_syntax("print('hi')\nx = 1\n"), None);
    }

    #[test]
    fn except_and_raise_forms() {
        assert_eq!(rewrite("except ValueError, e:"), "except ValueError as e:");
        assert_eq!(
            rewrite("except (KeyError, IndexError), err:"),
            "except (KeyError, IndexError) as err:"
        );
        assert_eq!(rewrite("    raise ValueError, 'bad'"), "    raise ValueError('bad')");
    }

    #[test]
    fn expression_level_rules() {
        assert_eq!(rewrite("if a <> b: pass"), "if a != b: pass");
        assert_eq!(rewrite("s = `value`"), "s = repr(value)");
        assert_eq!(rewrite("n = 10L"), "n = 10");
        assert_eq!(rewrite("mode = 0755"), "mode = 0o755");
        assert_eq!(rewrite("ratio = 1.05"), "ratio = 1.05");
        assert_eq!(rewrite("exec code in ns"), "exec(code, ns)");
    }

    #[test]
    fn line_count_is_preserved() {
        let src = "print 'a'\n\"\"\"\nprint 'doc'\n\"\"\"\nprint 'b'\n";
        let out = rewrite(src);
        assert_eq!(out.lines().count(), src.lines().count());
        assert!(out.contains("print 'doc'"));
        assert!(out.starts_with("print('a')"));
    }

    #[test]
    fn comments_stay_outside_rewritten_code() {
        assert_eq!(rewrite("print x  # note"), "print(x)  # note");
    }
}
