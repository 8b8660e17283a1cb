//! Extraction of the quoted argument in `name('...')` commands.

use std::fmt;

/// Why an argument could not be extracted. The display text is shown to the
/// user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentDiagnostic {
    #[error("Missing '('")]
    MissingOpenParen,

    #[error("Missing ')'")]
    MissingCloseParen,

    #[error("Missing parentheses somewhere")]
    UnbalancedParens,

    #[error("Expression must be a string")]
    NotAString,

    #[error("Missing closing {0}")]
    MissingClosingQuote(char),

    #[error("Missing {0} somewhere")]
    UnbalancedQuotes(char),
}

/// Result of [`extract_argument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedArgument {
    /// Nothing to evaluate. Covers both `()` and a blank quoted string such
    /// as `('   ')`; the two are not told apart.
    Empty,
    /// Trimmed text between the parentheses, starting with a quote.
    Text(String),
    Diagnostic(ArgumentDiagnostic),
}

impl fmt::Display for ExtractedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(text) => f.write_str(text),
            Self::Diagnostic(diagnostic) => write!(f, "{diagnostic}"),
        }
    }
}

/// Isolates the quoted argument of `swp`, e.g. `'1+1'` from `eval('1+1')`.
///
/// Only the shape is checked: parentheses must be present and balanced in
/// count, and the argument must open with a quote that appears an even number
/// of times. Anything after the first quoted token is returned unchecked.
pub fn extract_argument(swp: &str) -> ExtractedArgument {
    use ArgumentDiagnostic::*;

    if !swp.contains('(') {
        return ExtractedArgument::Diagnostic(MissingOpenParen);
    }
    if !swp.contains(')') {
        return ExtractedArgument::Diagnostic(MissingCloseParen);
    }
    if swp.matches('(').count() != swp.matches(')').count() {
        return ExtractedArgument::Diagnostic(UnbalancedParens);
    }

    let after_open = swp.split_once('(').map(|(_, rest)| rest).unwrap_or_default();
    let inside = after_open
        .rsplit_once(')')
        .map(|(before, _)| before)
        .unwrap_or(after_open)
        .trim();

    let Some(qm) = inside.chars().next() else {
        return ExtractedArgument::Empty;
    };
    if qm != '\'' && qm != '"' {
        return ExtractedArgument::Diagnostic(NotAString);
    }
    if inside.len() == 1 {
        return ExtractedArgument::Diagnostic(MissingClosingQuote(qm));
    }
    if inside.matches(qm).count() % 2 != 0 {
        return ExtractedArgument::Diagnostic(UnbalancedQuotes(qm));
    }

    let first_segment = inside.split(qm).nth(1).unwrap_or_default();
    if first_segment.trim().is_empty() {
        return ExtractedArgument::Empty;
    }

    ExtractedArgument::Text(inside.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(swp: &str) -> ArgumentDiagnostic {
        match extract_argument(swp) {
            ExtractedArgument::Diagnostic(diagnostic) => diagnostic,
            other => panic!("expected diagnostic for {swp:?}, got {other:?}"),
        }
    }

    #[test]
    fn missing_open_paren() {
        assert_eq!(diagnostic("eval'1+x',{'x':3})"), ArgumentDiagnostic::MissingOpenParen);
        assert_eq!(diagnostic(""), ArgumentDiagnostic::MissingOpenParen);
        assert_eq!(extract_argument("no parens").to_string(), "Missing '('");
    }

    #[test]
    fn missing_close_paren() {
        assert_eq!(diagnostic("eval('1+x',{'x':3}"), ArgumentDiagnostic::MissingCloseParen);
        assert_eq!(extract_argument("eval(").to_string(), "Missing ')'");
    }

    #[test]
    fn unbalanced_parens() {
        assert_eq!(diagnostic("eval(('1')"), ArgumentDiagnostic::UnbalancedParens);
        assert_eq!(
            extract_argument("eval('1'))").to_string(),
            "Missing parentheses somewhere"
        );
    }

    #[test]
    fn empty_parens() {
        assert_eq!(extract_argument("eval()"), ExtractedArgument::Empty);
        assert_eq!(extract_argument("eval(   )"), ExtractedArgument::Empty);
        assert_eq!(extract_argument("eval()").to_string(), "");
    }

    #[test]
    fn argument_must_be_a_string() {
        assert_eq!(diagnostic("eval(2)"), ArgumentDiagnostic::NotAString);
        assert_eq!(diagnostic("eval(__name__)"), ArgumentDiagnostic::NotAString);
        assert_eq!(
            extract_argument("eval(2)").to_string(),
            "Expression must be a string"
        );
    }

    #[test]
    fn lone_quote() {
        assert_eq!(extract_argument("eval(')").to_string(), "Missing closing '");
        assert_eq!(extract_argument("eval(\")").to_string(), "Missing closing \"");
    }

    #[test]
    fn unbalanced_quotes() {
        assert_eq!(extract_argument("eval('2)").to_string(), "Missing ' somewhere");
        assert_eq!(extract_argument("eval(\"2)").to_string(), "Missing \" somewhere");
    }

    #[test]
    fn blank_quoted_strings_are_empty() {
        for swp in ["eval('')", "eval('   ')", "eval(\"\")", "eval(\"   \")", "eval( ' ' )"] {
            assert_eq!(extract_argument(swp), ExtractedArgument::Empty, "{swp}");
        }
    }

    #[test]
    fn returns_text_inside_parentheses() {
        assert_eq!(
            extract_argument("eval('1+1')"),
            ExtractedArgument::Text("'1+1'".to_string())
        );
        assert_eq!(
            extract_argument("eval('1+x',{'x':3})").to_string(),
            "'1+x',{'x':3}"
        );
        assert_eq!(
            extract_argument("eval(  \"abs(-1)\"  )").to_string(),
            "\"abs(-1)\""
        );
    }

    #[test]
    fn only_the_first_quoted_token_is_checked() {
        assert_eq!(
            extract_argument("eval('a' junk)").to_string(),
            "'a' junk"
        );
    }

    #[test]
    fn repeated_calls_agree() {
        let swp = "eval('1+x',{'x':5},{'y':2})";
        assert_eq!(extract_argument(swp), extract_argument(swp));
    }
}
