//! Expression tokenizer.

use logos::Logos;

use super::EvalError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    NoneLiteral,
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    Float(f64),
    #[regex(r#"'([^'\\\n]|\\.)*'"#, unquote)]
    #[regex(r#""([^"\\\n]|\\.)*""#, unquote)]
    Str(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: usize,
}

fn parse_float(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse::<f64>().ok()
}

fn unquote(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    let body = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // Unknown escapes are kept verbatim.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    Some(out)
}

pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, EvalError> {
    let mut tokens = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(SpannedToken {
                token,
                position: span.start,
            }),
            Err(()) => {
                let slice = &source[span.clone()];
                if slice.starts_with('\'') || slice.starts_with('"') {
                    return Err(EvalError::Syntax(format!(
                        "unterminated string literal at position {}",
                        span.start
                    )));
                }
                if slice.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(EvalError::Syntax(format!(
                        "invalid number literal {slice:?} at position {}",
                        span.start
                    )));
                }
                return Err(EvalError::Syntax(format!(
                    "invalid character {slice:?} at position {}",
                    span.start
                )));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn operators_prefer_longest_match() {
        assert_eq!(
            kinds("2 ** 3 // 4 <= 5"),
            vec![
                Token::Int(2),
                Token::DoubleStar,
                Token::Int(3),
                Token::DoubleSlash,
                Token::Int(4),
                Token::LtEq,
                Token::Int(5),
            ]
        );
    }

    #[test]
    fn keywords_are_not_names() {
        assert_eq!(
            kinds("not x and True or None"),
            vec![
                Token::Not,
                Token::Name("x".to_string()),
                Token::And,
                Token::True,
                Token::Or,
                Token::NoneLiteral,
            ]
        );
        assert_eq!(kinds("android"), vec![Token::Name("android".to_string())]);
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("1 1.5 .5 2. 1e3"),
            vec![
                Token::Int(1),
                Token::Float(1.5),
                Token::Float(0.5),
                Token::Float(2.0),
                Token::Float(1000.0),
            ]
        );
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "a\tb" 'c:\d'"#),
            vec![
                Token::Str("it's".to_string()),
                Token::Str("a\tb".to_string()),
                Token::Str("c:\\d".to_string()),
            ]
        );
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = tokenize("ab + 'c'").expect("tokenize");
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 5]);
    }

    #[test]
    fn unterminated_string_is_reported() {
        let err = tokenize("'abc").expect_err("should fail");
        assert!(err.to_string().starts_with("unterminated string literal"));
    }

    #[test]
    fn unknown_character_is_reported() {
        let err = tokenize("1 $ 2").expect_err("should fail");
        assert_eq!(err.to_string(), "invalid character \"$\" at position 2");
    }
}
