//! Expression parser.

use super::ast::{BinaryOp, CompareOp, Expr, LogicalOp, UnaryOp};
use super::lexer::{tokenize, SpannedToken, Token};
use super::value::Value;
use super::EvalError;

type Result<T> = std::result::Result<T, EvalError>;

/// Maximum nesting of brackets, unary operators and call arguments.
const MAX_NESTING: usize = 200;

/// Maximum depth of the parsed tree, counting operator chains.
const MAX_TREE_DEPTH: usize = 1000;

// ---------------------------------------------------------------------------
// Expression parser
// ---------------------------------------------------------------------------

pub struct ExprParser {
    tokens: Vec<SpannedToken>,
    index: usize,
    nesting: usize,
    depth: usize,
}

impl ExprParser {
    /// Parses `source` as a comma separated expression list.
    ///
    /// A single expression without a trailing comma yields that expression;
    /// otherwise the list becomes a tuple, so `'1+x', {'x': 3}` parses as a
    /// two element tuple.
    pub fn parse(source: &str) -> Result<Expr> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(EvalError::Syntax(
                "invalid syntax: empty expression".to_string(),
            ));
        }

        let mut parser = Self {
            tokens,
            index: 0,
            nesting: 0,
            depth: 0,
        };
        let expression = parser.parse_expression_list()?;
        if let Some(token) = parser.peek() {
            return Err(EvalError::Syntax(format!(
                "invalid syntax near position {}",
                token.position
            )));
        }

        Ok(expression)
    }

    fn parse_expression_list(&mut self) -> Result<Expr> {
        let first = self.parse_expression()?;
        if !self.peek_is(&Token::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.consume(&Token::Comma) {
            if !self.next_starts_expression() {
                break;
            }
            items.push(self.parse_expression()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mark = self.depth;
        let mut left = self.parse_and()?;
        while self.consume(&Token::Or) {
            self.grow()?;
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mark = self.depth;
        let mut left = self.parse_not()?;
        while self.consume(&Token::And) {
            self.grow()?;
            let right = self.parse_not()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.consume(&Token::Not) {
            let operand = self.nested(Self::parse_not)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let first = self.parse_sum()?;
        let mut rest = Vec::new();
        while let Some(op) = self.peek().and_then(|token| compare_op(&token.token)) {
            self.index += 1;
            rest.push((op, self.parse_sum()?));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_sum(&mut self) -> Result<Expr> {
        let mark = self.depth;
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().map(|token| &token.token) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.index += 1;
            self.grow()?;
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mark = self.depth;
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().map(|token| &token.token) {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.index += 1;
            self.grow()?;
            let right = self.parse_factor()?;
            left = binary(op, left, right);
        }
        self.depth = mark;
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        let op = match self.peek().map(|token| &token.token) {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Minus,
            _ => return self.parse_power(),
        };
        self.index += 1;
        let operand = self.nested(Self::parse_factor)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    // `**` is right associative and its right operand may carry a sign,
    // so `-2 ** -1` parses as `-(2 ** (-1))`.
    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_postfix()?;
        if self.consume(&Token::DoubleStar) {
            let exponent = self.nested(Self::parse_factor)?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mark = self.depth;
        let mut expression = self.parse_atom()?;
        loop {
            if self.consume(&Token::LBracket) {
                self.grow()?;
                let index = self.nested(Self::parse_expression)?;
                self.expect(&Token::RBracket, "]")?;
                expression = Expr::Subscript {
                    target: Box::new(expression),
                    index: Box::new(index),
                };
                continue;
            }
            if self.peek_is(&Token::LParen) {
                let Expr::Name(function) = expression else {
                    return Err(EvalError::Syntax(format!(
                        "invalid syntax near position {}: only named functions can be called",
                        self.current_position()
                    )));
                };
                self.index += 1;
                let args = self.nested(|parser| parser.parse_sequence(&Token::RParen, ")"))?;
                expression = Expr::Call { function, args };
                continue;
            }
            break;
        }
        self.depth = mark;
        Ok(expression)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let position = self.current_position();
        let token = self.next().ok_or_else(|| {
            EvalError::Syntax("unexpected end of expression".to_string())
        })?;

        match token.token {
            Token::Int(value) => Ok(Expr::Literal(Value::Int(value))),
            Token::Float(value) => Ok(Expr::Literal(Value::Float(value))),
            Token::Str(value) => {
                // Adjacent string literals concatenate.
                let mut text = value;
                while let Some(Token::Str(next)) = self.peek().map(|token| &token.token) {
                    text.push_str(next);
                    self.index += 1;
                }
                Ok(Expr::Literal(Value::Str(text)))
            }
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::NoneLiteral => Ok(Expr::Literal(Value::None)),
            Token::Name(name) => Ok(Expr::Name(name)),
            Token::LParen => self.nested(Self::parse_parenthesized),
            Token::LBracket => Ok(Expr::List(
                self.nested(|parser| parser.parse_sequence(&Token::RBracket, "]"))?,
            )),
            Token::LBrace => self.nested(Self::parse_dict),
            _ => Err(EvalError::Syntax(format!(
                "invalid syntax near position {position}"
            ))),
        }
    }

    fn parse_parenthesized(&mut self) -> Result<Expr> {
        if self.consume(&Token::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }

        let first = self.parse_expression()?;
        if self.consume(&Token::RParen) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.consume(&Token::Comma) {
            if self.peek_is(&Token::RParen) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        self.expect(&Token::RParen, ")")?;
        Ok(Expr::Tuple(items))
    }

    fn parse_dict(&mut self) -> Result<Expr> {
        let mut entries = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            let key = self.parse_expression()?;
            self.expect(&Token::Colon, ":")?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "}")?;
        Ok(Expr::Dict(entries))
    }

    /// Parses comma separated expressions up to and including `close`.
    fn parse_sequence(&mut self, close: &Token, close_char: &str) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.peek_is(close) {
            items.push(self.parse_expression()?);
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect(close, close_char)?;
        Ok(items)
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(EvalError::Syntax("too many nested parentheses".to_string()));
        }
        self.grow()?;
        let parsed = parse(self);
        self.nesting -= 1;
        self.depth -= 1;
        parsed
    }

    /// Accounts for one more level of tree depth. Callers restore `depth`
    /// when the level is closed.
    fn grow(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_TREE_DEPTH {
            return Err(EvalError::Syntax(
                "expression is too deeply nested".to_string(),
            ));
        }
        Ok(())
    }

    fn next_starts_expression(&self) -> bool {
        matches!(
            self.peek().map(|token| &token.token),
            Some(
                Token::Int(_)
                    | Token::Float(_)
                    | Token::Str(_)
                    | Token::Name(_)
                    | Token::True
                    | Token::False
                    | Token::NoneLiteral
                    | Token::LParen
                    | Token::LBracket
                    | Token::LBrace
                    | Token::Plus
                    | Token::Minus
                    | Token::Not
            )
        )
    }

    fn expect(&mut self, expected: &Token, close_char: &str) -> Result<()> {
        if self.consume(expected) {
            return Ok(());
        }
        match self.peek() {
            Some(token) => Err(EvalError::Syntax(format!(
                "expected '{close_char}' near position {}",
                token.position
            ))),
            None => Err(EvalError::Syntax(format!(
                "expected '{close_char}' but reached end of expression"
            ))),
        }
    }

    fn consume(&mut self, expected: &Token) -> bool {
        self.peek_is(expected) && {
            self.index += 1;
            true
        }
    }

    fn peek_is(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(token) if &token.token == expected)
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.index).cloned()?;
        self.index += 1;
        Some(token)
    }

    fn current_position(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|token| token.position)
            .unwrap_or_default()
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::EqEq => Some(CompareOp::Eq),
        Token::NotEq => Some(CompareOp::Ne),
        Token::Lt => Some(CompareOp::Lt),
        Token::LtEq => Some(CompareOp::Le),
        Token::Gt => Some(CompareOp::Gt),
        Token::GtEq => Some(CompareOp::Ge),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> Expr {
        Expr::Literal(Value::Int(value))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = ExprParser::parse("1 + 2 * 3").expect("parse");
        assert_eq!(
            expr,
            binary(BinaryOp::Add, int(1), binary(BinaryOp::Mul, int(2), int(3)))
        );
    }

    #[test]
    fn power_is_right_associative_and_beats_unary_minus() {
        let expr = ExprParser::parse("-2 ** 3 ** 2").expect("parse");
        assert_eq!(
            expr,
            Expr::Unary {
                op: UnaryOp::Minus,
                operand: Box::new(binary(
                    BinaryOp::Pow,
                    int(2),
                    binary(BinaryOp::Pow, int(3), int(2))
                )),
            }
        );
    }

    #[test]
    fn top_level_commas_make_a_tuple() {
        let expr = ExprParser::parse("'1+x', {'x': 3}").expect("parse");
        let Expr::Tuple(items) = expr else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Expr::Literal(Value::Str("1+x".to_string())));
        assert!(matches!(items[1], Expr::Dict(ref entries) if entries.len() == 1));
    }

    #[test]
    fn parenthesized_forms() {
        assert_eq!(ExprParser::parse("()").expect("parse"), Expr::Tuple(Vec::new()));
        assert_eq!(ExprParser::parse("(1)").expect("parse"), int(1));
        assert_eq!(
            ExprParser::parse("(1,)").expect("parse"),
            Expr::Tuple(vec![int(1)])
        );
    }

    #[test]
    fn chained_comparison() {
        let expr = ExprParser::parse("1 < 2 <= 3").expect("parse");
        let Expr::Compare { rest, .. } = expr else {
            panic!("expected comparison");
        };
        assert_eq!(
            rest.iter().map(|(op, _)| *op).collect::<Vec<_>>(),
            vec![CompareOp::Lt, CompareOp::Le]
        );
    }

    #[test]
    fn calls_and_subscripts() {
        let expr = ExprParser::parse("max([1, 2])[0]").expect("parse");
        let Expr::Subscript { target, .. } = expr else {
            panic!("expected subscript");
        };
        assert!(matches!(*target, Expr::Call { ref function, .. } if function == "max"));
    }

    #[test]
    fn adjacent_strings_concatenate() {
        assert_eq!(
            ExprParser::parse("'ab' \"cd\"").expect("parse"),
            Expr::Literal(Value::Str("abcd".to_string()))
        );
    }

    #[test]
    fn rejects_trailing_tokens() {
        let err = ExprParser::parse("1 2").expect_err("should fail");
        assert_eq!(err.to_string(), "invalid syntax near position 2");
    }

    #[test]
    fn rejects_unclosed_group() {
        let err = ExprParser::parse("(1 + 2").expect_err("should fail");
        assert_eq!(err.to_string(), "expected ')' but reached end of expression");
    }

    #[test]
    fn rejects_empty_source() {
        assert!(ExprParser::parse("   ").is_err());
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let unary = format!("{}1", "-".repeat(100_000));
        assert_eq!(
            ExprParser::parse(&unary).expect_err("should fail").to_string(),
            "too many nested parentheses"
        );
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(
            ExprParser::parse(&parens).expect_err("should fail").to_string(),
            "too many nested parentheses"
        );
        let lists = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
        assert!(ExprParser::parse(&lists).is_err());
        let negations = format!("{}True", "not ".repeat(100_000));
        assert!(ExprParser::parse(&negations).is_err());
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let parens = format!("{}1{}", "(".repeat(150), ")".repeat(150));
        assert_eq!(ExprParser::parse(&parens).expect("parse"), int(1));
        assert!(ExprParser::parse(&format!("{}1", "-".repeat(150))).is_ok());
    }

    #[test]
    fn long_operator_chains_are_bounded() {
        let short = vec!["1"; 500].join(" + ");
        assert!(ExprParser::parse(&short).is_ok());
        let long = vec!["1"; 100_000].join(" + ");
        assert_eq!(
            ExprParser::parse(&long).expect_err("should fail").to_string(),
            "expression is too deeply nested"
        );
        let subscripts = format!("[0]{}", "[0]".repeat(100_000));
        assert!(ExprParser::parse(&subscripts).is_err());
    }

    #[test]
    fn rejects_calling_a_literal() {
        assert!(ExprParser::parse("1(2)").is_err());
    }
}
