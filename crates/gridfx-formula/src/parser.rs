//! Formula parser
//!
//! A tokenizer plus a recursive descent parser. Precedence, lowest first:
//!
//! 1. Comparison: `<`, `>`, `<=`, `>=`, `=`, `<>`
//! 2. Addition/Subtraction: `+`, `-`
//! 3. Multiplication/Division: `*`, `/`
//! 4. Unary: `-`, `+`
//! 5. Primary: numbers, raw tokens, function calls, parentheses
//!
//! Operators are left-associative and each application becomes a two-argument
//! node (`1+2+3` is `SUM(SUM(1,2),3)`). Operands that are plain numbers are
//! stored as numbers; references, quoted strings and other words are stored
//! as raw tokens and classified at evaluation time.

use crate::ast::{CellFunction, FunctionArg, FunctionName};
use crate::error::{FormulaError, FormulaResult};
use crate::literal::{is_cell_reference, is_word_char, unquote};
use crate::sheet::Sheet;
use gridfx_core::Value;
use std::iter::Peekable;
use std::str::CharIndices;

/// Bound on the height of a parsed tree: parentheses, nested calls, unary
/// signs and operator chains all count toward it
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse a formula against the sheet it will be stored in.
///
/// References outside of `sheet` are allowed (they evaluate to NaN) but are
/// logged, since they usually indicate a typo.
pub fn parse(formula: &str, sheet: &Sheet) -> FormulaResult<CellFunction> {
    let function = parse_formula(formula)?;
    for addr in function.references() {
        if !sheet.contains(&addr) {
            log::debug!(
                "formula '{}' references {} outside of the {}x{} sheet",
                formula,
                addr,
                sheet.row_count(),
                sheet.col_count()
            );
        }
    }
    Ok(function)
}

/// Parse a formula string into an AST
///
/// A leading `=` is optional. A formula that is a single operand becomes a
/// `LITERAL` node; that operand must be a number, `TRUE`/`FALSE`, a cell
/// reference or a quoted string.
///
/// # Example
/// ```rust
/// use gridfx_formula::{parse_formula, FunctionName};
///
/// let ast = parse_formula("3+4*2").unwrap();
/// assert_eq!(ast.name, FunctionName::Sum);
///
/// let ast = parse_formula("IF(A1>0,\"Yes\",\"No\")").unwrap();
/// assert_eq!(ast.name, FunctionName::If);
/// assert_eq!(ast.args.len(), 3);
///
/// assert!(parse_formula("FOO(1)").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<CellFunction> {
    let formula = formula.trim();
    let body = formula.strip_prefix('=').unwrap_or(formula).trim();
    if body.is_empty() {
        return Err(FormulaError::InvalidExpression(formula.to_string()));
    }

    let mut parser = FormulaParser::new(body)?;
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::InvalidExpression(format!(
            "unexpected {:?} in '{}'",
            parser.current_token(),
            body
        )));
    }

    match expr {
        FunctionArg::Function(function) => Ok(function),
        FunctionArg::Value(value) => literal_node(value, body),
    }
}

/// Wrap a lone operand in a `LITERAL` node
fn literal_node(value: Value, formula: &str) -> FormulaResult<CellFunction> {
    let value = match value {
        Value::String(token) => match token.as_str() {
            "TRUE" => Value::Boolean(true),
            "FALSE" => Value::Boolean(false),
            t if is_cell_reference(t) || unquote(t).is_some() => Value::String(token),
            _ => return Err(FormulaError::InvalidExpression(formula.to_string())),
        },
        other => other,
    };
    Ok(CellFunction::literal(value))
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    /// Quoted string, quotes included
    Text(String),
    /// Run of letters, digits, `_` and `.` that is not a number
    Word(String),

    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Comma,
    LeftParen,
    RightParen,

    Eof,
}

/// Splits formula text into tokens, skipping whitespace
struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn next_token(&mut self) -> FormulaResult<Token> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some((start, c)) = self.chars.next() else {
            return Ok(Token::Eof);
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            ',' => Token::Comma,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '=' => Token::Equal,
            // Two-character operators take precedence over their one-character prefixes
            '<' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_some() {
                    Token::LessEqual
                } else if self.chars.next_if(|(_, c)| *c == '>').is_some() {
                    Token::NotEqual
                } else {
                    Token::LessThan
                }
            }
            '>' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_some() {
                    Token::GreaterEqual
                } else {
                    Token::GreaterThan
                }
            }
            '"' | '\'' => self.scan_text(start, c)?,
            c if is_word_char(c) => self.scan_word(start),
            other => {
                return Err(FormulaError::InvalidExpression(format!(
                    "unexpected character '{}' in '{}'",
                    other, self.input
                )))
            }
        };
        Ok(token)
    }

    fn scan_text(&mut self, start: usize, quote: char) -> FormulaResult<Token> {
        for (pos, c) in self.chars.by_ref() {
            if c == quote {
                let end = pos + c.len_utf8();
                return Ok(Token::Text(self.input[start..end].to_string()));
            }
        }
        Err(FormulaError::InvalidExpression(format!(
            "unterminated string in '{}'",
            self.input
        )))
    }

    fn scan_word(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some((pos, c)) = self.chars.next_if(|(_, c)| is_word_char(*c)) {
            end = pos + c.len_utf8();
        }
        let word = &self.input[start..end];

        let starts_numeric = word.starts_with(|c: char| c.is_ascii_digit() || c == '.');
        match word.parse::<f64>() {
            Ok(n) if starts_numeric && n.is_finite() => Token::Number(n),
            _ => Token::Word(word.to_string()),
        }
    }
}

/// Formula parser
struct FormulaParser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    depth: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
            depth: 0,
        })
    }

    // === Token handling ===

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current_token, next))
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::InvalidExpression(format!(
                "expected {:?}, got {:?} in '{}'",
                expected,
                self.current_token(),
                self.lexer.input
            )))
        }
    }

    // === Nesting ===

    fn descend(&mut self) -> FormulaResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(FormulaError::InvalidExpression(format!(
                "formula nested too deeply (more than {} levels)",
                MAX_NESTING_DEPTH
            )));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one level deeper
    fn nested<F>(&mut self, parse: F) -> FormulaResult<FunctionArg>
    where
        F: FnOnce(&mut Self) -> FormulaResult<FunctionArg>,
    {
        self.descend()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> FormulaResult<FunctionArg> {
        self.nested(Self::parse_comparison)
    }

    // Each operator application below adds a level to the tree, so it counts
    // toward the bound until the chain ends.

    fn parse_comparison(&mut self) -> FormulaResult<FunctionArg> {
        let base = self.depth;
        let mut left = self.parse_additive()?;

        loop {
            let name = match self.current_token() {
                Token::LessThan => FunctionName::LessThan,
                Token::GreaterThan => FunctionName::GreaterThan,
                Token::LessEqual => FunctionName::LessThanOrEqual,
                Token::GreaterEqual => FunctionName::GreaterThanOrEqual,
                Token::Equal => FunctionName::Equals,
                Token::NotEqual => FunctionName::NotEqual,
                _ => break,
            };

            self.consume()?;
            self.descend()?;
            let right = self.parse_additive()?;
            left = binary(name, left, right);
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<FunctionArg> {
        let base = self.depth;
        let mut left = self.parse_multiplicative()?;

        loop {
            let name = match self.current_token() {
                Token::Plus => FunctionName::Sum,
                Token::Minus => FunctionName::Subtract,
                _ => break,
            };

            self.consume()?;
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = binary(name, left, right);
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FunctionArg> {
        let base = self.depth;
        let mut left = self.parse_unary()?;

        loop {
            let name = match self.current_token() {
                Token::Star => FunctionName::Multiply,
                Token::Slash => FunctionName::Divide,
                _ => break,
            };

            self.consume()?;
            self.descend()?;
            let right = self.parse_unary()?;
            left = binary(name, left, right);
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FunctionArg> {
        match self.current_token() {
            Token::Minus => {
                self.consume()?;
                Ok(match self.nested(Self::parse_unary)? {
                    FunctionArg::Value(Value::Number(n)) => FunctionArg::number(-n),
                    // -x is 0-x
                    operand => binary(FunctionName::Subtract, FunctionArg::number(0.0), operand),
                })
            }
            Token::Plus => {
                self.consume()?;
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<FunctionArg> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok(FunctionArg::number(n))
            }

            Token::Text(text) => {
                self.consume()?;
                Ok(FunctionArg::token(text))
            }

            Token::Word(word) => {
                self.consume()?;
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(&word)
                } else {
                    Ok(FunctionArg::token(word))
                }
            }

            Token::LeftParen => {
                self.consume()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            other => Err(FormulaError::InvalidExpression(format!(
                "unexpected {:?} in '{}'",
                other, self.lexer.input
            ))),
        }
    }

    fn parse_function_call(&mut self, word: &str) -> FormulaResult<FunctionArg> {
        let name = FunctionName::from_name(word)
            .ok_or_else(|| FormulaError::InvalidFunctionName(word.to_string()))?;

        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_argument()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                args.push(self.parse_argument()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(FunctionArg::Function(CellFunction::new(name, args)))
    }

    /// An argument slot; an empty slot (`SUM(1,,2)`) is an empty raw token
    fn parse_argument(&mut self) -> FormulaResult<FunctionArg> {
        if matches!(self.current_token(), Token::Comma | Token::RightParen) {
            return Ok(FunctionArg::token(""));
        }
        self.parse_expression()
    }
}

fn binary(name: FunctionName, left: FunctionArg, right: FunctionArg) -> FunctionArg {
    FunctionArg::Function(CellFunction::new(name, vec![left, right]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> FunctionArg {
        FunctionArg::number(n)
    }

    fn tok(t: &str) -> FunctionArg {
        FunctionArg::token(t)
    }

    fn node(name: FunctionName, args: Vec<FunctionArg>) -> CellFunction {
        CellFunction::new(name, args)
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(
            parse_formula("42").unwrap(),
            CellFunction::literal(Value::Number(42.0))
        );
        assert_eq!(
            parse_formula("3.14").unwrap(),
            CellFunction::literal(Value::Number(3.14))
        );
        assert_eq!(
            parse_formula("-5").unwrap(),
            CellFunction::literal(Value::Number(-5.0))
        );
        assert_eq!(
            parse_formula("TRUE").unwrap(),
            CellFunction::literal(Value::Boolean(true))
        );
        assert_eq!(
            parse_formula("A1").unwrap(),
            CellFunction::literal(Value::from("A1"))
        );
        assert_eq!(
            parse_formula("\"hello world\"").unwrap(),
            CellFunction::literal(Value::from("\"hello world\""))
        );
        assert_eq!(
            parse_formula("'x'").unwrap(),
            CellFunction::literal(Value::from("'x'"))
        );
    }

    #[test]
    fn test_parse_leading_equals_and_whitespace() {
        assert_eq!(parse_formula("= 1 + 2 ").unwrap(), parse_formula("1+2").unwrap());
        assert_eq!(
            parse_formula(" SUM( 1 , 2 ) ").unwrap(),
            parse_formula("SUM(1,2)").unwrap()
        );
    }

    #[test]
    fn test_parse_precedence() {
        // 3+4*2 is SUM(3, MULTIPLY(4,2))
        assert_eq!(
            parse_formula("3+4*2").unwrap(),
            node(
                FunctionName::Sum,
                vec![num(3.0), node(FunctionName::Multiply, vec![num(4.0), num(2.0)]).into()]
            )
        );

        // (3+4)*2 is MULTIPLY(SUM(3,4), 2)
        assert_eq!(
            parse_formula("(3+4)*2").unwrap(),
            node(
                FunctionName::Multiply,
                vec![node(FunctionName::Sum, vec![num(3.0), num(4.0)]).into(), num(2.0)]
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        assert_eq!(
            parse_formula("10-3-2").unwrap(),
            node(
                FunctionName::Subtract,
                vec![node(FunctionName::Subtract, vec![num(10.0), num(3.0)]).into(), num(2.0)]
            )
        );
        assert_eq!(
            parse_formula("A1/B1*2").unwrap(),
            node(
                FunctionName::Multiply,
                vec![node(FunctionName::Divide, vec![tok("A1"), tok("B1")]).into(), num(2.0)]
            )
        );
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(
            parse_formula("-A1").unwrap(),
            node(FunctionName::Subtract, vec![num(0.0), tok("A1")])
        );
        assert_eq!(
            parse_formula("2*-3").unwrap(),
            node(FunctionName::Multiply, vec![num(2.0), num(-3.0)])
        );
    }

    #[test]
    fn test_parse_comparison() {
        let cases = [
            ("A1<5", FunctionName::LessThan),
            ("A1>5", FunctionName::GreaterThan),
            ("A1<=5", FunctionName::LessThanOrEqual),
            ("A1>=5", FunctionName::GreaterThanOrEqual),
            ("A1=5", FunctionName::Equals),
            ("A1<>5", FunctionName::NotEqual),
        ];
        for (formula, name) in cases {
            assert_eq!(
                parse_formula(formula).unwrap(),
                node(name, vec![tok("A1"), num(5.0)]),
                "{}",
                formula
            );
        }
    }

    #[test]
    fn test_comparison_binds_loosest() {
        assert_eq!(
            parse_formula("A1+1<3*2").unwrap(),
            node(
                FunctionName::LessThan,
                vec![
                    node(FunctionName::Sum, vec![tok("A1"), num(1.0)]).into(),
                    node(FunctionName::Multiply, vec![num(3.0), num(2.0)]).into(),
                ]
            )
        );
    }

    #[test]
    fn test_parse_function() {
        assert_eq!(
            parse_formula("SUM(1,2,3)").unwrap(),
            node(FunctionName::Sum, vec![num(1.0), num(2.0), num(3.0)])
        );
        assert_eq!(
            parse_formula("sum(A1,\"x\")").unwrap(),
            node(FunctionName::Sum, vec![tok("A1"), tok("\"x\"")])
        );
        assert_eq!(parse_formula("MAX()").unwrap(), node(FunctionName::Max, vec![]));
        assert_eq!(
            parse_formula("SUM(1,,2)").unwrap(),
            node(FunctionName::Sum, vec![num(1.0), tok(""), num(2.0)])
        );
    }

    #[test]
    fn test_parse_nested_function() {
        assert_eq!(
            parse_formula("SUM(1,MAX(2,3),MIN(AVG(4,5),6))").unwrap(),
            node(
                FunctionName::Sum,
                vec![
                    num(1.0),
                    node(FunctionName::Max, vec![num(2.0), num(3.0)]).into(),
                    node(
                        FunctionName::Min,
                        vec![node(FunctionName::Avg, vec![num(4.0), num(5.0)]).into(), num(6.0)]
                    )
                    .into(),
                ]
            )
        );
    }

    #[test]
    fn test_parse_if() {
        assert_eq!(
            parse_formula("IF(1<2,\"yes\",\"no\")").unwrap(),
            node(
                FunctionName::If,
                vec![
                    node(FunctionName::LessThan, vec![num(1.0), num(2.0)]).into(),
                    tok("\"yes\""),
                    tok("\"no\""),
                ]
            )
        );
    }

    #[test]
    fn test_strings_keep_delimiters_and_commas() {
        assert_eq!(
            parse_formula("IF(TRUE,\"a, (b)\",'c')").unwrap(),
            node(FunctionName::If, vec![tok("TRUE"), tok("\"a, (b)\""), tok("'c'")])
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_formula("FOO(1)"),
            Err(FormulaError::InvalidFunctionName(name)) if name == "FOO"
        ));
        assert!(matches!(
            parse_formula("SUM(1,FOO(2))"),
            Err(FormulaError::InvalidFunctionName(_))
        ));

        for bad in ["", "=", "foo", "1+", "(1+2", "SUM(1,2", "1 2", "1+2)", "\"open", "A1 # 2"] {
            let err = parse_formula(bad).unwrap_err();
            assert!(
                matches!(err, FormulaError::InvalidExpression(_)),
                "{}: {:?}",
                bad,
                err
            );
            assert!(err.is_parse_error());
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let n = 10_000;
        let parens = format!("{}1{}", "(".repeat(n), ")".repeat(n));
        let signs = format!("{}1", "-".repeat(n));
        let calls = format!("{}1{}", "SUM(".repeat(n), ")".repeat(n));
        let chain = vec!["1"; n].join("+");

        for formula in [&parens, &signs, &calls, &chain] {
            let err = parse_formula(formula).unwrap_err();
            assert!(matches!(err, FormulaError::InvalidExpression(_)), "{:?}", err);
            assert!(err.is_parse_error());
        }
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let n = 50;
        let parens = format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(
            parse_formula(&parens).unwrap(),
            CellFunction::literal(Value::Number(1.0))
        );

        let signs = format!("{}1", "-".repeat(n));
        assert_eq!(
            parse_formula(&signs).unwrap(),
            CellFunction::literal(Value::Number(1.0))
        );

        let chain = vec!["A1"; n].join("+");
        assert_eq!(parse_formula(&chain).unwrap().name, FunctionName::Sum);
    }

    #[test]
    fn test_opaque_operands_inside_expressions() {
        // Only a lone operand has to be a recognizable literal
        assert_eq!(
            parse_formula("foo+1").unwrap(),
            node(FunctionName::Sum, vec![tok("foo"), num(1.0)])
        );
    }

    #[test]
    fn test_display_round_trip() {
        for formula in [
            "SUM(1,A1,MULTIPLY(2,B2))",
            "IF(LESS_THAN(A1,2),\"yes, sir\",FALSE)",
            "LITERAL(-1.5)",
            "AVG(1,,2)",
        ] {
            let ast = parse_formula(formula).unwrap();
            assert_eq!(parse_formula(&ast.to_string()).unwrap(), ast);
        }
    }

    #[test]
    fn test_parse_with_sheet() {
        let sheet = Sheet::filled(1, 1, Value::Null.into());
        // Out-of-range references are accepted
        let ast = parse("B5+A1", &sheet).unwrap();
        assert_eq!(ast.name, FunctionName::Sum);
    }
}
