use thiserror::Error;

use crate::ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Binding power of each operator, lowest to highest. The derived ordering is
/// what the Pratt climb compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < >
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // add(x)
    Index,       // arr[0]
}

fn token_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// All messages accumulated while parsing one source text.
///
/// The parser itself never aborts; this type exists for callers that want the
/// accumulated list as a `Result` error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", .errors.join("\n"))]
pub struct ParseErrors {
    pub errors: Vec<String>,
}

/// Pratt (top-down operator-precedence) parser with one token of lookahead.
///
/// Tokens are pulled lazily from the lexer. Errors are recorded as strings in
/// `errors` and parsing continues at the next statement; the caller inspects
/// `errors()` before trusting the returned `Program`.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token<'a>,
    peek_token: Token<'a>,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut parser = Self {
            lexer,
            cur_token: Token::eof(),
            peek_token: Token::eof(),
            errors: Vec::new(),
        };
        // Prime cur_token and peek_token.
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.cur_token.literal.to_string();

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression(expr))
    }

    /// The Pratt climb. On return, `cur_token` is the last token of the
    /// parsed expression, never past it.
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            if !has_infix_parselet(self.peek_token.kind) {
                return Some(left);
            }
            self.next_token();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    /// Dispatch on the token that may start an expression.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur_token.kind {
            TokenKind::Ident => Some(Expression::Identifier(self.cur_token.literal.to_string())),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::String => Some(Expression::StringLiteral(
                self.cur_token.literal.to_string(),
            )),
            TokenKind::True => Some(Expression::BooleanLiteral(true)),
            TokenKind::False => Some(Expression::BooleanLiteral(false)),
            TokenKind::Bang => self.parse_prefix_expression(PrefixOperator::Bang),
            TokenKind::Minus => self.parse_prefix_expression(PrefixOperator::Minus),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => {
                let elements = self.parse_expression_list(TokenKind::RBracket)?;
                Some(Expression::ArrayLiteral(elements))
            }
            TokenKind::LBrace => self.parse_hash_literal(),
            kind => {
                self.errors
                    .push(format!("no prefix parse function for {kind}"));
                None
            }
        }
    }

    /// Dispatch on a token that extends the expression to its left.
    /// `cur_token` sits on that token when this is called.
    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        let operator = match self.cur_token.kind {
            TokenKind::Plus => InfixOperator::Plus,
            TokenKind::Minus => InfixOperator::Minus,
            TokenKind::Asterisk => InfixOperator::Asterisk,
            TokenKind::Slash => InfixOperator::Slash,
            TokenKind::Lt => InfixOperator::Lt,
            TokenKind::Gt => InfixOperator::Gt,
            TokenKind::Eq => InfixOperator::Eq,
            TokenKind::NotEq => InfixOperator::NotEq,
            TokenKind::LParen => return self.parse_call_expression(left),
            TokenKind::LBracket => return self.parse_index_expression(left),
            _ => return Some(left),
        };

        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.errors.push(format!(
                    "could not parse {} as integer",
                    self.cur_token.literal
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Option<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut statements = Vec::new();
        self.next_token();
        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        BlockStatement { statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expression::FunctionLiteral { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_token_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        parameters.push(self.cur_token.literal.to_string());

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }
            parameters.push(self.cur_token.literal.to_string());
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_token_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }
        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }
        Some(Expression::HashLiteral(pairs))
    }

    /// Comma-separated expressions up to (and consuming) `end`.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn next_token(&mut self) {
        self.cur_token = self.peek_token;
        self.peek_token = self.lexer.next_token();
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advances past `peek_token` when it has the expected kind, otherwise
    /// records an error and leaves the parser where it is.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.errors.push(format!(
                "expected next token to be {kind}, got {}",
                self.peek_token.kind
            ));
            false
        }
    }

    fn peek_precedence(&self) -> Precedence {
        token_precedence(self.peek_token.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        token_precedence(self.cur_token.kind)
    }
}

fn has_infix_parselet(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::LParen
            | TokenKind::LBracket
    )
}

/// Lexes and parses `input`, failing if any parse error was recorded.
pub fn parse_source(input: &str) -> Result<Program, ParseErrors> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(ParseErrors {
            errors: parser.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(input: &str) -> Program {
        parse_source(input).expect("parse failed")
    }

    fn parse_single_expression(input: &str) -> Expression {
        let program = parse(input);
        assert_eq!(program.statements.len(), 1, "want exactly one statement");
        match program.statements.into_iter().next().unwrap() {
            Statement::Expression(expr) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    fn int(value: i64) -> Expression {
        Expression::IntegerLiteral(value)
    }

    fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Expression {
        Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn parses_let_statements() {
        let input = indoc! {"
            let x = 5;
            let y = true;
            let foobar = y;
        "};
        let program = parse(input);
        let expected = vec![
            Statement::Let {
                name: "x".to_string(),
                value: int(5),
            },
            Statement::Let {
                name: "y".to_string(),
                value: Expression::BooleanLiteral(true),
            },
            Statement::Let {
                name: "foobar".to_string(),
                value: ident("y"),
            },
        ];
        assert_eq!(program.statements, expected);
    }

    #[test]
    fn parses_return_statements() {
        let input = indoc! {"
            return 5;
            return 10;
            return 993322;
        "};
        let program = parse(input);
        let expected = vec![
            Statement::Return(int(5)),
            Statement::Return(int(10)),
            Statement::Return(int(993322)),
        ];
        assert_eq!(program.statements, expected);
    }

    #[test]
    fn parses_identifier_expression() {
        assert_eq!(parse_single_expression("foobar;"), ident("foobar"));
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse_single_expression("5;"), int(5));
        assert_eq!(
            parse_single_expression("true;"),
            Expression::BooleanLiteral(true)
        );
        assert_eq!(
            parse_single_expression(r#""hello world";"#),
            Expression::StringLiteral("hello world".to_string())
        );
    }

    #[test]
    fn parses_prefix_expressions() {
        let cases = [
            ("!5;", PrefixOperator::Bang, int(5)),
            ("-15;", PrefixOperator::Minus, int(15)),
            ("!true;", PrefixOperator::Bang, Expression::BooleanLiteral(true)),
        ];
        for (input, operator, right) in cases {
            assert_eq!(
                parse_single_expression(input),
                Expression::Prefix {
                    operator,
                    right: Box::new(right),
                },
                "input: {input}"
            );
        }
    }

    #[test]
    fn parses_infix_expressions() {
        let cases = [
            ("5 + 5;", InfixOperator::Plus),
            ("5 - 5;", InfixOperator::Minus),
            ("5 * 5;", InfixOperator::Asterisk),
            ("5 / 5;", InfixOperator::Slash),
            ("5 > 5;", InfixOperator::Gt),
            ("5 < 5;", InfixOperator::Lt),
            ("5 == 5;", InfixOperator::Eq),
            ("5 != 5;", InfixOperator::NotEq),
        ];
        for (input, operator) in cases {
            assert_eq!(
                parse_single_expression(input),
                infix(int(5), operator, int(5)),
                "input: {input}"
            );
        }
    }

    #[test]
    fn resolves_operator_precedence() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3 + 4; -5 * 5", "(3 + 4)((-5) * 5)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("true", "true"),
            ("false", "false"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("2 / (5 + 5)", "(2 / (5 + 5))"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d)",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(parse(input).to_string(), expected, "input: {input}");
        }
    }

    #[test]
    fn parses_if_expression_without_alternative() {
        let expr = parse_single_expression("if (x < y) { x }");
        let Expression::If {
            condition,
            consequence,
            alternative,
        } = expr
        else {
            panic!("expected if expression");
        };
        assert_eq!(*condition, infix(ident("x"), InfixOperator::Lt, ident("y")));
        assert_eq!(
            consequence.statements,
            vec![Statement::Expression(ident("x"))]
        );
        assert!(alternative.is_none());
    }

    #[test]
    fn parses_if_else_expression() {
        let expr = parse_single_expression("if (x < y) { x } else { y }");
        let Expression::If { alternative, .. } = expr else {
            panic!("expected if expression");
        };
        assert_eq!(
            alternative.expect("missing alternative").statements,
            vec![Statement::Expression(ident("y"))]
        );
    }

    #[test]
    fn parses_function_literal() {
        let expr = parse_single_expression("fn(x, y) { x + y; }");
        let Expression::FunctionLiteral { parameters, body } = expr else {
            panic!("expected function literal");
        };
        assert_eq!(parameters, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(
            body.statements,
            vec![Statement::Expression(infix(
                ident("x"),
                InfixOperator::Plus,
                ident("y")
            ))]
        );
    }

    #[test]
    fn parses_function_parameter_lists() {
        let cases: [(&str, &[&str]); 3] = [
            ("fn() {};", &[]),
            ("fn(x) {};", &["x"]),
            ("fn(x, y, z) {};", &["x", "y", "z"]),
        ];
        for (input, expected) in cases {
            let Expression::FunctionLiteral { parameters, .. } = parse_single_expression(input)
            else {
                panic!("expected function literal for {input}");
            };
            assert_eq!(parameters, expected, "input: {input}");
        }
    }

    #[test]
    fn parses_call_expression_arguments() {
        let expr = parse_single_expression("add(1, 2 * 3, 4 + 5);");
        let Expression::Call {
            function,
            arguments,
        } = expr
        else {
            panic!("expected call expression");
        };
        assert_eq!(*function, ident("add"));
        assert_eq!(
            arguments,
            vec![
                int(1),
                infix(int(2), InfixOperator::Asterisk, int(3)),
                infix(int(4), InfixOperator::Plus, int(5)),
            ]
        );
    }

    #[test]
    fn parses_array_literal() {
        let expr = parse_single_expression("[1, 2 * 2, 3 + 3]");
        assert_eq!(
            expr,
            Expression::ArrayLiteral(vec![
                int(1),
                infix(int(2), InfixOperator::Asterisk, int(2)),
                infix(int(3), InfixOperator::Plus, int(3)),
            ])
        );
    }

    #[test]
    fn parses_index_expression() {
        let expr = parse_single_expression("myArray[1 + 1]");
        assert_eq!(
            expr,
            Expression::Index {
                left: Box::new(ident("myArray")),
                index: Box::new(infix(int(1), InfixOperator::Plus, int(1))),
            }
        );
    }

    #[test]
    fn parses_hash_literal_with_string_keys() {
        let expr = parse_single_expression(r#"{"one": 1, "two": 2, "three": 3}"#);
        let Expression::HashLiteral(pairs) = expr else {
            panic!("expected hash literal");
        };
        let expected = vec![
            (Expression::StringLiteral("one".to_string()), int(1)),
            (Expression::StringLiteral("two".to_string()), int(2)),
            (Expression::StringLiteral("three".to_string()), int(3)),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn parses_empty_hash_literal() {
        assert_eq!(
            parse_single_expression("{}"),
            Expression::HashLiteral(Vec::new())
        );
    }

    #[test]
    fn parses_hash_literal_with_expression_values() {
        let expr = parse_single_expression(r#"{"one": 0 + 1, true: 2, 3: 3}"#);
        let Expression::HashLiteral(pairs) = expr else {
            panic!("expected hash literal");
        };
        let expected = vec![
            (
                Expression::StringLiteral("one".to_string()),
                infix(int(0), InfixOperator::Plus, int(1)),
            ),
            (Expression::BooleanLiteral(true), int(2)),
            (int(3), int(3)),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn brace_at_statement_position_parses_as_hash() {
        let expr = parse_single_expression(r#"{"a": 1}"#);
        assert!(matches!(expr, Expression::HashLiteral(_)));
    }

    #[test]
    fn records_error_for_unexpected_peek_token() {
        let err = parse_source("let x 5;").expect_err("expected parse failure");
        assert!(
            err.errors
                .contains(&"expected next token to be =, got INT".to_string()),
            "errors: {:?}",
            err.errors
        );
    }

    #[test]
    fn records_error_for_missing_prefix_parselet() {
        let err = parse_source("let x = ;").expect_err("expected parse failure");
        assert!(
            err.errors
                .contains(&"no prefix parse function for ;".to_string()),
            "errors: {:?}",
            err.errors
        );
    }

    #[test]
    fn records_error_for_integer_out_of_range() {
        let err = parse_source("99999999999999999999;").expect_err("expected parse failure");
        assert!(
            err.errors
                .contains(&"could not parse 99999999999999999999 as integer".to_string()),
            "errors: {:?}",
            err.errors
        );
    }

    #[test]
    fn keeps_parsing_after_an_error() {
        let mut parser = Parser::new(Lexer::new("let = 1; let y = 2;"));
        let program = parser.parse_program();
        assert!(!parser.errors().is_empty());
        assert!(program.statements.contains(&Statement::Let {
            name: "y".to_string(),
            value: int(2),
        }));
    }
}
