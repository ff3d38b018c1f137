use crate::token::{Token, TokenKind, lookup_ident};

/// Hand-rolled scanner over an ASCII source string.
///
/// The lexer never fails: characters it does not recognize come back as
/// `Illegal` tokens and are rejected by the parser. After the end of input it
/// returns `Eof` tokens indefinitely.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();

        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Token::eof();
        };

        match ch {
            '=' => {
                self.consume_char();
                if self.peek_char() == Some('=') {
                    self.consume_char();
                    self.token_from(TokenKind::Eq, start)
                } else {
                    self.token_from(TokenKind::Assign, start)
                }
            }
            '!' => {
                self.consume_char();
                if self.peek_char() == Some('=') {
                    self.consume_char();
                    self.token_from(TokenKind::NotEq, start)
                } else {
                    self.token_from(TokenKind::Bang, start)
                }
            }
            '"' => self.read_string(),
            c if is_ident_start(c) => self.read_identifier(start),
            c if c.is_ascii_digit() => self.read_integer(start),
            c => {
                self.consume_char();
                let kind = match c {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Asterisk,
                    '/' => TokenKind::Slash,
                    '<' => TokenKind::Lt,
                    '>' => TokenKind::Gt,
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semicolon,
                    ':' => TokenKind::Colon,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::Illegal,
                };
                self.token_from(kind, start)
            }
        }
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token::new(kind, &self.input[start..self.pos])
    }

    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        self.consume_while(|c| is_ident_start(c) || c.is_ascii_digit());
        let ident = &self.input[start..self.pos];
        Token::new(lookup_ident(ident), ident)
    }

    fn read_integer(&mut self, start: usize) -> Token<'a> {
        self.consume_while(|c| c.is_ascii_digit());
        self.token_from(TokenKind::Int, start)
    }

    fn read_string(&mut self) -> Token<'a> {
        self.consume_char(); // opening quote
        let content_start = self.pos;
        self.consume_while(|c| c != '"');
        let content = &self.input[content_start..self.pos];
        // An unterminated string simply runs to end of input; no escapes.
        self.consume_char();
        Token::new(TokenKind::String, content)
    }

    fn skip_whitespace(&mut self) {
        self.consume_while(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
    }

    fn consume_while<P>(&mut self, keep_predicate: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !keep_predicate(c) {
                break;
            }
            self.consume_char();
        }
        self.pos - start
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_token())
    }
}

/// Scans the whole input, including the trailing `Eof` token.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}
