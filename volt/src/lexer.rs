//! Source text -> token stream.
//!
//! Hand-rolled, single-pass, byte/char-offset tracking scanner in the style
//! of a classic recursive-descent front end: a `peek`/`bump` cursor over the
//! source, keyword lookup by string match, and f-strings tokenized into
//! alternating literal/expression fragments (mirrors the brace-tracking
//! technique used for f-string name collection in comparable hand-written
//! Python lexers, generalized here to capture whole expression substrings).

use std::str::Chars;

use crate::diagnostics::{ParseError, SourcePos};
use crate::token::{self, FStringChunk, Token, TokenKind};

pub struct Lexer<'src> {
    src: &'src str,
    chars: std::iter::Peekable<Chars<'src>>,
    pos: usize,
}

type LexResult<T> = Result<T, ParseError>;

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(src: &'src str) -> Self {
        Self { src, chars: src.chars().peekable(), pos: 0 }
    }

    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(message, SourcePos::from_offset(self.src, offset))
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_at(&self, skip: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(skip)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn next_token(&mut self) -> LexResult<Token> {
        loop {
            match self.peek_char() {
                None => return Ok(Token::new(TokenKind::Eof, self.pos)),
                Some('\n') => {
                    let offset = self.pos;
                    self.bump();
                    return Ok(Token::new(TokenKind::Newline, offset));
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    self.skip_line_comment();
                }
                _ => break,
            }
        }

        let offset = self.pos;
        let c = self.peek_char().expect("checked above");

        if c == '"' {
            return self.lex_string(offset);
        }
        if c == 'f' && self.peek_at(1) == Some('"') {
            self.bump();
            return self.lex_fstring(offset);
        }
        if c.is_ascii_digit() {
            return self.lex_number(offset);
        }
        if c == '_' || c.is_alphabetic() {
            return self.lex_ident(offset);
        }

        self.bump();
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => {
                if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else if self.eat('>') {
                    TokenKind::FatArrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::BangEq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::And
                } else {
                    return Err(self.error("unexpected character '&'", offset));
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::Or
                } else {
                    return Err(self.error("unexpected character '|'", offset));
                }
            }
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            other => return Err(self.error(format!("unexpected character '{other}'"), offset)),
        };
        Ok(Token::new(kind, offset))
    }

    fn lex_number(&mut self, offset: usize) -> LexResult<Token> {
        let start = offset;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit())
        {
            is_float = true;
            self.bump();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.src[start..self.pos];
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid float literal '{text}'"), start))?;
            Ok(Token::new(TokenKind::Float(value), start))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| self.error(format!("invalid integer literal '{text}'"), start))?;
            Ok(Token::new(TokenKind::Int(value), start))
        }
    }

    fn lex_ident(&mut self, offset: usize) -> LexResult<Token> {
        let start = offset;
        while matches!(self.peek_char(), Some(c) if c == '_' || c.is_alphanumeric()) {
            self.bump();
        }
        let text = &self.src[start..self.pos];
        let kind = token::keyword(text).unwrap_or_else(|| TokenKind::Ident(text.to_string()));
        Ok(Token::new(kind, start))
    }

    /// Consumes the closing-quote-terminated body of a plain string literal,
    /// decoding backslash escapes. Leaves the cursor past the closing quote.
    fn scan_string_body(&mut self, start: usize) -> LexResult<String> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal", start)),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some(other) => out.push(other),
                    None => return Err(self.error("unterminated string literal", start)),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn lex_string(&mut self, offset: usize) -> LexResult<Token> {
        let text = self.scan_string_body(offset)?;
        Ok(Token::new(TokenKind::Str(text), offset))
    }

    /// Tokenizes an `f"..."` literal into alternating literal/expression
    /// chunks. `{{` and `}}` are literal braces; any other `{...}` span is
    /// captured as raw source text for the parser to re-lex and re-parse.
    fn lex_fstring(&mut self, offset: usize) -> LexResult<Token> {
        self.bump(); // opening quote
        let mut chunks = Vec::new();
        let mut literal = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated f-string literal", offset)),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => literal.push('\n'),
                    Some('t') => literal.push('\t'),
                    Some('"') => literal.push('"'),
                    Some('\\') => literal.push('\\'),
                    Some(other) => literal.push(other),
                    None => return Err(self.error("unterminated f-string literal", offset)),
                },
                Some('{') if self.peek_char() == Some('{') => {
                    self.bump();
                    literal.push('{');
                }
                Some('}') if self.peek_char() == Some('}') => {
                    self.bump();
                    literal.push('}');
                }
                Some('{') => {
                    if !literal.is_empty() {
                        chunks.push(FStringChunk::Literal(std::mem::take(&mut literal)));
                    }
                    let expr_start = self.pos;
                    let mut depth = 1i32;
                    loop {
                        match self.peek_char() {
                            None => return Err(self.error("unterminated f-string expression", offset)),
                            Some('{') => {
                                depth += 1;
                                self.bump();
                            }
                            Some('}') => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                                self.bump();
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                    let expr_src = self.src[expr_start..self.pos].to_string();
                    self.bump(); // closing '}'
                    chunks.push(FStringChunk::Expr(expr_src));
                }
                Some(c) => literal.push(c),
            }
        }
        if !literal.is_empty() || chunks.is_empty() {
            chunks.push(FStringChunk::Literal(literal));
        }
        Ok(Token::new(TokenKind::FString(chunks), offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        assert_eq!(
            kinds("set func class"),
            vec![TokenKind::Set, TokenKind::Func, TokenKind::Class, TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_integers_and_floats() {
        assert_eq!(kinds("42 3.14"), vec![TokenKind::Int(42), TokenKind::Float(3.14), TokenKind::Eof]);
    }

    #[test]
    fn lexes_string_escapes() {
        let ks = kinds(r#""a\nb""#);
        assert_eq!(ks, vec![TokenKind::Str("a\nb".to_string()), TokenKind::Eof]);
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(kinds("1 -- comment\n2"), vec![
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Int(2),
            TokenKind::Eof
        ]);
    }

    #[test]
    fn lexes_fstring_fragments() {
        let ks = kinds(r#"f"a{1+1}b""#);
        match &ks[0] {
            TokenKind::FString(chunks) => {
                assert_eq!(
                    *chunks,
                    vec![
                        FStringChunk::Literal("a".to_string()),
                        FStringChunk::Expr("1+1".to_string()),
                        FStringChunk::Literal("b".to_string()),
                    ]
                );
            }
            other => panic!("expected fstring token, got {other:?}"),
        }
    }

    #[test]
    fn fstring_escaped_braces_are_literal() {
        let ks = kinds(r#"f"{{hi}}""#);
        match &ks[0] {
            TokenKind::FString(chunks) => {
                assert_eq!(*chunks, vec![FStringChunk::Literal("{hi}".to_string())]);
            }
            other => panic!("expected fstring token, got {other:?}"),
        }
    }

    #[test]
    fn lexes_operators_and_aliases() {
        assert_eq!(
            kinds("-> => == != <= >= && ||"),
            vec![
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reports_position_on_unterminated_string() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert_eq!(err.pos.line, 1);
    }
}
