//! Token stream -> AST. Recursive-descent with Pratt-style precedence
//! climbing for expressions (spec 4.2); statement separators are newlines,
//! `;`, or a closing `}`, so blocks tolerate both multi-line and
//! semicolon-joined single-line forms.

use crate::ast::{
    AssignTarget, BinaryOp, Block, Expr, FStringSegment, LogicalOp, MethodDecl, Param, Program, Stmt,
    UnaryOp,
};
use crate::diagnostics::{ParseError, SourcePos};
use crate::token::{FStringChunk, Token, TokenKind};

type PResult<T> = Result<T, ParseError>;

pub struct Parser<'src> {
    tokens: Vec<Token>,
    source: &'src str,
    pos: usize,
}

impl<'src> Parser<'src> {
    #[must_use]
    pub fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut stmts = Vec::new();
        self.skip_terminators();
        while !matches!(self.peek(), TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
            self.skip_terminators();
        }
        Ok(stmts)
    }

    /// Parses a single expression and requires nothing but terminators/EOF
    /// after it; used to re-parse an f-string's embedded expression
    /// fragments (spec 4.1).
    pub(crate) fn parse_expr_complete(&mut self) -> PResult<Expr> {
        let e = self.parse_expr()?;
        self.skip_terminators();
        if !matches!(self.peek(), TokenKind::Eof) {
            return Err(self.error("unexpected trailing tokens in expression"));
        }
        Ok(e)
    }

    // ---- token plumbing ----

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens.get(self.pos + offset).map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {kind:?}, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.advance().kind {
            TokenKind::Ident(s) => Ok(s),
            other => Err(self.error(format!("expected an identifier, found {other:?}"))),
        }
    }

    fn skip_terminators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, SourcePos::from_offset(self.source, self.offset()))
    }

    // ---- statements ----

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek() {
            TokenKind::Set => self.parse_set(),
            TokenKind::Func => self.parse_func_decl(),
            TokenKind::Class => self.parse_class_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => {
                self.advance();
                Ok(Stmt::Throw(self.parse_expr()?))
            }
            TokenKind::Return => {
                self.advance();
                if self.stmt_ended() {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(self.parse_expr()?)))
                }
            }
            TokenKind::Break => {
                self.advance();
                Ok(Stmt::Break)
            }
            TokenKind::Continue => {
                self.advance();
                Ok(Stmt::Continue)
            }
            TokenKind::Use => {
                self.advance();
                match self.advance().kind {
                    TokenKind::Str(name) => Ok(Stmt::Use(name)),
                    other => Err(self.error(format!("expected a module name string, found {other:?}"))),
                }
            }
            TokenKind::Show => {
                self.advance();
                Ok(Stmt::Show(self.parse_expr()?))
            }
            TokenKind::Ask => {
                self.advance();
                let prompt = self.parse_expr()?;
                self.expect(&TokenKind::Arrow)?;
                let target = self.expect_ident()?;
                Ok(Stmt::Ask { prompt, target })
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn stmt_ended(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    fn parse_block(&mut self) -> PResult<Block> {
        self.expect(&TokenKind::LBrace)?;
        self.skip_terminators();
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
            self.skip_terminators();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_set(&mut self) -> PResult<Stmt> {
        self.advance(); // `set`
        let target = self.parse_assign_target()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Set { target, value })
    }

    fn parse_assign_target(&mut self) -> PResult<AssignTarget> {
        match self.peek() {
            TokenKind::LBracket => {
                self.advance();
                let names = self.parse_ident_list(&TokenKind::RBracket)?;
                self.expect(&TokenKind::RBracket)?;
                Ok(AssignTarget::ListPattern(names))
            }
            TokenKind::LBrace => {
                self.advance();
                let names = self.parse_ident_list(&TokenKind::RBrace)?;
                self.expect(&TokenKind::RBrace)?;
                Ok(AssignTarget::DictPattern(names))
            }
            _ => {
                let name = self.expect_ident()?;
                let mut expr = Expr::Ident(name);
                loop {
                    match self.peek() {
                        TokenKind::Dot => {
                            self.advance();
                            let field = self.expect_ident()?;
                            expr = Expr::Member { target: Box::new(expr), name: field };
                        }
                        TokenKind::LBracket => {
                            self.advance();
                            let index = self.parse_expr()?;
                            self.expect(&TokenKind::RBracket)?;
                            expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
                        }
                        _ => break,
                    }
                }
                expr_to_target(expr).map_err(|e| self.error(e))
            }
        }
    }

    fn parse_ident_list(&mut self, terminator: &TokenKind) -> PResult<Vec<String>> {
        let mut names = Vec::new();
        if self.at(terminator) {
            return Ok(names);
        }
        loop {
            names.push(self.expect_ident()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(names)
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        if self.at(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let name = self.expect_ident()?;
            let default = if self.eat(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
            params.push(Param { name, default });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_func_decl(&mut self) -> PResult<Stmt> {
        self.advance(); // `func`
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::FuncDecl { name, params, body })
    }

    fn parse_class_decl(&mut self) -> PResult<Stmt> {
        self.advance(); // `class`
        let name = self.expect_ident()?;
        let parent = if self.eat(&TokenKind::Extends) { Some(self.expect_ident()?) } else { None };
        self.expect(&TokenKind::LBrace)?;
        self.skip_terminators();
        let mut methods = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            self.expect(&TokenKind::Func)?;
            let mname = self.expect_ident()?;
            self.expect(&TokenKind::LParen)?;
            let mparams = self.parse_params()?;
            self.expect(&TokenKind::RParen)?;
            let mbody = self.parse_block()?;
            methods.push(MethodDecl { name: mname, params: mparams, body: mbody });
            self.skip_terminators();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::ClassDecl { name, parent, methods })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.advance(); // `if`
        let mut branches = Vec::new();
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        branches.push((cond, body));
        let mut else_branch = None;
        loop {
            if !self.eat(&TokenKind::Else) {
                break;
            }
            if self.eat(&TokenKind::If) {
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                branches.push((cond, body));
            } else {
                else_branch = Some(self.parse_block()?);
                break;
            }
        }
        Ok(Stmt::If { branches, else_branch })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        self.advance(); // `while`
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        self.advance(); // `for`
        let first = self.expect_ident()?;
        if self.eat(&TokenKind::Comma) {
            let second = self.expect_ident()?;
            self.expect(&TokenKind::In)?;
            let iter = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(Stmt::ForPair { first, second, iter, body });
        }
        self.expect(&TokenKind::In)?;
        let start = self.parse_expr()?;
        if self.eat(&TokenKind::To) {
            let to = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(Stmt::ForRange { var: first, from: start, to, body });
        }
        let body = self.parse_block()?;
        Ok(Stmt::ForIn { var: first, iter: start, body })
    }

    fn parse_match(&mut self) -> PResult<Stmt> {
        self.advance(); // `match`
        let subject = self.parse_expr()?;
        self.expect(&TokenKind::LBrace)?;
        self.skip_terminators();
        let mut cases = Vec::new();
        let mut default = None;
        while !self.at(&TokenKind::RBrace) {
            if self.eat(&TokenKind::Case) {
                let pattern = self.parse_expr()?;
                let body = self.parse_block()?;
                cases.push((pattern, body));
            } else if self.eat(&TokenKind::Default) {
                default = Some(self.parse_block()?);
            } else {
                return Err(self.error(format!("expected 'case' or 'default', found {:?}", self.peek())));
            }
            self.skip_terminators();
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Stmt::Match { subject, cases, default })
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        self.advance(); // `try`
        let body = self.parse_block()?;
        self.expect(&TokenKind::Catch)?;
        let catch_var = self.expect_ident()?;
        let catch_body = self.parse_block()?;
        let finally_body = if self.eat(&TokenKind::Finally) { Some(self.parse_block()?) } else { None };
        Ok(Stmt::Try { body, catch_var, catch_body, finally_body })
    }

    // ---- expressions ----

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = Expr::Logical { op: LogicalOp::Or, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_equality()?;
            left = Expr::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::BangEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.peek() {
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary { op: UnaryOp::Neg, expr: Box::new(self.parse_unary()?) })
            }
            TokenKind::Not => {
                self.advance();
                Ok(Expr::Unary { op: UnaryOp::Not, expr: Box::new(self.parse_unary()?) })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    expr = Expr::Member { target: Box::new(expr), name };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(&TokenKind::RParen)?;
                    expr = Expr::Call { callee: Box::new(expr), args };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.at(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        match self.peek().clone() {
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null)
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Float(f))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::FString(chunks) => {
                self.advance();
                self.build_fstring(chunks)
            }
            TokenKind::This => {
                self.advance();
                Ok(Expr::This)
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            TokenKind::New => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(&TokenKind::LParen)?;
                let args = self.parse_args()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::New { class: Box::new(Expr::Ident(name)), args })
            }
            TokenKind::Super => {
                self.advance();
                self.expect(&TokenKind::Dot)?;
                let method = self.expect_ident()?;
                self.expect(&TokenKind::LParen)?;
                let args = self.parse_args()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::SuperCall { method, args })
            }
            TokenKind::Isinstance => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Comma)?;
                let class = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Isinstance { value: Box::new(value), class: Box::new(class) })
            }
            TokenKind::LBracket => self.parse_list_lit(),
            TokenKind::LBrace => self.parse_dict_lit(),
            TokenKind::LParen => self.parse_paren_or_lambda(),
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }

    fn build_fstring(&mut self, chunks: Vec<FStringChunk>) -> PResult<Expr> {
        let mut segments = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            match chunk {
                FStringChunk::Literal(s) => segments.push(FStringSegment::Literal(s)),
                FStringChunk::Expr(src) => {
                    let tokens = crate::lexer::Lexer::new(&src).tokenize()?;
                    let expr = Parser::new(tokens, &src).parse_expr_complete()?;
                    segments.push(FStringSegment::Expr(expr));
                }
            }
        }
        Ok(Expr::FString(segments))
    }

    fn parse_list_lit(&mut self) -> PResult<Expr> {
        self.advance(); // `[`
        self.skip_terminators();
        let mut items = Vec::new();
        if !self.at(&TokenKind::RBracket) {
            loop {
                items.push(self.parse_expr()?);
                self.skip_terminators();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                self.skip_terminators();
            }
        }
        self.skip_terminators();
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr::ListLit(items))
    }

    fn parse_dict_lit(&mut self) -> PResult<Expr> {
        self.advance(); // `{`
        self.skip_terminators();
        let mut pairs = Vec::new();
        if !self.at(&TokenKind::RBrace) {
            loop {
                let key = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let value = self.parse_expr()?;
                pairs.push((key, value));
                self.skip_terminators();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                self.skip_terminators();
            }
        }
        self.skip_terminators();
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::DictLit(pairs))
    }

    /// `(` starts either a parenthesized expression or a lambda
    /// `(params) => expr`; distinguished by scanning ahead for a matching
    /// `)` immediately followed by `=>` before committing to either parse.
    fn parse_paren_or_lambda(&mut self) -> PResult<Expr> {
        if self.looks_like_lambda() {
            self.advance(); // `(`
            let params = self.parse_params()?;
            self.expect(&TokenKind::RParen)?;
            self.expect(&TokenKind::FatArrow)?;
            let body = self.parse_expr()?;
            return Ok(Expr::Lambda { params, body: Box::new(body) });
        }
        self.advance(); // `(`
        let inner = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(inner)
    }

    fn looks_like_lambda(&self) -> bool {
        let mut depth: i32 = 0;
        let mut i = 0;
        loop {
            match self.peek_at(i) {
                TokenKind::Eof => return false,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.peek_at(i + 1), TokenKind::FatArrow);
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

fn expr_to_target(expr: Expr) -> Result<AssignTarget, String> {
    match expr {
        Expr::Ident(name) => Ok(AssignTarget::Ident(name)),
        Expr::Member { target, name } => Ok(AssignTarget::Member(target, name)),
        Expr::Index { target, index } => Ok(AssignTarget::Index(target, index)),
        _ => Err("invalid assignment target".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens, src).parse_program().unwrap()
    }

    #[test]
    fn parses_set_and_show() {
        let program = parse("set x = 1 + 2\nshow x");
        assert_eq!(program.len(), 2);
        assert!(matches!(program[0], Stmt::Set { .. }));
        assert!(matches!(program[1], Stmt::Show(_)));
    }

    #[test]
    fn parses_semicolon_separated_block() {
        let program = parse("func f(){ set c=0; set c=c+1; return c }");
        assert_eq!(program.len(), 1);
        let Stmt::FuncDecl { body, .. } = &program[0] else { panic!("expected func decl") };
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn parses_lambda_vs_parenthesized_expr() {
        let program = parse("set f = (x) => x * x\nset y = (1 + 2) * 3");
        let Stmt::Set { value, .. } = &program[0] else { panic!() };
        assert!(matches!(value, Expr::Lambda { .. }));
        let Stmt::Set { value, .. } = &program[1] else { panic!() };
        assert!(matches!(value, Expr::Binary { .. }));
    }

    #[test]
    fn parses_class_with_extends_and_super() {
        let program = parse(
            "class A { func init(n){ set this.n=n } }\n\
             class B extends A { func init(n){ super.init(n+1) } }",
        );
        assert_eq!(program.len(), 2);
        let Stmt::ClassDecl { parent, .. } = &program[1] else { panic!() };
        assert_eq!(parent.as_deref(), Some("A"));
    }

    #[test]
    fn parses_for_to_and_for_pair() {
        let program = parse("for i in 1 to 5 { show i }\nfor k, v in d { show k }");
        assert!(matches!(program[0], Stmt::ForRange { .. }));
        assert!(matches!(program[1], Stmt::ForPair { .. }));
    }

    #[test]
    fn parses_fstring_with_nested_call() {
        let program = parse(r#"show f"{[1,2,3].map((x)=>x*x).reduce((a,b)=>a+b,0)}""#);
        let Stmt::Show(Expr::FString(segments)) = &program[0] else { panic!("expected f-string show") };
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], FStringSegment::Expr(_)));
    }

    #[test]
    fn parses_dict_literal_and_pattern() {
        let program = parse("set d = {a: 1, b: 2}\nset [x, y] = pair");
        assert!(matches!(&program[0], Stmt::Set { value: Expr::DictLit(pairs), .. } if pairs.len() == 2));
        assert!(matches!(&program[1], Stmt::Set { target: AssignTarget::ListPattern(_), .. }));
    }
}
