//! Expression scanner and precedence-climbing parser.
//!
//! Operands that look like script syntax (`$var`, `[cmd]`, `{text}`,
//! `"text"`) are scanned with the script parser so they behave exactly as
//! they do in a command word.

use tern_parse::{Parser as ScriptParser, WordKind};
use tern_value::{parse_number, Obj};

use crate::errors::ScriptError;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::functions::MathFn;

#[derive(Debug)]
enum Token {
    Operand(Expr),
    /// An identifier not used as an operator.
    Bareword(String),
    Binary(BinaryOp),
    /// `-` and `+` may be unary or binary, decided by position.
    Minus,
    Plus,
    Not,
    Tilde,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
}

fn syntax_error(text: &str, detail: impl std::fmt::Display) -> ScriptError {
    ScriptError::new(format!("syntax error in expression \"{text}\": {detail}"))
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek_byte(&self, at: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + at).copied()
    }

    fn skip_space(&mut self) {
        while self.peek_byte(0).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn tokens(mut self) -> Result<Vec<Token>, ScriptError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_space();
            let Some(b) = self.peek_byte(0) else {
                return Ok(tokens);
            };
            tokens.push(self.token(b)?);
        }
    }

    fn op(&mut self, len: usize, token: Token) -> Token {
        self.pos += len;
        token
    }

    fn token(&mut self, b: u8) -> Result<Token, ScriptError> {
        let next = self.peek_byte(1);
        Ok(match b {
            b'0'..=b'9' => self.number()?,
            b'.' if next.is_some_and(|n| n.is_ascii_digit()) => self.number()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.bareword(),
            b'$' => self.script_operand(|p| p.var().map(|part| part.map(WordKind::Single)))?,
            b'[' => self.script_operand(|p| p.bracket().map(|part| Some(WordKind::Single(part))))?,
            b'"' => self.script_operand(|p| p.quoted().map(Some))?,
            b'{' => {
                let mut parser = ScriptParser::at(self.src, self.pos, 1);
                let text = parser
                    .braced()
                    .map_err(|err| syntax_error(self.src, err))?;
                self.pos = parser.pos();
                Token::Operand(Expr::Literal(text))
            }
            b'*' if next == Some(b'*') => self.op(2, Token::Binary(BinaryOp::Pow)),
            b'*' => self.op(1, Token::Binary(BinaryOp::Mul)),
            b'/' => self.op(1, Token::Binary(BinaryOp::Div)),
            b'%' => self.op(1, Token::Binary(BinaryOp::Mod)),
            b'+' => self.op(1, Token::Plus),
            b'-' => self.op(1, Token::Minus),
            b'<' if next == Some(b'<') => self.op(2, Token::Binary(BinaryOp::Shl)),
            b'<' if next == Some(b'=') => self.op(2, Token::Binary(BinaryOp::LtEq)),
            b'<' => self.op(1, Token::Binary(BinaryOp::Lt)),
            b'>' if next == Some(b'>') => self.op(2, Token::Binary(BinaryOp::Shr)),
            b'>' if next == Some(b'=') => self.op(2, Token::Binary(BinaryOp::GtEq)),
            b'>' => self.op(1, Token::Binary(BinaryOp::Gt)),
            b'=' if next == Some(b'=') => self.op(2, Token::Binary(BinaryOp::Eq)),
            b'!' if next == Some(b'=') => self.op(2, Token::Binary(BinaryOp::NotEq)),
            b'!' => self.op(1, Token::Not),
            b'~' => self.op(1, Token::Tilde),
            b'&' if next == Some(b'&') => self.op(2, Token::Binary(BinaryOp::And)),
            b'&' => self.op(1, Token::Binary(BinaryOp::BitAnd)),
            b'|' if next == Some(b'|') => self.op(2, Token::Binary(BinaryOp::Or)),
            b'|' => self.op(1, Token::Binary(BinaryOp::BitOr)),
            b'^' => self.op(1, Token::Binary(BinaryOp::BitXor)),
            b'?' => self.op(1, Token::Question),
            b':' => self.op(1, Token::Colon),
            b'(' => self.op(1, Token::LParen),
            b')' => self.op(1, Token::RParen),
            b',' => self.op(1, Token::Comma),
            _ => {
                let ch = self.src[self.pos..].chars().next().unwrap_or('?');
                return Err(syntax_error(
                    self.src,
                    format!("character not legal in expressions \"{ch}\""),
                ));
            }
        })
    }

    fn number(&mut self) -> Result<Token, ScriptError> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start;
        let radix_prefixed = bytes[start] == b'0'
            && matches!(
                bytes.get(start + 1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            );
        if radix_prefixed {
            end += 2;
            while bytes.get(end).is_some_and(u8::is_ascii_alphanumeric) {
                end += 1;
            }
        } else {
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
            if bytes.get(end) == Some(&b'.') {
                end += 1;
                while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                }
            }
            if matches!(bytes.get(end), Some(b'e' | b'E')) {
                let mut exp = end + 1;
                if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                    exp += 1;
                }
                if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                    end = exp;
                    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                        end += 1;
                    }
                }
            }
        }
        let text = &self.src[start..end];
        self.pos = end;
        let literal = Obj::new_string(text);
        literal
            .get_number()
            .map_err(|_| syntax_error(self.src, format!("bad number \"{text}\"")))?;
        Ok(Token::Operand(Expr::Literal(literal)))
    }

    fn bareword(&mut self) -> Token {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let mut end = start;
        while bytes
            .get(end)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            end += 1;
        }
        self.pos = end;
        let word = &self.src[start..end];
        match word {
            "eq" => Token::Binary(BinaryOp::StrEq),
            "ne" => Token::Binary(BinaryOp::StrNe),
            "in" => Token::Binary(BinaryOp::In),
            "ni" => Token::Binary(BinaryOp::Ni),
            _ => Token::Bareword(word.to_string()),
        }
    }

    /// Scan an operand with the script parser, starting at the current byte.
    fn script_operand(
        &mut self,
        scan: impl FnOnce(&mut ScriptParser<'a>) -> Result<Option<WordKind>, tern_parse::ParseError>,
    ) -> Result<Token, ScriptError> {
        let mut parser = ScriptParser::at(self.src, self.pos, 1);
        let word = scan(&mut parser).map_err(|err| syntax_error(self.src, err))?;
        self.pos = parser.pos();
        match word {
            Some(WordKind::Literal(text)) => Ok(Token::Operand(Expr::Literal(text))),
            Some(word) => Ok(Token::Operand(Expr::Word(word))),
            None => Err(syntax_error(self.src, "invalid character \"$\"")),
        }
    }
}

/// Words accepted as operands without quoting.
fn bareword_literal(word: &str) -> Option<Obj> {
    const BOOLEANS: [&str; 6] = ["true", "false", "yes", "no", "on", "off"];
    if BOOLEANS.iter().any(|b| word.eq_ignore_ascii_case(b)) {
        return Some(Obj::new_string(word));
    }
    // Inf and Infinity; NaN is refused by the number grammar.
    parse_number(word).ok().map(|_| Obj::new_string(word))
}

struct ExprParser<'a> {
    text: &'a str,
    tokens: std::iter::Peekable<std::vec::IntoIter<Token>>,
}

impl ExprParser<'_> {
    fn error(&self, detail: impl std::fmt::Display) -> ScriptError {
        syntax_error(self.text, detail)
    }

    fn expect(&mut self, want: &str, matches: impl Fn(&Token) -> bool) -> Result<(), ScriptError> {
        match self.tokens.next() {
            Some(token) if matches(&token) => Ok(()),
            Some(_) => Err(self.error(format!("expected \"{want}\""))),
            None => Err(self.error(format!("missing \"{want}\""))),
        }
    }

    fn ternary(&mut self) -> Result<Expr, ScriptError> {
        let cond = self.binary(0)?;
        if !matches!(self.tokens.peek(), Some(Token::Question)) {
            return Ok(cond);
        }
        self.tokens.next();
        let then = self.ternary()?;
        self.expect(":", |t| matches!(t, Token::Colon))?;
        let otherwise = self.ternary()?;
        Ok(Expr::Ternary(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn peek_binary(&mut self) -> Option<BinaryOp> {
        match self.tokens.peek()? {
            Token::Binary(op) => Some(*op),
            Token::Minus => Some(BinaryOp::Sub),
            Token::Plus => Some(BinaryOp::Add),
            _ => None,
        }
    }

    fn binary(&mut self, min_prec: u8) -> Result<Expr, ScriptError> {
        tern_stack::ensure_sufficient_stack(|| {
            let mut lhs = self.unary()?;
            while let Some(op) = self.peek_binary() {
                let prec = op.precedence();
                if prec < min_prec {
                    break;
                }
                self.tokens.next();
                let next = if op.is_right_assoc() { prec } else { prec + 1 };
                let rhs = self.binary(next)?;
                lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
            }
            Ok(lhs)
        })
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        let op = match self.tokens.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Tilde) => UnaryOp::BitNot,
            _ => return self.primary(),
        };
        self.tokens.next();
        let operand = tern_stack::ensure_sufficient_stack(|| self.unary())?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        match self.tokens.next() {
            Some(Token::Operand(expr)) => Ok(expr),
            Some(Token::LParen) => {
                let inner = self.ternary()?;
                self.expect(")", |t| matches!(t, Token::RParen))?;
                Ok(inner)
            }
            Some(Token::Bareword(word)) => {
                if matches!(self.tokens.peek(), Some(Token::LParen)) {
                    self.tokens.next();
                    return self.call(&word);
                }
                bareword_literal(&word)
                    .map(Expr::Literal)
                    .ok_or_else(|| self.error(format!("invalid bareword \"{word}\"")))
            }
            Some(_) => Err(self.error("unexpected operator")),
            None => Err(self.error("premature end of expression")),
        }
    }

    /// After `name(`: the arguments and the closing parenthesis.
    fn call(&mut self, name: &str) -> Result<Expr, ScriptError> {
        let Some(func) = MathFn::lookup(name) else {
            return Err(ScriptError::new(format!("unknown math function \"{name}\"")));
        };
        let mut args = Vec::new();
        if matches!(self.tokens.peek(), Some(Token::RParen)) {
            self.tokens.next();
        } else {
            loop {
                args.push(self.ternary()?);
                match self.tokens.next() {
                    Some(Token::Comma) => {}
                    Some(Token::RParen) => break,
                    _ => return Err(self.error("missing close parenthesis")),
                }
            }
        }
        func.check_arity(args.len())?;
        Ok(Expr::Call(func, args))
    }
}

/// Parse an expression.
pub fn parse_expr(text: &str) -> Result<Expr, ScriptError> {
    let tokens = Lexer { src: text, pos: 0 }.tokens()?;
    if tokens.is_empty() {
        return Err(ScriptError::new("empty expression"));
    }
    let mut parser = ExprParser {
        text,
        tokens: tokens.into_iter().peekable(),
    };
    let expr = parser.ternary()?;
    match parser.tokens.next() {
        None => Ok(expr),
        Some(Token::RParen) => Err(parser.error("unbalanced close paren")),
        Some(_) => Err(parser.error("missing operator")),
    }
}
