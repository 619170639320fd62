use num_traits::ToPrimitive;

use crate::error::{ExprError, Scope, Tier};
use crate::isa::p2;
use crate::lexer::{Punct, Tok, Token};

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRef {
    pub name: String,
    pub local: bool,
}

impl SymbolRef {
    pub fn scope(&self) -> Scope {
        if self.local {
            Scope::Local
        } else {
            Scope::Global
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Neg,
    Not,
    Complement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Sar,
    Ror,
    Rol,
    Rev,
    And,
    Or,
    Xor,
}

impl BinOp {
    pub fn tier(self) -> Tier {
        match self {
            BinOp::Mul | BinOp::Div | BinOp::Mod => Tier::Mulops,
            BinOp::Add | BinOp::Sub => Tier::Addops,
            BinOp::Shl | BinOp::Shr | BinOp::Sar | BinOp::Ror | BinOp::Rol | BinOp::Rev => Tier::Shiftops,
            BinOp::And | BinOp::Or | BinOp::Xor => Tier::Binops,
        }
    }

    fn from_punct(p: Punct) -> Option<Self> {
        Some(match p {
            Punct::Star => BinOp::Mul,
            Punct::Slash => BinOp::Div,
            Punct::SlashSlash => BinOp::Mod,
            Punct::Plus => BinOp::Add,
            Punct::Minus => BinOp::Sub,
            Punct::Shl => BinOp::Shl,
            Punct::Shr => BinOp::Shr,
            Punct::Sar => BinOp::Sar,
            Punct::Ror => BinOp::Ror,
            Punct::Rol => BinOp::Rol,
            Punct::Rev => BinOp::Rev,
            Punct::Amp => BinOp::And,
            Punct::Pipe => BinOp::Or,
            Punct::Caret => BinOp::Xor,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Float,
    Round,
    Trunc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(u32),
    Real(f64),
    Str(Vec<u8>),
    Symbol(SymbolRef),
    HubAddr(SymbolRef),
    Here,
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    pub fn symbols(&self) -> Vec<&SymbolRef> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a SymbolRef>) {
        match self {
            Expr::Symbol(s) | Expr::HubAddr(s) => out.push(s),
            Expr::Unary(_, e) | Expr::Call(_, e) => e.collect(out),
            Expr::Binary(_, l, r) => {
                l.collect(out);
                r.collect(out);
            }
            Expr::Int(_) | Expr::Real(_) | Expr::Str(_) | Expr::Here => {}
        }
    }
}

fn next_tier(t: Tier) -> Option<Tier> {
    match t {
        Tier::Binops => Some(Tier::Shiftops),
        Tier::Shiftops => Some(Tier::Addops),
        Tier::Addops => Some(Tier::Mulops),
        Tier::Mulops => None,
    }
}

/// Parses one expression from a token slice, leaving the cursor on the
/// first token that cannot continue it.
pub struct ExprParser<'t> {
    toks: &'t [Token],
    pos: usize,
}

impl<'t> ExprParser<'t> {
    pub fn new(toks: &'t [Token]) -> Self {
        Self { toks, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn parse(&mut self) -> Result<Expr, ExprError> {
        self.tier(Tier::Binops, Tier::Binops)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.toks.get(self.pos)
    }

    fn operand(&mut self, t: Tier, ctx: Tier) -> Result<Expr, ExprError> {
        match next_tier(t) {
            Some(inner) => self.tier(inner, ctx),
            None => self.unary(ctx),
        }
    }

    fn tier(&mut self, t: Tier, ctx: Tier) -> Result<Expr, ExprError> {
        let mut lhs = self.operand(t, ctx)?;
        loop {
            let Some(Tok::Punct(p)) = self.peek().map(|t| &t.tok) else { break };
            // `a--b` and `a++b` lex as one token
            let (op, negate) = match (*p, t) {
                (Punct::Dec, Tier::Addops) => (BinOp::Sub, true),
                (Punct::Inc, Tier::Addops) => (BinOp::Add, false),
                (p, _) => match BinOp::from_punct(p) {
                    Some(op) if op.tier() == t => (op, false),
                    _ => break,
                },
            };
            self.pos += 1;
            let mut rhs = self.operand(t, t)?;
            if negate {
                rhs = Expr::Unary(UnOp::Neg, Box::new(rhs));
            }
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self, ctx: Tier) -> Result<Expr, ExprError> {
        let Some(tok) = self.peek() else {
            return Err(ExprError::UnexpectedEndOfLine { tier: ctx });
        };
        let op = match tok.tok {
            Tok::Punct(Punct::Plus) | Tok::Punct(Punct::Inc) => Some(UnOp::Plus),
            Tok::Punct(Punct::Minus) => Some(UnOp::Neg),
            Tok::Punct(Punct::Bang) => Some(UnOp::Not),
            Tok::Punct(Punct::Tilde) => Some(UnOp::Complement),
            Tok::Punct(Punct::Dec) => {
                self.pos += 1;
                let inner = self.unary(ctx)?;
                return Ok(Expr::Unary(UnOp::Neg, Box::new(Expr::Unary(UnOp::Neg, Box::new(inner)))));
            }
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let inner = self.unary(ctx)?;
            return Ok(Expr::Unary(op, Box::new(inner)));
        }
        self.atom(ctx)
    }

    fn atom(&mut self, ctx: Tier) -> Result<Expr, ExprError> {
        let Some(tok) = self.peek() else {
            return Err(ExprError::UnexpectedEndOfLine { tier: ctx });
        };
        self.pos += 1;
        match &tok.tok {
            Tok::Int(v) => Ok(Expr::Int(*v)),
            Tok::Real(r) => Ok(Expr::Real(*r)),
            Tok::Str(s) => Ok(Expr::Str(s.clone())),
            Tok::Local(name) => Ok(Expr::Symbol(SymbolRef { name: name.clone(), local: true })),
            Tok::Ident(name) => {
                if let Some(func) = function(name) {
                    if self.peek().is_some_and(|t| t.is(Punct::LParen)) {
                        self.pos += 1;
                        let arg = self.parse()?;
                        self.expect_close()?;
                        return Ok(Expr::Call(func, Box::new(arg)));
                    }
                }
                if let Some(addr) = p2::register_address(name) {
                    return Ok(Expr::Int(addr));
                }
                Ok(Expr::Symbol(SymbolRef { name: name.clone(), local: false }))
            }
            Tok::Punct(Punct::Dollar) => Ok(Expr::Here),
            Tok::Punct(Punct::At) => match self.peek().map(|t| &t.tok) {
                Some(Tok::Ident(name)) => {
                    self.pos += 1;
                    Ok(Expr::HubAddr(SymbolRef { name: name.clone(), local: false }))
                }
                Some(Tok::Local(name)) => {
                    self.pos += 1;
                    Ok(Expr::HubAddr(SymbolRef { name: name.clone(), local: true }))
                }
                Some(_) => Err(ExprError::Expected { expected: "symbol after @", found: self.found() }),
                None => Err(ExprError::UnexpectedEndOfLine { tier: ctx }),
            },
            Tok::Punct(Punct::LParen) => {
                let inner = self.parse()?;
                self.expect_close()?;
                Ok(inner)
            }
            Tok::Punct(Punct::Comma | Punct::RParen | Punct::RBracket) => {
                self.pos -= 1;
                Err(ExprError::Expected { expected: "expression", found: tok.text() })
            }
            Tok::Punct(p) => {
                let ch = p.text().chars().next().unwrap_or('?');
                Err(ExprError::InvalidCharacter { tier: ctx, ch })
            }
            Tok::Invalid(ch) => Err(ExprError::InvalidCharacter { tier: ctx, ch: *ch }),
        }
    }

    fn expect_close(&mut self) -> Result<(), ExprError> {
        match self.peek() {
            Some(t) if t.is(Punct::RParen) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(ExprError::Expected { expected: ")", found: self.found() }),
        }
    }

    fn found(&self) -> String {
        self.peek().map_or_else(|| "end of line".to_string(), Token::text)
    }
}

fn function(name: &str) -> Option<Func> {
    match name.to_ascii_uppercase().as_str() {
        "FLOAT" => Some(Func::Float),
        "ROUND" => Some(Func::Round),
        "TRUNC" => Some(Func::Trunc),
        _ => None,
    }
}

/// Parses a complete token slice; anything left over is an error.
pub fn parse_all(toks: &[Token]) -> Result<Expr, ExprError> {
    let mut p = ExprParser::new(toks);
    let e = p.parse()?;
    match toks.get(p.pos()) {
        None => Ok(e),
        Some(t) => match t.tok {
            Tok::Invalid(ch) => Err(ExprError::InvalidCharacter { tier: Tier::Binops, ch }),
            _ => Err(ExprError::Expected { expected: "operator", found: t.text() }),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(u32),
    Real(f64),
}

impl Value {
    pub fn to_u32(self) -> u32 {
        match self {
            Value::Int(v) => v,
            Value::Real(r) => (r as f32).to_bits(),
        }
    }

    fn real(self) -> f64 {
        match self {
            Value::Int(v) => v as i32 as f64,
            Value::Real(r) => r,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub value: u32,
    pub hub: u32,
}

/// Symbol lookup seam between the evaluator and whoever owns the symbols.
pub trait Resolver {
    fn resolve(&self, sym: &SymbolRef) -> Result<Resolved, ExprError>;
    fn here(&self) -> u32;
}

pub struct NoSymbols;

impl Resolver for NoSymbols {
    fn resolve(&self, sym: &SymbolRef) -> Result<Resolved, ExprError> {
        Err(ExprError::UndefinedSymbol { scope: sym.scope(), name: sym.name.clone() })
    }

    fn here(&self) -> u32 {
        0
    }
}

pub fn pack_str(bytes: &[u8]) -> u32 {
    bytes.iter().take(4).enumerate().fold(0, |acc, (i, &b)| acc | (b as u32) << (8 * i))
}

pub fn eval(expr: &Expr, ctx: &impl Resolver) -> Result<Value, ExprError> {
    Ok(match expr {
        Expr::Int(v) => Value::Int(*v),
        Expr::Real(r) => Value::Real(*r),
        Expr::Str(s) => Value::Int(pack_str(s)),
        Expr::Here => Value::Int(ctx.here()),
        Expr::Symbol(s) => Value::Int(ctx.resolve(s)?.value),
        Expr::HubAddr(s) => Value::Int(ctx.resolve(s)?.hub),
        Expr::Unary(op, e) => unary(*op, eval(e, ctx)?),
        Expr::Binary(op, l, r) => binary(*op, eval(l, ctx)?, eval(r, ctx)?)?,
        Expr::Call(f, e) => call(*f, eval(e, ctx)?),
    })
}

fn unary(op: UnOp, v: Value) -> Value {
    match (op, v) {
        (UnOp::Plus, v) => v,
        (UnOp::Neg, Value::Real(r)) => Value::Real(-r),
        (UnOp::Neg, v) => Value::Int(v.to_u32().wrapping_neg()),
        (UnOp::Not, v) => Value::Int((v.to_u32() == 0) as u32),
        (UnOp::Complement, v) => Value::Int(!v.to_u32()),
    }
}

fn binary(op: BinOp, a: Value, b: Value) -> Result<Value, ExprError> {
    let arith = matches!(op, BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Add | BinOp::Sub);
    if arith && (matches!(a, Value::Real(_)) || matches!(b, Value::Real(_))) {
        let (x, y) = (a.real(), b.real());
        return Ok(Value::Real(match op {
            BinOp::Mul => x * y,
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Div | BinOp::Mod if y == 0.0 => return Err(ExprError::DivisionByZero),
            BinOp::Div => x / y,
            _ => x % y,
        }));
    }
    let (x, y) = (a.to_u32(), b.to_u32());
    Ok(Value::Int(match op {
        BinOp::Mul => x.wrapping_mul(y),
        BinOp::Div | BinOp::Mod if y == 0 => return Err(ExprError::DivisionByZero),
        BinOp::Div => (x as i32).wrapping_div(y as i32) as u32,
        BinOp::Mod => (x as i32).wrapping_rem(y as i32) as u32,
        BinOp::Add => x.wrapping_add(y),
        BinOp::Sub => x.wrapping_sub(y),
        BinOp::Shl => x.wrapping_shl(y),
        BinOp::Shr => x.wrapping_shr(y),
        BinOp::Sar => (x as i32).wrapping_shr(y) as u32,
        BinOp::Ror => x.rotate_right(y & 31),
        BinOp::Rol => x.rotate_left(y & 31),
        BinOp::Rev => match y.min(32) {
            0 => 0,
            n => x.reverse_bits() >> (32 - n),
        },
        BinOp::And => x & y,
        BinOp::Or => x | y,
        BinOp::Xor => x ^ y,
    }))
}

fn call(f: Func, v: Value) -> Value {
    match (f, v) {
        (Func::Float, Value::Int(i)) => Value::Real(i as i32 as f64),
        (Func::Round, Value::Real(r)) => Value::Int(r.round().to_i64().map_or(0, |i| i as u32)),
        (Func::Trunc, Value::Real(r)) => Value::Int(r.trunc().to_i64().map_or(0, |i| i as u32)),
        (_, v) => v,
    }
}

pub fn evaluate_str(text: &str) -> Result<u32, ExprError> {
    let (toks, _) = crate::lexer::Lexer::new().line(text);
    let e = parse_all(&toks)?;
    Ok(eval(&e, &NoSymbols)?.to_u32())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mulops_bind_tighter_than_addops() {
        assert_eq!(evaluate_str("2 + 3 * 4").unwrap(), 14);
        assert_eq!(evaluate_str("(2 + 3) * 4").unwrap(), 20);
    }

    #[test]
    fn shift_and_bitwise_order() {
        assert_eq!(evaluate_str("1 << 2 + 1").unwrap(), 8);
        assert_eq!(evaluate_str("1 | 2 << 1").unwrap(), 5);
        assert_eq!(evaluate_str("8 | 6 & 3").unwrap(), 2);
    }

    #[test]
    fn unary_binds_tightest() {
        assert_eq!(evaluate_str("-2 * 3").unwrap(), (-6i32) as u32);
        assert_eq!(evaluate_str("~0 >> 28").unwrap(), 15);
        assert_eq!(evaluate_str("!5").unwrap(), 0);
        assert_eq!(evaluate_str("!0").unwrap(), 1);
    }

    #[test]
    fn reals_become_single_precision_bits() {
        assert_eq!(evaluate_str("1.5").unwrap(), 1.5f32.to_bits());
        assert_eq!(evaluate_str("ROUND(2.5 * 3.0)").unwrap(), 8);
        assert_eq!(evaluate_str("TRUNC(-2.7)").unwrap(), (-2i32) as u32);
        assert_eq!(evaluate_str("FLOAT(3)").unwrap(), 3.0f32.to_bits());
    }

    #[test]
    fn packed_strings_fill_low_byte_first() {
        assert_eq!(evaluate_str("\"AB\"").unwrap(), 0x4241);
    }

    #[test]
    fn registers_are_cog_addresses() {
        assert_eq!(evaluate_str("PTRA + 1").unwrap(), 0x1f9);
    }
}
