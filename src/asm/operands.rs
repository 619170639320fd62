use crate::encoding::PtrMode;
use crate::error::{EncodingError, ExprError, LineError, SyntaxError};
use crate::expr::{Expr, ExprParser};
use crate::isa::p2::{FlagRule, Flags};
use crate::lexer::{Punct, Tok, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imm {
    None,
    Hash,
    Aug,
}

/// One comma separated operand with its prefixes stripped.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'t> {
    pub imm: Imm,
    /// `\` after the immediate marker: never relative.
    pub absolute: bool,
    pub toks: &'t [Token],
}

impl<'t> Operand<'t> {
    pub fn parse(group: &'t [Token]) -> Self {
        let (imm, mut rest) = match group.first().map(|t| &t.tok) {
            Some(Tok::Punct(Punct::Hash)) => (Imm::Hash, &group[1..]),
            Some(Tok::Punct(Punct::HashHash)) => (Imm::Aug, &group[1..]),
            _ => (Imm::None, group),
        };
        let absolute = rest.first().is_some_and(|t| t.is(Punct::Backslash));
        if absolute {
            rest = &rest[1..];
        }
        Self { imm, absolute, toks: rest }
    }

    pub fn immediate(&self) -> bool {
        self.imm != Imm::None
    }

    pub fn word(&self) -> Option<&'t str> {
        match (self.imm, self.toks) {
            (Imm::None, [t]) => t.ident(),
            _ => None,
        }
    }
}

pub fn split_commas(toks: &[Token]) -> Vec<&[Token]> {
    let mut out = Vec::new();
    if toks.is_empty() {
        return out;
    }
    let (mut depth, mut start) = (0i32, 0);
    for (i, t) in toks.iter().enumerate() {
        match t.tok {
            Tok::Punct(Punct::LParen | Punct::LBracket) => depth += 1,
            Tok::Punct(Punct::RParen | Punct::RBracket) => depth -= 1,
            Tok::Punct(Punct::Comma) if depth == 0 => {
                out.push(&toks[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&toks[start..]);
    out
}

/// Strips trailing flag suffixes. `WC WZ` combine into `WCZ`.
pub fn split_flags(toks: &[Token]) -> Result<(&[Token], Option<Flags>), EncodingError> {
    let mut end = toks.len();
    let mut flags = Flags::empty();
    let mut names = Vec::new();
    while end > 0 {
        let Some(f) = toks[end - 1].ident().and_then(Flags::parse_suffix) else { break };
        // a suffix never directly follows a comma
        if end >= 2 && toks[end - 2].is(Punct::Comma) {
            break;
        }
        flags |= f;
        names.push(f.name());
        end -= 1;
    }
    if flags.is_empty() {
        return Ok((toks, None));
    }
    if flags == Flags::WC | Flags::WZ {
        return Ok((&toks[..end], Some(Flags::WCZ)));
    }
    if flags.bits().count_ones() > 1 {
        names.reverse();
        let legal = FlagRule { allowed: Flags::WC | Flags::WZ | Flags::WCZ, required: false };
        return Err(EncodingError::FlagUpdate { found: names.join(" "), legal: legal.legal_text() });
    }
    Ok((&toks[..end], Some(flags)))
}

pub fn expr_prefix(toks: &[Token]) -> Result<(Expr, &[Token]), ExprError> {
    let mut p = ExprParser::new(toks);
    let e = p.parse()?;
    Ok((e, &toks[p.pos()..]))
}

/// A `PTRA`/`PTRB` operand as written, index still unevaluated.
#[derive(Debug, Clone)]
pub struct PtrOperand {
    pub ptrb: bool,
    pub mode: PtrMode,
    pub index: Option<Expr>,
}

/// Recognises `{++|--}PTRx{++|--}{[index]}`. Anything else is not a
/// pointer operand and is left to the expression parser.
pub fn pointer(toks: &[Token]) -> Result<Option<PtrOperand>, LineError> {
    let mut i = 0;
    let pre = match toks.first().map(|t| &t.tok) {
        Some(Tok::Punct(Punct::Inc)) => Some(true),
        Some(Tok::Punct(Punct::Dec)) => Some(false),
        _ => None,
    };
    if pre.is_some() {
        i += 1;
    }
    let ptrb = match toks.get(i) {
        Some(t) if t.is_word("PTRA") => false,
        Some(t) if t.is_word("PTRB") => true,
        _ => return Ok(None),
    };
    i += 1;
    let post = match toks.get(i).map(|t| &t.tok) {
        Some(Tok::Punct(Punct::Inc)) => Some(true),
        Some(Tok::Punct(Punct::Dec)) => Some(false),
        _ => None,
    };
    if post.is_some() {
        i += 1;
    }
    let mode = match (pre, post) {
        (None, None) => PtrMode::Plain,
        (Some(true), None) => PtrMode::PreInc,
        (Some(false), None) => PtrMode::PreDec,
        (None, Some(true)) => PtrMode::PostInc,
        (None, Some(false)) => PtrMode::PostDec,
        (Some(_), Some(_)) => {
            return Err(SyntaxError::Expected { expected: "one pointer update", found: toks[i - 1].text() }.into())
        }
    };
    let index = match toks.get(i) {
        None => None,
        Some(t) if t.is(Punct::LBracket) => {
            if !toks.last().is_some_and(|t| t.is(Punct::RBracket)) || toks.len() < i + 2 {
                return Err(SyntaxError::Expected { expected: "]", found: "end of line".into() }.into());
            }
            Some(crate::expr::parse_all(&toks[i + 1..toks.len() - 1])?)
        }
        // `PTRA + 1` and the like are ordinary expressions
        Some(_) => return Ok(None),
    };
    Ok(Some(PtrOperand { ptrb, mode, index }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn toks(s: &str) -> Vec<Token> {
        Lexer::new().line(s).0
    }

    #[test]
    fn commas_inside_brackets_do_not_split() {
        let t = toks("x, ptra[1,2], (3,4)");
        assert_eq!(split_commas(&t).len(), 3);
    }

    #[test]
    fn wc_and_wz_combine() {
        let t = toks("x, #1 wc wz");
        let (rest, flags) = split_flags(&t).unwrap();
        assert_eq!(flags, Some(Flags::WCZ));
        assert_eq!(rest.len(), 4);
        assert!(split_flags(&toks("x andc orz")).is_err());
    }

    #[test]
    fn pointer_forms() {
        let p = pointer(&toks("ptrb--[3]")).unwrap().unwrap();
        assert!(p.ptrb);
        assert_eq!(p.mode, PtrMode::PostDec);
        assert!(p.index.is_some());
        assert_eq!(pointer(&toks("++ptra")).unwrap().map(|p| p.mode), Some(PtrMode::PreInc));
        assert!(pointer(&toks("ptra + 1")).unwrap().is_none());
        assert!(pointer(&toks("x")).unwrap().is_none());
    }

    #[test]
    fn prefixes_are_stripped() {
        let t = toks("##\\label");
        let op = Operand::parse(&t);
        assert_eq!(op.imm, Imm::Aug);
        assert!(op.absolute);
        assert_eq!(op.toks.len(), 1);
    }
}
