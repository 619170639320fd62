use std::ops::Range;

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Hash,
    HashHash,
    Backslash,
    At,
    Dollar,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Shl,
    Shr,
    Sar,
    Ror,
    Rol,
    Rev,
    Amp,
    Pipe,
    Caret,
    Bang,
    Tilde,
    Inc,
    Dec,
    Assign,
    Colon,
}

impl Punct {
    pub fn text(self) -> &'static str {
        match self {
            Punct::Comma => ",",
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::Hash => "#",
            Punct::HashHash => "##",
            Punct::Backslash => "\\",
            Punct::At => "@",
            Punct::Dollar => "$",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::Slash => "/",
            Punct::SlashSlash => "//",
            Punct::Shl => "<<",
            Punct::Shr => ">>",
            Punct::Sar => "~>",
            Punct::Ror => "->",
            Punct::Rol => "<-",
            Punct::Rev => "><",
            Punct::Amp => "&",
            Punct::Pipe => "|",
            Punct::Caret => "^",
            Punct::Bang => "!",
            Punct::Tilde => "~",
            Punct::Inc => "++",
            Punct::Dec => "--",
            Punct::Assign => "=",
            Punct::Colon => ":",
        }
    }
}

const PUNCT2: &[(&str, Punct)] = &[
    ("##", Punct::HashHash),
    ("//", Punct::SlashSlash),
    ("<<", Punct::Shl),
    (">>", Punct::Shr),
    ("~>", Punct::Sar),
    ("->", Punct::Ror),
    ("<-", Punct::Rol),
    ("><", Punct::Rev),
    ("++", Punct::Inc),
    ("--", Punct::Dec),
];

fn punct1(c: char) -> Option<Punct> {
    Some(match c {
        ',' => Punct::Comma,
        '(' => Punct::LParen,
        ')' => Punct::RParen,
        '[' => Punct::LBracket,
        ']' => Punct::RBracket,
        '#' => Punct::Hash,
        '\\' => Punct::Backslash,
        '@' => Punct::At,
        '$' => Punct::Dollar,
        '+' => Punct::Plus,
        '-' => Punct::Minus,
        '*' => Punct::Star,
        '/' => Punct::Slash,
        '&' => Punct::Amp,
        '|' => Punct::Pipe,
        '^' => Punct::Caret,
        '!' => Punct::Bang,
        '~' => Punct::Tilde,
        '=' => Punct::Assign,
        ':' => Punct::Colon,
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Local(String),
    Int(u32),
    Real(f64),
    Str(Vec<u8>),
    Punct(Punct),
    Invalid(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub span: Range<usize>,
}

impl Token {
    pub fn is(&self, p: Punct) -> bool {
        self.tok == Tok::Punct(p)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.tok {
            Tok::Ident(s) => Some(s),
            _ => None,
        }
    }

    /// Identifier text compared case-insensitively.
    pub fn is_word(&self, word: &str) -> bool {
        self.ident().is_some_and(|s| s.eq_ignore_ascii_case(word))
    }

    pub fn kind_name(&self) -> &'static str {
        match self.tok {
            Tok::Ident(_) => "identifier",
            Tok::Local(_) => "local",
            Tok::Int(_) => "integer",
            Tok::Real(_) => "real",
            Tok::Str(_) => "string",
            Tok::Punct(_) => "operator",
            Tok::Invalid(_) => "invalid",
        }
    }

    /// Source-like rendering used in diagnostics.
    pub fn text(&self) -> String {
        match &self.tok {
            Tok::Ident(s) => s.clone(),
            Tok::Local(s) => format!(".{s}"),
            Tok::Int(v) => format!("${v:x}"),
            Tok::Real(v) => format!("{v}"),
            Tok::Str(s) => format!("\"{}\"", String::from_utf8_lossy(s)),
            Tok::Punct(p) => p.text().to_string(),
            Tok::Invalid(c) => c.to_string(),
        }
    }
}

/// Line tokenizer. Keeps `{ }` comment nesting across lines.
#[derive(Debug, Default)]
pub struct Lexer {
    block_depth: usize,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_block_comment(&self) -> bool {
        self.block_depth > 0
    }

    pub fn line(&mut self, text: &str) -> (Vec<Token>, Vec<LexError>) {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let end_of = |i: usize| chars.get(i).map_or(text.len(), |&(o, _)| o);
        let at = |i: usize| chars.get(i).map(|&(_, c)| c);

        let mut toks = Vec::new();
        let mut errs = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let (start, c) = chars[i];
            if self.block_depth > 0 {
                match c {
                    '{' => self.block_depth += 1,
                    '}' => self.block_depth -= 1,
                    _ => {}
                }
                i += 1;
                continue;
            }
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            match c {
                '\'' => break,
                '{' => {
                    self.block_depth = 1;
                    i += 1;
                }
                '}' => {
                    toks.push(Token { tok: Tok::Invalid(c), span: start..end_of(i + 1) });
                    i += 1;
                }
                '"' => {
                    let mut bytes = Vec::new();
                    let mut j = i + 1;
                    let mut closed = false;
                    while let Some(ch) = at(j) {
                        j += 1;
                        match ch {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => {
                                let esc = at(j).unwrap_or('\\');
                                j += 1;
                                let e = match esc {
                                    'n' => '\n',
                                    'r' => '\r',
                                    't' => '\t',
                                    '0' => '\0',
                                    other => other,
                                };
                                push_char(&mut bytes, e);
                            }
                            other => push_char(&mut bytes, other),
                        }
                    }
                    if !closed {
                        errs.push(LexError::UnterminatedString);
                    }
                    toks.push(Token { tok: Tok::Str(bytes), span: start..end_of(j) });
                    i = j;
                }
                '$' if at(i + 1).is_some_and(|d| d.is_ascii_hexdigit()) => {
                    let (j, tok) = radix_number(&chars, i + 1, 16, text, start, &mut errs);
                    toks.push(Token { tok, span: start..end_of(j) });
                    i = j;
                }
                '%' if at(i + 1) == Some('%') && at(i + 2).is_some_and(|d| ('0'..='3').contains(&d)) => {
                    let (j, tok) = radix_number(&chars, i + 2, 4, text, start, &mut errs);
                    toks.push(Token { tok, span: start..end_of(j) });
                    i = j;
                }
                '%' if at(i + 1).is_some_and(|d| d == '0' || d == '1') => {
                    let (j, tok) = radix_number(&chars, i + 1, 2, text, start, &mut errs);
                    toks.push(Token { tok, span: start..end_of(j) });
                    i = j;
                }
                d if d.is_ascii_digit() => {
                    let (j, tok) = decimal(&chars, i, text, &mut errs);
                    toks.push(Token { tok, span: start..end_of(j) });
                    i = j;
                }
                '.' if at(i + 1).is_some_and(is_ident_start) => {
                    let mut j = i + 1;
                    while at(j).is_some_and(is_ident_char) {
                        j += 1;
                    }
                    let name = text[end_of(i + 1)..end_of(j)].to_string();
                    toks.push(Token { tok: Tok::Local(name), span: start..end_of(j) });
                    i = j;
                }
                a if is_ident_start(a) => {
                    let mut j = i + 1;
                    while at(j).is_some_and(is_ident_char) {
                        j += 1;
                    }
                    let name = text[start..end_of(j)].to_string();
                    toks.push(Token { tok: Tok::Ident(name), span: start..end_of(j) });
                    i = j;
                }
                _ => {
                    let two: String = [Some(c), at(i + 1)].iter().flatten().collect();
                    if let Some(&(_, p)) = PUNCT2.iter().find(|(s, _)| *s == two) {
                        toks.push(Token { tok: Tok::Punct(p), span: start..end_of(i + 2) });
                        i += 2;
                    } else {
                        let tok = punct1(c).map_or(Tok::Invalid(c), Tok::Punct);
                        toks.push(Token { tok, span: start..end_of(i + 1) });
                        i += 1;
                    }
                }
            }
        }
        (toks, errs)
    }
}

fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn radix_number(
    chars: &[(usize, char)],
    mut j: usize,
    radix: u32,
    text: &str,
    start: usize,
    errs: &mut Vec<LexError>,
) -> (usize, Tok) {
    let mut value: u64 = 0;
    let mut overflow = false;
    while let Some(&(_, c)) = chars.get(j) {
        if c == '_' {
            j += 1;
            continue;
        }
        let Some(d) = c.to_digit(radix) else { break };
        value = value * radix as u64 + d as u64;
        if value > u32::MAX as u64 {
            overflow = true;
            value &= u32::MAX as u64;
        }
        j += 1;
    }
    if overflow {
        let end = chars.get(j).map_or(text.len(), |&(o, _)| o);
        errs.push(LexError::NumberOverflow { text: text[start..end].to_string() });
    }
    (j, Tok::Int(value as u32))
}

fn decimal(chars: &[(usize, char)], i: usize, text: &str, errs: &mut Vec<LexError>) -> (usize, Tok) {
    let at = |k: usize| chars.get(k).map(|&(_, c)| c);
    let mut j = i;
    while at(j).is_some_and(|c| c.is_ascii_digit() || c == '_') {
        j += 1;
    }
    let mut real = false;
    if at(j) == Some('.') && at(j + 1).is_some_and(|c| c.is_ascii_digit()) {
        real = true;
        j += 1;
        while at(j).is_some_and(|c| c.is_ascii_digit() || c == '_') {
            j += 1;
        }
    }
    if matches!(at(j), Some('e' | 'E')) {
        let k = if matches!(at(j + 1), Some('+' | '-')) { j + 2 } else { j + 1 };
        if at(k).is_some_and(|c| c.is_ascii_digit()) {
            real = true;
            j = k;
            while at(j).is_some_and(|c| c.is_ascii_digit()) {
                j += 1;
            }
        }
    }
    let start = chars[i].0;
    let end = chars.get(j).map_or(text.len(), |&(o, _)| o);
    let digits: String = text[start..end].chars().filter(|&c| c != '_').collect();
    if real {
        return (j, Tok::Real(digits.parse().unwrap_or(0.0)));
    }
    match digits.parse::<u32>() {
        Ok(v) => (j, Tok::Int(v)),
        Err(_) => {
            errs.push(LexError::NumberOverflow { text: text[start..end].to_string() });
            let truncated = digits.parse::<u128>().map_or(0, |v| v as u32);
            (j, Tok::Int(truncated))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<Tok> {
        Lexer::new().line(line).0.into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn numbers_in_every_radix() {
        assert_eq!(
            kinds("12_34 $1f %101 %%123 1.5"),
            vec![Tok::Int(1234), Tok::Int(0x1f), Tok::Int(5), Tok::Int(27), Tok::Real(1.5)]
        );
    }

    #[test]
    fn dollar_alone_is_here() {
        assert_eq!(kinds("$ + 4"), vec![Tok::Punct(Punct::Dollar), Tok::Punct(Punct::Plus), Tok::Int(4)]);
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(kinds("mov x ' trailing"), vec![Tok::Ident("mov".into()), Tok::Ident("x".into())]);
        let mut lx = Lexer::new();
        let (t, _) = lx.line("nop { starts");
        assert_eq!(t.len(), 1);
        assert!(lx.in_block_comment());
        let (t, _) = lx.line("still } ret");
        assert_eq!(t.iter().map(|t| t.tok.clone()).collect::<Vec<_>>(), vec![Tok::Ident("ret".into())]);
    }

    #[test]
    fn pointer_and_shift_operators() {
        assert_eq!(
            kinds("++ptra[2] ~> -> <- ><"),
            vec![
                Tok::Punct(Punct::Inc),
                Tok::Ident("ptra".into()),
                Tok::Punct(Punct::LBracket),
                Tok::Int(2),
                Tok::Punct(Punct::RBracket),
                Tok::Punct(Punct::Sar),
                Tok::Punct(Punct::Ror),
                Tok::Punct(Punct::Rol),
                Tok::Punct(Punct::Rev),
            ]
        );
    }

    #[test]
    fn invalid_characters_become_tokens() {
        assert_eq!(kinds("1 ? 2"), vec![Tok::Int(1), Tok::Invalid('?'), Tok::Int(2)]);
    }

    #[test]
    fn overflowing_literal_is_reported() {
        let (_, errs) = Lexer::new().line("$1_0000_0000");
        assert_eq!(errs.len(), 1);
    }
}
