mod cursor;
mod directives;
mod encode;
mod operands;

pub use cursor::{Cursor, Mode};
pub use directives::Directive;

use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::encoding::{AugQueue, Slot};
use crate::error::{AsmError, Diagnostic, EncodingError, EnumPhase, ExprError, LineError, SymbolError, SyntaxError};
use crate::expr::{self, Expr, Resolved, Resolver, SymbolRef};
use crate::isa::p2::{self, Flags};
use crate::lexer::{Lexer, Punct, Tok, Token};
use crate::listing::{InstructionRecord, Listing, RecordKind, TokenSpan};
use crate::memory::HubImage;
use crate::options::AsmOptions;
use crate::symbols::{Enumeration, Symbol, SymbolKind, SymbolTable};

use operands::{expr_prefix, split_commas};

#[derive(Debug, Clone)]
pub enum Source {
    Text(String),
    Path(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Con,
    Dat,
    Obj,
    Pub,
    Pri,
    Var,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "CON" => Section::Con,
            "DAT" => Section::Dat,
            "OBJ" => Section::Obj,
            "PUB" => Section::Pub,
            "PRI" => Section::Pri,
            "VAR" => Section::Var,
            _ => return None,
        })
    }
}

/// Words that can not name a symbol.
pub fn is_reserved(name: &str) -> bool {
    p2::is_mnemonic(name)
        || p2::condition_code(name).is_some()
        || p2::modcz_code(name).is_some()
        || p2::register_address(name).is_some()
        || Flags::parse_suffix(name).is_some()
        || Directive::from_name(name).is_some()
        || Section::from_name(name).is_some()
}

#[derive(Debug)]
pub struct Assembly {
    pub listing: Listing,
    pub image: HubImage,
    pub elapsed: Duration,
}

impl Assembly {
    pub fn records(&self) -> &[InstructionRecord] {
        &self.listing.records
    }

    pub fn record(&self, line: usize) -> Option<&InstructionRecord> {
        self.listing.record(line)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.listing.symbols
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.listing.symbol(name)
    }

    pub fn has_errors(&self) -> bool {
        self.listing.error_count() > 0
    }

    pub fn words(&self) -> Vec<u32> {
        self.listing.records.iter().flat_map(|r| r.words.iter().copied()).collect()
    }
}

/// Assembles a source. Only failing to read a source file is fatal.
pub fn assemble(source: Source, options: &AsmOptions) -> Result<Assembly, AsmError> {
    let started = Instant::now();
    let (text, base_dir) = match source {
        Source::Text(text) => (text, options.include_dir.clone()),
        Source::Path(path) => {
            let text = fs::read_to_string(&path).map_err(|source| AsmError::Io { path: path.clone(), source })?;
            (text, path.parent().map(Path::to_path_buf))
        }
    };
    let lines: Vec<&str> = text.lines().collect();
    let mut asm = Assembler::new(options, base_dir);
    let listing = asm.run(&lines);
    let elapsed = started.elapsed();
    debug!(lines = lines.len(), errors = listing.error_count(), ?elapsed, "assembly finished");
    Ok(Assembly { listing, image: asm.image, elapsed })
}

#[derive(Debug, Clone, Copy)]
struct Evaluated {
    value: u32,
    known: bool,
}

struct Lookup<'a> {
    symbols: &'a SymbolTable,
    here: u32,
    pass: Pass,
    deferred: Cell<bool>,
}

impl Resolver for Lookup<'_> {
    fn resolve(&self, sym: &SymbolRef) -> Result<Resolved, ExprError> {
        match (self.symbols.lookup(&sym.name, sym.local), self.pass) {
            (Some(s), _) if s.resolved => Ok(Resolved { value: s.value, hub: s.hub }),
            (Some(s), Pass::First) => {
                self.deferred.set(true);
                Ok(Resolved { value: s.value, hub: s.hub })
            }
            (None, Pass::First) => {
                self.deferred.set(true);
                Ok(Resolved { value: 0, hub: 0 })
            }
            _ => Err(ExprError::UndefinedSymbol { scope: sym.scope(), name: sym.name.clone() }),
        }
    }

    fn here(&self) -> u32 {
        self.here
    }
}

struct Assembler<'o> {
    options: &'o AsmOptions,
    base_dir: Option<PathBuf>,
    pass: Pass,
    lexer: Lexer,
    symbols: SymbolTable,
    cursor: Cursor,
    queue: AugQueue,
    section: Section,
    enumeration: Enumeration,
    enum_known: bool,
    reserved: BTreeSet<(usize, Slot)>,
    files: HashMap<String, Option<Vec<u8>>>,
    image: HubImage,
    line: usize,
    text: String,
    notes: Vec<Diagnostic>,
}

impl<'o> Assembler<'o> {
    fn new(options: &'o AsmOptions, base_dir: Option<PathBuf>) -> Self {
        Self {
            options,
            base_dir,
            pass: Pass::First,
            lexer: Lexer::new(),
            symbols: SymbolTable::new(),
            cursor: Cursor::default(),
            queue: AugQueue::new(),
            section: Section::Dat,
            enumeration: Enumeration::new(0),
            enum_known: true,
            reserved: BTreeSet::new(),
            files: HashMap::new(),
            image: HubImage::new(),
            line: 0,
            text: String::new(),
            notes: Vec::new(),
        }
    }

    fn begin_pass(&mut self, pass: Pass) {
        self.pass = pass;
        self.lexer = Lexer::new();
        self.cursor = Cursor::default();
        self.queue.clear();
        self.section = Section::Dat;
        self.enumeration = Enumeration::new(0);
        self.enum_known = true;
        self.symbols.clear_scope();
        self.image.clear();
        debug!(?pass, symbols = self.symbols.len(), "pass start");
    }

    fn run(&mut self, lines: &[&str]) -> Listing {
        self.begin_pass(Pass::First);
        for (i, text) in lines.iter().enumerate() {
            self.line(i + 1, text);
        }
        debug!(symbols = self.symbols.len(), augments = self.reserved.len(), "pass 1 done");

        self.begin_pass(Pass::Second);
        let records: Vec<InstructionRecord> =
            lines.iter().enumerate().map(|(i, text)| self.line(i + 1, text)).collect();
        debug!(bytes = self.image.len(), "pass 2 done");

        let mut symbols: Vec<Symbol> = self.symbols.iter().cloned().collect();
        symbols.sort_by(|a, b| a.name.to_ascii_uppercase().cmp(&b.name.to_ascii_uppercase()));
        Listing { records, symbols }
    }

    fn line(&mut self, no: usize, text: &str) -> InstructionRecord {
        self.line = no;
        self.text.clear();
        self.text.push_str(text);
        let (toks, lex_errors) = self.lexer.line(text);
        let mut rec = InstructionRecord::new(
            no,
            text,
            RecordKind::Comment,
            self.cursor.region(),
            self.cursor.pc(),
            self.cursor.hub(),
        );
        rec.tokens = toks.iter().map(TokenSpan::from).collect();
        rec.diagnostics.extend(lex_errors.into_iter().map(Diagnostic::error));
        let result = self.statement(&toks, &mut rec);
        rec.diagnostics.append(&mut self.notes);
        if let Err(e) = result {
            rec.diagnostics.push(Diagnostic::error(e));
        }
        rec.symbols = self.symbols.len();
        trace!(line = no, pc = rec.pc, words = rec.words.len(), bytes = rec.data.len(), "line");
        rec
    }

    fn statement(&mut self, toks: &[Token], rec: &mut InstructionRecord) -> Result<(), LineError> {
        let Some(first) = toks.first() else { return Ok(()) };
        if let Some(section) = first.ident().and_then(Section::from_name) {
            self.section = section;
            rec.kind = RecordKind::Section;
            if section == Section::Con {
                self.enumeration = Enumeration::new(0);
                self.enum_known = true;
            }
            return match (&toks[1..], section) {
                ([], _) => Ok(()),
                (rest, Section::Con) => self.con_line(rest, rec),
                (rest, Section::Dat) => self.dat_line(rest, rec),
                _ => Ok(()),
            };
        }
        match self.section {
            Section::Con => self.con_line(toks, rec),
            Section::Dat => self.dat_line(toks, rec),
            _ => {
                rec.kind = RecordKind::Skipped;
                Ok(())
            }
        }
    }

    /// Assignments `NAME = expr` and enumerations `#start, A, B[step]`.
    fn con_line(&mut self, toks: &[Token], rec: &mut InstructionRecord) -> Result<(), LineError> {
        rec.kind = RecordKind::Assignment;
        let phase = if toks.first().is_some_and(|t| t.is(Punct::Hash)) {
            EnumPhase::Start
        } else {
            EnumPhase::Continuation
        };
        for entry in split_commas(toks) {
            match entry {
                [] => return Err(SymbolError::Enumeration { phase, token: "end of line".into() }.into()),
                [hash, rest @ ..] if hash.is(Punct::Hash) => {
                    let v = self.eval_toks(rest)?;
                    self.enumeration = Enumeration::new(v.value);
                    self.enum_known = v.known;
                    rec.value = Some(v.value);
                }
                [name, eq, rest @ ..] if eq.is(Punct::Assign) => {
                    let Some(name) = name.ident() else {
                        return Err(SyntaxError::Expected { expected: "symbol", found: name.text() }.into());
                    };
                    self.check_reserved(name)?;
                    let v = self.eval_toks(rest)?;
                    self.define(name, SymbolKind::Constant, v.value, 0, v.known);
                    rec.value = Some(v.value);
                }
                [name, rest @ ..] => {
                    let Some(ident) = name.ident() else {
                        return Err(SymbolError::Enumeration { phase, token: name.text() }.into());
                    };
                    let step = match rest {
                        [] => 1,
                        [open, inner @ .., close] if open.is(Punct::LBracket) && close.is(Punct::RBracket) => {
                            let v = self.eval_toks(inner)?;
                            self.enum_known &= v.known;
                            v.value
                        }
                        [other, ..] => return Err(SymbolError::Enumeration { phase, token: other.text() }.into()),
                    };
                    self.check_reserved(ident)?;
                    let value = self.enumeration.assign(step);
                    self.define(ident, SymbolKind::Constant, value, 0, self.enum_known);
                    rec.value = Some(value);
                }
            }
        }
        Ok(())
    }

    /// `{label} {condition} instruction|directive operands {flags}`
    fn dat_line(&mut self, toks: &[Token], rec: &mut InstructionRecord) -> Result<(), LineError> {
        if toks.get(1).is_some_and(|t| t.is(Punct::Assign)) {
            return Err(SyntaxError::AssignmentOutsideCon.into());
        }
        let mut i = 0;
        if self.define_label(&toks[0]) {
            rec.kind = RecordKind::Label;
            i = 1;
        }
        let Some(tok) = toks.get(i) else { return Ok(()) };
        let cond = tok.ident().and_then(|name| Some((p2::condition_code(name)?, name.to_ascii_uppercase())));
        if cond.is_some() {
            i += 1;
        }
        let Some(tok) = toks.get(i) else {
            return Err(SyntaxError::Expected { expected: "instruction", found: "end of line".into() }.into());
        };
        let Some(word) = tok.ident() else {
            return Err(SyntaxError::Expected { expected: "instruction or directive", found: tok.text() }.into());
        };
        let rest = &toks[i + 1..];
        if let Some(d) = Directive::from_name(word) {
            if let Some((_, condition)) = cond {
                return Err(EncodingError::Conditional { condition, mnemonic: word.to_ascii_uppercase() }.into());
            }
            return self.directive(d, rest, rec);
        }
        if p2::is_mnemonic(word) {
            return self.instruction(word, cond, rest, rec);
        }
        Err(SyntaxError::Unknown(word.to_string()).into())
    }

    fn define_label(&mut self, tok: &Token) -> bool {
        let (name, kind) = match &tok.tok {
            Tok::Local(name) => (name.as_str(), SymbolKind::LocalLabel),
            Tok::Ident(name) if !is_reserved(name) => (name.as_str(), SymbolKind::Label),
            _ => return false,
        };
        if kind == SymbolKind::Label {
            self.symbols.set_scope(name);
        }
        let (pc, hub) = (self.cursor.pc(), self.cursor.hub());
        self.define(name, kind, pc, hub, true);
        true
    }

    fn define(&mut self, name: &str, kind: SymbolKind, value: u32, hub: u32, known: bool) {
        if let Err(e) = self.symbols.define(name, kind, value, hub, self.line, known) {
            self.note(e);
        }
    }

    fn check_reserved(&self, name: &str) -> Result<(), SymbolError> {
        if is_reserved(name) {
            return Err(SymbolError::Reserved { name: name.to_string() });
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Evaluated, LineError> {
        for s in expr.symbols() {
            self.symbols.reference(&s.name, s.local, self.line);
        }
        let lookup = Lookup { symbols: &self.symbols, here: self.cursor.pc(), pass: self.pass, deferred: Cell::new(false) };
        let value = expr::eval(expr, &lookup)?.to_u32();
        Ok(Evaluated { value, known: !lookup.deferred.get() })
    }

    /// Evaluates an operand; tokens after a complete expression are noted
    /// as extra parameters.
    fn eval_toks(&mut self, toks: &[Token]) -> Result<Evaluated, LineError> {
        let (e, rest) = expr_prefix(toks)?;
        if !rest.is_empty() {
            let extra = self.snippet(rest);
            self.note(SyntaxError::ExtraParameters(extra));
        }
        self.eval(&e)
    }

    fn snippet(&self, toks: &[Token]) -> String {
        match (toks.first(), toks.last()) {
            (Some(a), Some(b)) => self.text.get(a.span.start..b.span.end).unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }

    fn note(&mut self, e: impl Into<LineError>) {
        if self.pass == Pass::Second {
            self.notes.push(Diagnostic::error(e));
        }
    }

    fn warn(&mut self, e: impl Into<LineError>) {
        if self.pass == Pass::Second {
            self.notes.push(Diagnostic::warning(e));
        }
    }

    /// Pass 1 swallows errors that depend on values it may not know yet.
    fn soft<T: Default, E: Into<LineError>>(&self, r: Result<T, E>) -> Result<T, LineError> {
        match (r, self.pass) {
            (Ok(v), _) => Ok(v),
            (Err(_), Pass::First) => Ok(T::default()),
            (Err(e), Pass::Second) => Err(e.into()),
        }
    }

    fn emit(&mut self, rec: &mut InstructionRecord, words: &[u32], data: &[u8]) {
        let mut bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        bytes.extend_from_slice(data);
        if self.pass == Pass::Second {
            self.image.store(self.cursor.hub(), &bytes);
        }
        if let Err(e) = self.cursor.advance(bytes.len() as u32) {
            self.note(e);
        }
        rec.words.extend_from_slice(words);
        rec.data.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Assembly {
        assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap()
    }

    #[test]
    fn forward_label_resolves_in_pass_two() {
        let a = run("        jmp #later\n        nop\nlater   nop\n");
        assert!(!a.has_errors(), "{}", a.listing.render(false));
        assert_eq!(a.symbol("later").map(|s| s.value), Some(2));
        assert_eq!(a.words()[0], 0xFD90_0001);
    }

    #[test]
    fn con_enumerations_count_up() {
        let a = run("CON\n  #4, RED, GREEN[2], BLUE\n  ALPHA\n");
        let v = |n: &str| a.symbol(n).map(|s| s.value);
        assert_eq!((v("RED"), v("GREEN"), v("BLUE"), v("ALPHA")), (Some(4), Some(5), Some(7), Some(8)));
    }

    #[test]
    fn enumeration_garbage_names_the_phase() {
        let a = run("CON\n  #0, 5\n  A, $\n");
        let msgs: Vec<String> = a.listing.diagnostics().map(|(_, d)| d.message.clone()).collect();
        assert_eq!(msgs, vec![
            "Unexpected token $5 in enumeration start.".to_string(),
            "Unexpected token $ in enumeration continuation.".to_string(),
        ]);
    }

    #[test]
    fn pub_bodies_are_skipped() {
        let a = run("PUB main\n  this is spin\nDAT\n  nop\n");
        assert_eq!(a.record(2).map(|r| r.kind), Some(RecordKind::Skipped));
        assert_eq!(a.words(), vec![0]);
    }

    #[test]
    fn reserved_names_can_not_be_constants() {
        let a = run("CON mov = 1\n");
        assert!(matches!(
            a.record(1).unwrap().diagnostics[0].error,
            LineError::Symbol(SymbolError::Reserved { .. })
        ));
    }
}
