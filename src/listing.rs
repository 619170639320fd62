use serde::Serialize;
use std::fmt::Write as _;

use crate::error::Diagnostic;
use crate::isa::p2::Region;
use crate::lexer::Token;
use crate::symbols::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    Comment,
    Section,
    Assignment,
    Label,
    Instruction,
    Data,
    Directive,
    Skipped,
    /// A disassembled word with no descriptor.
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    pub kind: &'static str,
}

impl From<&Token> for TokenSpan {
    fn from(t: &Token) -> Self {
        Self { start: t.span.start, end: t.span.end, kind: t.kind_name() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionRecord {
    pub line: usize,
    pub source: String,
    pub kind: RecordKind,
    pub region: Region,
    pub pc: u32,
    pub hub: u32,
    /// AUGD/AUGS prefix words followed by the instruction word.
    pub words: Vec<u32>,
    pub data: Vec<u8>,
    pub value: Option<u32>,
    pub tokens: Vec<TokenSpan>,
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: usize,
    /// Opcode brief of a disassembled word.
    pub description: Option<&'static str>,
}

impl InstructionRecord {
    pub fn new(line: usize, source: &str, kind: RecordKind, region: Region, pc: u32, hub: u32) -> Self {
        Self {
            line,
            source: source.to_string(),
            kind,
            region,
            pc,
            hub,
            words: Vec::new(),
            data: Vec::new(),
            value: None,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            symbols: 0,
            description: None,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// The instruction word without its augment prefixes.
    pub fn opcode(&self) -> Option<u32> {
        self.words.last().copied()
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self.words.iter().flat_map(|w| w.to_le_bytes()).collect();
        out.extend_from_slice(&self.data);
        out
    }

    fn org(&self) -> u32 {
        match self.region {
            Region::Hub => self.pc,
            _ => self.pc * 4,
        }
    }
}

/// Records indexed by line plus the final symbol table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub records: Vec<InstructionRecord>,
    pub symbols: Vec<Symbol>,
}

impl Listing {
    pub fn record(&self, line: usize) -> Option<&InstructionRecord> {
        self.records.get(line.checked_sub(1)?).filter(|r| r.line == line)
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = (usize, &Diagnostic)> {
        self.records.iter().flat_map(|r| r.diagnostics.iter().map(move |d| (r.line, d)))
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics().filter(|(_, d)| d.is_error()).count()
    }

    pub fn render(&self, compat: bool) -> String {
        let mut out = String::new();
        for r in &self.records {
            if compat {
                render_compat(&mut out, r);
            } else {
                render_plain(&mut out, r);
            }
            for d in &r.diagnostics {
                let _ = writeln!(out, "{:<6} {d}", r.line);
            }
        }
        out
    }

    pub fn render_symbols(&self) -> String {
        let mut out = String::new();
        for s in &self.symbols {
            let refs: Vec<String> = s.references.iter().map(usize::to_string).collect();
            let _ = writeln!(
                out,
                "{:<32} {:08x} {:05x} {:?} line {} refs [{}]",
                s.name,
                s.value,
                s.hub,
                s.kind,
                s.defined_line,
                refs.join(", ")
            );
        }
        out
    }
}

fn render_plain(out: &mut String, r: &InstructionRecord) {
    let _ = write!(out, "{:>5} {} {:05x} {:05x} ", r.line, r.region, r.pc, r.hub);
    match (r.words.as_slice(), r.value) {
        ([], Some(v)) => {
            let _ = write!(out, "={v:08x}  ");
        }
        ([], None) if !r.data.is_empty() => {
            let shown: Vec<String> = r.data.iter().take(4).map(|b| format!("{b:02x}")).collect();
            let _ = write!(out, "{:<10}", shown.join(""));
        }
        ([], None) => out.push_str("          "),
        (words, _) => {
            let shown: Vec<String> = words.iter().map(|w| format!("{w:08x}")).collect();
            let _ = write!(out, "{:<10}", shown.join(" "));
        }
    }
    let _ = writeln!(out, "{}", r.source);
}

fn render_compat(out: &mut String, r: &InstructionRecord) {
    let org = r.org();
    match r.kind {
        RecordKind::Instruction if !r.words.is_empty() => {
            // one line per word; the source follows the first
            for (i, w) in r.words.iter().enumerate() {
                let src = if i == 0 { r.source.as_str() } else { "" };
                let _ = writeln!(out, "{:<6} {:06x} [{w:08x}] {src}", r.line, org + 4 * i as u32);
            }
        }
        RecordKind::Assignment => {
            let _ = writeln!(out, "{:<6} {org:06x} <{:08x}> {}", r.line, r.value.unwrap_or(0), r.source);
        }
        RecordKind::Data if !r.data.is_empty() => {
            for (i, chunk) in r.data.chunks(4).enumerate() {
                let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
                let src = if i == 0 { r.source.as_str() } else { "" };
                let _ = writeln!(out, "{:<6} {:06x} [{:<11}] {src}", r.line, org + 4 * i as u32, bytes.join(" "));
            }
        }
        _ => {
            let _ = writeln!(out, "{:<6} {org:06x} -{}- {}", r.line, "-".repeat(8), r.source);
        }
    }
}
