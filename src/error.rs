use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::encoding::Slot;
use crate::isa::p2::Region;

/// Operator tier of the expression grammar, tightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Mulops,
    Addops,
    Shiftops,
    Binops,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Mulops => "mulops",
            Tier::Addops => "addops",
            Tier::Shiftops => "shiftops",
            Tier::Binops => "binops",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    Global,
    Local,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Global => "global",
            Scope::Local => "local",
        })
    }
}

/// Coarse classification used by listings and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorClass {
    Lexical,
    Syntax,
    Symbol,
    Encoding,
    Boundary,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum LexError {
    #[error("Unterminated string constant.")]
    UnterminatedString,
    #[error("Numeric constant '{text}' does not fit in 32 bits.")]
    NumberOverflow { text: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum ExprError {
    #[error("Unexpected end of line in {tier}.")]
    UnexpectedEndOfLine { tier: Tier },
    #[error("Invalid character '{ch}' in {tier}.")]
    InvalidCharacter { tier: Tier, ch: char },
    #[error("Undefined {scope} symbol '{name}'.")]
    UndefinedSymbol { scope: Scope, name: String },
    #[error("Expected {expected} but found {found}.")]
    Expected { expected: &'static str, found: String },
    #[error("Division by zero.")]
    DivisionByZero,
}

impl ExprError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ExprError::InvalidCharacter { .. } => ErrorClass::Lexical,
            ExprError::UnexpectedEndOfLine { .. } | ExprError::Expected { .. } => ErrorClass::Syntax,
            ExprError::UndefinedSymbol { .. } => ErrorClass::Symbol,
            ExprError::DivisionByZero => ErrorClass::Encoding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnumPhase {
    Start,
    Continuation,
}

impl fmt::Display for EnumPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EnumPhase::Start => "enumeration start",
            EnumPhase::Continuation => "enumeration continuation",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum SymbolError {
    #[error("Symbol {name} (line {line}, value ${value:x}) already defined in line {existing_line} with value ${existing_value:x}.")]
    Duplicate {
        name: String,
        line: usize,
        value: u32,
        existing_line: usize,
        existing_value: u32,
    },
    #[error("Unexpected token {token} in {phase}.")]
    Enumeration { phase: EnumPhase, token: String },
    #[error("Reserved word {name} can not be used as a symbol.")]
    Reserved { name: String },
    #[error("Symbol {name} changed value between passes (${old:x} -> ${new:x}).")]
    PhaseMismatch { name: String, old: u32, new: u32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum SyntaxError {
    #[error("Unknown instruction or directive '{0}'.")]
    Unknown(String),
    #[error("Expected , but found end of line.")]
    ExpectedComma,
    #[error("Expected {expected} but found {found}.")]
    Expected { expected: &'static str, found: String },
    #[error("Found extra parameters: {0}")]
    ExtraParameters(String),
    #[error("Not in constant section (CON) but found assignment.")]
    AssignmentOutsideCon,
    #[error("Missing operand for {0}.")]
    MissingOperand(String),
}

/// Why an oversized 9-bit field could not be augmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AugBlock {
    NoImmediate,
    WzNotSetForL,
    ImNotSetForL,
}

impl fmt::Display for AugBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AugBlock::NoImmediate => "no immediate mode",
            AugBlock::WzNotSetForL => "WZ is not set for L",
            AugBlock::ImNotSetForL => "IM is not set for L",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum EncodingError {
    #[error("Unexpected flag update '{found}' not {legal}.")]
    FlagUpdate { found: String, legal: String },
    #[error("Missing flag update, expected one of {legal}.")]
    MissingFlag { legal: String },
    #[error("{slot} constant ${value:x} is > $1ff but {reason}.")]
    Oversized { slot: Slot, value: u32, reason: AugBlock },
    #[error("{slot} constant ${value:x} needs augmentation but was unresolved in pass 1; write ## instead of #.")]
    LateAugmentation { slot: Slot, value: u32 },
    #[error("Instruction {mnemonic} expects operands {expected}.")]
    WrongShape { mnemonic: String, expected: String },
    #[error("Invalid pointer parameter '{found}'; expected one of PA, PB, PTRA, PTRB.")]
    InvalidPointer { found: String },
    #[error("Missing immediate #n.")]
    MissingImmediate,
    #[error("Immediate #n not in 0-{max} ({value}).")]
    ImmediateRange { max: u32, value: u32 },
    #[error("Expected a C/Z condition (_CLR .. _SET) but found '{found}'.")]
    ModczParameter { found: String },
    #[error("Augment value ${value:x} exceeds 23 bits.")]
    AugRange { value: u32 },
    #[error("Condition {condition} is not allowed for {mnemonic}.")]
    Conditional { condition: String, mnemonic: String },
    #[error("Pointer expression is not allowed for {mnemonic}.")]
    PointerNotAllowed { mnemonic: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum BoundaryError {
    #[error("{region} address ${addr:x} exceeds limit ${limit:x}.")]
    AddressLimit { region: Region, addr: u32, limit: u32 },
    #[error("{region} origin ${addr:x} exceeds limit ${limit:x}.")]
    Origin { region: Region, addr: u32, limit: u32 },
    #[error("HUB origin ${addr:x} is below ${min:x}.")]
    HubOriginLow { addr: u32, min: u32 },
    #[error("Code does not fit below ${limit:x} (ORG is ${addr:x}).")]
    Fit { limit: u32, addr: u32 },
    #[error("ORGF target ${target:x} is below the current address ${addr:x}.")]
    OrgfBackwards { target: u32, addr: u32 },
    #[error("Pointer index ${index:08x} is invalid.")]
    PointerIndex { index: u32 },
    #[error("Pointer index ${index:08x} is out of bounds.")]
    PointerAugIndex { index: u32 },
    #[error("{what} address ${addr:x} is not a multiple of {multiple}.")]
    Misaligned { what: &'static str, addr: u32, multiple: u32 },
    #[error("Relative branch distance {distance} is not a multiple of {multiple}.")]
    MisalignedDistance { distance: i64, multiple: u32 },
    #[error("Relative branch offset {offset} out of range {min}..{max}.")]
    RelativeRange { offset: i64, min: i64, max: i64 },
}

/// Everything a single line can report without stopping the run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
pub enum LineError {
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Expr(#[from] ExprError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    #[error("Could not open file \"{path}\" for reading.")]
    Io { path: String },
}

impl LineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LineError::Lexical(_) => ErrorClass::Lexical,
            LineError::Syntax(_) => ErrorClass::Syntax,
            LineError::Expr(e) => e.class(),
            LineError::Symbol(_) => ErrorClass::Symbol,
            LineError::Encoding(_) => ErrorClass::Encoding,
            LineError::Boundary(_) => ErrorClass::Boundary,
            LineError::Io { .. } => ErrorClass::Io,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub class: ErrorClass,
    pub message: String,
    pub error: LineError,
}

impl Diagnostic {
    pub fn error(error: impl Into<LineError>) -> Self {
        Self::new(Severity::Error, error.into())
    }

    pub fn warning(error: impl Into<LineError>) -> Self {
        Self::new(Severity::Warning, error.into())
    }

    fn new(severity: Severity, error: LineError) -> Self {
        Self { severity, class: error.class(), message: error.to_string(), error }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{tag}: {}", self.message)
    }
}

/// Fatal failures of a whole run.
#[derive(thiserror::Error, Debug)]
pub enum AsmError {
    #[error("Can not open '{}' for reading: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
