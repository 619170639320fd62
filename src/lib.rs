pub mod asm;
pub mod decoder;
pub mod disasm;
pub mod encoding;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod listing;
pub mod memory;
pub mod options;
pub mod symbols;

pub mod isa {
    pub mod p2; // Propeller 2 instruction set, silicon rev B/C
}

pub use asm::{assemble, Assembly, Source};
pub use decoder::{Decoded, Decoder, P2Decoder};
pub use disasm::{disassemble, disassemble_range, DisasmRange, Disassembler};
pub use error::{AsmError, Diagnostic, LineError};
pub use listing::{InstructionRecord, Listing, RecordKind};
pub use memory::{Bus, HubImage};
pub use options::{AsmOptions, PtrSyntax};
