use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// Word layout: EEEE IIIIIII CZI DDDDDDDDD SSSSSSSSS
pub const COND_SHIFT: u32 = 28;
pub const COND_MASK: u32 = 0xF << COND_SHIFT;
pub const C_BIT: u32 = 1 << 20;
pub const Z_BIT: u32 = 1 << 19;
pub const I_BIT: u32 = 1 << 18;
pub const D_SHIFT: u32 = 9;
pub const FIELD_MASK: u32 = 0x1FF;
pub const A_MASK: u32 = 0xF_FFFF; // 20 bit address of JMP #A and friends
pub const R_BIT: u32 = 1 << 20;
pub const W_SHIFT: u32 = 21;
pub const AUG_MASK: u32 = 0x7F_FFFF;

pub const COND_ALWAYS: u32 = 0xF;
pub const COND_RET: u32 = 0x0;

// Address spaces. COG and LUT count longs, HUB counts bytes.
pub const MEM_SIZE: u32 = 1 << 20;
pub const COG_SIZE: u32 = 0x200;
pub const LUT_END: u32 = 0x400;
pub const HUB_ADDR0: u32 = 0x400;
pub const FIT_DEFAULT_COG: u32 = 0x1F0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Cog,
    Lut,
    Hub,
}

impl Region {
    pub fn of_pc(pc: u32) -> Region {
        match pc {
            p if p < COG_SIZE => Region::Cog,
            p if p < LUT_END => Region::Lut,
            _ => Region::Hub,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Cog => "COG",
            Region::Lut => "LUT",
            Region::Hub => "HUB",
        })
    }
}

/// Canonical condition names indexed by the EEEE field, with accepted aliases.
pub const CONDITIONS: [(&str, &[&str]); 16] = [
    ("_RET_", &[]),
    ("IF_NC_AND_NZ", &["IF_NZ_AND_NC", "IF_A", "IF_GT", "IF_00"]),
    ("IF_NC_AND_Z", &["IF_Z_AND_NC", "IF_01"]),
    ("IF_NC", &["IF_AE", "IF_GE", "IF_0X"]),
    ("IF_C_AND_NZ", &["IF_NZ_AND_C", "IF_10"]),
    ("IF_NZ", &["IF_NE", "IF_X0"]),
    ("IF_C_NE_Z", &["IF_Z_NE_C", "IF_DIFF"]),
    ("IF_NC_OR_NZ", &["IF_NZ_OR_NC", "IF_NOT_11"]),
    ("IF_C_AND_Z", &["IF_Z_AND_C", "IF_11"]),
    ("IF_C_EQ_Z", &["IF_Z_EQ_C", "IF_SAME"]),
    ("IF_Z", &["IF_E", "IF_X1"]),
    ("IF_NC_OR_Z", &["IF_Z_OR_NC", "IF_NOT_10"]),
    ("IF_C", &["IF_B", "IF_LT", "IF_1X"]),
    ("IF_C_OR_NZ", &["IF_NZ_OR_C", "IF_NOT_01"]),
    ("IF_C_OR_Z", &["IF_Z_OR_C", "IF_BE", "IF_LE", "IF_NOT_00"]),
    ("IF_ALWAYS", &[]),
];

pub const MODCZ_PARAMS: [(&str, &[&str]); 16] = [
    ("_CLR", &[]),
    ("_NC_AND_NZ", &["_NZ_AND_NC", "_GT"]),
    ("_NC_AND_Z", &["_Z_AND_NC"]),
    ("_NC", &["_GE"]),
    ("_C_AND_NZ", &["_NZ_AND_C"]),
    ("_NZ", &["_NE"]),
    ("_C_NE_Z", &["_Z_NE_C"]),
    ("_NC_OR_NZ", &["_NZ_OR_NC"]),
    ("_C_AND_Z", &["_Z_AND_C"]),
    ("_C_EQ_Z", &["_Z_EQ_C"]),
    ("_Z", &["_E"]),
    ("_NC_OR_Z", &["_Z_OR_NC"]),
    ("_C", &["_LT"]),
    ("_C_OR_NZ", &["_NZ_OR_C"]),
    ("_C_OR_Z", &["_Z_OR_C", "_LE"]),
    ("_SET", &[]),
];

fn lookup_named(table: &[(&str, &[&str]); 16], name: &str) -> Option<u32> {
    let up = name.to_ascii_uppercase();
    table
        .iter()
        .position(|(canon, aliases)| *canon == up || aliases.contains(&up.as_str()))
        .map(|i| i as u32)
}

pub fn condition_code(name: &str) -> Option<u32> {
    lookup_named(&CONDITIONS, name)
}

/// Condition prefix text; `None` for "always".
pub fn condition_name(code: u32) -> Option<&'static str> {
    match code & 0xF {
        COND_ALWAYS => None,
        c => Some(CONDITIONS[c as usize].0),
    }
}

pub fn modcz_code(name: &str) -> Option<u32> {
    lookup_named(&MODCZ_PARAMS, name)
}

pub fn modcz_name(code: u32) -> &'static str {
    MODCZ_PARAMS[(code & 0xF) as usize].0
}

pub const REGISTERS: [(&str, u32); 16] = [
    ("IJMP3", 0x1F0),
    ("IRET3", 0x1F1),
    ("IJMP2", 0x1F2),
    ("IRET2", 0x1F3),
    ("IJMP1", 0x1F4),
    ("IRET1", 0x1F5),
    ("PA", 0x1F6),
    ("PB", 0x1F7),
    ("PTRA", 0x1F8),
    ("PTRB", 0x1F9),
    ("DIRA", 0x1FA),
    ("DIRB", 0x1FB),
    ("OUTA", 0x1FC),
    ("OUTB", 0x1FD),
    ("INA", 0x1FE),
    ("INB", 0x1FF),
];

pub fn register_address(name: &str) -> Option<u32> {
    REGISTERS.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|&(_, a)| a)
}

pub const POINTER_REGS: [&str; 4] = ["PA", "PB", "PTRA", "PTRB"];

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Flags: u16 {
        const WC = 1 << 0;
        const WZ = 1 << 1;
        const WCZ = 1 << 2;
        const ANDC = 1 << 3;
        const ANDZ = 1 << 4;
        const ORC = 1 << 5;
        const ORZ = 1 << 6;
        const XORC = 1 << 7;
        const XORZ = 1 << 8;
    }
}

const C_FLAGS: Flags = Flags::WC.union(Flags::WCZ).union(Flags::ANDC).union(Flags::ORC).union(Flags::XORC);
const Z_FLAGS: Flags = Flags::WZ.union(Flags::WCZ).union(Flags::ANDZ).union(Flags::ORZ).union(Flags::XORZ);

impl Flags {
    /// Case-insensitive lookup of a single suffix such as `wcz`.
    pub fn parse_suffix(name: &str) -> Option<Flags> {
        Flags::from_name(&name.to_ascii_uppercase())
    }

    pub fn name(self) -> &'static str {
        Flags::all().iter_names().find(|(_, f)| *f == self).map_or("?", |(n, _)| n)
    }

    pub fn cz(self) -> (bool, bool) {
        (self.intersects(C_FLAGS), self.intersects(Z_FLAGS))
    }
}

/// Which suffixes an opcode accepts and whether one is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagRule {
    pub allowed: Flags,
    pub required: bool,
}

impl FlagRule {
    const fn opt(allowed: Flags) -> Self {
        Self { allowed, required: false }
    }

    const fn req(allowed: Flags) -> Self {
        Self { allowed, required: true }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    fn uses(&self) -> (bool, bool) {
        (self.allowed.intersects(C_FLAGS), self.allowed.intersects(Z_FLAGS))
    }

    fn projected(&self, c: bool, z: bool) -> (bool, bool) {
        let (uc, uz) = self.uses();
        (uc && c, uz && z)
    }

    pub fn suffix(&self, c: bool, z: bool) -> Option<Flags> {
        let want = self.projected(c, z);
        self.allowed.iter().find(|f| self.projected(f.cz().0, f.cz().1) == want && want != (false, false))
    }

    pub fn accepts(&self, c: bool, z: bool) -> bool {
        if self.is_empty() {
            return true;
        }
        let want = self.projected(c, z);
        (!self.required && want == (false, false)) || self.suffix(c, z).is_some()
    }

    /// Human readable list, e.g. "WC, WZ, or WCZ".
    pub fn legal_text(&self) -> String {
        let names: Vec<&str> = self.allowed.iter().map(Flags::name).collect();
        match names.as_slice() {
            [] => "allowed".to_string(),
            [one] => one.to_string(),
            [a, b] => format!("{a} or {b}"),
            [init @ .., last] => format!("{}, or {last}", init.join(", ")),
        }
    }
}

const NONE: FlagRule = FlagRule::opt(Flags::empty());
const OPT_CZ: FlagRule = FlagRule::opt(Flags::WC.union(Flags::WZ).union(Flags::WCZ));
const OPT_WCZ: FlagRule = FlagRule::opt(Flags::WCZ);
const OPT_WC: FlagRule = FlagRule::opt(Flags::WC);
const OPT_WZ: FlagRule = FlagRule::opt(Flags::WZ);
const REQ_CZ: FlagRule = FlagRule::req(Flags::WC.union(Flags::WZ).union(Flags::WCZ));
const REQ_W: FlagRule = FlagRule::req(Flags::WC.union(Flags::WZ));
const REQ_AND: FlagRule = FlagRule::req(Flags::ANDC.union(Flags::ANDZ));
const REQ_OR: FlagRule = FlagRule::req(Flags::ORC.union(Flags::ORZ));
const REQ_XOR: FlagRule = FlagRule::req(Flags::XORC.union(Flags::XORZ));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    Byte = 1,
    Word = 2,
    Long = 4,
}

impl Access {
    pub fn bytes(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Access::Byte => "Byte",
            Access::Word => "Word",
            Access::Long => "Long",
        }
    }
}

/// Operand layout of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    None,
    Ds,
    /// `D,{#}S/P`: S may be a PTRx expression.
    DsPtr(Access),
    /// `D,{#}S**`: an immediate S is a relative branch target.
    DsRel,
    /// `D,{#}S,#N` with an N field of the given width starting at bit 19.
    DsN(u8),
    LdS,
    LdSPtr(Access),
    LdSRel,
    S,
    SRel,
    D,
    /// `D` encoded as `D,D`.
    DDup,
    Ld,
    LzD,
    Flags,
    ModCz,
    ModC,
    ModZ,
    /// `#{\}A` 20 bit address.
    Abs20,
    /// `PA/PB/PTRA/PTRB,#{\}A`
    PtrAbs20,
    Aug,
}

impl Shape {
    pub fn syntax(self) -> &'static str {
        match self {
            Shape::None => "(none)",
            Shape::Ds | Shape::DsRel => "D,{#}S",
            Shape::DsPtr(_) => "D,{#}S/P",
            Shape::DsN(_) => "D,{#}S,#N",
            Shape::LdS | Shape::LdSRel => "{#}D,{#}S",
            Shape::LdSPtr(_) => "{#}D,{#}S/P",
            Shape::S | Shape::SRel => "{#}S",
            Shape::D | Shape::DDup => "D",
            Shape::Ld | Shape::LzD => "{#}D",
            Shape::Flags => "(flags only)",
            Shape::ModCz => "c,z",
            Shape::ModC => "c",
            Shape::ModZ => "z",
            Shape::Abs20 => "#{\\}A",
            Shape::PtrAbs20 => "PA/PB/PTRA/PTRB,#{\\}A",
            Shape::Aug => "#N",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Shape::None | Shape::Flags => 0,
            Shape::S | Shape::SRel | Shape::D | Shape::DDup | Shape::Ld | Shape::LzD => 1,
            Shape::ModC | Shape::ModZ | Shape::Abs20 | Shape::Aug => 1,
            Shape::DsN(_) => 3,
            _ => 2,
        }
    }

    pub fn n_bits(self) -> u32 {
        match self {
            Shape::DsN(bits) => bits as u32,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OpcodeDesc {
    pub mnemonic: &'static str,
    pub pattern: &'static str,
    pub bits: u32,
    pub mask: u32,
    pub shape: Shape,
    pub flags: FlagRule,
    pub brief: &'static str,
}

impl OpcodeDesc {
    pub fn conditional(&self) -> bool {
        self.mask & COND_MASK == 0
    }

    pub fn matches(&self, word: u32) -> bool {
        if word & self.mask != self.bits {
            return false;
        }
        if self.shape == Shape::DDup && (word >> D_SHIFT) & FIELD_MASK != word & FIELD_MASK {
            return false;
        }
        self.flags.accepts(word & C_BIT != 0, word & Z_BIT != 0)
    }
}

const fn parse_pattern(p: &str) -> (u32, u32) {
    let b = p.as_bytes();
    let (mut bits, mut mask, mut n, mut i) = (0u32, 0u32, 0, 0);
    while i < b.len() {
        let c = b[i];
        if c != b' ' {
            bits <<= 1;
            mask <<= 1;
            if c == b'0' {
                mask |= 1;
            } else if c == b'1' {
                mask |= 1;
                bits |= 1;
            }
            n += 1;
        }
        i += 1;
    }
    if n != 32 {
        panic!("opcode pattern must describe 32 bits");
    }
    (bits, mask)
}

const fn op(mnemonic: &'static str, pattern: &'static str, shape: Shape, flags: FlagRule, brief: &'static str) -> OpcodeDesc {
    let (bits, mask) = parse_pattern(pattern);
    OpcodeDesc { mnemonic, pattern, bits, mask, shape, flags, brief }
}

pub static OPCODES: &[OpcodeDesc] = &[
    op("NOP", "0000 0000000 000 000000000 000000000", Shape::None, NONE, "No operation."),
    op("ROR", "EEEE 0000000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Rotate right."),
    op("ROL", "EEEE 0000001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Rotate left."),
    op("SHR", "EEEE 0000010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Shift right."),
    op("SHL", "EEEE 0000011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Shift left."),
    op("RCR", "EEEE 0000100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Rotate carry right."),
    op("RCL", "EEEE 0000101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Rotate carry left."),
    op("SAR", "EEEE 0000110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Shift arithmetic right."),
    op("SAL", "EEEE 0000111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Shift arithmetic left."),
    op("ADD", "EEEE 0001000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Add S into D."),
    op("ADDX", "EEEE 0001001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Add (S + C) into D, extended."),
    op("ADDS", "EEEE 0001010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Add S into D, signed."),
    op("ADDSX", "EEEE 0001011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Add (S + C) into D, signed and extended."),
    op("SUB", "EEEE 0001100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Subtract S from D."),
    op("SUBX", "EEEE 0001101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Subtract (S + C) from D, extended."),
    op("SUBS", "EEEE 0001110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Subtract S from D, signed."),
    op("SUBSX", "EEEE 0001111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Subtract (S + C) from D, signed and extended."),
    op("CMP", "EEEE 0010000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare D to S."),
    op("CMPX", "EEEE 0010001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare D to (S + C), extended."),
    op("CMPS", "EEEE 0010010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare D to S, signed."),
    op("CMPSX", "EEEE 0010011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare D to (S + C), signed and extended."),
    op("CMPR", "EEEE 0010100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare S to D (reverse)."),
    op("CMPM", "EEEE 0010101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare D to S, get MSB of difference into C."),
    op("SUBR", "EEEE 0010110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Subtract D from S (reverse)."),
    op("CMPSUB", "EEEE 0010111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Compare and subtract S from D if D >= S."),
    op("FGE", "EEEE 0011000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Force D >= S."),
    op("FLE", "EEEE 0011001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Force D <= S."),
    op("FGES", "EEEE 0011010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Force D >= S, signed."),
    op("FLES", "EEEE 0011011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Force D <= S, signed."),
    op("SUMC", "EEEE 0011100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Sum +/-S into D by  C."),
    op("SUMNC", "EEEE 0011101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Sum +/-S into D by !C."),
    op("SUMZ", "EEEE 0011110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Sum +/-S into D by  Z."),
    op("SUMNZ", "EEEE 0011111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Sum +/-S into D by !Z."),
    op("TESTB", "EEEE 0100000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_W, "Test bit S[4:0] of  D, write to C/Z."),
    op("TESTBN", "EEEE 0100001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_W, "Test bit S[4:0] of !D, write to C/Z."),
    op("TESTB", "EEEE 0100010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_AND, "Test bit S[4:0] of  D, AND into C/Z."),
    op("TESTBN", "EEEE 0100011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_AND, "Test bit S[4:0] of !D, AND into C/Z."),
    op("TESTB", "EEEE 0100100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_OR, "Test bit S[4:0] of  D, OR  into C/Z."),
    op("TESTBN", "EEEE 0100101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_OR, "Test bit S[4:0] of !D, OR  into C/Z."),
    op("TESTB", "EEEE 0100110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_XOR, "Test bit S[4:0] of  D, XOR into C/Z."),
    op("TESTBN", "EEEE 0100111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, REQ_XOR, "Test bit S[4:0] of !D, XOR into C/Z."),
    op("BITL", "EEEE 0100000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = 0,    C,Z = D[S[4:0]]."),
    op("BITH", "EEEE 0100001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = 1,    C,Z = D[S[4:0]]."),
    op("BITC", "EEEE 0100010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = C,    C,Z = D[S[4:0]]."),
    op("BITNC", "EEEE 0100011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = !C,   C,Z = D[S[4:0]]."),
    op("BITZ", "EEEE 0100100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = Z,    C,Z = D[S[4:0]]."),
    op("BITNZ", "EEEE 0100101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = !Z,   C,Z = D[S[4:0]]."),
    op("BITRND", "EEEE 0100110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = RND,  C,Z = D[S[4:0]]."),
    op("BITNOT", "EEEE 0100111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WCZ, "Bit S[4:0] of D = !bit, C,Z = D[S[4:0]]."),
    op("AND", "EEEE 0101000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "AND S into D."),
    op("ANDN", "EEEE 0101001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "AND !S into D."),
    op("OR", "EEEE 0101010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "OR S into D."),
    op("XOR", "EEEE 0101011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "XOR S into D."),
    op("MUXC", "EEEE 0101100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Mux  C into each D bit that is '1' in S."),
    op("MUXNC", "EEEE 0101101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Mux !C into each D bit that is '1' in S."),
    op("MUXZ", "EEEE 0101110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Mux  Z into each D bit that is '1' in S."),
    op("MUXNZ", "EEEE 0101111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Mux !Z into each D bit that is '1' in S."),
    op("MOV", "EEEE 0110000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Move S into D."),
    op("NOT", "EEEE 0110001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Get !S into D."),
    op("ABS", "EEEE 0110010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Get absolute value of S into D."),
    op("NEG", "EEEE 0110011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Negate S into D."),
    op("NEGC", "EEEE 0110100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Negate S by  C into D."),
    op("NEGNC", "EEEE 0110101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Negate S by !C into D."),
    op("NEGZ", "EEEE 0110110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Negate S by  Z into D."),
    op("NEGNZ", "EEEE 0110111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Negate S by !Z into D."),
    op("INCMOD", "EEEE 0111000 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Increment with modulus."),
    op("DECMOD", "EEEE 0111001 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Decrement with modulus."),
    op("ZEROX", "EEEE 0111010 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Zero-extend D above bit S[4:0]."),
    op("SIGNX", "EEEE 0111011 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Sign-extend D from bit S[4:0]."),
    op("ENCOD", "EEEE 0111100 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Get bit position of top-most '1' in S into D."),
    op("ONES", "EEEE 0111101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Get number of '1's in S into D."),
    op("TEST", "EEEE 0111110 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Test D with S."),
    op("TESTN", "EEEE 0111111 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Test D with !S."),
    op("SETNIB", "EEEE 100000N NNI DDDDDDDDD SSSSSSSSS", Shape::DsN(3), NONE, "Set S[3:0] into nibble N in D, keeping rest of D same."),
    op("SETNIB", "EEEE 1000000 00I 000000000 SSSSSSSSS", Shape::S, NONE, "Set S[3:0] into nibble established by prior ALTSN instruction."),
    op("GETNIB", "EEEE 100001N NNI DDDDDDDDD SSSSSSSSS", Shape::DsN(3), NONE, "Get nibble N of S into D."),
    op("GETNIB", "EEEE 1000010 000 DDDDDDDDD 000000000", Shape::D, NONE, "Get nibble established by prior ALTGN instruction into D."),
    op("ROLNIB", "EEEE 100010N NNI DDDDDDDDD SSSSSSSSS", Shape::DsN(3), NONE, "Rotate-left nibble N of S into D."),
    op("ROLNIB", "EEEE 1000100 000 DDDDDDDDD 000000000", Shape::D, NONE, "Rotate-left nibble established by prior ALTGN instruction into D."),
    op("SETBYTE", "EEEE 1000110 NNI DDDDDDDDD SSSSSSSSS", Shape::DsN(2), NONE, "Set S[7:0] into byte N in D, keeping rest of D same."),
    op("SETBYTE", "EEEE 1000110 00I 000000000 SSSSSSSSS", Shape::S, NONE, "Set S[7:0] into byte established by prior ALTSB instruction."),
    op("GETBYTE", "EEEE 1000111 NNI DDDDDDDDD SSSSSSSSS", Shape::DsN(2), NONE, "Get byte N of S into D."),
    op("GETBYTE", "EEEE 1000111 000 DDDDDDDDD 000000000", Shape::D, NONE, "Get byte established by prior ALTGB instruction into D."),
    op("ROLBYTE", "EEEE 1001000 NNI DDDDDDDDD SSSSSSSSS", Shape::DsN(2), NONE, "Rotate-left byte N of S into D."),
    op("ROLBYTE", "EEEE 1001000 000 DDDDDDDDD 000000000", Shape::D, NONE, "Rotate-left byte established by prior ALTGB instruction into D."),
    op("SETWORD", "EEEE 1001001 0NI DDDDDDDDD SSSSSSSSS", Shape::DsN(1), NONE, "Set S[15:0] into word N in D, keeping rest of D same."),
    op("SETWORD", "EEEE 1001001 00I 000000000 SSSSSSSSS", Shape::S, NONE, "Set S[15:0] into word established by prior ALTSW instruction."),
    op("GETWORD", "EEEE 1001001 1NI DDDDDDDDD SSSSSSSSS", Shape::DsN(1), NONE, "Get word N of S into D."),
    op("GETWORD", "EEEE 1001001 100 DDDDDDDDD 000000000", Shape::D, NONE, "Get word established by prior ALTGW instruction into D."),
    op("ROLWORD", "EEEE 1001010 0NI DDDDDDDDD SSSSSSSSS", Shape::DsN(1), NONE, "Rotate-left word N of S into D."),
    op("ROLWORD", "EEEE 1001010 000 DDDDDDDDD 000000000", Shape::D, NONE, "Rotate-left word established by prior ALTGW instruction into D."),
    op("ALTSN", "EEEE 1001010 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter subsequent SETNIB instruction."),
    op("ALTSN", "EEEE 1001010 101 DDDDDDDDD 000000000", Shape::D, NONE, "Alter subsequent SETNIB instruction."),
    op("ALTGN", "EEEE 1001010 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter subsequent GETNIB/ROLNIB instruction."),
    op("ALTGN", "EEEE 1001010 111 DDDDDDDDD 000000000", Shape::D, NONE, "Alter subsequent GETNIB/ROLNIB instruction."),
    op("ALTSB", "EEEE 1001011 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter subsequent SETBYTE instruction."),
    op("ALTSB", "EEEE 1001011 001 DDDDDDDDD 000000000", Shape::D, NONE, "Alter subsequent SETBYTE instruction."),
    op("ALTGB", "EEEE 1001011 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter subsequent GETBYTE/ROLBYTE instruction."),
    op("ALTGB", "EEEE 1001011 011 DDDDDDDDD 000000000", Shape::D, NONE, "Alter subsequent GETBYTE/ROLBYTE instruction."),
    op("ALTSW", "EEEE 1001011 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter subsequent SETWORD instruction."),
    op("ALTSW", "EEEE 1001011 101 DDDDDDDDD 000000000", Shape::D, NONE, "Alter subsequent SETWORD instruction."),
    op("ALTGW", "EEEE 1001011 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter subsequent GETWORD/ROLWORD instruction."),
    op("ALTGW", "EEEE 1001011 111 DDDDDDDDD 000000000", Shape::D, NONE, "Alter subsequent GETWORD/ROLWORD instruction."),
    op("ALTR", "EEEE 1001100 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter result register address (normally D field) of next instruction to (D + S) & $1FF."),
    op("ALTR", "EEEE 1001100 001 DDDDDDDDD 000000000", Shape::D, NONE, "Alter result register address (normally D field) of next instruction to D[8:0]."),
    op("ALTD", "EEEE 1001100 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter D field of next instruction to (D + S) & $1FF."),
    op("ALTD", "EEEE 1001100 011 DDDDDDDDD 000000000", Shape::D, NONE, "Alter D field of next instruction to D[8:0]."),
    op("ALTS", "EEEE 1001100 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter S field of next instruction to (D + S) & $1FF."),
    op("ALTS", "EEEE 1001100 101 DDDDDDDDD 000000000", Shape::D, NONE, "Alter S field of next instruction to D[8:0]."),
    op("ALTB", "EEEE 1001100 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alter D field of next instruction to (D[13:5] + S) & $1FF."),
    op("ALTB", "EEEE 1001100 111 DDDDDDDDD 000000000", Shape::D, NONE, "Alter D field of next instruction to D[13:5]."),
    op("ALTI", "EEEE 1001101 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Substitute next instruction's I/R/D/S fields with fields from D, per S."),
    op("ALTI", "EEEE 1001101 001 DDDDDDDDD 101100100", Shape::D, NONE, "Execute D in place of next instruction."),
    op("SETR", "EEEE 1001101 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Set R field of D to S[8:0]."),
    op("SETD", "EEEE 1001101 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Set D field of D to S[8:0]."),
    op("SETS", "EEEE 1001101 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Set S field of D to S[8:0]."),
    op("DECOD", "EEEE 1001110 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Decode S[4:0] into D."),
    op("DECOD", "EEEE 1001110 000 DDDDDDDDD DDDDDDDDD", Shape::DDup, NONE, "Decode D[4:0] into D."),
    op("BMASK", "EEEE 1001110 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Get LSB-justified bit mask of size (S[4:0] + 1) into D."),
    op("BMASK", "EEEE 1001110 010 DDDDDDDDD DDDDDDDDD", Shape::DDup, NONE, "Get LSB-justified bit mask of size (D[4:0] + 1) into D."),
    op("CRCBIT", "EEEE 1001110 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Iterate CRC value in D using C and polynomial in S."),
    op("CRCNIB", "EEEE 1001110 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Iterate CRC value in D using Q[31:28] and polynomial in S."),
    op("MUXNITS", "EEEE 1001111 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "For each non-zero bit pair in S, copy that bit pair into the corresponding D bits, else leave that D bit pair the same."),
    op("MUXNIBS", "EEEE 1001111 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "For each non-zero nibble in S, copy that nibble into the corresponding D nibble, else leave that D nibble the same."),
    op("MUXQ", "EEEE 1001111 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Used after SETQ."),
    op("MOVBYTS", "EEEE 1001111 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Move bytes within D, per S."),
    op("MUL", "EEEE 1010000 0ZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WZ, "D = unsigned (D[15:0] * S[15:0])."),
    op("MULS", "EEEE 1010000 1ZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WZ, "D = signed (D[15:0] * S[15:0])."),
    op("SCA", "EEEE 1010001 0ZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WZ, "Next instruction's S value = unsigned (D[15:0] * S[15:0]) >> 16."),
    op("SCAS", "EEEE 1010001 1ZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WZ, "Next instruction's S value = signed (D[15:0] * S[15:0]) >> 14."),
    op("ADDPIX", "EEEE 1010010 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Add bytes of S into bytes of D, with $FF saturation."),
    op("MULPIX", "EEEE 1010010 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Multiply bytes of S into bytes of D, where $FF = 1."),
    op("BLNPIX", "EEEE 1010010 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Alpha-blend bytes of S into bytes of D, using SETPIV value."),
    op("MIXPIX", "EEEE 1010010 11I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Mix bytes of S into bytes of D, using SETPIX and SETPIV values."),
    op("ADDCT1", "EEEE 1010011 00I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Set CT1 event to trigger on CT = D + S."),
    op("ADDCT2", "EEEE 1010011 01I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Set CT2 event to trigger on CT = D + S."),
    op("ADDCT3", "EEEE 1010011 10I DDDDDDDDD SSSSSSSSS", Shape::Ds, NONE, "Set CT3 event to trigger on CT = D + S."),
    op("WMLONG", "EEEE 1010011 11I DDDDDDDDD SSSSSSSSS", Shape::DsPtr(Access::Long), NONE, "Write only non-$00 bytes in D[31:0] to hub address {#}S/PTRx."),
    op("RQPIN", "EEEE 1010100 C0I DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WC, "Read smart pin S[5:0] result \"Z\" into D, don't acknowledge smart pin (\"Q\" in RQPIN means \"quiet\")."),
    op("RDPIN", "EEEE 1010100 C1I DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_WC, "Read smart pin S[5:0] result \"Z\" into D, acknowledge smart pin."),
    op("RDLUT", "EEEE 1010101 CZI DDDDDDDDD SSSSSSSSS", Shape::Ds, OPT_CZ, "Read LUT data from address S[8:0] into D."),
    op("RDBYTE", "EEEE 1010110 CZI DDDDDDDDD SSSSSSSSS", Shape::DsPtr(Access::Byte), OPT_CZ, "Read zero-extended byte from hub address {#}S/PTRx into D."),
    op("RDWORD", "EEEE 1010111 CZI DDDDDDDDD SSSSSSSSS", Shape::DsPtr(Access::Word), OPT_CZ, "Read zero-extended word from hub address {#}S/PTRx into D."),
    op("RDLONG", "EEEE 1011000 CZI DDDDDDDDD SSSSSSSSS", Shape::DsPtr(Access::Long), OPT_CZ, "Read long from hub address {#}S/PTRx into D."),
    op("POPA", "EEEE 1011000 CZ1 DDDDDDDDD 101011111", Shape::D, OPT_CZ, "Read long from hub address --PTRA into D."),
    op("POPB", "EEEE 1011000 CZ1 DDDDDDDDD 111011111", Shape::D, OPT_CZ, "Read long from hub address --PTRB into D."),
    op("CALLD", "EEEE 1011001 CZI DDDDDDDDD SSSSSSSSS", Shape::DsRel, OPT_CZ, "Call to S** by writing {C, Z, 10'b0, PC[19:0]} to D."),
    op("RESI3", "EEEE 1011001 110 111110000 111110001", Shape::None, NONE, "Resume from INT3."),
    op("RESI2", "EEEE 1011001 110 111110010 111110011", Shape::None, NONE, "Resume from INT2."),
    op("RESI1", "EEEE 1011001 110 111110100 111110101", Shape::None, NONE, "Resume from INT1."),
    op("RESI0", "EEEE 1011001 110 111111110 111111111", Shape::None, NONE, "Resume from INT0."),
    op("RETI3", "EEEE 1011001 110 111111111 111110001", Shape::None, NONE, "Return from INT3."),
    op("RETI2", "EEEE 1011001 110 111111111 111110011", Shape::None, NONE, "Return from INT2."),
    op("RETI1", "EEEE 1011001 110 111111111 111110101", Shape::None, NONE, "Return from INT1."),
    op("RETI0", "EEEE 1011001 110 111111111 111111111", Shape::None, NONE, "Return from INT0."),
    op("CALLPA", "EEEE 1011010 0LI DDDDDDDDD SSSSSSSSS", Shape::LdSRel, NONE, "Call to S** by pushing {C, Z, 10'b0, PC[19:0]} onto stack, copy D to PA."),
    op("CALLPB", "EEEE 1011010 1LI DDDDDDDDD SSSSSSSSS", Shape::LdSRel, NONE, "Call to S** by pushing {C, Z, 10'b0, PC[19:0]} onto stack, copy D to PB."),
    op("DJZ", "EEEE 1011011 00I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Decrement D and jump to S** if result is zero."),
    op("DJNZ", "EEEE 1011011 01I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Decrement D and jump to S** if result is not zero."),
    op("DJF", "EEEE 1011011 10I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Decrement D and jump to S** if result is $FFFF_FFFF."),
    op("DJNF", "EEEE 1011011 11I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Decrement D and jump to S** if result is not $FFFF_FFFF."),
    op("IJZ", "EEEE 1011100 00I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Increment D and jump to S** if result is zero."),
    op("IJNZ", "EEEE 1011100 01I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Increment D and jump to S** if result is not zero."),
    op("TJZ", "EEEE 1011100 10I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D is zero."),
    op("TJNZ", "EEEE 1011100 11I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D is not zero."),
    op("TJF", "EEEE 1011101 00I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D is full (D = $FFFF_FFFF)."),
    op("TJNF", "EEEE 1011101 01I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D is not full (D != $FFFF_FFFF)."),
    op("TJS", "EEEE 1011101 10I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D is signed (D[31] = 1)."),
    op("TJNS", "EEEE 1011101 11I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D is not signed (D[31] = 0)."),
    op("TJV", "EEEE 1011110 00I DDDDDDDDD SSSSSSSSS", Shape::DsRel, NONE, "Test D and jump to S** if D overflowed (D[31] != C, C = 'correct sign' from last addition/subtraction)."),
    op("JINT", "EEEE 1011110 01I 000000000 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if INT event flag is set."),
    op("JCT1", "EEEE 1011110 01I 000000001 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if CT1 event flag is set."),
    op("JCT2", "EEEE 1011110 01I 000000010 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if CT2 event flag is set."),
    op("JCT3", "EEEE 1011110 01I 000000011 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if CT3 event flag is set."),
    op("JSE1", "EEEE 1011110 01I 000000100 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE1 event flag is set."),
    op("JSE2", "EEEE 1011110 01I 000000101 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE2 event flag is set."),
    op("JSE3", "EEEE 1011110 01I 000000110 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE3 event flag is set."),
    op("JSE4", "EEEE 1011110 01I 000000111 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE4 event flag is set."),
    op("JPAT", "EEEE 1011110 01I 000001000 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if PAT event flag is set."),
    op("JFBW", "EEEE 1011110 01I 000001001 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if FBW event flag is set."),
    op("JXMT", "EEEE 1011110 01I 000001010 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XMT event flag is set."),
    op("JXFI", "EEEE 1011110 01I 000001011 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XFI event flag is set."),
    op("JXRO", "EEEE 1011110 01I 000001100 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XRO event flag is set."),
    op("JXRL", "EEEE 1011110 01I 000001101 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XRL event flag is set."),
    op("JATN", "EEEE 1011110 01I 000001110 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if ATN event flag is set."),
    op("JQMT", "EEEE 1011110 01I 000001111 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if QMT event flag is set."),
    op("JNINT", "EEEE 1011110 01I 000010000 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if INT event flag is clear."),
    op("JNCT1", "EEEE 1011110 01I 000010001 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if CT1 event flag is clear."),
    op("JNCT2", "EEEE 1011110 01I 000010010 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if CT2 event flag is clear."),
    op("JNCT3", "EEEE 1011110 01I 000010011 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if CT3 event flag is clear."),
    op("JNSE1", "EEEE 1011110 01I 000010100 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE1 event flag is clear."),
    op("JNSE2", "EEEE 1011110 01I 000010101 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE2 event flag is clear."),
    op("JNSE3", "EEEE 1011110 01I 000010110 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE3 event flag is clear."),
    op("JNSE4", "EEEE 1011110 01I 000010111 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if SE4 event flag is clear."),
    op("JNPAT", "EEEE 1011110 01I 000011000 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if PAT event flag is clear."),
    op("JNFBW", "EEEE 1011110 01I 000011001 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if FBW event flag is clear."),
    op("JNXMT", "EEEE 1011110 01I 000011010 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XMT event flag is clear."),
    op("JNXFI", "EEEE 1011110 01I 000011011 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XFI event flag is clear."),
    op("JNXRO", "EEEE 1011110 01I 000011100 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XRO event flag is clear."),
    op("JNXRL", "EEEE 1011110 01I 000011101 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if XRL event flag is clear."),
    op("JNATN", "EEEE 1011110 01I 000011110 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if ATN event flag is clear."),
    op("JNQMT", "EEEE 1011110 01I 000011111 SSSSSSSSS", Shape::SRel, NONE, "Jump to S** if QMT event flag is clear."),
    op("SETPAT", "EEEE 1011111 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Set pin pattern for PAT event."),
    op("WRPIN", "EEEE 1100000 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Write D to mode register of smart pin S[5:0], acknowledge smart pin."),
    op("AKPIN", "EEEE 1100000 01I 000000001 SSSSSSSSS", Shape::S, NONE, "Acknowledge smart pin S[5:0]."),
    op("WXPIN", "EEEE 1100000 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Write D to parameter \"X\" of smart pin S[5:0], acknowledge smart pin."),
    op("WYPIN", "EEEE 1100001 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Write D to parameter \"Y\" of smart pin S[5:0], acknowledge smart pin."),
    op("WRLUT", "EEEE 1100001 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Write D to LUT address S[8:0]."),
    op("WRBYTE", "EEEE 1100010 0LI DDDDDDDDD SSSSSSSSS", Shape::LdSPtr(Access::Byte), NONE, "Write byte in D[7:0] to hub address {#}S/PTRx."),
    op("WRWORD", "EEEE 1100010 1LI DDDDDDDDD SSSSSSSSS", Shape::LdSPtr(Access::Word), NONE, "Write word in D[15:0] to hub address {#}S/PTRx."),
    op("WRLONG", "EEEE 1100011 0LI DDDDDDDDD SSSSSSSSS", Shape::LdSPtr(Access::Long), NONE, "Write long in D[31:0] to hub address {#}S/PTRx."),
    op("PUSHA", "EEEE 1100011 0L1 DDDDDDDDD 101100001", Shape::LzD, NONE, "Write long in D[31:0] to hub address PTRA++."),
    op("PUSHB", "EEEE 1100011 0L1 DDDDDDDDD 111100001", Shape::LzD, NONE, "Write long in D[31:0] to hub address PTRB++."),
    op("RDFAST", "EEEE 1100011 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin new fast hub read via FIFO."),
    op("WRFAST", "EEEE 1100100 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin new fast hub write via FIFO."),
    op("FBLOCK", "EEEE 1100100 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Set next block for when block wraps."),
    op("XINIT", "EEEE 1100101 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Issue streamer command immediately, zeroing phase."),
    op("XSTOP", "EEEE 1100101 011 000000000 000000000", Shape::None, NONE, "Stop streamer immediately."),
    op("XZERO", "EEEE 1100101 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Buffer new streamer command to be issued on final NCO rollover of current command, zeroing phase."),
    op("XCONT", "EEEE 1100110 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Buffer new streamer command to be issued on final NCO rollover of current command, continuing phase."),
    op("REP", "EEEE 1100110 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Execute next D[8:0] instructions S times."),
    op("COGINIT", "EEEE 1100111 CLI DDDDDDDDD SSSSSSSSS", Shape::LdS, OPT_WC, "Start cog selected by D."),
    op("QMUL", "EEEE 1101000 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin CORDIC unsigned multiplication of D * S."),
    op("QDIV", "EEEE 1101000 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin CORDIC unsigned division of {SETQ value or 32'b0, D} / S."),
    op("QFRAC", "EEEE 1101001 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin CORDIC unsigned division of {D, SETQ value or 32'b0} / S."),
    op("QSQRT", "EEEE 1101001 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin CORDIC square root of {S, D}."),
    op("QROTATE", "EEEE 1101010 0LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin CORDIC rotation of point (D, SETQ value or 32'b0) by angle S."),
    op("QVECTOR", "EEEE 1101010 1LI DDDDDDDDD SSSSSSSSS", Shape::LdS, NONE, "Begin CORDIC vectoring of point (D, S)."),
    op("HUBSET", "EEEE 1101011 00L DDDDDDDDD 000000000", Shape::Ld, NONE, "Set hub configuration to D."),
    op("COGID", "EEEE 1101011 C0L DDDDDDDDD 000000001", Shape::Ld, OPT_WC, "If D is register and no WC, get cog ID (0 to 15) into D."),
    op("COGSTOP", "EEEE 1101011 00L DDDDDDDDD 000000011", Shape::Ld, NONE, "Stop cog D[3:0]."),
    op("LOCKNEW", "EEEE 1101011 C00 DDDDDDDDD 000000100", Shape::D, OPT_WC, "Request a LOCK."),
    op("LOCKRET", "EEEE 1101011 00L DDDDDDDDD 000000101", Shape::Ld, NONE, "Return LOCK D[3:0] for reallocation."),
    op("LOCKTRY", "EEEE 1101011 C0L DDDDDDDDD 000000110", Shape::Ld, OPT_WC, "Try to get LOCK D[3:0]."),
    op("LOCKREL", "EEEE 1101011 C0L DDDDDDDDD 000000111", Shape::Ld, OPT_WC, "Release LOCK D[3:0]."),
    op("QLOG", "EEEE 1101011 00L DDDDDDDDD 000001110", Shape::Ld, NONE, "Begin CORDIC number-to-logarithm conversion of D."),
    op("QEXP", "EEEE 1101011 00L DDDDDDDDD 000001111", Shape::Ld, NONE, "Begin CORDIC logarithm-to-number conversion of D."),
    op("RFBYTE", "EEEE 1101011 CZ0 DDDDDDDDD 000010000", Shape::D, OPT_CZ, "Used after RDFAST."),
    op("RFWORD", "EEEE 1101011 CZ0 DDDDDDDDD 000010001", Shape::D, OPT_CZ, "Used after RDFAST."),
    op("RFLONG", "EEEE 1101011 CZ0 DDDDDDDDD 000010010", Shape::D, OPT_CZ, "Used after RDFAST."),
    op("RFVAR", "EEEE 1101011 CZ0 DDDDDDDDD 000010011", Shape::D, OPT_CZ, "Used after RDFAST."),
    op("RFVARS", "EEEE 1101011 CZ0 DDDDDDDDD 000010100", Shape::D, OPT_CZ, "Used after RDFAST."),
    op("WFBYTE", "EEEE 1101011 00L DDDDDDDDD 000010101", Shape::Ld, NONE, "Used after WRFAST."),
    op("WFWORD", "EEEE 1101011 00L DDDDDDDDD 000010110", Shape::Ld, NONE, "Used after WRFAST."),
    op("WFLONG", "EEEE 1101011 00L DDDDDDDDD 000010111", Shape::Ld, NONE, "Used after WRFAST."),
    op("GETQX", "EEEE 1101011 CZ0 DDDDDDDDD 000011000", Shape::D, OPT_CZ, "Retrieve CORDIC result X into D."),
    op("GETQY", "EEEE 1101011 CZ0 DDDDDDDDD 000011001", Shape::D, OPT_CZ, "Retrieve CORDIC result Y into D."),
    op("GETCT", "EEEE 1101011 000 DDDDDDDDD 000011010", Shape::D, NONE, "Get CT into D."),
    op("GETRND", "EEEE 1101011 CZ0 DDDDDDDDD 000011011", Shape::D, OPT_CZ, "Get RND into D/C/Z."),
    op("GETRND", "EEEE 1101011 CZ1 000000000 000011011", Shape::Flags, REQ_CZ, "Get RND into C/Z."),
    op("SETDACS", "EEEE 1101011 00L DDDDDDDDD 000011100", Shape::Ld, NONE, "DAC3 = D[31:24], DAC2 = D[23:16], DAC1 = D[15:8], DAC0 = D[7:0]."),
    op("SETXFRQ", "EEEE 1101011 00L DDDDDDDDD 000011101", Shape::Ld, NONE, "Set streamer NCO frequency to D."),
    op("GETXACC", "EEEE 1101011 000 DDDDDDDDD 000011110", Shape::D, NONE, "Get the streamer's Goertzel X accumulator into D and the Y accumulator into the next instruction's S, clear accumulators."),
    op("WAITX", "EEEE 1101011 CZL DDDDDDDDD 000011111", Shape::Ld, OPT_CZ, "Wait 2 + D clocks if no WC/WZ/WCZ."),
    op("SETSE1", "EEEE 1101011 00L DDDDDDDDD 000100000", Shape::Ld, NONE, "Set SE1 event configuration to D[8:0]."),
    op("SETSE2", "EEEE 1101011 00L DDDDDDDDD 000100001", Shape::Ld, NONE, "Set SE2 event configuration to D[8:0]."),
    op("SETSE3", "EEEE 1101011 00L DDDDDDDDD 000100010", Shape::Ld, NONE, "Set SE3 event configuration to D[8:0]."),
    op("SETSE4", "EEEE 1101011 00L DDDDDDDDD 000100011", Shape::Ld, NONE, "Set SE4 event configuration to D[8:0]."),
    op("POLLINT", "EEEE 1101011 CZ0 000000000 000100100", Shape::Flags, OPT_CZ, "Get INT event flag into C/Z, then clear it."),
    op("POLLCT1", "EEEE 1101011 CZ0 000000001 000100100", Shape::Flags, OPT_CZ, "Get CT1 event flag into C/Z, then clear it."),
    op("POLLCT2", "EEEE 1101011 CZ0 000000010 000100100", Shape::Flags, OPT_CZ, "Get CT2 event flag into C/Z, then clear it."),
    op("POLLCT3", "EEEE 1101011 CZ0 000000011 000100100", Shape::Flags, OPT_CZ, "Get CT3 event flag into C/Z, then clear it."),
    op("POLLSE1", "EEEE 1101011 CZ0 000000100 000100100", Shape::Flags, OPT_CZ, "Get SE1 event flag into C/Z, then clear it."),
    op("POLLSE2", "EEEE 1101011 CZ0 000000101 000100100", Shape::Flags, OPT_CZ, "Get SE2 event flag into C/Z, then clear it."),
    op("POLLSE3", "EEEE 1101011 CZ0 000000110 000100100", Shape::Flags, OPT_CZ, "Get SE3 event flag into C/Z, then clear it."),
    op("POLLSE4", "EEEE 1101011 CZ0 000000111 000100100", Shape::Flags, OPT_CZ, "Get SE4 event flag into C/Z, then clear it."),
    op("POLLPAT", "EEEE 1101011 CZ0 000001000 000100100", Shape::Flags, OPT_CZ, "Get PAT event flag into C/Z, then clear it."),
    op("POLLFBW", "EEEE 1101011 CZ0 000001001 000100100", Shape::Flags, OPT_CZ, "Get FBW event flag into C/Z, then clear it."),
    op("POLLXMT", "EEEE 1101011 CZ0 000001010 000100100", Shape::Flags, OPT_CZ, "Get XMT event flag into C/Z, then clear it."),
    op("POLLXFI", "EEEE 1101011 CZ0 000001011 000100100", Shape::Flags, OPT_CZ, "Get XFI event flag into C/Z, then clear it."),
    op("POLLXRO", "EEEE 1101011 CZ0 000001100 000100100", Shape::Flags, OPT_CZ, "Get XRO event flag into C/Z, then clear it."),
    op("POLLXRL", "EEEE 1101011 CZ0 000001101 000100100", Shape::Flags, OPT_CZ, "Get XRL event flag into C/Z, then clear it."),
    op("POLLATN", "EEEE 1101011 CZ0 000001110 000100100", Shape::Flags, OPT_CZ, "Get ATN event flag into C/Z, then clear it."),
    op("POLLQMT", "EEEE 1101011 CZ0 000001111 000100100", Shape::Flags, OPT_CZ, "Get QMT event flag into C/Z, then clear it."),
    op("WAITINT", "EEEE 1101011 CZ0 000010000 000100100", Shape::Flags, OPT_CZ, "Wait for INT event flag, then clear it."),
    op("WAITCT1", "EEEE 1101011 CZ0 000010001 000100100", Shape::Flags, OPT_CZ, "Wait for CT1 event flag, then clear it."),
    op("WAITCT2", "EEEE 1101011 CZ0 000010010 000100100", Shape::Flags, OPT_CZ, "Wait for CT2 event flag, then clear it."),
    op("WAITCT3", "EEEE 1101011 CZ0 000010011 000100100", Shape::Flags, OPT_CZ, "Wait for CT3 event flag, then clear it."),
    op("WAITSE1", "EEEE 1101011 CZ0 000010100 000100100", Shape::Flags, OPT_CZ, "Wait for SE1 event flag, then clear it."),
    op("WAITSE2", "EEEE 1101011 CZ0 000010101 000100100", Shape::Flags, OPT_CZ, "Wait for SE2 event flag, then clear it."),
    op("WAITSE3", "EEEE 1101011 CZ0 000010110 000100100", Shape::Flags, OPT_CZ, "Wait for SE3 event flag, then clear it."),
    op("WAITSE4", "EEEE 1101011 CZ0 000010111 000100100", Shape::Flags, OPT_CZ, "Wait for SE4 event flag, then clear it."),
    op("WAITPAT", "EEEE 1101011 CZ0 000011000 000100100", Shape::Flags, OPT_CZ, "Wait for PAT event flag, then clear it."),
    op("WAITFBW", "EEEE 1101011 CZ0 000011001 000100100", Shape::Flags, OPT_CZ, "Wait for FBW event flag, then clear it."),
    op("WAITXMT", "EEEE 1101011 CZ0 000011010 000100100", Shape::Flags, OPT_CZ, "Wait for XMT event flag, then clear it."),
    op("WAITXFI", "EEEE 1101011 CZ0 000011011 000100100", Shape::Flags, OPT_CZ, "Wait for XFI event flag, then clear it."),
    op("WAITXRO", "EEEE 1101011 CZ0 000011100 000100100", Shape::Flags, OPT_CZ, "Wait for XRO event flag, then clear it."),
    op("WAITXRL", "EEEE 1101011 CZ0 000011101 000100100", Shape::Flags, OPT_CZ, "Wait for XRL event flag, then clear it."),
    op("WAITATN", "EEEE 1101011 CZ0 000011110 000100100", Shape::Flags, OPT_CZ, "Wait for ATN event flag, then clear it."),
    op("ALLOWI", "EEEE 1101011 000 000100000 000100100", Shape::None, NONE, "Allow interrupts (default)."),
    op("STALLI", "EEEE 1101011 000 000100001 000100100", Shape::None, NONE, "Stall Interrupts."),
    op("TRGINT1", "EEEE 1101011 000 000100010 000100100", Shape::None, NONE, "Trigger INT1, regardless of STALLI mode."),
    op("TRGINT2", "EEEE 1101011 000 000100011 000100100", Shape::None, NONE, "Trigger INT2, regardless of STALLI mode."),
    op("TRGINT3", "EEEE 1101011 000 000100100 000100100", Shape::None, NONE, "Trigger INT3, regardless of STALLI mode."),
    op("NIXINT1", "EEEE 1101011 000 000100101 000100100", Shape::None, NONE, "Cancel INT1."),
    op("NIXINT2", "EEEE 1101011 000 000100110 000100100", Shape::None, NONE, "Cancel INT2."),
    op("NIXINT3", "EEEE 1101011 000 000100111 000100100", Shape::None, NONE, "Cancel INT3."),
    op("SETINT1", "EEEE 1101011 00L DDDDDDDDD 000100101", Shape::Ld, NONE, "Set INT1 source to D[3:0]."),
    op("SETINT2", "EEEE 1101011 00L DDDDDDDDD 000100110", Shape::Ld, NONE, "Set INT2 source to D[3:0]."),
    op("SETINT3", "EEEE 1101011 00L DDDDDDDDD 000100111", Shape::Ld, NONE, "Set INT3 source to D[3:0]."),
    op("SETQ", "EEEE 1101011 00L DDDDDDDDD 000101000", Shape::Ld, NONE, "Set Q to D."),
    op("SETQ2", "EEEE 1101011 00L DDDDDDDDD 000101001", Shape::Ld, NONE, "Set Q to D."),
    op("PUSH", "EEEE 1101011 00L DDDDDDDDD 000101010", Shape::Ld, NONE, "Push D onto stack."),
    op("POP", "EEEE 1101011 CZ0 DDDDDDDDD 000101011", Shape::D, OPT_CZ, "Pop stack (K)."),
    op("JMP", "EEEE 1101011 CZ0 DDDDDDDDD 000101100", Shape::D, OPT_CZ, "Jump to D."),
    op("CALL", "EEEE 1101011 CZ0 DDDDDDDDD 000101101", Shape::D, OPT_CZ, "Call to D by pushing {C, Z, 10'b0, PC[19:0]} onto stack."),
    op("RET", "EEEE 1101011 CZ1 000000000 000101101", Shape::Flags, OPT_CZ, "Return by popping stack (K)."),
    op("CALLA", "EEEE 1101011 CZ0 DDDDDDDDD 000101110", Shape::D, OPT_CZ, "Call to D by writing {C, Z, 10'b0, PC[19:0]} to hub long at PTRA++."),
    op("RETA", "EEEE 1101011 CZ1 000000000 000101110", Shape::Flags, OPT_CZ, "Return by reading hub long (L) at --PTRA."),
    op("CALLB", "EEEE 1101011 CZ0 DDDDDDDDD 000101111", Shape::D, OPT_CZ, "Call to D by writing {C, Z, 10'b0, PC[19:0]} to hub long at PTRB++."),
    op("RETB", "EEEE 1101011 CZ1 000000000 000101111", Shape::Flags, OPT_CZ, "Return by reading hub long (L) at --PTRB."),
    op("JMPREL", "EEEE 1101011 00L DDDDDDDDD 000110000", Shape::Ld, NONE, "Jump ahead/back by D instructions."),
    op("SKIP", "EEEE 1101011 00L DDDDDDDDD 000110001", Shape::Ld, NONE, "Skip instructions per D."),
    op("SKIPF", "EEEE 1101011 00L DDDDDDDDD 000110010", Shape::Ld, NONE, "Skip cog/LUT instructions fast per D."),
    op("EXECF", "EEEE 1101011 00L DDDDDDDDD 000110011", Shape::Ld, NONE, "Jump to D[9:0] in cog/LUT and set SKIPF pattern to D[31:10]."),
    op("GETPTR", "EEEE 1101011 000 DDDDDDDDD 000110100", Shape::D, NONE, "Get current FIFO hub pointer into D."),
    op("GETBRK", "EEEE 1101011 CZ0 DDDDDDDDD 000110101", Shape::D, REQ_CZ, "Get breakpoint status into D according to WC/WZ/WCZ."),
    op("COGBRK", "EEEE 1101011 00L DDDDDDDDD 000110101", Shape::Ld, NONE, "If in debug ISR, trigger asynchronous breakpoint in cog D[3:0]."),
    op("BRK", "EEEE 1101011 00L DDDDDDDDD 000110110", Shape::Ld, NONE, "If in debug ISR, set next break condition to D."),
    op("SETLUTS", "EEEE 1101011 00L DDDDDDDDD 000110111", Shape::Ld, NONE, "If D[0] = 1 then enable LUT sharing, where LUT writes within the adjacent odd/even companion cog are copied to this LUT."),
    op("SETCY", "EEEE 1101011 00L DDDDDDDDD 000111000", Shape::Ld, NONE, "Set the colorspace converter \"CY\" parameter to D[31:0]."),
    op("SETCI", "EEEE 1101011 00L DDDDDDDDD 000111001", Shape::Ld, NONE, "Set the colorspace converter \"CI\" parameter to D[31:0]."),
    op("SETCQ", "EEEE 1101011 00L DDDDDDDDD 000111010", Shape::Ld, NONE, "Set the colorspace converter \"CQ\" parameter to D[31:0]."),
    op("SETCFRQ", "EEEE 1101011 00L DDDDDDDDD 000111011", Shape::Ld, NONE, "Set the colorspace converter \"CFRQ\" parameter to D[31:0]."),
    op("SETCMOD", "EEEE 1101011 00L DDDDDDDDD 000111100", Shape::Ld, NONE, "Set the colorspace converter \"CMOD\" parameter to D[6:0]."),
    op("SETPIV", "EEEE 1101011 00L DDDDDDDDD 000111101", Shape::Ld, NONE, "Set BLNPIX/MIXPIX blend factor to D[7:0]."),
    op("SETPIX", "EEEE 1101011 00L DDDDDDDDD 000111110", Shape::Ld, NONE, "Set MIXPIX mode to D[5:0]."),
    op("COGATN", "EEEE 1101011 00L DDDDDDDDD 000111111", Shape::Ld, NONE, "Strobe \"attention\" of all cogs whose corresponging bits are high in D[15:0]."),
    op("TESTP", "EEEE 1101011 CZL DDDDDDDDD 001000000", Shape::Ld, REQ_W, "Test  IN bit of pin D[5:0], write to C/Z."),
    op("TESTPN", "EEEE 1101011 CZL DDDDDDDDD 001000001", Shape::Ld, REQ_W, "Test !IN bit of pin D[5:0], write to C/Z."),
    op("TESTP", "EEEE 1101011 CZL DDDDDDDDD 001000010", Shape::Ld, REQ_AND, "Test  IN bit of pin D[5:0], AND into C/Z."),
    op("TESTPN", "EEEE 1101011 CZL DDDDDDDDD 001000011", Shape::Ld, REQ_AND, "Test !IN bit of pin D[5:0], AND into C/Z."),
    op("TESTP", "EEEE 1101011 CZL DDDDDDDDD 001000100", Shape::Ld, REQ_OR, "Test  IN bit of pin D[5:0], OR  into C/Z."),
    op("TESTPN", "EEEE 1101011 CZL DDDDDDDDD 001000101", Shape::Ld, REQ_OR, "Test !IN bit of pin D[5:0], OR  into C/Z."),
    op("TESTP", "EEEE 1101011 CZL DDDDDDDDD 001000110", Shape::Ld, REQ_XOR, "Test  IN bit of pin D[5:0], XOR into C/Z."),
    op("TESTPN", "EEEE 1101011 CZL DDDDDDDDD 001000111", Shape::Ld, REQ_XOR, "Test !IN bit of pin D[5:0], XOR into C/Z."),
    op("DIRL", "EEEE 1101011 CZL DDDDDDDDD 001000000", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = 0."),
    op("DIRH", "EEEE 1101011 CZL DDDDDDDDD 001000001", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = 1."),
    op("DIRC", "EEEE 1101011 CZL DDDDDDDDD 001000010", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = C."),
    op("DIRNC", "EEEE 1101011 CZL DDDDDDDDD 001000011", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = !C."),
    op("DIRZ", "EEEE 1101011 CZL DDDDDDDDD 001000100", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = Z."),
    op("DIRNZ", "EEEE 1101011 CZL DDDDDDDDD 001000101", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = !Z."),
    op("DIRRND", "EEEE 1101011 CZL DDDDDDDDD 001000110", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = RND."),
    op("DIRNOT", "EEEE 1101011 CZL DDDDDDDDD 001000111", Shape::Ld, OPT_WCZ, "DIR bit of pin D[5:0] = !bit."),
    op("OUTL", "EEEE 1101011 CZL DDDDDDDDD 001001000", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = 0."),
    op("OUTH", "EEEE 1101011 CZL DDDDDDDDD 001001001", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = 1."),
    op("OUTC", "EEEE 1101011 CZL DDDDDDDDD 001001010", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = C."),
    op("OUTNC", "EEEE 1101011 CZL DDDDDDDDD 001001011", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !C."),
    op("OUTZ", "EEEE 1101011 CZL DDDDDDDDD 001001100", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = Z."),
    op("OUTNZ", "EEEE 1101011 CZL DDDDDDDDD 001001101", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !Z."),
    op("OUTRND", "EEEE 1101011 CZL DDDDDDDDD 001001110", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = RND."),
    op("OUTNOT", "EEEE 1101011 CZL DDDDDDDDD 001001111", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !bit."),
    op("FLTL", "EEEE 1101011 CZL DDDDDDDDD 001010000", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = 0."),
    op("FLTH", "EEEE 1101011 CZL DDDDDDDDD 001010001", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = 1."),
    op("FLTC", "EEEE 1101011 CZL DDDDDDDDD 001010010", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = C."),
    op("FLTNC", "EEEE 1101011 CZL DDDDDDDDD 001010011", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !C."),
    op("FLTZ", "EEEE 1101011 CZL DDDDDDDDD 001010100", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = Z."),
    op("FLTNZ", "EEEE 1101011 CZL DDDDDDDDD 001010101", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !Z."),
    op("FLTRND", "EEEE 1101011 CZL DDDDDDDDD 001010110", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = RND."),
    op("FLTNOT", "EEEE 1101011 CZL DDDDDDDDD 001010111", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !bit."),
    op("DRVL", "EEEE 1101011 CZL DDDDDDDDD 001011000", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = 0."),
    op("DRVH", "EEEE 1101011 CZL DDDDDDDDD 001011001", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = 1."),
    op("DRVC", "EEEE 1101011 CZL DDDDDDDDD 001011010", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = C."),
    op("DRVNC", "EEEE 1101011 CZL DDDDDDDDD 001011011", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !C."),
    op("DRVZ", "EEEE 1101011 CZL DDDDDDDDD 001011100", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = Z."),
    op("DRVNZ", "EEEE 1101011 CZL DDDDDDDDD 001011101", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !Z."),
    op("DRVRND", "EEEE 1101011 CZL DDDDDDDDD 001011110", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = RND."),
    op("DRVNOT", "EEEE 1101011 CZL DDDDDDDDD 001011111", Shape::Ld, OPT_WCZ, "OUT bit of pin D[5:0] = !bit."),
    op("SPLITB", "EEEE 1101011 000 DDDDDDDDD 001100000", Shape::D, NONE, "Split every 4th bit of S into bytes of D."),
    op("MERGEB", "EEEE 1101011 000 DDDDDDDDD 001100001", Shape::D, NONE, "Merge bits of bytes in S into D."),
    op("SPLITW", "EEEE 1101011 000 DDDDDDDDD 001100010", Shape::D, NONE, "Split bits of S into words of D."),
    op("MERGEW", "EEEE 1101011 000 DDDDDDDDD 001100011", Shape::D, NONE, "Merge bits of words in S into D."),
    op("SEUSSF", "EEEE 1101011 000 DDDDDDDDD 001100100", Shape::D, NONE, "Relocate and periodically invert bits from S into D."),
    op("SEUSSR", "EEEE 1101011 000 DDDDDDDDD 001100101", Shape::D, NONE, "Relocate and periodically invert bits from S into D."),
    op("RGBSQZ", "EEEE 1101011 000 DDDDDDDDD 001100110", Shape::D, NONE, "Squeeze 8:8:8 RGB value in S[31:8] into 5:6:5 value in D[15:0]."),
    op("RGBEXP", "EEEE 1101011 000 DDDDDDDDD 001100111", Shape::D, NONE, "Expand 5:6:5 RGB value in S[15:0] into 8:8:8 value in D[31:8]."),
    op("XORO32", "EEEE 1101011 000 DDDDDDDDD 001101000", Shape::D, NONE, "Iterate D with xoroshiro32+ PRNG algorithm and put PRNG result into next instruction's S."),
    op("REV", "EEEE 1101011 000 DDDDDDDDD 001101001", Shape::D, NONE, "Reverse D bits."),
    op("RCZR", "EEEE 1101011 CZ0 DDDDDDDDD 001101010", Shape::D, OPT_CZ, "Rotate C,Z right through D."),
    op("RCZL", "EEEE 1101011 CZ0 DDDDDDDDD 001101011", Shape::D, OPT_CZ, "Rotate C,Z left through D."),
    op("WRC", "EEEE 1101011 000 DDDDDDDDD 001101100", Shape::D, NONE, "Write 0 or 1 to D, according to  C."),
    op("WRNC", "EEEE 1101011 000 DDDDDDDDD 001101101", Shape::D, NONE, "Write 0 or 1 to D, according to !C."),
    op("WRZ", "EEEE 1101011 000 DDDDDDDDD 001101110", Shape::D, NONE, "Write 0 or 1 to D, according to  Z."),
    op("WRNZ", "EEEE 1101011 000 DDDDDDDDD 001101111", Shape::D, NONE, "Write 0 or 1 to D, according to !Z."),
    op("MODCZ", "EEEE 1101011 CZ1 0cccczzzz 001101111", Shape::ModCz, OPT_CZ, "Modify C and Z according to cccc and zzzz."),
    op("MODC", "EEEE 1101011 CZ1 0cccc0000 001101111", Shape::ModC, OPT_CZ, "Modify C according to cccc."),
    op("MODZ", "EEEE 1101011 CZ1 00000zzzz 001101111", Shape::ModZ, OPT_CZ, "Modify Z according to zzzz."),
    op("SETSCP", "EEEE 1101011 00L DDDDDDDDD 001110000", Shape::Ld, NONE, "Set four-channel oscilloscope enable to D[6] and set input pin base to D[5:2]."),
    op("GETSCP", "EEEE 1101011 000 DDDDDDDDD 001110001", Shape::D, NONE, "Get four-channel oscilloscope samples into D."),
    op("JMP", "EEEE 1101100 RAA AAAAAAAAA AAAAAAAAA", Shape::Abs20, NONE, "Jump to A."),
    op("CALL", "EEEE 1101101 RAA AAAAAAAAA AAAAAAAAA", Shape::Abs20, NONE, "Call to A by pushing {C, Z, 10'b0, PC[19:0]} onto stack."),
    op("CALLA", "EEEE 1101110 RAA AAAAAAAAA AAAAAAAAA", Shape::Abs20, NONE, "Call to A by writing {C, Z, 10'b0, PC[19:0]} to hub long at PTRA++."),
    op("CALLB", "EEEE 1101111 RAA AAAAAAAAA AAAAAAAAA", Shape::Abs20, NONE, "Call to A by writing {C, Z, 10'b0, PC[19:0]} to hub long at PTRB++."),
    op("CALLD", "EEEE 11100WW RAA AAAAAAAAA AAAAAAAAA", Shape::PtrAbs20, NONE, "Call to A by writing {C, Z, 10'b0, PC[19:0]} to PA/PB/PTRA/PTRB (per W)."),
    op("LOC", "EEEE 11101WW RAA AAAAAAAAA AAAAAAAAA", Shape::PtrAbs20, NONE, "Get {12'b0, address[19:0]} into PA/PB/PTRA/PTRB (per W)."),
    op("AUGS", "EEEE 11110NN NNN NNNNNNNNN NNNNNNNNN", Shape::Aug, NONE, "Queue #N[31:9] to be used as upper 23 bits for next #S occurrence, so that the next 9-bit #S will be augmented to 32 bits."),
    op("AUGD", "EEEE 11111NN NNN NNNNNNNNN NNNNNNNNN", Shape::Aug, NONE, "Queue #N[31:9] to be used as upper 23 bits for next #D occurrence, so that the next 9-bit #D will be augmented to 32 bits."),
];

/// Descriptor indices ordered for decoding: most fixed bits first, table
/// order among equals.
pub fn decode_order() -> &'static [usize] {
    static ORDER: OnceLock<Vec<usize>> = OnceLock::new();
    ORDER.get_or_init(|| {
        let mut v: Vec<usize> = (0..OPCODES.len()).collect();
        v.sort_by_key(|&i| std::cmp::Reverse(OPCODES[i].mask.count_ones()));
        v
    })
}

pub fn by_mnemonic(name: &str) -> &'static [&'static OpcodeDesc] {
    static INDEX: OnceLock<HashMap<&'static str, Vec<&'static OpcodeDesc>>> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        let mut m: HashMap<&'static str, Vec<&'static OpcodeDesc>> = HashMap::new();
        for d in OPCODES {
            m.entry(d.mnemonic).or_default().push(d);
        }
        m
    });
    index.get(name.to_ascii_uppercase().as_str()).map(Vec::as_slice).unwrap_or(&[])
}

pub fn is_mnemonic(name: &str) -> bool {
    !by_mnemonic(name).is_empty()
}

pub fn find(word: u32) -> Option<&'static OpcodeDesc> {
    decode_order().iter().map(|&i| &OPCODES[i]).find(|d| d.matches(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn patterns_compile_to_match_and_mask() {
        let mov = by_mnemonic("mov")[0];
        assert_eq!(mov.bits, 0b0110000 << 21);
        assert_eq!(mov.mask, 0x7F << 21);
        assert_eq!(by_mnemonic("NOP")[0].mask, u32::MAX);
    }

    #[test]
    fn conditions_and_aliases() {
        assert_eq!(condition_code("if_c"), Some(0b1100));
        assert_eq!(condition_code("IF_LT"), Some(0b1100));
        assert_eq!(condition_code("_ret_"), Some(0));
        assert_eq!(condition_name(0xF), None);
        assert_eq!(condition_name(0b1010), Some("IF_Z"));
        assert_eq!(modcz_code("_GE"), Some(3));
        assert_eq!(modcz_name(15), "_SET");
    }

    #[test]
    fn flag_suffixes_ignore_case() {
        assert_eq!(Flags::parse_suffix("wcz"), Some(Flags::WCZ));
        assert_eq!(Flags::parse_suffix("AndC"), Some(Flags::ANDC));
        assert_eq!(Flags::parse_suffix("wx"), None);
        assert_eq!(Flags::XORZ.name(), "XORZ");
        assert_eq!(Flags::ANDZ.cz(), (false, true));
    }

    #[test]
    fn flag_rules_tell_testb_from_bitl() {
        let word = 0xF400_0000 | C_BIT; // TESTB D,S WC
        assert_eq!(find(word).map(|d| d.mnemonic), Some("TESTB"));
        assert_eq!(find(0xF400_0000).map(|d| d.mnemonic), Some("BITL"));
        assert_eq!(find(0xF400_0000 | C_BIT | Z_BIT).map(|d| d.mnemonic), Some("BITL"));
    }

    #[test]
    fn legal_text_lists_suffixes() {
        assert_eq!(OPT_CZ.legal_text(), "WC, WZ, or WCZ");
        assert_eq!(REQ_W.legal_text(), "WC or WZ");
        assert_eq!(NONE.legal_text(), "allowed");
    }

    #[test]
    fn unassigned_patterns_have_no_descriptor() {
        assert!(find(0xF000_0000 | (0b1011110 << 21) | (1 << 20)).is_none());
    }
}
