use bitvec::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::encoding::{cond, d_field, rel20_target, rel9_target, s_field, AugQueue, PtrExpr, Slot};
use crate::isa::p2::{
    self, condition_name, modcz_name, Flags, OpcodeDesc, Shape, AUG_MASK, A_MASK, COND_ALWAYS, C_BIT, I_BIT,
    POINTER_REGS, R_BIT, W_SHIFT, Z_BIT,
};
use crate::options::PtrSyntax;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded {
    pub word: u32,
    pub pc: u32,
    pub mnemonic: &'static str,
    pub condition: Option<&'static str>,
    pub operands: Vec<String>,
    pub suffix: Option<&'static str>,
    pub description: &'static str,
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(c) = self.condition {
            write!(f, "{c} ")?;
        }
        f.write_str(self.mnemonic)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands.join(", "))?;
        }
        if let Some(s) = self.suffix {
            write!(f, " {s}")?;
        }
        Ok(())
    }
}

pub trait Decoder {
    fn decode(&self, word: u32, pc: u32) -> Option<Decoded>;
}

/// Table driven decoder. `pc` is a cog/LUT long address below $400 and a
/// hub byte address above.
#[derive(Debug, Clone, Copy, Default)]
pub struct P2Decoder {
    pub ptr_syntax: PtrSyntax,
}

impl Decoder for P2Decoder {
    fn decode(&self, word: u32, pc: u32) -> Option<Decoded> {
        self.decode_augmented(word, pc, &mut AugQueue::new())
    }
}

fn reg(v: u32) -> String {
    format!("${v:03x}")
}

fn imm(v: u32) -> String {
    format!("#${v:03x}")
}

fn target(v: u32) -> String {
    if v < 0x400 {
        format!("#${v:03x}")
    } else {
        format!("#${v:05x}")
    }
}

impl P2Decoder {
    pub fn new(ptr_syntax: PtrSyntax) -> Self {
        Self { ptr_syntax }
    }

    /// Decodes a word, merging upper bits staged by a preceding AUGS/AUGD
    /// into its immediates. AUGS/AUGD words stage their own value.
    pub fn decode_augmented(&self, word: u32, pc: u32, queue: &mut AugQueue) -> Option<Decoded> {
        let desc = p2::find(word)?;
        let c = cond(word);
        let condition = if desc.conditional() && c != COND_ALWAYS { condition_name(c) } else { None };
        let suffix = desc.flags.suffix(word & C_BIT != 0, word & Z_BIT != 0).map(Flags::name);
        let operands = self.operands(desc, word, pc, queue);
        Some(Decoded { word, pc, mnemonic: desc.mnemonic, condition, operands, suffix, description: desc.brief })
    }

    fn operands(&self, desc: &OpcodeDesc, word: u32, pc: u32, queue: &mut AugQueue) -> Vec<String> {
        let d = d_field(word);
        match desc.shape {
            Shape::None | Shape::Flags => vec![],
            Shape::D | Shape::DDup => vec![reg(d)],
            Shape::Ld => vec![self.d_operand(d, word & I_BIT != 0, queue)],
            Shape::LzD => vec![self.d_operand(d, word & Z_BIT != 0, queue)],
            Shape::S | Shape::SRel => vec![self.s_operand(desc, word, pc, queue)],
            Shape::Ds | Shape::DsRel | Shape::DsPtr(_) => vec![reg(d), self.s_operand(desc, word, pc, queue)],
            Shape::DsN(bits) => {
                let n = (word >> 19) & ((1 << bits) - 1);
                vec![reg(d), self.s_operand(desc, word, pc, queue), format!("#{n}")]
            }
            Shape::LdS | Shape::LdSPtr(_) | Shape::LdSRel => {
                vec![self.d_operand(d, word & Z_BIT != 0, queue), self.s_operand(desc, word, pc, queue)]
            }
            Shape::ModCz => vec![modcz_name((word >> 13) & 0xF).into(), modcz_name((word >> 9) & 0xF).into()],
            Shape::ModC => vec![modcz_name((word >> 13) & 0xF).into()],
            Shape::ModZ => vec![modcz_name((word >> 9) & 0xF).into()],
            Shape::Abs20 => vec![address(word, pc)],
            Shape::PtrAbs20 => {
                let w = (word >> W_SHIFT) & 3;
                vec![POINTER_REGS[w as usize].into(), address(word, pc)]
            }
            Shape::Aug => {
                let value = word & AUG_MASK;
                let slot = if desc.mnemonic == "AUGD" { Slot::D } else { Slot::S };
                queue.stage(slot, value);
                vec![format!("#${value:06x}")]
            }
        }
    }

    fn d_operand(&self, d: u32, immediate: bool, queue: &mut AugQueue) -> String {
        if !immediate {
            return reg(d);
        }
        match queue.merge(Slot::D, d) {
            Some(full) => format!("##${full:x}"),
            None => imm(d),
        }
    }

    fn s_operand(&self, desc: &OpcodeDesc, word: u32, pc: u32, queue: &mut AugQueue) -> String {
        let s = s_field(word);
        if word & I_BIT == 0 {
            return reg(s);
        }
        let pointers = matches!(desc.shape, Shape::DsPtr(_) | Shape::LdSPtr(_));
        if let Some(full) = queue.merge(Slot::S, s) {
            return match PtrExpr::decode_aug(full).filter(|_| pointers) {
                Some(p) => format!("##{p}"),
                None => format!("##${full:x}"),
            };
        }
        match desc.shape {
            Shape::DsRel | Shape::LdSRel | Shape::SRel => target(rel9_target(pc, s)),
            Shape::DsPtr(_) | Shape::LdSPtr(_) if s >= 0x100 => {
                PtrExpr::decode(s, self.ptr_syntax).map_or_else(|| imm(s), |p| p.to_string())
            }
            _ => imm(s),
        }
    }
}

fn address(word: u32, pc: u32) -> String {
    let a = word & A_MASK;
    if word & R_BIT != 0 {
        target(rel20_target(pc, a))
    } else {
        format!("#\\${a:05x}")
    }
}

/// Field view of a word no descriptor matches: `%EEEE_OOOOOOO_CZI_DDDDDDDDD_SSSSSSSSS`.
pub fn undefined_pattern(word: u32) -> String {
    let bits = word.view_bits::<Msb0>();
    let mut out = String::from("%");
    for (i, (start, end)) in [(0, 4), (4, 11), (11, 14), (14, 23), (23, 32)].into_iter().enumerate() {
        if i > 0 {
            out.push('_');
        }
        out.extend(bits[start..end].iter().map(|b| if *b { '1' } else { '0' }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(word: u32, pc: u32) -> String {
        P2Decoder::default().decode(word, pc).map(|d| d.to_string()).unwrap_or_default()
    }

    #[test]
    fn condition_and_suffix() {
        assert_eq!(text(0xF604_0202, 0), "MOV $001, #$002");
        assert_eq!(text(0xC114_0601, 0), "IF_C ADD $003, #$001 WC");
    }

    #[test]
    fn branches_render_targets() {
        assert_eq!(text(0xFB6C_03FF, 0x10), "DJNZ $001, #$010");
        assert_eq!(text(0xFD90_0001, 0), "JMP #$002");
        assert_eq!(text(0xFD80_0400, 0), "JMP #\\$00400");
    }

    #[test]
    fn pointer_fields_follow_the_syntax() {
        assert_eq!(text(0xFB04_0361, 0), "RDLONG $001, PTRA++");
        let v33 = P2Decoder::new(PtrSyntax::V33);
        assert_eq!(v33.decode(0xFB04_0320, 0).map(|d| d.to_string()), Some("RDLONG $001, PTRA[-32]".into()));
    }

    #[test]
    fn augs_merges_into_the_next_immediate() {
        let dec = P2Decoder::default();
        let mut q = AugQueue::new();
        let aug = dec.decode_augmented(0xFF00_0091, 0, &mut q).unwrap();
        assert_eq!(aug.to_string(), "AUGS #$000091");
        let mov = dec.decode_augmented(0xF604_0345, 1, &mut q).unwrap();
        assert_eq!(mov.to_string(), "MOV $001, ##$12345");
    }

    #[test]
    fn undefined_pattern_groups_fields() {
        assert_eq!(undefined_pattern(0xF604_0202), "%1111_0110000_001_000000001_000000010");
    }
}
