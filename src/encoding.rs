use serde::Serialize;
use std::fmt;

use crate::error::{AugBlock, BoundaryError, EncodingError};
use crate::isa::p2::{Shape, AUG_MASK, A_MASK, COND_SHIFT, D_SHIFT, FIELD_MASK, HUB_ADDR0, I_BIT, LUT_END, Z_BIT};
use crate::options::PtrSyntax;

#[inline]
pub fn sign_ext(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

pub fn cond(word: u32) -> u32 {
    word >> COND_SHIFT
}

pub fn d_field(word: u32) -> u32 {
    (word >> D_SHIFT) & FIELD_MASK
}

pub fn s_field(word: u32) -> u32 {
    word & FIELD_MASK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Slot {
    D,
    S,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::D => "DST",
            Slot::S => "SRC",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmChannel {
    None,
    /// I bit (18) for S.
    I,
    /// L in the Z bit (19) for D.
    Lz,
    /// L in the I bit (18) for D.
    Li,
}

impl ImmChannel {
    pub fn bit(self) -> Option<u32> {
        match self {
            ImmChannel::None => None,
            ImmChannel::I | ImmChannel::Li => Some(I_BIT),
            ImmChannel::Lz => Some(Z_BIT),
        }
    }
}

pub fn channels(shape: Shape) -> (ImmChannel, ImmChannel) {
    match shape {
        Shape::Ds | Shape::DsPtr(_) | Shape::DsRel | Shape::DsN(_) | Shape::S | Shape::SRel => {
            (ImmChannel::None, ImmChannel::I)
        }
        Shape::LdS | Shape::LdSPtr(_) | Shape::LdSRel => (ImmChannel::Lz, ImmChannel::I),
        Shape::Ld => (ImmChannel::Li, ImmChannel::None),
        Shape::LzD => (ImmChannel::Lz, ImmChannel::None),
        _ => (ImmChannel::None, ImmChannel::None),
    }
}

/// Checks a value against a 9-bit slot. An oversized immediate yields the
/// 23-bit augment that has to precede the instruction.
pub fn fit_field(slot: Slot, channel: ImmChannel, value: u32, immediate: bool) -> Result<Option<u32>, EncodingError> {
    if value <= FIELD_MASK {
        return Ok(None);
    }
    let reason = match (immediate, slot, channel) {
        (true, _, ImmChannel::I | ImmChannel::Li | ImmChannel::Lz) => return Ok(Some(value >> 9)),
        (false, Slot::D, ImmChannel::Lz) => AugBlock::WzNotSetForL,
        (false, Slot::D, ImmChannel::Li) => AugBlock::ImNotSetForL,
        _ => AugBlock::NoImmediate,
    };
    Err(EncodingError::Oversized { slot, value, reason })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugQueue {
    s: Option<u32>,
    d: Option<u32>,
}

impl AugQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<u32> {
        match slot {
            Slot::S => &mut self.s,
            Slot::D => &mut self.d,
        }
    }

    pub fn stage(&mut self, slot: Slot, aug23: u32) {
        *self.slot_mut(slot) = Some(aug23 & crate::isa::p2::AUG_MASK);
    }

    pub fn take(&mut self, slot: Slot) -> Option<u32> {
        self.slot_mut(slot).take()
    }

    pub fn pending(&self, slot: Slot) -> Option<u32> {
        match slot {
            Slot::S => self.s,
            Slot::D => self.d,
        }
    }

    /// Full 32-bit value of a 9-bit immediate, consuming the staged augment.
    pub fn merge(&mut self, slot: Slot, low9: u32) -> Option<u32> {
        self.take(slot).map(|hi| (hi << 9) | (low9 & FIELD_MASK))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtrMode {
    Plain,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtrExpr {
    pub ptrb: bool,
    pub mode: PtrMode,
    pub index: Option<i32>,
}

const PTR_SUP: u32 = 0x100;
const PTR_B: u32 = 0x80;
const PTR_U: u32 = 0x40;
const PTR_P: u32 = 0x20;

impl PtrExpr {
    fn update_bits(&self) -> (bool, bool, i32) {
        let step = self.index.unwrap_or(1);
        match self.mode {
            PtrMode::Plain => (false, false, self.index.unwrap_or(0)),
            PtrMode::PreInc => (true, false, step),
            PtrMode::PreDec => (true, false, -step),
            PtrMode::PostInc => (true, true, step),
            PtrMode::PostDec => (true, true, -step),
        }
    }

    /// Nine bit S field `1SUPNNNNN`.
    pub fn encode(&self, syntax: PtrSyntax) -> Result<u32, BoundaryError> {
        let (update, post, n) = self.update_bits();
        let invalid = |v: i32| BoundaryError::PointerIndex { index: v as u32 };
        let mut s = PTR_SUP | if self.ptrb { PTR_B } else { 0 };
        match (syntax, update) {
            (PtrSyntax::Legacy, false) => {
                if !(-16..=15).contains(&n) {
                    return Err(invalid(n));
                }
                s |= n as u32 & 0x1F;
            }
            (PtrSyntax::V33, false) => {
                if !(-32..=31).contains(&n) {
                    return Err(invalid(n));
                }
                s |= n as u32 & 0x3F;
            }
            (PtrSyntax::Legacy, true) => {
                if !(-16..=15).contains(&n) {
                    return Err(invalid(n));
                }
                s |= PTR_U | if post { PTR_P } else { 0 } | (n as u32 & 0x1F);
            }
            (PtrSyntax::V33, true) => {
                if n == 0 || !(-16..=16).contains(&n) {
                    return Err(invalid(n));
                }
                // +16 wraps to %00000, -16 stays %10000
                let raw = if n == 16 { 0 } else { n as u32 & 0x1F };
                s |= PTR_U | if post { PTR_P } else { 0 } | raw;
            }
        }
        Ok(s)
    }

    /// 32-bit value for the `##PTRx[n]` form: AUGS takes bits 31..9.
    pub fn encode_aug(&self) -> Result<u32, BoundaryError> {
        let (update, post, n) = self.update_bits();
        if !(-0x8_0000..=0x7_FFFF).contains(&n) {
            return Err(BoundaryError::PointerAugIndex { index: n as u32 });
        }
        let mut v = PTR_SUP << 15;
        if self.ptrb {
            v |= PTR_B << 15;
        }
        if update {
            v |= PTR_U << 15;
        }
        if post {
            v |= PTR_P << 15;
        }
        Ok(v | (n as u32 & A_MASK))
    }

    pub fn decode_aug(value: u32) -> Option<PtrExpr> {
        if value & (PTR_SUP << 15) == 0 || value >> 24 != 0 {
            return None;
        }
        let ptrb = value & (PTR_B << 15) != 0;
        let n = sign_ext(value & A_MASK, 20);
        if value & (PTR_U << 15) == 0 {
            return Some(PtrExpr { ptrb, mode: PtrMode::Plain, index: (n != 0).then_some(n) });
        }
        let mode = match (n >= 0, value & (PTR_P << 15) != 0) {
            (true, false) => PtrMode::PreInc,
            (false, false) => PtrMode::PreDec,
            (true, true) => PtrMode::PostInc,
            (false, true) => PtrMode::PostDec,
        };
        let m = n.abs();
        Some(PtrExpr { ptrb, mode, index: (m != 1).then_some(m) })
    }

    pub fn decode(s9: u32, syntax: PtrSyntax) -> Option<PtrExpr> {
        if s9 & PTR_SUP == 0 {
            return None;
        }
        let ptrb = s9 & PTR_B != 0;
        if s9 & PTR_U == 0 {
            let n = match syntax {
                PtrSyntax::Legacy if s9 & PTR_P != 0 => return None,
                PtrSyntax::Legacy => sign_ext(s9 & 0x1F, 5),
                PtrSyntax::V33 => sign_ext(s9 & 0x3F, 6),
            };
            let index = (n != 0).then_some(n);
            return Some(PtrExpr { ptrb, mode: PtrMode::Plain, index });
        }
        let raw = s9 & 0x1F;
        let v = match syntax {
            PtrSyntax::V33 if raw == 0 => 16,
            _ => sign_ext(raw, 5),
        };
        let post = s9 & PTR_P != 0;
        let mode = match (v >= 0, post) {
            (true, false) => PtrMode::PreInc,
            (false, false) => PtrMode::PreDec,
            (true, true) => PtrMode::PostInc,
            (false, true) => PtrMode::PostDec,
        };
        let m = v.abs();
        Some(PtrExpr { ptrb, mode, index: (m != 1).then_some(m) })
    }
}

impl fmt::Display for PtrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = if self.ptrb { "PTRB" } else { "PTRA" };
        match self.mode {
            PtrMode::Plain => write!(f, "{reg}")?,
            PtrMode::PreInc => write!(f, "++{reg}")?,
            PtrMode::PreDec => write!(f, "--{reg}")?,
            PtrMode::PostInc => write!(f, "{reg}++")?,
            PtrMode::PostDec => write!(f, "{reg}--")?,
        }
        match self.index {
            Some(i) => write!(f, "[{i}]"),
            None => Ok(()),
        }
    }
}

fn is_cog_pc(pc: u32) -> bool {
    pc < HUB_ADDR0
}

fn cog_distance(pc: u32, target: u32) -> i64 {
    sign_ext(target.wrapping_sub(pc + 1) & 0x3FF, 10) as i64
}

fn in_range(offset: i64, bits: u32) -> Result<i64, BoundaryError> {
    let (min, max) = (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1);
    if offset < min || offset > max {
        return Err(BoundaryError::RelativeRange { offset, min, max });
    }
    Ok(offset)
}

/// Relative S field for `D,#S**` style branches, counted in instructions.
pub fn rel9(pc: u32, target: u32) -> Result<u32, BoundaryError> {
    let offset = if is_cog_pc(pc) {
        cog_distance(pc, target)
    } else {
        let distance = target as i64 - (pc as i64 + 4);
        if distance % 4 != 0 {
            return Err(BoundaryError::MisalignedDistance { distance, multiple: 4 });
        }
        distance / 4
    };
    Ok(in_range(offset, 9)? as u32 & FIELD_MASK)
}

/// Relative A field of `JMP #A` and friends: longs in cog, bytes in hub.
pub fn rel20(pc: u32, target: u32) -> Result<u32, BoundaryError> {
    let offset = if is_cog_pc(pc) && target < LUT_END {
        cog_distance(pc, target)
    } else {
        target as i64 - (pc as i64 + if is_cog_pc(pc) { 1 } else { 4 })
    };
    Ok(in_range(offset, 20)? as u32 & A_MASK)
}

pub fn rel9_target(pc: u32, s9: u32) -> u32 {
    let off = sign_ext(s9, 9);
    if is_cog_pc(pc) {
        (pc as i32 + 1 + off) as u32 & 0x3FF
    } else {
        (pc as i32 + 4 + off * 4) as u32 & A_MASK
    }
}

pub fn rel20_target(pc: u32, a20: u32) -> u32 {
    let off = sign_ext(a20, 20);
    if is_cog_pc(pc) {
        let t = (pc as i32 + 1 + off) as u32;
        if (-512..512).contains(&off) {
            t & 0x3FF
        } else {
            t & A_MASK
        }
    } else {
        (pc as i32 + 4 + off) as u32 & A_MASK
    }
}

pub fn same_domain(pc: u32, target: u32) -> bool {
    is_cog_pc(pc) == (target < HUB_ADDR0)
}

pub const AUGS_BITS: u32 = 0b11110 << 23;
pub const AUGD_BITS: u32 = 0b11111 << 23;

pub fn aug_word(slot: Slot, cond: u32, aug23: u32) -> u32 {
    let bits = match slot {
        Slot::S => AUGS_BITS,
        Slot::D => AUGD_BITS,
    };
    cond << COND_SHIFT | bits | (aug23 & AUG_MASK)
}

pub fn check_aligned(what: &'static str, addr: u32, multiple: u32) -> Result<(), BoundaryError> {
    if addr % multiple != 0 {
        return Err(BoundaryError::Misaligned { what, addr, multiple });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ptr(ptrb: bool, mode: PtrMode, index: Option<i32>) -> PtrExpr {
        PtrExpr { ptrb, mode, index }
    }

    #[test]
    fn queue_holds_one_value_per_slot() {
        let mut q = AugQueue::new();
        q.stage(Slot::S, 0x1234);
        assert_eq!(q.pending(Slot::D), None);
        assert_eq!(q.merge(Slot::S, 0x1ff), Some(0x1234 << 9 | 0x1ff));
        assert_eq!(q.take(Slot::S), None);
    }

    #[test]
    fn oversized_constants_name_their_channel() {
        assert_eq!(fit_field(Slot::S, ImmChannel::I, 0x200, true), Ok(Some(1)));
        assert!(matches!(
            fit_field(Slot::S, ImmChannel::I, 0x200, false),
            Err(EncodingError::Oversized { reason: AugBlock::NoImmediate, .. })
        ));
        assert!(matches!(
            fit_field(Slot::D, ImmChannel::Lz, 0x200, false),
            Err(EncodingError::Oversized { reason: AugBlock::WzNotSetForL, .. })
        ));
        assert!(matches!(
            fit_field(Slot::D, ImmChannel::Li, 0x3ff, false),
            Err(EncodingError::Oversized { reason: AugBlock::ImNotSetForL, .. })
        ));
    }

    #[test]
    fn pointer_forms_encode_like_the_hardware() {
        let l = PtrSyntax::Legacy;
        assert_eq!(ptr(false, PtrMode::Plain, None).encode(l).unwrap(), 0x100);
        assert_eq!(ptr(false, PtrMode::PostInc, None).encode(l).unwrap(), 0x161);
        assert_eq!(ptr(false, PtrMode::PreDec, None).encode(l).unwrap(), 0x15f);
        assert_eq!(ptr(true, PtrMode::PostDec, Some(4)).encode(l).unwrap(), 0x1fc);
        assert!(ptr(false, PtrMode::Plain, Some(16)).encode(l).is_err());
        assert_eq!(ptr(false, PtrMode::Plain, Some(-32)).encode(PtrSyntax::V33).unwrap(), 0x120);
        assert_eq!(ptr(false, PtrMode::PreInc, Some(16)).encode(PtrSyntax::V33).unwrap(), 0x140);
        assert!(ptr(false, PtrMode::PreInc, Some(0)).encode(PtrSyntax::V33).is_err());
    }

    #[test]
    fn pointer_decode_inverts_encode() {
        for syntax in [PtrSyntax::Legacy, PtrSyntax::V33] {
            for p in [
                ptr(false, PtrMode::Plain, None),
                ptr(true, PtrMode::Plain, Some(-3)),
                ptr(false, PtrMode::PreInc, None),
                ptr(true, PtrMode::PostDec, Some(7)),
            ] {
                let s = p.encode(syntax).unwrap();
                assert_eq!(PtrExpr::decode(s, syntax), Some(p));
            }
        }
    }

    #[test]
    fn augmented_pointer_index_round_trips() {
        for p in [ptr(false, PtrMode::Plain, Some(-70000)), ptr(true, PtrMode::PostInc, Some(300)), ptr(false, PtrMode::PreDec, None)] {
            let v = p.encode_aug().unwrap();
            assert_eq!(PtrExpr::decode_aug(v), Some(p));
        }
        assert_eq!(PtrExpr::decode_aug(0x1234), None);
    }

    #[test]
    fn prefixes_carry_the_condition() {
        assert_eq!(aug_word(Slot::S, 0xF, 0x91), 0xFF00_0091);
        assert_eq!(aug_word(Slot::D, 0xC, 0x7F_FFFF), 0xCFFF_FFFF);
    }

    #[test]
    fn relative_offsets_in_cog_and_hub() {
        assert_eq!(rel9(0x10, 0x10), Ok(0x1ff));
        assert_eq!(rel9_target(0x10, 0x1ff), 0x10);
        assert_eq!(rel9(0x400, 0x408), Ok(1));
        assert!(matches!(rel9(0x400, 0x406), Err(BoundaryError::MisalignedDistance { multiple: 4, .. })));
        assert!(matches!(rel9(0x0, 0x120), Err(BoundaryError::RelativeRange { .. })));
        assert_eq!(rel20(0x1000, 0x0ff0), Ok((-0x14i32) as u32 & A_MASK));
        assert_eq!(rel20_target(0x1000, (-0x14i32) as u32 & A_MASK), 0x0ff0);
    }
}
