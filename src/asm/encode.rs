use super::operands::{pointer, split_commas, split_flags, Imm, Operand, PtrOperand};
use super::{Assembler, Mode, Pass};
use crate::encoding::{aug_word, check_aligned, channels, fit_field, rel20, rel9, same_domain, ImmChannel, PtrExpr, PtrMode, Slot};
use crate::error::{BoundaryError, EncodingError, LineError, SyntaxError};
use crate::isa::p2::{
    self, Access, FlagRule, Flags, OpcodeDesc, Region, Shape, AUG_MASK, A_MASK, COND_ALWAYS, COND_RET, COND_SHIFT,
    C_BIT, D_SHIFT, FIELD_MASK, I_BIT, MEM_SIZE, POINTER_REGS, R_BIT, W_SHIFT, Z_BIT,
};
use crate::lexer::Token;
use crate::listing::{InstructionRecord, RecordKind};

/// Upper bits an instruction needs from AUGD/AUGS prefixes.
#[derive(Debug, Default)]
struct Augs {
    d: Option<u32>,
    s: Option<u32>,
}

impl Augs {
    fn set(&mut self, slot: Slot, aug23: u32) {
        match slot {
            Slot::D => self.d = Some(aug23),
            Slot::S => self.s = Some(aug23),
        }
    }

    fn count(&self) -> u32 {
        self.d.is_some() as u32 + self.s.is_some() as u32
    }
}

#[derive(Debug, Clone, Copy)]
struct Field {
    bits: u32,
    imm: bool,
    augmented: bool,
    value: u32,
}

impl Assembler<'_> {
    pub(super) fn instruction(
        &mut self,
        mnemonic: &str,
        cond: Option<(u32, String)>,
        toks: &[Token],
        rec: &mut InstructionRecord,
    ) -> Result<(), LineError> {
        rec.kind = RecordKind::Instruction;
        if self.cursor.mode() == Mode::Cog {
            if let Err(e) = check_aligned("Instruction", self.cursor.pc_bytes(), 4) {
                self.note(e);
            }
        }
        match self.encode(mnemonic, cond, toks) {
            Ok(words) => {
                self.emit(rec, &words, &[]);
                Ok(())
            }
            Err(e) => {
                // keep the size pass 1 settled on
                let reserved = self.reserved.range((self.line, Slot::D)..=(self.line, Slot::S)).count();
                self.emit(rec, &vec![0; 1 + reserved], &[]);
                Err(e)
            }
        }
    }

    fn encode(&mut self, mnemonic: &str, cond: Option<(u32, String)>, toks: &[Token]) -> Result<Vec<u32>, LineError> {
        let (toks, flags) = split_flags(toks)?;
        let groups = split_commas(toks);
        if groups.iter().any(|g| g.is_empty()) {
            return Err(SyntaxError::Expected { expected: "operand", found: ",".into() }.into());
        }
        let mut ops: Vec<Operand> = groups.into_iter().map(Operand::parse).collect();
        let desc = self.select(mnemonic, &mut ops, flags)?;

        let mut word = desc.bits;
        let cond = match cond {
            Some((_, condition)) if !desc.conditional() => {
                return Err(EncodingError::Conditional { condition, mnemonic: desc.mnemonic.to_string() }.into())
            }
            Some((code, _)) => code,
            None => COND_ALWAYS,
        };
        if desc.conditional() {
            word |= cond << COND_SHIFT;
        }
        if let Some(f) = flags {
            let (c, z) = f.cz();
            if c && desc.mask & C_BIT == 0 {
                word |= C_BIT;
            }
            if z && desc.mask & Z_BIT == 0 {
                word |= Z_BIT;
            }
        }

        let (d_ch, _) = channels(desc.shape);
        let mut augs = Augs::default();
        match desc.shape {
            Shape::None | Shape::Flags => {}
            Shape::D => word |= self.register(&ops[0])? << D_SHIFT,
            Shape::DDup => {
                let d = self.register(&ops[0])?;
                word |= d << D_SHIFT | d;
            }
            Shape::Ld | Shape::LzD => word |= self.d_slot(&ops[0], d_ch, &mut augs)?,
            Shape::S | Shape::SRel => word |= self.s_slot(desc, &ops[0], &mut augs)?,
            Shape::Ds | Shape::DsRel | Shape::DsPtr(_) | Shape::DsN(_) => {
                word |= self.register(&ops[0])? << D_SHIFT;
                word |= self.s_slot(desc, &ops[1], &mut augs)?;
                if let Shape::DsN(bits) = desc.shape {
                    word |= self.n_field(&ops[2], bits as u32)? << 19;
                }
            }
            Shape::LdS | Shape::LdSPtr(_) | Shape::LdSRel => {
                word |= self.d_slot(&ops[0], d_ch, &mut augs)?;
                word |= self.s_slot(desc, &ops[1], &mut augs)?;
            }
            Shape::ModCz => word |= self.modcz(&ops[0])? << 13 | self.modcz(&ops[1])? << 9,
            Shape::ModC => word |= self.modcz(&ops[0])? << 13,
            Shape::ModZ => word |= self.modcz(&ops[0])? << 9,
            Shape::Abs20 => word |= self.address20(&ops[0])?,
            Shape::PtrAbs20 => {
                let w = ops[0]
                    .word()
                    .and_then(|w| POINTER_REGS.iter().position(|p| p.eq_ignore_ascii_case(w)))
                    .unwrap_or(0) as u32;
                word |= w << W_SHIFT | self.address20(&ops[1])?;
            }
            Shape::Aug => word |= self.augment(desc, &ops[0])?,
        }

        // _RET_ applies to the instruction, not to its prefixes
        let aug_cond = if cond == COND_RET { COND_ALWAYS } else { cond };
        let mut words = Vec::with_capacity(3);
        if let Some(d) = augs.d {
            words.push(aug_word(Slot::D, aug_cond, d));
        }
        if let Some(s) = augs.s {
            words.push(aug_word(Slot::S, aug_cond, s));
        }
        words.push(word);
        Ok(words)
    }

    /// Picks the descriptor whose operand shape and flag rule fit.
    fn select(
        &mut self,
        mnemonic: &str,
        ops: &mut Vec<Operand<'_>>,
        flags: Option<Flags>,
    ) -> Result<&'static OpcodeDesc, LineError> {
        let candidates = p2::by_mnemonic(mnemonic);
        let most = candidates.iter().map(|d| d.shape.arity()).max().unwrap_or(0);
        let least = candidates.iter().map(|d| d.shape.arity()).min().unwrap_or(0);
        if ops.len() > most {
            let extra = ops.split_off(most);
            let (first, last) = (extra[0].toks, extra[extra.len() - 1].toks);
            let text = match (first.first(), last.last()) {
                (Some(a), Some(b)) => self.text.get(a.span.start..b.span.end).unwrap_or_default().to_string(),
                _ => String::new(),
            };
            self.note(SyntaxError::ExtraParameters(text));
        }
        if ops.len() < least {
            return Err(SyntaxError::MissingOperand(mnemonic.to_ascii_uppercase()).into());
        }

        let mut fitting: Vec<&'static OpcodeDesc> = candidates
            .iter()
            .copied()
            .filter(|d| d.shape.arity() == ops.len() && shape_accepts(d.shape, ops))
            .collect();
        if fitting.is_empty() {
            let ptr_form = candidates.iter().any(|d| d.shape == Shape::PtrAbs20 && d.shape.arity() == ops.len());
            if ptr_form && ops.get(1).is_some_and(Operand::immediate) && !is_pointer_reg(&ops[0]) {
                return Err(EncodingError::InvalidPointer { found: self.snippet(ops[0].toks) }.into());
            }
            let mut expected: Vec<&str> = Vec::new();
            for d in candidates {
                if !expected.contains(&d.shape.syntax()) {
                    expected.push(d.shape.syntax());
                }
            }
            return Err(EncodingError::WrongShape {
                mnemonic: mnemonic.to_ascii_uppercase(),
                expected: expected.join(" or "),
            }
            .into());
        }
        // CALLD PA,#A before CALLD D,#S
        fitting.sort_by_key(|d| d.shape != Shape::PtrAbs20);

        let chosen = fitting.iter().copied().find(|d| match flags {
            Some(f) => d.flags.allowed.contains(f),
            None => !d.flags.required,
        });
        match (chosen, flags) {
            (Some(d), _) => Ok(d),
            (None, found) => {
                let allowed = fitting.iter().fold(Flags::empty(), |acc, d| acc | d.flags.allowed);
                let legal = FlagRule { allowed, required: false }.legal_text();
                Err(match found {
                    Some(f) => EncodingError::FlagUpdate { found: f.name().to_string(), legal },
                    None => EncodingError::MissingFlag { legal },
                }
                .into())
            }
        }
    }

    fn register(&mut self, op: &Operand) -> Result<u32, LineError> {
        let v = self.eval_toks(op.toks)?;
        fit_field(Slot::D, ImmChannel::None, v.value, false)?;
        Ok(v.value)
    }

    fn d_slot(&mut self, op: &Operand, channel: ImmChannel, augs: &mut Augs) -> Result<u32, LineError> {
        let f = self.slot(Slot::D, channel, op, false, augs)?;
        let mut bits = f.bits << D_SHIFT;
        if f.imm {
            bits |= channel.bit().unwrap_or(0);
        }
        Ok(bits)
    }

    fn s_slot(&mut self, desc: &OpcodeDesc, op: &Operand, augs: &mut Augs) -> Result<u32, LineError> {
        let access = match desc.shape {
            Shape::DsPtr(a) | Shape::LdSPtr(a) => Some(a),
            _ => None,
        };
        if op.imm != Imm::Hash {
            if let Some(p) = pointer(op.toks)? {
                if access.is_some() {
                    return self.pointer_field(p, op.imm == Imm::Aug, augs);
                }
                if op.imm == Imm::None && (p.mode != PtrMode::Plain || p.index.is_some()) {
                    return Err(EncodingError::PointerNotAllowed { mnemonic: desc.mnemonic.to_string() }.into());
                }
            }
        }
        let rel = matches!(desc.shape, Shape::DsRel | Shape::LdSRel | Shape::SRel);
        let f = self.slot(Slot::S, ImmChannel::I, op, rel, augs)?;
        if let (Some(access), true) = (access, f.imm) {
            // $100..$1FF without augment is a pointer field, taken as is
            let hub_addr = if f.augmented { f.value < MEM_SIZE } else { f.value < 0x100 };
            if access != Access::Byte && hub_addr {
                if let Err(e) = check_aligned(access.name(), f.value, access.bytes()) {
                    self.note(e);
                }
            }
        }
        Ok(f.bits | if f.imm { I_BIT } else { 0 })
    }

    fn pointer_field(&mut self, p: PtrOperand, aug: bool, augs: &mut Augs) -> Result<u32, LineError> {
        let index = match &p.index {
            Some(e) => Some(self.eval(e)?.value as i32),
            None => None,
        };
        let ptr = PtrExpr { ptrb: p.ptrb, mode: p.mode, index };
        if aug {
            if self.pass == Pass::First {
                self.reserved.insert((self.line, Slot::S));
            }
            let v = self.soft(ptr.encode_aug())?;
            augs.s = Some(v >> 9);
            return Ok(I_BIT | v & FIELD_MASK);
        }
        Ok(I_BIT | self.soft(ptr.encode(self.options.ptr_syntax))?)
    }

    /// Evaluates a D or S operand. Immediates beyond nine bits get an
    /// augment when `##` asks for one or pass 1 already saw the large value.
    fn slot(&mut self, slot: Slot, channel: ImmChannel, op: &Operand, rel: bool, augs: &mut Augs) -> Result<Field, LineError> {
        let v = self.eval_toks(op.toks)?;
        if !op.immediate() {
            fit_field(slot, channel, v.value, false)?;
            return Ok(Field { bits: v.value, imm: false, augmented: false, value: v.value });
        }
        if rel && op.imm == Imm::Hash && !op.absolute {
            let pc = self.instruction_pc(augs);
            let bits = self.soft(rel9(pc, v.value))?;
            return Ok(Field { bits, imm: true, augmented: false, value: v.value });
        }
        let low = Field { bits: v.value & FIELD_MASK, imm: true, augmented: true, value: v.value };
        // an explicit AUGS/AUGD already supplies the upper bits
        if self.queue.take(slot).is_some() {
            return Ok(low);
        }
        let key = (self.line, slot);
        let augment = match self.pass {
            Pass::First => op.imm == Imm::Aug || (v.known && v.value > FIELD_MASK),
            Pass::Second => op.imm == Imm::Aug || self.reserved.contains(&key),
        };
        if augment {
            if self.pass == Pass::First {
                self.reserved.insert(key);
            }
            augs.set(slot, v.value >> 9);
            return Ok(low);
        }
        if v.value > FIELD_MASK {
            if self.pass == Pass::Second {
                return Err(EncodingError::LateAugmentation { slot, value: v.value }.into());
            }
            return Ok(Field { augmented: false, ..low });
        }
        Ok(Field { bits: v.value, imm: true, augmented: false, value: v.value })
    }

    fn instruction_pc(&self, augs: &Augs) -> u32 {
        let step = match self.cursor.mode() {
            Mode::Cog => 1,
            Mode::Hub => 4,
        };
        self.cursor.pc() + augs.count() * step
    }

    fn n_field(&mut self, op: &Operand, bits: u32) -> Result<u32, LineError> {
        if !op.immediate() {
            return Err(EncodingError::MissingImmediate.into());
        }
        let value = self.eval_toks(op.toks)?.value;
        let max = (1 << bits) - 1;
        if value > max {
            return Err(EncodingError::ImmediateRange { max, value }.into());
        }
        Ok(value)
    }

    fn modcz(&mut self, op: &Operand) -> Result<u32, LineError> {
        if let Some(code) = op.word().and_then(p2::modcz_code) {
            return Ok(code);
        }
        let found = self.snippet(op.toks);
        match self.eval_toks(op.toks) {
            Ok(v) if v.value <= 0xF => Ok(v.value),
            _ => Err(EncodingError::ModczParameter { found }.into()),
        }
    }

    /// 20-bit A field: relative when PC and target share a domain unless
    /// `\` forces the absolute form.
    fn address20(&mut self, op: &Operand) -> Result<u32, LineError> {
        let target = self.eval_toks(op.toks)?.value;
        if target >= MEM_SIZE {
            return self.soft(Err::<u32, _>(BoundaryError::AddressLimit { region: Region::Hub, addr: target, limit: MEM_SIZE }));
        }
        let pc = self.cursor.pc();
        if !op.absolute && same_domain(pc, target) {
            return Ok(R_BIT | self.soft(rel20(pc, target))?);
        }
        Ok(target & A_MASK)
    }

    /// AUGS/AUGD #n: the 23-bit value goes into the word and is queued for
    /// the next immediate of that slot.
    fn augment(&mut self, desc: &OpcodeDesc, op: &Operand) -> Result<u32, LineError> {
        if !op.immediate() {
            return Err(EncodingError::MissingImmediate.into());
        }
        let value = self.eval_toks(op.toks)?.value;
        if value > AUG_MASK {
            return Err(EncodingError::AugRange { value }.into());
        }
        let slot = if desc.mnemonic == "AUGD" { Slot::D } else { Slot::S };
        self.queue.stage(slot, value);
        Ok(value)
    }
}

fn is_pointer_reg(op: &Operand) -> bool {
    op.word().is_some_and(|w| POINTER_REGS.iter().any(|p| p.eq_ignore_ascii_case(w)))
}

fn shape_accepts(shape: Shape, ops: &[Operand]) -> bool {
    match shape {
        Shape::Abs20 => ops[0].immediate(),
        Shape::PtrAbs20 => is_pointer_reg(&ops[0]) && ops[1].immediate(),
        Shape::D | Shape::DDup | Shape::Ds | Shape::DsRel | Shape::DsPtr(_) | Shape::DsN(_) => !ops[0].immediate(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{assemble, Source};
    use crate::error::{BoundaryError, EncodingError, LineError};
    use crate::options::AsmOptions;
    use pretty_assertions::assert_eq;

    fn words(src: &str) -> Vec<u32> {
        let a = assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap();
        assert!(!a.has_errors(), "{}", a.listing.render(false));
        a.words()
    }

    fn first_error(src: &str) -> LineError {
        let a = assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap();
        let (_, d) = a.listing.diagnostics().next().expect("an error");
        d.error.clone()
    }

    #[test]
    fn register_and_immediate_forms() {
        assert_eq!(words("  mov 1, 2"), vec![0xF600_0202]);
        assert_eq!(words("  mov 1, #2"), vec![0xF604_0202]);
        assert_eq!(words("  if_c add 3, #1 wc"), vec![0xC114_0601]);
    }

    #[test]
    fn large_immediates_get_augs() {
        assert_eq!(words("  mov 1, ##$12345"), vec![0xFF00_0091, 0xF604_0345]);
        assert_eq!(words("  mov 1, #$12345"), vec![0xFF00_0091, 0xF604_0345]);
    }

    #[test]
    fn ret_condition_does_not_reach_the_prefix() {
        assert_eq!(words("  _ret_ mov 1, ##$200"), vec![0xFF00_0001, 0x0604_0200]);
    }

    #[test]
    fn explicit_augs_feeds_the_next_immediate() {
        assert_eq!(words("  augs #1\n  mov 1, #$200"), vec![0xFF00_0001, 0xF604_0200]);
    }

    #[test]
    fn djnz_counts_back_to_itself() {
        assert_eq!(words("loop  djnz 1, #loop"), vec![0xFB6C_03FF]);
    }

    #[test]
    fn pointer_operands() {
        assert_eq!(words("  rdlong 1, ptra++"), vec![0xFB04_0361]);
        assert_eq!(words("  wrlong 1, ptrb[2]"), vec![0xFC64_0382]);
    }

    #[test]
    fn loc_needs_a_pointer_register() {
        assert_eq!(words("  loc ptra, #\\$400"), vec![0xFEC0_0400]);
        assert!(matches!(first_error("  loc 5, #$400"), LineError::Encoding(EncodingError::InvalidPointer { .. })));
    }

    #[test]
    fn flag_suffix_must_be_legal() {
        assert_eq!(
            first_error("  testb 1, #3 wcz"),
            LineError::Encoding(EncodingError::FlagUpdate {
                found: "WCZ".into(),
                legal: "WC, WZ, ANDC, ANDZ, ORC, ORZ, XORC, or XORZ".into(),
            })
        );
        assert!(matches!(first_error("  testb 1, #3"), LineError::Encoding(EncodingError::MissingFlag { .. })));
    }

    #[test]
    fn word_access_must_be_aligned() {
        assert_eq!(
            first_error("  rdword 1, #$21"),
            LineError::Boundary(BoundaryError::Misaligned { what: "Word", addr: 0x21, multiple: 2 })
        );
    }

    #[test]
    fn modcz_takes_names_or_numbers() {
        assert_eq!(words("  modcz _set, _clr wcz"), vec![0xFD7D_E06F]);
        assert_eq!(words("  modcz 15, 0 wcz"), vec![0xFD7D_E06F]);
    }
}
