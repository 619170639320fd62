use crate::decoder::{undefined_pattern, P2Decoder};
use crate::encoding::AugQueue;
use crate::isa::p2::{Region, HUB_ADDR0};
use crate::listing::{InstructionRecord, RecordKind};
use crate::options::PtrSyntax;

#[derive(Debug, Clone, Copy, Default)]
pub struct Disassembler {
    pub ptr_syntax: PtrSyntax,
}

impl Disassembler {
    pub fn new(ptr_syntax: PtrSyntax) -> Self {
        Self { ptr_syntax }
    }

    pub fn disassemble(&self, word: u32, pc: u32) -> InstructionRecord {
        self.record(1, word, pc, &mut AugQueue::new())
    }

    /// Records for consecutive words starting at `base`: longs below $400,
    /// bytes from there on.
    pub fn range<'w>(&self, words: &'w [u32], base: u32) -> DisasmRange<'w> {
        DisasmRange { dis: *self, words, base, index: 0, queue: AugQueue::new() }
    }

    fn record(&self, line: usize, word: u32, pc: u32, queue: &mut AugQueue) -> InstructionRecord {
        let region = Region::of_pc(pc);
        let hub = if pc >= HUB_ADDR0 { pc } else { pc * 4 };
        let mut rec = match P2Decoder::new(self.ptr_syntax).decode_augmented(word, pc, queue) {
            Some(d) => {
                let mut rec = InstructionRecord::new(line, &d.to_string(), RecordKind::Instruction, region, pc, hub);
                rec.description = Some(d.description);
                rec
            }
            None => {
                let text = format!("Undefined instruction {}", undefined_pattern(word));
                InstructionRecord::new(line, &text, RecordKind::Undefined, region, pc, hub)
            }
        };
        rec.words.push(word);
        rec
    }
}

pub fn disassemble(word: u32, pc: u32) -> InstructionRecord {
    Disassembler::default().disassemble(word, pc)
}

pub fn disassemble_range(words: &[u32], base: u32) -> DisasmRange<'_> {
    Disassembler::default().range(words, base)
}

#[derive(Debug, Clone)]
pub struct DisasmRange<'w> {
    dis: Disassembler,
    words: &'w [u32],
    base: u32,
    index: usize,
    queue: AugQueue,
}

impl DisasmRange<'_> {
    pub fn restart(&mut self) {
        self.index = 0;
        self.queue.clear();
    }

    /// Cog/LUT longs up to $3FF, then hub bytes from $400 on.
    fn pc(&self, index: usize) -> u32 {
        let index = index as u32;
        if self.base >= HUB_ADDR0 {
            return self.base.wrapping_add(index.wrapping_mul(4));
        }
        let long = self.base + index;
        if long < HUB_ADDR0 {
            long
        } else {
            HUB_ADDR0.wrapping_add((long - HUB_ADDR0).wrapping_mul(4))
        }
    }
}

impl Iterator for DisasmRange<'_> {
    type Item = InstructionRecord;

    fn next(&mut self) -> Option<InstructionRecord> {
        let word = *self.words.get(self.index)?;
        let pc = self.pc(self.index);
        self.index += 1;
        Some(self.dis.record(self.index, word, pc, &mut self.queue))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.words.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for DisasmRange<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn range_addresses_longs_in_cog_and_bytes_in_hub() {
        let cog: Vec<u32> = disassemble_range(&[0, 0], 0x10).map(|r| r.pc).collect();
        assert_eq!(cog, vec![0x10, 0x11]);
        let hub: Vec<(u32, u32)> = disassemble_range(&[0, 0], 0x400).map(|r| (r.pc, r.hub)).collect();
        assert_eq!(hub, vec![(0x400, 0x400), (0x404, 0x404)]);
    }

    #[test]
    fn range_switches_to_bytes_past_3ff() {
        let rows: Vec<(Region, u32)> = disassemble_range(&[0; 4], 0x3FE).map(|r| (r.region, r.pc)).collect();
        assert_eq!(
            rows,
            vec![(Region::Lut, 0x3FE), (Region::Lut, 0x3FF), (Region::Hub, 0x400), (Region::Hub, 0x404)]
        );
    }

    #[test]
    fn restart_replays_the_same_records() {
        let words = [0xFF00_0091, 0xF604_0345];
        let mut range = disassemble_range(&words, 0);
        let first: Vec<String> = range.by_ref().map(|r| r.source).collect();
        range.restart();
        let again: Vec<String> = range.map(|r| r.source).collect();
        assert_eq!(first, again);
        assert_eq!(first[1], "MOV $001, ##$12345");
    }

    #[test]
    fn single_words_do_not_merge() {
        assert_eq!(disassemble(0xF604_0345, 1).source, "MOV $001, #$145");
        assert_eq!(disassemble(0, 0).source, "NOP");
        assert_eq!(disassemble(0, 0).line, 1);
    }
}
