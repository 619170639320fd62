use propeller2_asm::isa::p2::Region;
use propeller2_asm::{disassemble, disassemble_range, Disassembler, PtrSyntax, RecordKind};
use pretty_assertions::assert_eq;

// EEEE OOOOOOO CZI DDDDDDDDD SSSSSSSSS
fn enc(cond: u32, op: u32, czi: u32, d: u32, s: u32) -> u32 {
    (cond << 28) | ((op & 0x7F) << 21) | ((czi & 7) << 18) | ((d & 0x1FF) << 9) | (s & 0x1FF)
}

#[test]
fn basic_forms() {
    assert_eq!(disassemble(enc(0xF, 0b0110000, 0b001, 1, 2), 0).source, "MOV $001, #$002");
    assert_eq!(disassemble(enc(0xC, 0b0001000, 0b101, 3, 1), 0).source, "IF_C ADD $003, #$001 WC");
    assert_eq!(disassemble(0, 0).source, "NOP");
}

#[test]
fn undefined_words_show_their_fields() {
    // opcode 1011110 with C set has no descriptor
    let word = enc(0xF, 0b1011110, 0b100, 0, 0);
    let rec = disassemble(word, 0);
    assert_eq!(rec.kind, RecordKind::Undefined);
    assert_eq!(rec.source, "Undefined instruction %1111_1011110_100_000000000_000000000");
    assert_eq!(rec.words, vec![word]);
    assert_eq!(rec.description, None);
}

#[test]
fn undefined_word_is_found_in_a_range() {
    let words = [0xF604_0202, enc(0xF, 0b1011110, 0b100, 0, 0), 0];
    let undefined: Vec<usize> = disassemble_range(&words, 0)
        .filter(|r| r.kind == RecordKind::Undefined)
        .map(|r| r.line)
        .collect();
    assert_eq!(undefined, vec![2]);
}

#[test]
fn hub_ranges_step_in_bytes() {
    let recs: Vec<_> = disassemble_range(&[0xF604_0202, 0xFD9F_FFF8], 0x400).collect();
    assert_eq!(recs[1].region, Region::Hub);
    assert_eq!(recs[1].pc, 0x404);
    assert_eq!(recs[1].source, "JMP #$00400");
    assert!(recs[0].description.is_some());
}

#[test]
fn lut_addresses() {
    let rec = disassemble(0, 0x200);
    assert_eq!((rec.region, rec.hub), (Region::Lut, 0x800));
}

#[test]
fn pointer_syntax_is_selectable() {
    // S = %1_0010_0000: an immediate in legacy syntax, PTRA[-32] in v33
    let word = 0xFB04_0320;
    assert_eq!(Disassembler::new(PtrSyntax::Legacy).disassemble(word, 0).source, "RDLONG $001, #$120");
    assert_eq!(Disassembler::new(PtrSyntax::V33).disassemble(word, 0).source, "RDLONG $001, PTRA[-32]");
    assert_eq!(disassemble(0xFB04_0361, 0).source, "RDLONG $001, PTRA++");
}

#[test]
fn records_serialize_to_json() {
    let rec = disassemble(enc(0xF, 0b1011110, 0b100, 0, 0), 0);
    let v = serde_json::to_value(&rec).unwrap();
    assert_eq!(v["kind"], "Undefined");
    assert_eq!(v["region"], "Cog");
}
