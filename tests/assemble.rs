use propeller2_asm::error::{BoundaryError, LineError};
use propeller2_asm::isa::p2::Region;
use propeller2_asm::{assemble, AsmOptions, Assembly, RecordKind, Source};
use propeller2_asm::Bus; // read_u32 on the hub image
use pretty_assertions::assert_eq;

// EEEE OOOOOOO CZI DDDDDDDDD SSSSSSSSS
fn enc(cond: u32, op: u32, czi: u32, d: u32, s: u32) -> u32 {
    (cond << 28) | ((op & 0x7F) << 21) | ((czi & 7) << 18) | ((d & 0x1FF) << 9) | (s & 0x1FF)
}

fn run(src: &str) -> Assembly {
    assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap()
}

fn errors(a: &Assembly) -> Vec<(usize, String)> {
    a.listing
        .diagnostics()
        .filter(|(_, d)| d.is_error())
        .map(|(line, d)| (line, d.message.clone()))
        .collect()
}

#[test]
fn forward_references_resolve() {
    let a = run("        mov 1, #data\n        jmp #$\ndata    long $DEADBEEF\n");
    assert!(errors(&a).is_empty(), "{:?}", errors(&a));
    // MOV = 0110000, JMP #A relative to the next long
    assert_eq!(a.words(), vec![enc(0xF, 0b0110000, 0b001, 1, 2), 0xFD9F_FFFF]);
    assert_eq!(&a.image.bytes()[8..12], &[0xEF, 0xBE, 0xAD, 0xDE]);
    assert_eq!(a.image.read_u32(8).unwrap(), 0xDEAD_BEEF);
    assert_eq!(a.symbol("data").map(|s| s.value), Some(2));
}

#[test]
fn duplicate_labels_name_both_lines() {
    let a = run("a   nop\na   nop\n");
    assert_eq!(
        errors(&a),
        vec![(2, "Symbol a (line 2, value $1) already defined in line 1 with value $0.".to_string())]
    );
    // the second line is still assembled
    assert_eq!(a.words(), vec![0, 0]);
}

#[test]
fn duplicate_constants_are_errors_even_when_equal() {
    let a = run("CON\n  x = 1\n  x = 1\n");
    assert_eq!(
        errors(&a),
        vec![(3, "Symbol x (line 3, value $1) already defined in line 2 with value $1.".to_string())]
    );
}

#[test]
fn local_labels_live_under_the_last_global() {
    let src = "start   nop\n.loop   djnz 1, #.loop\nnext    nop\n.loop   djnz 2, #.loop\n";
    let a = run(src);
    assert!(errors(&a).is_empty(), "{:?}", errors(&a));
    assert_eq!(a.words(), vec![0, 0xFB6C_03FF, 0, 0xFB6C_05FF]);
    assert_eq!(a.symbol("start.loop").map(|s| s.value), Some(1));
    assert_eq!(a.symbol("next.loop").map(|s| s.value), Some(3));
}

#[test]
fn references_are_tracked_per_line() {
    let a = run("CON size = 4\nDAT\n  mov 1, #size\n  add 1, #size\n");
    let refs: Vec<usize> = a.symbol("size").unwrap().references.iter().copied().collect();
    assert_eq!(refs, vec![3, 4]);
}

#[test]
fn oversized_register_fields() {
    let a = run("  mov $200, #1\n  mov 1, $200\n  wrlong $200, ptra\n");
    assert_eq!(
        errors(&a),
        vec![
            (1, "DST constant $200 is > $1ff but no immediate mode.".to_string()),
            (2, "SRC constant $200 is > $1ff but no immediate mode.".to_string()),
            (3, "DST constant $200 is > $1ff but WZ is not set for L.".to_string()),
        ]
    );
    // each failing line still occupies one long
    assert_eq!(a.words(), vec![0, 0, 0]);
}

#[test]
fn late_large_values_need_double_hash() {
    let a = run("  mov 1, #big\nCON big = $300\n");
    assert_eq!(
        errors(&a),
        vec![(
            1,
            "SRC constant $300 needs augmentation but was unresolved in pass 1; write ## instead of #.".to_string()
        )]
    );

    let a = run("  mov 1, ##big\nCON big = $300\n");
    assert!(errors(&a).is_empty(), "{:?}", errors(&a));
    assert_eq!(a.words(), vec![0xFF00_0001, enc(0xF, 0b0110000, 0b001, 1, 0x100)]);
}

#[test]
fn boundary_error_does_not_stop_the_run() {
    let a = run("  org $400\n  mov 1, #2\n  nop\n");
    let first = &a.record(1).unwrap().diagnostics[0];
    assert_eq!(
        first.error,
        LineError::Boundary(BoundaryError::Origin { region: Region::Lut, addr: 0x400, limit: 0x400 })
    );
    assert_eq!(first.message, "LUT origin $400 exceeds limit $400.");
    assert_eq!(a.words(), vec![0xF604_0202, 0]);
}

#[test]
fn hub_code_uses_byte_addresses() {
    let a = run("  orgh $400\nstart mov 1, #2\n  jmp #start\n");
    assert!(errors(&a).is_empty(), "{:?}", errors(&a));
    let rec = a.record(3).unwrap();
    assert_eq!((rec.region, rec.pc, rec.hub), (Region::Hub, 0x404, 0x404));
    assert_eq!(a.symbol("start").map(|s| s.value), Some(0x400));
    assert_eq!(rec.words, vec![0xFD9F_FFF8]);
    assert_eq!(a.image.read_u32(0x400).unwrap(), 0xF604_0202);
    assert_eq!(a.image.len(), 0x408);
}

#[test]
fn line_level_syntax_errors() {
    let a = run("lbl frob 1, 2\n  if_c long 1\n  nop 1\n  x = 3\n");
    assert_eq!(
        errors(&a),
        vec![
            (1, "Unknown instruction or directive 'frob'.".to_string()),
            (2, "Condition IF_C is not allowed for LONG.".to_string()),
            (3, "Found extra parameters: 1".to_string()),
            (4, "Not in constant section (CON) but found assignment.".to_string()),
        ]
    );
    assert_eq!(a.record(3).map(|r| r.words.clone()), Some(vec![0]));
}

#[test]
fn listing_has_one_record_per_line() {
    let src = "' header\nCON\n  k = 2\nDAT\n  org 0\nlbl\n  nop\n";
    let a = run(src);
    let kinds: Vec<RecordKind> = a.records().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::Comment,
            RecordKind::Section,
            RecordKind::Assignment,
            RecordKind::Section,
            RecordKind::Directive,
            RecordKind::Label,
            RecordKind::Instruction,
        ]
    );
    assert_eq!(a.record(3).and_then(|r| r.value), Some(2));
    assert!(a.listing.render(false).contains("nop"));
}

#[test]
fn oversized_res_is_a_line_error() {
    let a = run("  res $40000000\n  nop\n  orgh\n  res $40000000\n  nop\n");
    assert_eq!(
        errors(&a),
        vec![
            (1, "COG address $0 exceeds limit $200.".to_string()),
            (4, "HUB address $400 exceeds limit $100000.".to_string()),
        ]
    );
    let nop = a.record(2).unwrap();
    assert_eq!((nop.pc, nop.words.clone()), (0, vec![0]));
    let hub_nop = a.record(5).unwrap();
    assert_eq!((hub_nop.region, hub_nop.pc), (Region::Hub, 0x400));
}
