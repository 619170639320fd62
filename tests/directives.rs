use propeller2_asm::error::Severity;
use propeller2_asm::{assemble, AsmOptions, Assembly, RecordKind, Source};
use pretty_assertions::assert_eq;

fn run_with(src: &str, options: &AsmOptions) -> Assembly {
    assemble(Source::Text(src.to_string()), options).unwrap()
}

fn run(src: &str) -> Assembly {
    run_with(src, &AsmOptions::default())
}

#[test]
fn data_widths_and_repeats() {
    let a = run("  long 1, 2[2]\n  word \"A\"\n  byte $1ff\n");
    assert!(!a.has_errors(), "{}", a.listing.render(false));
    assert_eq!(a.record(1).unwrap().data, vec![1, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0]);
    assert_eq!(a.record(2).unwrap().data, vec![b'A', 0]);
    // values are truncated to the unit width
    assert_eq!(a.record(3).unwrap().data, vec![0xff]);
    assert_eq!(a.record(3).unwrap().kind, RecordKind::Data);
}

#[test]
fn alignw_pads_one_byte() {
    let a = run("  byte 1\n  alignw\n  word 2\n");
    assert_eq!(a.record(2).unwrap().data, vec![0]);
    assert_eq!(a.record(3).unwrap().hub, 2);
}

#[test]
fn orgf_can_not_go_back() {
    let a = run("  long 1, 2\n  orgf 1\n");
    let d = &a.record(2).unwrap().diagnostics[0];
    assert_eq!(d.message, "ORGF target $1 is below the current address $2.");
}

#[test]
fn lut_org_and_fit() {
    let a = run("  org $200\nlut  long 0\n  fit\n");
    assert!(!a.has_errors(), "{}", a.listing.render(false));
    let r = a.record(2).unwrap();
    assert_eq!((r.region.to_string(), r.pc), ("LUT".to_string(), 0x200));
}

#[test]
fn file_resource_from_include_dir() {
    let dir = std::env::temp_dir().join("p2asm_file_resource");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("blob.bin"), [1u8, 2, 3]).unwrap();

    let options = AsmOptions { include_dir: Some(dir), ..AsmOptions::default() };
    let a = run_with("  file \"blob.bin\"\n  byte 9\n", &options);
    assert!(!a.has_errors(), "{}", a.listing.render(false));
    assert_eq!(a.record(1).unwrap().data, vec![1, 2, 3]);
    assert_eq!(a.record(2).unwrap().hub, 3);
}

#[test]
fn missing_file_error_or_warning() {
    let a = run("  file \"no-such-file.bin\"\n");
    let d = &a.record(1).unwrap().diagnostics[0];
    assert_eq!(d.message, "Could not open file \"no-such-file.bin\" for reading.");
    assert_eq!(d.severity, Severity::Error);

    let lenient = AsmOptions { error_on_missing_file: false, ..AsmOptions::default() };
    let a = run_with("  file \"no-such-file.bin\"\n  long 1\n", &lenient);
    assert!(!a.has_errors());
    assert_eq!(a.record(2).unwrap().hub, 0);
}

#[test]
fn compat_listing_layout() {
    let a = run("CON k = 2\nDAT\n  mov 1, ##$12345\n");
    let text = a.listing.render(true);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "1      000000 <00000002> CON k = 2");
    assert_eq!(lines[2], "3      000000 [ff000091]   mov 1, ##$12345");
    assert_eq!(lines[3], "3      000004 [f6040345] ");
}
