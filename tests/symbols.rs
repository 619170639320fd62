use propeller2_asm::error::{ExprError, LineError, Scope, SymbolError};
use propeller2_asm::symbols::{SymbolKind, SymbolTable};
use propeller2_asm::{assemble, AsmOptions, Assembly, Source};
use pretty_assertions::assert_eq;

fn run(src: &str) -> Assembly {
    assemble(Source::Text(src.to_string()), &AsmOptions::default()).unwrap()
}

#[test]
fn table_is_case_insensitive() {
    let mut t = SymbolTable::new();
    t.define("Blink", SymbolKind::Label, 3, 12, 1, true).unwrap();
    assert_eq!(t.lookup("BLINK", false).map(|s| (s.value, s.hub)), Some((3, 12)));
    assert_eq!(t.len(), 1);
}

#[test]
fn redefinition_reports_existing_line_and_value() {
    let mut t = SymbolTable::new();
    t.define("x", SymbolKind::Constant, 5, 0, 2, true).unwrap();
    assert_eq!(
        t.define("X", SymbolKind::Constant, 6, 0, 7, true).unwrap_err(),
        SymbolError::Duplicate { name: "X".into(), line: 7, value: 6, existing_line: 2, existing_value: 5 }
    );
}

#[test]
fn undefined_names_fail_in_pass_two_with_their_scope() {
    let a = run("start  mov 1, #nowhere\n       mov 1, #.nowhere\n");
    let errs: Vec<LineError> = a.listing.diagnostics().map(|(_, d)| d.error.clone()).collect();
    assert_eq!(
        errs,
        vec![
            LineError::Expr(ExprError::UndefinedSymbol { scope: Scope::Global, name: "nowhere".into() }),
            LineError::Expr(ExprError::UndefinedSymbol { scope: Scope::Local, name: "nowhere".into() }),
        ]
    );
    assert_eq!(a.record(2).unwrap().diagnostics[0].message, "Undefined local symbol 'nowhere'.");
}

#[test]
fn hub_address_of_a_cog_label() {
    let a = run("  orgh $400\n  long 0\n  org 0\nentry nop\n  orgh\n  long @entry, entry\n");
    assert!(!a.has_errors(), "{}", a.listing.render(false));
    let entry = a.symbol("entry").unwrap();
    assert_eq!((entry.value, entry.hub, entry.kind), (0, 0x404, SymbolKind::Label));
    assert_eq!(a.record(6).unwrap().data, vec![0x04, 0x04, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn constants_may_refer_forward() {
    let a = run("CON\n  a = b + 1\n  b = 2\nDAT\n  mov 1, #a\n");
    assert!(!a.has_errors(), "{}", a.listing.render(false));
    assert_eq!(a.symbol("a").map(|s| s.value), Some(3));
    assert_eq!(a.words(), vec![0xF604_0203]);
}

#[test]
fn symbol_snapshot_is_sorted_by_name() {
    let a = run("CON\n  zeta = 1\n  Alpha = 2\n  mid = 3\n");
    let names: Vec<&str> = a.symbols().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "mid", "zeta"]);
    assert!(a.listing.render_symbols().starts_with("Alpha"));
}
