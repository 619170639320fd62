use propeller2_asm::error::{ExprError, Scope, Tier};
use propeller2_asm::expr::evaluate_str;
use pretty_assertions::assert_eq;

fn val(text: &str) -> u32 {
    evaluate_str(text).unwrap()
}

#[test]
fn tiers_from_tightest_to_loosest() {
    assert_eq!(val("2 + 3 * 4"), 14);
    assert_eq!(val("2 * 3 + 4"), 10);
    // addops bind tighter than shifts, shifts tighter than bitwise ops
    assert_eq!(val("1 << 1 + 1"), 4);
    assert_eq!(val("1 + 1 << 2"), 8);
    assert_eq!(val("$10 >> 2 | 1"), 5);
    assert_eq!(val("3 & 1 << 1"), 2);
}

#[test]
fn operators_of_one_tier_associate_left() {
    assert_eq!(val("10 - 4 - 3"), 3);
    assert_eq!(val("100 / 10 / 5"), 2);
    // equal precedence inside binops: (1 | 2) & 1
    assert_eq!(val("1 | 2 & 1"), 1);
}

#[test]
fn radixes_mix() {
    assert_eq!(val("%1010 + $F + %%33"), 40);
    assert_eq!(val("1_000"), 1000);
}

#[test]
fn signed_division_and_shifts() {
    assert_eq!(val("-7 / 2"), (-3i32) as u32);
    assert_eq!(val("-7 // 2"), (-1i32) as u32);
    assert_eq!(val("-1 >> 28"), 15);
    assert_eq!(val("-16 ~> 2"), (-4i32) as u32);
    assert_eq!(val("3--1"), 4);
}

#[test]
fn end_of_line_names_the_tier() {
    assert_eq!(evaluate_str("2 +"), Err(ExprError::UnexpectedEndOfLine { tier: Tier::Addops }));
    assert_eq!(evaluate_str("3 *"), Err(ExprError::UnexpectedEndOfLine { tier: Tier::Mulops }));
    assert_eq!(evaluate_str("1 <<"), Err(ExprError::UnexpectedEndOfLine { tier: Tier::Shiftops }));
    assert_eq!(evaluate_str("1 &"), Err(ExprError::UnexpectedEndOfLine { tier: Tier::Binops }));
    assert_eq!(
        evaluate_str("2 +").unwrap_err().to_string(),
        "Unexpected end of line in addops."
    );
}

#[test]
fn other_expression_errors() {
    assert_eq!(
        evaluate_str("FOO + 1"),
        Err(ExprError::UndefinedSymbol { scope: Scope::Global, name: "FOO".into() })
    );
    assert_eq!(evaluate_str("1 / 0"), Err(ExprError::DivisionByZero));
    assert_eq!(evaluate_str("1 ? 2"), Err(ExprError::InvalidCharacter { tier: Tier::Binops, ch: '?' }));
    assert_eq!(
        evaluate_str("(1 + 2"),
        Err(ExprError::Expected { expected: ")", found: "end of line".into() })
    );
}
