use dice_expr::{
    dice_roll::{EvaluationErrors, DIVIDE_BY_ZERO},
    limits::DiceLimits,
    parse, parser::ParseError,
    roll, roll_with, RollError,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn value_of(raw: &str) -> i64 {
    roll(raw).unwrap().value
}

#[test]
fn test_left_associativity() {
    assert_eq!(value_of("1-2-3"), -4);
    assert_eq!(value_of("100/10/5"), 2);
}

#[test]
fn test_precedence() {
    assert_eq!(value_of("2+3*4"), 14);
    assert_eq!(value_of("(2+3)*4"), 20);
    assert_eq!(value_of("2 * (3 + 4) - 10 / 3"), 11);
}

#[test]
fn test_trace_omits_parentheses() {
    assert_eq!(roll("(2+3)*4").unwrap().trace, "2 + 3 * 4");
}

#[test]
fn test_divide_by_zero() {
    let result = roll("5/0").unwrap();
    assert_eq!(result.value, 0);
    assert!(result.trace.contains(DIVIDE_BY_ZERO));

    let result = roll("10 + 3d6/(2-2)").unwrap();
    assert_eq!(result.value, 10);
    assert_eq!(result.trace, format!("10 + {}", DIVIDE_BY_ZERO));
}

#[test]
fn test_unmatched_parenthesis() {
    match roll("(1+2") {
        Err(RollError::Parse(errors)) => assert!(!errors.0.is_empty()),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(
        roll("2 + fish").unwrap_err().to_string(),
        "\"fish\" was not recognized as a valid number or dice expression."
    );
    assert_eq!(
        roll("(1d0 + 2").unwrap_err().to_string(),
        "\"1d0\" has no sides to roll; Unmatched parenthesis."
    );
    assert_eq!(
        roll("9223372036854775807 + 1").unwrap_err(),
        RollError::Evaluation(EvaluationErrors::Overflow)
    );
}

#[test]
fn test_dice_count_is_capped() {
    match roll("4294967295d6") {
        Err(RollError::Parse(errors)) => assert!(matches!(
            errors.0.as_slice(),
            [ParseError::TooManyDice(text, _)] if text == "4294967295d6"
        )),
        other => panic!("expected a parse error, got {:?}", other),
    }
    assert!(matches!(roll("6000d6 + 6000d6"), Err(RollError::Parse(_))));
    assert!(roll("5000d6 + 5000d6").is_ok());
}

#[test]
fn test_lex_error_stops_before_parsing() {
    // the unmatched parenthesis is never reported because lexing fails first
    assert!(matches!(roll("(1 + x"), Err(RollError::Lex(_))));
}

#[test]
fn test_three_d_six() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
    for _ in 0..500 {
        let result = roll_with("3d6", &mut rng).unwrap();
        let rolls: Vec<i64> = result
            .trace
            .trim_matches(|c| c == '[' || c == ']')
            .split(", ")
            .map(|r| r.parse().unwrap())
            .collect();
        assert_eq!(rolls.len(), 3);
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));
        assert_eq!(rolls.iter().sum::<i64>(), result.value);
    }
}

#[test]
fn test_end_to_end_range() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(20);
    for _ in 0..1000 {
        let value = roll_with("3d6+(1d4/2)", &mut rng).unwrap().value;
        assert!((3..=20).contains(&value), "{} out of range", value);
    }
}

#[test]
fn test_reevaluating_a_tree() {
    let node = parse("4d20").unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let results: Vec<i64> = (0..50).map(|_| node.roll(&mut rng).unwrap().value).collect();
    assert!(results.iter().all(|v| (4..=80).contains(v)));
    assert!(results.iter().any(|v| *v != results[0]));

    let fixed = parse("(7 - 2) * 3 / 2").unwrap();
    let first = fixed.roll(&mut rng).unwrap();
    assert_eq!(first.value, 7);
    assert_eq!(fixed.roll(&mut rng).unwrap(), first);
}

#[test]
fn test_display_reparses() {
    let node = parse("d20 - (2d6 - 3) * (4 / 2)").unwrap();
    assert_eq!(node.to_string(), "1d20 - (2d6 - 3) * (4 / 2)");
    assert_eq!(parse(&node.to_string()).unwrap(), node);
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..=1000).prop_map(|n| n.to_string()),
        (0u32..=20, 1u32..=100).prop_map(|(count, sides)| format!("{}d{}", count, sides)),
        (1u32..=100).prop_map(|sides| format!("d{}", sides)),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| format!("({})", e)),
            (
                inner.clone(),
                prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
                inner
            )
                .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
        ]
    })
}

proptest! {
    #[test]
    fn test_results_within_limits(raw in expression(), seed in any::<u64>()) {
        let node = parse(&raw).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        if let Ok(result) = node.roll(&mut rng) {
            prop_assert!(node.min() <= result.value && result.value <= node.max());
        }
    }

    #[test]
    fn test_display_round_trips(raw in expression()) {
        let node = parse(&raw).unwrap();
        prop_assert_eq!(parse(&node.to_string()).unwrap(), node);
    }
}
