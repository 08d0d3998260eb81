use pretty_assertions::assert_eq;

use formkit::refs::NoVariables;
use formkit::{BusinessRules, EvaluationType, FormData, RuleComparison, RuleMatchType};

fn data(pairs: &[(&str, &str)]) -> FormData {
    let mut data = FormData::new();
    for (field, value) in pairs {
        data.set_value(field, value);
    }
    data
}

#[test]
fn unknown_rule_evaluates_false() {
    let rules = BusinessRules::new();
    let data = FormData::new();
    assert!(!rules.evaluate("nothere", &data, &NoVariables));
}

#[test]
fn empty_rule_evaluates_false() {
    let mut rules = BusinessRules::new();
    rules.add_rule("empty", RuleMatchType::MatchAny);
    let data = FormData::new();
    assert!(!rules.evaluate("empty", &data, &NoVariables));
}

#[test]
fn match_any_passes_on_first_satisfied_part() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("either", RuleMatchType::MatchAny)
        .add_part("colour", RuleComparison::Equals, "red", None)
        .add_part("colour", RuleComparison::Equals, "blue", None);

    assert!(rules.evaluate("either", &data(&[("colour", "red")]), &NoVariables));
    assert!(rules.evaluate("either", &data(&[("colour", "blue")]), &NoVariables));
    assert!(!rules.evaluate("either", &data(&[("colour", "green")]), &NoVariables));
}

#[test]
fn match_all_fails_on_first_failed_part() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("both", RuleMatchType::MatchAll)
        .add_part("colour", RuleComparison::Equals, "red", None)
        .add_part("size", RuleComparison::Equals, "large", None);

    assert!(rules.evaluate(
        "both",
        &data(&[("colour", "red"), ("size", "large")]),
        &NoVariables
    ));
    assert!(!rules.evaluate(
        "both",
        &data(&[("colour", "red"), ("size", "small")]),
        &NoVariables
    ));
    assert!(!rules.evaluate("both", &data(&[("size", "large")]), &NoVariables));
}

#[test]
fn re_registering_a_rule_name_replaces_the_rule() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("gate", RuleMatchType::MatchAll)
        .add_part("colour", RuleComparison::Equals, "red", None);
    rules
        .add_rule("gate", RuleMatchType::MatchAll)
        .add_part("size", RuleComparison::Equals, "large", None);

    // Only the second registration's parts remain.
    assert!(rules.evaluate("gate", &data(&[("size", "large")]), &NoVariables));
    assert!(!rules.evaluate(
        "gate",
        &data(&[("colour", "red"), ("size", "small")]),
        &NoVariables
    ));
    assert_eq!(rules.rule("gate").unwrap().parts.len(), 1);
}

#[test]
fn default_comparison_is_case_sensitive() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("exact", RuleMatchType::MatchAll)
        .add_part("answer", RuleComparison::Equals, "Yes", None);

    assert!(rules.evaluate("exact", &data(&[("answer", "Yes")]), &NoVariables));
    assert!(!rules.evaluate("exact", &data(&[("answer", "yes")]), &NoVariables));
}

#[test]
fn bool_coercion_normalises_truthy_tokens() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("agreed", RuleMatchType::MatchAll)
        .add_part(
            "optIn",
            RuleComparison::Equals,
            "true",
            Some(EvaluationType::Bool),
        );

    for token in ["Y", "y", "TRUE", "true", "1"] {
        assert!(
            rules.evaluate("agreed", &data(&[("optIn", token)]), &NoVariables),
            "token {token:?} should coerce to true"
        );
    }
    assert!(!rules.evaluate("agreed", &data(&[("optIn", "no")]), &NoVariables));
    assert!(!rules.evaluate("agreed", &data(&[("optIn", "")]), &NoVariables));
}

#[test]
fn numeric_comparison_fails_closed_on_parse_errors() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("old", RuleMatchType::MatchAll)
        .add_part(
            "age",
            RuleComparison::GreaterThan,
            "18",
            Some(EvaluationType::Numeric),
        );

    assert!(rules.evaluate("old", &data(&[("age", "19")]), &NoVariables));
    assert!(!rules.evaluate("old", &data(&[("age", "18")]), &NoVariables));
    assert!(!rules.evaluate("old", &data(&[("age", "old enough")]), &NoVariables));
    assert!(!rules.evaluate("old", &data(&[("age", "")]), &NoVariables));
}

#[test]
fn ordering_is_undefined_for_string_and_bool_coercion() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("gt-default", RuleMatchType::MatchAll)
        .add_part("field", RuleComparison::GreaterThan, "a", None);
    rules
        .add_rule("lt-bool", RuleMatchType::MatchAll)
        .add_part(
            "field",
            RuleComparison::LessThan,
            "true",
            Some(EvaluationType::Bool),
        );

    let data = data(&[("field", "b")]);
    assert!(!rules.evaluate("gt-default", &data, &NoVariables));
    assert!(!rules.evaluate("lt-bool", &data, &NoVariables));
}

#[test]
fn datetime_comparison_uses_the_shared_parser() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("later", RuleMatchType::MatchAll)
        .add_part(
            "when",
            RuleComparison::GreaterThan,
            "2021-06-01",
            Some(EvaluationType::DateTime),
        );

    assert!(rules.evaluate("later", &data(&[("when", "2021-06-02")]), &NoVariables));
    assert!(!rules.evaluate("later", &data(&[("when", "2021-05-31")]), &NoVariables));
    // 31 February never parses, so the comparison is false, not an error.
    assert!(!rules.evaluate("later", &data(&[("when", "2021-02-31")]), &NoVariables));
}

#[test]
fn contains_checks_comma_separated_membership() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("picked", RuleMatchType::MatchAll)
        .add_part("toppings", RuleComparison::Contains, "olives", None);

    assert!(rules.evaluate(
        "picked",
        &data(&[("toppings", "ham,olives,mushroom")]),
        &NoVariables
    ));
    assert!(rules.evaluate("picked", &data(&[("toppings", "olives")]), &NoVariables));
    assert!(!rules.evaluate(
        "picked",
        &data(&[("toppings", "ham,mushroom")]),
        &NoVariables
    ));
    // Membership is literal, not substring.
    assert!(!rules.evaluate(
        "picked",
        &data(&[("toppings", "green olives,ham")]),
        &NoVariables
    ));
}

#[test]
fn between_is_a_strict_open_interval() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("inRange", RuleMatchType::MatchAll)
        .add_range_part("count", "10", "20", Some(EvaluationType::Numeric));

    assert!(!rules.evaluate("inRange", &data(&[("count", "10")]), &NoVariables));
    for value in 11..=19 {
        assert!(
            rules.evaluate(
                "inRange",
                &data(&[("count", &value.to_string())]),
                &NoVariables
            ),
            "{value} should be inside (10, 20)"
        );
    }
    assert!(!rules.evaluate("inRange", &data(&[("count", "20")]), &NoVariables));
    assert!(!rules.evaluate("inRange", &data(&[("count", "ten")]), &NoVariables));
}

#[test]
fn between_requires_numeric_or_datetime() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("stringRange", RuleMatchType::MatchAll)
        .add_range_part("letter", "a", "z", None);

    assert!(!rules.evaluate("stringRange", &data(&[("letter", "m")]), &NoVariables));
}

#[test]
fn between_over_dates() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("window", RuleMatchType::MatchAll)
        .add_range_part(
            "visit",
            "2021-06-01",
            "2021-06-30",
            Some(EvaluationType::DateTime),
        );

    assert!(rules.evaluate("window", &data(&[("visit", "2021-06-15")]), &NoVariables));
    assert!(!rules.evaluate("window", &data(&[("visit", "2021-06-01")]), &NoVariables));
    assert!(!rules.evaluate("window", &data(&[("visit", "2021-07-01")]), &NoVariables));
}

#[test]
fn operands_may_reference_other_fields() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("matchesOther", RuleMatchType::MatchAll)
        .add_part("confirm", RuleComparison::Equals, "[email]", None);

    assert!(rules.evaluate(
        "matchesOther",
        &data(&[("email", "a@b.com"), ("confirm", "a@b.com")]),
        &NoVariables
    ));
    assert!(!rules.evaluate(
        "matchesOther",
        &data(&[("email", "a@b.com"), ("confirm", "x@y.com")]),
        &NoVariables
    ));
}

#[test]
fn rule_parts_report_their_field_references() {
    let mut rules = BusinessRules::new();
    rules
        .add_rule("dependent", RuleMatchType::MatchAll)
        .add_part("confirm", RuleComparison::Equals, "[email]", None)
        .add_range_part("day", "[start]", "[end]", Some(EvaluationType::DateTime));

    let references = rules.rule("dependent").unwrap().field_references();
    assert_eq!(references, vec!["email", "start", "end"]);
}
