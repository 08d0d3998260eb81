//! Named boolean predicates over form data.
//!
//! A rule is an ordered list of parts combined with match-any or match-all
//! semantics. Each part reads one field, coerces both sides to a forced
//! evaluation type, and compares. Anything that cannot be coerced makes the
//! part false; rule evaluation never fails.

use tracing::{debug, warn};

use crate::data::FormData;
use crate::datetime;
use crate::refs::{self, VariableResolver};

/// How a rule combines its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatchType {
    MatchAll,
    MatchAny,
}

/// The closed set of part comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleComparison {
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    Contains,
    Between,
}

/// How operands are coerced before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationType {
    #[default]
    Default,
    Bool,
    Numeric,
    DateTime,
}

/// One predicate: a field, a comparison, and one or two operands.
#[derive(Debug, Clone)]
pub struct RulePart {
    pub field_name: String,
    pub comparison: RuleComparison,
    pub evaluation: EvaluationType,
    pub value: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl RulePart {
    pub fn new(
        field: &str,
        comparison: RuleComparison,
        value: &str,
        evaluation: Option<EvaluationType>,
    ) -> Self {
        Self {
            field_name: field.to_string(),
            comparison,
            evaluation: evaluation.unwrap_or_default(),
            value: Some(value.to_string()),
            min: None,
            max: None,
        }
    }

    pub fn range(field: &str, min: &str, max: &str, evaluation: Option<EvaluationType>) -> Self {
        Self {
            field_name: field.to_string(),
            comparison: RuleComparison::Between,
            evaluation: evaluation.unwrap_or_default(),
            value: None,
            min: Some(min.to_string()),
            max: Some(max.to_string()),
        }
    }

    /// Field names referenced by this part's operands.
    pub fn field_references(&self) -> Vec<String> {
        [&self.value, &self.min, &self.max]
            .into_iter()
            .flatten()
            .filter_map(|operand| refs::field_reference(operand))
            .map(str::to_string)
            .collect()
    }

    pub fn evaluate(&self, data: &FormData, variables: &dyn VariableResolver) -> bool {
        let compared = data.get_value(&self.field_name);

        match self.comparison {
            RuleComparison::Equals => self.evaluate_equal(&compared, data, variables),
            RuleComparison::NotEquals => !self.evaluate_equal(&compared, data, variables),
            RuleComparison::GreaterThan => self.evaluate_ordered(&compared, data, variables, false),
            RuleComparison::LessThan => self.evaluate_ordered(&compared, data, variables, true),
            RuleComparison::Contains => self.evaluate_contains(&compared, data, variables),
            RuleComparison::Between => self.evaluate_between(&compared, data, variables),
        }
    }

    fn operand(
        &self,
        raw: &Option<String>,
        data: &FormData,
        variables: &dyn VariableResolver,
    ) -> String {
        match raw {
            Some(raw) => refs::resolve(raw, data, variables),
            None => String::new(),
        }
    }

    fn evaluate_equal(
        &self,
        compared: &str,
        data: &FormData,
        variables: &dyn VariableResolver,
    ) -> bool {
        let target = self.operand(&self.value, data, variables);

        match self.evaluation {
            EvaluationType::Default => compared == target,
            EvaluationType::Bool => as_bool(compared) == as_bool(&target),
            EvaluationType::Numeric => match (parse_int(compared), parse_int(&target)) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
            EvaluationType::DateTime => {
                match (
                    datetime::parse_datetime(compared),
                    datetime::parse_datetime(&target),
                ) {
                    (Some(left), Some(right)) => left == right,
                    _ => false,
                }
            }
        }
    }

    fn evaluate_ordered(
        &self,
        compared: &str,
        data: &FormData,
        variables: &dyn VariableResolver,
        less: bool,
    ) -> bool {
        let target = self.operand(&self.value, data, variables);

        match self.evaluation {
            EvaluationType::Numeric => match (parse_int(compared), parse_int(&target)) {
                (Some(left), Some(right)) => {
                    if less {
                        left < right
                    } else {
                        left > right
                    }
                }
                _ => false,
            },
            EvaluationType::DateTime => {
                match (
                    datetime::parse_datetime(compared),
                    datetime::parse_datetime(&target),
                ) {
                    (Some(left), Some(right)) => {
                        if less {
                            left < right
                        } else {
                            left > right
                        }
                    }
                    _ => false,
                }
            }
            // Ordering is only defined for numeric and date/time coercion.
            _ => false,
        }
    }

    fn evaluate_contains(
        &self,
        compared: &str,
        data: &FormData,
        variables: &dyn VariableResolver,
    ) -> bool {
        let target = self.operand(&self.value, data, variables);
        compared.split(',').any(|item| item == target)
    }

    fn evaluate_between(
        &self,
        compared: &str,
        data: &FormData,
        variables: &dyn VariableResolver,
    ) -> bool {
        let min = self.operand(&self.min, data, variables);
        let max = self.operand(&self.max, data, variables);

        match self.evaluation {
            EvaluationType::Numeric => {
                match (parse_int(compared), parse_int(&min), parse_int(&max)) {
                    (Some(value), Some(min), Some(max)) => min < value && value < max,
                    _ => false,
                }
            }
            EvaluationType::DateTime => {
                match (
                    datetime::parse_datetime(compared),
                    datetime::parse_datetime(&min),
                    datetime::parse_datetime(&max),
                ) {
                    (Some(value), Some(min), Some(max)) => min < value && value < max,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn as_bool(value: &str) -> bool {
    let upper = value.to_uppercase();
    upper == "Y" || upper == "TRUE" || value == "1"
}

/// A named predicate: ordered parts plus a match type.
#[derive(Debug, Clone)]
pub struct BusinessRule {
    pub name: String,
    pub match_type: RuleMatchType,
    pub parts: Vec<RulePart>,
}

impl BusinessRule {
    pub fn new(name: &str, match_type: RuleMatchType) -> Self {
        Self {
            name: name.to_string(),
            match_type,
            parts: Vec::new(),
        }
    }

    pub fn add_part(
        &mut self,
        field: &str,
        comparison: RuleComparison,
        value: &str,
        evaluation: Option<EvaluationType>,
    ) -> &mut Self {
        self.parts
            .push(RulePart::new(field, comparison, value, evaluation));
        self
    }

    pub fn add_range_part(
        &mut self,
        field: &str,
        min: &str,
        max: &str,
        evaluation: Option<EvaluationType>,
    ) -> &mut Self {
        self.parts.push(RulePart::range(field, min, max, evaluation));
        self
    }

    /// Field names referenced by any part operand.
    pub fn field_references(&self) -> Vec<String> {
        self.parts
            .iter()
            .flat_map(RulePart::field_references)
            .collect()
    }

    /// Evaluate parts in declaration order with short-circuiting.
    /// A rule with no parts is false.
    pub fn evaluate(&self, data: &FormData, variables: &dyn VariableResolver) -> bool {
        let mut success = false;

        for part in &self.parts {
            success = part.evaluate(data, variables);

            if success && self.match_type == RuleMatchType::MatchAny {
                return true;
            }
            if !success && self.match_type == RuleMatchType::MatchAll {
                return false;
            }
        }

        success
    }
}

/// The rule table: unique names to rules. Unknown names evaluate to false.
#[derive(Debug, Default)]
pub struct BusinessRules {
    rules: std::collections::HashMap<String, BusinessRule>,
}

impl BusinessRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule and return it for part chaining. Re-registering a
    /// name is a configuration mistake; it is reported and the new rule
    /// replaces the old one.
    pub fn add_rule(&mut self, name: &str, match_type: RuleMatchType) -> &mut BusinessRule {
        if self.rules.contains_key(name) {
            warn!(rule = name, "rule has already been added; replacing");
        }
        self.rules
            .insert(name.to_string(), BusinessRule::new(name, match_type));
        self.rules.get_mut(name).unwrap()
    }

    pub fn rule(&self, name: &str) -> Option<&BusinessRule> {
        self.rules.get(name)
    }

    pub fn rule_mut(&mut self, name: &str) -> Option<&mut BusinessRule> {
        self.rules.get_mut(name)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn evaluate(
        &self,
        name: &str,
        data: &FormData,
        variables: &dyn VariableResolver,
    ) -> bool {
        match self.rules.get(name) {
            Some(rule) => rule.evaluate(data, variables),
            None => {
                debug!(rule = name, "rule not found; evaluating to false");
                false
            }
        }
    }
}
