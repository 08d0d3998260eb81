//! Operand classification and resolution.
//!
//! Any operand string handed to a rule or validator may be a plain literal,
//! a field reference (`[fieldName]`), or a variable reference (`%NAME%`)
//! answered by a pluggable external source. Resolution always reads the
//! store at the moment of evaluation; nothing is cached.

use crate::data::FormData;

/// What an operand string turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Field(String),
    Variable(String),
    Literal,
}

impl Operand {
    /// Classify an operand string without resolving it.
    pub fn classify(value: &str) -> Operand {
        if let Some(name) = field_reference(value) {
            Operand::Field(name.to_string())
        } else if let Some(name) = variable_reference(value) {
            Operand::Variable(name.to_string())
        } else {
            Operand::Literal
        }
    }
}

/// The field name inside a `[fieldName]` operand, if it is one.
pub fn field_reference(value: &str) -> Option<&str> {
    if value.len() > 2 && value.starts_with('[') && value.ends_with(']') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

/// The variable name inside a `%NAME%` operand, if it is one.
pub fn variable_reference(value: &str) -> Option<&str> {
    if value.len() > 2 && value.starts_with('%') && value.ends_with('%') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

/// Source for `%NAME%` operands. The engine treats this as an extension
/// point; a resolver that always answers with an empty string is legal.
pub trait VariableResolver {
    fn resolve(&self, name: &str) -> String;
}

/// The default resolver: every variable is the empty string.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve(&self, _name: &str) -> String {
        String::new()
    }
}

/// Resolve an operand against the current answers and variable source.
pub fn resolve(value: &str, data: &FormData, variables: &dyn VariableResolver) -> String {
    match Operand::classify(value) {
        Operand::Field(name) => data.get_value(&name),
        Operand::Variable(name) => variables.resolve(&name),
        Operand::Literal => value.to_string(),
    }
}
