#![allow(missing_docs)]

pub mod controls;
pub mod data;
pub mod datetime;
pub mod form;
pub mod navigate;
pub mod refs;
pub mod remote;
pub mod rules;
pub mod session;
pub mod validators;

pub use controls::{
    Control, ControlKind, DateType, OptionLayout, OptionValue, Options, TextType,
};
pub use data::{DataChange, FormData};
pub use form::{DrawType, Form, FormError, Question, Section, ValidityResult};
pub use navigate::{DisplayQuestions, display_questions, next_questions, previous_questions};
pub use refs::{NoVariables, Operand, VariableResolver, resolve};
pub use remote::{AsyncOutcome, AsyncValidator, HttpChecker, RemoteChecker};
pub use rules::{BusinessRule, BusinessRules, EvaluationType, RuleComparison, RuleMatchType, RulePart};
pub use session::{DisplayView, FormSession, ValidityChange};
pub use validators::{Validator, ValidatorKind};
