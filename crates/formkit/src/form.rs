//! Form structure: ordered sections and questions, each question holding
//! an ordered list of controls, plus the answer store and the static
//! dependency index built after authoring.

use thiserror::Error;
use tracing::warn;

use crate::controls::{Control, ControlKind, DateType, OptionLayout, Options, TextType};
use crate::data::FormData;
use crate::refs::{self, VariableResolver};
use crate::remote::AsyncValidator;

/// How many questions are surfaced per navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawType {
    SingleQuestion,
    EntireSection,
    EntireForm,
}

/// Contract violations. Everything shaped by end-user data degrades to a
/// conservative boolean instead of landing here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no control is registered for field '{0}'")]
    UnknownControl(String),
}

/// Result of running a control's synchronous chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityResult {
    pub is_valid: bool,
    pub message: Option<String>,
    /// Label of the validator that failed, when one did.
    pub failed_validator: Option<&'static str>,
    /// Fields that must be re-validated because they reference this one.
    pub dependent_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: usize,
    pub title: String,
    /// Visibility rule name; absent means always visible.
    pub rule_to_match: Option<String>,
}

#[derive(Debug)]
pub struct Question {
    pub name: String,
    pub caption: Option<String>,
    pub section_id: Option<usize>,
    pub rule_to_match: Option<String>,
    pub controls: Vec<Control>,
}

impl Question {
    fn new(name: &str, caption: Option<&str>, section_id: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            caption: caption.map(str::to_string),
            section_id,
            rule_to_match: None,
            controls: Vec::new(),
        }
    }

    pub fn set_display_rule(&mut self, rule_name: &str) -> &mut Self {
        self.rule_to_match = Some(rule_name.to_string());
        self
    }

    pub fn add_control(&mut self, name: &str, kind: ControlKind) -> &mut Control {
        let control = Control::new(&self.name, name, kind);
        self.controls.push(control);
        self.controls.last_mut().unwrap()
    }

    pub fn add_label(&mut self, name: &str, text: &str) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Label {
                text: text.to_string(),
            },
        )
    }

    pub fn add_html(&mut self, name: &str, html: &str) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Html {
                html: html.to_string(),
            },
        )
    }

    pub fn add_text_control(
        &mut self,
        name: &str,
        text_type: TextType,
        max_length: usize,
        placeholder: Option<&str>,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Text {
                text_type,
                max_length,
                placeholder: placeholder.map(str::to_string),
            },
        )
    }

    pub fn add_option_control(
        &mut self,
        name: &str,
        options: Options,
        layout: OptionLayout,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Option {
                options,
                multi: false,
                layout,
            },
        )
    }

    pub fn add_option_multi_control(
        &mut self,
        name: &str,
        options: Options,
        layout: OptionLayout,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Option {
                options,
                multi: true,
                layout,
            },
        )
    }

    pub fn add_date_control(&mut self, name: &str, date_type: DateType) -> &mut Control {
        self.add_control(name, ControlKind::Date { date_type })
    }

    pub fn add_time_control(
        &mut self,
        name: &str,
        minute_step: u8,
        hour_start: u8,
        hour_end: u8,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Time {
                hour_start,
                hour_end,
                minute_step,
            },
        )
    }

    pub fn add_date_time_control(
        &mut self,
        name: &str,
        minute_step: u8,
        hour_start: u8,
        hour_end: u8,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::DateTime {
                hour_start,
                hour_end,
                minute_step,
            },
        )
    }

    pub fn add_telephone_control(
        &mut self,
        name: &str,
        max_length: usize,
        placeholder: Option<&str>,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Telephone {
                max_length,
                placeholder: placeholder.map(str::to_string),
            },
        )
    }

    pub fn add_toggle_control(&mut self, name: &str, text: Option<&str>) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Toggle {
                text: text.map(str::to_string),
            },
        )
    }

    pub fn add_slider_control(
        &mut self,
        name: &str,
        min: i64,
        max: i64,
        step: i64,
        text: &str,
    ) -> &mut Control {
        self.add_control(
            name,
            ControlKind::Slider {
                min,
                max,
                step,
                text: text.to_string(),
            },
        )
    }
}

/// A whole questionnaire: sections, questions, and the answer store.
#[derive(Debug)]
pub struct Form {
    pub name: String,
    pub draw_type: DrawType,
    pub sections: Vec<Section>,
    pub questions: Vec<Question>,
    pub data: FormData,
}

impl Form {
    pub fn new(name: &str, draw_type: DrawType) -> Self {
        Self {
            name: name.to_string(),
            draw_type,
            sections: Vec::new(),
            questions: Vec::new(),
            data: FormData::new(),
        }
    }

    /// Append a section and return its id.
    pub fn add_section(&mut self, title: &str) -> usize {
        self.add_section_with_rule(title, None)
    }

    pub fn add_section_with_rule(&mut self, title: &str, rule_to_match: Option<&str>) -> usize {
        let id = self.sections.len() + 1;
        self.sections.push(Section {
            id,
            title: title.to_string(),
            rule_to_match: rule_to_match.map(str::to_string),
        });
        id
    }

    /// Append a question. A section id that names no section is reported
    /// and the question is still added; the form stays usable.
    pub fn add_question(
        &mut self,
        name: &str,
        caption: Option<&str>,
        section_id: Option<usize>,
    ) -> &mut Question {
        if let Some(section_id) = section_id
            && !self.sections.iter().any(|section| section.id == section_id)
        {
            warn!(
                question = name,
                section_id, "question references a section that does not exist"
            );
        }
        self.questions.push(Question::new(name, caption, section_id));
        self.questions.last_mut().unwrap()
    }

    pub fn question(&self, name: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.name == name)
    }

    pub fn question_mut(&mut self, name: &str) -> Option<&mut Question> {
        self.questions
            .iter_mut()
            .find(|question| question.name == name)
    }

    pub fn get_value(&self, name: &str) -> String {
        self.data.get_value(name)
    }

    pub fn set_value(&mut self, name: &str, value: &str) {
        self.data.set_value(name, value);
    }

    pub fn has_control(&self, field: &str) -> bool {
        self.control(field).is_some()
    }

    pub fn control(&self, field: &str) -> Option<&Control> {
        self.questions
            .iter()
            .flat_map(|question| question.controls.iter())
            .find(|control| control.name == field)
    }

    pub fn control_mut(&mut self, field: &str) -> Option<&mut Control> {
        self.questions
            .iter_mut()
            .flat_map(|question| question.controls.iter_mut())
            .find(|control| control.name == field)
    }

    /// Build the static dependency index. Call once, after authoring:
    /// folds option-URL references into each control's reference set, then
    /// fills the reverse index (`is_referenced_by`) used to cascade
    /// re-validation when a referenced field changes.
    pub fn wire_dependencies(&mut self) {
        for question in &mut self.questions {
            for control in &mut question.controls {
                if let ControlKind::Option { options, .. } = &control.kind {
                    let url_references = options.url_field_references();
                    control.references.extend(url_references);
                }
            }
        }

        let edges: Vec<(String, Vec<String>)> = self
            .questions
            .iter()
            .flat_map(|question| question.controls.iter())
            .map(|control| {
                (
                    control.name.clone(),
                    control.references.iter().cloned().collect(),
                )
            })
            .collect();

        for (referencing, referenced_fields) in edges {
            for field in referenced_fields {
                match self.control_mut(&field) {
                    Some(target) => target.add_referenced_by(&referencing),
                    None => warn!(
                        control = %referencing,
                        field = %field,
                        "validator references a field with no control"
                    ),
                }
            }
        }
    }

    /// Run the synchronous chain for one control. Asking about a field
    /// with no registered control is a caller bug, not form data.
    pub fn check_validity(
        &mut self,
        field: &str,
        variables: &dyn VariableResolver,
    ) -> Result<ValidityResult, FormError> {
        let control = self
            .control(field)
            .ok_or_else(|| FormError::UnknownControl(field.to_string()))?;

        let failed = control.first_failing(&self.data, variables);
        let dependent_fields: Vec<String> = control.is_referenced_by.iter().cloned().collect();
        let (message, failed_validator) = match failed {
            Some(index) => {
                let validator = &control.validators[index];
                (Some(validator.message.clone()), Some(validator.kind_label()))
            }
            None => (None, None),
        };

        let control = self.control_mut(field).expect("control existed above");
        control.in_error = failed.is_some();
        control.error_message = message.clone();

        Ok(ValidityResult {
            is_valid: failed.is_none(),
            message,
            failed_validator,
            dependent_fields,
        })
    }

    /// True if the operand is a `[field]` reference.
    pub fn is_field_reference(value: &str) -> bool {
        refs::field_reference(value).is_some()
    }

    /// True if the operand is a `%VARIABLE%` reference.
    pub fn is_variable_reference(value: &str) -> bool {
        refs::variable_reference(value).is_some()
    }
}

// Convenience constructor mirroring the common authoring path: a question
// that needs an async validator attaches it through the control chain.
impl Control {
    pub fn add_remote_check(&mut self, url: &str, message: &str) -> &mut Self {
        self.add_async_validator(AsyncValidator::new(url, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::NoVariables;
    use crate::validators::Validator;

    #[test]
    fn unknown_control_is_a_contract_violation() {
        let mut form = Form::new("f", DrawType::EntireForm);
        let err = form.check_validity("ghost", &NoVariables).unwrap_err();
        assert_eq!(err, FormError::UnknownControl("ghost".to_string()));
    }

    #[test]
    fn control_ids_combine_question_and_control_names() {
        let mut form = Form::new("f", DrawType::EntireForm);
        let question = form.add_question("q1", Some("About you"), None);
        let control = question.add_text_control("firstName", TextType::SingleLine, 50, None);
        assert_eq!(control.control_id, "q1:firstName");
    }

    #[test]
    fn unknown_section_id_still_adds_the_question() {
        let mut form = Form::new("f", DrawType::EntireForm);
        form.add_section("Only");
        form.add_question("q1", None, Some(9))
            .add_text_control("field", TextType::SingleLine, 50, None);

        let question = form.question("q1").expect("question was added");
        assert_eq!(question.section_id, Some(9));
        assert!(form.has_control("field"));
    }

    #[test]
    fn wiring_builds_the_reverse_index() {
        let mut form = Form::new("f", DrawType::EntireForm);
        form.add_question("q1", None, None)
            .add_date_control("startDate", DateType::Full);
        form.add_question("q2", None, None)
            .add_date_control("endDate", DateType::Full)
            .add_validator(Validator::date_must_be_after(
                "[startDate]",
                "Must be after the start",
            ));
        form.wire_dependencies();

        let start = form.control("startDate").unwrap();
        assert!(start.is_referenced_by.contains("endDate"));
        let end = form.control("endDate").unwrap();
        assert!(end.references.contains("startDate"));
    }
}
