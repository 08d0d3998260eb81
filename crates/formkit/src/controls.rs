//! Input controls.
//!
//! A control is created once when the form is authored and is immutable in
//! shape thereafter; only its validity flag and error message change at
//! runtime. Control kinds are a closed tagged union dispatched in one place
//! rather than an open class hierarchy.

use std::collections::BTreeSet;

use crate::data::FormData;
use crate::datetime;
use crate::refs;
use crate::remote::AsyncValidator;
use crate::validators::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    SingleLine,
    MultiLine,
    Password,
    Email,
    Url,
    TelephoneNumber,
    PostalCode,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateType {
    Full,
    MonthYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionLayout {
    Vertical,
    Horizontal,
}

/// One selectable option: a stored code and a display description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValue {
    pub code: String,
    pub description: String,
}

impl OptionValue {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

/// Where an option control gets its list: inline, or from a URL whose path
/// segments may reference other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub list: Vec<OptionValue>,
    pub source_url: Option<String>,
    pub empty_item: Option<String>,
}

impl Options {
    pub fn from_list(list: Vec<OptionValue>, empty_item: Option<&str>) -> Self {
        Self {
            list,
            source_url: None,
            empty_item: empty_item.map(str::to_string),
        }
    }

    pub fn from_url(url: &str, empty_item: Option<&str>) -> Self {
        Self {
            list: Vec::new(),
            source_url: Some(url.to_string()),
            empty_item: empty_item.map(str::to_string),
        }
    }

    pub fn has_option_list(&self) -> bool {
        !self.list.is_empty()
    }

    pub fn has_url(&self) -> bool {
        self.source_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Fields referenced by the option-source URL's path segments.
    pub fn url_field_references(&self) -> Vec<String> {
        let Some(url) = &self.source_url else {
            return Vec::new();
        };
        let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() <= 3 {
            return Vec::new();
        }
        segments[3..]
            .iter()
            .filter_map(|segment| refs::field_reference(segment))
            .map(str::to_string)
            .collect()
    }

    /// Substitute `[field]` path segments with current values. Returns None
    /// if any referenced field has no value yet.
    pub fn url_for_service(&self, data: &FormData) -> Option<String> {
        let base = self.source_url.as_ref()?;
        if !base.contains('[') {
            return Some(base.clone());
        }

        let segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Some(base.clone());
        }

        let mut url = format!("{}//{}/", segments[0], segments[1]);
        for segment in &segments[2..] {
            match refs::field_reference(segment) {
                Some(field) => {
                    let value = data.get_value(field);
                    if value.is_empty() {
                        return None;
                    }
                    url.push_str(&value);
                    url.push('/');
                }
                None => {
                    url.push_str(segment);
                    url.push('/');
                }
            }
        }

        Some(url.trim_end_matches('/').to_string())
    }
}

/// The closed set of control shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Label {
        text: String,
    },
    Html {
        html: String,
    },
    Text {
        text_type: TextType,
        max_length: usize,
        placeholder: Option<String>,
    },
    Option {
        options: Options,
        multi: bool,
        layout: OptionLayout,
    },
    Date {
        date_type: DateType,
    },
    Time {
        hour_start: u8,
        hour_end: u8,
        minute_step: u8,
    },
    DateTime {
        hour_start: u8,
        hour_end: u8,
        minute_step: u8,
    },
    Telephone {
        max_length: usize,
        placeholder: Option<String>,
    },
    Toggle {
        text: Option<String>,
    },
    Slider {
        min: i64,
        max: i64,
        step: i64,
        text: String,
    },
}

/// A single input: identity, shape, validator chains, and the dependency
/// sets built while the form is authored.
#[derive(Debug)]
pub struct Control {
    /// `questionName:controlName`.
    pub control_id: String,
    pub name: String,
    pub kind: ControlKind,
    pub label: Option<String>,
    pub read_only: bool,

    pub validators: Vec<Validator>,
    pub async_validators: Vec<AsyncValidator>,

    /// Fields this control's validators and option source read.
    pub references: BTreeSet<String>,
    /// Fields whose change must re-trigger validation of this control.
    pub is_referenced_by: BTreeSet<String>,

    pub in_error: bool,
    pub error_message: Option<String>,
}

impl Control {
    pub(crate) fn new(question_name: &str, name: &str, kind: ControlKind) -> Self {
        Self {
            control_id: format!("{question_name}:{name}"),
            name: name.to_string(),
            kind,
            label: None,
            read_only: false,
            validators: Vec::new(),
            async_validators: Vec::new(),
            references: BTreeSet::new(),
            is_referenced_by: BTreeSet::new(),
            in_error: false,
            error_message: None,
        }
    }

    pub fn add_label(&mut self, label: &str) -> &mut Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn add_validator(&mut self, validator: Validator) -> &mut Self {
        self.references.extend(validator.references());
        self.validators.push(validator);
        self
    }

    pub fn add_async_validator(&mut self, validator: AsyncValidator) -> &mut Self {
        self.async_validators.push(validator);
        self
    }

    pub(crate) fn add_referenced_by(&mut self, control_name: &str) {
        self.is_referenced_by.insert(control_name.to_string());
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, ControlKind::Option { .. })
    }

    pub fn is_date_kind(&self) -> bool {
        matches!(
            self.kind,
            ControlKind::Date { .. } | ControlKind::Time { .. } | ControlKind::DateTime { .. }
        )
    }

    pub(crate) fn has_empty_option_list(&self) -> bool {
        match &self.kind {
            ControlKind::Option { options, .. } => !options.has_option_list(),
            _ => false,
        }
    }

    /// Index of the first synchronous validator that fails, if any.
    pub(crate) fn first_failing(
        &self,
        data: &FormData,
        variables: &dyn crate::refs::VariableResolver,
    ) -> Option<usize> {
        self.validators
            .iter()
            .position(|validator| !validator.is_valid(self, data, variables))
    }

    // Binding helpers for date/time shaped controls.

    pub fn day(&self, data: &FormData) -> String {
        datetime::day_from(&data.get_value(&self.name)).to_string()
    }

    pub fn month(&self, data: &FormData) -> String {
        datetime::month_from(&data.get_value(&self.name)).to_string()
    }

    pub fn year(&self, data: &FormData) -> String {
        datetime::year_from(&data.get_value(&self.name)).to_string()
    }

    pub fn hour_list(&self) -> Vec<String> {
        let (start, end) = match self.kind {
            ControlKind::Time {
                hour_start,
                hour_end,
                ..
            }
            | ControlKind::DateTime {
                hour_start,
                hour_end,
                ..
            } => (hour_start, hour_end),
            _ => return Vec::new(),
        };
        (start..end).map(|hour| format!("{hour:02}")).collect()
    }

    pub fn minute_list(&self) -> Vec<String> {
        let step = match self.kind {
            ControlKind::Time { minute_step, .. } | ControlKind::DateTime { minute_step, .. } => {
                minute_step
            }
            _ => return Vec::new(),
        };
        let step = if (1..=59).contains(&step) { step } else { 1 };
        (0..60u8)
            .step_by(step as usize)
            .map(|minute| format!("{minute:02}"))
            .collect()
    }

    pub fn month_names() -> [&'static str; 13] {
        [
            "Month",
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ]
    }

    /// IDD prefix of a telephone answer stored as `idd:number`.
    pub fn idd(&self, data: &FormData) -> String {
        let value = data.get_value(&self.name);
        value.split(':').next().unwrap_or("").to_string()
    }

    /// Subscriber number of a telephone answer stored as `idd:number`.
    pub fn number(&self, data: &FormData) -> String {
        let value = data.get_value(&self.name);
        value.split(':').nth(1).unwrap_or("").to_string()
    }
}
