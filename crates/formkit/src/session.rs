//! The session: the one object a binding layer talks to.
//!
//! Owns the form, the rule table, the navigation cursor, and the plumbing
//! that brings asynchronous validation verdicts back onto the caller's
//! thread. Writing a value publishes it to the store first and only then
//! validates, so no validator ever observes a half-written value.

use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::data::DataChange;
use crate::form::{Form, FormError, ValidityResult};
use crate::navigate;
use crate::refs::{NoVariables, VariableResolver};
use crate::remote::{AsyncOutcome, HttpChecker, RemoteChecker};
use crate::rules::BusinessRules;

/// Emitted whenever a control's validity is (re)computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityChange {
    pub control: String,
    pub validator: &'static str,
    pub is_valid: bool,
}

/// One navigation step as seen by a binding layer. `questions` are indices
/// into the session's form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayView {
    pub questions: Vec<usize>,
    pub at_start: bool,
    pub at_end: bool,
}

type ValidityObserver = Box<dyn Fn(&ValidityChange)>;

pub struct FormSession {
    form: Form,
    rules: BusinessRules,
    variables: Rc<dyn VariableResolver>,
    checker: Arc<dyn RemoteChecker>,

    last_displayed: isize,
    at_start: bool,
    at_end: bool,

    results_tx: UnboundedSender<AsyncOutcome>,
    results_rx: UnboundedReceiver<AsyncOutcome>,
    validity_observers: Vec<ValidityObserver>,
}

impl FormSession {
    /// Take ownership of an authored form and its rules. Dependency wiring
    /// happens here; the form's shape is fixed from this point on.
    pub fn new(mut form: Form, rules: BusinessRules) -> Self {
        form.wire_dependencies();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            form,
            rules,
            variables: Rc::new(NoVariables),
            checker: Arc::new(HttpChecker::new()),
            last_displayed: -1,
            at_start: false,
            at_end: false,
            results_tx,
            results_rx,
            validity_observers: Vec::new(),
        }
    }

    pub fn set_variable_resolver(&mut self, variables: Rc<dyn VariableResolver>) {
        self.variables = variables;
    }

    pub fn set_remote_checker(&mut self, checker: Arc<dyn RemoteChecker>) {
        self.checker = checker;
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    pub fn at_start(&self) -> bool {
        self.at_start
    }

    pub fn at_end(&self) -> bool {
        self.at_end
    }

    pub fn get_value(&self, field: &str) -> String {
        self.form.get_value(field)
    }

    /// Store the value, then validate the field and cascade to everything
    /// that depends on it.
    pub fn set_value(&mut self, field: &str, value: &str) {
        self.form.set_value(field, value);
        self.validate(field);
    }

    /// Register an observer for data changes, scoped to this session.
    pub fn subscribe_data<F>(&mut self, observer: F)
    where
        F: Fn(&DataChange) + 'static,
    {
        self.form.data.subscribe(observer);
    }

    /// Register an observer for validity changes, scoped to this session.
    pub fn subscribe_validity<F>(&mut self, observer: F)
    where
        F: Fn(&ValidityChange) + 'static,
    {
        self.validity_observers.push(Box::new(observer));
    }

    /// Run one control's synchronous chain without cascading.
    pub fn check_validity(&mut self, field: &str) -> Result<ValidityResult, FormError> {
        let variables = Rc::clone(&self.variables);
        self.form.check_validity(field, variables.as_ref())
    }

    /// Validate a field and, transitively, every field recorded as
    /// dependent on it. Fields whose synchronous chain passes get their
    /// asynchronous validators started.
    pub fn validate(&mut self, field: &str) {
        let mut visited = BTreeSet::new();
        self.validate_inner(field, &mut visited);
    }

    fn validate_inner(&mut self, field: &str, visited: &mut BTreeSet<String>) {
        if !visited.insert(field.to_string()) {
            return;
        }
        if !self.form.has_control(field) {
            debug!(field, "no control for field; nothing to validate");
            return;
        }

        let result = match self.check_validity(field) {
            Ok(result) => result,
            Err(err) => {
                warn!(field, error = %err, "validity check failed");
                return;
            }
        };

        if let Some(failed_validator) = result.failed_validator {
            self.notify_validity(&ValidityChange {
                control: field.to_string(),
                validator: failed_validator,
                is_valid: false,
            });
        }

        if result.is_valid {
            self.start_async_checks(field);
        }

        for dependent in &result.dependent_fields {
            self.validate_inner(dependent, visited);
        }
    }

    fn start_async_checks(&self, field: &str) {
        let Some(control) = self.form.control(field) else {
            return;
        };
        if control.async_validators.is_empty() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(
                field,
                "async validators need a tokio runtime; skipping remote checks"
            );
            return;
        }

        let value = self.form.get_value(field);
        for validator in &control.async_validators {
            validator.trigger(
                &control.name,
                &value,
                Arc::clone(&self.checker),
                self.results_tx.clone(),
            );
        }
    }

    /// Apply every remote verdict that has arrived so far. Non-blocking.
    /// A verdict is applied as-is even if the value changed after the
    /// request went out: last response wins.
    pub fn drain_async_results(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.results_rx.try_recv() {
            self.apply_outcome(outcome);
            applied += 1;
        }
        applied
    }

    fn apply_outcome(&mut self, outcome: AsyncOutcome) {
        let Some(control) = self.form.control_mut(&outcome.control) else {
            warn!(control = %outcome.control, "async result for unknown control");
            return;
        };
        control.in_error = !outcome.valid;
        control.error_message = if outcome.valid {
            None
        } else {
            Some(outcome.message.clone())
        };

        self.notify_validity(&ValidityChange {
            control: outcome.control,
            validator: "Async",
            is_valid: outcome.valid,
        });
    }

    fn notify_validity(&self, change: &ValidityChange) {
        for observer in &self.validity_observers {
            observer(change);
        }
    }

    /// Advance the cursor and return the next (or previous) visible
    /// item(s). Also refreshes the validity state of every surfaced
    /// control so the binding layer can read it immediately.
    pub fn questions_to_display(&mut self, forwards: bool) -> DisplayView {
        let variables = Rc::clone(&self.variables);
        let display = if forwards {
            navigate::next_questions(
                &self.form,
                &self.rules,
                variables.as_ref(),
                self.last_displayed,
            )
        } else {
            navigate::previous_questions(
                &self.form,
                &self.rules,
                variables.as_ref(),
                self.last_displayed,
            )
        };

        self.at_start = display.at_start;
        self.at_end = display.at_end;
        self.last_displayed = display.last_item;

        let fields: Vec<String> = display
            .questions
            .iter()
            .flat_map(|&index| self.form.questions[index].controls.iter())
            .map(|control| control.name.clone())
            .collect();
        for field in fields {
            if let Err(err) = self.check_validity(&field) {
                warn!(field = %field, error = %err, "validity refresh failed");
            }
        }

        DisplayView {
            questions: display.questions,
            at_start: display.at_start,
            at_end: display.at_end,
        }
    }

    /// Reset the cursor to before the first question.
    pub fn rewind(&mut self) {
        self.last_displayed = -1;
        self.at_start = false;
        self.at_end = false;
    }

    pub fn is_valid(&self, field: &str) -> Option<bool> {
        self.form.control(field).map(|control| !control.in_error)
    }

    pub fn error_message(&self, field: &str) -> Option<String> {
        self.form
            .control(field)
            .and_then(|control| control.error_message.clone())
    }

    /// True while any control is flagged invalid.
    pub fn in_error(&self) -> bool {
        self.form
            .questions
            .iter()
            .flat_map(|question| question.controls.iter())
            .any(|control| control.in_error)
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("form", &self.form.name)
            .field("last_displayed", &self.last_displayed)
            .field("at_start", &self.at_start)
            .field("at_end", &self.at_end)
            .finish_non_exhaustive()
    }
}
