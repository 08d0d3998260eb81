//! Navigation over the question sequence.
//!
//! The cursor is a single integer: the last displayed question (or section,
//! in section mode). Moving forwards or backwards scans for the next item
//! whose visibility rule evaluates true, and independently probes one step
//! further in each direction to report whether another move would find
//! anything. Probes never commit the cursor.

use crate::form::{DrawType, Form, Question, Section};
use crate::refs::VariableResolver;
use crate::rules::BusinessRules;

/// What one navigation step produced. `questions` holds indices into
/// `form.questions`; `last_item` is the committed cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayQuestions {
    pub questions: Vec<usize>,
    pub at_start: bool,
    pub at_end: bool,
    pub number_of_controls: usize,
    pub last_item: isize,
}

impl DisplayQuestions {
    fn empty(last_item: isize) -> Self {
        Self {
            questions: Vec::new(),
            at_start: true,
            at_end: true,
            number_of_controls: 0,
            last_item,
        }
    }
}

/// Next visible item(s) after `last`.
pub fn next_questions(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    last: isize,
) -> DisplayQuestions {
    display_questions(form, rules, variables, last, 1)
}

/// Previous visible item(s) before `last`.
pub fn previous_questions(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    last: isize,
) -> DisplayQuestions {
    display_questions(form, rules, variables, last, -1)
}

pub fn display_questions(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    last: isize,
    direction: isize,
) -> DisplayQuestions {
    if form.questions.is_empty() {
        return DisplayQuestions::empty(last);
    }

    match form.draw_type {
        DrawType::SingleQuestion => single_question(form, rules, variables, last, direction),
        DrawType::EntireSection => section_questions(form, rules, variables, last, direction),
        DrawType::EntireForm => entire_form(form, last),
    }
}

fn single_question(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    last: isize,
    direction: isize,
) -> DisplayQuestions {
    let count = form.questions.len() as isize;
    let found = scan(last, direction, count, |index| {
        question_visible(form, rules, variables, &form.questions[index])
    });

    // Boundary probes start from the new position, or stay where we were
    // when the scan found nothing.
    let position = found.map(|index| index as isize).unwrap_or(last);
    let at_start = scan(position, -1, count, |index| {
        question_visible(form, rules, variables, &form.questions[index])
    })
    .is_none();
    let at_end = scan(position, 1, count, |index| {
        question_visible(form, rules, variables, &form.questions[index])
    })
    .is_none();

    match found {
        Some(index) => DisplayQuestions {
            questions: vec![index],
            at_start,
            at_end,
            number_of_controls: form.questions[index].controls.len(),
            last_item: index as isize,
        },
        None => DisplayQuestions {
            questions: Vec::new(),
            at_start,
            at_end,
            number_of_controls: 0,
            last_item: last,
        },
    }
}

fn section_questions(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    last: isize,
    direction: isize,
) -> DisplayQuestions {
    let count = form.sections.len() as isize;
    let found = scan(last, direction, count, |index| {
        section_visible(form, rules, variables, &form.sections[index])
    });

    let position = found.map(|index| index as isize).unwrap_or(last);
    let at_start = scan(position, -1, count, |index| {
        section_visible(form, rules, variables, &form.sections[index])
    })
    .is_none();
    let at_end = scan(position, 1, count, |index| {
        section_visible(form, rules, variables, &form.sections[index])
    })
    .is_none();

    match found {
        Some(index) => {
            let section_id = form.sections[index].id;
            let questions: Vec<usize> = form
                .questions
                .iter()
                .enumerate()
                .filter(|(_, question)| question.section_id == Some(section_id))
                .map(|(question_index, _)| question_index)
                .collect();
            let number_of_controls = questions
                .iter()
                .map(|&question_index| form.questions[question_index].controls.len())
                .sum();
            DisplayQuestions {
                questions,
                at_start,
                at_end,
                number_of_controls,
                last_item: index as isize,
            }
        }
        None => DisplayQuestions {
            questions: Vec::new(),
            at_start,
            at_end,
            number_of_controls: 0,
            last_item: last,
        },
    }
}

fn entire_form(form: &Form, last: isize) -> DisplayQuestions {
    let number_of_controls = form
        .questions
        .iter()
        .map(|question| question.controls.len())
        .sum();

    DisplayQuestions {
        questions: (0..form.questions.len()).collect(),
        at_start: true,
        at_end: true,
        number_of_controls,
        last_item: last,
    }
}

/// Walk from `start + direction` while indices stay in `[0, count)`;
/// first index the predicate accepts wins.
fn scan<F>(start: isize, direction: isize, count: isize, visible: F) -> Option<usize>
where
    F: Fn(usize) -> bool,
{
    let mut current = start + direction;
    while current >= 0 && current < count {
        if visible(current as usize) {
            return Some(current as usize);
        }
        current += direction;
    }
    None
}

// A rule name with no registered rule gates nothing: the item stays
// visible, as if no rule were attached.
fn gate_open(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    rule_to_match: Option<&String>,
) -> bool {
    match rule_to_match {
        Some(rule_name) if rules.rule(rule_name).is_some() => {
            rules.evaluate(rule_name, &form.data, variables)
        }
        _ => true,
    }
}

fn question_visible(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    question: &Question,
) -> bool {
    gate_open(form, rules, variables, question.rule_to_match.as_ref())
}

fn section_visible(
    form: &Form,
    rules: &BusinessRules,
    variables: &dyn VariableResolver,
    section: &Section,
) -> bool {
    gate_open(form, rules, variables, section.rule_to_match.as_ref())
}
