use formkit::{Control, ControlKind, FormSession, Question};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: captions and prompts only.
    Clean,
    /// Verbose output: boundary flags, control ids, validity details.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and state once the engine yields questions to display.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, form_name: &str) {
        if self.header_printed {
            return;
        }
        println!("Form: {form_name}");
        println!("Type an answer, or :next / :back / :quit");
        self.header_printed = true;
    }

    pub fn show_boundaries(&self, session: &FormSession) {
        if self.verbosity.is_verbose() {
            println!(
                "[at_start={} at_end={}]",
                session.at_start(),
                session.at_end()
            );
        }
    }

    pub fn show_question(&self, question: &Question) {
        if let Some(caption) = &question.caption {
            println!();
            println!("== {caption} ==");
        }
    }

    /// Print the non-interactive part of a control, returning true when the
    /// control still needs an answer prompt.
    pub fn show_control(&self, control: &Control) -> bool {
        match &control.kind {
            ControlKind::Label { text } => {
                println!("{text}");
                false
            }
            ControlKind::Html { html } => {
                println!("{html}");
                false
            }
            _ => {
                if self.verbosity.is_verbose() {
                    println!("  [{}]", control.control_id);
                }
                true
            }
        }
    }

    pub fn prompt_for(&self, control: &Control, session: &FormSession) -> String {
        let label = control.label.as_deref().unwrap_or(&control.name);
        let current = session.get_value(&control.name);
        let hint = kind_hint(control);
        if current.is_empty() {
            format!("{label}{hint}> ")
        } else {
            format!("{label}{hint} [{current}]> ")
        }
    }

    pub fn show_error(&self, session: &FormSession, field: &str) {
        if let Some(message) = session.error_message(field) {
            eprintln!("  ! {message}");
        }
    }

    pub fn show_completion(&self, session: &FormSession) {
        println!();
        if session.in_error() {
            println!("Reached the end, but some answers still have errors.");
        } else {
            println!("All done.");
        }
    }
}

fn kind_hint(control: &Control) -> String {
    match &control.kind {
        ControlKind::Option { options, .. } => {
            let codes: Vec<&str> = options
                .list
                .iter()
                .map(|option| option.code.as_str())
                .collect();
            if codes.is_empty() {
                String::new()
            } else {
                format!(" ({})", codes.join("/"))
            }
        }
        ControlKind::Date { .. } => " (yyyy-mm-dd)".to_string(),
        ControlKind::Time { .. } => " (HH:MM)".to_string(),
        ControlKind::DateTime { .. } => " (yyyy-mm-dd HH:MM)".to_string(),
        ControlKind::Toggle { .. } => " (Y/N)".to_string(),
        ControlKind::Slider { min, max, .. } => format!(" ({min}..{max})"),
        _ => String::new(),
    }
}
