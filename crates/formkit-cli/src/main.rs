mod demo;
mod wizard;

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand, ValueEnum};
use formkit::{DisplayView, DrawType, FormSession};
use tracing_subscriber::EnvFilter;
use wizard::{Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Text wizard for formkit questionnaires",
    long_about = "Walks a questionnaire in the terminal, one navigation step at a time, with the same rule and validator engine a UI binding would use"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// How many questions each navigation step surfaces.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum DrawMode {
    Question,
    Section,
    Form,
}

impl From<DrawMode> for DrawType {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Question => DrawType::SingleQuestion,
            DrawMode::Section => DrawType::EntireSection,
            DrawMode::Form => DrawType::EntireForm,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in holiday-booking demo form.
    Demo {
        /// Navigation granularity for each step.
        #[arg(long, value_enum, default_value_t = DrawMode::Question)]
        draw: DrawMode,
        /// Show boundary flags and control ids while walking.
        #[arg(long, alias = "debug")]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Demo { draw, verbose } => {
            run_demo(draw.into(), Verbosity::from_verbose(verbose))
        }
    }
}

/// Where the walk goes after one displayed step.
enum Step {
    Forward,
    Backward,
    Quit,
}

fn run_demo(draw_type: DrawType, verbosity: Verbosity) -> CliResult<()> {
    let (form, rules) = demo::demo_form(draw_type);
    let mut session = FormSession::new(form, rules);
    let mut presenter = WizardPresenter::new(verbosity);
    presenter.show_header(&session.form().name);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut forwards = true;

    loop {
        let view = session.questions_to_display(forwards);
        presenter.show_boundaries(&session);

        if view.questions.is_empty() {
            if forwards {
                session.drain_async_results();
                presenter.show_completion(&session);
                return Ok(());
            }
            // Walked off the front: start over from the first question.
            println!("(already at the start)");
            session.rewind();
            forwards = true;
            continue;
        }

        match present_view(&view, &mut session, &presenter, &mut lines)? {
            Step::Forward => {
                if session.at_end() {
                    session.drain_async_results();
                    presenter.show_completion(&session);
                    return Ok(());
                }
                forwards = true;
            }
            Step::Backward => forwards = false,
            Step::Quit => return Ok(()),
        }
    }
}

/// Prompt for every control in the displayed step. Answers are written
/// through the session so validation and the dependency cascade run on
/// each input.
fn present_view(
    view: &DisplayView,
    session: &mut FormSession,
    presenter: &WizardPresenter,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> CliResult<Step> {
    for &index in &view.questions {
        presenter.show_question(&session.form().questions[index]);

        let control_names: Vec<String> = session.form().questions[index]
            .controls
            .iter()
            .map(|control| control.name.clone())
            .collect();

        for name in control_names {
            let prompt = {
                let Some(control) = session.form().control(&name) else {
                    continue;
                };
                if !presenter.show_control(control) {
                    continue;
                }
                presenter.prompt_for(control, session)
            };

            print!("{prompt}");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(Step::Quit);
            };
            let answer = line?;
            match answer.trim() {
                ":quit" => return Ok(Step::Quit),
                ":back" => return Ok(Step::Backward),
                ":next" => return Ok(Step::Forward),
                "" => continue,
                answer => {
                    session.set_value(&name, answer);
                    session.drain_async_results();
                    presenter.show_error(session, &name);
                }
            }
        }
    }
    Ok(Step::Forward)
}
