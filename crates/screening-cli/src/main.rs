mod telemetry;
mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use screening_client::{
    AnalysisView, ClientConfig, DEFAULT_BASE_URL, FileStore, FlowError, Navigation, Wizard,
};
use screening_spec::{
    FormEvent, FormState, Page, QuestionBatch, QuestionDescriptor, ResultItem, TemplateEngine,
    WidgetKind, batch_schema, build_render_payload, collect_answers, next_page, render_html,
    render_json_ui, render_results_html, render_results_json, render_text,
};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;
use wizard::{
    PromptContext, Verbosity, WizardPresenter, answer_events, list_events, parse_toggle, row_count,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEFAULT_SESSION_FILE: &str = ".screening-session.json";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Text-based expungement screening wizard",
    long_about = "Walks through the screening question batches served by the screening API, and offers offline helpers to render, collect and route question batches"
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
    Html,
}

#[derive(Subcommand)]
enum Command {
    /// Run the screening wizard against the screening API.
    Run {
        /// Base URL of the screening API.
        #[arg(long, env = "SCREENING_API_URL", default_value = DEFAULT_BASE_URL)]
        api_url: String,
        /// File holding the session id and the pending question batch.
        #[arg(long, env = "SCREENING_SESSION_FILE", default_value = DEFAULT_SESSION_FILE)]
        session_file: PathBuf,
        /// Delay between poll attempts, in milliseconds.
        #[arg(long, default_value_t = 500)]
        poll_interval_ms: u64,
        /// Ignore a pending batch from an earlier run and start on the landing page.
        #[arg(long)]
        fresh: bool,
        /// Show verbose output (page documents, hidden questions, parse expectations).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Output format for the final results.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        results_format: RenderMode,
    },
    /// Render a question batch without talking to the API.
    Render {
        /// Path to the question batch JSON (object with `questions`, or a bare array).
        #[arg(long, value_name = "BATCH")]
        batch: PathBuf,
        /// Optional JSON object of raw widget inputs keyed by index or widget id.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Apply raw widget inputs to a batch and print the answer array.
    Collect {
        #[arg(long, value_name = "BATCH")]
        batch: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print the page a batch with these filenames is shown on.
    Route {
        #[arg(value_name = "FILENAME")]
        filenames: Vec<String>,
    },
    /// Print the JSON schema of a question batch.
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = telemetry::init(&cli.log_level) {
        eprintln!("Error: {}", err);
        return ExitCode::FAILURE;
    }
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Run {
            api_url,
            session_file,
            poll_interval_ms,
            fresh,
            verbose,
            results_format,
        } => {
            let config = ClientConfig::new(api_url)
                .with_poll_interval(Duration::from_millis(poll_interval_ms));
            run_wizard(config, session_file, fresh, verbose, results_format)
        }
        Command::Render {
            batch,
            answers,
            format,
        } => run_render(batch, answers, format),
        Command::Collect { batch, answers } => run_collect(batch, answers),
        Command::Route { filenames } => {
            match next_page(&filenames) {
                Some(page) => println!("{}", page.document()),
                None => println!("no navigation"),
            }
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&batch_schema())?);
            Ok(())
        }
    }
}

struct LoadedBatch {
    batch: QuestionBatch,
    descriptors: Vec<QuestionDescriptor>,
    form: FormState,
}

fn load_batch(path: &Path, answers: Option<&Path>) -> CliResult<LoadedBatch> {
    let contents = fs::read_to_string(path)?;
    let batch = QuestionBatch::from_json(serde_json::from_str(&contents)?)?;
    let descriptors = batch.descriptors()?;
    let mut form = FormState::from_descriptors(&descriptors);
    if let Some(answers) = answers {
        let contents = fs::read_to_string(answers)?;
        apply_answer_file(&mut form, &serde_json::from_str(&contents)?)?;
    }
    Ok(LoadedBatch {
        batch,
        descriptors,
        form,
    })
}

fn run_render(batch: PathBuf, answers: Option<PathBuf>, format: RenderMode) -> CliResult<()> {
    let loaded = load_batch(&batch, answers.as_deref())?;
    let title = next_page(&loaded.batch.filenames).map(|page| page.title());
    let payload = build_render_payload(&loaded.form, title);
    match format {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_json_ui(&payload))?
        ),
        RenderMode::Html => println!("{}", render_html(&TemplateEngine::new()?, &payload)?),
    }
    Ok(())
}

fn run_collect(batch: PathBuf, answers: PathBuf) -> CliResult<()> {
    let loaded = load_batch(&batch, Some(answers.as_path()))?;
    let collected =
        collect_answers(&loaded.descriptors, &loaded.form).map_err(FlowError::Incomplete)?;
    println!("{}", serde_json::to_string_pretty(&collected)?);
    Ok(())
}

/// Apply a JSON object of raw inputs in key order, the way a user would
/// fill the form top to bottom.
fn apply_answer_file(form: &mut FormState, answers: &Value) -> CliResult<()> {
    let entries = answers
        .as_object()
        .ok_or("answers file must contain a JSON object")?;
    for (key, value) in entries {
        let index = resolve_answer_key(key)
            .ok_or_else(|| format!("'{}' is not a widget index or id", key))?;
        let widget = form
            .widget(index)
            .cloned()
            .ok_or_else(|| format!("no widget with index {}", index))?;
        let control = form
            .control(index)
            .cloned()
            .ok_or_else(|| format!("no control for widget {}", index))?;
        let events = match value {
            Value::Array(items) => {
                let entries = items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>();
                list_events(index, row_count(&control), &entries)
            }
            Value::Bool(flag) => vec![FormEvent::Toggle {
                index,
                choice: parse_toggle(if *flag { "yes" } else { "no" })
                    .map_err(|err| err.user_message)?,
            }],
            Value::String(raw) => answer_events(&widget, &control, raw)
                .map_err(|err| format!("{}: {}", widget.id, err.user_message))?,
            Value::Number(number) => answer_events(&widget, &control, &number.to_string())
                .map_err(|err| format!("{}: {}", widget.id, err.user_message))?,
            other => return Err(format!("unsupported answer for {}: {}", widget.id, other).into()),
        };
        apply_events(form, events)?;
    }
    Ok(())
}

/// `"3"` or `"q-3"` -> `3`.
fn resolve_answer_key(key: &str) -> Option<usize> {
    key.strip_prefix("q-").unwrap_or(key).parse().ok()
}

fn apply_events(form: &mut FormState, events: Vec<FormEvent>) -> CliResult<()> {
    for event in events {
        debug!(?event, "form event");
        form.dispatch(event)?;
    }
    Ok(())
}

/// What the shell does after a page finishes.
enum Step {
    Go(Page),
    Stay,
    Exit,
}

impl From<Navigation> for Step {
    fn from(navigation: Navigation) -> Self {
        match navigation {
            Navigation::Go(page) => Step::Go(page),
            Navigation::Stay => Step::Stay,
        }
    }
}

/// One line typed at a prompt.
enum Reply {
    Line(String),
    Restart,
    Exit,
}

fn run_wizard(
    config: ClientConfig,
    session_file: PathBuf,
    fresh: bool,
    verbose: bool,
    results_format: RenderMode,
) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut wizard = Wizard::new(config, FileStore::new(session_file))?;
    let presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));

    let mut current = if fresh {
        Page::Landing
    } else {
        resume_page(&wizard)?
    };
    loop {
        let step = match current {
            Page::Landing => landing_page(&runtime, &mut wizard, &presenter)?,
            Page::Results => results_page(&runtime, &mut wizard, &presenter, results_format)?,
            page => question_page(&runtime, &mut wizard, &presenter, page)?,
        };
        match step {
            Step::Go(page) => current = page,
            Step::Stay => {}
            Step::Exit => break,
        }
    }
    Ok(())
}

/// A batch left pending by an earlier run is shown again instead of starting over.
fn resume_page(wizard: &Wizard<FileStore>) -> CliResult<Page> {
    let pending = wizard.session().pending_batch()?;
    Ok(pending
        .and_then(|batch| next_page(&batch.filenames))
        .unwrap_or(Page::Landing))
}

fn landing_page(
    runtime: &Runtime,
    wizard: &mut Wizard<FileStore>,
    presenter: &WizardPresenter,
) -> CliResult<Step> {
    wizard.enter_landing();
    report_error(wizard, presenter);
    presenter.show_page(Page::Landing);
    println!("Press Enter to start a new screening, or type exit.");
    match prompt_reply("> ")? {
        Reply::Exit => return Ok(Step::Exit),
        Reply::Restart | Reply::Line(_) => {}
    }
    println!("Starting session...");
    let navigation = runtime.block_on(wizard.start());
    report_error(wizard, presenter);
    Ok(navigation.into())
}

fn question_page(
    runtime: &Runtime,
    wizard: &mut Wizard<FileStore>,
    presenter: &WizardPresenter,
    page: Page,
) -> CliResult<Step> {
    let pending = wizard.session().pending_batch()?;
    let mut questions = match wizard.load_questions() {
        Ok(questions) => questions,
        Err(navigation) => {
            report_error(wizard, presenter);
            return Ok(navigation.into());
        }
    };
    presenter.show_page(page);
    println!("Type restart to start over or exit to quit at any prompt.");

    loop {
        match ask_questions(&mut questions.form, presenter)? {
            Reply::Exit => return Ok(Step::Exit),
            Reply::Restart => return Ok(wizard.restart().into()),
            Reply::Line(_) => {}
        }
        println!("Submitting answers...");
        let navigation = runtime.block_on(wizard.submit_and_navigate(&questions));
        report_error(wizard, presenter);
        match navigation {
            Navigation::Go(next) => return Ok(Step::Go(next)),
            Navigation::Stay if wizard.session().pending_batch()? == pending => {
                println!("Review your answers; press Enter to keep the current value.");
            }
            Navigation::Stay => return Ok(Step::Stay),
        }
    }
}

/// Prompt every visible widget in order. Visibility is re-read after each
/// answer, so gated questions appear as soon as their gate opens.
fn ask_questions(form: &mut FormState, presenter: &WizardPresenter) -> CliResult<Reply> {
    let total = form.len();
    let mut index = 0;
    while index < total {
        if !form.is_visible(index) {
            index += 1;
            continue;
        }
        let widget = form
            .widget(index)
            .cloned()
            .ok_or_else(|| format!("no widget with index {}", index))?;
        let control = form
            .control(index)
            .cloned()
            .ok_or_else(|| format!("no control for widget {}", index))?;
        presenter.show_prompt(&PromptContext::new(&widget, &control, index + 1, total));

        let events = if let WidgetKind::List(_) = widget.kind {
            let mut entries = Vec::new();
            loop {
                match prompt_reply("+ ")? {
                    Reply::Line(line) if line.trim().is_empty() => break,
                    Reply::Line(line) => entries.push(line),
                    other => return Ok(other),
                }
            }
            if entries.is_empty() {
                Vec::new()
            } else {
                list_events(index, row_count(&control), &entries)
            }
        } else {
            let line = match prompt_reply("> ")? {
                Reply::Line(line) => line,
                other => return Ok(other),
            };
            match answer_events(&widget, &control, &line) {
                Ok(events) => events,
                Err(err) => {
                    presenter.show_parse_error(&err);
                    continue;
                }
            }
        };

        match apply_events(form, events) {
            Ok(()) => index += 1,
            Err(err) => presenter.show_error(&err.to_string()),
        }
    }
    let hidden = (0..total).filter(|index| !form.is_visible(*index)).count();
    presenter.show_hidden(hidden);
    Ok(Reply::Line(String::new()))
}

fn results_page(
    runtime: &Runtime,
    wizard: &mut Wizard<FileStore>,
    presenter: &WizardPresenter,
    format: RenderMode,
) -> CliResult<Step> {
    if let Navigation::Go(page) = wizard.enter_results() {
        return Ok(Step::Go(page));
    }
    presenter.show_page(Page::Results);
    println!("Press Enter to run the eligibility analysis, or type restart or exit.");
    match prompt_reply("> ")? {
        Reply::Exit => return Ok(Step::Exit),
        Reply::Restart => return Ok(wizard.restart().into()),
        Reply::Line(_) => {}
    }
    println!("Analyzing...");
    match runtime.block_on(wizard.start_analysis()) {
        AnalysisView::Results(items) => {
            print_results(presenter, &items, format)?;
            println!("Type restart to screen again, or press Enter to quit.");
            match prompt_reply("> ")? {
                Reply::Restart => Ok(wizard.restart().into()),
                Reply::Exit | Reply::Line(_) => Ok(Step::Exit),
            }
        }
        AnalysisView::Ready => {
            report_error(wizard, presenter);
            Ok(Step::Stay)
        }
        AnalysisView::Redirect(page) => Ok(Step::Go(page)),
    }
}

fn print_results(
    presenter: &WizardPresenter,
    items: &[ResultItem],
    format: RenderMode,
) -> CliResult<()> {
    match format {
        RenderMode::Text => presenter.show_results(items),
        RenderMode::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_results_json(items))?
        ),
        RenderMode::Html => println!(
            "{}",
            render_results_html(&TemplateEngine::new()?, items)?
        ),
    }
    Ok(())
}

fn report_error(wizard: &Wizard<FileStore>, presenter: &WizardPresenter) {
    if let Some(message) = wizard.error().message() {
        presenter.show_error(message);
    }
}

/// Read one line. End of input counts as `exit`.
fn prompt_reply(prompt: &str) -> CliResult<Reply> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(Reply::Exit);
    }
    let line = line.trim_end_matches(['\r', '\n']);
    Ok(match line.trim().to_lowercase().as_str() {
        "exit" => Reply::Exit,
        "restart" => Reply::Restart,
        _ => Reply::Line(line.to_string()),
    })
}
