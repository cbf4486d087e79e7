use screening_spec::{
    Control, FormEvent, Page, QuestionWidget, RenderGroup, ResultItem, Toggle, WidgetKind,
    render::group_lines, render_results_text,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: page documents, hidden question counts, parse expectations.
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

/// Prints pages, prompts and errors for the interactive shell.
pub struct WizardPresenter {
    verbosity: Verbosity,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn show_page(&self, page: Page) {
        println!();
        println!("== {} ==", page.title());
        if self.verbosity.is_verbose() {
            println!("({})", page.document());
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut lines = prompt.lines.iter();
        if let Some(first) = lines.next() {
            let mut heading = format!("[{}/{}] {}", prompt.position, prompt.total, first);
            if let Some(hint) = &prompt.hint {
                heading.push(' ');
                heading.push_str(hint);
            }
            println!("{}", heading);
        }
        for line in lines {
            println!("{}", line);
        }
    }

    pub fn show_hidden(&self, hidden: usize) {
        if self.verbosity.is_verbose() && hidden > 0 {
            println!("({} question(s) hidden by earlier answers)", hidden);
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    pub fn show_results(&self, items: &[ResultItem]) {
        println!();
        println!("{}", render_results_text(items));
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub position: usize,
    pub total: usize,
    /// Rendered group text; the first line is the bare label.
    pub lines: Vec<String>,
    pub hint: Option<String>,
}

impl PromptContext {
    pub fn new(
        widget: &QuestionWidget,
        control: &Control,
        position: usize,
        total: usize,
    ) -> Self {
        let group = RenderGroup {
            widget: widget.clone(),
            control: control.clone(),
            visible: true,
        };
        let mut lines = group_lines(&group);
        if let Some(first) = lines.first_mut() {
            first.clone_from(&widget.label);
        }
        Self {
            position,
            total,
            lines,
            hint: hint_for(&widget.kind),
        }
    }
}

fn hint_for(kind: &WidgetKind) -> Option<String> {
    match kind {
        WidgetKind::YesNo => Some("(yes/no)".to_string()),
        WidgetKind::Select { .. } => Some("(number or option text)".to_string()),
        WidgetKind::Number { integer: true, .. } => Some("(whole number)".to_string()),
        WidgetKind::Number { .. } => Some("(number)".to_string()),
        WidgetKind::Date => Some("(YYYY-MM-DD)".to_string()),
        WidgetKind::List(list) => Some(format!(
            "({} entries, one per line, blank line to finish)",
            list.input.as_str()
        )),
        WidgetKind::Text { .. } => None,
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

pub fn parse_toggle(raw: &str) -> Result<Toggle, AnswerParseError> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" => Ok(Toggle::Yes),
        "no" | "n" | "false" | "f" | "0" => Ok(Toggle::No),
        _ => Err(AnswerParseError::new(
            "Please enter yes or no.",
            Some("expected yes/no (y/n)".to_string()),
        )),
    }
}

/// Resolve a select answer given either the option position or its label.
pub fn parse_choice(options: &[String], raw: &str) -> Result<usize, AnswerParseError> {
    let trimmed = raw.trim();
    if let Ok(position) = trimmed.parse::<usize>()
        && position < options.len()
    {
        return Ok(position);
    }
    options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| {
            AnswerParseError::new(
                format!("Choose one of: {}.", options.join(", ")),
                Some(format!("0..{} or an option label", options.len())),
            )
        })
}

/// Events for a one-line answer. A blank line leaves the widget as it is;
/// list widgets take comma-separated entries.
pub fn answer_events(
    widget: &QuestionWidget,
    control: &Control,
    raw: &str,
) -> Result<Vec<FormEvent>, AnswerParseError> {
    let index = widget.index;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let event = match &widget.kind {
        WidgetKind::YesNo => FormEvent::Toggle {
            index,
            choice: parse_toggle(raw)?,
        },
        WidgetKind::Select { options } => FormEvent::Input {
            index,
            value: parse_choice(options, raw)?.to_string(),
        },
        WidgetKind::Number { .. } | WidgetKind::Date => FormEvent::Input {
            index,
            value: raw.trim().to_string(),
        },
        WidgetKind::Text { .. } => FormEvent::Input {
            index,
            value: raw.to_string(),
        },
        WidgetKind::List(_) => {
            let entries = raw
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(String::from)
                .collect::<Vec<_>>();
            return Ok(list_events(index, row_count(control), &entries));
        }
    };
    Ok(vec![event])
}

pub fn row_count(control: &Control) -> usize {
    control.rows().map_or(1, <[String]>::len)
}

/// Events that make a list widget hold exactly `entries`, starting from
/// `existing_rows` rows. Surplus rows are removed from the end; no entries
/// leaves a single blank row.
pub fn list_events(index: usize, existing_rows: usize, entries: &[String]) -> Vec<FormEvent> {
    let mut events = Vec::new();
    for (row, value) in entries.iter().enumerate() {
        if row >= existing_rows {
            events.push(FormEvent::AddRow { index });
        }
        events.push(FormEvent::RowInput {
            index,
            row,
            value: value.trim().to_string(),
        });
    }
    if entries.is_empty() {
        events.push(FormEvent::RowInput {
            index,
            row: 0,
            value: String::new(),
        });
    }
    let keep = entries.len().max(1);
    for row in (keep..existing_rows).rev() {
        events.push(FormEvent::RemoveRow { index, row });
    }
    events
}
