//! Pure widget model: one [`QuestionWidget`] per descriptor, no UI state.

use crate::note::Note;
use crate::spec::descriptor::{Dependency, QuestionDescriptor, ResponseKind};

/// Input element backing a single-value field or a list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Number,
    Date,
    Text,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Number => "number",
            InputType::Date => "date",
            InputType::Text => "text",
        }
    }
}

/// Growable list of same-typed rows; never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWidget {
    pub input: InputType,
    pub placeholder: Option<&'static str>,
    pub add_label: &'static str,
}

/// Widget chosen for a descriptor's response type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// Yes/No toggles over one hidden `"yes"`/`"no"` value.
    YesNo,
    /// Single choice; values are the stringified option positions.
    Select { options: Vec<String> },
    Number {
        step: &'static str,
        integer: bool,
        placeholder: &'static str,
    },
    Date,
    List(ListWidget),
    Text { placeholder: &'static str },
}

impl WidgetKind {
    pub fn for_response(response: &ResponseKind) -> Self {
        match response {
            ResponseKind::Boolean => WidgetKind::YesNo,
            ResponseKind::Int {
                options: Some(options),
            } => WidgetKind::Select {
                options: options.clone(),
            },
            ResponseKind::Int { options: None } => WidgetKind::Number {
                step: "1",
                integer: true,
                placeholder: "Enter a number",
            },
            ResponseKind::Float => WidgetKind::Number {
                step: "0.01",
                integer: false,
                placeholder: "Enter an amount",
            },
            ResponseKind::Date => WidgetKind::Date,
            ResponseKind::DateList => WidgetKind::List(ListWidget {
                input: InputType::Date,
                placeholder: None,
                add_label: "+ Add date",
            }),
            ResponseKind::StringList => WidgetKind::List(ListWidget {
                input: InputType::Text,
                placeholder: Some("Enter item"),
                add_label: "+ Add item",
            }),
            ResponseKind::String => WidgetKind::Text {
                placeholder: "Your answer",
            },
        }
    }
}

/// Everything needed to draw one question group.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionWidget {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub bullets: Vec<String>,
    pub kind: WidgetKind,
    pub note: Option<Note>,
    pub gate: Option<Dependency>,
}

/// Element id shared by a widget and the descriptor at `index`.
pub fn widget_id(index: usize) -> String {
    format!("q-{}", index)
}

/// Multi-line questions become a label plus bullet lines.
pub fn split_label(question: &str) -> (String, Vec<String>) {
    if !question.contains('\n') {
        return (question.to_string(), Vec::new());
    }
    let mut lines = question
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty());
    let label = lines.next().unwrap_or_default().to_string();
    let bullets = lines.map(String::from).collect();
    (label, bullets)
}

pub fn build_widget(index: usize, descriptor: &QuestionDescriptor) -> QuestionWidget {
    let (label, bullets) = split_label(&descriptor.question);
    QuestionWidget {
        index,
        id: widget_id(index),
        label,
        bullets,
        kind: WidgetKind::for_response(&descriptor.response),
        note: descriptor.note.clone(),
        gate: descriptor.dependency.clone(),
    }
}

/// Widget model for a whole batch, in descriptor order.
pub fn build_widgets(descriptors: &[QuestionDescriptor]) -> Vec<QuestionWidget> {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| build_widget(index, descriptor))
        .collect()
}
