//! Headless materialization of a widget model.
//!
//! [`FormState`] owns one control per widget and the visibility of every
//! question group. User interaction arrives as [`FormEvent`]s through
//! [`FormState::dispatch`], which applies the event's own mutation first and
//! only then re-evaluates every dependency gate, so a gate always sees the
//! value the event just wrote.

use chrono::NaiveDate;
use thiserror::Error;

use crate::spec::descriptor::QuestionDescriptor;
use crate::visibility::{VisibilityMap, initial_visibility, resolve_visibility};
use crate::widget::{InputType, QuestionWidget, WidgetKind, build_widgets};

/// Date format produced by date inputs.
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One of the two Boolean toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Yes,
    No,
}

impl Toggle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Toggle::Yes => "yes",
            Toggle::No => "no",
        }
    }
}

/// Live state of a single widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    YesNo { selected: Option<Toggle> },
    Select { selected: usize, len: usize },
    Field {
        input: InputType,
        integer: bool,
        value: String,
    },
    Rows { input: InputType, rows: Vec<String> },
}

impl Control {
    fn for_widget(kind: &WidgetKind) -> Self {
        match kind {
            WidgetKind::YesNo => Control::YesNo { selected: None },
            WidgetKind::Select { options } => Control::Select {
                selected: 0,
                len: options.len(),
            },
            WidgetKind::Number { integer, .. } => Control::Field {
                input: InputType::Number,
                integer: *integer,
                value: String::new(),
            },
            WidgetKind::Date => Control::Field {
                input: InputType::Date,
                integer: false,
                value: String::new(),
            },
            WidgetKind::Text { .. } => Control::Field {
                input: InputType::Text,
                integer: false,
                value: String::new(),
            },
            WidgetKind::List(list) => Control::Rows {
                input: list.input,
                rows: vec![String::new()],
            },
        }
    }

    /// String value a dependency gate compares against; lists have none.
    pub fn value(&self) -> Option<String> {
        match self {
            Control::YesNo { selected } => Some(
                selected
                    .map(|toggle| toggle.as_str().to_string())
                    .unwrap_or_default(),
            ),
            Control::Select { selected, len } if *len > 0 => Some(selected.to_string()),
            Control::Select { .. } => Some(String::new()),
            Control::Field { value, .. } => Some(value.clone()),
            Control::Rows { .. } => None,
        }
    }

    pub fn rows(&self) -> Option<&[String]> {
        match self {
            Control::Rows { rows, .. } => Some(rows),
            _ => None,
        }
    }
}

/// A single user interaction with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Type into a field, or pick a select option by its positional value.
    Input { index: usize, value: String },
    /// Click one of the Yes/No toggles.
    Toggle { index: usize, choice: Toggle },
    /// Type into row `row` of a dynamic list.
    RowInput {
        index: usize,
        row: usize,
        value: String,
    },
    AddRow { index: usize },
    /// Ignored when it would leave the list empty.
    RemoveRow { index: usize, row: usize },
}

impl FormEvent {
    pub fn index(&self) -> usize {
        match self {
            FormEvent::Input { index, .. }
            | FormEvent::Toggle { index, .. }
            | FormEvent::RowInput { index, .. }
            | FormEvent::AddRow { index }
            | FormEvent::RemoveRow { index, .. } => *index,
        }
    }
}

/// Rejected interactions; the form is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no widget with index {0}")]
    UnknownWidget(usize),
    #[error("widget {index} does not accept {event}")]
    WrongWidget { index: usize, event: &'static str },
    #[error("widget {index} has no row {row}")]
    UnknownRow { index: usize, row: usize },
    #[error("'{value}' is not one of the options of widget {index}")]
    UnknownOption { index: usize, value: String },
    #[error("'{value}' is not a whole number")]
    InvalidInteger { value: String },
    #[error("'{value}' is not a number")]
    InvalidNumber { value: String },
    #[error("'{value}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
}

/// Interactive state for one rendered batch.
#[derive(Debug, Clone)]
pub struct FormState {
    widgets: Vec<QuestionWidget>,
    controls: Vec<Control>,
    visible: VisibilityMap,
}

impl FormState {
    pub fn new(widgets: Vec<QuestionWidget>) -> Self {
        let controls = widgets
            .iter()
            .map(|widget| Control::for_widget(&widget.kind))
            .collect();
        let visible = initial_visibility(&widgets);
        Self {
            widgets,
            controls,
            visible,
        }
    }

    pub fn from_descriptors(descriptors: &[QuestionDescriptor]) -> Self {
        Self::new(build_widgets(descriptors))
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn widgets(&self) -> &[QuestionWidget] {
        &self.widgets
    }

    pub fn widget(&self, index: usize) -> Option<&QuestionWidget> {
        self.widgets.get(index)
    }

    pub fn control(&self, index: usize) -> Option<&Control> {
        self.controls.get(index)
    }

    pub fn value(&self, index: usize) -> Option<String> {
        self.controls.get(index).and_then(Control::value)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn is_selected(&self, index: usize, toggle: Toggle) -> bool {
        matches!(
            self.controls.get(index),
            Some(Control::YesNo { selected: Some(current) }) if *current == toggle
        )
    }

    /// Apply an interaction, then re-evaluate every dependency gate.
    pub fn dispatch(&mut self, event: FormEvent) -> Result<(), FormError> {
        self.apply(event)?;
        self.recheck_dependencies();
        Ok(())
    }

    pub fn recheck_dependencies(&mut self) {
        let values = self.controls.iter().map(Control::value).collect::<Vec<_>>();
        self.visible = resolve_visibility(&self.widgets, &values);
    }

    fn apply(&mut self, event: FormEvent) -> Result<(), FormError> {
        let index = event.index();
        let control = self
            .controls
            .get_mut(index)
            .ok_or(FormError::UnknownWidget(index))?;

        match (event, control) {
            (FormEvent::Toggle { choice, .. }, Control::YesNo { selected }) => {
                *selected = Some(choice);
            }
            (FormEvent::Input { value, .. }, Control::Select { selected, len }) => {
                match value.trim().parse::<usize>() {
                    Ok(position) if position < *len => *selected = position,
                    _ => return Err(FormError::UnknownOption { index, value }),
                }
            }
            (
                FormEvent::Input { value, .. },
                Control::Field {
                    input,
                    integer,
                    value: current,
                },
            ) => {
                check_input(*input, *integer, &value)?;
                *current = normalize(*input, value);
            }
            (FormEvent::RowInput { row, value, .. }, Control::Rows { input, rows }) => {
                check_input(*input, false, &value)?;
                let slot = rows
                    .get_mut(row)
                    .ok_or(FormError::UnknownRow { index, row })?;
                *slot = normalize(*input, value);
            }
            (FormEvent::AddRow { .. }, Control::Rows { rows, .. }) => {
                rows.push(String::new());
            }
            (FormEvent::RemoveRow { row, .. }, Control::Rows { rows, .. }) => {
                if row >= rows.len() {
                    return Err(FormError::UnknownRow { index, row });
                }
                if rows.len() > 1 {
                    rows.remove(row);
                }
            }
            (event, _) => {
                return Err(FormError::WrongWidget {
                    index,
                    event: event_name(&event),
                });
            }
        }
        Ok(())
    }
}

fn event_name(event: &FormEvent) -> &'static str {
    match event {
        FormEvent::Input { .. } => "input",
        FormEvent::Toggle { .. } => "a yes/no toggle",
        FormEvent::RowInput { .. } => "row input",
        FormEvent::AddRow { .. } => "adding rows",
        FormEvent::RemoveRow { .. } => "removing rows",
    }
}

/// Number and date inputs never hold surrounding whitespace.
fn normalize(input: InputType, value: String) -> String {
    match input {
        InputType::Text => value,
        InputType::Number | InputType::Date => value.trim().to_string(),
    }
}

/// Mirrors what the matching browser input would accept; empty always clears.
fn check_input(input: InputType, integer: bool, value: &str) -> Result<(), FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    match input {
        InputType::Number if integer => trimmed
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| FormError::InvalidInteger {
                value: value.to_string(),
            }),
        InputType::Number => match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(()),
            _ => Err(FormError::InvalidNumber {
                value: value.to_string(),
            }),
        },
        InputType::Date => NaiveDate::parse_from_str(trimmed, INPUT_DATE_FORMAT)
            .map(|_| ())
            .map_err(|_| FormError::InvalidDate {
                value: value.to_string(),
            }),
        InputType::Text => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::descriptor::{Dependency, ResponseKind};

    fn descriptor(response: ResponseKind) -> QuestionDescriptor {
        QuestionDescriptor {
            question: "Q".into(),
            response,
            note: None,
            dependency: None,
            optional: false,
            default: None,
        }
    }

    fn gated(response: ResponseKind, index: usize, value: &str) -> QuestionDescriptor {
        QuestionDescriptor {
            dependency: Some(Dependency {
                index,
                value: value.into(),
            }),
            ..descriptor(response)
        }
    }

    #[test]
    fn one_widget_per_descriptor() {
        let form = FormState::from_descriptors(&[
            descriptor(ResponseKind::Boolean),
            descriptor(ResponseKind::Date),
            descriptor(ResponseKind::StringList),
        ]);
        assert_eq!(form.len(), 3);
        for index in 0..3 {
            assert_eq!(form.widget(index).map(|w| w.id.clone()), Some(format!("q-{}", index)));
        }
    }

    #[test]
    fn yes_then_no_leaves_only_no_selected() {
        let mut form = FormState::from_descriptors(&[descriptor(ResponseKind::Boolean)]);
        form.dispatch(FormEvent::Toggle {
            index: 0,
            choice: Toggle::Yes,
        })
        .expect("yes");
        form.dispatch(FormEvent::Toggle {
            index: 0,
            choice: Toggle::No,
        })
        .expect("no");
        assert!(form.is_selected(0, Toggle::No));
        assert!(!form.is_selected(0, Toggle::Yes));
        assert_eq!(form.value(0).as_deref(), Some("no"));
    }

    #[test]
    fn gated_group_follows_controlling_value() {
        let mut form = FormState::from_descriptors(&[
            descriptor(ResponseKind::String),
            descriptor(ResponseKind::String),
            descriptor(ResponseKind::Boolean),
            gated(ResponseKind::Date, 2, "yes"),
        ]);
        assert!(!form.is_visible(3));

        form.dispatch(FormEvent::Toggle {
            index: 2,
            choice: Toggle::No,
        })
        .expect("no");
        assert!(!form.is_visible(3));

        form.dispatch(FormEvent::Toggle {
            index: 2,
            choice: Toggle::Yes,
        })
        .expect("yes");
        assert!(form.is_visible(3));
    }

    #[test]
    fn select_starts_on_first_option_but_gate_waits_for_interaction() {
        let mut form = FormState::from_descriptors(&[
            descriptor(ResponseKind::Int {
                options: Some(vec!["Felony".into(), "Misdemeanor".into()]),
            }),
            gated(ResponseKind::String, 0, "1"),
        ]);
        assert_eq!(form.value(0).as_deref(), Some("0"));
        assert!(!form.is_visible(1));

        form.dispatch(FormEvent::Input {
            index: 0,
            value: "1".into(),
        })
        .expect("select");
        assert!(form.is_visible(1));

        let err = form
            .dispatch(FormEvent::Input {
                index: 0,
                value: "7".into(),
            })
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownOption { index: 0, .. }));
    }

    #[test]
    fn list_gate_never_opens() {
        let mut form = FormState::from_descriptors(&[
            descriptor(ResponseKind::StringList),
            gated(ResponseKind::String, 0, ""),
            gated(ResponseKind::String, 9, "yes"),
        ]);
        form.dispatch(FormEvent::AddRow { index: 0 }).expect("add");
        assert!(!form.is_visible(1));
        assert!(!form.is_visible(2));
    }

    #[test]
    fn list_never_becomes_empty() {
        let mut form = FormState::from_descriptors(&[descriptor(ResponseKind::DateList)]);
        form.dispatch(FormEvent::RemoveRow { index: 0, row: 0 })
            .expect("remove ignored");
        assert_eq!(form.control(0).and_then(Control::rows).map(<[_]>::len), Some(1));

        form.dispatch(FormEvent::AddRow { index: 0 }).expect("add");
        form.dispatch(FormEvent::RowInput {
            index: 0,
            row: 1,
            value: "2024-03-04".into(),
        })
        .expect("row");
        form.dispatch(FormEvent::RemoveRow { index: 0, row: 0 })
            .expect("remove");
        assert_eq!(
            form.control(0).and_then(Control::rows),
            Some(&["2024-03-04".to_string()][..])
        );
    }

    #[test]
    fn inputs_are_checked_like_browser_fields() {
        let mut form = FormState::from_descriptors(&[
            descriptor(ResponseKind::Int { options: None }),
            descriptor(ResponseKind::Float),
            descriptor(ResponseKind::Date),
        ]);
        assert!(matches!(
            form.dispatch(FormEvent::Input {
                index: 0,
                value: "1.5".into(),
            }),
            Err(FormError::InvalidInteger { .. })
        ));
        form.dispatch(FormEvent::Input {
            index: 1,
            value: "12.50".into(),
        })
        .expect("float");
        assert!(matches!(
            form.dispatch(FormEvent::Input {
                index: 2,
                value: "03-05-2024".into(),
            }),
            Err(FormError::InvalidDate { .. })
        ));
        assert!(matches!(
            form.dispatch(FormEvent::Toggle {
                index: 2,
                choice: Toggle::Yes,
            }),
            Err(FormError::WrongWidget { index: 2, .. })
        ));
        assert_eq!(form.value(1).as_deref(), Some("12.50"));
    }

    #[test]
    fn number_and_date_inputs_are_stored_trimmed() {
        let mut form = FormState::from_descriptors(&[
            descriptor(ResponseKind::Int { options: None }),
            descriptor(ResponseKind::DateList),
            descriptor(ResponseKind::String),
        ]);
        form.dispatch(FormEvent::Input {
            index: 0,
            value: " 5 ".into(),
        })
        .expect("int");
        form.dispatch(FormEvent::RowInput {
            index: 1,
            row: 0,
            value: "2024-03-04 ".into(),
        })
        .expect("row");
        form.dispatch(FormEvent::Input {
            index: 2,
            value: " Tulsa ".into(),
        })
        .expect("text");
        assert_eq!(form.value(0).as_deref(), Some("5"));
        assert_eq!(
            form.control(1).and_then(Control::rows),
            Some(&["2024-03-04".to_string()][..])
        );
        assert_eq!(form.value(2).as_deref(), Some(" Tulsa "));
    }
}
