use serde_json::{Map, Value, json};

use crate::{
    error::SpecError,
    form::{Control, FormState, Toggle},
    note::{Note, NoteSegment},
    results::ResultItem,
    spec::descriptor::Dependency,
    template::{FORM_TEMPLATE, RESULTS_TEMPLATE, TemplateEngine},
    widget::{QuestionWidget, WidgetKind},
};

/// One question group as the renderers see it.
#[derive(Debug, Clone)]
pub struct RenderGroup {
    pub widget: QuestionWidget,
    pub control: Control,
    pub visible: bool,
}

/// Collected payload used by the text, JSON and HTML renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub title: Option<String>,
    pub groups: Vec<RenderGroup>,
}

impl RenderPayload {
    pub fn visible_count(&self) -> usize {
        self.groups.iter().filter(|group| group.visible).count()
    }
}

/// Snapshot the current form for rendering.
pub fn build_render_payload(form: &FormState, title: Option<&str>) -> RenderPayload {
    let groups = form
        .widgets()
        .iter()
        .filter_map(|widget| {
            form.control(widget.index).map(|control| RenderGroup {
                widget: widget.clone(),
                control: control.clone(),
                visible: form.is_visible(widget.index),
            })
        })
        .collect();
    RenderPayload {
        title: title.map(String::from),
        groups,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let groups = payload.groups.iter().map(group_json).collect::<Vec<_>>();
    json!({
        "title": payload.title,
        "total": payload.groups.len(),
        "visible": payload.visible_count(),
        "groups": groups,
    })
}

fn group_json(group: &RenderGroup) -> Value {
    let widget = &group.widget;
    let mut map = Map::new();
    map.insert("index".into(), json!(widget.index));
    map.insert("id".into(), Value::String(widget.id.clone()));
    map.insert("label".into(), Value::String(widget.label.clone()));
    map.insert("bullets".into(), json!(widget.bullets));
    map.insert("widget".into(), Value::String(widget_label(&widget.kind).into()));
    map.insert("visible".into(), Value::Bool(group.visible));
    map.insert(
        "gate".into(),
        widget.gate.as_ref().map(gate_json).unwrap_or(Value::Null),
    );
    if let Some(note) = &widget.note {
        map.insert("note".into(), note_json(note));
    }

    match (&widget.kind, &group.control) {
        (WidgetKind::YesNo, Control::YesNo { selected }) => {
            map.insert(
                "yes_no".into(),
                json!({
                    "yes": *selected == Some(Toggle::Yes),
                    "no": *selected == Some(Toggle::No),
                    "value": selected.map(|toggle| toggle.as_str()).unwrap_or(""),
                }),
            );
        }
        (WidgetKind::Select { options }, Control::Select { selected, .. }) => {
            let options = options
                .iter()
                .enumerate()
                .map(|(position, label)| {
                    json!({
                        "value": position.to_string(),
                        "label": label,
                        "selected": position == *selected,
                    })
                })
                .collect::<Vec<_>>();
            map.insert("select".into(), json!({ "options": options }));
        }
        (
            WidgetKind::Number {
                step, placeholder, ..
            },
            Control::Field { value, .. },
        ) => {
            map.insert(
                "field".into(),
                json!({
                    "type": "number",
                    "step": step,
                    "placeholder": placeholder,
                    "value": value
                }),
            );
        }
        (WidgetKind::Date, Control::Field { value, .. }) => {
            map.insert("field".into(), json!({ "type": "date", "value": value }));
        }
        (WidgetKind::Text { placeholder }, Control::Field { value, .. }) => {
            map.insert(
                "field".into(),
                json!({ "type": "text", "placeholder": placeholder, "value": value }),
            );
        }
        (WidgetKind::List(list), Control::Rows { rows, .. }) => {
            let rows = rows
                .iter()
                .map(|row| {
                    json!({
                        "type": list.input.as_str(),
                        "placeholder": list.placeholder,
                        "value": row,
                    })
                })
                .collect::<Vec<_>>();
            map.insert(
                "list".into(),
                json!({ "rows": rows, "add_label": list.add_label }),
            );
        }
        _ => {}
    }

    Value::Object(map)
}

fn gate_json(gate: &Dependency) -> Value {
    json!({ "index": gate.index, "value": gate.value })
}

fn note_json(note: &Note) -> Value {
    Value::Array(
        note.segments
            .iter()
            .map(|segment| match segment {
                NoteSegment::Text(text) => json!({ "text": text }),
                NoteSegment::Link { label, href } => json!({ "text": label, "href": href }),
            })
            .collect(),
    )
}

fn widget_label(kind: &WidgetKind) -> &'static str {
    match kind {
        WidgetKind::YesNo => "yes_no",
        WidgetKind::Select { .. } => "select",
        WidgetKind::Number { .. } => "number",
        WidgetKind::Date => "date",
        WidgetKind::List(_) => "list",
        WidgetKind::Text { .. } => "text",
    }
}

/// Render the payload as human-friendly text. Hidden groups are skipped.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    if let Some(title) = &payload.title {
        lines.push(format!("== {} ==", title));
    }
    for group in payload.groups.iter().filter(|group| group.visible) {
        lines.extend(group_lines(group));
    }
    if payload.visible_count() == 0 {
        lines.push("No visible questions.".to_string());
    }
    lines.join("\n")
}

/// Text block for a single group: label, bullets, choices, note and current value.
pub fn group_lines(group: &RenderGroup) -> Vec<String> {
    let widget = &group.widget;
    let mut lines = vec![format!("{}. {}", widget.index + 1, widget.label)];
    for bullet in &widget.bullets {
        lines.push(format!("   * {}", bullet));
    }
    if let WidgetKind::Select { options } = &widget.kind {
        for (position, label) in options.iter().enumerate() {
            lines.push(format!("   {}) {}", position, label));
        }
    }
    if let Some(note) = &widget.note {
        lines.push(format!("   Note: {}", note.plain_text()));
    }
    if let Some(current) = current_value(&widget.kind, &group.control) {
        lines.push(format!("   = {}", current));
    }
    lines
}

fn current_value(kind: &WidgetKind, control: &Control) -> Option<String> {
    match (kind, control) {
        (WidgetKind::Select { options }, Control::Select { selected, .. }) => {
            options.get(*selected).cloned()
        }
        (_, Control::Rows { rows, .. }) => {
            let filled = rows
                .iter()
                .filter(|row| !row.trim().is_empty())
                .cloned()
                .collect::<Vec<_>>();
            (!filled.is_empty()).then(|| filled.join(", "))
        }
        (_, control) => control.value().filter(|value| !value.is_empty()),
    }
}

/// Render the payload as an HTML form fragment.
pub fn render_html(engine: &TemplateEngine, payload: &RenderPayload) -> Result<String, SpecError> {
    engine.render(FORM_TEMPLATE, &render_json_ui(payload))
}

/// Results as a JSON-friendly value.
pub fn render_results_json(items: &[ResultItem]) -> Value {
    let items = items
        .iter()
        .map(|item| match item {
            ResultItem::Cases(cases) => {
                let cases = cases
                    .iter()
                    .map(|case| {
                        json!({
                            "case_name": case.case_name,
                            "verdict": case.verdict,
                            "eligible": case.eligible,
                        })
                    })
                    .collect::<Vec<_>>();
                json!({ "is_cases": true, "cases": cases })
            }
            ResultItem::Message(message) => json!({
                "is_cases": false,
                "message": message,
            }),
        })
        .collect::<Vec<_>>();
    json!({ "items": items })
}

pub fn render_results_text(items: &[ResultItem]) -> String {
    if items.is_empty() {
        return "No results available.".to_string();
    }
    let mut lines = Vec::new();
    for item in items {
        match item {
            ResultItem::Cases(cases) => {
                for case in cases {
                    let marker = if case.eligible { "eligible" } else { "ineligible" };
                    lines.push(format!("{} [{}]", case.case_name, marker));
                    lines.push(format!("  {}", case.verdict));
                }
            }
            ResultItem::Message(message) => lines.push(message.clone()),
        }
    }
    lines.join("\n")
}

pub fn render_results_html(
    engine: &TemplateEngine,
    items: &[ResultItem],
) -> Result<String, SpecError> {
    engine.render(RESULTS_TEMPLATE, &render_results_json(items))
}
