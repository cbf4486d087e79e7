use crate::spec::descriptor::Dependency;
use crate::widget::QuestionWidget;

/// Visibility per widget index.
pub type VisibilityMap = Vec<bool>;

/// A gate opens only when the controlling widget holds exactly the gate value.
pub fn gate_open(gate: &Dependency, current: Option<&str>) -> bool {
    current.is_some_and(|value| value == gate.value)
}

/// Re-evaluate every gate against the current widget values.
///
/// `values[i]` is the string value of widget `i`, or `None` for widgets without
/// one (dynamic lists). Gates pointing past the end never open.
pub fn resolve_visibility(widgets: &[QuestionWidget], values: &[Option<String>]) -> VisibilityMap {
    widgets
        .iter()
        .map(|widget| match &widget.gate {
            Some(gate) => gate_open(
                gate,
                values.get(gate.index).and_then(|value| value.as_deref()),
            ),
            None => true,
        })
        .collect()
}

/// Visibility right after rendering: gated groups start hidden.
pub fn initial_visibility(widgets: &[QuestionWidget]) -> VisibilityMap {
    widgets.iter().map(|widget| widget.gate.is_none()).collect()
}
