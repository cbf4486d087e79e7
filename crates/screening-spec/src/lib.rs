#![allow(missing_docs)]

pub mod collect;
pub mod error;
pub mod form;
pub mod note;
pub mod render;
pub mod results;
pub mod routing;
pub mod spec;
pub mod template;
pub mod visibility;
pub mod widget;

pub use collect::{CollectError, collect_answers, reformat_date};
pub use error::SpecError;
pub use form::{Control, FormError, FormEvent, FormState, Toggle};
pub use note::{Note, NoteSegment};
pub use render::{
    RenderGroup, RenderPayload, build_render_payload, render_html, render_json_ui,
    render_results_html, render_results_json, render_results_text, render_text,
};
pub use results::{CaseVerdict, RawResultItem, ResultItem, results_from_raw};
pub use routing::{Page, next_page};
pub use spec::{
    Dependency, QuestionBatch, QuestionDescriptor, RawDescriptor, ResponseKind, batch_schema,
    parse_descriptors,
};
pub use template::TemplateEngine;
pub use visibility::{VisibilityMap, resolve_visibility};
pub use widget::{InputType, ListWidget, QuestionWidget, WidgetKind, build_widgets};
