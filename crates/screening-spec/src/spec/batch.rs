use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;
use crate::spec::descriptor::{QuestionDescriptor, RawDescriptor, parse_descriptors};

/// A group of descriptors delivered together, tagged with the files they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct QuestionBatch {
    pub questions: Vec<RawDescriptor>,
    #[serde(default)]
    pub filenames: Vec<String>,
}

impl QuestionBatch {
    pub fn descriptors(&self) -> Result<Vec<QuestionDescriptor>, SpecError> {
        parse_descriptors(&self.questions)
    }

    /// Accepts either a full batch object or a bare descriptor array.
    pub fn from_json(value: Value) -> Result<Self, SpecError> {
        if value.is_array() {
            let questions = serde_json::from_value(value).map_err(SpecError::Decode)?;
            Ok(Self {
                questions,
                filenames: Vec::new(),
            })
        } else {
            serde_json::from_value(value).map_err(SpecError::Decode)
        }
    }
}

/// JSON schema describing a question batch on the wire.
pub fn batch_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(QuestionBatch)).unwrap_or(Value::Null)
}
