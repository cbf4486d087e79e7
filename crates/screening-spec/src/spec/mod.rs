pub mod batch;
pub mod descriptor;

pub use batch::{QuestionBatch, batch_schema};
pub use descriptor::{
    Dependency, OptionalFlag, QuestionDescriptor, RawDescriptor, RawOptions, ResponseKind,
    parse_descriptors,
};
