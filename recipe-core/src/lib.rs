//! ABOUTME: recipe-core — shared types, error handling, and the Step protocol
//! ABOUTME: No I/O, no templating, no provider logic; those live in sibling crates

mod context;
mod error;
mod file_spec;
mod recipe;
mod registry;
mod schema;
mod step;

pub use context::{merge_values, Context, IfExists};
pub use error::{RecipeError, Result, StepPath, StepPathSegment};
pub use file_spec::FileSpec;
pub use recipe::{Recipe, StepDef};
pub use registry::StepRegistry;
pub use schema::{json_object_to_record, FieldType, RecordSchema, TypedRecord};
pub use step::{Step, StepFactory};
