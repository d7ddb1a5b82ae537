//! Charts module - registry and payload validation
//!
//! - `registry.rs`: the four charts and their fixed visual schema
//! - `validate.rs`: defensive shape checks turning analytics JSON into updates

mod registry;
mod validate;

pub use registry::{ChartKind, ChartRegistry, ChartSpec, ChartUpdate};
pub use validate::{ShapeError, ValidatedPayload, validate_payload};
