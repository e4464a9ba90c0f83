//! Rendering of output records.

mod json;

pub use json::{outline_to_json, to_json, JsonFormat};
