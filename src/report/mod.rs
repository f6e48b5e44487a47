//! Reading medical reports and rendering the final diagnosis.

pub mod generator;
pub mod reader;

pub use generator::{generate_json_report, generate_markdown_report};
pub use reader::read_medical_report;
