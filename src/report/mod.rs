// Presentation of engine output
pub mod json;
pub mod table;

pub use json::render_json;
pub use table::{TableStyle, render_table};
