pub mod formatter;
pub mod json;

pub use formatter::{format_report, format_town_list, format_usd, should_use_colors};
pub use json::write_json_atomic;
