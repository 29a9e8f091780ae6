pub mod api_error;
pub mod content_type;
pub mod file;
pub mod filename;
pub mod pdf;
pub mod validation;

pub use api_error::resolve_error_message;
pub use content_type::{get_content_type, is_archive_mime};
pub use file::*;
pub use filename::resolve_filename;
pub use pdf::estimate_page_count;
pub use validation::{validate_batch, validate_extension};
