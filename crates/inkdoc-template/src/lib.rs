//! Template rendering and placeholder repair.
//!
//! Fills the manual template with scalar values and the rendered Markdown
//! subdocument, embedding referenced images as media parts. The repair
//! functions mend templates whose placeholders Word split across runs.

mod error;
mod lower;
mod media;
mod naming;
mod repair;
mod template;

pub use error::TemplateError;
pub use media::IMAGE_WIDTH_EMU;
pub use naming::{output_filename, safe_filename};
pub use repair::{
    fix_cover_title, fix_headers, fix_main_content, merge_cover_title,
    merge_header_placeholders, rebuild_content_paragraph,
};
pub use template::{
    CONTENT_PLACEHOLDER, DocxTemplate, SOFTWARE_NAME_PLACEHOLDER, VERSION_PLACEHOLDER,
};
