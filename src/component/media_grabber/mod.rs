//! Interactive download flow
//!
//! Prompts for a query, then walks the result through the media pipeline
//! asking before every optional step.

mod main;

pub use main::MediaGrabber;
pub(crate) use main::{print_report, read_image_path, read_tag_fields};
