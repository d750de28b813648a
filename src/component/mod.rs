//! Feature components
//!
//! Each submodule owns one workflow or one reusable piece of one.

pub mod library_editor;
pub mod media_grabber;
pub mod media_pipeline;
pub mod scrub_session;

pub use library_editor::LibraryEditor;
pub use media_grabber::MediaGrabber;
pub use media_pipeline::MediaPipeline;
