pub mod context_builder;
pub mod prompt_builder;
pub mod reconciler;
pub mod result_writer;

pub use context_builder::{build_contexts, CONTEXT_DELIMITER};
pub use reconciler::reconcile;
pub use result_writer::ResultWriter;
