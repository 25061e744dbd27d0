pub mod batch;
pub mod dataset;
pub mod loaders;
pub mod schema;

pub use batch::{split_batches, Batch};
pub use dataset::Dataset;
pub use loaders::{load_csv_to_dataset, load_job_file, parse_csv_str, JobFile};
pub use schema::{
    AnalysisMode, Category, LabelSchema, LABEL_API_ERROR, LABEL_PATTERN_UNKNOWN,
    LABEL_UNCATEGORIZED,
};
