pub mod csv_loader;
pub mod job_loader;

pub use csv_loader::{load_csv_to_dataset, parse_csv_str};
pub use job_loader::{load_job_file, JobFile};
