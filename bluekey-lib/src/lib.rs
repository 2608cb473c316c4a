pub mod capture;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scanner;

// Re-export the entry points most callers need.
pub use error::ExtractError;
pub use pipeline::extract_from_file;
pub use report::Report;
