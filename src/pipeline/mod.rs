// Batch pipeline: crawl ingestion, record processing, reporting and persistence

pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod report;
pub mod storage;

pub use orchestrator::{Orchestrator, PipelineOutput};
pub use report::RunReport;
