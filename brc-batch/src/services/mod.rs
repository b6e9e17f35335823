//! Service modules for the reconciliation batch

pub mod classifier;
pub mod key_source;
pub mod object_fetcher;
pub mod object_store;
pub mod payload_extractor;
pub mod report_sink;

pub use classifier::Classifier;
pub use key_source::{KeySource, QueryKeySource, TableKeySource};
pub use object_fetcher::ObjectFetcher;
pub use object_store::{HttpObjectStore, ObjectStore, StoreError};
pub use report_sink::{CsvReportSink, ReportSink};
