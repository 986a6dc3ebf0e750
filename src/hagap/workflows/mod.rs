mod batch;

pub use batch::{run_batch, BatchSummary, ScanParams};
