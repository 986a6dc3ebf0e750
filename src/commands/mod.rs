pub mod gaps;
pub mod scan;
