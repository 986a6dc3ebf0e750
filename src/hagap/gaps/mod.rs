mod detector;
mod gap_set;

pub use detector::{detect, find_common_head, gap_at_start, Detection, GapAtStart, GapParams, Head};
pub use gap_set::{expand, format_runs, Gap, GapSet, Physical};
