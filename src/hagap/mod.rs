pub mod aa_at_pos;
pub mod anchor;
pub mod column_aligner;
pub mod entry;
pub mod error;
pub mod gaps;
pub mod hamming;
pub mod issues;
pub mod master;
pub mod sequence;
pub mod subtype;
pub mod translate;
pub mod workflows;
pub mod writers;

pub use error::{Result, ScanError};
pub use sequence::{Residue, Sequence};

/// Unknown residue produced by ambiguous codons and used as filler.
pub const UNKNOWN: u8 = b'X';
/// Gap filler in expanded sequences.
pub const GAP: u8 = b'-';
