use crate::hagap::gaps::GapSet;

/// Per-sequence and per-group failures of the scanning core.
///
/// Only [`ScanError::NoMasterForGroup`] indicates a broken upstream contract;
/// every other variant is scoped to a single sequence and never aborts a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// No anchor rule and no adaptive column table placed the sequence.
    NoAnchorMatch { id: String },

    /// No corpus sequence qualified as the master of a subtype group.
    NoMasterForGroup { group: String },

    /// Too few residues are shared with the master after applying the gaps found.
    GapDetectionNotVerified(Box<NotVerified>),

    /// Malformed caller-supplied data.
    InvalidInput(String),
}

/// Diagnostics of a rejected gap detection.
#[derive(Debug, Clone, PartialEq)]
pub struct NotVerified {
    pub common: usize,
    pub threshold: f64,
    pub master: String,
    pub target: String,
    pub partial: GapSet,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::NoAnchorMatch { id } => write!(f, "no anchor found for {}", id),
            ScanError::NoMasterForGroup { group } => {
                write!(f, "internal: no master sequence for group {}", group)
            }
            ScanError::GapDetectionNotVerified(nv) => write!(
                f,
                "gap detection not verified: common:{} threshold:{:.2} target-len:{} {}",
                nv.common,
                nv.threshold,
                nv.target.len(),
                nv.partial
            ),
            ScanError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}

pub type Result<T> = std::result::Result<T, ScanError>;
