use crate::hagap::anchor::{locate, AnchorTable};
use crate::hagap::column_aligner::ColumnAligner;
use crate::hagap::gaps::{detect, Detection, GapParams, GapSet};
use crate::hagap::issues::{assess_aligned, Issue, SequenceIssues};
use crate::hagap::master::{MasterRef, MasterSet};
use crate::hagap::sequence::AnchorMethod;
use crate::hagap::subtype::{h_or_b, is_authoritative};
use crate::hagap::{ScanError, Sequence};
use rayon::prelude::*;
use std::fmt;

const CHUNK_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct ScanParams {
    pub gap: GapParams,
    pub use_curated_masters: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            gap: GapParams::default(),
            use_curated_masters: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub anchored_by_motif: usize,
    pub anchored_by_column_table: usize,
    pub not_aligned: usize,
    pub gap_detected: usize,
    pub not_verified: usize,
    pub groups_without_master: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total:{} motif:{} column-table:{} not-aligned:{} gaps:{} not-verified:{} no-master-groups:{}",
            self.total,
            self.anchored_by_motif,
            self.anchored_by_column_table,
            self.not_aligned,
            self.gap_detected,
            self.not_verified,
            self.groups_without_master
        )
    }
}

/// Soft per-sequence failures are worth a warning only for subtypes the
/// collaborating centres report routinely.
fn log_soft_failure(seq: &Sequence, err: &ScanError) {
    let subtype = seq.subtype().unwrap_or(&seq.hint);
    if is_authoritative(subtype) {
        log::warn!("{}: {}", seq.id, err);
    } else {
        log::debug!("{}: {}", seq.id, err);
    }
}

enum GapOutcome {
    Skipped,
    Detected(Detection, SequenceIssues),
    NotVerified(ScanError, SequenceIssues),
}

/// Anchors every sequence, selects a master per subtype group and detects
/// deletions and insertions against it.
///
/// Runs on the current rayon pool. Failures are recorded on the sequences
/// they concern and never abort the batch.
pub fn run_batch(
    mut sequences: Vec<Sequence>,
    table: &AnchorTable,
    params: &ScanParams,
) -> (Vec<Sequence>, BatchSummary) {
    let mut summary = BatchSummary {
        total: sequences.len(),
        ..Default::default()
    };

    sequences.par_chunks_mut(CHUNK_SIZE).for_each(|chunk| {
        for seq in chunk.iter_mut() {
            if let Some(anchor) = locate(seq.aa(), &seq.hint, table) {
                seq.set_anchor(anchor.shift, &anchor.subtype, AnchorMethod::Motif);
            }
        }
    });
    summary.anchored_by_motif = sequences.iter().filter(|s| s.is_aligned()).count();
    log::info!(
        "Anchored {} of {} sequences by motif",
        summary.anchored_by_motif,
        summary.total
    );

    let aligner = ColumnAligner::train(&sequences);
    log::debug!("Trained column tables for {} groups", aligner.len());
    sequences.par_chunks_mut(CHUNK_SIZE).for_each(|chunk| {
        for seq in chunk.iter_mut().filter(|s| !s.is_aligned()) {
            match aligner.locate(seq.aa(), &seq.hint) {
                Some(anchor) => {
                    seq.set_anchor(anchor.shift, &anchor.subtype, AnchorMethod::ColumnTable)
                }
                None => {
                    let err = ScanError::NoAnchorMatch { id: seq.id.clone() };
                    log_soft_failure(seq, &err);
                    seq.set_failure(err);
                }
            }
        }
    });
    summary.anchored_by_column_table = sequences
        .iter()
        .filter(|s| s.method() == Some(AnchorMethod::ColumnTable))
        .count();
    summary.not_aligned = sequences.iter().filter(|s| !s.is_aligned()).count();
    log::info!(
        "Anchored {} more sequences with column tables, {} not aligned",
        summary.anchored_by_column_table,
        summary.not_aligned
    );

    let (masters, missing) = MasterSet::select(&sequences, params.use_curated_masters);
    for err in &missing {
        log::error!("{}", err);
    }
    summary.groups_without_master = missing.len();

    let outcomes: Vec<GapOutcome> = sequences
        .par_iter()
        .enumerate()
        .with_min_len(CHUNK_SIZE)
        .map(|(idx, seq)| {
            let (Some(aligned), Some(group)) = (seq.aligned(), seq.subtype().and_then(h_or_b))
            else {
                return GapOutcome::Skipped;
            };
            if masters.get(group) == Some(MasterRef::Corpus(idx)) {
                return GapOutcome::Skipped;
            }
            let Some(master) = masters.aa(group, &sequences) else {
                if is_authoritative(seq.subtype().unwrap_or_default()) {
                    log::warn!("No master for {}", seq.id);
                }
                return GapOutcome::Skipped;
            };
            match detect(master, aligned, &params.gap) {
                Ok(detection) => {
                    let issues = assess_aligned(master, aligned, &detection.gaps);
                    GapOutcome::Detected(detection, issues)
                }
                Err(err) => {
                    let issues = assess_aligned(master, aligned, &GapSet::default());
                    GapOutcome::NotVerified(err, issues)
                }
            }
        })
        .collect();

    for (seq, outcome) in sequences.iter_mut().zip(outcomes) {
        let issues = match outcome {
            GapOutcome::Skipped => continue,
            GapOutcome::Detected(detection, issues) => {
                summary.gap_detected += 1;
                seq.set_gaps(detection.gaps);
                issues
            }
            GapOutcome::NotVerified(err, issues) => {
                summary.not_verified += 1;
                log_soft_failure(seq, &err);
                seq.add_issue(Issue::NotVerified);
                seq.set_failure(err);
                issues
            }
        };
        for issue in issues.iter() {
            seq.add_issue(issue);
        }
    }

    log::info!("Batch done: {}", summary);
    (sequences, summary)
}
