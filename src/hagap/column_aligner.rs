use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::hagap::anchor::Anchor;
use crate::hagap::subtype::h_or_b;
use crate::hagap::{Sequence, GAP, UNKNOWN};

const MAX_COLUMNS: usize = 1000;
const SYMBOLS: usize = 128;
const MIN_TRAINING_CHUNK: usize = 256;

/// First residue of the mature protein per broad group.
const START_RESIDUES: [(&str, u8); 18] = [
    ("H1", b'D'),
    ("H2", b'D'),
    ("H3", b'Q'),
    ("H4", b'Q'),
    ("H5", b'D'),
    ("H6", b'D'),
    ("H7", b'D'),
    ("H8", b'D'),
    ("H9", b'D'),
    ("H10", b'D'),
    ("H11", b'D'),
    ("H12", b'D'),
    ("H13", b'D'),
    ("H14", b'Q'),
    ("H15", b'D'),
    ("H16", b'D'),
    ("H17", b'D'),
    ("B", b'D'),
];

pub fn start_residue(group: &str) -> Option<u8> {
    START_RESIDUES
        .iter()
        .find(|(g, _)| *g == group)
        .map(|&(_, residue)| residue)
}

/// Column by residue grid of residues observed in anchored sequences.
///
/// Unknown residues and gap fillers are admissible everywhere. Flags only
/// ever change from forbidden to admissible.
#[derive(Clone)]
pub struct ColumnTable {
    admissible: Vec<bool>,
}

impl Default for ColumnTable {
    fn default() -> Self {
        let mut admissible = vec![false; MAX_COLUMNS * SYMBOLS];
        for column in 0..MAX_COLUMNS {
            admissible[column * SYMBOLS + UNKNOWN as usize] = true;
            admissible[column * SYMBOLS + GAP as usize] = true;
        }
        Self { admissible }
    }
}

impl std::fmt::Debug for ColumnTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnTable")
            .field("observed", &self.admissible.iter().filter(|&&a| a).count())
            .finish()
    }
}

impl ColumnTable {
    /// Admits every residue of `aligned` at its column.
    pub fn update(&mut self, aligned: &[u8]) {
        for (column, &residue) in aligned.iter().take(MAX_COLUMNS).enumerate() {
            if (residue as usize) < SYMBOLS {
                self.admissible[column * SYMBOLS + residue as usize] = true;
            }
        }
    }

    pub fn merge(&mut self, other: &ColumnTable) {
        for (flag, &theirs) in self.admissible.iter_mut().zip(&other.admissible) {
            *flag |= theirs;
        }
    }

    pub fn is_admissible(&self, column: usize, residue: u8) -> bool {
        column < MAX_COLUMNS
            && (residue as usize) < SYMBOLS
            && self.admissible[column * SYMBOLS + residue as usize]
    }

    /// Residue letters admitted at `column`, excluding unknown and gap.
    pub fn admissible_at(&self, column: usize) -> String {
        (b'A'..=b'Z')
            .filter(|&r| r != UNKNOWN && self.is_admissible(column, r))
            .map(char::from)
            .collect()
    }

    /// Finds the first occurrence of `start` in the first half of `aa` from
    /// which every following column is admissible.
    pub fn locate(&self, start: u8, aa: &[u8]) -> Option<usize> {
        let half = aa.len() / 2;
        aa.iter()
            .take(half)
            .enumerate()
            .filter(|&(_, &r)| r == start)
            .map(|(p, _)| p)
            .find(|&p| {
                aa[p..]
                    .iter()
                    .take(MAX_COLUMNS)
                    .enumerate()
                    .all(|(column, &r)| self.is_admissible(column, r))
            })
    }
}

/// One [`ColumnTable`] per broad subtype group.
#[derive(Debug, Clone, Default)]
pub struct ColumnAligner {
    tables: BTreeMap<String, ColumnTable>,
}

impl ColumnAligner {
    /// Builds the tables from every aligned sequence in `sequences`.
    pub fn train(sequences: &[Sequence]) -> Self {
        let aligner = sequences
            .par_iter()
            .with_min_len(MIN_TRAINING_CHUNK)
            .fold(ColumnAligner::default, |mut aligner, seq| {
                if let (Some(aligned), Some(subtype)) = (seq.aligned(), seq.subtype()) {
                    aligner.update(aligned, subtype);
                }
                aligner
            })
            .reduce(ColumnAligner::default, ColumnAligner::merge);
        for (group, table) in &aligner.tables {
            log::trace!("Column table {}: first column {}", group, table.admissible_at(0));
        }
        aligner
    }

    pub fn update(&mut self, aligned: &str, subtype: &str) {
        let Some(group) = h_or_b(subtype) else {
            return;
        };
        self.tables
            .entry(group.to_string())
            .or_default()
            .update(aligned.as_bytes());
    }

    pub fn merge(mut self, other: ColumnAligner) -> ColumnAligner {
        for (group, table) in other.tables {
            match self.tables.get_mut(&group) {
                Some(existing) => existing.merge(&table),
                None => {
                    self.tables.insert(group, table);
                }
            }
        }
        self
    }

    pub fn table(&self, group: &str) -> Option<&ColumnTable> {
        self.tables.get(group)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Anchors `aa` using the table of the hint's group; the hint itself is
    /// reported as the subtype.
    pub fn locate(&self, aa: &str, hint: &str) -> Option<Anchor> {
        let group = h_or_b(hint)?;
        let Some(start) = start_residue(group) else {
            log::debug!("No start residue known for {}", hint);
            return None;
        };
        let shift = self.tables.get(group)?.locate(start, aa.as_bytes())?;
        Some(Anchor {
            shift: shift as i32,
            subtype: hint.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATURE: &str = "QDLPGNDNST";

    fn trained() -> ColumnAligner {
        let mut aligner = ColumnAligner::default();
        aligner.update(MATURE, "A(H3N2)");
        aligner
    }

    #[test]
    fn fresh_table_admits_only_unknown_and_gap() {
        let table = ColumnTable::default();
        assert!(table.is_admissible(0, b'X'));
        assert!(table.is_admissible(999, b'-'));
        assert!(!table.is_admissible(0, b'Q'));
        assert!(!table.is_admissible(1000, b'X'));
        assert_eq!(table.admissible_at(0), "");
    }

    #[test]
    fn locates_after_signal_peptide() {
        let anchor = trained().locate("MKQDLPGNDNST", "A(H3N2)").unwrap();
        assert_eq!(anchor.shift, 2);
        assert_eq!(anchor.subtype, "A(H3N2)");
    }

    #[test]
    fn skips_start_residues_with_inadmissible_columns() {
        let anchor = trained().locate("MQAQDLPGNDNST", "A(H3)").unwrap();
        assert_eq!(anchor.shift, 3);
    }

    #[test]
    fn unknown_residues_are_admissible() {
        assert_eq!(
            trained().locate("MKQDXPGNDNST", "A(H3N2)").map(|a| a.shift),
            Some(2)
        );
    }

    #[test]
    fn start_in_second_half_is_ignored() {
        assert_eq!(trained().locate("MKTIIALSYQDLPG", "A(H3N2)"), None);
    }

    #[test]
    fn hint_without_table_is_not_located() {
        let aligner = trained();
        assert_eq!(aligner.locate("MKQDLPGNDNST", "A(H1N1)"), None);
        assert_eq!(aligner.locate("MKQDLPGNDNST", ""), None);
    }

    #[test]
    fn merge_is_union() {
        let mut a = ColumnAligner::default();
        a.update("QD", "A(H3N2)");
        let mut b = ColumnAligner::default();
        b.update("QE", "A(H3N2)");
        b.update("DR", "B");
        let merged = a.merge(b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.table("H3").unwrap().admissible_at(1), "DE");
        assert_eq!(merged.table("B").unwrap().admissible_at(0), "D");
    }

    #[test]
    fn long_sequences_train_first_columns_only() {
        let mut table = ColumnTable::default();
        table.update("A".repeat(1200).as_bytes());
        assert!(table.is_admissible(999, b'A'));
        assert!(!table.is_admissible(1000, b'A'));
    }

    #[test]
    fn train_uses_aligned_sequences_only() {
        let mut anchored = Sequence::new("a", "A(H3N2)", "MKQDLPG");
        anchored.set_anchor(2, "A(H3N2)", crate::hagap::sequence::AnchorMethod::Motif);
        let corpus = vec![anchored, Sequence::new("b", "B", "DRICTG")];
        let aligner = ColumnAligner::train(&corpus);
        assert_eq!(aligner.len(), 1);
        assert_eq!(aligner.table("H3").unwrap().admissible_at(0), "Q");
    }
}
