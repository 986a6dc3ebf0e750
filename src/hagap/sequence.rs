use crate::hagap::gaps::{expand, GapSet, Physical};
use crate::hagap::issues::{Issue, SequenceIssues};
use crate::hagap::{ScanError, GAP, UNKNOWN};

/// How a sequence received its shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorMethod {
    /// Subtype-specific motif rule.
    Motif,
    /// Adaptive per-column table trained on motif-anchored sequences.
    ColumnTable,
}

/// Residue lookup result at a canonical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residue {
    Aa(char),
    Deleted,
    OutOfRange,
}

/// Uppercases letters and replaces every symbol other than a letter, a gap
/// filler or a stop with the unknown residue, so residues are single bytes.
pub fn normalize_residues(aa: &str) -> String {
    aa.chars()
        .map(|c| match c {
            c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            c if c == GAP as char || c == '*' => c,
            _ => UNKNOWN as char,
        })
        .collect()
}

/// A translated hemagglutinin sequence together with its alignment annotation.
///
/// Residues are always ASCII, so shifts and gap positions are byte offsets.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub id: String,
    /// Subtype reported by the data source, possibly empty or imprecise.
    pub hint: String,
    aa: String,
    /// Nucleotide offset at which translation started.
    translation_offset: usize,
    /// Physical offset of the first aligned residue.
    start: usize,
    shift: Option<i32>,
    subtype: Option<String>,
    method: Option<AnchorMethod>,
    gaps: GapSet,
    issues: SequenceIssues,
    failure: Option<ScanError>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, hint: impl Into<String>, aa: impl Into<String>) -> Self {
        let mut issues = SequenceIssues::default();
        issues.set(Issue::NotAligned);
        Self {
            id: id.into(),
            hint: hint.into(),
            aa: normalize_residues(&aa.into()),
            translation_offset: 0,
            start: 0,
            shift: None,
            subtype: None,
            method: None,
            gaps: GapSet::default(),
            issues,
            failure: None,
        }
    }

    /// A sequence that already starts at the mature protein.
    pub fn from_aligned(id: impl Into<String>, subtype: &str, aa: impl Into<String>) -> Self {
        let mut seq = Self::new(id, subtype, aa);
        seq.shift = Some(0);
        seq.subtype = Some(subtype.to_string());
        seq.issues.reset(Issue::NotAligned);
        seq
    }

    pub fn with_translation_offset(mut self, offset: usize) -> Self {
        self.translation_offset = offset;
        self
    }

    pub fn aa(&self) -> &str {
        &self.aa
    }

    pub fn translation_offset(&self) -> usize {
        self.translation_offset
    }

    /// Signed shift as located; `None` while not aligned.
    pub fn shift(&self) -> Option<i32> {
        self.shift
    }

    pub fn is_aligned(&self) -> bool {
        self.shift.is_some()
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    pub fn method(&self) -> Option<AnchorMethod> {
        self.method
    }

    pub fn gaps(&self) -> &GapSet {
        &self.gaps
    }

    pub fn issues(&self) -> SequenceIssues {
        self.issues
    }

    pub fn failure(&self) -> Option<&ScanError> {
        self.failure.as_ref()
    }

    /// Records the shift and subtype found for this sequence.
    ///
    /// A negative shift prepends that many unknown residues, so the aligned
    /// part always starts at a physical offset.
    pub fn set_anchor(&mut self, shift: i32, subtype: &str, method: AnchorMethod) {
        if shift < 0 {
            let filler = "X".repeat(shift.unsigned_abs() as usize);
            self.aa.insert_str(0, &filler);
            self.start = 0;
        } else {
            self.start = (shift as usize).min(self.aa.len());
        }
        self.shift = Some(shift);
        self.subtype = Some(subtype.to_string());
        self.method = Some(method);
        self.issues.reset(Issue::NotAligned);
        self.failure = None;
    }

    pub fn set_gaps(&mut self, gaps: GapSet) {
        self.gaps = gaps;
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.set(issue);
    }

    pub fn set_failure(&mut self, failure: ScanError) {
        self.failure = Some(failure);
    }

    /// Residues from the start of the mature protein, without gaps applied.
    pub fn aligned(&self) -> Option<&str> {
        self.shift.map(|_| &self.aa[self.start..])
    }

    pub fn aligned_len(&self) -> Option<usize> {
        self.aligned().map(str::len)
    }

    /// Number of unknown residues in the aligned part.
    pub fn unknown_count(&self) -> usize {
        self.aligned()
            .map_or(0, |aa| aa.bytes().filter(|&c| c == UNKNOWN).count())
    }

    /// Aligned residues with deletions expanded into gap fillers.
    pub fn format_aligned(&self) -> Option<String> {
        self.aligned()
            .map(|aa| expand(aa, self.gaps.deletions(), GAP as char))
    }

    /// Residue at a 1-based canonical position.
    pub fn residue_at(&self, pos1: usize) -> Residue {
        let Some(aligned) = self.aligned() else {
            return Residue::OutOfRange;
        };
        if pos1 == 0 {
            return Residue::OutOfRange;
        }
        match self.gaps.apply_deletions(pos1 - 1) {
            Physical::Deleted => Residue::Deleted,
            Physical::Offset(offset) => aligned
                .as_bytes()
                .get(offset)
                .map_or(Residue::OutOfRange, |&c| Residue::Aa(c as char)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hagap::gaps::Gap;

    #[test]
    fn residues_are_normalized_to_ascii() {
        let seq = Sequence::new("s1", "B", "dr\u{e9}ct 1-*");
        assert_eq!(seq.aa(), "DRXCTXX-*");
        assert!(seq.aa().is_ascii());
    }

    #[test]
    fn shift_past_multibyte_input() {
        let mut seq = Sequence::new("s1", "B", "\u{e9}DRICTGITS");
        seq.set_anchor(1, "B", AnchorMethod::Motif);
        assert_eq!(seq.aligned(), Some("DRICTGITS"));
        assert_eq!(seq.residue_at(1), Residue::Aa('D'));
    }

    #[test]
    fn new_sequence_is_not_aligned() {
        let seq = Sequence::new("s1", "A(H3N2)", "MKTIIALSYQDLPG");
        assert!(!seq.is_aligned());
        assert!(seq.issues().has(Issue::NotAligned));
        assert_eq!(seq.aligned(), None);
        assert_eq!(seq.residue_at(1), Residue::OutOfRange);
    }

    #[test]
    fn positive_shift_skips_signal_peptide() {
        let mut seq = Sequence::new("s1", "A(H3N2)", "MKTIQDLPG");
        seq.set_anchor(4, "A(H3N2)", AnchorMethod::Motif);
        assert_eq!(seq.shift(), Some(4));
        assert_eq!(seq.aligned(), Some("QDLPG"));
        assert_eq!(seq.residue_at(1), Residue::Aa('Q'));
        assert_eq!(seq.residue_at(5), Residue::Aa('G'));
        assert_eq!(seq.residue_at(6), Residue::OutOfRange);
        assert_eq!(seq.residue_at(0), Residue::OutOfRange);
        assert!(!seq.issues().has(Issue::NotAligned));
    }

    #[test]
    fn negative_shift_prepends_unknowns() {
        let mut seq = Sequence::new("s1", "B", "CTGITS");
        seq.set_anchor(-3, "B", AnchorMethod::Motif);
        assert_eq!(seq.shift(), Some(-3));
        assert_eq!(seq.aligned(), Some("XXXCTGITS"));
        assert_eq!(seq.unknown_count(), 3);
        assert_eq!(seq.residue_at(4), Residue::Aa('C'));
    }

    #[test]
    fn lookup_accounts_for_deletions() {
        let mut seq = Sequence::from_aligned("s1", "A(H3N2)", "ABEFH");
        seq.set_gaps(
            GapSet::new(
                vec![Gap { pos: 2, len: 2 }, Gap { pos: 4, len: 1 }],
                Vec::new(),
            )
            .unwrap(),
        );
        assert_eq!(seq.residue_at(2), Residue::Aa('B'));
        assert_eq!(seq.residue_at(3), Residue::Deleted);
        assert_eq!(seq.residue_at(5), Residue::Aa('E'));
        assert_eq!(seq.residue_at(7), Residue::Deleted);
        assert_eq!(seq.residue_at(8), Residue::Aa('H'));
        assert_eq!(seq.residue_at(9), Residue::OutOfRange);
        assert_eq!(seq.format_aligned().as_deref(), Some("AB--EF-H"));
    }
}
