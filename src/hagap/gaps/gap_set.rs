use crate::hagap::{Result, ScanError};
use itertools::Itertools;
use std::fmt;

/// A run of `len` positions starting at 0-based `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub pos: usize,
    pub len: usize,
}

/// Deletions (in the target's own frame) and insertions (in the master's frame).
///
/// Positions are strictly increasing within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapSet {
    deletions: Vec<Gap>,
    insertions: Vec<Gap>,
}

/// Where a canonical position lands once deletions are accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Physical {
    Offset(usize),
    Deleted,
}

impl GapSet {
    pub fn new(deletions: Vec<Gap>, insertions: Vec<Gap>) -> Result<Self> {
        check_runs("deletions", &deletions)?;
        check_runs("insertions", &insertions)?;
        Ok(Self {
            deletions,
            insertions,
        })
    }

    pub fn deletions(&self) -> &[Gap] {
        &self.deletions
    }

    pub fn insertions(&self) -> &[Gap] {
        &self.insertions
    }

    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty()
    }

    pub(crate) fn push_deletion(&mut self, pos: usize, len: usize) {
        debug_assert!(self.deletions.last().map_or(true, |last| last.pos < pos));
        self.deletions.push(Gap { pos, len });
    }

    pub(crate) fn push_insertion(&mut self, pos: usize, len: usize) {
        debug_assert!(self.insertions.last().map_or(true, |last| last.pos < pos));
        self.insertions.push(Gap { pos, len });
    }

    /// Maps a 0-based canonical position to the physical offset in the target.
    pub fn apply_deletions(&self, mut pos: usize) -> Physical {
        for gap in &self.deletions {
            if gap.pos > pos {
                break;
            }
            if gap.pos + gap.len > pos {
                return Physical::Deleted;
            }
            pos -= gap.len;
        }
        Physical::Offset(pos)
    }
}

fn check_runs(kind: &str, runs: &[Gap]) -> Result<()> {
    if let Some(gap) = runs.iter().find(|g| g.len == 0) {
        return Err(ScanError::InvalidInput(format!(
            "{} contain an empty run at {}",
            kind,
            gap.pos + 1
        )));
    }
    if let Some((a, b)) = runs.iter().tuple_windows().find(|(a, b)| a.pos >= b.pos) {
        return Err(ScanError::InvalidInput(format!(
            "{} are not strictly increasing: {} then {}",
            kind,
            a.pos + 1,
            b.pos + 1
        )));
    }
    Ok(())
}

/// Inserts `len` copies of `filler` in front of each run position of `seq`.
///
/// A run positioned exactly at the end of `seq` is kept as a trailing gap;
/// runs beyond the end are clamped to it.
pub fn expand(seq: &str, runs: &[Gap], filler: char) -> String {
    let mut out = String::with_capacity(seq.len() + runs.iter().map(|g| g.len).sum::<usize>());
    let mut last = 0;
    for gap in runs {
        let pos = gap.pos.clamp(last, seq.len());
        out.push_str(&seq[last..pos]);
        out.extend(std::iter::repeat(filler).take(gap.len));
        last = pos;
    }
    out.push_str(&seq[last..]);
    out
}

pub fn format_runs(runs: &[Gap]) -> String {
    runs.iter()
        .map(|g| format!("{}:{}", g.pos + 1, g.len))
        .join(" ")
}

impl fmt::Display for GapSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.deletions.is_empty() {
            write!(
                f,
                "DEL[{}]({})",
                self.deletions.len(),
                format_runs(&self.deletions)
            )?;
        }
        if !self.insertions.is_empty() {
            if !self.deletions.is_empty() {
                write!(f, " ")?;
            }
            write!(
                f,
                "INS[{}]({})",
                self.insertions.len(),
                format_runs(&self.insertions)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaps(deletions: &[(usize, usize)]) -> GapSet {
        let deletions = deletions
            .iter()
            .map(|&(pos, len)| Gap { pos, len })
            .collect();
        GapSet::new(deletions, Vec::new()).unwrap()
    }

    #[test]
    fn positions_before_first_deletion_are_unchanged() {
        let set = gaps(&[(2, 2)]);
        assert_eq!(set.apply_deletions(0), Physical::Offset(0));
        assert_eq!(set.apply_deletions(1), Physical::Offset(1));
    }

    #[test]
    fn positions_inside_deletion_are_deleted() {
        // master ABCDEFGH, target ABEFH
        let set = gaps(&[(2, 2), (4, 1)]);
        assert_eq!(set.apply_deletions(2), Physical::Deleted);
        assert_eq!(set.apply_deletions(3), Physical::Deleted);
        assert_eq!(set.apply_deletions(4), Physical::Offset(2));
        assert_eq!(set.apply_deletions(5), Physical::Offset(3));
        assert_eq!(set.apply_deletions(6), Physical::Deleted);
        assert_eq!(set.apply_deletions(7), Physical::Offset(4));
    }

    #[test]
    fn rejects_unordered_runs() {
        let runs = vec![Gap { pos: 5, len: 1 }, Gap { pos: 5, len: 2 }];
        assert!(matches!(
            GapSet::new(runs, Vec::new()),
            Err(ScanError::InvalidInput(_))
        ));
        let runs = vec![Gap { pos: 5, len: 0 }];
        assert!(GapSet::new(Vec::new(), runs).is_err());
    }

    #[test]
    fn expand_inserts_fillers() {
        let runs = [Gap { pos: 2, len: 2 }, Gap { pos: 4, len: 1 }];
        assert_eq!(expand("ABEFH", &runs, '-'), "AB--EF-H");
        assert_eq!(expand("ABC", &[Gap { pos: 3, len: 2 }], '.'), "ABC..");
        assert_eq!(expand("ABC", &[], '-'), "ABC");
    }

    #[test]
    fn display_uses_one_based_positions() {
        let set = GapSet::new(
            vec![Gap { pos: 161, len: 2 }],
            vec![Gap { pos: 9, len: 1 }, Gap { pos: 20, len: 3 }],
        )
        .unwrap();
        assert_eq!(set.to_string(), "DEL[1](162:2) INS[2](10:1 21:3)");
        assert_eq!(GapSet::default().to_string(), "");
    }
}
