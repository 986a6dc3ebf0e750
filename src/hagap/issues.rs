use crate::hagap::gaps::{expand, GapSet};
use crate::hagap::hamming;
use crate::hagap::{Sequence, GAP, UNKNOWN};
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    NotAligned,
    TooShort,
    GarbageAtStart,
    GarbageAtEnd,
    NotVerified,
}

const ALL_ISSUES: [Issue; 5] = [
    Issue::NotAligned,
    Issue::TooShort,
    Issue::GarbageAtStart,
    Issue::GarbageAtEnd,
    Issue::NotVerified,
];

impl Issue {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Issue::NotAligned => "not-aligned",
            Issue::TooShort => "too-short",
            Issue::GarbageAtStart => "garbage-at-start",
            Issue::GarbageAtEnd => "garbage-at-end",
            Issue::NotVerified => "not-verified",
        }
    }
}

/// Advisory quality flags; never block processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceIssues(u8);

impl SequenceIssues {
    pub fn set(&mut self, issue: Issue) {
        self.0 |= issue.bit();
    }

    pub fn reset(&mut self, issue: Issue) {
        self.0 &= !issue.bit();
    }

    pub fn has(&self, issue: Issue) -> bool {
        self.0 & issue.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Issue> + '_ {
        ALL_ISSUES.into_iter().filter(|&i| self.has(i))
    }
}

impl fmt::Display for SequenceIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().map(Issue::name).join(","))
    }
}

const TAIL_SIZE: usize = 10;
const TAIL_MISMATCH_THRESHOLD: usize = 2;

/// Flags problems in `target` visible once its gaps against `master` are known.
pub fn assess_issues(master: &str, target: &Sequence) -> SequenceIssues {
    match target.aligned() {
        Some(aligned) => assess_aligned(master, aligned, target.gaps()),
        None => {
            let mut issues = SequenceIssues::default();
            issues.set(Issue::NotAligned);
            issues
        }
    }
}

/// Same as [`assess_issues`] for an aligned target given by parts.
pub fn assess_aligned(master: &str, aligned: &str, gaps: &GapSet) -> SequenceIssues {
    let mut issues = SequenceIssues::default();
    if let (Some(&m), Some(&t)) = (master.as_bytes().first(), aligned.as_bytes().first()) {
        if m != t && t != UNKNOWN {
            issues.set(Issue::GarbageAtStart);
        }
    }

    if master.len() > aligned.len() {
        issues.set(Issue::TooShort);
    } else {
        let expanded = expand(aligned, gaps.deletions(), GAP as char);
        let tail_start = master.len().saturating_sub(TAIL_SIZE);
        let target_tail = expanded.get(tail_start..).unwrap_or("");
        if hamming::distance(&master[tail_start..], target_tail) > TAIL_MISMATCH_THRESHOLD {
            issues.set(Issue::GarbageAtEnd);
        }
    }
    issues
}
