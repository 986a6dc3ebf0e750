use crate::hagap::{Residue, Result, ScanError, Sequence};
use std::str::FromStr;

/// Residue predicate at a 1-based canonical position, e.g. "160K" or "!193F".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AaAtPos {
    pub pos1: usize,
    pub aa: char,
    /// `false` for the negated form.
    pub equal: bool,
}

impl AaAtPos {
    pub fn matches(&self, seq: &Sequence) -> bool {
        let found = match seq.residue_at(self.pos1) {
            Residue::Aa(aa) => Some(aa),
            Residue::Deleted => Some('-'),
            Residue::OutOfRange => None,
        };
        match found {
            Some(aa) => (aa == self.aa) == self.equal,
            None => false,
        }
    }

    /// Parses a comma separated list of predicates.
    pub fn parse_list(encoding: &str) -> Result<Vec<Self>> {
        encoding
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for AaAtPos {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let error = || {
            ScanError::InvalidInput(format!(
                "invalid aa-at-pos: \"{}\" (expected 183P or !183P)",
                s
            ))
        };
        let (equal, rest) = match s.strip_prefix('!') {
            Some(rest) => (false, rest),
            None => (true, s),
        };
        let aa = rest.chars().last().ok_or_else(error)?;
        if !(aa.is_ascii_alphabetic() || aa == '-') {
            return Err(error());
        }
        let digits = &rest[..rest.len() - 1];
        if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
            return Err(error());
        }
        let pos1: usize = digits.parse().map_err(|_| error())?;
        if pos1 == 0 {
            return Err(error());
        }
        Ok(Self {
            pos1,
            aa: aa.to_ascii_uppercase(),
            equal,
        })
    }
}
