use super::GapSet;
use crate::hagap::error::NotVerified;
use crate::hagap::{Result, ScanError, GAP, UNKNOWN};

/// Tunables of the deletion/insertion detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapParams {
    /// Consecutive shared residues after which a chunk is considered common.
    pub common_threshold: usize,
    /// Largest deletion or insertion tried at a break point (exclusive).
    pub max_gap: usize,
    /// A head is rejected unless `common * head_divisor > head length`.
    pub head_divisor: usize,
    /// Minimal shared fraction of the shorter sequence's known residues.
    pub verify_fraction: f64,
}

impl Default for GapParams {
    fn default() -> Self {
        Self {
            common_threshold: 3,
            max_gap: 200,
            head_divisor: 3,
            verify_fraction: 0.6,
        }
    }
}

/// Matched prefix of two sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Head {
    /// End offset of the last qualifying common run.
    pub len: usize,
    /// Shared residues up to `len`.
    pub common: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapAtStart {
    /// The master has `len` extra residues before `head`.
    Deletion { len: usize, head: Head },
    /// The target has `len` extra residues before `head`.
    Insertion { len: usize, head: Head },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub gaps: GapSet,
    pub common: usize,
}

#[inline]
fn are_common(a: u8, b: u8) -> bool {
    a == b && a != UNKNOWN && a != GAP
}

/// Finds the end of the last run that holds at least `common_threshold` shared residues.
///
/// Unknown residues on either side extend a run without counting as shared.
/// Returns `None` when there is no such run or when shared residues make up
/// too small a part of the head.
pub fn find_common_head(s1: &[u8], s2: &[u8], params: &GapParams) -> Option<Head> {
    let mut in_run = false;
    let mut common = 0;
    let mut common_in_run = 0;
    let mut last_end = 0;
    let mut common_at_last_end: usize = 0;

    for (pos, (&a, &b)) in s1.iter().zip(s2).enumerate() {
        if a == b || a == UNKNOWN || b == UNKNOWN {
            if are_common(a, b) {
                common += 1;
                common_in_run += 1;
            }
            in_run = true;
        } else {
            if in_run && common_in_run >= params.common_threshold {
                last_end = pos;
                common_at_last_end = common;
            }
            in_run = false;
            common_in_run = 0;
        }
    }
    if in_run && common_in_run >= params.common_threshold {
        last_end = s1.len().min(s2.len());
        common_at_last_end = common;
    }

    if common_at_last_end.saturating_mul(params.head_divisor) > last_end {
        Some(Head {
            len: last_end,
            common: common_at_last_end,
        })
    } else {
        None
    }
}

/// Tries growing gap sizes at the start of both tails, deletion before insertion.
pub fn gap_at_start(master: &[u8], target: &[u8], params: &GapParams) -> Option<GapAtStart> {
    let accept = |head: Option<Head>| head.filter(|h| h.len > params.common_threshold);
    for len in 1..params.max_gap {
        if len < master.len() {
            if let Some(head) = accept(find_common_head(&master[len..], target, params)) {
                return Some(GapAtStart::Deletion { len, head });
            }
        }
        if len < target.len() {
            if let Some(head) = accept(find_common_head(master, &target[len..], params)) {
                return Some(GapAtStart::Insertion { len, head });
            }
        }
    }
    None
}

fn number_of_common(s1: &[u8], s2: &[u8]) -> usize {
    s1.iter().zip(s2).filter(|(&a, &b)| are_common(a, b)).count()
}

fn known_len(seq: &[u8]) -> usize {
    seq.iter().filter(|&&c| c != UNKNOWN).count()
}

/// Reconciles an anchored `target` against its gap-free `master`.
///
/// Both sequences start at the first residue of the mature protein.
pub fn detect(master: &str, target: &str, params: &GapParams) -> Result<Detection> {
    let (m, t) = (master.as_bytes(), target.as_bytes());
    let mut gaps = GapSet::default();

    let initial = find_common_head(m, t, params).unwrap_or_default();
    let mut master_offset = initial.len;
    let mut target_offset = initial.len;
    let mut common = initial.common;

    while master_offset < m.len() && target_offset < t.len() {
        let (master_tail, target_tail) = (&m[master_offset..], &t[target_offset..]);
        match gap_at_start(master_tail, target_tail, params) {
            None => {
                common += number_of_common(master_tail, target_tail);
                break;
            }
            Some(GapAtStart::Deletion { len, head }) => {
                gaps.push_deletion(target_offset, len);
                master_offset += len + head.len;
                target_offset += head.len;
                common += head.common;
            }
            Some(GapAtStart::Insertion { len, head }) => {
                gaps.push_insertion(master_offset, len);
                target_offset += len + head.len;
                master_offset += head.len;
                common += head.common;
            }
        }
    }

    let shorter = if m.len() < t.len() { m } else { t };
    let threshold = known_len(shorter) as f64 * params.verify_fraction;
    if (common as f64) < threshold {
        return Err(ScanError::GapDetectionNotVerified(Box::new(NotVerified {
            common,
            threshold,
            master: master.to_string(),
            target: target.to_string(),
            partial: gaps,
        })));
    }

    Ok(Detection { gaps, common })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hagap::gaps::{expand, Gap};
    use crate::hagap::master::CURATED_H3;

    fn params() -> GapParams {
        GapParams::default()
    }

    fn remove(seq: &str, pos: usize, len: usize) -> String {
        format!("{}{}", &seq[..pos], &seq[pos + len..])
    }

    #[test]
    fn head_covers_substitutions() {
        let head = find_common_head(b"QDLPGNDNST", b"QDLPANDNST", &params()).unwrap();
        assert_eq!(head, Head { len: 10, common: 9 });
    }

    #[test]
    fn unknown_residues_extend_runs() {
        let head = find_common_head(b"QDLXGNDN", b"QDLPGXDN", &params()).unwrap();
        assert_eq!(head, Head { len: 8, common: 6 });
    }

    #[test]
    fn head_without_enough_common_is_null() {
        assert_eq!(find_common_head(b"QDAXXX", b"QDLXXX", &params()), None);
        assert_eq!(find_common_head(b"ABCDEF", b"GHIKLM", &params()), None);
        assert_eq!(find_common_head(b"", b"QDL", &params()), None);
    }

    #[test]
    fn sparse_head_is_rejected() {
        // a single run of three shared residues after twelve unknown positions
        let head = find_common_head(b"XXXXXXXXXXXXQDL", b"XXXXXXXXXXXXQDL", &params());
        assert_eq!(head, None);
    }

    #[test]
    fn gap_at_start_prefers_deletion() {
        let master = b"KKQDLPGNDNST";
        let target = b"QDLPGNDNST";
        assert_eq!(
            gap_at_start(master, target, &params()),
            Some(GapAtStart::Deletion {
                len: 2,
                head: Head { len: 10, common: 10 }
            })
        );
        assert_eq!(
            gap_at_start(target, master, &params()),
            Some(GapAtStart::Insertion {
                len: 2,
                head: Head { len: 10, common: 10 }
            })
        );
    }

    #[test]
    fn gap_at_start_gives_up_on_unrelated_tails() {
        assert_eq!(gap_at_start(b"AAAAAAAA", b"CCCCCCCC", &params()), None);
    }

    #[test]
    fn single_substitution_gives_empty_gaps() {
        let mut target = CURATED_H3.as_bytes().to_vec();
        target[100] = if target[100] == b'W' { b'Y' } else { b'W' };
        let target = String::from_utf8(target).unwrap();
        let detection = detect(CURATED_H3, &target, &params()).unwrap();
        assert!(detection.gaps.is_empty());
        assert_eq!(detection.common, CURATED_H3.len() - 1);
    }

    #[test]
    fn two_residue_deletion_is_found() {
        let target = remove(CURATED_H3, 161, 2);
        let detection = detect(CURATED_H3, &target, &params()).unwrap();
        assert_eq!(detection.gaps.deletions(), &[Gap { pos: 161, len: 2 }]);
        assert!(detection.gaps.insertions().is_empty());
        assert_eq!(detection.common, CURATED_H3.len() - 2);
    }

    #[test]
    fn expanded_target_is_stable() {
        let target = remove(CURATED_H3, 161, 2);
        let detection = detect(CURATED_H3, &target, &params()).unwrap();
        let expanded = expand(&target, detection.gaps.deletions(), '-');
        assert_eq!(expanded.len(), CURATED_H3.len());
        let again = detect(CURATED_H3, &expanded, &params()).unwrap();
        assert!(again.gaps.is_empty());
    }

    #[test]
    fn several_deletions_in_target_frame() {
        let target = remove(&remove(CURATED_H3, 300, 1), 50, 3);
        let detection = detect(CURATED_H3, &target, &params()).unwrap();
        assert_eq!(
            detection.gaps.deletions(),
            &[Gap { pos: 50, len: 3 }, Gap { pos: 297, len: 1 }]
        );
    }

    #[test]
    fn insertion_in_master_frame() {
        let target = format!("{}KK{}", &CURATED_H3[..200], &CURATED_H3[200..]);
        let detection = detect(CURATED_H3, &target, &params()).unwrap();
        assert!(detection.gaps.deletions().is_empty());
        assert_eq!(detection.gaps.insertions(), &[Gap { pos: 200, len: 2 }]);
        assert_eq!(detection.common, CURATED_H3.len());
    }

    #[test]
    fn truncated_target_verifies_against_its_length() {
        let detection = detect(CURATED_H3, &CURATED_H3[..329], &params()).unwrap();
        assert!(detection.gaps.is_empty());
        assert_eq!(detection.common, 329);
    }

    #[test]
    fn unrelated_half_is_not_verified() {
        let unrelated = "ACDEFGHIKLMNPQRSTVWY".repeat(20);
        let target = format!("{}{}", &CURATED_H3[..150], &unrelated[..400]);
        match detect(CURATED_H3, &target, &params()) {
            Err(ScanError::GapDetectionNotVerified(nv)) => {
                assert!((nv.common as f64) < nv.threshold);
                assert_eq!(nv.master, CURATED_H3);
                assert_eq!(nv.target, target);
            }
            other => panic!("expected not verified, got {:?}", other),
        }
    }

    #[test]
    fn not_verified_keeps_gaps_found_so_far() {
        let unrelated = "ACDEFGHIKLMNPQRSTVWY".repeat(20);
        let target = format!("{}{}", &remove(CURATED_H3, 50, 3)[..147], &unrelated[..400]);
        match detect(CURATED_H3, &target, &params()) {
            Err(ScanError::GapDetectionNotVerified(nv)) => {
                assert_eq!(nv.partial.deletions(), &[Gap { pos: 50, len: 3 }]);
                assert!(nv.partial.insertions().is_empty());
            }
            other => panic!("expected not verified, got {:?}", other),
        }
    }

    #[test]
    fn huge_head_divisor_does_not_overflow() {
        let params = GapParams {
            head_divisor: usize::MAX,
            ..GapParams::default()
        };
        let head = find_common_head(b"QDLPGNDNST", b"QDLPGNDNST", &params);
        assert_eq!(head, Some(Head { len: 10, common: 10 }));
    }
}
