use super::patterns::AnchorTable;
use crate::hagap::subtype::same_group;

/// Where the mature protein starts and which subtype the match implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Index of the first mature residue; negative when the translation
    /// starts inside the mature protein.
    pub shift: i32,
    pub subtype: String,
}

/// Returns the position of the first motif, in priority order, that occurs
/// within the first `limit` residues of `aa`.
pub fn find_in_prefix(aa: &[u8], limit: usize, motifs: &[&str]) -> Option<usize> {
    let prefix = &aa[..limit.min(aa.len())];
    motifs.iter().find_map(|motif| {
        let motif = motif.as_bytes();
        if motif.is_empty() || motif.len() > prefix.len() {
            return None;
        }
        prefix.windows(motif.len()).position(|w| w == motif)
    })
}

/// Runs the anchor rules in order and returns the first verified hit.
///
/// The subtype reported is the hint itself when it names the same broad
/// group as the matching rule, otherwise the bare subtype of the rule.
pub fn locate(aa: &str, hint: &str, table: &AnchorTable) -> Option<Anchor> {
    let bytes = aa.as_bytes();
    for pattern in table.patterns() {
        let Some(pos) = find_in_prefix(bytes, pattern.max_offset, pattern.motifs) else {
            continue;
        };
        if !pattern.check.holds(bytes, pos) {
            continue;
        }
        let shift = pos as i32 + pattern.shift;
        if shift >= bytes.len() as i32 {
            log::trace!(
                "Anchor for {} at {} lies beyond sequence end ({})",
                pattern.subtype,
                shift,
                bytes.len()
            );
            continue;
        }
        let subtype = if same_group(hint, pattern.subtype) {
            hint.trim().to_string()
        } else {
            pattern.subtype.to_string()
        };
        return Some(Anchor { shift, subtype });
    }
    None
}
