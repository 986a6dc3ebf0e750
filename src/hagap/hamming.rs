/// Number of mismatching positions between `a` and `b`.
///
/// The longer tail counts as mismatching in full.
pub fn distance(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mismatches = a.iter().zip(b).filter(|(x, y)| x != y).count();
    mismatches + a.len().abs_diff(b.len())
}

/// Like [`distance`], but positions where either side holds `filler` are ignored,
/// and so are filler residues in the longer tail.
pub fn distance_ignoring(a: &str, b: &str, filler: u8) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mismatches = a
        .iter()
        .zip(b)
        .filter(|(&x, &y)| x != filler && y != filler && x != y)
        .count();
    let common_len = a.len().min(b.len());
    let tail = if a.len() > common_len {
        &a[common_len..]
    } else {
        &b[common_len..]
    };
    mismatches + tail.iter().filter(|&&c| c != filler).count()
}
