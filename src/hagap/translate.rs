//! Conversion of raw input sequences into amino acids.

use itertools::Itertools;

use crate::hagap::sequence::normalize_residues;
use crate::hagap::{GAP, UNKNOWN};

/// Translations shorter than this are discarded.
pub const MIN_TRANSLATED_LEN: usize = 200;

/// Standard genetic code indexed by T/U=0 C=1 A=2 G=3 for each codon base.
const GENETIC_CODE: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub aa: String,
    /// Nucleotide offset of the first amino acid; zero for amino-acid input.
    pub offset: usize,
}

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

fn translate_codon(codon: &[u8]) -> u8 {
    match codon {
        [a, b, c] => match (base_index(*a), base_index(*b), base_index(*c)) {
            (Some(a), Some(b), Some(c)) => GENETIC_CODE[a * 16 + b * 4 + c],
            // stops that survive one ambiguous purine
            _ if matches!(codon, b"TAR" | b"UAR" | b"TRA" | b"URA") => b'*',
            _ => UNKNOWN,
        },
        _ => UNKNOWN,
    }
}

/// Heuristic distinguishing nucleotide from amino-acid input by symbol frequency.
pub fn looks_like_nucleotides(seq: &str) -> bool {
    let counts = seq.bytes().counts();
    if counts.len() < 2 {
        return false;
    }
    let by_frequency: Vec<(u8, usize)> = counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
        .collect();
    let len = seq.len();
    if by_frequency[0].1 > len / 4 && by_frequency[1].1 > len / 5 {
        return true;
    }
    let most_frequent: Vec<u8> = by_frequency
        .iter()
        .take(5)
        .filter(|(_, count)| *count > 5)
        .map(|&(symbol, _)| symbol)
        .sorted()
        .collect();
    most_frequent.starts_with(b"ACGT")
        || most_frequent == b"ACGNT"
        || most_frequent == b"-ACGT"
}

/// Translates `nuc` starting at `frame`, ignoring stop codons.
pub fn translate_frame(nuc: &[u8], frame: usize) -> String {
    nuc.get(frame..)
        .unwrap_or_default()
        .chunks_exact(3)
        .map(|codon| translate_codon(codon) as char)
        .collect()
}

/// Longest stop-free stretch over the three reading frames.
pub fn translate(nuc: &str) -> Option<Translated> {
    let nuc = nuc.as_bytes();
    let mut best: Option<Translated> = None;
    for frame in 0..3 {
        let aa = translate_frame(nuc, frame);
        let mut start = 0;
        for part in aa.split('*') {
            if best.as_ref().map_or(true, |b| part.len() > b.aa.len()) {
                best = Some(Translated {
                    aa: part.to_string(),
                    offset: frame + start * 3,
                });
            }
            start += part.len() + 1;
        }
    }
    best.filter(|t| t.aa.len() >= MIN_TRANSLATED_LEN)
}

/// Removes leading and trailing unknown residues and gap fillers.
pub fn trim_absent(translated: Translated) -> Translated {
    let is_absent = |c: char| c == UNKNOWN as char || c == GAP as char;
    let Translated { aa, offset } = translated;
    let trimmed_end = aa.trim_end_matches(is_absent);
    if trimmed_end.is_empty() {
        return Translated { aa, offset };
    }
    let trimmed = trimmed_end.trim_start_matches(is_absent);
    let leading = trimmed_end.len() - trimmed.len();
    Translated {
        aa: trimmed.to_string(),
        offset: offset + leading * 3,
    }
}

/// Normalises a raw sequence to ASCII residues, translates nucleotides and
/// trims absent residues. Untranslatable nucleotides yield an empty sequence.
pub fn prepare(raw: &str) -> Translated {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let upper = normalize_residues(&compact);
    let translated = if looks_like_nucleotides(&upper) {
        translate(&upper).unwrap_or(Translated {
            aa: String::new(),
            offset: 0,
        })
    } else {
        Translated {
            aa: upper,
            offset: 0,
        }
    };
    if translated.aa.is_empty() {
        return translated;
    }
    trim_absent(translated)
}
