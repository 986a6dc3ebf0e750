//! Subtype-specific motif rules placing the start of the mature hemagglutinin.
//!
//! Stage one recognises signal peptides near the start of the translation
//! (plus influenza B motifs, which are checked early because they are
//! unambiguous), stage two a few mid-sequence motifs, and stage three long
//! motifs specific to one subtype anywhere within a bound.

/// Verification applied at fixed offsets from a motif hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Always,
    ResidueAt(usize, u8),
    NotResidueAt(usize, u8),
    InfixAt(usize, &'static str),
    Any(&'static [Check]),
    All(&'static [Check]),
}

impl Check {
    /// Evaluates the check for a motif found at `pos` of `aa`.
    ///
    /// Offsets past the end of the sequence never verify.
    pub fn holds(&self, aa: &[u8], pos: usize) -> bool {
        match *self {
            Check::Always => true,
            Check::ResidueAt(offset, residue) => aa.get(pos + offset) == Some(&residue),
            Check::NotResidueAt(offset, residue) => {
                matches!(aa.get(pos + offset), Some(&c) if c != residue)
            }
            Check::InfixAt(offset, infix) => aa
                .get(pos + offset..pos + offset + infix.len())
                .is_some_and(|s| s == infix.as_bytes()),
            Check::Any(checks) => checks.iter().any(|c| c.holds(aa, pos)),
            Check::All(checks) => checks.iter().all(|c| c.holds(aa, pos)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    SignalPeptide = 1,
    MidSequence = 2,
    Specific = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPattern {
    pub stage: Stage,
    /// Bare subtype reported on a match, e.g. "A(H3)".
    pub subtype: &'static str,
    /// Alternatives tried in order; the first one present is used.
    pub motifs: &'static [&'static str],
    /// Size of the prefix searched for the motif.
    pub max_offset: usize,
    /// Shift relative to the motif position.
    pub shift: i32,
    pub check: Check,
}

const fn rule(
    stage: Stage,
    subtype: &'static str,
    motifs: &'static [&'static str],
    max_offset: usize,
    shift: i32,
    check: Check,
) -> AnchorPattern {
    AnchorPattern {
        stage,
        subtype,
        motifs,
        max_offset,
        shift,
        check,
    }
}

use Check::{All, Always, Any, InfixAt, NotResidueAt, ResidueAt};
use Stage::{MidSequence, SignalPeptide, Specific};

#[rustfmt::skip]
const PATTERNS: &[AnchorPattern] = &[
    // signal peptides
    rule(SignalPeptide, "A(H3)", &["MKTII"], 20, 16, Any(&[ResidueAt(16, b'Q'), ResidueAt(15, b'A')])),
    rule(SignalPeptide, "A(H1)", &["MKV", "MKA", "MEA", "MEV"], 20, 17, Any(&[InfixAt(17, "DTLC"), InfixAt(17, "DTIC")])),
    // B motifs absent from every A subtype
    rule(SignalPeptide, "B", &["CTDL"], 100, -59, Always),
    rule(SignalPeptide, "B", &["NSPHVV"], 100, -10, Always),
    rule(SignalPeptide, "B", &["EHIRL"], 150, -114, Always),
    rule(SignalPeptide, "B", &["CPNATS"], 250, -142, Always),
    rule(SignalPeptide, "B", &["PNATSK"], 250, -143, Always),
    rule(SignalPeptide, "B", &["NVTNG"], 150, -144, Always),
    rule(SignalPeptide, "A(H2)", &["MTIT", "MAII"], 20, 15, InfixAt(14, "GDQIC")),
    rule(SignalPeptide, "A(H4)", &["MLS"], 20, 16, Any(&[ResidueAt(16, b'Q'), InfixAt(16, "SQNY")])),
    rule(SignalPeptide, "A(H5)", &["MEKIV", "MERIV"], 20, 16, Always),
    rule(SignalPeptide, "A(H6)", &["MIAIIV", "MIAIII"], 20, 16, Always),
    // SDKIC belongs to H15
    rule(SignalPeptide, "A(H7)", &["MNIQ", "MNNQ", "MNTQ"], 20, 18, All(&[NotResidueAt(17, b'S'), InfixAt(18, "DKIC")])),
    rule(SignalPeptide, "A(H8)", &["MEKFIA"], 20, 17, ResidueAt(17, b'D')),
    rule(SignalPeptide, "A(H9)", &["METIS", "MEIIS", "MEV"], 20, 18, InfixAt(17, "ADKIC")),
    rule(SignalPeptide, "A(H10)", &["MYK"], 20, 17, Always),
    rule(SignalPeptide, "A(H11)", &["MK"], 20, 16, InfixAt(16, "DEIC")),
    rule(SignalPeptide, "A(H12)", &["MEK"], 20, 17, InfixAt(15, "AYDKIC")),
    rule(SignalPeptide, "A(H13)", &["MDI", "MAL", "MEV"], 20, 18, InfixAt(17, "ADRIC")),
    rule(SignalPeptide, "A(H14)", &["MIA"], 20, 17, InfixAt(14, "AYSQITN")),
    rule(SignalPeptide, "A(H16)", &["MMVK", "MMIK"], 20, 19, InfixAt(19, "DKIC")),
    rule(SignalPeptide, "A(H17)", &["MEL"], 20, 18, InfixAt(17, "GDRICI")),

    rule(MidSequence, "A(H4)", &["QNYT"], 100, 0, InfixAt(11, "GHHA")),
    rule(MidSequence, "A(H11)", &["DEICIGYL"], 50, 0, Always),
    rule(MidSequence, "A(H15)", &["KSDKICLGHHA"], 100, 2, Always),

    rule(Specific, "A(H3)", &["CTLID", "CTLMDALL", "CTLVD"], 150, -63, Always),
    rule(Specific, "A(H3)", &["PNGTIVKTI"], 100, -20, Always),
    rule(Specific, "A(H3)", &["DKLYIWG"], 200, -174, Always),
    rule(Specific, "A(H3)", &["SNCYPYDV"], 150, -94, Always),
    rule(Specific, "A(H1)", &["VLEKN"], 50, -18, Always),
    rule(Specific, "A(H1)", &["SSWSYI", "ESWSYI"], 150, -73, Always),
    rule(Specific, "A(H1)", &["FERFEI"], 150, -110, Always),
    rule(Specific, "A(H1)", &["IWLVKKG"], 200, -148, Always),
    rule(Specific, "A(H1)", &["SSVSSF"], 200, -105, Always),
    rule(Specific, "A(H5)", &["GVKPLIL", "GVRPLIL"], 100, -45, Always),
    rule(Specific, "A(H5)", &["GWLLGNPMCDE"], 100, -58, Always),
    rule(Specific, "A(H5)", &["NHFE"], 150, -108, Always),
    rule(Specific, "A(H6)", &["QKEER"], 100, -35, Always),
    rule(Specific, "A(H6)", &["EELKA"], 150, -98, Always),
    rule(Specific, "A(H7)", &["GQCGL"], 100, -51, Always),
    rule(Specific, "A(H8)", &["FYRSINWL"], 200, -141, Always),
    rule(Specific, "A(H9)", &["QSTN"], 50, -7, Always),
    rule(Specific, "A(H9)", &["CDLLLGG", "CDLLLEG"], 150, -66, Always),
    rule(Specific, "A(H9)", &["LEELRS"], 150, -97, Always),
    rule(Specific, "A(H9)", &["SARSYQ"], 150, -106, Always),
    rule(Specific, "A(H9)", &["SSYQRIQ"], 150, -108, Always),
    rule(Specific, "A(H10)", &["NGTIVKTLTNE"], 50, -11, Always),
    rule(Specific, "A(H10)", &["QKIMESG"], 150, -99, Always),
    rule(Specific, "A(H11)", &["SSVEL"], 100, -27, Always),
    rule(Specific, "A(H13)", &["VGYLSTN"], 50, -4, Always),
    rule(Specific, "A(H16)", &["DTLTENGVP", "DTLIENGVP"], 70, -16, Always),
];

/// Immutable, stage-ordered list of anchor rules.
#[derive(Debug, Clone)]
pub struct AnchorTable {
    patterns: Vec<AnchorPattern>,
}

impl AnchorTable {
    /// The built-in rule set.
    pub fn compiled() -> Self {
        Self::new(PATTERNS.to_vec())
    }

    /// Rules are ordered by stage; the order within a stage is kept.
    pub fn new(mut patterns: Vec<AnchorPattern>) -> Self {
        patterns.sort_by_key(|p| p.stage);
        Self { patterns }
    }

    pub fn patterns(&self) -> &[AnchorPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
