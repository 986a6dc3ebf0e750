use std::collections::BTreeMap;

use crate::hagap::subtype::h_or_b;
use crate::hagap::{Result, ScanError, Sequence};

/// B/BRISBANE/60/2008 (Victoria lineage), mature protein.
pub const CURATED_B: &str = concat!(
    "DRICTGITSSNSPHVVKTATQGEVNVTGVIPLTTTPTKSHFANLKGTETRGKLCPKCLNCTDLDVALGRPKCTGKIPSAR",
    "VSILHEVRPVTSGCFPIMHDRTKIRQLPNLLRGYEHIRLSTHNVINAENAPGGPYKIGTSGSCPNITNGNGFFATMAWAV",
    "PKNDKNKTATNPLTIEVPYICTEGEDQITVWGFHSDNETQMAKLYGDSKPQKFTSSANGVTTHYVSQIGGFPNQTEDGGL",
    "PQSGRIVVDYMVQKSGKTGTITYQRGILLPQKVWCASGRSKVIKGSLPLIGEADCLHEKYGGLNKSKPYYTGEHAKAIGN",
    "CPIWVKTPLKLANGTKYRPPAKLLKERGFFGAIAGFLEGGWEGMIAGWHGYTSHGAHGVAVAADLKSTQEAINKITKNLN",
    "SLSELEVKNLQRLSGAMDELHNEILELDEKVDDLRADTISSQIELAVLLSNEGIINSEDEHLLALERKLKKMLGPSAVEI",
    "GNGCFETKHKCNQTCLDRIAAGTFDAGEFSLPTFDSLNITAASLNDDGLDNHTILLYYSTAASSLAVTLMIAIFVVYMVS",
    "RDNVSCSICL",
);

/// A(H1N1)/CALIFORNIA/7/2009, mature protein.
pub const CURATED_H1: &str = concat!(
    "DTLCIGYHANNSTDTVDTVLEKNVTVTHSVNLLEDKHNGKLCKLRGVAPLHLGKCNIAGWILGNPECESLSTASSWSYIV",
    "ETPSSDNGTCYPGDFIDYEELREQLSSVSSFERFEIFPKTSSWPNHDSNKGVTAACPHAGAKSFYKNLIWLVKKGNSYPK",
    "LSKSYINDKGKEVLVLWGIHHPSTSADQQSLYQNADAYVFVGSSRYSKKFKPEIAIRPKVRDQEGRMNYYWTLVEPGDKI",
    "TFEATGNLVVPRYAFAMERNAGSGIIISDTPVHDCNTTCQTPKGAINTSLPFQNIHPITIGKCPKYVKSTKLRLATGLRN",
    "IPSIQSRGLFGAIAGFIEGGWTGMVDGWYGYHHQNEQGSGYAADLKSTQNAIDEITNKVNSVIEKMNTQFTAVGKEFNHL",
    "EKRIENLNKKVDDGFLDIWTYNAELLVLLENERTLDYHDSNVKNLYEKVRSQLKNNAKEIGNGCFEFYHKCDNTCMESVK",
    "NGTYDYPKYSEEAKLNREEIDGVKLESTRIYQILAIYSTVASSLVLVVSLGAISFWMCSNGSLQCRICI",
);

/// A(H3N2)/HONG_KONG/1/1968, mature protein.
pub const CURATED_H3: &str = concat!(
    "QDLPGNDNSTATLCLGHHAVPNGTLVKTITDDQIEVTNATELVQSSSTGKICNNPHRILDGIDCTLIDALLGDPHCDVFQ",
    "NETWDLFVERSKAFSNCYPYDVPDYASLRSLVASSGTLEFITEGFTWTGVTQNGGSNACKRGPGSGFFSRLNWLTKSGST",
    "YPVLNVTMPNNDNFDKLYIWGVHHPSTNQEQTSLYVQASGRVTVSTRRSQQTIIPNIGSRPWVRGLSSRISIYWTIVKPG",
    "DVLVINSNGNLIAPRGYFKMRTGKSSIMRSDAPIDTCISECITPNGSIPNDKPFQNVNKITYGACPKYVKQNTLKLATGM",
    "RNVPEKQTRGLFGAIAGFIENGWEGMIDGWYGFRHQNSEGTGQAADLKSTQAAIDQINGKLNRVIEKTNEKFHQIEKEFS",
    "EVEGRIQDLEKYVEDTKIDLWSYNAELLVALENQHTIDLTDSEMNKLFEKTRRQLRENAEDMGNGCFKIYHKCDNACIES",
    "IRNGTYDHDVYRDEALNNRFQIKGVELKSGYKDWILWISFAISCFLLCVVLLGFIMWACQRGNIRCNICI",
);

const CURATED: [(&str, &str, &str); 3] = [
    ("B", "B/BRISBANE/60/2008", CURATED_B),
    ("H1", "A(H1N1)/CALIFORNIA/7/2009", CURATED_H1),
    ("H3", "A(H3N2)/HONG_KONG/1/1968", CURATED_H3),
];

/// Where a group's master lives: a curated constant or a member of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterRef {
    Curated(usize),
    Corpus(usize),
}

/// Gap-free reference per broad subtype group for one batch.
#[derive(Debug, Clone, Default)]
pub struct MasterSet {
    masters: BTreeMap<String, MasterRef>,
}

impl MasterSet {
    /// Picks a master for every group present among the aligned sequences
    /// of `corpus`. Groups for which no sequence qualifies are reported
    /// and left without a master.
    pub fn select(corpus: &[Sequence], use_curated: bool) -> (Self, Vec<ScanError>) {
        let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, seq) in corpus.iter().enumerate() {
            if !seq.is_aligned() {
                continue;
            }
            if let Some(group) = seq.subtype().and_then(h_or_b) {
                members.entry(group).or_default().push(idx);
            }
        }

        let mut set = MasterSet::default();
        let mut errors = Vec::new();
        for (group, indices) in members {
            let curated_idx = CURATED.iter().position(|(g, _, _)| *g == group);
            let master = match curated_idx {
                Some(idx) if use_curated => Ok(MasterRef::Curated(idx)),
                _ => select_from_corpus(group, corpus, &indices).map(MasterRef::Corpus),
            };
            match master {
                Ok(master) => {
                    log::debug!(
                        "Master for {}: {} ({} aa)",
                        group,
                        set_name(master, corpus),
                        set_aa(master, corpus).len()
                    );
                    set.masters.insert(group.to_string(), master);
                }
                Err(err) => errors.push(err),
            }
        }
        (set, errors)
    }

    pub fn get(&self, group: &str) -> Option<MasterRef> {
        self.masters.get(group).copied()
    }

    /// Aligned residues of the master of `group`.
    pub fn aa<'a>(&self, group: &str, corpus: &'a [Sequence]) -> Option<&'a str> {
        self.get(group).map(|m| set_aa(m, corpus))
    }

    pub fn name<'a>(&self, group: &str, corpus: &'a [Sequence]) -> Option<&'a str> {
        self.get(group).map(|m| set_name(m, corpus))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, MasterRef)> + '_ {
        self.masters.iter().map(|(g, &m)| (g.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.masters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }
}

fn set_aa(master: MasterRef, corpus: &[Sequence]) -> &str {
    match master {
        MasterRef::Curated(idx) => CURATED[idx].2,
        MasterRef::Corpus(idx) => corpus[idx].aligned().unwrap_or_default(),
    }
}

fn set_name(master: MasterRef, corpus: &[Sequence]) -> &str {
    match master {
        MasterRef::Curated(idx) => CURATED[idx].1,
        MasterRef::Corpus(idx) => &corpus[idx].id,
    }
}

/// Chooses the master of `group` among `members` (indices into `corpus`).
///
/// The master length is the largest aligned length shared by more than a
/// sixth of the group; among sequences of that length the first one with
/// the fewest unknown residues wins.
pub fn select_from_corpus(group: &str, corpus: &[Sequence], members: &[usize]) -> Result<usize> {
    let mut lengths: BTreeMap<usize, usize> = BTreeMap::new();
    for &idx in members {
        if let Some(len) = corpus[idx].aligned_len() {
            *lengths.entry(len).or_default() += 1;
        }
    }
    let threshold = members.len() / 6;
    let master_len = lengths
        .iter()
        .filter(|&(_, &count)| count > threshold)
        .map(|(&len, _)| len)
        .last();

    let mut best: Option<(usize, usize)> = None;
    if let Some(master_len) = master_len {
        for &idx in members {
            let seq = &corpus[idx];
            if seq.aligned_len() != Some(master_len) {
                continue;
            }
            let unknown = seq.unknown_count();
            if best.map_or(true, |(_, fewest)| unknown < fewest) {
                best = Some((idx, unknown));
            }
            if unknown == 0 {
                break;
            }
        }
    }
    best.map(|(idx, _)| idx)
        .ok_or_else(|| ScanError::NoMasterForGroup {
            group: group.to_string(),
        })
}
