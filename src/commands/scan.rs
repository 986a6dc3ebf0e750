use crate::cli::{AaFilter, ScanArgs};
use crate::hagap::{
    anchor::AnchorTable,
    entry::get_entries,
    workflows::{self, run_batch},
    writers::TsvWriter,
    Sequence,
};
use crate::utils::{build_thread_pool, create_writer, open_input_reader, Result};

fn passes(filter: Option<&AaFilter>, seq: &Sequence) -> bool {
    filter.map_or(true, |f| f.0.iter().all(|p| p.matches(seq)))
}

pub fn scan(args: ScanArgs) -> Result<()> {
    let reader = open_input_reader(&args.input_path)?;
    let mut sequences = Vec::new();
    let mut error_count = 0;
    for result in get_entries(reader) {
        match result {
            Ok(seq) => sequences.push(seq),
            Err(e) => {
                log::error!("{}", e);
                error_count += 1;
            }
        }
    }
    if sequences.is_empty() {
        return Err(format!(
            "No sequences read from {}",
            args.input_path.display()
        ));
    }
    log::info!(
        "Read {} sequences, rejected {} lines",
        sequences.len(),
        error_count
    );

    let mut tsv_writer = create_writer(&args.output_prefix, "tsv", TsvWriter::new)?;

    let table = AnchorTable::compiled();
    let params: workflows::ScanParams = args.params();

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = build_thread_pool(args.num_threads)?;
    let (sequences, summary) = pool.install(|| run_batch(sequences, &table, &params));

    let mut reported = 0;
    for seq in sequences
        .iter()
        .filter(|s| passes(args.filter.as_ref(), s))
    {
        tsv_writer.write(seq)?;
        reported += 1;
    }
    tsv_writer.flush()?;

    log::info!("{}", summary);
    log::info!(
        "Reported {} of {} sequences to {}.tsv",
        reported,
        sequences.len(),
        args.output_prefix
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GapOptions;
    use crate::hagap::aa_at_pos::AaAtPos;
    use crate::hagap::master::CURATED_H3;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args(input_path: PathBuf, output_prefix: String, filter: Option<AaFilter>) -> ScanArgs {
        ScanArgs {
            input_path,
            output_prefix,
            num_threads: 2,
            filter,
            no_curated_masters: false,
            gap_options: GapOptions {
                common_threshold: 3,
                max_gap: 200,
                head_divisor: 3,
                verify_fraction: 0.6,
            },
        }
    }

    fn write_input(dir: &std::path::Path) -> PathBuf {
        let deleted = format!("{}{}", &CURATED_H3[..161], &CURATED_H3[163..]);
        let input = format!(
            "# id\thint\tsequence\ns1\tA(H3N2)\tMKTIIALSYILCLVFA{}\ns2\tA(H3N2)\tMKTIIALSYILCLVFA{}\nbroken line\n",
            CURATED_H3, deleted
        );
        let path = dir.join("input.tsv");
        std::fs::write(&path, input).unwrap();
        path
    }

    #[test]
    fn scan_writes_report() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path());
        let prefix = dir.path().join("out").to_str().unwrap().to_string();
        scan(args(input, prefix.clone(), None)).unwrap();

        let report = std::fs::read_to_string(format!("{}.tsv", prefix)).unwrap();
        let rows: Vec<Vec<&str>> = report
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(|l| l.split('\t').collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][..6], ["s1", "A(H3N2)", "A(H3N2)", "16", "motif", "."]);
        assert_eq!(rows[1][..6], ["s2", "A(H3N2)", "A(H3N2)", "16", "motif", "162:2"]);
        assert_eq!(rows[1][7], "too-short");
        assert_eq!(rows[1][8].len(), CURATED_H3.len());
    }

    #[test]
    fn filter_selects_rows() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path());
        let prefix = dir.path().join("filtered").to_str().unwrap().to_string();
        let filter = AaFilter(vec!["162-".parse::<AaAtPos>().unwrap()]);
        scan(args(input, prefix.clone(), Some(filter))).unwrap();

        let report = std::fs::read_to_string(format!("{}.tsv", prefix)).unwrap();
        let ids: Vec<&str> = report
            .lines()
            .filter(|l| !l.starts_with('#'))
            .filter_map(|l| l.split('\t').next())
            .collect();
        assert_eq!(ids, ["s2"]);
    }

    #[test]
    fn empty_input_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.tsv");
        std::fs::write(&input, "# nothing\n").unwrap();
        let prefix = dir.path().join("out").to_str().unwrap().to_string();
        assert!(scan(args(input, prefix, None)).is_err());
    }
}
