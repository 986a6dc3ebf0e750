use crate::hagap::aa_at_pos::AaAtPos;
use crate::hagap::gaps::GapParams;
use crate::hagap::workflows::ScanParams;
use crate::utils::Result;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="hagap",
          author="hagap developers",
          version=&**FULL_VERSION,
          about="Influenza hemagglutinin anchoring and deletion/insertion detection",
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2019-{}     hagap developers
This program comes with ABSOLUTELY NO WARRANTY.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Anchor sequences and detect deletions/insertions")]
    Scan(ScanArgs),
    #[clap(about = "Detect deletions/insertions between two anchored sequences")]
    Gaps(GapsArgs),
}

/// Detector tunables shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct GapOptions {
    #[clap(help_heading("Advanced"))]
    #[clap(long = "common-threshold")]
    #[clap(value_name = "COUNT")]
    #[clap(help = "Shared residues after which a chunk is considered common")]
    #[clap(default_value = "3")]
    #[arg(value_parser = positive_count)]
    pub common_threshold: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-gap")]
    #[clap(value_name = "LENGTH")]
    #[clap(help = "Largest deletion or insertion tried at a break point (exclusive)")]
    #[clap(default_value = "200")]
    #[arg(value_parser = positive_count)]
    pub max_gap: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "head-divisor")]
    #[clap(value_name = "DIVISOR")]
    #[clap(help = "Reject a matched head unless shared residues times DIVISOR exceed its length")]
    #[clap(default_value = "3")]
    #[arg(value_parser = positive_count)]
    pub head_divisor: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "verify-fraction")]
    #[clap(value_name = "FRACTION")]
    #[clap(help = "Minimum fraction of shared residues for a detection to be verified")]
    #[clap(default_value = "0.6")]
    #[arg(value_parser = ensure_unit_float)]
    pub verify_fraction: f64,
}

impl GapOptions {
    pub fn params(&self) -> GapParams {
        GapParams {
            common_threshold: self.common_threshold,
            max_gap: self.max_gap,
            head_divisor: self.head_divisor,
            verify_fraction: self.verify_fraction,
        }
    }
}

/// Residue predicates that must all hold for a sequence to be reported.
#[derive(Debug, Clone)]
pub struct AaFilter(pub Vec<AaAtPos>);

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("scan")))]
#[command(arg_required_else_help(true))]
pub struct ScanArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(help = "Tab-separated sequences: id, subtype hint, sequence (optionally gzipped)")]
    #[clap(value_name = "TSV")]
    #[arg(value_parser = check_file_exists)]
    pub input_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(long = "filter")]
    #[clap(value_name = "AA_AT_POS")]
    #[clap(help = "Only report sequences matching every predicate, e.g. 160K,!193F")]
    #[arg(value_parser = aa_at_pos_list)]
    pub filter: Option<AaFilter>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "no-curated-masters")]
    #[clap(help = "Select masters for B, H1 and H3 from the input instead of curated references")]
    pub no_curated_masters: bool,

    #[command(flatten)]
    pub gap_options: GapOptions,
}

impl ScanArgs {
    pub fn params(&self) -> ScanParams {
        ScanParams {
            gap: self.gap_options.params(),
            use_curated_masters: !self.no_curated_masters,
        }
    }
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("gaps")))]
#[command(arg_required_else_help(true))]
pub struct GapsArgs {
    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "master")]
    #[clap(help = "Gap-free master amino acids starting at the mature protein")]
    #[clap(value_name = "AA")]
    #[arg(value_parser = check_amino_acids)]
    pub master: String,

    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "target")]
    #[clap(help = "Target amino acids starting at the mature protein")]
    #[clap(value_name = "AA")]
    #[arg(value_parser = check_amino_acids)]
    pub target: String,

    #[command(flatten)]
    pub gap_options: GapOptions,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn positive_count(s: &str) -> Result<usize> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if value >= 1 {
        Ok(value)
    } else {
        Err("Value must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn check_amino_acids(s: &str) -> Result<String> {
    let aa = s.trim().to_ascii_uppercase();
    if aa.is_empty() {
        return Err("Sequence cannot be empty".to_string());
    }
    if let Some(c) = aa.chars().find(|c| !(c.is_ascii_alphabetic() || *c == '-')) {
        return Err(format!("Unexpected symbol '{}' in amino-acid sequence", c));
    }
    Ok(aa)
}

fn aa_at_pos_list(s: &str) -> Result<AaFilter> {
    let predicates = AaAtPos::parse_list(s).map_err(|e| e.to_string())?;
    if predicates.is_empty() {
        return Err("Filter must contain at least one predicate".to_string());
    }
    Ok(AaFilter(predicates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["hagap", "scan", "-i", "Cargo.toml", "-o", "out"]).unwrap();
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.num_threads, 1);
        assert!(args.filter.is_none());
        let params = args.params();
        assert!(params.use_curated_masters);
        assert_eq!(params.gap, GapParams::default());
    }

    #[test]
    fn scan_advanced_options() {
        let cli = Cli::try_parse_from([
            "hagap",
            "-vv",
            "scan",
            "-i",
            "Cargo.toml",
            "-o",
            "out",
            "--filter",
            "160K,!193F",
            "--max-gap",
            "50",
            "--verify-fraction",
            "0.8",
            "--no-curated-masters",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.filter.as_ref().map(|f| f.0.len()), Some(2));
        let params = args.params();
        assert!(!params.use_curated_masters);
        assert_eq!(params.gap.max_gap, 50);
        assert_eq!(params.gap.verify_fraction, 0.8);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Cli::try_parse_from(["hagap", "scan", "-i", "missing.tsv", "-o", "out"]).is_err());
        assert!(Cli::try_parse_from([
            "hagap", "gaps", "-m", "QDLPG", "-s", "QDLPG", "--verify-fraction", "1.5"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["hagap", "gaps", "-m", "QD1", "-s", "QD"]).is_err());
        assert_eq!(check_amino_acids(" qd-x ").unwrap(), "QD-X");
        assert!(threads_in_range("0").is_err());
        assert!(positive_count("0").is_err());
        assert!(aa_at_pos_list("160").is_err());
    }
}
