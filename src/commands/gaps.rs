use crate::cli::GapsArgs;
use crate::hagap::gaps::{detect, expand, GapSet};
use crate::hagap::{ScanError, GAP};
use crate::utils::Result;

fn render(master: &str, target: &str, gaps: &GapSet, common: usize) -> String {
    let summary = if gaps.is_empty() {
        "no gaps".to_string()
    } else {
        gaps.to_string()
    };
    format!(
        "{}\ncommon: {}\nmaster: {}\ntarget: {}",
        summary,
        common,
        expand(master, gaps.insertions(), GAP as char),
        expand(target, gaps.deletions(), GAP as char)
    )
}

pub fn gaps(args: GapsArgs) -> Result<()> {
    let params = args.gap_options.params();
    match detect(&args.master, &args.target, &params) {
        Ok(detection) => {
            println!(
                "{}",
                render(&args.master, &args.target, &detection.gaps, detection.common)
            );
            Ok(())
        }
        Err(ScanError::GapDetectionNotVerified(nv)) => {
            println!("{}", render(&nv.master, &nv.target, &nv.partial, nv.common));
            Err(ScanError::GapDetectionNotVerified(nv).to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}
