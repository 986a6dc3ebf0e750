//! Defines the `TsvWriter` struct for reporting annotated sequences as tab-separated rows.
//!

use crate::hagap::gaps::format_runs;
use crate::hagap::sequence::AnchorMethod;
use crate::hagap::Sequence;
use crate::utils::Result;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

const COLUMNS: [&str; 9] = [
    "id",
    "hint",
    "subtype",
    "shift",
    "method",
    "deletions",
    "insertions",
    "issues",
    "aligned",
];

const MISSING: &str = ".";

/// Writes one row per sequence after a header naming the program version and command line.
pub struct TsvWriter {
    writer: BufWriter<Box<dyn Write>>,
}

impl TsvWriter {
    /// Creates the report file at `output_path` and writes its header.
    pub fn new(output_path: &str) -> Result<TsvWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;
        Self::from_writer(Box::new(file))
    }

    pub fn from_writer(inner: Box<dyn Write>) -> Result<TsvWriter> {
        let mut writer = BufWriter::new(inner);
        let command_line = env::args().collect::<Vec<_>>().join(" ");
        writeln!(
            writer,
            "##{}Version={}",
            env!("CARGO_PKG_NAME"),
            *crate::cli::FULL_VERSION
        )
        .and_then(|_| writeln!(writer, "##{}Command={}", env!("CARGO_PKG_NAME"), command_line))
        .and_then(|_| writeln!(writer, "#{}", COLUMNS.join("\t")))
        .map_err(|e| e.to_string())?;
        Ok(TsvWriter { writer })
    }

    pub fn write(&mut self, seq: &Sequence) -> Result<()> {
        let or_missing = |s: String| if s.is_empty() { MISSING.to_string() } else { s };
        let method = match seq.method() {
            Some(AnchorMethod::Motif) => "motif",
            Some(AnchorMethod::ColumnTable) => "column-table",
            None => MISSING,
        };
        let fields = [
            seq.id.clone(),
            or_missing(seq.hint.clone()),
            or_missing(seq.subtype().unwrap_or_default().to_string()),
            seq.shift().map_or(MISSING.to_string(), |s| s.to_string()),
            method.to_string(),
            or_missing(format_runs(seq.gaps().deletions())),
            or_missing(format_runs(seq.gaps().insertions())),
            or_missing(seq.issues().to_string()),
            or_missing(seq.format_aligned().unwrap_or_default()),
        ];
        writeln!(self.writer, "{}", fields.join("\t")).map_err(|e| e.to_string())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| e.to_string())
    }
}
