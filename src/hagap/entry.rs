use crate::hagap::translate::prepare;
use crate::hagap::Sequence;
use crate::utils::Result;
use std::io::{BufRead, BufReader, Read as ioRead};

/// Parses one `id<TAB>hint<TAB>sequence` line into a translated sequence.
pub fn parse_entry(line: &str) -> Result<Sequence> {
    const EXPECTED_FIELD_COUNT: usize = 3;
    let split_line: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    let [id, hint, raw] = split_line[..] else {
        return Err(format!(
            "Expected {} tab-separated fields in the format 'id hint sequence', found {}: {}",
            EXPECTED_FIELD_COUNT,
            split_line.len(),
            line
        ));
    };
    let (id, hint, raw) = (id.trim(), hint.trim(), raw.trim());
    if id.is_empty() {
        return Err("Sequence id is empty".to_string());
    }
    if raw.is_empty() {
        return Err(format!("Sequence {} is empty", id));
    }

    let translated = prepare(raw);
    if translated.aa.is_empty() {
        log::debug!("{}: not translated", id);
    }
    Ok(Sequence::new(id, hint, translated.aa).with_translation_offset(translated.offset))
}

/// Streams entries, skipping blank lines and `#` comments.
pub fn get_entries(
    reader: BufReader<Box<dyn ioRead>>,
) -> impl Iterator<Item = Result<Sequence>> {
    reader
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            line.as_ref()
                .map_or(true, |l| !l.trim().is_empty() && !l.starts_with('#'))
        })
        .map(|(line_number, result_line)| {
            result_line
                .map_err(|e| format!("Error at input line {}: {}", line_number + 1, e))
                .and_then(|line| {
                    parse_entry(&line)
                        .map_err(|e| format!("Error at input line {}: {}", line_number + 1, e))
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> BufReader<Box<dyn ioRead>> {
        BufReader::new(Box::new(Cursor::new(text.to_string().into_bytes())))
    }

    #[test]
    fn parses_amino_acid_entry() {
        let seq = parse_entry("s1\tA(H3N2)\tmktiiqdlpg").unwrap();
        assert_eq!(seq.id, "s1");
        assert_eq!(seq.hint, "A(H3N2)");
        assert_eq!(seq.aa(), "MKTIIQDLPG");
        assert!(!seq.is_aligned());
    }

    #[test]
    fn hint_may_be_empty() {
        let seq = parse_entry("s1\t\tQDLPG").unwrap();
        assert_eq!(seq.hint, "");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_entry("s1\tQDLPG").is_err());
        assert!(parse_entry("\tB\tQDLPG").is_err());
        assert!(parse_entry("s1\tB\t").is_err());
    }

    #[test]
    fn stream_skips_comments_and_reports_line_numbers() {
        let entries: Vec<_> =
            get_entries(reader("# header\ns1\tB\tDRICT\n\ns2\tB\n")).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].as_ref().unwrap().id, "s1");
        let err = entries[1].as_ref().unwrap_err();
        assert!(err.starts_with("Error at input line 4:"), "{}", err);
    }
}
