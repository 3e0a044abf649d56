//! Parsing of the `name, shape, mode...` classification record format.
//!
//! One record per line, comma-separated: an asset name, a shape token, and
//! one or more display mode tokens. Blank lines and malformed lines (too few
//! fields, unknown shape or mode tokens) are skipped with a warning; a bad
//! line never aborts the load.
use std::io::BufRead;

use tracing::warn;

use crate::catalog::{DisplayMode, Shape};
use crate::error::Result;

/// One parsed classification line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub name: String,
    pub shape: Shape,
    pub modes: DisplayMode,
}

/// Parse all well-formed records from `reader`, skipping the rest.
pub fn parse_records(reader: impl BufRead) -> Result<Vec<ClassificationRecord>> {
    let mut records = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(record) = parse_line(&line, line_number + 1) {
            records.push(record);
        }
    }
    Ok(records)
}

fn parse_line(line: &str, line_number: usize) -> Option<ClassificationRecord> {
    if line.trim().is_empty() {
        return None;
    }

    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
        warn!(line_number, "classification record has too few fields, skipping");
        return None;
    }

    let name = parts[0].trim();
    if name.is_empty() {
        warn!(line_number, "classification record has an empty name, skipping");
        return None;
    }

    let Some(shape) = Shape::from_token(parts[1]) else {
        warn!(
            line_number,
            token = parts[1].trim(),
            "unknown shape token, skipping record"
        );
        return None;
    };

    let mut modes = DisplayMode::empty();
    for part in &parts[2..] {
        let token = part.trim();
        if token.is_empty() {
            continue;
        }
        let Some(mode) = DisplayMode::from_token(token) else {
            warn!(line_number, token, "unknown mode token, skipping record");
            return None;
        };
        modes |= mode;
    }

    Some(ClassificationRecord {
        name: name.to_owned(),
        shape,
        modes,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_well_formed_lines() {
        let input = "\
Painting Wide, Landscape, Normal, Chaos
Rug Round, Square, RugsAndBanners
Banner Tall, Portrait, Normal, RugsAndBanners, Chaos
";
        let records = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Painting Wide");
        assert_eq!(records[0].shape, Shape::Landscape);
        assert_eq!(records[0].modes, DisplayMode::NORMAL | DisplayMode::CHAOS);
        assert_eq!(records[2].modes, DisplayMode::all());
    }

    #[test]
    fn skips_blank_and_short_lines() {
        let input = "\

Painting Wide, Landscape, Normal
just a name
name only, Landscape
";
        let records = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Painting Wide");
    }

    #[test]
    fn skips_lines_with_unknown_tokens() {
        let input = "\
Good, Square, Normal
Bad Shape, Blob, Normal
Bad Mode, Square, Party
";
        let records = parse_records(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Good");
    }

    #[test]
    fn empty_mode_tokens_are_ignored() {
        let records = parse_records(Cursor::new("Trailing, Portrait, Normal,,")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].modes, DisplayMode::NORMAL);
    }
}
