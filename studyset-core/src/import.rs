//! Bulk import: one candidate card per line of pasted text.

/// Tried in order; the first delimiter present in a line wins, so a line
/// holding both `|` and `;` always splits on `|`.
pub const DELIMITERS: [&str; 6] = ["|", "\t", " - ", " – ", "::", ";"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedCard {
    pub term: String,
    pub definition: String,
    pub image_url: String,
}

/// Parses a single line into a card record. Blank lines and lines with
/// fewer than two non-empty segments yield `None`; they are skipped, not
/// errors. Segments past the third are discarded.
pub fn parse_line(line: &str) -> Option<ImportedCard> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parts: Vec<&str> = vec![trimmed];
    for delimiter in DELIMITERS {
        if trimmed.contains(delimiter) {
            parts = trimmed
                .split(delimiter)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            break;
        }
    }

    if parts.len() < 2 {
        return None;
    }

    Some(ImportedCard {
        term: parts[0].to_string(),
        definition: parts[1].to_string(),
        image_url: parts.get(2).copied().unwrap_or_default().to_string(),
    })
}

/// Lazy pass over the pasted block; unparseable lines drop out silently.
pub fn parse_lines(text: &str) -> impl Iterator<Item = ImportedCard> + '_ {
    text.lines().filter_map(parse_line)
}
