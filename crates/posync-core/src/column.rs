//! Column resolution
//!
//! Turns a column descriptor plus an entry into a cell value (push), and
//! recovers metadata from a static cell (pull).
//!
//! Static templates understand exactly three placeholders: `{file_name}`,
//! `{locale}` and `{timestamp}`. Any other `{...}` token is plain text.

use crate::catalog::Entry;
use crate::config::{ColumnDescriptor, ColumnSource};

pub const FILE_NAME_PLACEHOLDER: &str = "{file_name}";

/// Recognized template placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    FileName,
    Locale,
    Timestamp,
}

impl Placeholder {
    const ALL: [Placeholder; 3] = [
        Placeholder::FileName,
        Placeholder::Locale,
        Placeholder::Timestamp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Placeholder::FileName => "file_name",
            Placeholder::Locale => "locale",
            Placeholder::Timestamp => "timestamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Values substituted into static columns
///
/// `locale` and `timestamp` are fixed for a whole run; `file_name` changes
/// with the catalog a row comes from.
#[derive(Debug, Clone, Copy)]
pub struct Metadata<'a> {
    pub file_name: &'a str,
    pub locale: &'a str,
    pub timestamp: &'a str,
}

impl Metadata<'_> {
    fn value(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::FileName => self.file_name,
            Placeholder::Locale => self.locale,
            Placeholder::Timestamp => self.timestamp,
        }
    }
}

/// Cell value of `column` for `entry`
pub fn resolve(column: &ColumnDescriptor, entry: &Entry, metadata: &Metadata<'_>) -> String {
    match &column.source {
        ColumnSource::Fields(fields) => resolve_field(fields, entry)
            .map(|(_, value)| value.to_string())
            .unwrap_or_default(),
        ColumnSource::Static(template) => substitute(template, metadata),
    }
}

/// First field of `fields` present on `entry`, with its value
pub fn resolve_field<'e>(fields: &[String], entry: &'e Entry) -> Option<(&'e str, &'e str)> {
    fields.iter().find_map(|name| {
        entry
            .fields()
            .iter()
            .find(|f| f.name() == name)
            .map(|f| (f.name(), f.value()))
    })
}

/// Template piece
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'t> {
    Literal(&'t str),
    Placeholder(Placeholder),
}

/// Split a template into literals and recognized placeholders
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(offset) = template[pos..].find('{') {
        let open = pos + offset;
        let placeholder = template[open + 1..].find('}').and_then(|len| {
            Placeholder::from_name(&template[open + 1..open + 1 + len]).map(|p| (p, len))
        });
        match placeholder {
            Some((p, len)) => {
                if literal_start < open {
                    out.push(Segment::Literal(&template[literal_start..open]));
                }
                out.push(Segment::Placeholder(p));
                pos = open + len + 2;
                literal_start = pos;
            }
            None => pos = open + 1,
        }
    }
    if literal_start < template.len() {
        out.push(Segment::Literal(&template[literal_start..]));
    }
    out
}

/// Replace every recognized placeholder in `template`
pub fn substitute(template: &str, metadata: &Metadata<'_>) -> String {
    segments(template)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text,
            Segment::Placeholder(p) => metadata.value(p),
        })
        .collect()
}

/// Recover placeholder values from a cell produced by `template`
///
/// Literal text must match exactly, placeholders match any text, and a
/// placeholder used twice must capture the same text both times. Returns
/// `None` when the cell cannot have come from the template.
pub fn extract<'c>(template: &str, cell: &'c str) -> Option<Vec<(Placeholder, &'c str)>> {
    let segments = segments(template);
    let mut captures = Vec::new();
    match_segments(&segments, cell, &mut captures).then_some(captures)
}

/// File name encoded in a `{file_name}` column cell
pub fn extract_file_name(template: &str, cell: &str) -> Option<String> {
    extract(template, cell)?
        .into_iter()
        .find(|(p, _)| *p == Placeholder::FileName)
        .map(|(_, value)| value.to_string())
        .filter(|name| !name.is_empty())
}

fn match_segments<'c>(
    segments: &[Segment<'_>],
    cell: &'c str,
    captures: &mut Vec<(Placeholder, &'c str)>,
) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return cell.is_empty();
    };

    match first {
        Segment::Literal(text) => match cell.strip_prefix(text) {
            Some(remaining) => match_segments(rest, remaining, captures),
            None => false,
        },
        Segment::Placeholder(p) => {
            // Longest capture first
            let mut ends: Vec<usize> = cell.char_indices().map(|(i, _)| i).collect();
            ends.push(cell.len());
            for end in ends.into_iter().rev() {
                let value = &cell[..end];
                let conflicts = captures.iter().any(|(q, v)| q == p && *v != value);
                if conflicts {
                    continue;
                }
                captures.push((*p, value));
                if match_segments(rest, &cell[end..], captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}
