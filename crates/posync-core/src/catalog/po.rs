//! Gettext PO catalog format
//!
//! Values are kept in their escaped form (`\n`, `\"` stay as written), which
//! is also how they appear in the spreadsheet. Comments, blank lines and the
//! header entry survive a parse/serialize cycle, and unchanged fields are
//! written back with their original line layout.

use std::collections::HashSet;
use std::path::Path;

use super::{Catalog, CatalogFormat, Entry, EntryKey, LineEnding};
use crate::error::{SyncError, SyncResult};

/// The `.po` catalog format
#[derive(Debug, Clone, Copy, Default)]
pub struct PoFormat;

impl CatalogFormat for PoFormat {
    fn extension(&self) -> &str {
        "po"
    }

    fn parse(&self, path: &Path, bytes: &[u8]) -> SyncResult<Catalog> {
        let text = std::str::from_utf8(bytes).map_err(|e| SyncError::Parse {
            path: path.to_path_buf(),
            line: 0,
            details: format!("file is not valid UTF-8: {}", e),
        })?;
        Parser::new(path).parse(text)
    }

    fn serialize(&self, catalog: &Catalog) -> Vec<u8> {
        let mut out = String::new();
        for entry in &catalog.entries {
            for line in entry.comments() {
                out.push_str(line);
                out.push('\n');
            }
            for field in entry.fields() {
                if field.raw_lines().is_empty() {
                    write_field(&mut out, field.name(), field.value());
                } else {
                    for line in field.raw_lines() {
                        out.push_str(line);
                        out.push('\n');
                    }
                }
            }
        }
        for line in &catalog.trailing {
            out.push_str(line);
            out.push('\n');
        }

        // Values never contain a raw newline, so every '\n' here ends a line.
        if catalog.missing_final_newline && out.ends_with('\n') {
            out.pop();
        }
        if catalog.line_ending != LineEnding::Lf {
            out = out.replace('\n', catalog.line_ending.as_str());
        }
        out.into_bytes()
    }
}

/// Classification of one source line
enum Line<'a> {
    Blank,
    Comment,
    Field { name: &'a str, value: &'a str },
    Continuation(&'a str),
}

fn classify(line: &str) -> Option<Line<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Some(Line::Blank);
    }
    if trimmed.starts_with('#') {
        return Some(Line::Comment);
    }
    if let Some(inner) = quoted(trimmed) {
        return Some(Line::Continuation(inner));
    }
    if trimmed.starts_with("msg") {
        let (name, rest) = trimmed.split_once(char::is_whitespace)?;
        let value = quoted(rest.trim_start())?;
        return Some(Line::Field { name, value });
    }
    None
}

/// Contents of a `"..."` literal
fn quoted(s: &str) -> Option<&str> {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

struct Parser<'p> {
    path: &'p Path,
    entries: Vec<Entry>,
    keys: HashSet<EntryKey>,
    current: Option<(Entry, usize)>,
    pending: Vec<String>,
}

impl<'p> Parser<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            entries: Vec::new(),
            keys: HashSet::new(),
            current: None,
            pending: Vec::new(),
        }
    }

    fn error(&self, line: usize, details: impl Into<String>) -> SyncError {
        SyncError::Parse {
            path: self.path.to_path_buf(),
            line,
            details: details.into(),
        }
    }

    fn parse(mut self, text: &str) -> SyncResult<Catalog> {
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let Some(line) = classify(raw) else {
                return Err(self.error(line_no, format!("unexpected text: {}", raw.trim())));
            };

            match line {
                Line::Blank | Line::Comment => {
                    self.finish()?;
                    self.pending.push(raw.to_string());
                }
                Line::Field { name, value } => {
                    let starts_new = match &self.current {
                        Some((entry, _)) => {
                            entry.has(name) || (name == super::MSGCTXT && entry.msgid().is_some())
                        }
                        None => false,
                    };
                    if starts_new {
                        self.finish()?;
                    }
                    let comments = std::mem::take(&mut self.pending);
                    let (entry, _) = self.current.get_or_insert_with(|| {
                        let mut entry = Entry::new();
                        entry.set_comments(comments);
                        (entry, line_no)
                    });
                    entry.push_parsed(name.to_string(), value.to_string(), raw.to_string());
                }
                Line::Continuation(value) => {
                    let extended = match &mut self.current {
                        Some((entry, _)) => entry.continue_last(value, raw.to_string()),
                        None => false,
                    };
                    if !extended {
                        return Err(self.error(line_no, "string continuation outside of an entry"));
                    }
                }
            }
        }
        self.finish()?;

        Ok(Catalog {
            entries: self.entries,
            trailing: self.pending,
            line_ending: LineEnding::detect(text),
            missing_final_newline: !text.is_empty() && !text.ends_with('\n'),
        })
    }

    /// Close the entry under construction
    fn finish(&mut self) -> SyncResult<()> {
        let Some((entry, line_no)) = self.current.take() else {
            return Ok(());
        };
        let Some(key) = entry.key() else {
            return Err(self.error(line_no, "entry has no msgid"));
        };
        if !self.keys.insert(key.clone()) {
            return Err(self.error(line_no, format!("duplicate entry '{}'", key)));
        }
        self.entries.push(entry);
        Ok(())
    }
}

/// Write a field whose value was set in code
///
/// Values spanning several lines use the `name ""` + continuation layout,
/// split after every `\n` escape.
fn write_field(out: &mut String, name: &str, value: &str) {
    let segments = escape_segments(value);
    if segments.len() > 1 {
        out.push_str(name);
        out.push_str(" \"\"\n");
        for segment in &segments {
            out.push('"');
            out.push_str(segment);
            out.push_str("\"\n");
        }
    } else {
        out.push_str(name);
        out.push_str(" \"");
        out.push_str(segments.first().map(String::as_str).unwrap_or(""));
        out.push_str("\"\n");
    }
}

/// Make a value safe to place between quotes and split it into lines
///
/// Existing escape sequences are kept, bare quotes get escaped and control
/// characters typed into the spreadsheet become escapes.
fn escape_segments(value: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                    if next == 'n' {
                        segments.push(std::mem::take(&mut current));
                    }
                }
                None => current.push_str("\\\\"),
            },
            '"' => current.push_str("\\\""),
            '\n' => {
                current.push_str("\\n");
                segments.push(std::mem::take(&mut current));
            }
            '\t' => current.push_str("\\t"),
            '\r' => {}
            _ => current.push(c),
        }
    }
    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"# Translation file
msgid ""
msgstr ""
"Language: es\n"
"Content-Type: text/plain; charset=UTF-8\n"

#: src/main.c:10
msgid "Hi"
msgstr "Hola"

#, fuzzy
msgctxt "menu"
msgid "Open"
msgstr "Abrir"

msgid "One file"
msgid_plural "%d files"
msgstr[0] "Un archivo"
msgstr[1] "%d archivos"

msgid ""
"Long line one\n"
"line two"
msgstr ""

#~ msgid "Obsolete"
#~ msgstr "Obsoleto"
"#;

    fn parse(text: &str) -> SyncResult<Catalog> {
        PoFormat.parse(Path::new("messages.po"), text.as_bytes())
    }

    #[test]
    fn test_parse_entries_in_order() {
        let catalog = parse(SAMPLE).unwrap();

        assert_eq!(catalog.entries.len(), 5);
        assert!(catalog.entries[0].is_header());
        assert_eq!(
            catalog.entries[0].get("msgstr"),
            Some("Language: es\\nContent-Type: text/plain; charset=UTF-8\\n")
        );

        let ids: Vec<_> = catalog.syncable_entries().filter_map(Entry::msgid).collect();
        assert_eq!(
            ids,
            vec!["Hi", "Open", "One file", "Long line one\\nline two"]
        );
    }

    #[test]
    fn test_parse_context_and_plurals() {
        let catalog = parse(SAMPLE).unwrap();

        let open = catalog.find(&EntryKey::new("Open", Some("menu"))).unwrap();
        assert_eq!(open.get("msgstr"), Some("Abrir"));
        assert_eq!(open.comments().last().map(String::as_str), Some("#, fuzzy"));

        let plural = catalog.find(&EntryKey::new("One file", None)).unwrap();
        assert_eq!(plural.get("msgid_plural"), Some("%d files"));
        assert_eq!(plural.get("msgstr[1]"), Some("%d archivos"));
        assert_eq!(plural.get("msgstr"), None);
    }

    #[test]
    fn test_obsolete_entries_are_trailing_comments() {
        let catalog = parse(SAMPLE).unwrap();
        assert_eq!(
            catalog.trailing,
            vec!["".to_string(), "#~ msgid \"Obsolete\"".into(), "#~ msgstr \"Obsoleto\"".into()]
        );
    }

    #[test]
    fn test_unchanged_catalog_serializes_identically() {
        let catalog = parse(SAMPLE).unwrap();
        let bytes = PoFormat.serialize(&catalog);
        assert_eq!(String::from_utf8(bytes).unwrap(), SAMPLE);
    }

    #[test]
    fn test_crlf_input_parses() {
        let catalog = parse("msgid \"Hi\"\r\nmsgstr \"Hola\"\r\n").unwrap();
        assert_eq!(catalog.entries[0].get("msgstr"), Some("Hola"));
        assert_eq!(catalog.line_ending, LineEnding::CrLf);
    }

    #[test]
    fn test_crlf_survives_serialize() {
        let text = "# note\r\nmsgid \"Hi\"\r\nmsgstr \"Hola\"\r\n\r\n#~ msgid \"Old\"\r\n";
        let catalog = parse(text).unwrap();
        assert_eq!(String::from_utf8(PoFormat.serialize(&catalog)).unwrap(), text);
    }

    #[test]
    fn test_crlf_kept_for_updated_fields() {
        let mut catalog = parse("msgid \"Hi\"\r\nmsgstr \"Hola\"\r\n").unwrap();
        catalog.entries[0].update("msgstr", "Hola\\namigo");
        let text = String::from_utf8(PoFormat.serialize(&catalog)).unwrap();
        assert_eq!(text, "msgid \"Hi\"\r\nmsgstr \"\"\r\n\"Hola\\n\"\r\n\"amigo\"\r\n");
    }

    #[test]
    fn test_missing_final_newline_survives_serialize() {
        let text = "msgid \"Hi\"\nmsgstr \"Hola\"";
        let mut catalog = parse(text).unwrap();
        assert!(catalog.missing_final_newline);
        assert_eq!(String::from_utf8(PoFormat.serialize(&catalog)).unwrap(), text);

        catalog.entries[0].update("msgstr", "Hello");
        assert_eq!(
            String::from_utf8(PoFormat.serialize(&catalog)).unwrap(),
            "msgid \"Hi\"\nmsgstr \"Hello\""
        );

        let crlf = "msgid \"Hi\"\r\nmsgstr \"Hola\"";
        let catalog = parse(crlf).unwrap();
        assert_eq!(String::from_utf8(PoFormat.serialize(&catalog)).unwrap(), crlf);
    }

    #[test]
    fn test_updated_field_is_reformatted() {
        let mut catalog = parse(SAMPLE).unwrap();
        let idx = catalog
            .entries
            .iter()
            .position(|e| e.msgid() == Some("Hi"))
            .unwrap();
        catalog.entries[idx].update("msgstr", "Hola, \"amigo\"");

        let text = String::from_utf8(PoFormat.serialize(&catalog)).unwrap();
        assert!(text.contains("msgstr \"Hola, \\\"amigo\\\"\"\n"));

        let reparsed = parse(&text).unwrap();
        assert_eq!(
            reparsed.find(&EntryKey::new("Hi", None)).unwrap().get("msgstr"),
            Some("Hola, \\\"amigo\\\"")
        );
    }

    #[test]
    fn test_multiline_value_written_as_continuations() {
        let mut out = String::new();
        write_field(&mut out, "msgstr", "first\\nsecond");
        assert_eq!(out, "msgstr \"\"\n\"first\\n\"\n\"second\"\n");

        let mut out = String::new();
        write_field(&mut out, "msgstr", "ends with newline\\n");
        assert_eq!(out, "msgstr \"ends with newline\\n\"\n");
    }

    #[test]
    fn test_escape_segments_handles_typed_characters() {
        assert_eq!(escape_segments(""), vec![String::new()]);
        assert_eq!(escape_segments("a\tb"), vec!["a\\tb".to_string()]);
        assert_eq!(
            escape_segments("line\r\nnext"),
            vec!["line\\n".to_string(), "next".to_string()]
        );
        assert_eq!(escape_segments("trailing\\"), vec!["trailing\\\\".to_string()]);
        assert_eq!(escape_segments("keep \\\" as is"), vec!["keep \\\" as is".to_string()]);
    }

    #[test]
    fn test_duplicate_key_is_error() {
        let err = parse("msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"a\"\nmsgstr \"y\"\n").unwrap_err();
        match err {
            SyncError::Parse { line, details, .. } => {
                assert_eq!(line, 4);
                assert!(details.contains("duplicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_msgid_different_context_allowed() {
        let catalog = parse(
            "msgctxt \"a\"\nmsgid \"x\"\nmsgstr \"1\"\n\nmsgctxt \"b\"\nmsgid \"x\"\nmsgstr \"2\"\n",
        )
        .unwrap();
        assert_eq!(catalog.entries.len(), 2);
    }

    #[test]
    fn test_entries_without_blank_separator() {
        let catalog = parse("msgid \"a\"\nmsgstr \"1\"\nmsgid \"b\"\nmsgstr \"2\"\n").unwrap();
        assert_eq!(catalog.entries.len(), 2);
        assert_eq!(catalog.entries[1].get("msgstr"), Some("2"));
    }

    #[test]
    fn test_garbage_line_is_error() {
        let err = parse("msgid \"a\"\nmsgstr \"1\"\nthis is not po\n").unwrap_err();
        assert!(matches!(err, SyncError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_orphan_continuation_is_error() {
        let err = parse("\"dangling\"\n").unwrap_err();
        assert!(matches!(err, SyncError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let err = PoFormat
            .parse(Path::new("bad.po"), &[0x6d, 0xff, 0xfe])
            .unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));
    }
}
