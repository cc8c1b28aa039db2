//! Catalog entries
//!
//! In-memory representation of a parsed catalog file. Entries keep file
//! order and answer field lookups with an explicit `None` when a field does
//! not exist, so "absent" and "present but empty" stay distinguishable.
//!
//! Parsing and serializing a concrete file format is the job of a
//! [`CatalogFormat`] implementation (see [`po::PoFormat`]).

pub mod discover;
pub mod po;

use std::path::Path;

use crate::error::SyncResult;

pub use discover::{discover, locale_from_path, CatalogPath, Discovery};
pub use po::PoFormat;

/// Field holding the message identifier
pub const MSGID: &str = "msgid";

/// Field holding the message context
pub const MSGCTXT: &str = "msgctxt";

/// Identity of an entry within one catalog file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub context: Option<String>,
    pub msgid: String,
}

impl EntryKey {
    /// Build a key; an empty context is the same as no context
    pub fn new(msgid: impl Into<String>, context: Option<&str>) -> Self {
        Self {
            context: context.filter(|c| !c.is_empty()).map(str::to_string),
            msgid: msgid.into(),
        }
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}\u{4}{}", context, self.msgid),
            None => f.write_str(&self.msgid),
        }
    }
}

/// One named field of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    value: String,
    /// Source lines the field was parsed from, reused while the value is unchanged
    raw: Vec<String>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Original source lines, empty once the value was changed
    pub fn raw_lines(&self) -> &[String] {
        &self.raw
    }
}

/// One catalog record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Comment and blank lines preceding the entry
    comments: Vec<String>,
    fields: Vec<Field>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used to assemble entries in code
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Append a field; replaces the value if the field already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value;
                field.raw.clear();
            }
            None => self.fields.push(Field {
                name,
                value,
                raw: Vec::new(),
            }),
        }
    }

    /// Value of a field, or `None` when the entry does not declare it
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Overwrite an existing field
    ///
    /// Never adds a field the entry does not already have. Returns whether
    /// the stored value changed.
    pub fn update(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) if field.value != value => {
                field.value = value.to_string();
                field.raw.clear();
                true
            }
            _ => false,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn msgid(&self) -> Option<&str> {
        self.get(MSGID)
    }

    pub fn msgctxt(&self) -> Option<&str> {
        self.get(MSGCTXT)
    }

    /// Entry identity, `None` for entries without a `msgid`
    pub fn key(&self) -> Option<EntryKey> {
        self.msgid().map(|id| EntryKey::new(id, self.msgctxt()))
    }

    /// Catalog metadata entry (`msgid ""` without context)
    pub fn is_header(&self) -> bool {
        self.msgid() == Some("") && self.msgctxt().is_none()
    }

    pub(crate) fn set_comments(&mut self, comments: Vec<String>) {
        self.comments = comments;
    }

    pub(crate) fn push_parsed(&mut self, name: String, value: String, raw: String) {
        self.fields.push(Field {
            name,
            value,
            raw: vec![raw],
        });
    }

    /// Extend the last field with a continuation string
    pub(crate) fn continue_last(&mut self, value: &str, raw: String) -> bool {
        match self.fields.last_mut() {
            Some(field) => {
                field.value.push_str(value);
                field.raw.push(raw);
                true
            }
            None => false,
        }
    }
}

/// Line terminator of a catalog file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Terminator of the first line in `text`, `Lf` for single-line text
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(pos) if text[..pos].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A parsed catalog file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<Entry>,
    /// Comment and blank lines after the last entry
    pub trailing: Vec<String>,
    pub line_ending: LineEnding,
    /// The last line had no terminator
    pub missing_final_newline: bool,
}

impl Catalog {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Entries that take part in synchronization (everything but the header)
    pub fn syncable_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_header())
    }

    pub fn find(&self, key: &EntryKey) -> Option<&Entry> {
        self.syncable_entries()
            .find(|e| e.key().as_ref() == Some(key))
    }
}

/// Parser/serializer for an on-disk catalog format
pub trait CatalogFormat {
    /// File extension handled by this format, without the dot
    fn extension(&self) -> &str;

    /// Parse file bytes into ordered entries
    fn parse(&self, path: &Path, bytes: &[u8]) -> SyncResult<Catalog>;

    /// Serialize entries back to file bytes
    fn serialize(&self, catalog: &Catalog) -> Vec<u8>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_is_none() {
        let entry = Entry::new().with_field("msgid", "Hi").with_field("msgstr", "");

        assert_eq!(entry.get("msgstr"), Some(""));
        assert_eq!(entry.get("msgid_plural"), None);
        assert!(!entry.has("msgstr[0]"));
    }

    #[test]
    fn test_update_never_adds_field() {
        let mut entry = Entry::new().with_field("msgid", "Hi").with_field("msgstr", "Hola");

        assert!(!entry.update("msgstr[1]", "Holas"));
        assert!(!entry.has("msgstr[1]"));

        assert!(entry.update("msgstr", "Hello"));
        assert_eq!(entry.get("msgstr"), Some("Hello"));

        // Same value is not a change
        assert!(!entry.update("msgstr", "Hello"));
    }

    #[test]
    fn test_update_drops_raw_lines() {
        let mut entry = Entry::new();
        entry.push_parsed("msgid".into(), "Hi".into(), "msgid \"Hi\"".into());
        assert_eq!(entry.fields()[0].raw_lines().len(), 1);

        entry.update("msgid", "Hey");
        assert!(entry.fields()[0].raw_lines().is_empty());
    }

    #[test]
    fn test_key_and_header() {
        let header = Entry::new().with_field("msgid", "").with_field("msgstr", "x");
        assert!(header.is_header());

        let with_context = Entry::new()
            .with_field("msgctxt", "menu")
            .with_field("msgid", "");
        assert!(!with_context.is_header());
        assert_eq!(
            with_context.key(),
            Some(EntryKey::new("", Some("menu")))
        );

        assert_eq!(Entry::new().with_field("msgstr", "x").key(), None);
    }

    #[test]
    fn test_empty_context_equals_none() {
        assert_eq!(EntryKey::new("a", Some("")), EntryKey::new("a", None));
        assert_ne!(EntryKey::new("a", Some("b")), EntryKey::new("a", None));
    }

    #[test]
    fn test_syncable_entries_skip_header() {
        let catalog = Catalog::new(vec![
            Entry::new().with_field("msgid", "").with_field("msgstr", "meta"),
            Entry::new().with_field("msgid", "Hi").with_field("msgstr", "Hola"),
        ]);

        let ids: Vec<_> = catalog.syncable_entries().filter_map(Entry::msgid).collect();
        assert_eq!(ids, vec!["Hi"]);
        assert!(catalog.find(&EntryKey::new("Hi", None)).is_some());
        assert!(catalog.find(&EntryKey::new("", None)).is_none());
    }

    #[test]
    fn test_line_ending_detection() {
        assert_eq!(LineEnding::detect("a\r\nb\r\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }
}
