use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};
use regex::Regex;

pub mod error;
pub mod session;

pub use error::TableError;
pub use session::{Session, SessionSummary};

/// Text before the first space is the symbol; the code runs up to the next space.
static RECORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<symbol>[^ ]*) (?P<code>[^ ]*)").unwrap());

/// One `<symbol> <code>` line of a code table resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub symbol: char,
    pub code: String,
}

impl Record {
    /// Parses one line. Blank lines yield `Ok(None)`; `line_no` is 1-based and
    /// only used for error reporting.
    ///
    /// A line with no space, a symbol that is not one character, or an empty
    /// code is rejected, which makes the whole table fail to load.
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>, TableError> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let caps = RECORD
            .captures(line)
            .ok_or_else(|| TableError::MalformedRecord {
                line: line_no,
                content: line.to_string(),
            })?;

        let raw_symbol = &caps["symbol"];
        let mut chars = raw_symbol.chars();
        let raw = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(TableError::InvalidSymbol {
                    line: line_no,
                    symbol: raw_symbol.to_string(),
                })
            }
        };
        // Characters whose lowercase form spans several chars keep their own form.
        let mut lowered = raw.to_lowercase();
        let symbol = match (lowered.next(), lowered.next()) {
            (Some(c), None) => c,
            _ => raw,
        };

        let code = &caps["code"];
        if code.is_empty() {
            return Err(TableError::EmptyCode { line: line_no });
        }

        Ok(Some(Record {
            symbol,
            code: code.to_string(),
        }))
    }
}

/// Immutable mapping from a lowercase character to its code token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    entries: HashMap<char, String>,
}

impl CodeTable {
    /// Loads a UTF-8 table resource.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Self::load_with_encoding(path, UTF_8)
    }

    pub fn load_with_encoding(
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
    ) -> Result<Self, TableError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| TableError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut buffer = Vec::new();
        {
            let file = File::open(path).map_err(io_err)?;
            let mut reader = BufReader::new(file);
            reader.read_to_end(&mut buffer).map_err(io_err)?;
        }

        let (decoded, used, had_errors) = encoding.decode(&buffer);
        if had_errors {
            return Err(TableError::Decode {
                path: path.to_path_buf(),
                encoding: used.name(),
            });
        }

        let table = Self::parse(&decoded)?;
        info!("Loaded {} code table entries from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parses table text, one record per line. Later records win over earlier
    /// ones with the same symbol.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut entries = HashMap::new();

        for (idx, line) in text.lines().enumerate() {
            let Some(record) = Record::parse(idx + 1, line)? else {
                continue;
            };
            if let Some(previous) = entries.insert(record.symbol, record.code) {
                warn!(
                    "line {}: symbol {:?} redefined, replacing {:?}",
                    idx + 1,
                    record.symbol,
                    previous
                );
            }
        }

        Ok(CodeTable { entries })
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.entries.get(&symbol).map(String::as_str)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Record> for CodeTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        CodeTable {
            entries: iter.into_iter().map(|r| (r.symbol, r.code)).collect(),
        }
    }
}

/// Resolves a WHATWG encoding label such as `utf-8` or `euc-jp`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, TableError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| TableError::UnknownEncoding(label.to_string()))
}

/// Encodes `text` token by token. Every matched character contributes its code
/// followed by a single space; characters missing from the table are dropped.
/// No case folding happens here.
pub fn translate(text: &str, table: &CodeTable) -> String {
    let mut result = String::with_capacity(text.len() * 4);
    let mut skipped = 0usize;

    for c in text.chars() {
        match table.get(c) {
            Some(code) => {
                result.push_str(code);
                result.push(' ');
            }
            None => skipped += 1,
        }
    }

    debug!(
        "translated {} chars, skipped {}",
        text.chars().count() - skipped,
        skipped
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ab_table() -> CodeTable {
        CodeTable::parse("a .-\nb -...\n").unwrap()
    }

    #[test]
    fn translates_with_trailing_separator() {
        assert_eq!(translate("ab", &ab_table()), ".- -... ");
    }

    #[test]
    fn skips_unknown_characters_without_gap() {
        assert_eq!(translate("a1b", &ab_table()), ".- -... ");
    }

    #[test]
    fn empty_and_unmatched_input_give_empty_output() {
        let table = ab_table();
        assert_eq!(translate("", &table), "");
        assert_eq!(translate("xyz 123", &table), "");
        assert_eq!(translate("anything", &CodeTable::default()), "");
    }

    #[test]
    fn translate_does_not_fold_case() {
        assert_eq!(translate("AbA", &ab_table()), "-... ");
    }

    #[test]
    fn preserves_input_order_and_repeats() {
        assert_eq!(translate("baab", &ab_table()), "-... .- .- -... ");
    }

    #[test]
    fn duplicate_symbols_take_last_value() {
        let table = CodeTable::parse("a .-\nb -...\na ---\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get('a'), Some("---"));
    }

    #[test]
    fn code_is_cut_at_second_space() {
        let table = CodeTable::parse("a .- extra\n").unwrap();
        assert_eq!(table.get('a'), Some(".-"));
    }

    #[test]
    fn symbols_are_lowercased() {
        let table = CodeTable::parse("A .-\r\n").unwrap();
        assert!(table.contains('a'));
        assert!(!table.contains('A'));
        assert_eq!(table.get('a'), Some(".-"));
    }

    #[test]
    fn single_char_symbol_with_multi_char_lowercase_is_kept() {
        let table = CodeTable::parse("\u{130} .-\n").unwrap();
        assert_eq!(table.get('\u{130}'), Some(".-"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = CodeTable::parse("a .-\n\n   \nb -...").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rejects_bad_records() {
        assert!(matches!(
            CodeTable::parse("a .-\nb\n"),
            Err(TableError::MalformedRecord { line: 2, .. })
        ));
        assert!(matches!(
            CodeTable::parse("ab .-\n"),
            Err(TableError::InvalidSymbol { line: 1, .. })
        ));
        assert!(matches!(
            CodeTable::parse(" .-\n"),
            Err(TableError::InvalidSymbol { line: 1, .. })
        ));
        assert!(matches!(
            CodeTable::parse("a \n"),
            Err(TableError::EmptyCode { line: 1 })
        ));
    }

    #[test]
    fn collects_from_records() {
        let table: CodeTable = vec![
            Record { symbol: 'e', code: ".".into() },
            Record { symbol: 't', code: "-".into() },
        ]
        .into_iter()
        .collect();
        assert_eq!(translate("tee", &table), "- . . ");
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "\u{feff}s ...\no ---\n").unwrap();

        let table = CodeTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(translate("sos", &table), "... --- ... ");
    }

    #[test]
    fn loads_with_other_encoding() {
        let mut file = NamedTempFile::new().unwrap();
        // "é ..-.." in ISO-8859-1
        file.write_all(&[0xE9, b' ', b'.', b'.', b'-', b'.', b'.', b'\n'])
            .unwrap();

        let latin1 = encoding_for_label("latin1").unwrap();
        let table = CodeTable::load_with_encoding(file.path(), latin1).unwrap();
        assert_eq!(table.get('é'), Some("..-.."));
    }

    #[test]
    fn invalid_bytes_fail_the_load() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a .-\n\xFF -...\n").unwrap();

        let err = CodeTable::load(file.path()).unwrap_err();
        assert!(matches!(err, TableError::Decode { encoding: "UTF-8", .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CodeTable::load(dir.path().join("morse_code")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
        assert!(err.to_string().contains("morse_code"));
    }

    #[test]
    fn unknown_encoding_label() {
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(TableError::UnknownEncoding(_))
        ));
        assert_eq!(encoding_for_label(" UTF-8 ").unwrap(), UTF_8);
    }
}
