//! Permissive tokenizer for comma-delimited product feeds.
//!
//! The first non-blank record is the header. Quoted fields may contain commas,
//! line breaks and doubled quotes. A quote that is still open when the input
//! ends is closed at the end of the line it was opened on, and tokenizing
//! resumes on the next line, so one malformed row never swallows the rest of
//! the feed.

/// One data row of a feed: header name to raw field value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Source line the record starts on (the header is usually line 1).
    pub row_number: usize,
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(row_number: usize, fields: Vec<(String, String)>) -> Self {
        Self { row_number, fields }
    }

    /// Value of the first column named `column`, if the row has that column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A tokenized feed: the trimmed header names and every data row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedFeed {
    /// Builds a feed from already-split records, keyed by the header order.
    ///
    /// Missing trailing fields become empty strings; fields beyond the last
    /// header are dropped.
    pub fn from_records(headers: Vec<String>, records: Vec<(usize, Vec<String>)>) -> Self {
        let headers = headers
            .into_iter()
            .map(|header| header.trim().to_string())
            .collect::<Vec<_>>();

        let rows = records
            .into_iter()
            .map(|(row_number, values)| {
                if values.len() > headers.len() {
                    log::debug!(
                        "Row {row_number} has {} fields, header has {}; extra fields ignored",
                        values.len(),
                        headers.len()
                    );
                }
                let mut values = values.into_iter();
                let fields = headers
                    .iter()
                    .map(|header| (header.clone(), values.next().unwrap_or_default()))
                    .collect();
                RawRow::new(row_number, fields)
            })
            .collect();

        Self { headers, rows }
    }

    /// True when the feed has no usable header row.
    pub fn is_empty(&self) -> bool {
        self.headers.iter().all(String::is_empty)
    }
}

/// Tokenizes `text` into a header and data rows. Never fails.
pub fn parse_feed(text: &str) -> ParsedFeed {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = tokenize(text).into_iter();

    let Some(header) = records.next() else {
        return ParsedFeed::default();
    };

    ParsedFeed::from_records(
        header.fields,
        records
            .map(|record| (record.line, record.fields))
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Position of a record whose opening quote was never closed.
struct Unterminated {
    offset: usize,
    line: usize,
}

fn tokenize(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut rest = text;
    let mut line = 1;

    while let Some(open) = scan(rest, line, false, &mut records) {
        let tail = &rest[open.offset..];
        let (first_line, remainder) = match tail.find('\n') {
            Some(idx) => (&tail[..idx], Some(&tail[idx + 1..])),
            None => (tail, None),
        };
        scan(first_line.trim_end_matches('\r'), open.line, true, &mut records);

        match remainder {
            Some(remainder) => {
                rest = remainder;
                line = open.line + 1;
            }
            None => break,
        }
    }

    records
}

/// Splits `text` into records, appending them to `records`.
///
/// With `close_open_quote` unset, a quote still open at the end of `text`
/// leaves the unfinished record out and reports where it started.
fn scan(
    text: &str,
    first_line: usize,
    close_open_quote: bool,
    records: &mut Vec<Record>,
) -> Option<Unterminated> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut saw_quote = false;
    let mut line = first_line;
    let mut record_line = first_line;
    let mut record_offset = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some((_, '"'))) {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                saw_quote = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if matches!(chars.peek(), Some((_, '\n'))) => {}
            '\n' | '\r' if !in_quotes => {
                line += 1;
                fields.push(std::mem::take(&mut current));
                push_record(records, record_line, std::mem::take(&mut fields), saw_quote);
                saw_quote = false;
                record_line = line;
                record_offset = idx + c.len_utf8();
            }
            '\n' => {
                line += 1;
                current.push('\n');
            }
            _ => current.push(c),
        }
    }

    if in_quotes && !close_open_quote {
        return Some(Unterminated {
            offset: record_offset,
            line: record_line,
        });
    }

    if !current.is_empty() || !fields.is_empty() || saw_quote {
        fields.push(current);
        push_record(records, record_line, fields, saw_quote);
    }

    None
}

fn push_record(records: &mut Vec<Record>, line: usize, fields: Vec<String>, saw_quote: bool) {
    let blank = !saw_quote && fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push(Record { line, fields });
    }
}
