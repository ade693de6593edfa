use std::io::BufRead;
use std::str::FromStr;

use chrono::NaiveDate;
use q5_error::{DbError, Result, ResultExt};
use tracing::trace;

pub const DELIMITER: char = '|';

/// Parse a `YYYY-MM-DD` date, optionally wrapped in single quotes.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let s = s.strip_prefix('\'').unwrap_or(s);
    let s = s.strip_suffix('\'').unwrap_or(s);

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .context_fn(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

/// Fields of a single line, with enough context to produce useful errors.
#[derive(Debug)]
pub struct Fields<'a> {
    source: &'a str,
    line: usize,
    fields: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn get(&self, idx: usize, name: &str) -> Result<&'a str> {
        self.fields
            .get(idx)
            .copied()
            .ok_or_else(|| self.error("Missing field", name))
    }

    fn error(&self, msg: &str, name: &str) -> DbError {
        DbError::new(msg)
            .with_field("source", self.source)
            .with_field("line", self.line)
            .with_field("field", name)
    }

    fn parse<T>(&self, idx: usize, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw = self.get(idx, name)?;
        raw.trim().parse::<T>().map_err(|e| {
            DbError::with_source(format!("Failed to parse '{raw}'"), Box::new(e))
                .with_field("source", self.source)
                .with_field("line", self.line)
                .with_field("field", name)
        })
    }

    pub fn int(&self, idx: usize, name: &str) -> Result<i32> {
        self.parse(idx, name)
    }

    pub fn float(&self, idx: usize, name: &str) -> Result<f64> {
        self.parse(idx, name)
    }

    pub fn date(&self, idx: usize, name: &str) -> Result<NaiveDate> {
        let raw = self.get(idx, name)?;
        parse_date(raw).map_err(|e| {
            e.with_field("source", self.source)
                .with_field("line", self.line)
                .with_field("field", name)
        })
    }

    /// Field with surrounding whitespace removed.
    pub fn text(&self, idx: usize, name: &str) -> Result<&'a str> {
        Ok(self.get(idx, name)?.trim())
    }
}

/// Read every line of a table, handing the split fields to `parse_row`.
///
/// Lines with fewer than `min_fields` fields are skipped. `parse_row` returning
/// `None` drops the row (used for filtering).
///
/// `source` names the input in errors, usually the file path.
pub fn read_rows<R, T, F>(
    reader: R,
    source: &str,
    min_fields: usize,
    mut parse_row: F,
) -> Result<Vec<T>>
where
    R: BufRead,
    F: FnMut(&Fields<'_>) -> Result<Option<T>>,
{
    let mut rows = Vec::new();
    let mut skipped = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context_fn(|| format!("Failed to read line from {source}"))?;

        let fields = Fields {
            source,
            line: idx + 1,
            fields: line.split(DELIMITER).collect(),
        };

        if fields.fields.len() < min_fields {
            trace!(source, line = idx + 1, "skipping short line");
            skipped += 1;
            continue;
        }

        if let Some(row) = parse_row(&fields)? {
            rows.push(row);
        }
    }

    trace!(source, rows = rows.len(), skipped, "read table");

    Ok(rows)
}
