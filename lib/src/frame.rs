//! A small columnar table of named, typed, nullable columns.
//!
//! The cleaner works column-at-a-time on a [`Frame`]; each column keeps its
//! current physical type so a cleaning step can turn a text column into a
//! typed one in a single replacement.

use crate::error::{FareError, Result};
use crate::schema::{ColumnKind, RawRecord};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashSet;
use std::io::Read;

/// Column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    Time(Vec<Option<NaiveTime>>),
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
}

/// A hashable view of one cell, used for row de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cell<'a> {
    Null,
    Text(&'a str),
    Date(NaiveDate),
    Time(NaiveTime),
    Integer(i64),
    /// Raw bits; `-0.0` and `0.0` are kept apart, NaN equals itself.
    Float(u64),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Time(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Date(_) => ColumnKind::Date,
            ColumnData::Time(_) => ColumnKind::Time,
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Float(_) => ColumnKind::Float,
        }
    }

    pub fn cell(&self, row: usize) -> Cell<'_> {
        match self {
            ColumnData::Text(v) => v[row].as_deref().map_or(Cell::Null, Cell::Text),
            ColumnData::Date(v) => v[row].map_or(Cell::Null, Cell::Date),
            ColumnData::Time(v) => v[row].map_or(Cell::Null, Cell::Time),
            ColumnData::Integer(v) => v[row].map_or(Cell::Null, Cell::Integer),
            ColumnData::Float(v) => v[row].map_or(Cell::Null, |f| Cell::Float(f.to_bits())),
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        matches!(self.cell(row), Cell::Null)
    }

    fn retain(&mut self, keep: &[bool]) {
        fn filter<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut mask = keep.iter();
            values.retain(|_| mask.next().copied().unwrap_or(false));
        }
        match self {
            ColumnData::Text(v) => filter(v, keep),
            ColumnData::Date(v) => filter(v, keep),
            ColumnData::Time(v) => filter(v, keep),
            ColumnData::Integer(v) => filter(v, keep),
            ColumnData::Float(v) => filter(v, keep),
        }
    }
}

/// Named, typed, nullable columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<ColumnData>,
    n_rows: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Frame::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> Result<Self> {
        self.push_column(name, data)?;
        Ok(self)
    }

    /// Append a column; its length must match the frame's row count.
    pub fn push_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(FareError::schema(format!("duplicate column `{}`", name)));
        }
        if !self.columns.is_empty() && data.len() != self.n_rows {
            return Err(FareError::schema(format!(
                "column `{}` has {} rows, frame has {}",
                name,
                data.len(),
                self.n_rows
            )));
        }
        self.n_rows = data.len();
        self.names.push(name);
        self.columns.push(data);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Index of a column, matched case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Replace the contents of an existing column, keeping its position.
    pub fn replace_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| FareError::schema(format!("missing column `{}`", name)))?;
        if data.len() != self.n_rows {
            return Err(FareError::schema(format!(
                "replacement for `{}` has {} rows, frame has {}",
                name,
                data.len(),
                self.n_rows
            )));
        }
        self.columns[idx] = data;
        Ok(())
    }

    /// Replace a column's contents and give it a new name in the same position.
    pub fn replace_and_rename(&mut self, name: &str, new_name: &str, data: ColumnData) -> Result<()> {
        self.replace_column(name, data)?;
        if let Some(idx) = self.position(name) {
            self.names[idx] = new_name.to_string();
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Option<ColumnData> {
        let idx = self.position(name)?;
        self.names.remove(idx);
        Some(self.columns.remove(idx))
    }

    pub fn rename_columns(&mut self, f: impl Fn(&str) -> String) {
        for name in &mut self.names {
            *name = f(name);
        }
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut ColumnData> {
        self.columns.iter_mut()
    }

    /// Keep only the rows where `keep[row]` is true.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            column.retain(keep);
        }
        self.n_rows = match self.columns.first() {
            Some(column) => column.len(),
            None => 0,
        };
    }

    /// Drop exact-duplicate rows, keeping the first occurrence. Returns rows dropped.
    pub fn drop_duplicates(&mut self) -> usize {
        let keep: Vec<bool> = {
            let mut seen: HashSet<Vec<Cell<'_>>> = HashSet::with_capacity(self.n_rows);
            (0..self.n_rows)
                .map(|row| seen.insert(self.columns.iter().map(|c| c.cell(row)).collect()))
                .collect()
        };
        let before = self.n_rows;
        self.retain_rows(&keep);
        before - self.n_rows
    }

    /// Drop rows with a null in any column. Returns rows dropped.
    pub fn drop_nulls(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.n_rows)
            .map(|row| self.columns.iter().all(|c| !c.is_null(row)))
            .collect();
        let before = self.n_rows;
        self.retain_rows(&keep);
        before - self.n_rows
    }

    /// Read a headed CSV. Every column is text except `price`, read as float.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::None)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for result in rdr.records() {
            let record = result?;
            for (col, values) in cells.iter_mut().enumerate() {
                let value = record.get(col).filter(|v| !v.is_empty());
                values.push(value.map(str::to_string));
            }
        }

        let mut frame = Frame::new();
        for (name, values) in headers.into_iter().zip(cells) {
            let data = if name.trim().eq_ignore_ascii_case("price") {
                ColumnData::Float(parse_prices(&values)?)
            } else {
                ColumnData::Text(values)
            };
            frame.push_column(name, data)?;
        }
        Ok(frame)
    }

    /// Build a frame in the input CSV layout from raw records.
    pub fn from_raw_records(records: &[RawRecord]) -> Result<Self> {
        let mut frame = Frame::new();
        for (idx, header) in RawRecord::HEADERS.iter().take(10).enumerate() {
            let values = records
                .iter()
                .map(|r| r.text_fields()[idx].clone())
                .collect();
            frame.push_column(*header, ColumnData::Text(values))?;
        }
        let prices = records.iter().map(|r| r.price).collect();
        frame.push_column(RawRecord::HEADERS[10], ColumnData::Float(prices))?;
        Ok(frame)
    }
}

fn parse_prices(values: &[Option<String>]) -> Result<Vec<Option<f64>>> {
    values
        .iter()
        .map(|v| match v {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| FareError::parse("price", s, e.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[Option<&str>]) -> ColumnData {
        ColumnData::Text(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    fn sample() -> Frame {
        Frame::new()
            .with_column("Airline", text(&[Some("Indigo"), Some("Indigo"), None, Some("Vistara")]))
            .unwrap()
            .with_column(
                "Price",
                ColumnData::Float(vec![Some(100.0), Some(100.0), Some(5.0), Some(7.0)]),
            )
            .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let frame = sample();
        assert_eq!(frame.position("airline"), Some(0));
        assert_eq!(frame.column("PRICE").map(ColumnData::kind), Some(ColumnKind::Float));
        assert!(frame.column("route").is_none());
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let mut frame = sample();
        assert_eq!(frame.drop_duplicates(), 1);
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.column("price"), Some(&ColumnData::Float(vec![Some(100.0), Some(5.0), Some(7.0)])));
    }

    #[test]
    fn test_drop_nulls() {
        let mut frame = sample();
        assert_eq!(frame.drop_nulls(), 1);
        assert_eq!(frame.n_rows(), 3);
    }

    #[test]
    fn test_push_column_length_mismatch() {
        let result = sample().with_column("Source", text(&[Some("Delhi")]));
        assert!(matches!(result, Err(FareError::Schema(_))));
    }

    #[test]
    fn test_from_csv_reader() {
        let data = "Airline,Duration,Price\nIndigo,2h 50m,3897\nAir India,,7662\n";
        let frame = Frame::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.column_names(), &["Airline", "Duration", "Price"]);
        assert!(frame.column("duration").unwrap().is_null(1));
        assert_eq!(
            frame.column("price"),
            Some(&ColumnData::Float(vec![Some(3897.0), Some(7662.0)]))
        );
    }

    #[test]
    fn test_from_csv_reader_bad_price() {
        let data = "Airline,Price\nIndigo,cheap\n";
        let err = Frame::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, FareError::Parse { ref column, .. } if column == "price"));
    }

    #[test]
    fn test_replace_and_rename() {
        let mut frame = sample();
        frame
            .replace_and_rename("price", "fare", ColumnData::Integer(vec![Some(1); 4]))
            .unwrap();
        assert_eq!(frame.column_names()[1], "fare");
        assert_eq!(frame.column("fare").map(ColumnData::kind), Some(ColumnKind::Integer));
    }
}
