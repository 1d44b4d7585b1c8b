pub mod validator;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::LoadError;

pub use validator::validate;

pub type Row = HashMap<String, String>;

/// Raw uploaded table: header order plus one name -> cell map per record.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// First `n` rows as ordered cells, for previews
    pub fn head(&self, n: usize) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                self.headers
                    .iter()
                    .map(|h| row.get(h).map(String::as_str).unwrap_or(""))
                    .collect()
            })
            .collect()
    }
}

/// Load a CSV file with a header row
pub fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path)?;
    let table = read_csv(BufReader::new(file))?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), columns = table.headers.len(), "Loaded CSV");
    Ok(table)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = dedup_headers(reader.headers()?.iter());
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Short records leave trailing columns absent
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, cell)| (h.clone(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

/// First occurrence keeps its name; later repeats become `name.1`, `name.2`, ...
fn dedup_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<&str> = raw.collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for name in raw {
        let mut unique = name.to_string();
        let mut n = 1;
        while !taken.insert(unique.clone()) {
            unique = format!("{}.{}", name, n);
            n += 1;
        }
        if unique != name {
            tracing::warn!(column = name, renamed = %unique, "Duplicate column header renamed");
        }
        headers.push(unique);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_keeps_header_order() {
        let data = "Date,Sales,Region\n2024-01-07,100,North\n2024-01-14,120,South\n";
        let table = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Date", "Sales", "Region"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("Sales").unwrap(), "120");
        assert_eq!(table.head(1), vec![vec!["2024-01-07", "100", "North"]]);
    }

    #[test]
    fn test_read_csv_short_record() {
        let data = "Date,Sales\n2024-01-07\n2024-01-14,120\n";
        let table = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].get("Sales").is_none());
        assert_eq!(table.head(2)[0], vec!["2024-01-07", ""]);
    }

    #[test]
    fn test_duplicate_headers_keep_first() {
        let table = read_csv("Date,Sales,Sales,Sales\n2024-01-07,10,999,5\n".as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Date", "Sales", "Sales.1", "Sales.2"]);
        assert_eq!(table.rows[0].get("Sales").unwrap(), "10");
        assert_eq!(table.rows[0].get("Sales.1").unwrap(), "999");
        assert_eq!(table.rows[0].get("Sales.2").unwrap(), "5");
        assert_eq!(table.head(1), vec![vec!["2024-01-07", "10", "999", "5"]]);

        let series = validate(&table, "Date", "Sales").unwrap();
        assert_eq!(series.values(), vec![10.0]);
    }

    #[test]
    fn test_read_csv_empty_input() {
        let result = read_csv("".as_bytes());
        assert!(matches!(result, Err(LoadError::NoHeader)));
    }
}
