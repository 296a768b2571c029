use super::error::PreviewError;
use super::prediction::INVERTER_COUNT;
use chrono::{NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const COLUMN_COUNT: usize = 1 + INVERTER_COUNT as usize;

/// One measurement row of an uploaded production file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionRow {
    pub time: NaiveDateTime,
    /// Day energy per inverter (kWh), INV/1 first
    pub inverters: [f64; INVERTER_COUNT as usize],
}

impl ProductionRow {
    pub fn total(&self) -> f64 {
        self.inverters.iter().sum()
    }
}

/// Parsed contents of a tab-separated production export.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionFile {
    pub headers: Vec<String>,
    pub rows: Vec<ProductionRow>,
}

impl ProductionFile {
    pub fn preview(&self, count: usize) -> &[ProductionRow] {
        &self.rows[..count.min(self.rows.len())]
    }

    /// Time-of-day labels paired with the summed energy of all inverters.
    pub fn total_series(&self) -> (Vec<String>, Vec<f64>) {
        let labels = self
            .rows
            .iter()
            .map(|r| r.time.format("%H:%M:%S").to_string())
            .collect();
        let values = self.rows.iter().map(ProductionRow::total).collect();
        (labels, values)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|r| r.time.date()).min()?;
        let last = self.rows.iter().map(|r| r.time.date()).max()?;
        Some((first, last))
    }
}

/// Parses a production export: a header row, then `Time` plus one energy column per inverter.
pub fn parse_production_file(text: &str) -> Result<ProductionFile, PreviewError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(PreviewError::Empty)?;
    let headers: Vec<String> = header.split('\t').map(|h| h.trim().to_string()).collect();
    if headers.len() < COLUMN_COUNT {
        return Err(PreviewError::MissingColumns {
            line: header_line,
            found: headers.len(),
        });
    }

    let rows = lines
        .map(|(line_no, line)| parse_row(line_no, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProductionFile { headers, rows })
}

fn parse_row(line: usize, text: &str) -> Result<ProductionRow, PreviewError> {
    let fields: Vec<&str> = text.split('\t').map(str::trim).collect();
    if fields.len() < COLUMN_COUNT {
        return Err(PreviewError::MissingColumns {
            line,
            found: fields.len(),
        });
    }

    let time = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT).map_err(|_| {
        PreviewError::InvalidTimestamp {
            line,
            value: fields[0].to_string(),
        }
    })?;

    let mut inverters = [0.0; INVERTER_COUNT as usize];
    for (slot, (column, value)) in inverters
        .iter_mut()
        .zip(fields.iter().enumerate().skip(1))
    {
        *slot = value
            .replace(',', ".")
            .parse()
            .map_err(|_| PreviewError::InvalidNumber {
                line,
                column: column + 1,
                value: (*value).to_string(),
            })?;
    }

    Ok(ProductionRow { time, inverters })
}
