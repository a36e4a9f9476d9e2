//! Turn detected delimited text into a clean, typed table.

use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

use crate::detect::{clean_lines, Detection};
use crate::error::{LoadError, LoadResult};

/// A normalized table: unique trimmed column names, no all-empty columns,
/// numeric columns as `Float64`, anything else kept as text.
///
/// Column 0 is the independent variable.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Name of the independent variable column.
    pub fn x_name(&self) -> Option<&str> {
        self.frame.get_columns().first().map(|c| c.name().as_str())
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.frame
            .column(name)
            .map(|c| c.dtype() == &DataType::Float64)
            .unwrap_or(false)
    }

    /// Numeric columns other than column 0, in table order. These are the
    /// columns that can be plotted on the Y axis.
    pub fn y_candidates(&self) -> impl Iterator<Item = &str> + '_ {
        self.frame
            .get_columns()
            .iter()
            .skip(1)
            .filter(|c| c.dtype() == &DataType::Float64)
            .map(|c| c.name().as_str())
    }

    /// Values of a numeric column; missing cells become NaN.
    /// Returns `None` for unknown or text columns.
    pub fn values(&self, name: &str) -> Option<Vec<f64>> {
        let column = self.frame.column(name).ok()?;
        let ca = column.f64().ok()?;
        Some(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }

    /// Values of column 0 as `f64`. Cells that are not numbers become NaN.
    pub fn x_values(&self) -> Vec<f64> {
        let Some(column) = self.frame.get_columns().first() else {
            return Vec::new();
        };
        match column.cast(&DataType::Float64) {
            Ok(cast) => match cast.f64() {
                Ok(ca) => ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
                Err(_) => vec![f64::NAN; column.len()],
            },
            Err(_) => vec![f64::NAN; column.len()],
        }
    }
}

/// Header names read with the same quote rules as the body, trimmed, with one
/// leftover layer of double quotes dropped (e.g. `a, "b"`).
fn parse_header(line: &str, delimiter: char) -> LoadResult<Vec<String>> {
    let separator = separator_byte(delimiter)?;
    let read_options = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator));
    let frame = read_lines(&[line], read_options)?;

    let mut names = Vec::with_capacity(frame.width());
    for column in frame.get_columns() {
        let column = column.cast(&DataType::String)?;
        let name = column.str()?.get(0).unwrap_or_default().trim();
        let name = name
            .strip_prefix('"')
            .and_then(|n| n.strip_suffix('"'))
            .unwrap_or(name)
            .trim();
        names.push(name.to_string());
    }
    Ok(names)
}

fn ensure_unique(names: &[String]) -> LoadResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(LoadError::DuplicateColumnName(name.clone()));
        }
    }
    Ok(())
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Text column whose non-blank cells all parse as numbers (e.g. padded with
/// spaces, which the CSV reader does not strip) becomes `Float64`.
fn parse_text_as_numbers(column: &Column) -> Option<Column> {
    let ca = column.str().ok()?;
    let values: Option<Vec<Option<f64>>> = ca
        .into_iter()
        .map(|cell| match cell.map(str::trim) {
            None | Some("") => Some(None),
            Some(s) => s.parse::<f64>().ok().map(Some),
        })
        .collect();
    values.map(|v| Column::new(column.name().clone(), v))
}

fn coerce_numeric(column: &Column) -> LoadResult<Column> {
    Ok(match column.dtype() {
        DataType::Float64 => column.clone(),
        dtype if is_numeric_type(dtype) => column.cast(&DataType::Float64)?,
        DataType::String => parse_text_as_numbers(column).unwrap_or_else(|| column.clone()),
        _ => column.clone(),
    })
}

fn separator_byte(delimiter: char) -> LoadResult<u8> {
    u8::try_from(delimiter).map_err(|_| {
        LoadError::Parse(format!(
            "delimiter {delimiter:?} is not a single-byte character"
        ))
    })
}

fn read_lines(lines: &[&str], read_options: CsvReadOptions) -> LoadResult<DataFrame> {
    let mut text = lines.join("\n");
    text.push('\n');
    let df = CsvReader::new(Cursor::new(text.into_bytes()))
        .with_options(read_options)
        .finish()?;
    Ok(df)
}

fn read_body(lines: &[&str], delimiter: char) -> LoadResult<DataFrame> {
    let separator = separator_byte(delimiter)?;
    let read_options = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_truncate_ragged_lines(true)
        });
    read_lines(lines, read_options)
}

/// Build a [`Table`] from `text` using a prior [`Detection`].
///
/// Lines before the header are discarded. `skip_rows` data rows directly after
/// the header are dropped; the header itself is always kept.
pub fn normalize(text: &str, detection: &Detection, skip_rows: usize) -> LoadResult<Table> {
    let lines = clean_lines(text);
    let Some((header, data)) = lines
        .get(detection.header_row_index..)
        .and_then(|rest| rest.split_first())
    else {
        return Err(LoadError::HeaderNotFound);
    };

    let data: &[&str] = data.get(skip_rows..).unwrap_or_default();
    if data.is_empty() {
        return Err(LoadError::EmptyTable {
            skipped: skip_rows,
        });
    }

    let header_names = parse_header(header, detection.delimiter)?;
    let frame = read_body(data, detection.delimiter)?;

    let width = frame.width().max(header_names.len());
    let names: Vec<String> = (0..width)
        .map(|i| match header_names.get(i) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("column_{}", i + 1),
        })
        .collect();
    ensure_unique(&names)?;

    let mut columns = Vec::with_capacity(frame.width());
    for (column, name) in frame.get_columns().iter().zip(&names) {
        let column = coerce_numeric(column)?.with_name(name.as_str().into());
        if column.null_count() == column.len() {
            debug!(column = %name, "dropping empty column");
            continue;
        }
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(LoadError::EmptyTable {
            skipped: skip_rows,
        });
    }

    let frame = DataFrame::new(columns)?;
    debug!(
        rows = frame.height(),
        columns = frame.width(),
        skip_rows,
        "normalized table"
    );
    Ok(Table { frame })
}
