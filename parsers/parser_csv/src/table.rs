use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::debug;
use serde::Serialize;

use crate::encoding::{decode_strict, detect_encoding, detect_file_encoding, encode_strict};
use crate::separator::Separator;
use crate::{CsvError, Result};

/// Fill statistics of a table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableStats {
    /// Number of data rows (header excluded)
    pub rows: usize,
    /// Number of header columns
    pub columns: usize,
    /// Number of empty cells, short rows counted as empty
    pub empty_cells: usize,
    /// Percentage of non-empty cells, 0 for an empty table
    pub fill_rate: f64,
}

/// A decoded CSV file that remembers how it was stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    /// Data rows, each aligned to the header length
    pub rows: Vec<Vec<String>>,
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    /// Whether the source carried a byte order mark
    pub bom: bool,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8, encoding: &'static Encoding) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self {
            headers,
            rows,
            delimiter,
            encoding,
            bom: false,
        }
    }

    /// Read a whole file with its detected encoding
    pub fn read(path: &Path, separator: Separator) -> Result<Self> {
        let bytes = fs::read(path)?;
        let table = Self::from_bytes(&bytes, separator)?;
        debug!(
            "Read {} ({}, {} columns, {} rows)",
            path.display(),
            table.encoding.name(),
            table.headers.len(),
            table.rows.len()
        );
        Ok(table)
    }

    pub fn from_bytes(bytes: &[u8], separator: Separator) -> Result<Self> {
        let encoding = detect_encoding(bytes);
        let text = decode_strict(bytes, encoding)?;
        let mut table = Self::parse(&text, separator.resolve(&text), encoding)?;
        table.bom = Encoding::for_bom(bytes).is_some();
        Ok(table)
    }

    /// Parse decoded text; the first record is the header row
    pub fn parse(text: &str, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if headers.is_empty() {
            return Err(CsvError::EmptyFile);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self::new(headers, rows, delimiter, encoding))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Project the table onto `columns`, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<CsvTable> {
        let indices = columns
            .iter()
            .map(|name| self.column_index(name).ok_or_else(|| CsvError::MissingColumn(name.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let headers = indices.iter().map(|&i| self.headers[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(CsvTable {
            headers,
            rows,
            delimiter: self.delimiter,
            encoding: self.encoding,
            bom: self.bom,
        })
    }

    /// Remove a column in place. Returns false if it was absent.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };

        self.headers.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        true
    }

    /// Serialize with the table's own delimiter and encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let utf8 = writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))?;
        let text = String::from_utf8(utf8).map_err(|_| CsvError::Decode { encoding: UTF_8.name() })?;

        let mut bytes = Vec::with_capacity(text.len() + 3);
        if self.bom {
            bytes.extend_from_slice(bom_bytes(self.encoding));
        }
        bytes.extend(encode_text(&text, self.encoding)?);
        Ok(bytes)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn stats(&self) -> TableStats {
        let rows = self.rows.len();
        let columns = self.headers.len();
        let empty_cells = self
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_empty())
            .count();

        let size = rows * columns;
        let fill_rate = if size > 0 {
            (size - empty_cells) as f64 / size as f64 * 100.0
        } else {
            0.0
        };

        TableStats {
            rows,
            columns,
            empty_cells,
            fill_rate,
        }
    }
}

fn bom_bytes(encoding: &'static Encoding) -> &'static [u8] {
    if encoding == UTF_16LE {
        &[0xFF, 0xFE]
    } else if encoding == UTF_16BE {
        &[0xFE, 0xFF]
    } else if encoding == UTF_8 {
        &[0xEF, 0xBB, 0xBF]
    } else {
        &[]
    }
}

// encoding_rs has no UTF-16 encoder
fn encode_text(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_16LE {
        Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
    } else if encoding == UTF_16BE {
        Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect())
    } else {
        encode_strict(text, encoding)
    }
}

/// Read only the header row of a file.
///
/// Lines are consumed until the quotes balance, so the rest of the file is
/// never decoded. UTF-16 content has no byte-level line breaks and is read whole.
pub fn read_headers(path: &Path, separator: Separator) -> Result<Vec<String>> {
    let encoding = detect_file_encoding(path);

    let bytes = if encoding == UTF_16LE || encoding == UTF_16BE {
        fs::read(path)?
    } else {
        read_first_record_bytes(path)?
    };

    let text = decode_strict(&bytes, encoding)?;
    let delimiter = separator.resolve(&text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(String::from).collect()),
        None => Err(CsvError::EmptyFile),
    }
}

fn read_first_record_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut bytes = Vec::new();

    loop {
        let read = reader.read_until(b'\n', &mut bytes)?;
        let quotes = bytes.iter().filter(|&&b| b == b'"').count();
        if read == 0 || quotes % 2 == 0 {
            break;
        }
    }

    Ok(bytes)
}
