//! CSV persistence for result records.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::core::schema::{CSV_HEADERS, ResultRecord};
use crate::{BenchError, BenchResult};

use super::RecordSink;

fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn parse_bool(field: &str, column: &str, row: usize) -> BenchResult<bool> {
    match field.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(BenchError::Message(format!(
            "row {row}: invalid boolean {other:?} in column {column}"
        ))),
    }
}

fn parse_size(field: &str, column: &str, row: usize) -> BenchResult<Option<u64>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    field.parse::<u64>().map(Some).map_err(|e| {
        BenchError::Message(format!("row {row}: invalid number {field:?} in column {column}: {e}"))
    })
}

fn required(value: Option<u64>, column: &str, row: usize) -> BenchResult<u64> {
    value.ok_or_else(|| BenchError::Message(format!("row {row}: missing value in column {column}")))
}

/// Writes records as CSV rows, flushing after each one so that partial
/// results survive an aborted run.
pub struct CsvRecordWriter<W: Write> {
    writer: csv::Writer<W>,
    path: Option<PathBuf>,
}

impl CsvRecordWriter<File> {
    /// Create (or truncate) `path` and write the header.
    pub fn create(path: &Path) -> BenchResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BenchError::Message(format!("failed to create directory: {e}")))?;
            }
        }
        let file = File::create(path).map_err(|e| {
            BenchError::Message(format!("failed to create {}: {e}", path.display()))
        })?;
        let mut writer = CsvRecordWriter::from_writer(file)?;
        writer.path = Some(path.to_path_buf());
        Ok(writer)
    }
}

impl<W: Write> CsvRecordWriter<W> {
    /// Wrap any writer and write the header.
    pub fn from_writer(inner: W) -> BenchResult<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(CSV_HEADERS)?;
        writer.flush()?;
        Ok(CsvRecordWriter { writer, path: None })
    }

    /// File being written, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> BenchResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| BenchError::Message(format!("failed to flush CSV writer: {}", e.error())))
    }

    fn record_to_row(record: &ResultRecord) -> [String; 12] {
        let size = |v: Option<u64>| v.map(|v| v.to_string()).unwrap_or_default();
        [
            record.file.clone(),
            record.formula.clone(),
            format_bool(record.already_normal).to_string(),
            format_bool(record.already_gfnorm).to_string(),
            record.imp.clone(),
            record.time.to_string(),
            record.init_size.to_string(),
            record.init_dagsize.to_string(),
            size(record.fin_size),
            size(record.fin_dagsize),
            format_bool(record.final_normal).to_string(),
            format_bool(record.final_gfnorm).to_string(),
        ]
    }
}

impl<W: Write> RecordSink for CsvRecordWriter<W> {
    fn write(&mut self, record: &ResultRecord) -> BenchResult<()> {
        self.writer.write_record(Self::record_to_row(record))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Read records written by [`CsvRecordWriter`] (or by any tool producing
/// the same columns, in any order).
pub fn read_records<R: Read>(reader: R) -> BenchResult<Vec<ResultRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut columns = [0usize; 12];
    for (slot, name) in columns.iter_mut().zip(CSV_HEADERS) {
        *slot = headers.iter().position(|h| h.trim() == *name).ok_or_else(|| {
            BenchError::Message(format!("missing column {name} in result file"))
        })?;
    }

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = index + 2;
        let field = |i: usize| row.get(columns[i]).unwrap_or_default();
        let name = |i: usize| CSV_HEADERS[i];

        records.push(ResultRecord {
            file: field(0).to_string(),
            formula: field(1).to_string(),
            already_normal: parse_bool(field(2), name(2), line)?,
            already_gfnorm: parse_bool(field(3), name(3), line)?,
            imp: field(4).to_string(),
            time: required(parse_size(field(5), name(5), line)?, name(5), line)?,
            init_size: required(parse_size(field(6), name(6), line)?, name(6), line)?,
            init_dagsize: required(parse_size(field(7), name(7), line)?, name(7), line)?,
            fin_size: parse_size(field(8), name(8), line)?,
            fin_dagsize: parse_size(field(9), name(9), line)?,
            final_normal: parse_bool(field(10), name(10), line)?,
            final_gfnorm: parse_bool(field(11), name(11), line)?,
        });
    }
    Ok(records)
}

/// Read all records of a result file.
pub fn read_records_from_path(path: &Path) -> BenchResult<Vec<ResultRecord>> {
    let file = File::open(path)
        .map_err(|e| BenchError::Message(format!("failed to open {}: {e}", path.display())))?;
    read_records(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(imp: &str, fin: Option<u64>) -> ResultRecord {
        ResultRecord {
            file: "tests/hard.ltl".into(),
            formula: "(a0 U b1) W a1".into(),
            already_normal: true,
            already_gfnorm: false,
            imp: imp.into(),
            time: 123_456,
            init_size: 5,
            init_dagsize: 5,
            fin_size: fin,
            fin_dagsize: fin,
            final_normal: fin.is_some(),
            final_gfnorm: false,
        }
    }

    #[test]
    fn test_header_and_python_style_booleans() {
        let mut writer = CsvRecordWriter::from_writer(Vec::new()).unwrap();
        writer.write(&make_record("cpp", Some(7))).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "tests/hard.ltl,(a0 U b1) W a1,True,False,cpp,123456,5,5,7,7,True,False"
        );
    }

    #[test]
    fn test_missing_sizes_are_empty() {
        let mut writer = CsvRecordWriter::from_writer(Vec::new()).unwrap();
        writer.write(&make_record("owl", None)).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(",5,5,,,False,False"));
    }

    #[test]
    fn test_written_records_read_back() {
        let records = vec![make_record("owl", Some(3)), make_record("cpp", None)];
        let mut writer = CsvRecordWriter::from_writer(Vec::new()).unwrap();
        for r in &records {
            writer.write(r).unwrap();
        }
        let bytes = writer.into_inner().unwrap();
        assert_eq!(read_records(bytes.as_slice()).unwrap(), records);
    }

    #[test]
    fn test_formula_with_comma_is_quoted() {
        let mut record = make_record("cpp", Some(1));
        record.formula = "\"a,b\" U c".into();
        let mut writer = CsvRecordWriter::from_writer(Vec::new()).unwrap();
        writer.write(&record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let back = read_records(bytes.as_slice()).unwrap();
        assert_eq!(back[0].formula, "\"a,b\" U c");
    }

    #[test]
    fn test_read_rejects_missing_columns() {
        let text = "file,formula\nx,y\n";
        assert!(read_records(text.as_bytes()).is_err());
    }

    #[test]
    fn test_create_writes_file_incrementally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/result.csv");
        let mut writer = CsvRecordWriter::create(&path).unwrap();
        writer.write(&make_record("cpp", Some(2))).unwrap();

        // visible before the writer is dropped
        let records = read_records_from_path(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(writer.path(), Some(path.as_path()));
    }
}
