//! Destinations for result records.

pub mod csv;

use crate::BenchResult;
use crate::core::schema::ResultRecord;

pub use self::csv::{CsvRecordWriter, read_records, read_records_from_path};

/// Receives records in stream order as the driver produces them.
pub trait RecordSink {
    fn write(&mut self, record: &ResultRecord) -> BenchResult<()>;
}

/// Keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<ResultRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &ResultRecord) -> BenchResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write(&mut self, record: &ResultRecord) -> BenchResult<()> {
        (**self).write(record)
    }
}
