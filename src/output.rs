//! Tabular report output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::error::VepError;

/// Destination for report rows
pub trait TableSink {
    /// Write one row
    fn write_row(&mut self, row: &[String]) -> Result<(), VepError>;

    /// Push buffered rows to the underlying writer
    fn flush(&mut self) -> Result<(), VepError>;
}

/// Comma-separated output, one line per row, `\n` terminated
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    rows_written: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Rows written so far, header included
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, VepError> {
        self.writer.into_inner().map_err(|e| VepError::Io {
            msg: e.error().to_string(),
        })
    }
}

impl CsvSink<BufWriter<File>> {
    /// Create (or truncate) the file at `path`
    pub fn create(path: &Path) -> Result<Self, VepError> {
        let file = File::create(path).map_err(|e| VepError::Io {
            msg: format!("Failed to create {}: {}", path.display(), e),
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TableSink for CsvSink<W> {
    fn write_row(&mut self, row: &[String]) -> Result<(), VepError> {
        self.writer.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), VepError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<S: TableSink + ?Sized> TableSink for &mut S {
    fn write_row(&mut self, row: &[String]) -> Result<(), VepError> {
        (**self).write_row(row)
    }

    fn flush(&mut self) -> Result<(), VepError> {
        (**self).flush()
    }
}
