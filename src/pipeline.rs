//! Sequential annotation pipeline.
//!
//! Records are processed strictly one at a time: fetch the annotation,
//! classify, write the row, then read the next record. A record whose
//! annotation cannot be fetched is counted and skipped; anything else that
//! goes wrong aborts the run.

use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::VepError;
use crate::output::TableSink;
use crate::variant::{Column, Variant, DEFAULT_COLUMNS};
use crate::vcf::VcfRecord;
use crate::vep::{AnnotationQuery, Transport, VepClient};

/// Maximum number of per-record failure messages kept in a summary
const MAX_STORED_ERRORS: usize = 100;

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Output columns, in order; also the header row
    pub columns: Vec<Column>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Use the given columns
    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Header row
    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records read
    pub total: usize,
    /// Records whose annotation could not be fetched
    pub failed: usize,
    /// Failure messages, at most 100
    pub errors: Vec<String>,
}

impl RunSummary {
    /// Records written to the sink
    pub fn annotated(&self) -> usize {
        self.total - self.failed
    }

    fn record_failure(&mut self, message: String) {
        self.failed += 1;
        if self.errors.len() < MAX_STORED_ERRORS {
            self.errors.push(message);
        }
    }
}

/// Annotates records and writes one row per annotated record
pub struct Pipeline<T> {
    client: VepClient<T>,
    config: PipelineConfig,
}

impl<T: Transport> Pipeline<T> {
    /// Create a pipeline around a client
    pub fn new(client: VepClient<T>, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Get the pipeline settings
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the annotation client
    pub fn client(&self) -> &VepClient<T> {
        &self.client
    }

    /// Process every record, writing the header first
    ///
    /// The sink is flushed whether the run completes or aborts.
    pub fn run<I, S>(&self, records: I, sink: &mut S) -> Result<RunSummary, VepError>
    where
        I: IntoIterator<Item = Result<VcfRecord, VepError>>,
        S: TableSink + ?Sized,
    {
        let result = self.run_inner(records, sink);
        let flushed = sink.flush();
        let summary = result?;
        flushed?;
        Ok(summary)
    }

    fn run_inner<I, S>(&self, records: I, sink: &mut S) -> Result<RunSummary, VepError>
    where
        I: IntoIterator<Item = Result<VcfRecord, VepError>>,
        S: TableSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        sink.write_row(&self.config.header())?;

        for record in records {
            let record = record?;
            summary.total += 1;

            match self.annotate(&record) {
                Ok(Some(variant)) => sink.write_row(&variant.row(&self.config.columns))?,
                Ok(None) => summary.record_failure(format!(
                    "{}: no annotation returned",
                    record.location()
                )),
                Err(e) if e.is_fetch_failure() => {
                    summary.record_failure(format!("{}: {}", record.location(), e))
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    /// Fetch and classify one record
    ///
    /// `Ok(None)` means the service returned nothing for the record. Fetch
    /// failures come back as errors for which
    /// [`VepError::is_fetch_failure`] holds.
    pub fn annotate(&self, record: &VcfRecord) -> Result<Option<Variant>, VepError> {
        debug!("Processing record {}", record);
        let query = AnnotationQuery::from_record(record)?;

        let payloads = match self.client.fetch(&query) {
            Ok(payloads) => payloads,
            Err(e) if e.is_fetch_failure() => {
                warn!("Could not fetch annotations for {}: {}", record.location(), e);
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        match payloads.first() {
            Some(payload) => classify(record, payload).map(Some),
            None => {
                warn!(
                    "Could not fetch annotations for {}: empty response",
                    record.location()
                );
                Ok(None)
            }
        }
    }
}
