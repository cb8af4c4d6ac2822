// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-vep: VCF annotation with Ensembl VEP
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Each VCF record is sent to the VEP REST region endpoint, the returned
//! consequence is combined with the record's depth counts, and one row per
//! annotated record is written to a CSV report.
//!
//! # Example
//!
//! ```
//! use ferro_vep::vep::{HttpResponse, MockTransport, RetryPolicy, VepClient};
//! use ferro_vep::{CsvSink, Pipeline, PipelineConfig, VcfRecord};
//!
//! let transport = MockTransport::new();
//! transport.push_response(HttpResponse::ok(
//!     r#"[{"most_severe_consequence": "missense_variant",
//!          "transcript_consequences": [{"gene_symbol": "BRCA1"}]}]"#,
//! ));
//!
//! let client = VepClient::new(&transport).with_retry(RetryPolicy::immediate(1));
//! let pipeline = Pipeline::new(client, PipelineConfig::default());
//!
//! let record = VcfRecord::snv("1", 100, 'A', 'G').with_depths(50, vec![20]);
//! let mut sink = CsvSink::new(Vec::new());
//! let summary = pipeline.run(vec![Ok(record)], &mut sink).unwrap();
//! assert_eq!((summary.total, summary.failed), (1, 0));
//! ```

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod variant;
pub mod vcf;
pub mod vep;

// Re-export commonly used types
pub use classify::classify;
pub use config::VepConfig;
pub use error::{ErrorCode, VepError};
pub use output::{CsvSink, TableSink};
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use variant::{Column, VarType, Variant, VariantFields, DEFAULT_COLUMNS};
pub use vcf::{open_vcf, VcfRecord};
pub use vep::{RetryPolicy, VepClient};

/// Result type alias for ferro-vep operations
pub type Result<T> = std::result::Result<T, VepError>;
