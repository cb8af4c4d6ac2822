//! VCF (Variant Call Format) support
//!
//! This module provides the record type the annotation pipeline consumes and
//! a reader that yields those records lazily from plain or gzipped VCF.

mod parser;
mod record;

pub use parser::{open_vcf, parse_vcf_string, VcfHeader, VcfReader, VcfRecordIterator};
pub use record::{
    InfoValue, VariantType, VcfRecord, INFO_SVTYPE, INFO_TOTAL_COVERAGE, INFO_TOTAL_READS,
    INFO_WINDOW_END, INFO_WINDOW_START, MISSING_ALLELE,
};
