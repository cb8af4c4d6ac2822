//! Fuzz target for the VCF reader and the variant classifier
//!
//! This target feeds arbitrary text through the VCF reader and classifies
//! every record it yields against a fixed payload.

#![no_main]

use ferro_vep::vcf::parse_vcf_string;
use ferro_vep::vep::{AnnotationQuery, TranscriptConsequence, VepPayload};
use ferro_vep::{classify, DEFAULT_COLUMNS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Don't fuzz extremely long inputs - diminishing returns
    if input.len() > 4000 {
        return;
    }

    let payload = VepPayload {
        most_severe_consequence: Some("missense_variant".to_string()),
        transcript_consequences: vec![TranscriptConsequence {
            gene_symbol: Some("BRCA1".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let Ok(reader) = parse_vcf_string(input) else {
        return;
    };
    for record in reader.records() {
        let Ok(record) = record else {
            break;
        };
        // Neither step may panic, whatever the record holds
        let _ = AnnotationQuery::from_record(&record);
        if let Ok(variant) = classify(&record, &payload) {
            let _ = variant.row(&DEFAULT_COLUMNS);
        }
    }
});
