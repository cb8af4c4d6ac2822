//! Build a [`Variant`] from a VCF record and its VEP annotation.

use crate::error::VepError;
use crate::variant::{VarType, Variant, VariantFields};
use crate::vcf::{VcfRecord, MISSING_ALLELE};
use crate::vep::VepPayload;

/// Map an indel subtype tag to its output label
///
/// Only `ins`, `del` and `unknown` are recognized; any other tag means the
/// record source disagrees with itself and is reported as an error.
pub fn indel_label(subtype: &str, location: &str) -> Result<VarType, VepError> {
    match subtype {
        "ins" => Ok(VarType::Insertion),
        "del" => Ok(VarType::Deletion),
        "unknown" => Ok(VarType::Indel),
        other => Err(VepError::UnknownIndelSubtype {
            location: location.to_string(),
            subtype: other.to_string(),
        }),
    }
}

/// Variant class of a record: indel subtypes first, then SNP, then CNV
pub fn variant_type_of(record: &VcfRecord) -> Result<VarType, VepError> {
    if record.is_indel() {
        indel_label(record.variant_subtype(), &record.location())
    } else if record.is_snp() {
        Ok(VarType::Snp)
    } else if record.is_sv() {
        Ok(VarType::Cnv)
    } else {
        Ok(VarType::Unknown)
    }
}

/// Combine a record with its annotation payload
pub fn classify(record: &VcfRecord, payload: &VepPayload) -> Result<Variant, VepError> {
    let effect = payload
        .most_severe_consequence
        .clone()
        .ok_or_else(|| VepError::MissingField {
            field: "most_severe_consequence".to_string(),
        })?;

    let gene = payload.first_gene_symbol().unwrap_or_default().to_string();

    let alternate = record
        .alternate
        .first()
        .cloned()
        .ok_or_else(|| VepError::MissingAllele {
            location: record.location(),
        })?;

    let depth = record.total_coverage()?;
    let reads = record.allele_reads()?;
    let allele_depth = reads[0];

    // The last alternate of a multi-allelic site is the minor allele,
    // unless it is missing
    let last = record.alternate.last().filter(|a| *a != MISSING_ALLELE);
    let (minor, minor_depth) = match last {
        Some(minor) if record.alternate.len() > 1 => {
            (minor.clone(), reads.last().copied().unwrap_or_default())
        }
        _ => (String::new(), 0),
    };

    Variant::new(VariantFields {
        chrom: record.chrom.clone(),
        gene,
        pos: record.pos,
        reference: record.reference.clone(),
        alternate,
        minor,
        depth,
        allele_depth,
        minor_depth,
        var_type: variant_type_of(record)?,
        effect,
    })
}
