//! Payload types returned by the VEP REST region endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an informational field, treating a mistyped value as absent
///
/// Only the consequence and the gene symbol are decoded strictly.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One element of the JSON array returned for a region query
///
/// `most_severe_consequence` stays optional at this layer so that a payload
/// lacking it still decodes; the classifier decides that its absence is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VepPayload {
    /// Echo of the query input
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Sequence region (chromosome) name
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub seq_region_name: Option<String>,

    /// Start of the queried region
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,

    /// End of the queried region
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,

    /// Allele string as VEP understood it (e.g., "A/G")
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub allele_string: Option<String>,

    /// Assembly the coordinates refer to
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub assembly_name: Option<String>,

    /// SO term of the most severe consequence across all transcripts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_severe_consequence: Option<String>,

    /// Per-transcript consequences; with `pick=1` at most one entry
    #[serde(default)]
    pub transcript_consequences: Vec<TranscriptConsequence>,
}

/// Consequence of the variant on a single transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptConsequence {
    /// HGNC gene symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_symbol: Option<String>,

    /// Ensembl gene identifier
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<String>,

    /// Ensembl transcript identifier
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,

    /// SO consequence terms
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub consequence_terms: Option<Vec<String>>,

    /// VEP impact rating (HIGH, MODERATE, LOW, MODIFIER)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,

    /// Coding HGVS (present when `hgvs=1`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hgvsc: Option<String>,

    /// Protein HGVS (present when `hgvs=1`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hgvsp: Option<String>,

    /// Scaled CADD score (present when `CADD=1`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cadd_phred: Option<f64>,

    /// LOFTEE call (present when `LoF=1`)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub lof: Option<String>,
}

impl VepPayload {
    /// Gene symbol of the first transcript consequence, if any
    pub fn first_gene_symbol(&self) -> Option<&str> {
        self.transcript_consequences
            .first()
            .and_then(|tc| tc.gene_symbol.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_region_response() {
        let body = r#"[{
            "input": "1 100 100 A/G 1",
            "seq_region_name": "1",
            "start": 100,
            "end": 100,
            "allele_string": "A/G",
            "assembly_name": "GRCh38",
            "most_severe_consequence": "missense_variant",
            "colocated_variants": [{"id": "rs123"}],
            "transcript_consequences": [{
                "gene_symbol": "BRCA1",
                "gene_id": "ENSG00000012048",
                "transcript_id": "ENST00000357654",
                "consequence_terms": ["missense_variant"],
                "impact": "MODERATE",
                "hgvsc": "ENST00000357654.9:c.5123C>A",
                "cadd_phred": 24.3,
                "lof": null
            }]
        }]"#;

        let payloads: Vec<VepPayload> = serde_json::from_str(body).unwrap();
        assert_eq!(payloads.len(), 1);
        let payload = &payloads[0];
        assert_eq!(
            payload.most_severe_consequence.as_deref(),
            Some("missense_variant")
        );
        assert_eq!(payload.first_gene_symbol(), Some("BRCA1"));
        assert_eq!(payload.transcript_consequences[0].cadd_phred, Some(24.3));
        assert!(payload.transcript_consequences[0].lof.is_none());
    }

    #[test]
    fn test_minimal_payload_decodes() {
        let payload: VepPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.most_severe_consequence.is_none());
        assert!(payload.transcript_consequences.is_empty());
        assert!(payload.first_gene_symbol().is_none());
    }

    #[test]
    fn test_mistyped_informational_fields_are_dropped() {
        let payload: VepPayload = serde_json::from_str(
            r#"{"most_severe_consequence": "missense_variant",
                "start": "100",
                "end": null,
                "transcript_consequences": [{
                    "gene_symbol": "BRCA1",
                    "consequence_terms": null,
                    "cadd_phred": "high",
                    "impact": 3
                }]}"#,
        )
        .unwrap();

        assert_eq!(
            payload.most_severe_consequence.as_deref(),
            Some("missense_variant")
        );
        assert!(payload.start.is_none());
        assert!(payload.end.is_none());
        assert_eq!(payload.first_gene_symbol(), Some("BRCA1"));
        let tc = &payload.transcript_consequences[0];
        assert!(tc.consequence_terms.is_none());
        assert!(tc.cadd_phred.is_none());
        assert!(tc.impact.is_none());
    }

    #[test]
    fn test_consequence_without_symbol() {
        let payload: VepPayload = serde_json::from_str(
            r#"{"most_severe_consequence": "intergenic_variant",
                "transcript_consequences": [{"impact": "MODIFIER"}]}"#,
        )
        .unwrap();
        assert!(payload.first_gene_symbol().is_none());
    }
}
