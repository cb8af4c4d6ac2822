//! VCF record representation
//!
//! This module provides the VCF record type consumed by the annotation
//! pipeline, together with the allele-based classification (`snp`, `indel`,
//! `sv`, `mnp`) and the typed INFO lookups for the Platypus-style depth and
//! window fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::VepError;

/// INFO key for total coverage at the locus
pub const INFO_TOTAL_COVERAGE: &str = "TC";

/// INFO key for the per-alternate-allele read counts
pub const INFO_TOTAL_READS: &str = "TR";

/// INFO key for the start of the calling window
pub const INFO_WINDOW_START: &str = "WS";

/// INFO key for the end of the calling window
pub const INFO_WINDOW_END: &str = "WE";

/// INFO key whose presence marks a structural variant
pub const INFO_SVTYPE: &str = "SVTYPE";

/// Placeholder for a missing allele
pub const MISSING_ALLELE: &str = ".";

/// A single VCF record representing one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcfRecord {
    /// Chromosome name (e.g., "chr1", "1", "X", "chrM")
    pub chrom: String,

    /// 1-based position of the first base in the reference allele
    pub pos: u64,

    /// Variant identifier (e.g., rsID), None if "."
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Reference allele
    pub reference: String,

    /// Alternate allele(s); "." marks a missing allele
    pub alternate: Vec<String>,

    /// Phred-scaled quality score, None if "." or not present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,

    /// Filter status: None means PASS, Some contains filter name(s)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// INFO field key-value pairs
    #[serde(default)]
    pub info: HashMap<String, InfoValue>,
}

/// INFO field value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfoValue {
    /// Flag (presence indicates true)
    Flag,
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// String value
    String(String),
    /// Character value
    Character(char),
    /// Multiple integer values; `None` marks a missing (".") element
    IntegerArray(Vec<Option<i64>>),
    /// Multiple float values; `None` marks a missing (".") element
    FloatArray(Vec<Option<f64>>),
    /// Multiple string values
    StringArray(Vec<String>),
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => Ok(()),
            InfoValue::Integer(v) => write!(f, "{}", v),
            InfoValue::Float(v) => write!(f, "{}", v),
            InfoValue::String(v) => write!(f, "{}", v),
            InfoValue::Character(v) => write!(f, "{}", v),
            InfoValue::IntegerArray(v) => write!(f, "{}", join_optional(v)),
            InfoValue::FloatArray(v) => write!(f, "{}", join_optional(v)),
            InfoValue::StringArray(v) => write!(f, "{}", v.join(",")),
        }
    }
}

fn join_optional<T: fmt::Display>(values: &[Option<T>]) -> String {
    values
        .iter()
        .map(|v| v.as_ref().map_or(MISSING_ALLELE.to_string(), |x| x.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

impl InfoValue {
    /// Integer view of every element, in order
    ///
    /// Strings are parsed and integral floats are accepted, since untyped
    /// INFO keys arrive from the reader as strings. A missing element is an
    /// error, so values never shift onto the wrong allele.
    fn as_integers(&self) -> Result<Vec<i64>, String> {
        fn parse(s: &str) -> Result<i64, String> {
            s.trim()
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not an integer", s))
        }
        fn present<T>(i: usize, v: Option<T>) -> Result<T, String> {
            v.ok_or_else(|| format!("value {} is missing", i + 1))
        }
        fn from_float(v: f64) -> Result<i64, String> {
            if v.is_finite() && v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(format!("{} is not an integer", v))
            }
        }

        match self {
            InfoValue::Flag => Err("flag has no value".to_string()),
            InfoValue::Integer(v) => Ok(vec![*v]),
            InfoValue::Float(v) => Ok(vec![from_float(*v)?]),
            InfoValue::String(s) => s.split(',').map(parse).collect(),
            InfoValue::Character(c) => parse(&c.to_string()).map(|v| vec![v]),
            InfoValue::IntegerArray(v) => v
                .iter()
                .enumerate()
                .map(|(i, x)| present(i, *x))
                .collect(),
            InfoValue::FloatArray(v) => v
                .iter()
                .enumerate()
                .map(|(i, x)| present(i, *x).and_then(from_float))
                .collect(),
            InfoValue::StringArray(v) => v.iter().map(|s| parse(s)).collect(),
        }
    }
}

/// Coarse variant class, as assigned from the alleles alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantType {
    /// Single-base substitution
    Snp,
    /// Insertion, deletion or length-changing substitution
    Indel,
    /// Structural variant (SVTYPE present)
    Sv,
    /// Anything else, typically a same-length multi-base substitution
    Mnp,
}

impl VariantType {
    /// Lower-case tag
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Snp => "snp",
            VariantType::Indel => "indel",
            VariantType::Sv => "sv",
            VariantType::Mnp => "mnp",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_symbolic(allele: &str) -> bool {
    allele.starts_with('<') || allele.contains('[') || allele.contains(']')
}

fn is_transition(reference: &str, alternate: &str) -> bool {
    matches!(
        (reference, alternate),
        ("A", "G") | ("G", "A") | ("C", "T") | ("T", "C")
    )
}

impl VcfRecord {
    /// Create a new VCF record with minimal required fields
    pub fn new(chrom: String, pos: u64, reference: String, alternate: Vec<String>) -> Self {
        Self {
            chrom,
            pos,
            id: None,
            reference,
            alternate,
            quality: None,
            filter: None,
            info: HashMap::new(),
        }
    }

    /// Create a VCF record for a SNV (single nucleotide variant)
    pub fn snv(chrom: &str, pos: u64, reference: char, alternate: char) -> Self {
        Self::new(
            chrom.to_string(),
            pos,
            reference.to_string(),
            vec![alternate.to_string()],
        )
    }

    /// Create a VCF record for a deletion
    pub fn deletion(chrom: &str, pos: u64, reference: &str) -> Self {
        let anchor = reference.chars().next().unwrap_or('N');
        Self::new(
            chrom.to_string(),
            pos,
            reference.to_string(),
            vec![anchor.to_string()],
        )
    }

    /// Create a VCF record for an insertion
    pub fn insertion(chrom: &str, pos: u64, anchor: char, inserted: &str) -> Self {
        Self::new(
            chrom.to_string(),
            pos,
            anchor.to_string(),
            vec![format!("{}{}", anchor, inserted)],
        )
    }

    /// `chrom:pos`, used to identify the record in logs and errors
    pub fn location(&self) -> String {
        format!("{}:{}", self.chrom, self.pos)
    }

    /// Get the end position (1-based, inclusive) of the reference allele
    pub fn end_pos(&self) -> u64 {
        self.pos + (self.reference.len() as u64).max(1) - 1
    }

    /// First alternate allele, if it is present and not "."
    pub fn primary_alternate(&self) -> Option<&str> {
        self.alternate
            .first()
            .map(|a| a.as_str())
            .filter(|a| *a != MISSING_ALLELE)
    }

    /// Check if this is a multi-allelic variant
    pub fn is_multiallelic(&self) -> bool {
        self.alternate.len() > 1
    }

    /// Check if this record describes a structural variant
    pub fn is_sv(&self) -> bool {
        self.info.contains_key(INFO_SVTYPE)
    }

    /// Check if every alternate is a single base against a single-base reference
    pub fn is_snp(&self) -> bool {
        if self.reference.len() != 1 || self.alternate.is_empty() {
            return false;
        }
        self.alternate
            .iter()
            .all(|alt| matches!(alt.as_str(), "A" | "C" | "G" | "T" | "N" | "*"))
    }

    /// Check if the alleles describe an insertion or deletion
    ///
    /// A multi-base reference counts as an indel unless SVTYPE is set. A
    /// missing alternate always does. Otherwise the first literal alternate
    /// whose length differs from the reference decides, and only outside
    /// structural variants. A symbolic alternate never does.
    pub fn is_indel(&self) -> bool {
        let is_sv = self.is_sv();
        if self.reference.len() > 1 && !is_sv {
            return true;
        }
        for alt in &self.alternate {
            if alt == MISSING_ALLELE {
                return true;
            }
            if is_symbolic(alt) {
                return false;
            }
            if alt.len() != self.reference.len() {
                return !is_sv;
            }
        }
        false
    }

    /// Check if this is a bi-allelic indel that removes bases
    pub fn is_deletion(&self) -> bool {
        if self.alternate.len() != 1 || !self.is_indel() {
            return false;
        }
        let alt = &self.alternate[0];
        alt == MISSING_ALLELE || self.reference.len() > alt.len()
    }

    /// Coarse variant class; the first matching class wins
    pub fn variant_type(&self) -> VariantType {
        if self.is_snp() {
            VariantType::Snp
        } else if self.is_indel() {
            VariantType::Indel
        } else if self.is_sv() {
            VariantType::Sv
        } else {
            VariantType::Mnp
        }
    }

    /// Finer class within the variant type
    ///
    /// Indels are `del`, `ins` or `unknown`; any bi-allelic indel that is not
    /// a deletion is `ins`. SNPs are `ts` (transition), `tv` (transversion)
    /// or `unknown` when multi-allelic.
    pub fn variant_subtype(&self) -> &'static str {
        match self.variant_type() {
            VariantType::Snp => {
                if self.alternate.len() != 1 {
                    "unknown"
                } else if is_transition(&self.reference, &self.alternate[0]) {
                    "ts"
                } else {
                    "tv"
                }
            }
            VariantType::Indel => {
                if self.is_deletion() {
                    "del"
                } else if self.alternate.len() == 1 {
                    "ins"
                } else {
                    "unknown"
                }
            }
            VariantType::Sv => "sv",
            VariantType::Mnp => "unknown",
        }
    }

    /// Add an INFO field
    pub fn with_info(mut self, key: &str, value: InfoValue) -> Self {
        self.info.insert(key.to_string(), value);
        self
    }

    /// Set TC, TR, WS and WE in one go
    ///
    /// The window defaults to the reference allele's span.
    pub fn with_depths(self, total: i64, per_allele: Vec<i64>) -> Self {
        let (start, end) = (self.pos as i64, self.end_pos() as i64);
        self.with_info(INFO_TOTAL_COVERAGE, InfoValue::Integer(total))
            .with_info(
                INFO_TOTAL_READS,
                InfoValue::IntegerArray(per_allele.into_iter().map(Some).collect()),
            )
            .with_info(INFO_WINDOW_START, InfoValue::Integer(start))
            .with_info(INFO_WINDOW_END, InfoValue::Integer(end))
    }

    /// All integer values of an INFO key
    pub fn info_integers(&self, key: &str) -> Result<Vec<i64>, VepError> {
        let value = self.info.get(key).ok_or_else(|| VepError::MissingInfo {
            location: self.location(),
            key: key.to_string(),
        })?;
        value.as_integers().map_err(|msg| VepError::InvalidInfo {
            location: self.location(),
            key: key.to_string(),
            msg,
        })
    }

    /// The single integer value of an INFO key
    pub fn info_integer(&self, key: &str) -> Result<i64, VepError> {
        let values = self.info_integers(key)?;
        match values.as_slice() {
            [v] => Ok(*v),
            _ => Err(VepError::InvalidInfo {
                location: self.location(),
                key: key.to_string(),
                msg: format!("expected one value, found {}", values.len()),
            }),
        }
    }

    /// Total coverage (TC)
    pub fn total_coverage(&self) -> Result<i64, VepError> {
        self.info_integer(INFO_TOTAL_COVERAGE)
    }

    /// Per-alternate read counts (TR), at least one entry
    pub fn allele_reads(&self) -> Result<Vec<i64>, VepError> {
        let reads = self.info_integers(INFO_TOTAL_READS)?;
        if reads.is_empty() {
            return Err(VepError::InvalidInfo {
                location: self.location(),
                key: INFO_TOTAL_READS.to_string(),
                msg: "no values".to_string(),
            });
        }
        Ok(reads)
    }

    /// Calling window as (WS, WE)
    pub fn window(&self) -> Result<(i64, i64), VepError> {
        Ok((
            self.info_integer(INFO_WINDOW_START)?,
            self.info_integer(INFO_WINDOW_END)?,
        ))
    }
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.id.as_deref().unwrap_or("."),
            self.reference,
            self.alternate.join(","),
            self.quality.map_or(".".to_string(), |q| q.to_string()),
            self.filter.as_deref().unwrap_or("PASS"),
        )?;

        if self.info.is_empty() {
            write!(f, "\t.")?;
        } else {
            let mut keys: Vec<_> = self.info.keys().collect();
            keys.sort();
            let info_str: Vec<String> = keys
                .into_iter()
                .map(|k| match &self.info[k] {
                    InfoValue::Flag => k.clone(),
                    v => format!("{}={}", k, v),
                })
                .collect();
            write!(f, "\t{}", info_str.join(";"))?;
        }

        Ok(())
    }
}
