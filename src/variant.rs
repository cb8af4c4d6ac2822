//! Annotated variant model
//!
//! A [`Variant`] is built once from [`VariantFields`]; the allele frequency,
//! ratio percentage and minor allele frequency are derived at construction
//! and never change afterwards.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::VepError;

/// Variant class reported in the output table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VarType {
    Insertion,
    Deletion,
    /// Indel whose direction could not be determined
    Indel,
    Snp,
    Cnv,
    Unknown,
}

impl VarType {
    /// Label written to the output table
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::Insertion => "insertion",
            VarType::Deletion => "deletion",
            VarType::Indel => "indel",
            VarType::Snp => "SNP",
            VarType::Cnv => "CNV",
            VarType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output column; each names one [`Variant`] field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Chrom,
    Gene,
    Pos,
    Ref,
    Alt,
    Minor,
    Depth,
    AlleleDepth,
    MinorDepth,
    VarType,
    Effect,
    AlleleFreq,
    MinorAlleleFreq,
    RatioPerc,
}

/// Columns of the default report, in order
pub const DEFAULT_COLUMNS: [Column; 10] = [
    Column::Chrom,
    Column::Pos,
    Column::Ref,
    Column::Alt,
    Column::Depth,
    Column::AlleleDepth,
    Column::RatioPerc,
    Column::VarType,
    Column::Effect,
    Column::MinorAlleleFreq,
];

impl Column {
    /// Every column, in field order
    pub const ALL: [Column; 14] = [
        Column::Chrom,
        Column::Gene,
        Column::Pos,
        Column::Ref,
        Column::Alt,
        Column::Minor,
        Column::Depth,
        Column::AlleleDepth,
        Column::MinorDepth,
        Column::VarType,
        Column::Effect,
        Column::AlleleFreq,
        Column::MinorAlleleFreq,
        Column::RatioPerc,
    ];

    /// Header name
    pub fn name(&self) -> &'static str {
        match self {
            Column::Chrom => "chrom",
            Column::Gene => "gene",
            Column::Pos => "pos",
            Column::Ref => "ref",
            Column::Alt => "alt",
            Column::Minor => "minor",
            Column::Depth => "depth",
            Column::AlleleDepth => "allele_depth",
            Column::MinorDepth => "minor_depth",
            Column::VarType => "var_type",
            Column::Effect => "effect",
            Column::AlleleFreq => "allele_freq",
            Column::MinorAlleleFreq => "minor_allele_freq",
            Column::RatioPerc => "ratio_perc",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = VepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s.trim())
            .ok_or_else(|| VepError::Config {
                msg: format!(
                    "unknown column '{}' (expected one of: {})",
                    s,
                    Column::ALL.map(|c| c.name()).join(", ")
                ),
            })
    }
}

/// Observed fields of a variant, before derivation
#[derive(Debug, Clone, PartialEq)]
pub struct VariantFields {
    pub chrom: String,
    pub gene: String,
    pub pos: u64,
    pub reference: String,
    pub alternate: String,
    /// Last alternate of a multi-allelic site, empty otherwise
    pub minor: String,
    pub depth: i64,
    pub allele_depth: i64,
    pub minor_depth: i64,
    pub var_type: VarType,
    pub effect: String,
}

/// An annotated variant with its derived frequencies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    chrom: String,
    gene: String,
    pos: u64,
    reference: String,
    alternate: String,
    minor: String,
    depth: i64,
    allele_depth: i64,
    minor_depth: i64,
    var_type: VarType,
    effect: String,
    allele_freq: f64,
    ratio_perc: f64,
    minor_allele_freq: Option<f64>,
}

impl Variant {
    /// Derive frequencies and build the variant
    ///
    /// * `allele_freq = allele_depth / depth`
    /// * `ratio_perc = allele_depth / (depth - allele_depth - minor_depth) * 100`,
    ///   or `+inf` when the denominator is zero
    /// * `minor_allele_freq = minor_depth / depth` when a minor allele is present
    ///
    /// A zero depth is rejected rather than producing NaN or infinite frequencies.
    pub fn new(fields: VariantFields) -> Result<Self, VepError> {
        let location = format!("{}:{}", fields.chrom, fields.pos);
        if fields.depth == 0 {
            return Err(VepError::ZeroDepth { location });
        }

        let non_finite = |field: &str| VepError::NonFiniteValue {
            location: location.clone(),
            field: field.to_string(),
        };

        let depth = fields.depth as f64;
        let allele_freq = fields.allele_depth as f64 / depth;

        let ref_depth = fields
            .depth
            .checked_sub(fields.allele_depth)
            .and_then(|d| d.checked_sub(fields.minor_depth))
            .ok_or_else(|| non_finite("ratio_perc"))?;
        let ratio_perc = if ref_depth == 0 {
            f64::INFINITY
        } else {
            fields.allele_depth as f64 / ref_depth as f64 * 100.0
        };

        let minor_allele_freq =
            (!fields.minor.is_empty()).then(|| fields.minor_depth as f64 / depth);

        if !allele_freq.is_finite() {
            return Err(non_finite("allele_freq"));
        }
        if ratio_perc.is_nan() {
            return Err(non_finite("ratio_perc"));
        }
        if minor_allele_freq.is_some_and(|f| !f.is_finite()) {
            return Err(non_finite("minor_allele_freq"));
        }

        Ok(Self {
            chrom: fields.chrom,
            gene: fields.gene,
            pos: fields.pos,
            reference: fields.reference,
            alternate: fields.alternate,
            minor: fields.minor,
            depth: fields.depth,
            allele_depth: fields.allele_depth,
            minor_depth: fields.minor_depth,
            var_type: fields.var_type,
            effect: fields.effect,
            allele_freq,
            ratio_perc,
            minor_allele_freq,
        })
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Gene symbol, empty when VEP reported none
    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    /// Minor allele, empty for bi-allelic sites
    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn has_minor(&self) -> bool {
        !self.minor.is_empty()
    }

    pub fn depth(&self) -> i64 {
        self.depth
    }

    pub fn allele_depth(&self) -> i64 {
        self.allele_depth
    }

    pub fn minor_depth(&self) -> i64 {
        self.minor_depth
    }

    pub fn var_type(&self) -> VarType {
        self.var_type
    }

    /// Most severe consequence reported by VEP
    pub fn effect(&self) -> &str {
        &self.effect
    }

    pub fn allele_freq(&self) -> f64 {
        self.allele_freq
    }

    /// May be positive infinity
    pub fn ratio_perc(&self) -> f64 {
        self.ratio_perc
    }

    pub fn minor_allele_freq(&self) -> Option<f64> {
        self.minor_allele_freq
    }

    /// Text of one column
    pub fn field(&self, column: Column) -> String {
        match column {
            Column::Chrom => self.chrom.clone(),
            Column::Gene => self.gene.clone(),
            Column::Pos => self.pos.to_string(),
            Column::Ref => self.reference.clone(),
            Column::Alt => self.alternate.clone(),
            Column::Minor => self.minor.clone(),
            Column::Depth => self.depth.to_string(),
            Column::AlleleDepth => self.allele_depth.to_string(),
            Column::MinorDepth => self.minor_depth.to_string(),
            Column::VarType => self.var_type.to_string(),
            Column::Effect => self.effect.clone(),
            Column::AlleleFreq => format_float(self.allele_freq),
            Column::MinorAlleleFreq => self.minor_allele_freq.map(format_float).unwrap_or_default(),
            Column::RatioPerc => format_float(self.ratio_perc),
        }
    }

    /// Text of each column, in the given order
    pub fn row(&self, columns: &[Column]) -> Vec<String> {
        columns.iter().map(|c| self.field(*c)).collect()
    }
}

/// Shortest round-trip text, always with a fractional part; infinity is `inf`
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(depth: i64, allele_depth: i64, minor: &str, minor_depth: i64) -> VariantFields {
        VariantFields {
            chrom: "1".to_string(),
            gene: "BRCA1".to_string(),
            pos: 100,
            reference: "A".to_string(),
            alternate: "G".to_string(),
            minor: minor.to_string(),
            depth,
            allele_depth,
            minor_depth,
            var_type: VarType::Snp,
            effect: "missense_variant".to_string(),
        }
    }

    #[test]
    fn test_derived_fields() {
        let variant = Variant::new(fields(50, 20, "", 0)).unwrap();
        assert_eq!(variant.allele_freq(), 20.0 / 50.0);
        assert_eq!(variant.ratio_perc(), 20.0 / 30.0 * 100.0);
        assert!(variant.minor_allele_freq().is_none());
        assert!(!variant.has_minor());
    }

    #[test]
    fn test_minor_allele_frequency() {
        let variant = Variant::new(fields(60, 25, "T", 5)).unwrap();
        assert_eq!(variant.minor_allele_freq(), Some(5.0 / 60.0));
        assert_eq!(variant.ratio_perc(), 25.0 / 30.0 * 100.0);
    }

    #[test]
    fn test_minor_depth_without_minor_allele_has_no_frequency() {
        let variant = Variant::new(fields(60, 25, "", 5)).unwrap();
        assert!(variant.minor_allele_freq().is_none());
    }

    #[test]
    fn test_ratio_is_infinite_when_no_reference_reads() {
        let variant = Variant::new(fields(30, 25, "T", 5)).unwrap();
        assert_eq!(variant.ratio_perc(), f64::INFINITY);

        let variant = Variant::new(fields(20, 20, "", 0)).unwrap();
        assert!(variant.ratio_perc().is_infinite());
        assert_eq!(variant.allele_freq(), 1.0);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = Variant::new(fields(0, 0, "", 0)).unwrap_err();
        assert_eq!(
            err,
            VepError::ZeroDepth {
                location: "1:100".to_string()
            }
        );
    }

    #[test]
    fn test_reference_depth_overflow_is_rejected() {
        let err = Variant::new(fields(i64::MIN, 1, "", 0)).unwrap_err();
        assert_eq!(
            err,
            VepError::NonFiniteValue {
                location: "1:100".to_string(),
                field: "ratio_perc".to_string()
            }
        );

        let err = Variant::new(fields(i64::MAX, -1, "T", 0)).unwrap_err();
        assert!(matches!(err, VepError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_default_row() {
        let variant = Variant::new(fields(50, 20, "", 0)).unwrap();
        let row = variant.row(&DEFAULT_COLUMNS);
        assert_eq!(
            row,
            vec![
                "1",
                "100",
                "A",
                "G",
                "50",
                "20",
                &format!("{:?}", 20.0_f64 / 30.0 * 100.0),
                "SNP",
                "missense_variant",
                "",
            ]
        );
        assert!(row[6].starts_with("66.666666666666"));
    }

    #[test]
    fn test_infinite_ratio_renders_as_inf() {
        let variant = Variant::new(fields(20, 20, "", 0)).unwrap();
        assert_eq!(variant.field(Column::RatioPerc), "inf");
        assert_eq!(variant.field(Column::AlleleFreq), "1.0");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.4), "0.4");
        assert_eq!(format_float(100.0), "100.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(column.name().parse::<Column>().unwrap(), column);
        }
        assert!("nonsense".parse::<Column>().is_err());
    }

    #[test]
    fn test_var_type_labels() {
        assert_eq!(VarType::Insertion.to_string(), "insertion");
        assert_eq!(VarType::Deletion.to_string(), "deletion");
        assert_eq!(VarType::Indel.to_string(), "indel");
        assert_eq!(VarType::Snp.to_string(), "SNP");
        assert_eq!(VarType::Cnv.to_string(), "CNV");
        assert_eq!(VarType::Unknown.to_string(), "Unknown");
    }
}
