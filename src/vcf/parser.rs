//! VCF file parsing using noodles-vcf
//!
//! This module turns VCF text (plain or gzip/BGZF-compressed) into a lazy,
//! single-pass stream of [`VcfRecord`] values.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles_vcf as nvcf;
use nvcf::variant::record::{AlternateBases, Filters, Ids};

use crate::error::VepError;

use super::record::{InfoValue, VcfRecord, MISSING_ALLELE};

/// A parsed VCF file header
#[derive(Debug, Clone)]
pub struct VcfHeader {
    /// Contigs defined in the header (##contig lines)
    pub contigs: Vec<String>,
    inner: nvcf::Header,
}

impl VcfHeader {
    /// Check if an INFO key is declared in the header
    pub fn has_info(&self, key: &str) -> bool {
        self.inner.infos().contains_key(key)
    }
}

/// VCF file reader that yields VcfRecord instances
pub struct VcfReader<R> {
    inner: nvcf::io::Reader<R>,
    header: VcfHeader,
}

impl<R: BufRead> VcfReader<R> {
    /// Create a new VCF reader from a buffered reader
    pub fn new(reader: R) -> Result<Self, VepError> {
        let mut inner = nvcf::io::Reader::new(reader);
        let noodles_header = inner.read_header().map_err(|e| VepError::Io {
            msg: format!("Failed to parse VCF header: {}", e),
        })?;

        // Extract contig names
        let contigs: Vec<String> = noodles_header
            .contigs()
            .keys()
            .map(|k| k.to_string())
            .collect();

        let header = VcfHeader {
            contigs,
            inner: noodles_header,
        };

        Ok(Self { inner, header })
    }

    /// Get a reference to the parsed header
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Read the next VCF record
    pub fn read_record(&mut self) -> Result<Option<VcfRecord>, VepError> {
        let mut record = nvcf::variant::RecordBuf::default();

        match self.inner.read_record_buf(&self.header.inner, &mut record) {
            Ok(0) => Ok(None),
            Ok(_) => convert_record(&record, &self.header).map(Some),
            Err(e) => Err(VepError::Io {
                msg: format!("Failed to parse VCF record: {}", e),
            }),
        }
    }

    /// Iterate over all records in the VCF file
    pub fn records(self) -> VcfRecordIterator<R> {
        VcfRecordIterator {
            reader: self,
            done: false,
        }
    }
}

/// Open a VCF file from a path
///
/// Files ending in `.gz` or `.bgz` are decompressed on the fly.
pub fn open_vcf<P: AsRef<Path>>(path: P) -> Result<VcfReader<Box<dyn BufRead>>, VepError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| VepError::Io {
        msg: format!("Failed to open VCF file {}: {}", path.display(), e),
    })?;

    let compressed = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "gz" || e == "bgz");

    let reader: Box<dyn BufRead> = if compressed {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    VcfReader::new(reader)
}

/// Parse VCF from a string
pub fn parse_vcf_string(vcf_content: &str) -> Result<VcfReader<BufReader<&[u8]>>, VepError> {
    VcfReader::new(BufReader::new(vcf_content.as_bytes()))
}

/// Iterator over VCF records
///
/// Stops after the first error.
pub struct VcfRecordIterator<R> {
    reader: VcfReader<R>,
    done: bool,
}

impl<R: BufRead> Iterator for VcfRecordIterator<R> {
    type Item = Result<VcfRecord, VepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Convert a noodles VCF record to our VcfRecord type
fn convert_record(
    record: &nvcf::variant::RecordBuf,
    header: &VcfHeader,
) -> Result<VcfRecord, VepError> {
    // Chromosome
    let chrom = record.reference_sequence_name().to_string();

    // Position (noodles uses 1-based positions)
    let pos = record
        .variant_start()
        .map(|p| p.get() as u64)
        .ok_or_else(|| VepError::Io {
            msg: format!("Missing position in VCF record on {}", chrom),
        })?;

    // ID field
    let id = {
        let ids = record.ids();
        if ids.is_empty() {
            None
        } else {
            Some(
                ids.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(";"),
            )
        }
    };

    // Reference allele
    let reference = record.reference_bases().to_string();

    // Alternate alleles; an empty ALT column becomes a single missing allele
    let mut alternate: Vec<String> = record
        .alternate_bases()
        .iter()
        .map(|a| match a {
            Ok(allele) => allele.to_string(),
            Err(_) => MISSING_ALLELE.to_string(),
        })
        .collect();
    if alternate.is_empty() {
        alternate.push(MISSING_ALLELE.to_string());
    }

    // Quality score
    let quality = record.quality_score();

    // Filter
    let filter = {
        let filters = record.filters();
        if filters.is_pass() {
            None
        } else {
            let filter_strs: Vec<_> = filters
                .iter(&header.inner)
                .filter_map(|f| f.ok())
                .map(|filter| filter.to_string())
                .collect();
            if filter_strs.is_empty() {
                None
            } else {
                Some(filter_strs.join(";"))
            }
        }
    };

    // INFO fields - use the RecordBuf's typed info field directly
    let mut info = std::collections::HashMap::new();
    for (key, value) in record.info().as_ref() {
        let info_value = match value {
            Some(v) => convert_info_value(v),
            None => InfoValue::Flag,
        };
        info.insert(key.to_string(), info_value);
    }

    Ok(VcfRecord {
        chrom,
        pos,
        id,
        reference,
        alternate,
        quality,
        filter,
        info,
    })
}

/// Convert a noodles INFO value to our InfoValue type
fn convert_info_value(value: &nvcf::variant::record_buf::info::field::Value) -> InfoValue {
    use nvcf::variant::record_buf::info::field::value::Array;
    use nvcf::variant::record_buf::info::field::Value;

    match value {
        Value::Integer(v) => InfoValue::Integer(*v as i64),
        Value::Float(v) => InfoValue::Float(*v as f64),
        Value::Flag => InfoValue::Flag,
        Value::Character(v) => InfoValue::Character(*v),
        Value::String(v) => InfoValue::String(v.clone()),
        // Array elements keep their positions; "." stays a missing entry
        Value::Array(Array::Integer(vals)) => {
            InfoValue::IntegerArray(vals.iter().map(|v| v.map(|i| i as i64)).collect())
        }
        Value::Array(Array::Float(vals)) => {
            InfoValue::FloatArray(vals.iter().map(|v| v.map(|f| f as f64)).collect())
        }
        Value::Array(Array::Character(vals)) => InfoValue::StringArray(
            vals.iter()
                .map(|v| v.map_or(MISSING_ALLELE.to_string(), |c| c.to_string()))
                .collect(),
        ),
        Value::Array(Array::String(vals)) => InfoValue::StringArray(
            vals.iter()
                .map(|v| v.clone().unwrap_or_else(|| MISSING_ALLELE.to_string()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcf::VariantType;
    use std::io::Write;

    const PLATYPUS_VCF: &str = "##fileformat=VCFv4.1
##contig=<ID=1,length=249250621>
##INFO=<ID=TC,Number=1,Type=Integer,Description=\"Total coverage at this locus\">
##INFO=<ID=TR,Number=.,Type=Integer,Description=\"Total number of reads containing this variant\">
##INFO=<ID=WS,Number=1,Type=Integer,Description=\"Starting position of calling window\">
##INFO=<ID=WE,Number=1,Type=Integer,Description=\"End position of calling window\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\t100\trs123\tA\tG\t30\tPASS\tTC=50;TR=20;WS=90;WE=110
1\t200\t.\tAT\tA\t20\t.\tTC=40;TR=10;WS=190;WE=210
1\t300\t.\tA\tG,T\t40\tPASS\tTC=60;TR=25,5;WS=290;WE=310
";

    #[test]
    fn test_parse_vcf_string() {
        let reader = parse_vcf_string(PLATYPUS_VCF).unwrap();
        assert_eq!(reader.header().contigs, vec!["1"]);
        assert!(reader.header().has_info("TC"));
        assert!(!reader.header().has_info("SVTYPE"));
    }

    #[test]
    fn test_read_records() {
        let mut reader = parse_vcf_string(PLATYPUS_VCF).unwrap();

        let snp = reader.read_record().unwrap().unwrap();
        assert_eq!(snp.chrom, "1");
        assert_eq!(snp.pos, 100);
        assert_eq!(snp.id, Some("rs123".to_string()));
        assert_eq!(snp.reference, "A");
        assert_eq!(snp.alternate, vec!["G"]);
        assert_eq!(snp.variant_type(), VariantType::Snp);
        assert_eq!(snp.total_coverage().unwrap(), 50);
        assert_eq!(snp.allele_reads().unwrap(), vec![20]);
        assert_eq!(snp.window().unwrap(), (90, 110));

        let del = reader.read_record().unwrap().unwrap();
        assert_eq!(del.pos, 200);
        assert!(del.is_deletion());
        assert_eq!(del.variant_subtype(), "del");

        let multi = reader.read_record().unwrap().unwrap();
        assert!(multi.is_multiallelic());
        assert_eq!(multi.allele_reads().unwrap(), vec![25, 5]);

        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_missing_read_count_keeps_position() {
        let vcf = PLATYPUS_VCF.replace("TR=25,5", "TR=.,5");
        let multi = parse_vcf_string(&vcf)
            .unwrap()
            .records()
            .nth(2)
            .unwrap()
            .unwrap();

        assert_eq!(multi.info["TR"], InfoValue::IntegerArray(vec![None, Some(5)]));
        assert!(matches!(
            multi.allele_reads(),
            Err(VepError::InvalidInfo { ref key, .. }) if key == "TR"
        ));
    }

    #[test]
    fn test_records_iterator() {
        let reader = parse_vcf_string(PLATYPUS_VCF).unwrap();
        let records: Vec<_> = reader.records().collect();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_malformed_record_stops_iteration() {
        let vcf = "##fileformat=VCFv4.1
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
1\tnotanumber\t.\tA\tG\t.\t.\t.
1\t100\t.\tA\tG\t.\t.\t.
";
        let records: Vec<_> = parse_vcf_string(vcf).unwrap().records().collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_err());
    }

    #[test]
    fn test_open_gzipped_vcf() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.vcf.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(PLATYPUS_VCF.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let records: Vec<_> = open_vcf(&path)
            .unwrap()
            .records()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_open_missing_file() {
        let result = open_vcf("/definitely/not/here.vcf");
        assert!(matches!(result, Err(VepError::Io { .. })));
    }
}
