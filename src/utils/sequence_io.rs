//! Sequence input and the output bank.
//!
//! Input: FASTA/FASTQ readers (plain or gzipped) feeding graph
//! construction. Output: the [`SequenceSink`] seam the detection driver
//! writes finished bubble records through.

use anyhow::{Context, Result};
use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One output record: a comment line and a mixed-case DNA body. Uppercase
/// marks confirmed bubble nodes, lowercase flank extension or closure
/// bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub comment: String,
    pub body: String,
}

/// Destination for finished bubble sequences.
pub trait SequenceSink: Send {
    fn insert(&mut self, record: &SequenceRecord) -> Result<()>;

    /// Flush any buffered state once the sweep is complete.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Buffered FASTA file writer.
pub struct FastaSink {
    writer: BufWriter<File>,
}

impl FastaSink {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create output bank: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl SequenceSink for FastaSink {
    fn insert(&mut self, record: &SequenceRecord) -> Result<()> {
        writeln!(self.writer, ">{}", record.comment)?;
        writeln!(self.writer, "{}", record.body)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory bank for tests and library callers that post-process records.
/// The handle stays readable after the detector has consumed the sink.
#[derive(Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SequenceRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Arc<Mutex<Vec<SequenceRecord>>> {
        Arc::clone(&self.records)
    }
}

impl SequenceSink for MemorySink {
    fn insert(&mut self, record: &SequenceRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Read all sequences of one FASTA or FASTQ file, gzipped or not. The
/// format is taken from the file name.
pub fn read_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<u8>>> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let gzipped = name.ends_with(".gz");
    let stem = name.trim_end_matches(".gz");

    let file =
        File::open(path).with_context(|| format!("failed to open input: {}", path.display()))?;
    let reader: Box<dyn Read> = if gzipped {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let reader = BufReader::new(reader);

    let sequences = if stem.ends_with(".fq") || stem.ends_with(".fastq") {
        read_fastq(reader)?
    } else {
        read_fasta(reader)?
    };
    info!("loaded {} sequence(s) from {}", sequences.len(), path.display());
    Ok(sequences)
}

fn read_fasta<R: Read>(reader: R) -> Result<Vec<Vec<u8>>> {
    let mut sequences = Vec::new();
    for record in fasta::Reader::new(reader).records() {
        let record = record.context("malformed FASTA record")?;
        sequences.push(record.seq().to_vec());
    }
    Ok(sequences)
}

fn read_fastq<R: Read>(reader: R) -> Result<Vec<Vec<u8>>> {
    let mut sequences = Vec::new();
    for record in fastq::Reader::new(reader).records() {
        let record = record.context("malformed FASTQ record")?;
        sequences.push(record.seq().to_vec());
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn reads_fasta_records() {
        let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
        writeln!(file, ">r1\nACGTACGT\n>r2\nTTTTAAAA").unwrap();
        let sequences = read_sequences(file.path()).unwrap();
        assert_eq!(sequences, vec![b"ACGTACGT".to_vec(), b"TTTTAAAA".to_vec()]);
    }

    #[test]
    fn reads_fastq_records() {
        let mut file = tempfile::Builder::new().suffix(".fq").tempfile().unwrap();
        writeln!(file, "@r1\nACGT\n+\nIIII").unwrap();
        let sequences = read_sequences(file.path()).unwrap();
        assert_eq!(sequences, vec![b"ACGT".to_vec()]);
    }

    #[test]
    fn fasta_sink_writes_comment_and_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fa");
        let mut sink = FastaSink::create(&path).unwrap();
        sink.insert(&SequenceRecord {
            comment: "SNP_higher_path_1|high".into(),
            body: "ACGTACGTA".into(),
        })
        .unwrap();
        sink.finish().unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, ">SNP_higher_path_1|high\nACGTACGTA\n");
    }

    #[test]
    fn memory_sink_exposes_records_through_its_handle() {
        let sink = MemorySink::new();
        let handle = sink.handle();
        let mut sink: Box<dyn SequenceSink + Send> = Box::new(sink);
        sink.insert(&SequenceRecord {
            comment: "c".into(),
            body: "ACGT".into(),
        })
        .unwrap();
        assert_eq!(handle.lock().len(), 1);
        assert_eq!(handle.lock()[0].body, "ACGT");
    }
}
