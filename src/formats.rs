//! Support for reading and writing the text formats around the store.
//!
//! ### FASTA / FASTQ
//!
//! Sequence files are used during ingestion when alignments are verified
//! against the actual reads and contigs.
//! The readers return a mapping from sequence id to bases and accept an
//! optional id filter, so only the sequences the verifier needs are kept in
//! memory.
//! Files may be gzip-compressed; [`crate::utils::open_file`] handles the
//! decompression transparently.
//! [`sniff_file_type`] determines the format from the first byte of the
//! (decompressed) stream, and [`read_sequence_file`] dispatches on it.
//!
//! The writers exist mostly for building test inputs.
//! [`write_fastq`] emits placeholder quality values, as the store does not
//! keep qualities.
//!
//! ### Interval tables
//!
//! Query intervals are read from a tab-separated table with the mandatory
//! header line `contig<TAB>start<TAB>end`.
//! The coordinates are 0-based and half-open; [`read_intervals_1based`]
//! accepts the 1-based closed convention used by some embeddings and
//! converts on the fly.

use crate::alignment::Interval;
use crate::utils;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;


//-----------------------------------------------------------------------------

/// A mapping from sequence id to bases.
pub type Sequences = HashMap<String, Vec<u8>>;

/// Type of a sequence file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// FASTA: `>` header lines followed by sequence lines.
    Fasta,
    /// FASTQ: four-line records starting with `@`.
    Fastq,
}

/// Determines the type of the sequence file from its first byte.
///
/// Returns an error if the file cannot be opened, is empty, or starts with
/// something else than a FASTA or FASTQ header.
pub fn sniff_file_type<P: AsRef<Path>>(filename: P) -> Result<FileType, String> {
    let mut reader = utils::open_file(&filename)?;
    let buf = reader.fill_buf().map_err(|x| x.to_string())?;
    match buf.first() {
        Some(b'>') => Ok(FileType::Fasta),
        Some(b'@') => Ok(FileType::Fastq),
        Some(c) => Err(format!(
            "Unknown sequence file format in {} (first byte {})",
            filename.as_ref().display(), *c as char
        )),
        None => Err(format!("Empty sequence file: {}", filename.as_ref().display())),
    }
}

// The sequence id is the first whitespace-delimited token of the header.
fn header_to_id(header: &str) -> String {
    header.split_ascii_whitespace().next().unwrap_or("").to_string()
}

fn wanted(id: &str, ids: Option<&HashSet<String>>) -> bool {
    ids.map_or(true, |set| set.contains(id))
}

/// Reads a FASTA file and returns a mapping from sequence id to bases.
///
/// If `ids` is given, only the listed sequences are kept.
/// The id is the first whitespace-delimited token of the header line.
/// The file may be gzip-compressed.
pub fn read_fasta<P: AsRef<Path>>(filename: P, ids: Option<&HashSet<String>>) -> Result<Sequences, String> {
    let reader = utils::open_file(&filename)?;
    let mut result = Sequences::new();
    let mut id = String::new();
    let mut sequence: Vec<u8> = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|x| x.to_string())?;
        if let Some(header) = line.strip_prefix('>') {
            if !id.is_empty() && wanted(&id, ids) {
                result.insert(std::mem::take(&mut id), std::mem::take(&mut sequence));
            }
            id = header_to_id(header);
            if id.is_empty() {
                return Err(format!("Line {}: FASTA header without a sequence id", line_num + 1));
            }
            sequence = Vec::new();
        } else if id.is_empty() {
            return Err(format!("Line {}: sequence data before the first FASTA header", line_num + 1));
        } else {
            sequence.extend_from_slice(line.trim_end().as_bytes());
        }
    }
    if !id.is_empty() && wanted(&id, ids) {
        result.insert(id, sequence);
    }

    Ok(result)
}

/// Reads a FASTQ file and returns a mapping from sequence id to bases.
///
/// If `ids` is given, only the listed sequences are kept.
/// The id is the first whitespace-delimited token of the header line.
/// The file may be gzip-compressed.
/// Quality values are discarded.
pub fn read_fastq<P: AsRef<Path>>(filename: P, ids: Option<&HashSet<String>>) -> Result<Sequences, String> {
    let reader = utils::open_file(&filename)?;
    let mut result = Sequences::new();

    let mut lines = reader.lines().enumerate();
    while let Some((line_num, line)) = lines.next() {
        let line = line.map_err(|x| x.to_string())?;
        if line.is_empty() {
            continue;
        }
        let header = line.strip_prefix('@').ok_or(format!(
            "Line {}: expected a FASTQ header, got: {}", line_num + 1, line
        ))?;
        let id = header_to_id(header);
        let mut record_line = || -> Result<String, String> {
            let (num, line) = lines.next().ok_or(
                format!("Truncated FASTQ record for sequence {}", id)
            )?;
            let line = line.map_err(|x| format!("Line {}: {}", num + 1, x))?;
            Ok(line)
        };

        let sequence = record_line()?;
        let separator = record_line()?;
        if !separator.starts_with('+') {
            return Err(format!("Missing + separator for FASTQ sequence {}", id));
        }
        let quality = record_line()?;
        if quality.len() != sequence.len() {
            return Err(format!("Quality length mismatch for FASTQ sequence {}", id));
        }

        if wanted(&id, ids) {
            result.insert(id, sequence.into_bytes());
        }
    }

    Ok(result)
}

/// Reads a FASTA or FASTQ file, determining the format from the content.
///
/// This is the `id -> bases` collaborator interface the verifier consumes.
pub fn read_sequence_file<P: AsRef<Path>>(filename: P, ids: Option<&HashSet<String>>) -> Result<Sequences, String> {
    match sniff_file_type(&filename)? {
        FileType::Fasta => read_fasta(&filename, ids),
        FileType::Fastq => read_fastq(&filename, ids),
    }
}

//-----------------------------------------------------------------------------

/// Writes the sequences in FASTA format, in ascending order by id.
pub fn write_fasta<W: Write>(writer: &mut W, sequences: &Sequences) -> io::Result<()> {
    let mut ids: Vec<&String> = sequences.keys().collect();
    ids.sort();
    for id in ids {
        writer.write_all(b">")?;
        writer.write_all(id.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.write_all(&sequences[id])?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes the sequences in FASTQ format with placeholder qualities, in
/// ascending order by id.
pub fn write_fastq<W: Write>(writer: &mut W, sequences: &Sequences) -> io::Result<()> {
    let mut ids: Vec<&String> = sequences.keys().collect();
    ids.sort();
    for id in ids {
        let sequence = &sequences[id];
        writer.write_all(b"@")?;
        writer.write_all(id.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.write_all(sequence)?;
        writer.write_all(b"\n+\n")?;
        writer.write_all(&vec![b'I'; sequence.len()])?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes the sequences to a FASTA file.
pub fn save_fasta<P: AsRef<Path>>(filename: P, sequences: &Sequences) -> Result<(), String> {
    let file = File::create(&filename).map_err(|x| {
        format!("Failed to create {}: {}", filename.as_ref().display(), x)
    })?;
    let mut writer = BufWriter::new(file);
    write_fasta(&mut writer, sequences).map_err(|x| x.to_string())?;
    writer.flush().map_err(|x| x.to_string())
}

/// Writes the sequences to a FASTQ file.
pub fn save_fastq<P: AsRef<Path>>(filename: P, sequences: &Sequences) -> Result<(), String> {
    let file = File::create(&filename).map_err(|x| {
        format!("Failed to create {}: {}", filename.as_ref().display(), x)
    })?;
    let mut writer = BufWriter::new(file);
    write_fastq(&mut writer, sequences).map_err(|x| x.to_string())?;
    writer.flush().map_err(|x| x.to_string())
}

//-----------------------------------------------------------------------------

// The mandatory header line of an interval table.
const INTERVALS_HEADER: &str = "contig\tstart\tend";

/// Parses an interval table from the given reader.
///
/// The table is tab-separated with the mandatory header line
/// `contig<TAB>start<TAB>end` and one interval per following line.
/// Coordinates are 0-based and half-open.
pub fn parse_intervals<R: BufRead>(reader: R) -> Result<Vec<Interval>, String> {
    let mut lines = reader.lines();
    let header = lines.next().ok_or(String::from("Empty interval table"))?
        .map_err(|x| x.to_string())?;
    if header.trim_end_matches(['\r']) != INTERVALS_HEADER {
        return Err(format!("Invalid interval table header: expected '{}'", INTERVALS_HEADER.replace('\t', "\\t")));
    }

    let mut result = Vec::new();
    for (line_num, line) in lines.enumerate() {
        let line = line.map_err(|x| x.to_string())?;
        let line = line.trim_end_matches(['\r']);
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(format!("Line {}: expected 3 fields, got {}", line_num + 2, fields.len()));
        }
        let start = fields[1].parse::<u32>().map_err(|x| {
            format!("Line {}: invalid interval start: {}", line_num + 2, x)
        })?;
        let end = fields[2].parse::<u32>().map_err(|x| {
            format!("Line {}: invalid interval end: {}", line_num + 2, x)
        })?;
        result.push(Interval::new(fields[0], start, end));
    }

    Ok(result)
}

/// Reads an interval table from the given file, which may be
/// gzip-compressed.
pub fn read_intervals<P: AsRef<Path>>(filename: P) -> Result<Vec<Interval>, String> {
    let reader = utils::open_file(&filename)?;
    parse_intervals(reader)
}

/// Reads an interval table with 1-based closed coordinates and converts
/// them to the internal 0-based half-open convention.
///
/// An interval with `start == 0` is rejected.
pub fn read_intervals_1based<P: AsRef<Path>>(filename: P) -> Result<Vec<Interval>, String> {
    let intervals = read_intervals(filename)?;
    let mut result = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if interval.start == 0 {
            return Err(format!("Interval {} is not 1-based", interval));
        }
        result.push(Interval::new(&interval.contig, interval.start - 1, interval.end));
    }
    Ok(result)
}

//-----------------------------------------------------------------------------
