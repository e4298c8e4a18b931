//! Reading alignments with difference strings from PAF files.
//!
//! The PAF format is a text-based format for pairwise alignments, with one
//! alignment per tab-separated line.
//! See the [minimap2 man page](https://lh3.github.io/minimap2/minimap2.html#10)
//! for the field layout and the optional typed fields.
//! Ingestion requires the `cs:Z:` difference string tag, which minimap2
//! emits with `--cs`; the `cg:Z:` CIGAR tag and all other optional fields
//! are ignored.
//!
//! Every record is decoded into mutations, the mutations are deduplicated
//! through the store, and the difference string is regenerated from the
//! stored mutations and compared byte-for-byte to the original.
//! A disagreement means the decoder and the encoder do not round-trip and
//! is always a fatal error.
//!
//! Optionally, every record is also verified against the actual read and
//! contig sequences (see [`crate::verify`]).
//! Verification failures are counted and reported; depending on the
//! parameters they either fail the ingestion immediately or stop it after
//! a threshold.

use crate::alignment::{Alignment, Difference, TypedField};
use crate::formats::Sequences;
use crate::store::AlignmentStore;
use crate::utils;
use crate::verify;

use std::io::BufRead;
use std::path::Path;
use std::str;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Parameters for PAF ingestion.
#[derive(Clone, Debug)]
pub struct PafParams {
    /// Fail the ingestion on the first verification failure.
    pub quit_on_error: bool,
    /// Stop after this many records; `0` means no limit.
    pub max_records: usize,
    /// Stop after this many verification failures.
    pub max_bad_records: usize,
}

impl Default for PafParams {
    fn default() -> Self {
        PafParams {
            quit_on_error: true,
            max_records: 0,
            max_bad_records: 10,
        }
    }
}

/// Counters describing an ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PafSummary {
    /// Number of data lines processed.
    pub lines: usize,
    /// Number of alignments added to the store.
    pub alignments: usize,
    /// Number of mutation references in the added alignments.
    pub mutations: usize,
    /// Number of records skipped for unsupported difference string operations.
    pub skipped_records: usize,
    /// Number of records that failed verification.
    pub bad_records: usize,
}

/// The sequences needed for verifying alignments.
pub struct VerificationData {
    /// Read sequences by id.
    pub reads: Sequences,
    /// Contig sequences by id.
    pub contigs: Sequences,
}

//-----------------------------------------------------------------------------

// Number of mandatory fields in a PAF line.
const MANDATORY_FIELDS: usize = 12;

// Progress report interval in lines.
const PROGRESS_INTERVAL: usize = 10000;

// A parsed PAF record before it is turned into an alignment.
struct PafRecord {
    read_id: String,
    read_len: u32,
    read_start: u32,
    read_end: u32,
    is_reverse: bool,
    contig_id: String,
    contig_len: u32,
    contig_start: u32,
    contig_end: u32,
    cs: Vec<u8>,
}

fn parse_string(field: &[u8], line_num: usize, field_name: &str) -> Result<String, String> {
    if field.is_empty() {
        return Err(format!("Line {}: empty {}", line_num, field_name));
    }
    String::from_utf8(field.to_vec()).map_err(|err| {
        format!("Line {}: invalid {}: {}", line_num, field_name, err)
    })
}

fn parse_u32(field: &[u8], line_num: usize, field_name: &str) -> Result<u32, String> {
    let number = str::from_utf8(field).map_err(|err| {
        format!("Line {}: invalid {}: {}", line_num, field_name, err)
    })?;
    number.parse().map_err(|err| {
        format!("Line {}: invalid {}: {}", line_num, field_name, err)
    })
}

fn parse_strand(field: &[u8], line_num: usize) -> Result<bool, String> {
    match field {
        b"+" => Ok(false),
        b"-" => Ok(true),
        _ => Err(format!("Line {}: invalid strand: {}", line_num, String::from_utf8_lossy(field))),
    }
}

// Parses a PAF line into a record, including the difference string.
fn parse_record(line: &[u8], line_num: usize) -> Result<PafRecord, String> {
    let fields: Vec<&[u8]> = line.split(|&c| c == b'\t').collect();
    if fields.len() < MANDATORY_FIELDS {
        return Err(format!(
            "Line {}: PAF line with fewer than {} fields", line_num, MANDATORY_FIELDS
        ));
    }

    let read_id = parse_string(fields[0], line_num, "read id")?;
    let read_len = parse_u32(fields[1], line_num, "read length")?;
    let read_start = parse_u32(fields[2], line_num, "read start")?;
    let read_end = parse_u32(fields[3], line_num, "read end")?;
    let is_reverse = parse_strand(fields[4], line_num)?;
    let contig_id = parse_string(fields[5], line_num, "contig id")?;
    let contig_len = parse_u32(fields[6], line_num, "contig length")?;
    let contig_start = parse_u32(fields[7], line_num, "contig start")?;
    let contig_end = parse_u32(fields[8], line_num, "contig end")?;

    if read_end <= read_start {
        return Err(format!(
            "Line {}: invalid read coordinates: end ({}) <= start ({})",
            line_num, read_end, read_start
        ));
    }
    if contig_end <= contig_start {
        return Err(format!(
            "Line {}: invalid contig coordinates: end ({}) <= start ({})",
            line_num, contig_end, contig_start
        ));
    }

    // Scan the optional fields for the difference string.
    // Fields that cannot be parsed or are of unsupported types are ignored.
    let mut cs: Option<Vec<u8>> = None;
    for field in fields[MANDATORY_FIELDS..].iter() {
        if let Ok(TypedField::String([b'c', b's'], value)) = TypedField::parse(field) {
            if cs.is_some() {
                return Err(format!("Line {}: multiple cs fields", line_num));
            }
            cs = Some(value);
        }
    }
    let cs = cs.ok_or(format!("Line {}: no cs field", line_num))?;

    Ok(PafRecord {
        read_id, read_len, read_start, read_end,
        is_reverse,
        contig_id, contig_len, contig_start, contig_end,
        cs,
    })
}

//-----------------------------------------------------------------------------

// Splits a difference string into its operations, without interpreting them.
fn split_ops(difference_string: &[u8]) -> Vec<String> {
    let mut result = Vec::new();
    let mut start = None;
    for (offset, c) in difference_string.iter().enumerate() {
        if b":*+-=~".contains(c) {
            if let Some(start) = start {
                result.push(String::from_utf8_lossy(&difference_string[start..offset]).into_owned());
            }
            start = Some(offset);
        }
    }
    if let Some(start) = start {
        result.push(String::from_utf8_lossy(&difference_string[start..]).into_owned());
    }
    result
}

// An operation-by-operation comparison of the original and the regenerated
// difference string, for diagnosing round-trip failures.
fn cs_diff_report(original: &[u8], generated: &str) -> String {
    let original_ops = split_ops(original);
    let generated_ops = split_ops(generated.as_bytes());
    let mut result = String::from("idx\toriginal\tgenerated\n");
    for i in 0..original_ops.len().max(generated_ops.len()) {
        let original_op = original_ops.get(i).map_or("", |op| op.as_str());
        let generated_op = generated_ops.get(i).map_or("", |op| op.as_str());
        result.push_str(&format!("{}\t{}\t{}\n", i, original_op, generated_op));
    }
    result
}

//-----------------------------------------------------------------------------

/// Reads a PAF file into the store.
///
/// The file may be gzip-compressed.
/// If `verification` is given, every record is verified against the
/// sequences (see [`crate::verify::verify_alignment`]); records that fail
/// are counted and left out of the store.
/// With `quit_on_error`, the first failure fails the ingestion; otherwise
/// ingestion stops once [`PafParams::max_bad_records`] records have failed.
///
/// Records whose difference string contains unsupported operations (`=` or
/// `~`) are skipped with a log line.
/// A record whose regenerated difference string does not match the original
/// is always a fatal error.
pub fn read_paf<P: AsRef<Path>>(
    filename: P,
    store: &mut AlignmentStore,
    verification: Option<&VerificationData>,
    params: &PafParams,
) -> Result<PafSummary, String> {
    let mut reader = utils::open_file(&filename)?;
    let mut summary = PafSummary::default();

    let mut buf: Vec<u8> = Vec::new();
    let mut line_num = 0;
    loop {
        buf.clear();
        let len = reader.read_until(b'\n', &mut buf).map_err(|x| x.to_string())?;
        if len == 0 {
            break;
        }
        line_num += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.is_empty() {
            continue;
        }

        if params.max_records != 0 && summary.lines == params.max_records {
            break;
        }
        summary.lines += 1;
        if summary.lines % PROGRESS_INTERVAL == 0 {
            eprintln!("Processed {} records", summary.lines);
        }

        let record = parse_record(&buf, line_num)?;
        let read_index = store.add_or_get_read(&record.read_id, record.read_len) as u32;
        let contig_index = store.add_or_get_contig(&record.contig_id, record.contig_len) as u32;

        // Unsupported operations: skip the record, keep going.
        if let Some(op) = Difference::unsupported_op(&record.cs) {
            eprintln!(
                "Line {}: skipping read {}: unsupported difference string operation {}",
                line_num, record.read_id, op as char
            );
            summary.skipped_records += 1;
            continue;
        }

        let ops = Difference::parse(&record.cs).map_err(|x| format!("Line {}: {}", line_num, x))?;
        let (query_len, target_len, _, _) = Difference::stats(&ops);
        if target_len as u32 != record.contig_end - record.contig_start {
            return Err(format!(
                "Line {}: difference string covers {} bp of a {} bp contig interval",
                line_num, target_len, record.contig_end - record.contig_start
            ));
        }
        if query_len as u32 != record.read_end - record.read_start {
            return Err(format!(
                "Line {}: difference string covers {} bp of a {} bp read interval",
                line_num, query_len, record.read_end - record.read_start
            ));
        }

        let mut mutations = Vec::new();
        for mutation in Difference::to_mutations(&ops, record.contig_start) {
            if mutation.position >= record.contig_end {
                return Err(format!(
                    "Line {}: mutation at {} outside the contig interval", line_num, mutation.position
                ));
            }
            mutations.push(store.add_mutation(contig_index, mutation)?);
        }

        let aln = Alignment {
            read_index, contig_index,
            read_start: record.read_start, read_end: record.read_end,
            contig_start: record.contig_start, contig_end: record.contig_end,
            is_reverse: record.is_reverse,
            mutations,
        };

        // The stored mutations must regenerate the original difference
        // string exactly.
        let generated = store.cs_tag(&aln);
        if generated.as_bytes() != record.cs.as_slice() {
            return Err(format!(
                "Line {}: difference string round trip failed\noriginal : {}\ngenerated: {}\n{}",
                line_num,
                String::from_utf8_lossy(&record.cs), generated,
                cs_diff_report(&record.cs, &generated)
            ));
        }

        if let Some(data) = verification {
            if let Err(reason) = verify::verify_alignment(store, &aln, &data.reads, &data.contigs) {
                summary.bad_records += 1;
                eprintln!("Line {}: verification failed: {}", line_num, reason);
                if params.quit_on_error {
                    return Err(format!("Line {}: verification failed: {}", line_num, reason));
                }
                if summary.bad_records >= params.max_bad_records {
                    eprintln!("Reached {} bad records, stopping", summary.bad_records);
                    break;
                }
                continue;
            }
        }

        summary.mutations += aln.mutations.len();
        store.add_alignment(aln);
        summary.alignments += 1;
    }

    eprintln!(
        "Read {} alignments with {} mutation references from {} records",
        summary.alignments, summary.mutations, summary.lines
    );
    if summary.skipped_records > 0 {
        eprintln!("Skipped {} records with unsupported operations", summary.skipped_records);
    }
    if summary.bad_records > 0 {
        eprintln!("{} records failed verification", summary.bad_records);
    }

    Ok(summary)
}

//-----------------------------------------------------------------------------
