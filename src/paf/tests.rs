use super::*;

use crate::alignment::{Interval, Mutation, MutationType};

use std::fs;
use std::path::PathBuf;

//-----------------------------------------------------------------------------

// Builds a PAF line with the given fields and a couple of typical optional
// fields around the difference string.
fn paf_line(
    read: &str, read_len: u32, read_range: (u32, u32), strand: char,
    contig: &str, contig_len: u32, contig_range: (u32, u32), cs: &str,
) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\ttp:A:P\tcm:i:12\tcs:Z:{}",
        read, read_len, read_range.0, read_range.1, strand,
        contig, contig_len, contig_range.0, contig_range.1,
        read_range.1.wrapping_sub(read_range.0), contig_range.1.wrapping_sub(contig_range.0), 60, cs
    )
}

fn write_paf(lines: &[String]) -> PathBuf {
    let filename = crate::utils::temp_file_name("paf");
    fs::write(&filename, lines.join("\n") + "\n").unwrap();
    filename
}

fn ingest(lines: &[String], params: &PafParams) -> (AlignmentStore, PafSummary) {
    let filename = write_paf(lines);
    let mut store = AlignmentStore::new();
    let summary = read_paf(&filename, &mut store, None, params);
    fs::remove_file(&filename).unwrap();
    assert!(summary.is_ok(), "Ingestion failed: {}", summary.unwrap_err());
    (store, summary.unwrap())
}

fn ingest_fails(lines: &[String]) -> String {
    let filename = write_paf(lines);
    let mut store = AlignmentStore::new();
    let result = read_paf(&filename, &mut store, None, &PafParams::default());
    fs::remove_file(&filename).unwrap();
    assert!(result.is_err(), "Ingestion of an invalid file succeeded");
    result.unwrap_err()
}

fn verification_data() -> VerificationData {
    let mut reads = Sequences::new();
    reads.insert(String::from("R1"), b"TGATTACACC".to_vec());
    let mut contigs = Sequences::new();
    contigs.insert(String::from("C"), b"CCGATTACAGG".to_vec());
    VerificationData { reads, contigs }
}

//-----------------------------------------------------------------------------

#[test]
fn single_record() {
    let lines = vec![
        paf_line("R", 8, (0, 8), '+', "C", 20, (5, 13), ":3*at+gg-cc:2"),
    ];
    let (store, summary) = ingest(&lines, &PafParams::default());

    assert_eq!(summary, PafSummary {
        lines: 1, alignments: 1, mutations: 3,
        skipped_records: 0, bad_records: 0,
    });
    assert_eq!(store.num_reads(), 1);
    assert_eq!(store.num_contigs(), 1);
    assert_eq!(store.num_alignments(), 1);
    assert_eq!(store.read(0).length, 8);
    assert_eq!(store.contig(0).length, 20);

    let aln = store.alignment(0);
    assert_eq!((aln.read_start, aln.read_end), (0, 8));
    assert_eq!((aln.contig_start, aln.contig_end), (5, 13));
    assert!(!aln.is_reverse);
    assert_eq!(store.mutation(0, aln.mutations[0]), &Mutation::new(MutationType::Substitution, 8, "AT"));
    assert_eq!(store.mutation(0, aln.mutations[1]), &Mutation::new(MutationType::Insertion, 9, "GG"));
    assert_eq!(store.mutation(0, aln.mutations[2]), &Mutation::new(MutationType::Deletion, 9, "CC"));
    assert_eq!(store.cs_tag(aln), ":3*at+gg-cc:2", "Wrong regenerated difference string");
}

#[test]
fn reverse_strand_record() {
    let lines = vec![
        paf_line("R", 20, (2, 10), '-', "C", 30, (10, 18), ":8"),
    ];
    let (store, _) = ingest(&lines, &PafParams::default());
    assert!(store.alignment(0).is_reverse, "The strand flag was not parsed");
}

#[test]
fn mutations_are_deduplicated() {
    let lines = vec![
        paf_line("R1", 10, (0, 10), '+', "C", 100, (10, 20), ":2*ac:7"),
        paf_line("R2", 10, (0, 10), '+', "C", 100, (12, 22), "*ac:9"),
    ];
    let (store, summary) = ingest(&lines, &PafParams::default());
    assert_eq!(summary.alignments, 2);
    assert_eq!(summary.mutations, 2, "Wrong number of mutation references");
    assert_eq!(store.num_mutations(), 1, "The shared substitution was not deduplicated");
    assert_eq!(store.alignment(0).mutations, store.alignment(1).mutations);
}

#[test]
fn interning_reuses_ids() {
    let lines = vec![
        paf_line("R1", 10, (0, 10), '+', "C", 100, (10, 20), ":10"),
        paf_line("R1", 10, (0, 10), '+', "C", 100, (30, 40), ":10"),
    ];
    let (store, _) = ingest(&lines, &PafParams::default());
    assert_eq!(store.num_reads(), 1, "The read was interned twice");
    assert_eq!(store.num_contigs(), 1, "The contig was interned twice");
}

#[test]
fn unsupported_ops_skip_the_record() {
    let lines = vec![
        paf_line("R1", 10, (0, 10), '+', "C", 100, (10, 20), ":3=acgtacg"),
        paf_line("R2", 10, (0, 10), '+', "C", 100, (30, 40), ":10"),
        paf_line("R3", 10, (0, 10), '+', "C", 100, (50, 60), ":2~gt6ag"),
    ];
    let (store, summary) = ingest(&lines, &PafParams::default());
    assert_eq!(summary.skipped_records, 2, "Wrong number of skipped records");
    assert_eq!(summary.alignments, 1, "Wrong number of ingested alignments");
    assert_eq!(store.num_alignments(), 1);
    assert_eq!(store.read_id(store.alignment(0).read_index as usize), "R2");
    // Skipped records still intern their read.
    assert_eq!(store.num_reads(), 3);
}

#[test]
fn max_records_cap() {
    let lines = vec![
        paf_line("R1", 10, (0, 10), '+', "C", 100, (10, 20), ":10"),
        paf_line("R2", 10, (0, 10), '+', "C", 100, (20, 30), ":10"),
        paf_line("R3", 10, (0, 10), '+', "C", 100, (30, 40), ":10"),
    ];
    let params = PafParams { max_records: 2, ..PafParams::default() };
    let (store, summary) = ingest(&lines, &params);
    assert_eq!(summary.lines, 2, "Wrong number of processed lines");
    assert_eq!(store.num_alignments(), 2);
}

#[test]
fn blank_lines_are_ignored() {
    let filename = crate::utils::temp_file_name("paf");
    let line = paf_line("R1", 10, (0, 10), '+', "C", 100, (10, 20), ":10");
    fs::write(&filename, format!("\n{}\n\n", line)).unwrap();
    let mut store = AlignmentStore::new();
    let summary = read_paf(&filename, &mut store, None, &PafParams::default()).unwrap();
    fs::remove_file(&filename).unwrap();
    assert_eq!(summary.lines, 1);
    assert_eq!(store.num_alignments(), 1);
}

//-----------------------------------------------------------------------------

// Malformed input.

#[test]
fn too_few_fields() {
    let message = ingest_fails(&[String::from("R\t10\t0\t10\t+\tC\t100\t10\t20")]);
    assert!(message.contains("fewer than"), "Wrong error: {}", message);
}

#[test]
fn missing_cs_field() {
    let message = ingest_fails(&[
        String::from("R\t10\t0\t10\t+\tC\t100\t10\t20\t10\t10\t60\tcm:i:12"),
    ]);
    assert!(message.contains("no cs field"), "Wrong error: {}", message);
}

#[test]
fn invalid_strand() {
    let message = ingest_fails(&[
        String::from("R\t10\t0\t10\t*\tC\t100\t10\t20\t10\t10\t60\tcs:Z::10"),
    ]);
    assert!(message.contains("strand"), "Wrong error: {}", message);
}

#[test]
fn invalid_coordinates() {
    let message = ingest_fails(&[
        paf_line("R", 10, (10, 10), '+', "C", 100, (10, 20), ":10"),
    ]);
    assert!(message.contains("read coordinates"), "Wrong error: {}", message);

    let message = ingest_fails(&[
        paf_line("R", 10, (0, 10), '+', "C", 100, (20, 10), ":10"),
    ]);
    assert!(message.contains("contig coordinates"), "Wrong error: {}", message);
}

#[test]
fn non_numeric_coordinates() {
    let message = ingest_fails(&[
        String::from("R\t10\t0\tx\t+\tC\t100\t10\t20\t10\t10\t60\tcs:Z::10"),
    ]);
    assert!(message.contains("read end"), "Wrong error: {}", message);
}

#[test]
fn difference_string_interval_mismatch() {
    // The difference string covers 9 bp of a 10 bp contig interval.
    let message = ingest_fails(&[
        paf_line("R", 10, (0, 9), '+', "C", 100, (10, 20), ":9"),
    ]);
    assert!(message.contains("contig interval"), "Wrong error: {}", message);

    // And here 10 bp of a 9 bp read interval.
    let message = ingest_fails(&[
        paf_line("R", 10, (0, 9), '+', "C", 100, (10, 20), ":10"),
    ]);
    assert!(message.contains("read interval"), "Wrong error: {}", message);
}

#[test]
fn upper_case_tag_fails_the_round_trip() {
    // Decoded bases are stored in upper case and regenerated in lower case,
    // so an upper-case tag cannot round-trip byte-for-byte.
    let message = ingest_fails(&[
        paf_line("R", 10, (0, 10), '+', "C", 100, (10, 20), ":3*AT:6"),
    ]);
    assert!(message.contains("round trip"), "Wrong error: {}", message);
}

//-----------------------------------------------------------------------------

// Verification.

#[test]
fn verification_passes() {
    let lines = vec![
        paf_line("R1", 10, (1, 8), '+', "C", 11, (2, 9), ":7"),
    ];
    let filename = write_paf(&lines);
    let mut store = AlignmentStore::new();
    let data = verification_data();
    let summary = read_paf(&filename, &mut store, Some(&data), &PafParams::default());
    fs::remove_file(&filename).unwrap();
    assert!(summary.is_ok(), "Ingestion failed: {}", summary.unwrap_err());
    assert_eq!(summary.unwrap().bad_records, 0);
    assert_eq!(store.num_alignments(), 1);
}

#[test]
fn verification_quits_on_error() {
    // The difference string claims a substitution the read does not have.
    let lines = vec![
        paf_line("R1", 10, (1, 8), '+', "C", 11, (2, 9), ":3*tg:3"),
    ];
    let filename = write_paf(&lines);
    let mut store = AlignmentStore::new();
    let data = verification_data();
    let result = read_paf(&filename, &mut store, Some(&data), &PafParams::default());
    fs::remove_file(&filename).unwrap();
    assert!(result.is_err(), "Ingestion of a bad record succeeded with quit_on_error");
}

#[test]
fn verification_counts_bad_records() {
    let lines = vec![
        paf_line("R1", 10, (1, 8), '+', "C", 11, (2, 9), ":3*tg:3"),
        paf_line("R1", 10, (1, 8), '+', "C", 11, (2, 9), ":7"),
    ];
    let filename = write_paf(&lines);
    let mut store = AlignmentStore::new();
    let data = verification_data();
    let params = PafParams { quit_on_error: false, ..PafParams::default() };
    let summary = read_paf(&filename, &mut store, Some(&data), &params);
    fs::remove_file(&filename).unwrap();

    let summary = summary.unwrap();
    assert_eq!(summary.bad_records, 1, "The bad record was not counted");
    assert_eq!(summary.alignments, 1, "The good record was not ingested");
    assert_eq!(store.num_alignments(), 1, "The bad record ended up in the store");
}

#[test]
fn verification_stops_at_the_threshold() {
    let lines = vec![
        paf_line("R1", 10, (1, 8), '+', "C", 11, (2, 9), ":3*tg:3"),
        paf_line("R1", 10, (1, 8), '+', "C", 11, (2, 9), ":7"),
    ];
    let filename = write_paf(&lines);
    let mut store = AlignmentStore::new();
    let data = verification_data();
    let params = PafParams { quit_on_error: false, max_bad_records: 1, ..PafParams::default() };
    let summary = read_paf(&filename, &mut store, Some(&data), &params).unwrap();
    fs::remove_file(&filename).unwrap();

    assert_eq!(summary.bad_records, 1);
    assert_eq!(summary.alignments, 0, "Ingestion did not stop at the bad record threshold");
}

//-----------------------------------------------------------------------------

// The whole pipeline: ingest, save, load, query.

#[test]
fn ingest_save_load_query() {
    let lines = vec![
        paf_line("R1", 8, (0, 8), '+', "C", 20, (5, 13), ":3*at+gg-cc:2"),
        paf_line("R2", 10, (0, 10), '-', "C", 20, (8, 18), ":1*ga:8"),
    ];
    let (mut store, _) = ingest(&lines, &PafParams::default());

    let filename = crate::utils::temp_file_name("paf-store");
    store.save(&filename).unwrap();
    let loaded = AlignmentStore::load(&filename).unwrap();
    fs::remove_file(&filename).unwrap();

    let result = loaded.alignments_in_interval(&Interval::new("C", 0, 20)).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(loaded.cs_tag(loaded.alignment(0)), ":3*at+gg-cc:2");
    assert_eq!(loaded.cs_tag(loaded.alignment(1)), ":1*ga:8");
}

//-----------------------------------------------------------------------------
