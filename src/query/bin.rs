//! The bin query engine: fixed-width aggregation of sequencing and
//! mutation counts.
//!
//! Bins are anchored at multiples of the bin size, so the same positions
//! always fall into the same bins regardless of the query intervals.
//! For every interval, the engine initializes all bins the interval
//! touches, adds the triple-clipped overlap of every alignment (alignment,
//! bin, and interval boundaries all apply) to the sequenced base-pair
//! counter, and counts the mutations whose absolute position falls inside
//! the interval.

use crate::alignment::Interval;
use crate::store::AlignmentStore;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};

//-----------------------------------------------------------------------------

/// An output row for one bin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinRow {
    /// Contig id.
    pub contig_id: String,
    /// Start of the bin.
    pub bin_start: u32,
    /// Past-the-end position of the bin.
    pub bin_end: u32,
    /// Width of the bin.
    pub bin_length: u32,
    /// Number of sequenced base pairs in the bin.
    pub sequenced_bp: u64,
    /// Number of mutation observations in the bin.
    pub mutation_count: u64,
}

#[derive(Clone, Debug, Default)]
struct BinData {
    sequenced_bp: u64,
    mutation_count: u64,
}

//-----------------------------------------------------------------------------

/// The bin query engine.
#[derive(Debug)]
pub struct BinQuery {
    intervals: Vec<Interval>,
    binsize: u32,
    rows: Vec<BinRow>,
}

impl BinQuery {
    /// Creates a new query over the given intervals.
    ///
    /// Returns an error if the bin size is zero.
    pub fn new(intervals: Vec<Interval>, binsize: u32) -> Result<Self, String> {
        if binsize == 0 {
            return Err(String::from("Bin size must be positive"));
        }
        Ok(BinQuery {
            intervals, binsize,
            rows: Vec::new(),
        })
    }

    /// Runs the query and buffers the output rows.
    ///
    /// Empty intervals are skipped.
    /// Returns an error if an interval refers to an unknown contig.
    pub fn execute(&mut self, store: &AlignmentStore) -> Result<(), String> {
        let mut grid: BTreeMap<(u32, u32), BinData> = BTreeMap::new();

        for interval in self.intervals.iter() {
            let contig_index = store.contig_index(&interval.contig)? as u32;
            if interval.is_empty() {
                continue;
            }

            // The bins the interval touches, anchored at multiples of the
            // bin size.
            let first_bin = (interval.start / self.binsize) * self.binsize;
            let last_bin = ((interval.end - 1) / self.binsize) * self.binsize;
            let bin_starts = (first_bin..=last_bin).step_by(self.binsize as usize);
            for bin_start in bin_starts.clone() {
                grid.entry((contig_index, bin_start)).or_default();
            }

            for index in store.alignments_in_interval(interval)? {
                let aln = store.alignment(index);

                for bin_start in bin_starts.clone() {
                    let bin_end = bin_start + self.binsize;
                    let clip_start = aln.contig_start.max(bin_start).max(interval.start);
                    let clip_end = aln.contig_end.min(bin_end).min(interval.end);
                    if clip_end > clip_start {
                        let data = grid.get_mut(&(contig_index, bin_start))
                            .expect("Touched bin missing from the bin grid");
                        data.sequenced_bp += (clip_end - clip_start) as u64;
                    }
                }

                for mutation_index in aln.mutations.iter() {
                    let mutation = store.mutation(aln.contig_index, *mutation_index);
                    if mutation.position < interval.start || mutation.position >= interval.end {
                        continue;
                    }
                    let bin_start = (mutation.position / self.binsize) * self.binsize;
                    let data = grid.get_mut(&(contig_index, bin_start))
                        .expect("Mutated bin missing from the bin grid");
                    data.mutation_count += 1;
                }
            }
        }

        self.rows.clear();
        for ((contig_index, bin_start), data) in grid {
            self.rows.push(BinRow {
                contig_id: String::from(store.contig_id(contig_index as usize)),
                bin_start,
                bin_end: bin_start + self.binsize,
                bin_length: self.binsize,
                sequenced_bp: data.sequenced_bp,
                mutation_count: data.mutation_count,
            });
        }

        Ok(())
    }

    /// Returns the output rows.
    pub fn rows(&self) -> &[BinRow] {
        &self.rows
    }
}

//-----------------------------------------------------------------------------

// Output.
impl BinQuery {
    /// Writes the rows as a tab-separated table with a header.
    pub fn write_rows<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"contig\tbin_start\tbin_end\tbin_length\tsequenced_bp\tmutation_count\n")?;
        for row in self.rows.iter() {
            writeln!(
                writer, "{}\t{}\t{}\t{}\t{}\t{}",
                row.contig_id, row.bin_start, row.bin_end, row.bin_length,
                row.sequenced_bp, row.mutation_count
            )?;
        }
        Ok(())
    }

    /// Writes the rows to `PREFIX_bins.tsv`.
    pub fn write_to_file(&self, prefix: &str) -> Result<(), String> {
        let filename = format!("{}_bins.tsv", prefix);
        eprintln!("Writing {} bin rows to {}", self.rows.len(), filename);
        let mut writer = BufWriter::new(File::create(&filename).map_err(|x| {
            format!("Failed to create {}: {}", filename, x)
        })?);
        self.write_rows(&mut writer).map_err(|x| x.to_string())?;
        writer.flush().map_err(|x| x.to_string())
    }
}

//-----------------------------------------------------------------------------
