//! The pileup query engine: per-position coverage and variant counts.
//!
//! Every position in the query intervals gets a coverage counter and a
//! counter per observed variant (the textual form of a mutation).
//! The engine emits one row per variant, ordered by count and then by the
//! variant string, followed by a `REF` row for the reads that carry no
//! mutation at the position.
//! A running cumulative sum over the rows of a position ends at the
//! coverage, which makes the output convenient for stacked plots.
//!
//! Positions are reported 1-based.

use crate::alignment::Interval;
use crate::query::PileupMode;
use crate::store::AlignmentStore;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};

//-----------------------------------------------------------------------------

/// An output row for one variant at one position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PileupRow {
    /// Contig id.
    pub contig_id: String,
    /// 1-based position on the contig.
    pub position: u32,
    /// Variant string, or `REF` for reads without a mutation here.
    pub variant: String,
    /// Number of reads with this variant at this position.
    pub count: u64,
    /// Number of alignments covering this position.
    pub coverage: u64,
    /// Cumulative count over the rows of this position.
    pub cumsum: u64,
}

// Per-position counters.
#[derive(Clone, Debug, Default)]
struct PileupData {
    coverage: u64,
    mutation_counts: BTreeMap<String, u64>,
}

//-----------------------------------------------------------------------------

/// The pileup query engine.
#[derive(Debug)]
pub struct PileupQuery {
    intervals: Vec<Interval>,
    mode: PileupMode,
    rows: Vec<PileupRow>,
}

impl PileupQuery {
    /// The variant string of the reference rows.
    pub const REF: &'static str = "REF";

    /// Creates a new query over the given intervals.
    pub fn new(intervals: Vec<Interval>, mode: PileupMode) -> Self {
        PileupQuery {
            intervals, mode,
            rows: Vec::new(),
        }
    }

    /// Runs the query and buffers the output rows.
    ///
    /// Returns an error if an interval refers to an unknown contig.
    pub fn execute(&mut self, store: &AlignmentStore) -> Result<(), String> {
        let grid = self.aggregate(store)?;
        self.generate_rows(store, grid);
        Ok(())
    }

    /// Returns the output rows.
    pub fn rows(&self) -> &[PileupRow] {
        &self.rows
    }

    // Builds the per-position counters over the query intervals.
    fn aggregate(&self, store: &AlignmentStore) -> Result<BTreeMap<(u32, u32), PileupData>, String> {
        let mut grid: BTreeMap<(u32, u32), PileupData> = BTreeMap::new();

        // Every queried position exists in the grid, so that mode `all`
        // reports the full grid.
        for interval in self.intervals.iter() {
            let contig_index = store.contig_index(&interval.contig)? as u32;
            for pos in interval.start..interval.end {
                grid.entry((contig_index, pos)).or_default();
            }
        }

        for interval in self.intervals.iter() {
            let contig_index = store.contig_index(&interval.contig)? as u32;
            for index in store.alignments_in_interval(interval)? {
                let aln = store.alignment(index);

                // Coverage over the part of the alignment inside the interval.
                let clip_start = aln.contig_start.max(interval.start);
                let clip_end = aln.contig_end.min(interval.end);
                for pos in clip_start..clip_end {
                    let data = grid.get_mut(&(contig_index, pos))
                        .expect("Covered position missing from the pileup grid");
                    data.coverage += 1;
                }

                // Variant counts at the mutation positions inside the interval.
                for mutation_index in aln.mutations.iter() {
                    let mutation = store.mutation(aln.contig_index, *mutation_index);
                    if mutation.position < interval.start || mutation.position >= interval.end {
                        continue;
                    }
                    let data = grid.get_mut(&(contig_index, mutation.position))
                        .expect("Mutated position missing from the pileup grid");
                    *data.mutation_counts.entry(mutation.description()).or_insert(0) += 1;
                }
            }
        }

        Ok(grid)
    }

    // Turns the counters into output rows in `(contig, position)` order.
    fn generate_rows(&mut self, store: &AlignmentStore, grid: BTreeMap<(u32, u32), PileupData>) {
        self.rows.clear();

        for ((contig_index, pos), data) in grid {
            if self.mode == PileupMode::Covered && data.coverage == 0 {
                continue;
            }
            if self.mode == PileupMode::Mutated && data.mutation_counts.is_empty() {
                continue;
            }

            let contig_id = store.contig_id(contig_index as usize);
            let total_mutated: u64 = data.mutation_counts.values().sum();
            assert!(total_mutated <= data.coverage,
                "More variant observations than coverage at position {}", pos);
            let ref_count = data.coverage - total_mutated;

            // Variants by count (descending), ties by the variant string.
            let mut variants: Vec<(String, u64)> = data.mutation_counts.into_iter().collect();
            variants.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

            let mut cumsum = 0;
            for (variant, count) in variants {
                cumsum += count;
                self.rows.push(PileupRow {
                    contig_id: String::from(contig_id),
                    position: pos + 1,
                    variant, count,
                    coverage: data.coverage,
                    cumsum,
                });
            }

            if ref_count > 0 || (data.coverage == 0 && self.mode == PileupMode::All) {
                cumsum += ref_count;
                self.rows.push(PileupRow {
                    contig_id: String::from(contig_id),
                    position: pos + 1,
                    variant: String::from(Self::REF),
                    count: ref_count,
                    coverage: data.coverage,
                    cumsum,
                });
            }

            assert!(cumsum == data.coverage,
                "Cumulative count {} does not equal coverage {} at position {}",
                cumsum, data.coverage, pos);
        }
    }
}

//-----------------------------------------------------------------------------

// Output.
impl PileupQuery {
    /// Writes the rows as a tab-separated table with a header.
    pub fn write_rows<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"contig\tposition\tvariant\tcount\tcoverage\tcumsum\n")?;
        for row in self.rows.iter() {
            writeln!(
                writer, "{}\t{}\t{}\t{}\t{}\t{}",
                row.contig_id, row.position, row.variant,
                row.count, row.coverage, row.cumsum
            )?;
        }
        Ok(())
    }

    /// Writes the rows to `PREFIX_pileup.tsv`.
    pub fn write_to_file(&self, prefix: &str) -> Result<(), String> {
        let filename = format!("{}_pileup.tsv", prefix);
        eprintln!("Writing {} pileup rows to {}", self.rows.len(), filename);
        let mut writer = BufWriter::new(File::create(&filename).map_err(|x| {
            format!("Failed to create {}: {}", filename, x)
        })?);
        self.write_rows(&mut writer).map_err(|x| x.to_string())?;
        writer.flush().map_err(|x| x.to_string())
    }
}

//-----------------------------------------------------------------------------
