//! The full query engine: one row per alignment and one row per mutation.
//!
//! Alignments are enumerated interval by interval, in the store's start
//! order within each interval, and numbered with a run-unique index.
//! Every alignment also gets a layout height so that a plot can draw
//! alignments on the same contig without overlap; see [`HeightStyle`] for
//! the two packing policies.
//! Mutation rows inherit the height of their alignment.

use crate::alignment::{Interval, MutationType};
use crate::query::HeightStyle;
use crate::store::AlignmentStore;

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, BufWriter, Write};

//-----------------------------------------------------------------------------

/// An output row describing an alignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentRow {
    /// Zero-based index of the alignment in this query run.
    pub alignment_index: u64,
    /// Read id.
    pub read_id: String,
    /// Contig id.
    pub contig_id: String,
    /// Start of the aligned read interval.
    pub read_start: u32,
    /// End of the aligned read interval.
    pub read_end: u32,
    /// Start of the aligned contig interval.
    pub contig_start: u32,
    /// End of the aligned contig interval.
    pub contig_end: u32,
    /// Is the read aligned to the reverse strand?
    pub is_reverse: bool,
    /// Difference string regenerated from the stored mutations.
    pub cs_tag: String,
    /// Number of mutations in the alignment.
    pub num_mutations: usize,
    /// Layout height.
    pub height: usize,
}

/// An output row describing one mutation of an alignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRow {
    /// Index of the alignment in this query run.
    pub alignment_index: u64,
    /// Read id.
    pub read_id: String,
    /// Contig id.
    pub contig_id: String,
    /// Type of the mutation.
    pub mutation_type: MutationType,
    /// Absolute 0-based position on the contig.
    pub position: u32,
    /// Textual form of the mutation.
    pub description: String,
    /// Layout height of the alignment.
    pub height: usize,
}

//-----------------------------------------------------------------------------

/// The full query engine.
///
/// # Examples
///
/// ```no_run
/// use aln_store::{AlignmentStore, Interval};
/// use aln_store::query::HeightStyle;
/// use aln_store::query::full::FullQuery;
///
/// let store = AlignmentStore::load("alignments.aln").unwrap();
/// let intervals = vec![Interval::new("chr1", 1000, 2000)];
/// let mut query = FullQuery::new(intervals, HeightStyle::ByCoord);
/// query.execute(&store).unwrap();
/// query.write_to_files("chr1_region").unwrap();
/// ```
#[derive(Debug)]
pub struct FullQuery {
    intervals: Vec<Interval>,
    height_style: HeightStyle,
    alignments: Vec<AlignmentRow>,
    mutations: Vec<MutationRow>,
}

impl FullQuery {
    /// Creates a new query over the given intervals.
    pub fn new(intervals: Vec<Interval>, height_style: HeightStyle) -> Self {
        FullQuery {
            intervals, height_style,
            alignments: Vec::new(),
            mutations: Vec::new(),
        }
    }

    /// Runs the query and buffers the output rows.
    ///
    /// Returns an error if an interval refers to an unknown contig.
    pub fn execute(&mut self, store: &AlignmentStore) -> Result<(), String> {
        self.alignments.clear();
        self.mutations.clear();
        let mut alignment_index = 0;

        for interval in self.intervals.iter() {
            for index in store.alignments_in_interval(interval)? {
                let aln = store.alignment(index);
                let read_id = store.read_id(aln.read_index as usize);
                let contig_id = store.contig_id(aln.contig_index as usize);

                self.alignments.push(AlignmentRow {
                    alignment_index,
                    read_id: String::from(read_id),
                    contig_id: String::from(contig_id),
                    read_start: aln.read_start, read_end: aln.read_end,
                    contig_start: aln.contig_start, contig_end: aln.contig_end,
                    is_reverse: aln.is_reverse,
                    cs_tag: store.cs_tag(aln),
                    num_mutations: aln.mutations.len(),
                    height: 0,
                });

                for mutation_index in aln.mutations.iter() {
                    let mutation = store.mutation(aln.contig_index, *mutation_index);
                    self.mutations.push(MutationRow {
                        alignment_index,
                        read_id: String::from(read_id),
                        contig_id: String::from(contig_id),
                        mutation_type: mutation.mutation_type,
                        position: mutation.position,
                        description: mutation.description(),
                        height: 0,
                    });
                }

                alignment_index += 1;
            }
        }

        self.assign_heights();
        Ok(())
    }

    /// Returns the alignment rows.
    pub fn alignments(&self) -> &[AlignmentRow] {
        &self.alignments
    }

    /// Returns the mutation rows.
    pub fn mutations(&self) -> &[MutationRow] {
        &self.mutations
    }
}

//-----------------------------------------------------------------------------

// Height assignment.
impl FullQuery {
    fn assign_heights(&mut self) {
        match self.height_style {
            HeightStyle::ByCoord => self.assign_heights_by_coord(),
            HeightStyle::ByMutations => self.assign_heights_by_mutations(),
        }

        // Mutation rows inherit the height of their alignment.
        let heights: HashMap<u64, usize> = self.alignments.iter()
            .map(|row| (row.alignment_index, row.height))
            .collect();
        for row in self.mutations.iter_mut() {
            if let Some(height) = heights.get(&row.alignment_index) {
                row.height = *height;
            }
        }
    }

    // Greedy packing: group by contig, sort by start position, and give
    // each alignment the lowest level whose previous occupant has ended.
    fn assign_heights_by_coord(&mut self) {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.alignments.iter().enumerate() {
            groups.entry(row.contig_id.clone()).or_default().push(i);
        }

        for (_, mut members) in groups {
            // The sort is stable, so ties keep their enumeration order.
            let rows = &self.alignments;
            members.sort_by_key(|&i| rows[i].contig_start);

            // The past-the-end position of the last alignment on each level.
            let mut level_ends: Vec<u32> = Vec::new();
            for &i in members.iter() {
                let (start, end) = (self.alignments[i].contig_start, self.alignments[i].contig_end);
                let mut height = 0;
                while height < level_ends.len() && start < level_ends[height] {
                    height += 1;
                }
                if height == level_ends.len() {
                    level_ends.push(0);
                }
                level_ends[height] = end;
                self.alignments[i].height = height;
            }
        }
    }

    // Density-first packing: alignments with the most mutations per base
    // get the lowest levels, and each level keeps a sorted set of occupied
    // intervals probed by binary search.
    fn assign_heights_by_mutations(&mut self) {
        let density = |row: &AlignmentRow| {
            let len = (row.contig_end - row.contig_start).max(1);
            row.num_mutations as f64 / len as f64
        };

        let mut order: Vec<usize> = (0..self.alignments.len()).collect();
        // Descending by density; the stable sort breaks ties by the
        // enumeration order.
        order.sort_by(|&a, &b| {
            density(&self.alignments[b]).partial_cmp(&density(&self.alignments[a]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut levels_by_contig: HashMap<String, Vec<Vec<(u32, u32)>>> = HashMap::new();
        for i in order {
            let (start, end) = (self.alignments[i].contig_start, self.alignments[i].contig_end);
            let levels = levels_by_contig.entry(self.alignments[i].contig_id.clone()).or_default();

            let mut height = 0;
            loop {
                if height == levels.len() {
                    levels.push(Vec::new());
                    break;
                }
                if !Self::has_overlap(&levels[height], start, end) {
                    break;
                }
                height += 1;
            }
            Self::insert_sorted(&mut levels[height], start, end);
            self.alignments[i].height = height;
        }
    }

    // Does the half-open interval overlap any of the sorted, disjoint
    // occupied intervals?
    fn has_overlap(intervals: &[(u32, u32)], start: u32, end: u32) -> bool {
        // The first occupied interval extending past the new start is the
        // only candidate: later ones start even further right.
        let index = intervals.partition_point(|occupied| occupied.1 <= start);
        index < intervals.len() && intervals[index].0 < end
    }

    // Inserts the interval, keeping the level sorted by start position.
    fn insert_sorted(intervals: &mut Vec<(u32, u32)>, start: u32, end: u32) {
        let index = intervals.partition_point(|occupied| occupied.0 <= start);
        intervals.insert(index, (start, end));
    }
}

//-----------------------------------------------------------------------------

// Output.
impl FullQuery {
    /// Writes the alignment rows as a tab-separated table with a header.
    pub fn write_alignments<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"alignment_index\tread_id\tcontig_id\tread_start\tread_end\tcontig_start\tcontig_end\tis_reverse\tcs_tag\tmutation_count\theight\n")?;
        for row in self.alignments.iter() {
            writeln!(
                writer, "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.alignment_index, row.read_id, row.contig_id,
                row.read_start, row.read_end,
                row.contig_start, row.contig_end,
                row.is_reverse, row.cs_tag, row.num_mutations, row.height
            )?;
        }
        Ok(())
    }

    /// Writes the mutation rows as a tab-separated table with a header.
    pub fn write_mutations<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"alignment_index\tread_id\tcontig_id\tmutation_type\tmutation_position\tmutation_desc\theight\n")?;
        for row in self.mutations.iter() {
            writeln!(
                writer, "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.alignment_index, row.read_id, row.contig_id,
                row.mutation_type, row.position, row.description, row.height
            )?;
        }
        Ok(())
    }

    /// Writes the rows to `PREFIX_alignments.tsv` and `PREFIX_mutations.tsv`.
    pub fn write_to_files(&self, prefix: &str) -> Result<(), String> {
        let alignments_file = format!("{}_alignments.tsv", prefix);
        eprintln!("Writing {} alignment rows to {}", self.alignments.len(), alignments_file);
        let mut writer = BufWriter::new(File::create(&alignments_file).map_err(|x| {
            format!("Failed to create {}: {}", alignments_file, x)
        })?);
        self.write_alignments(&mut writer).map_err(|x| x.to_string())?;
        writer.flush().map_err(|x| x.to_string())?;

        let mutations_file = format!("{}_mutations.tsv", prefix);
        eprintln!("Writing {} mutation rows to {}", self.mutations.len(), mutations_file);
        let mut writer = BufWriter::new(File::create(&mutations_file).map_err(|x| {
            format!("Failed to create {}: {}", mutations_file, x)
        })?);
        self.write_mutations(&mut writer).map_err(|x| x.to_string())?;
        writer.flush().map_err(|x| x.to_string())?;

        Ok(())
    }
}

//-----------------------------------------------------------------------------
