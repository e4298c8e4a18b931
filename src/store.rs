//! An in-memory store for alignments with per-base mutations.
//!
//! [`AlignmentStore`] keeps dictionaries of contigs and reads, a table of
//! alignments, and one deduplicated mutation table per contig.
//! Alignments reference their mutations by index, so each distinct mutation
//! is stored once no matter how many reads carry it.
//!
//! The store has two phases.
//! In the build phase, [`crate::paf::read_paf`] appends alignments and
//! mutations.
//! After the first [`AlignmentStore::save`] or [`AlignmentStore::load`],
//! the store becomes immutable for ingestion and answers interval-overlap
//! queries through a per-contig index sorted by start position.
//!
//! The on-disk format is a versioned little-endian binary layout with magic
//! `ALNSTV2`.
//! Strings are length-prefixed with a 64-bit length, coordinates are 32-bit,
//! and mutation types are single bytes.

use crate::alignment::{self, Alignment, Contig, Interval, Mutation, MutationType, Read};

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;


//-----------------------------------------------------------------------------

// Low-level readers and writers for the binary format.

fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<(), String> {
    writer.write_all(&[value]).map_err(|x| x.to_string())
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<(), String> {
    writer.write_all(&value.to_le_bytes()).map_err(|x| x.to_string())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<(), String> {
    writer.write_all(&value.to_le_bytes()).map_err(|x| x.to_string())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), String> {
    write_u64(writer, value.len() as u64)?;
    writer.write_all(value.as_bytes()).map_err(|x| x.to_string())
}

fn read_u8<R: std::io::Read>(reader: &mut R) -> Result<u8, String> {
    let mut buf = [0; 1];
    reader.read_exact(&mut buf).map_err(|x| x.to_string())?;
    Ok(buf[0])
}

fn read_u32<R: std::io::Read>(reader: &mut R) -> Result<u32, String> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf).map_err(|x| x.to_string())?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: std::io::Read>(reader: &mut R) -> Result<u64, String> {
    let mut buf = [0; 8];
    reader.read_exact(&mut buf).map_err(|x| x.to_string())?;
    Ok(u64::from_le_bytes(buf))
}

fn read_string<R: std::io::Read>(reader: &mut R) -> Result<String, String> {
    let len = read_u64(reader)? as usize;
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf).map_err(|x| x.to_string())?;
    String::from_utf8(buf).map_err(|x| x.to_string())
}

//-----------------------------------------------------------------------------

/// An in-memory repository of contigs, reads, alignments, and deduplicated
/// mutations, with binary persistence and interval queries.
///
/// # Examples
///
/// ```
/// use aln_store::{Alignment, AlignmentStore, Interval, Mutation, MutationType};
/// use aln_store::utils;
/// use std::fs;
///
/// // Build a store with one alignment carrying one substitution.
/// let mut store = AlignmentStore::new();
/// let contig = store.add_or_get_contig("chr1", 1000);
/// let read = store.add_or_get_read("read1", 500);
/// let mutation = store.add_mutation(
///     contig as u32, Mutation::new(MutationType::Substitution, 120, "AT")
/// ).unwrap();
/// store.add_alignment(Alignment {
///     read_index: read as u32, contig_index: contig as u32,
///     read_start: 0, read_end: 100,
///     contig_start: 100, contig_end: 200,
///     is_reverse: false,
///     mutations: vec![mutation],
/// });
///
/// // Save and load.
/// let filename = utils::temp_file_name("alignment-store");
/// store.save(&filename).unwrap();
/// let loaded = AlignmentStore::load(&filename).unwrap();
///
/// // Query.
/// let result = loaded.alignments_in_interval(&Interval::new("chr1", 150, 160)).unwrap();
/// assert_eq!(result.len(), 1);
/// fs::remove_file(&filename).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct AlignmentStore {
    contigs: Vec<Contig>,
    reads: Vec<Read>,
    alignments: Vec<Alignment>,
    // Mutation tables by contig index, in the order the mutations were first seen.
    mutations: BTreeMap<u32, Vec<Mutation>>,
    contig_id_to_index: HashMap<String, usize>,
    read_id_to_index: HashMap<String, usize>,
    // Transient map for mutation deduplication; only used in the build phase.
    mutation_key_to_index: HashMap<String, u32>,
    // Alignment indices by contig, sorted by start position.
    alignment_index_by_contig: Vec<Vec<usize>>,
    max_alignment_length: u32,
    loaded: bool,
}

//-----------------------------------------------------------------------------

/// Building the store.
impl AlignmentStore {
    /// Magic bytes identifying the file format and version.
    pub const MAGIC: &'static [u8] = b"ALNSTV2";

    /// Creates an empty store in the build phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the contig with the given id, inserting a new
    /// contig if necessary.
    ///
    /// Contigs are numbered in insertion order, and the length from the
    /// first occurrence wins.
    pub fn add_or_get_contig(&mut self, id: &str, length: u32) -> usize {
        if let Some(index) = self.contig_id_to_index.get(id) {
            return *index;
        }
        let index = self.contigs.len();
        self.contigs.push(Contig::new(id, length));
        self.contig_id_to_index.insert(String::from(id), index);
        index
    }

    /// Returns the index of the read with the given id, inserting a new
    /// read if necessary.
    ///
    /// Reads are numbered in insertion order, and the length from the first
    /// occurrence wins.
    pub fn add_or_get_read(&mut self, id: &str, length: u32) -> usize {
        if let Some(index) = self.read_id_to_index.get(id) {
            return *index;
        }
        let index = self.reads.len();
        self.reads.push(Read::new(id, length));
        self.read_id_to_index.insert(String::from(id), index);
        index
    }

    /// Adds a mutation to the given contig and returns its index in the
    /// mutation table of the contig.
    ///
    /// If the same mutation has been added before, the existing index is
    /// returned and nothing is stored.
    /// Returns an error if the store has already been saved or loaded.
    pub fn add_mutation(&mut self, contig_index: u32, mutation: Mutation) -> Result<u32, String> {
        if self.loaded {
            return Err(String::from("Cannot add mutations after the store has been saved or loaded"));
        }

        let key = mutation.key(contig_index);
        if let Some(index) = self.mutation_key_to_index.get(&key) {
            return Ok(*index);
        }
        let table = self.mutations.entry(contig_index).or_default();
        let index = table.len() as u32;
        table.push(mutation);
        self.mutation_key_to_index.insert(key, index);
        Ok(index)
    }

    /// Adds an alignment to the store.
    pub fn add_alignment(&mut self, alignment: Alignment) {
        self.alignments.push(alignment);
    }
}

//-----------------------------------------------------------------------------

/// Accessing the store.
impl AlignmentStore {
    /// Returns the number of contigs in the store.
    pub fn num_contigs(&self) -> usize {
        self.contigs.len()
    }

    /// Returns the number of reads in the store.
    pub fn num_reads(&self) -> usize {
        self.reads.len()
    }

    /// Returns the number of alignments in the store.
    pub fn num_alignments(&self) -> usize {
        self.alignments.len()
    }

    /// Returns the total number of distinct mutations in the store.
    pub fn num_mutations(&self) -> usize {
        self.mutations.values().map(|table| table.len()).sum()
    }

    /// Returns `true` if the store has been saved or loaded and no longer
    /// accepts mutations.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns all contigs in insertion order.
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    /// Returns all reads in insertion order.
    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    /// Returns all alignments in insertion order.
    pub fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    /// Returns the index of the contig with the given id, or an error if
    /// there is no such contig.
    pub fn contig_index(&self, id: &str) -> Result<usize, String> {
        self.contig_id_to_index.get(id).copied().ok_or(format!("Contig not found: {}", id))
    }

    /// Returns the index of the read with the given id, or an error if
    /// there is no such read.
    pub fn read_index(&self, id: &str) -> Result<usize, String> {
        self.read_id_to_index.get(id).copied().ok_or(format!("Read not found: {}", id))
    }

    /// Returns the contig with the given index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn contig(&self, contig_index: usize) -> &Contig {
        assert!(contig_index < self.contigs.len(), "Contig index out of bounds: {}", contig_index);
        &self.contigs[contig_index]
    }

    /// Returns the read with the given index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn read(&self, read_index: usize) -> &Read {
        assert!(read_index < self.reads.len(), "Read index out of bounds: {}", read_index);
        &self.reads[read_index]
    }

    /// Returns the id of the contig with the given index.
    pub fn contig_id(&self, contig_index: usize) -> &str {
        &self.contig(contig_index).id
    }

    /// Returns the id of the read with the given index.
    pub fn read_id(&self, read_index: usize) -> &str {
        &self.read(read_index).id
    }

    /// Returns the alignment with the given index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn alignment(&self, alignment_index: usize) -> &Alignment {
        assert!(alignment_index < self.alignments.len(), "Alignment index out of bounds: {}", alignment_index);
        &self.alignments[alignment_index]
    }

    /// Returns the mutation with the given index on the given contig.
    ///
    /// # Panics
    ///
    /// Panics if the contig has no mutation table or the index is out of
    /// bounds.
    /// Stored alignments only reference valid indices, so this indicates a
    /// bug rather than bad input.
    pub fn mutation(&self, contig_index: u32, mutation_index: u32) -> &Mutation {
        let table = self.mutations.get(&contig_index);
        assert!(table.is_some(), "Contig index {} not found in the mutation store", contig_index);
        let table = table.unwrap();
        assert!(
            (mutation_index as usize) < table.len(),
            "Mutation index {} out of bounds for contig {} (size {})",
            mutation_index, contig_index, table.len()
        );
        &table[mutation_index as usize]
    }

    /// Returns the mutation table of the given contig, which may be empty.
    pub fn mutations_for_contig(&self, contig_index: u32) -> &[Mutation] {
        self.mutations.get(&contig_index).map_or(&[], |table| table.as_slice())
    }

    /// Regenerates the difference string of the alignment from its stored
    /// mutations.
    pub fn cs_tag(&self, aln: &Alignment) -> String {
        let mutations = aln.mutations.iter().map(|&index| self.mutation(aln.contig_index, index));
        alignment::generate_cs_tag(mutations, aln.contig_start, aln.contig_end)
    }

    /// Returns the length of the longest alignment interval on any contig.
    ///
    /// Only meaningful in the query phase.
    pub fn max_alignment_length(&self) -> u32 {
        self.max_alignment_length
    }
}

//-----------------------------------------------------------------------------

/// Organizing and querying the store.
impl AlignmentStore {
    /// Rebuilds the derived query structures.
    ///
    /// This sorts the alignments of each contig by start position and
    /// recomputes the maximum alignment length.
    /// [`AlignmentStore::save`] and [`AlignmentStore::load`] call this
    /// automatically.
    ///
    /// # Panics
    ///
    /// Panics if an alignment references a contig that is not in the store
    /// or has an inverted coordinate range.
    pub fn organize(&mut self) {
        self.alignment_index_by_contig = vec![Vec::new(); self.contigs.len()];
        self.max_alignment_length = 0;

        for (i, aln) in self.alignments.iter().enumerate() {
            let contig = aln.contig_index as usize;
            assert!(contig < self.contigs.len(), "Alignment {} references unknown contig index {}", i, contig);
            self.alignment_index_by_contig[contig].push(i);
            assert!(aln.contig_end >= aln.contig_start, "Alignment {} with end before start", i);
            self.max_alignment_length = self.max_alignment_length.max(aln.contig_len());
        }

        for indices in self.alignment_index_by_contig.iter_mut() {
            // The sort is stable, so ties keep their insertion order.
            let alignments = &self.alignments;
            indices.sort_by_key(|&index| alignments[index].contig_start);
        }
    }

    /// Returns the indices of the alignments overlapping the given interval,
    /// in ascending order by start position.
    ///
    /// The interval is half-open, and so are the aligned intervals: an
    /// alignment overlaps if `contig_start < interval.end` and
    /// `contig_end > interval.start`.
    /// Returns an error if the contig is not in the store.
    /// A contig without alignments yields an empty result.
    ///
    /// The query binary-searches the per-contig sorted index.
    /// Because the index is sorted by start position, only alignments
    /// starting within the longest alignment length before the interval can
    /// overlap it.
    pub fn alignments_in_interval(&self, interval: &Interval) -> Result<Vec<usize>, String> {
        let contig_index = self.contig_index(&interval.contig)?;
        let mut result = Vec::new();
        if interval.end < interval.start {
            return Ok(result);
        }
        if contig_index >= self.alignment_index_by_contig.len() {
            return Ok(result);
        }
        let indices = &self.alignment_index_by_contig[contig_index];
        if indices.is_empty() {
            return Ok(result);
        }

        let min_possible_start = if interval.start >= self.max_alignment_length {
            interval.start - self.max_alignment_length + 1
        } else {
            0
        };
        let start = indices.partition_point(|&index| self.alignments[index].contig_start < min_possible_start);
        let end = indices.partition_point(|&index| self.alignments[index].contig_start <= interval.end);

        for &index in indices[start..end].iter() {
            let aln = &self.alignments[index];
            if aln.contig_start < interval.end && aln.contig_end > interval.start {
                result.push(index);
            }
        }

        Ok(result)
    }
}

//-----------------------------------------------------------------------------

/// Saving and loading.
impl AlignmentStore {
    /// Saves the store to the given file in the binary `ALNSTV2` format.
    ///
    /// This ends the build phase: the transient deduplication map is
    /// cleared, further mutation insertions fail, and the query structures
    /// are built.
    pub fn save<P: AsRef<Path>>(&mut self, filename: P) -> Result<(), String> {
        let file = File::create(&filename).map_err(|x| {
            format!("Failed to create {}: {}", filename.as_ref().display(), x)
        })?;
        let mut writer = BufWriter::new(file);
        self.serialize(&mut writer)?;
        writer.flush().map_err(|x| x.to_string())?;

        self.mutation_key_to_index.clear();
        self.loaded = true;
        self.organize();
        Ok(())
    }

    /// Writes the store to the given writer in the binary `ALNSTV2` format.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<(), String> {
        writer.write_all(Self::MAGIC).map_err(|x| x.to_string())?;

        write_u64(writer, self.contigs.len() as u64)?;
        for contig in self.contigs.iter() {
            write_string(writer, &contig.id)?;
            write_u32(writer, contig.length)?;
        }

        write_u64(writer, self.reads.len() as u64)?;
        for read in self.reads.iter() {
            write_string(writer, &read.id)?;
            write_u32(writer, read.length)?;
        }

        write_u64(writer, self.mutations.len() as u64)?;
        for (contig_index, table) in self.mutations.iter() {
            write_u32(writer, *contig_index)?;
            write_u64(writer, table.len() as u64)?;
            for mutation in table.iter() {
                write_u8(writer, mutation.mutation_type.code())?;
                write_u32(writer, mutation.position)?;
                write_string(writer, &mutation.nts)?;
            }
        }

        write_u64(writer, self.alignments.len() as u64)?;
        for aln in self.alignments.iter() {
            write_u32(writer, aln.read_index)?;
            write_u32(writer, aln.contig_index)?;
            write_u32(writer, aln.read_start)?;
            write_u32(writer, aln.read_end)?;
            write_u32(writer, aln.contig_start)?;
            write_u32(writer, aln.contig_end)?;
            write_u8(writer, aln.is_reverse as u8)?;
            write_u64(writer, aln.mutations.len() as u64)?;
            for mutation_index in aln.mutations.iter() {
                write_u32(writer, *mutation_index)?;
            }
        }

        Ok(())
    }

    /// Loads a store from the given file.
    ///
    /// The loaded store is in the query phase.
    /// Returns an error if the file cannot be read, the magic bytes do not
    /// match, or the contents are inconsistent.
    pub fn load<P: AsRef<Path>>(filename: P) -> Result<Self, String> {
        let file = File::open(&filename).map_err(|x| {
            format!("Failed to open {}: {}", filename.as_ref().display(), x)
        })?;
        let mut reader = BufReader::new(file);
        let mut result = Self::deserialize(&mut reader).map_err(|x| {
            format!("{}: {}", filename.as_ref().display(), x)
        })?;

        result.loaded = true;
        result.organize();
        Ok(result)
    }

    // Reads the store from the given reader and rebuilds the dictionaries.
    fn deserialize<R: std::io::Read>(reader: &mut R) -> Result<Self, String> {
        let mut magic = [0; 7];
        reader.read_exact(&mut magic).map_err(|x| x.to_string())?;
        if &magic[..] != Self::MAGIC {
            return Err(String::from("Invalid file format or version"));
        }

        let mut result = Self::new();

        let num_contigs = read_u64(reader)?;
        for i in 0..num_contigs {
            let id = read_string(reader)?;
            let length = read_u32(reader)?;
            if result.contig_id_to_index.insert(id.clone(), i as usize).is_some() {
                return Err(format!("Duplicate contig id: {}", id));
            }
            result.contigs.push(Contig { id, length });
        }

        let num_reads = read_u64(reader)?;
        for i in 0..num_reads {
            let id = read_string(reader)?;
            let length = read_u32(reader)?;
            if result.read_id_to_index.insert(id.clone(), i as usize).is_some() {
                return Err(format!("Duplicate read id: {}", id));
            }
            result.reads.push(Read { id, length });
        }

        let num_contigs_with_mutations = read_u64(reader)?;
        for _ in 0..num_contigs_with_mutations {
            let contig_index = read_u32(reader)?;
            if contig_index as u64 >= num_contigs {
                return Err(format!("Mutation table for unknown contig index {}", contig_index));
            }
            if result.mutations.contains_key(&contig_index) {
                return Err(format!("Duplicate mutation table for contig index {}", contig_index));
            }
            let num_mutations = read_u64(reader)?;
            let mut table = Vec::with_capacity(num_mutations as usize);
            for _ in 0..num_mutations {
                let code = read_u8(reader)?;
                let mutation_type = MutationType::from_code(code).ok_or(
                    format!("Invalid mutation type code: {}", code)
                )?;
                let position = read_u32(reader)?;
                let nts = read_string(reader)?;
                table.push(Mutation { mutation_type, position, nts });
            }
            result.mutations.insert(contig_index, table);
        }

        let num_alignments = read_u64(reader)?;
        for i in 0..num_alignments {
            let read_index = read_u32(reader)?;
            let contig_index = read_u32(reader)?;
            let read_start = read_u32(reader)?;
            let read_end = read_u32(reader)?;
            let contig_start = read_u32(reader)?;
            let contig_end = read_u32(reader)?;
            let is_reverse = match read_u8(reader)? {
                0 => false,
                1 => true,
                flag => return Err(format!("Invalid strand flag for alignment {}: {}", i, flag)),
            };
            if read_index as u64 >= num_reads {
                return Err(format!("Alignment {} references unknown read index {}", i, read_index));
            }
            if contig_index as u64 >= num_contigs {
                return Err(format!("Alignment {} references unknown contig index {}", i, contig_index));
            }
            if read_end <= read_start {
                return Err(format!("Alignment {} with an empty read interval", i));
            }
            if contig_end <= contig_start {
                return Err(format!("Alignment {} with an empty contig interval", i));
            }

            let num_indices = read_u64(reader)?;
            let mutation_table = result.mutations.get(&contig_index);
            let mut mutations = Vec::with_capacity(num_indices as usize);
            for _ in 0..num_indices {
                let mutation_index = read_u32(reader)?;
                let mutation = mutation_table.and_then(|table| table.get(mutation_index as usize)).ok_or(
                    format!("Alignment {} references unknown mutation index {}", i, mutation_index)
                )?;
                if mutation.position < contig_start || mutation.position >= contig_end {
                    return Err(format!(
                        "Alignment {} references a mutation at {} outside [{}, {})",
                        i, mutation.position, contig_start, contig_end
                    ));
                }
                if mutation.position as u64 + mutation.target_len() as u64 > contig_end as u64 {
                    return Err(format!(
                        "Alignment {} references a mutation at {} extending past {}",
                        i, mutation.position, contig_end
                    ));
                }
                mutations.push(mutation_index);
            }

            result.alignments.push(Alignment {
                read_index, contig_index,
                read_start, read_end,
                contig_start, contig_end,
                is_reverse,
                mutations,
            });
        }

        Ok(result)
    }
}

//-----------------------------------------------------------------------------

/// Summary statistics for a store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreStatistics {
    /// Number of contigs.
    pub contigs: usize,
    /// Number of reads.
    pub reads: usize,
    /// Number of alignments.
    pub alignments: usize,
    /// Number of distinct mutations.
    pub mutations: usize,
    /// Total number of mutation references in the alignments.
    pub mutation_refs: usize,
    /// Mean aligned read length over the alignments.
    pub avg_alignment_length: f64,
    /// Mean number of mutations per alignment.
    pub avg_mutations: f64,
}

/// Exporting and statistics.
impl AlignmentStore {
    /// Returns summary statistics for the store.
    pub fn statistics(&self) -> StoreStatistics {
        let total_length: u64 = self.alignments.iter().map(|aln| aln.read_len() as u64).sum();
        let mutation_refs: usize = self.alignments.iter().map(|aln| aln.mutations.len()).sum();
        let count = self.alignments.len();
        StoreStatistics {
            contigs: self.num_contigs(),
            reads: self.num_reads(),
            alignments: count,
            mutations: self.num_mutations(),
            mutation_refs,
            avg_alignment_length: if count > 0 { total_length as f64 / count as f64 } else { 0.0 },
            avg_mutations: if count > 0 { mutation_refs as f64 / count as f64 } else { 0.0 },
        }
    }

    /// Writes the alignment table as tab-separated text.
    pub fn write_alignment_table<W: Write>(&self, writer: &mut W) -> Result<(), String> {
        writer.write_all(b"read_id\tread_start\tread_end\tcontig_id\tcontig_start\tcontig_end\tmutation_count\tis_reverse\n")
            .map_err(|x| x.to_string())?;
        for aln in self.alignments.iter() {
            let line = format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                self.read_id(aln.read_index as usize),
                aln.read_start, aln.read_end,
                self.contig_id(aln.contig_index as usize),
                aln.contig_start, aln.contig_end,
                aln.mutations.len(),
                aln.is_reverse
            );
            writer.write_all(line.as_bytes()).map_err(|x| x.to_string())?;
        }
        Ok(())
    }

    /// Writes the mutations of every alignment as tab-separated text.
    pub fn write_mutation_table<W: Write>(&self, writer: &mut W) -> Result<(), String> {
        writer.write_all(b"read_id\tcontig_id\tmutation_type\tcontig_position\tnts\n")
            .map_err(|x| x.to_string())?;
        for aln in self.alignments.iter() {
            for mutation_index in aln.mutations.iter() {
                let mutation = self.mutation(aln.contig_index, *mutation_index);
                let line = format!(
                    "{}\t{}\t{}\t{}\t{}\n",
                    self.read_id(aln.read_index as usize),
                    self.contig_id(aln.contig_index as usize),
                    mutation.mutation_type,
                    mutation.position,
                    mutation.nts
                );
                writer.write_all(line.as_bytes()).map_err(|x| x.to_string())?;
            }
        }
        Ok(())
    }

    /// Writes the alignment and mutation tables to `PREFIX_alignments.txt`
    /// and `PREFIX_mutations.txt`.
    pub fn export_tab_delimited(&self, prefix: &str) -> Result<(), String> {
        let alignments_file = format!("{}_alignments.txt", prefix);
        eprintln!("Writing alignments to {}", alignments_file);
        let mut writer = BufWriter::new(File::create(&alignments_file).map_err(|x| {
            format!("Failed to create {}: {}", alignments_file, x)
        })?);
        self.write_alignment_table(&mut writer)?;
        writer.flush().map_err(|x| x.to_string())?;

        let mutations_file = format!("{}_mutations.txt", prefix);
        eprintln!("Writing mutations to {}", mutations_file);
        let mut writer = BufWriter::new(File::create(&mutations_file).map_err(|x| {
            format!("Failed to create {}: {}", mutations_file, x)
        })?);
        self.write_mutation_table(&mut writer)?;
        writer.flush().map_err(|x| x.to_string())?;

        Ok(())
    }
}

//-----------------------------------------------------------------------------
