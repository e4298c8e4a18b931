//! Basic types for alignments between long reads and contigs.
//!
//! An [`Alignment`] maps a segment of a read onto a segment of a contig,
//! together with the list of [`Mutation`]s (substitutions, insertions,
//! deletions) that turn the contig segment into the read segment.
//! The mutations are derived from the difference string (`cs` tag) of a
//! pairwise mapping, as emitted by minimap2 with `--cs`.
//! See the [minimap2 man page](https://lh3.github.io/minimap2/minimap2.html#10)
//! for the tag format.
//!
//! Alignments do not own their mutations.
//! They store indices into a per-contig mutation table in
//! [`crate::AlignmentStore`], which keeps a single physical copy of each
//! distinct mutation.

use crate::utils;

use std::fmt::Display;
use std::str;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// A reference sequence with a stable identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contig {
    /// Name of the contig.
    pub id: String,
    /// Length of the contig in base pairs.
    pub length: u32,
}

impl Contig {
    /// Creates a new contig.
    pub fn new(id: &str, length: u32) -> Self {
        Contig { id: String::from(id), length }
    }
}

/// A sequencing read with a stable identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Read {
    /// Name of the read.
    pub id: String,
    /// Length of the read in base pairs.
    pub length: u32,
}

impl Read {
    /// Creates a new read.
    pub fn new(id: &str, length: u32) -> Self {
        Read { id: String::from(id), length }
    }
}

//-----------------------------------------------------------------------------

/// Type of a mutation in an alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MutationType {
    /// Substitution of a single base.
    Substitution,
    /// Insertion of bases to the left of the stored position.
    Insertion,
    /// Deletion of reference bases starting at the stored position.
    Deletion,
}

impl MutationType {
    /// Returns the type corresponding to the given code in the binary format.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Substitution),
            1 => Some(Self::Insertion),
            2 => Some(Self::Deletion),
            _ => None,
        }
    }

    /// Returns the code used for this type in the binary format.
    pub fn code(&self) -> u8 {
        match self {
            Self::Substitution => 0,
            Self::Insertion => 1,
            Self::Deletion => 2,
        }
    }
}

impl Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Substitution => write!(f, "SUB"),
            Self::Insertion => write!(f, "INS"),
            Self::Deletion => write!(f, "DEL"),
        }
    }
}

//-----------------------------------------------------------------------------

/// A typed difference between a read and a contig at a contig position.
///
/// Positions are absolute 0-based contig coordinates.
/// The meaning of the `nts` string depends on the type:
///
/// * Substitution: two bases, the reference base followed by the read base.
/// * Insertion: the inserted bases; the insertion is to the left of `position`.
/// * Deletion: the deleted reference bases starting at `position`.
///
/// Bases are stored in upper case.
/// Two mutations are the same mutation if and only if they are on the same
/// contig and `(position, mutation_type, nts)` match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mutation {
    /// Type of the mutation.
    pub mutation_type: MutationType,
    /// Absolute 0-based position on the contig.
    pub position: u32,
    /// Bases involved in the mutation.
    pub nts: String,
}

impl Mutation {
    /// Creates a new mutation.
    pub fn new(mutation_type: MutationType, position: u32, nts: &str) -> Self {
        Mutation {
            mutation_type, position,
            nts: String::from(nts),
        }
    }

    /// Returns the deduplication key for this mutation on the given contig.
    ///
    /// The key is only used while the store is being built and is not part
    /// of the persisted format.
    pub fn key(&self, contig_index: u32) -> String {
        format!("{}_{}_{}_{}", contig_index, self.position, self.mutation_type, self.nts)
    }

    /// Returns the textual form of the mutation used in query output.
    ///
    /// The forms are `ref:read` for a substitution, `+bases` for an
    /// insertion, and `-bases` for a deletion, with bases in lower case.
    pub fn description(&self) -> String {
        let nts = self.nts.to_lowercase();
        match self.mutation_type {
            MutationType::Substitution => {
                assert!(nts.len() == 2, "Substitution with {} bases instead of 2", nts.len());
                format!("{}:{}", &nts[0..1], &nts[1..2])
            },
            MutationType::Insertion => format!("+{}", nts),
            MutationType::Deletion => format!("-{}", nts),
        }
    }

    /// Returns the length of the mutation on the contig.
    pub fn target_len(&self) -> u32 {
        match self.mutation_type {
            MutationType::Substitution => 1,
            MutationType::Insertion => 0,
            MutationType::Deletion => self.nts.len() as u32,
        }
    }
}

//-----------------------------------------------------------------------------

/// An alignment between a read segment and a contig segment.
///
/// Both coordinate ranges are 0-based and half-open.
/// The mutation list stores indices into the mutation table of the contig
/// in a [`crate::AlignmentStore`], in the order produced by the difference
/// string parser (ascending by position).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Index of the read in the read table.
    pub read_index: u32,
    /// Index of the contig in the contig table.
    pub contig_index: u32,
    /// Start of the aligned interval of the read.
    pub read_start: u32,
    /// End of the aligned interval of the read.
    pub read_end: u32,
    /// Start of the aligned interval of the contig.
    pub contig_start: u32,
    /// End of the aligned interval of the contig.
    pub contig_end: u32,
    /// Is the read aligned to the reverse strand?
    pub is_reverse: bool,
    /// Indices into the mutation table of the contig.
    pub mutations: Vec<u32>,
}

impl Alignment {
    /// Returns the length of the aligned contig interval.
    pub fn contig_len(&self) -> u32 {
        self.contig_end - self.contig_start
    }

    /// Returns the length of the aligned read interval.
    pub fn read_len(&self) -> u32 {
        self.read_end - self.read_start
    }
}

//-----------------------------------------------------------------------------

/// A half-open interval `[start, end)` on a named contig.
///
/// Intervals are the query inputs for the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Interval {
    /// Name of the contig.
    pub contig: String,
    /// Start of the interval.
    pub start: u32,
    /// Past-the-end position of the interval.
    pub end: u32,
}

impl Interval {
    /// Creates a new interval.
    pub fn new(contig: &str, start: u32, end: u32) -> Self {
        Interval { contig: String::from(contig), start, end }
    }

    /// Returns `true` if the interval contains no positions.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}

//-----------------------------------------------------------------------------

/// An operation in a difference string (`cs` tag).
///
/// This implementation supports the short form of the tag:
///
/// * `:`: A match given as the match length.
/// * `*`: A mismatch given as the reference base and the read base.
/// * `+`: An insertion given as the inserted sequence.
/// * `-`: A deletion given as the deleted reference sequence.
///
/// Operations `=` (match given as the matching sequence) and `~` (intron
/// length and splice signal) are recognized but not supported; records
/// containing them should be skipped rather than failed.
/// Parsing is based on bytes rather than characters to avoid unnecessary
/// UTF-8 validation, and bases are stored in upper case.
///
/// # Examples
///
/// ```
/// use aln_store::alignment::Difference;
///
/// let with_gaps = b":48-cat:44+gattaca:51";
/// let ops = Difference::parse(with_gaps).unwrap();
/// assert_eq!(ops.len(), 5);
/// assert_eq!(ops[0], Difference::Match(48));
/// assert_eq!(ops[1], Difference::Deletion(b"CAT".to_vec()));
/// assert_eq!(ops[2], Difference::Match(44));
/// assert_eq!(ops[3], Difference::Insertion(b"GATTACA".to_vec()));
/// assert_eq!(ops[4], Difference::Match(51));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Difference {
    /// A match of the given length.
    Match(usize),
    /// A mismatch given as the reference base and the read base.
    Mismatch(u8, u8),
    /// An insertion given as the inserted sequence.
    Insertion(Vec<u8>),
    /// A deletion given as the deleted reference sequence.
    Deletion(Vec<u8>),
}

impl Difference {
    // Supported operation codes.
    const OPS: &'static [u8] = b":*+-";

    // Recognized but unsupported operation codes.
    const UNSUPPORTED_OPS: &'static [u8] = b"=~";

    fn is_op(c: u8) -> bool {
        Self::OPS.contains(&c) || Self::UNSUPPORTED_OPS.contains(&c)
    }

    /// Returns the first unsupported operation code in the difference
    /// string, or [`None`] if all operations are supported.
    ///
    /// Operation arguments never contain `=` or `~`, so a simple scan is
    /// enough.
    pub fn unsupported_op(difference_string: &[u8]) -> Option<u8> {
        difference_string.iter().copied().find(|c| Self::UNSUPPORTED_OPS.contains(c))
    }

    fn match_length(value: &[u8]) -> Option<Self> {
        let len = str::from_utf8(value).ok()?;
        let len = len.parse::<usize>().ok()?;
        Some(Self::Match(len))
    }

    fn mismatch(value: &[u8]) -> Option<Self> {
        if value.len() != 2 {
            return None;
        }
        Some(Self::Mismatch(value[0].to_ascii_uppercase(), value[1].to_ascii_uppercase()))
    }

    fn insertion(value: &[u8]) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(Self::Insertion(utils::seq_to_upper(value)))
    }

    fn deletion(value: &[u8]) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(Self::Deletion(utils::seq_to_upper(value)))
    }

    /// Parses a difference string and returns it as a vector of operations.
    ///
    /// Returns an error if the difference string is invalid or contains
    /// unsupported operations.
    /// Use [`Difference::unsupported_op`] first to distinguish records that
    /// should be skipped from records that should fail.
    pub fn parse(difference_string: &[u8]) -> Result<Vec<Self>, String> {
        let mut result: Vec<Self> = Vec::new();
        if difference_string.is_empty() {
            return Ok(result);
        }
        if !Self::is_op(difference_string[0]) {
            return Err(format!("Invalid difference string operation: {}", difference_string[0] as char));
        }

        let mut start = 0;
        while start < difference_string.len() {
            let mut end = start + 1;
            while end < difference_string.len() && !Self::is_op(difference_string[end]) {
                end += 1;
            }
            let value = &difference_string[start + 1..end];
            let op = match difference_string[start] {
                b':' => Self::match_length(value),
                b'*' => Self::mismatch(value),
                b'+' => Self::insertion(value),
                b'-' => Self::deletion(value),
                c => return Err(format!("Unsupported difference string operation: {}", c as char)),
            }.ok_or(format!("Invalid difference string field: {}", String::from_utf8_lossy(&difference_string[start..end])))?;
            result.push(op);
            start = end;
        }

        Ok(result)
    }

    /// Returns the length of the operation on the contig.
    pub fn target_len(&self) -> usize {
        match self {
            Self::Match(len) => *len,
            Self::Mismatch(_, _) => 1,
            Self::Insertion(_) => 0,
            Self::Deletion(seq) => seq.len(),
        }
    }

    /// Returns the length of the operation on the read.
    pub fn query_len(&self) -> usize {
        match self {
            Self::Match(len) => *len,
            Self::Mismatch(_, _) => 1,
            Self::Insertion(seq) => seq.len(),
            Self::Deletion(_) => 0,
        }
    }

    /// Calculates various statistics from a sequence of operations.
    ///
    /// The return value is (read length, contig length, matches, edits).
    pub fn stats(ops: &[Self]) -> (usize, usize, usize, usize) {
        let mut query_len = 0;
        let mut target_len = 0;
        let mut matches = 0;
        let mut edits = 0;
        for op in ops.iter() {
            query_len += op.query_len();
            target_len += op.target_len();
            match op {
                Self::Match(len) => matches += len,
                _ => edits += op.query_len().max(op.target_len()),
            }
        }
        (query_len, target_len, matches, edits)
    }

    /// Converts a sequence of operations into mutations with absolute
    /// contig positions.
    ///
    /// `contig_start` is the start of the aligned contig interval.
    /// The mutations are returned in parse order, which is ascending by
    /// position.
    pub fn to_mutations(ops: &[Self], contig_start: u32) -> Vec<Mutation> {
        let mut result = Vec::new();
        let mut pos = contig_start;
        for op in ops.iter() {
            match op {
                Self::Match(len) => {
                    pos += *len as u32;
                },
                Self::Mismatch(ref_base, read_base) => {
                    let nts: String = [*ref_base as char, *read_base as char].iter().collect();
                    result.push(Mutation::new(MutationType::Substitution, pos, &nts));
                    pos += 1;
                },
                Self::Insertion(seq) => {
                    let nts = String::from_utf8_lossy(seq);
                    result.push(Mutation::new(MutationType::Insertion, pos, &nts));
                },
                Self::Deletion(seq) => {
                    let nts = String::from_utf8_lossy(seq);
                    result.push(Mutation::new(MutationType::Deletion, pos, &nts));
                    pos += seq.len() as u32;
                },
            }
        }
        result
    }
}

//-----------------------------------------------------------------------------

/// Regenerates a difference string from the mutations of an alignment.
///
/// The mutations must be in ascending order by position within
/// `[contig_start, contig_end)`.
/// Match runs are emitted as `:n` for every nonzero gap between successive
/// mutations and after the last mutation, and bases are emitted in lower
/// case.
/// The output parses back to the same mutation list, and ingestion relies
/// on the output being byte-identical to the difference string the
/// mutations were decoded from.
///
/// # Panics
///
/// Panics if a mutation is out of order or outside the aligned interval.
pub fn generate_cs_tag<'a>(mutations: impl IntoIterator<Item = &'a Mutation>, contig_start: u32, contig_end: u32) -> String {
    let mut result = String::new();
    let mut current_rel = 0;

    for mutation in mutations {
        assert!(
            mutation.position >= contig_start && mutation.position < contig_end,
            "Mutation at {} outside the aligned interval [{}, {})",
            mutation.position, contig_start, contig_end
        );
        let mutation_rel = mutation.position - contig_start;
        assert!(
            mutation_rel >= current_rel,
            "Mutation at {} out of order in the alignment", mutation.position
        );

        let gap = mutation_rel - current_rel;
        if gap > 0 {
            result.push(':');
            result.push_str(&gap.to_string());
            current_rel += gap;
        }

        let nts = mutation.nts.to_lowercase();
        match mutation.mutation_type {
            MutationType::Substitution => {
                assert!(nts.len() == 2, "Substitution with {} bases instead of 2", nts.len());
                result.push('*');
                result.push_str(&nts);
                current_rel = mutation_rel + 1;
            },
            MutationType::Insertion => {
                result.push('+');
                result.push_str(&nts);
            },
            MutationType::Deletion => {
                result.push('-');
                result.push_str(&nts);
                current_rel = mutation_rel + mutation.nts.len() as u32;
            },
        }
    }

    let gap = (contig_end - contig_start) - current_rel;
    if gap > 0 {
        result.push(':');
        result.push_str(&gap.to_string());
    }

    result
}

//-----------------------------------------------------------------------------

/// A typed optional field used in formats such as SAM, PAF, and GAF.
///
/// The field corresponds to a TAG:TYPE:VALUE string.
/// Supported types include A (single character), Z (string), i (integer),
/// f (float), and b (boolean).
/// Parsing is based on bytes rather than characters to avoid unnecessary
/// UTF-8 validation.
///
/// # Examples
///
/// ```
/// use aln_store::alignment::TypedField;
///
/// let alignment_score = "AS:i:160";
/// let field = TypedField::parse(alignment_score.as_bytes());
/// assert_eq!(field, Ok(TypedField::Int([b'A', b'S'], 160)));
/// assert_eq!(field.unwrap().to_string(), alignment_score);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TypedField {
    /// A single character.
    Char([u8; 2], u8),
    /// A string.
    String([u8; 2], Vec<u8>),
    /// An integer.
    Int([u8; 2], isize),
    /// A float.
    Float([u8; 2], f64),
    /// A boolean value.
    Bool([u8; 2], bool),
}

impl TypedField {
    /// Parses the field from a TAG:TYPE:VALUE string.
    ///
    /// Returns an error if the field cannot be parsed or the type is
    /// unsupported.
    pub fn parse(field: &[u8]) -> Result<Self, String> {
        if field.len() < 5 || field[2] != b':' || field[4] != b':' {
            return Err(format!("Invalid typed field: {}", String::from_utf8_lossy(field)));
        }
        let tag = [field[0], field[1]];
        match field[3] {
            b'A' => {
                if field.len() != 6 {
                    return Err(format!("Invalid char field {}", String::from_utf8_lossy(field)));
                }
                Ok(TypedField::Char(tag, field[5]))
            },
            b'Z' => Ok(TypedField::String(tag, field[5..].to_vec())),
            b'i' => {
                let value = String::from_utf8_lossy(&field[5..]);
                let value = value.parse::<isize>().map_err(|err| {
                    format!("Invalid int field {}: {}", value, err)
                })?;
                Ok(TypedField::Int(tag, value))
            },
            b'f' => {
                let value = String::from_utf8_lossy(&field[5..]);
                let value = value.parse::<f64>().map_err(|err| {
                    format!("Invalid float field {}: {}", value, err)
                })?;
                Ok(TypedField::Float(tag, value))
            },
            b'b' => {
                if field.len() != 6 {
                    return Err(format!("Invalid bool field {}", String::from_utf8_lossy(field)));
                }
                match field[5] {
                    b'0' => Ok(TypedField::Bool(tag, false)),
                    b'1' => Ok(TypedField::Bool(tag, true)),
                    _ => Err(format!("Invalid bool field {}", String::from_utf8_lossy(field))),
                }
            },
            _ => Err(format!("Unsupported field type: {}", field[3] as char)),
        }
    }

    /// Returns the tag of the field.
    pub fn tag(&self) -> [u8; 2] {
        match self {
            TypedField::Char(tag, _) => *tag,
            TypedField::String(tag, _) => *tag,
            TypedField::Int(tag, _) => *tag,
            TypedField::Float(tag, _) => *tag,
            TypedField::Bool(tag, _) => *tag,
        }
    }
}

impl Display for TypedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedField::Char(tag, value) => {
                write!(f, "{}{}:A:{}", tag[0] as char, tag[1] as char, *value as char)
            },
            TypedField::String(tag, value) => {
                let value = String::from_utf8_lossy(value);
                write!(f, "{}{}:Z:{}", tag[0] as char, tag[1] as char, value)
            },
            TypedField::Int(tag, value) => {
                write!(f, "{}{}:i:{}", tag[0] as char, tag[1] as char, value)
            },
            TypedField::Float(tag, value) => {
                write!(f, "{}{}:f:{}", tag[0] as char, tag[1] as char, value)
            },
            TypedField::Bool(tag, value) => {
                write!(f, "{}{}:b:{}", tag[0] as char, tag[1] as char, if *value { '1' } else { '0' })
            },
        }
    }
}

//-----------------------------------------------------------------------------
