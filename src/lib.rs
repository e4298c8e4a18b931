//! # ALN-store: a queryable store for long-read alignments with mutations.
//!
//! This crate stores pairwise alignments of long reads to contigs together
//! with their per-base differences (substitutions, insertions, deletions),
//! decoded from the `cs` tag of a PAF file.
//! The store is built once, saved into a compact binary file, and then
//! queried by contig intervals.
//!
//! ### The store
//!
//! [`AlignmentStore`] keeps contig and read dictionaries, an alignment
//! table, and one mutation table per contig.
//! Mutations are deduplicated: a variant shared by many reads is stored
//! once and referenced by index, which keeps deep alignment stacks small.
//! The on-disk format is versioned (magic `ALNSTV2`), little-endian, and
//! described in [`store`].
//!
//! Interval queries use a per-contig index sorted by start position.
//! Binary search bounds the candidate range with the longest alignment
//! length on the contig, so a query inspects only the alignments near the
//! interval.
//!
//! ### Ingestion
//!
//! [`paf::read_paf`] parses PAF lines, interns reads and contigs, decodes
//! the difference strings (see [`alignment::Difference`]), and inserts the
//! mutations through the deduplicating store.
//! The difference string is regenerated from the stored mutations and must
//! match the input byte-for-byte, so the decoded representation is known to
//! be faithful.
//! Optionally every record is verified by reapplying its mutations to the
//! reference (see [`verify`]).
//!
//! ### Queries
//!
//! Three engines aggregate the alignments overlapping a set of intervals
//! (see [`query`]): per-alignment enumeration with layout heights, a
//! per-position pileup with variant counts, and fixed-width bins of
//! sequencing and mutation counts.
//! All of them write tab-separated tables.
//!
//! The `paf2aln`, `alninfo`, `aln2tsv`, and `query` binaries wrap these
//! pieces into a command-line workflow.

pub mod alignment;
pub mod formats;
pub mod paf;
pub mod query;
pub mod store;
pub mod utils;
pub mod verify;

#[cfg(test)]
mod internal;


pub use alignment::{Alignment, Contig, Interval, Mutation, MutationType, Read};
pub use paf::{PafParams, PafSummary, VerificationData};
pub use store::{AlignmentStore, StoreStatistics};
