//! Query engines over an alignment store.
//!
//! All engines take a set of query intervals and aggregate the alignments
//! overlapping them:
//!
//! * [`full::FullQuery`] enumerates every alignment and mutation, with a
//!   layout height for plotting.
//! * [`pileup::PileupQuery`] aggregates per-position coverage and variant
//!   counts.
//! * [`bin::BinQuery`] aggregates sequenced bases and mutation counts over
//!   fixed-width bins.
//!
//! The engines borrow the store immutably and buffer their output rows, so
//! a query can be executed once and written or inspected afterwards.
//! Output is deterministic: rows follow the `(contig index, position)`
//! order, with the tie-breaking rules documented per engine.

use std::fmt::Display;
use std::str::FromStr;

pub mod bin;
pub mod full;
pub mod pileup;


//-----------------------------------------------------------------------------

/// Query mode: which engine to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryMode {
    /// Enumerate alignments and mutations.
    Full,
    /// Per-position coverage and variant counts.
    Pileup,
    /// Fixed-width bin aggregation.
    Bin,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "full" => Ok(Self::Full),
            "pileup" => Ok(Self::Pileup),
            "bin" => Ok(Self::Bin),
            _ => Err(format!("Invalid query mode: {} (expected full, pileup, or bin)", mode)),
        }
    }
}

impl Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Pileup => write!(f, "pileup"),
            Self::Bin => write!(f, "bin"),
        }
    }
}

//-----------------------------------------------------------------------------

/// Height assignment policy for the full engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeightStyle {
    /// Greedy packing by start coordinate: the lowest level whose previous
    /// alignment has ended.
    #[default]
    ByCoord,
    /// Alignments with the highest mutation density get the lowest levels.
    ByMutations,
}

impl FromStr for HeightStyle {
    type Err = String;

    fn from_str(style: &str) -> Result<Self, Self::Err> {
        match style {
            "by_coord" => Ok(Self::ByCoord),
            "by_mutations" => Ok(Self::ByMutations),
            _ => Err(format!("Invalid height style: {} (expected by_coord or by_mutations)", style)),
        }
    }
}

impl Display for HeightStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByCoord => write!(f, "by_coord"),
            Self::ByMutations => write!(f, "by_mutations"),
        }
    }
}

//-----------------------------------------------------------------------------

/// Report mode for the pileup engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PileupMode {
    /// Report every position in the query intervals.
    All,
    /// Report positions with nonzero coverage.
    #[default]
    Covered,
    /// Report positions with at least one variant observation.
    Mutated,
}

impl FromStr for PileupMode {
    type Err = String;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "all" => Ok(Self::All),
            "covered" => Ok(Self::Covered),
            "mutated" => Ok(Self::Mutated),
            _ => Err(format!("Invalid pileup mode: {} (expected all, covered, or mutated)", mode)),
        }
    }
}

impl Display for PileupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Covered => write!(f, "covered"),
            Self::Mutated => write!(f, "mutated"),
        }
    }
}

//-----------------------------------------------------------------------------
