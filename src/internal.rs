// Utilities shared by the tests of several modules.

use crate::alignment::{Alignment, Difference};
use crate::store::AlignmentStore;

//-----------------------------------------------------------------------------

// Adds an alignment to the store, deriving its mutations from a difference
// string the way the ingester does.
#[allow(clippy::too_many_arguments)]
pub(crate) fn add_aln(
    store: &mut AlignmentStore,
    read_id: &str, read_len: u32, read_range: (u32, u32),
    contig_id: &str, contig_len: u32, contig_range: (u32, u32),
    is_reverse: bool, cs: &[u8],
) {
    let read_index = store.add_or_get_read(read_id, read_len) as u32;
    let contig_index = store.add_or_get_contig(contig_id, contig_len) as u32;

    let ops = Difference::parse(cs).unwrap();
    let (query_len, target_len, _, _) = Difference::stats(&ops);
    assert_eq!(query_len as u32, read_range.1 - read_range.0,
        "Test difference string does not cover the read interval");
    assert_eq!(target_len as u32, contig_range.1 - contig_range.0,
        "Test difference string does not cover the contig interval");

    let mut mutations = Vec::new();
    for mutation in Difference::to_mutations(&ops, contig_range.0) {
        let index = store.add_mutation(contig_index, mutation);
        assert!(index.is_ok(), "Failed to add a mutation: {}", index.unwrap_err());
        mutations.push(index.unwrap());
    }

    store.add_alignment(Alignment {
        read_index, contig_index,
        read_start: read_range.0, read_end: read_range.1,
        contig_start: contig_range.0, contig_end: contig_range.1,
        is_reverse,
        mutations,
    });
}

//-----------------------------------------------------------------------------
