//! Verification of stored alignments against the actual sequences.
//!
//! An alignment's mutations describe how to turn the aligned contig
//! fragment into the aligned read segment.
//! The applier replays the mutations on the fragment, and the verifier
//! compares the result to the read.
//! A mismatch means the difference string, the coordinates, and the
//! sequences do not agree, which usually indicates that the wrong reference
//! was given.
//!
//! Sequences are compared in upper case, so soft-masked references work.

use crate::alignment::{Alignment, MutationType};
use crate::formats::Sequences;
use crate::store::AlignmentStore;
use crate::utils;

//-----------------------------------------------------------------------------

/// Applies the mutations of the alignment to the aligned contig fragment.
///
/// `fragment` must cover exactly `[contig_start, contig_end)` of the contig.
/// The result is the read segment in contig orientation.
/// Returns an error if a mutation does not fit in the fragment or the
/// reference bases do not match the mutation.
pub fn apply_mutations(fragment: &[u8], store: &AlignmentStore, aln: &Alignment) -> Result<Vec<u8>, String> {
    let fragment = utils::seq_to_upper(fragment);
    let mut result: Vec<u8> = Vec::with_capacity(fragment.len());
    let mut prev_rel = 0;

    for (count, mutation_index) in aln.mutations.iter().enumerate() {
        let mutation = store.mutation(aln.contig_index, *mutation_index);
        if mutation.position < aln.contig_start {
            return Err(format!(
                "Mutation {} at {} is before the alignment start {}",
                count, mutation.position, aln.contig_start
            ));
        }
        let rel = (mutation.position - aln.contig_start) as usize;
        if rel > fragment.len() {
            return Err(format!(
                "Mutation {} at {} is outside the fragment of length {}",
                count, mutation.position, fragment.len()
            ));
        }
        if rel < prev_rel {
            return Err(format!(
                "Mutation {} at {} overlaps the previous mutation",
                count, mutation.position
            ));
        }

        // Copy the unchanged sequence up to this mutation.
        result.extend_from_slice(&fragment[prev_rel..rel]);

        let nts = mutation.nts.as_bytes();
        match mutation.mutation_type {
            MutationType::Substitution => {
                assert!(nts.len() == 2, "Substitution with {} bases instead of 2", nts.len());
                if rel >= fragment.len() {
                    return Err(format!(
                        "Substitution at {} is outside the fragment", mutation.position
                    ));
                }
                if fragment[rel] != nts[0] {
                    return Err(format!(
                        "Reference base at {} does not match the substitution: expected {}, found {}",
                        mutation.position, nts[0] as char, fragment[rel] as char
                    ));
                }
                result.push(nts[1]);
                prev_rel = rel + 1;
            },
            MutationType::Insertion => {
                result.extend_from_slice(nts);
                prev_rel = rel;
            },
            MutationType::Deletion => {
                if rel + nts.len() > fragment.len() {
                    return Err(format!(
                        "Deletion at {} is outside the fragment", mutation.position
                    ));
                }
                if &fragment[rel..rel + nts.len()] != nts {
                    return Err(format!(
                        "Reference bases at {} do not match the deletion: expected {}, found {}",
                        mutation.position, mutation.nts,
                        String::from_utf8_lossy(&fragment[rel..rel + nts.len()])
                    ));
                }
                prev_rel = rel + nts.len();
            },
        }
    }

    // Append the remaining reference suffix.
    result.extend_from_slice(&fragment[prev_rel..]);
    Ok(result)
}

/// Returns the read segment the alignment predicts for the aligned contig
/// fragment.
///
/// For reverse alignments, the applied result is reverse-complemented
/// before it is compared to the read.
pub fn expected_read_segment(fragment: &[u8], store: &AlignmentStore, aln: &Alignment) -> Result<Vec<u8>, String> {
    let result = apply_mutations(fragment, store, aln)?;
    if aln.is_reverse {
        Ok(utils::reverse_complement(&result))
    } else {
        Ok(result)
    }
}

//-----------------------------------------------------------------------------

// Number of bases of context shown around a mismatch.
const CONTEXT: usize = 8;

fn context_window(sequence: &[u8], offset: usize) -> String {
    let start = offset.saturating_sub(CONTEXT);
    let end = (offset + CONTEXT + 1).min(sequence.len());
    String::from_utf8_lossy(&sequence[start..end]).into_owned()
}

/// Verifies the alignment against the actual read and contig sequences.
///
/// Returns an error describing the first problem found: a missing sequence,
/// coordinates outside a sequence, a reference mismatch while applying the
/// mutations, or a difference between the predicted and the actual read
/// segment.
pub fn verify_alignment(
    store: &AlignmentStore, aln: &Alignment,
    reads: &Sequences, contigs: &Sequences,
) -> Result<(), String> {
    let read_id = store.read_id(aln.read_index as usize);
    let contig_id = store.contig_id(aln.contig_index as usize);

    let contig = contigs.get(contig_id).ok_or(format!("Contig {} not found in the sequences", contig_id))?;
    let read = reads.get(read_id).ok_or(format!("Read {} not found in the sequences", read_id))?;
    if aln.contig_end as usize > contig.len() {
        return Err(format!(
            "Contig {} is shorter ({}) than the alignment end ({})",
            contig_id, contig.len(), aln.contig_end
        ));
    }
    if aln.read_end as usize > read.len() {
        return Err(format!(
            "Read {} is shorter ({}) than the alignment end ({})",
            read_id, read.len(), aln.read_end
        ));
    }

    let fragment = &contig[aln.contig_start as usize..aln.contig_end as usize];
    let expected = expected_read_segment(fragment, store, aln).map_err(|x| {
        format!("Read {} on contig {}: {}", read_id, contig_id, x)
    })?;
    let segment = utils::seq_to_upper(&read[aln.read_start as usize..aln.read_end as usize]);

    for (i, (expected_base, read_base)) in expected.iter().zip(segment.iter()).enumerate() {
        if expected_base != read_base {
            return Err(format!(
                "Read {} on contig {}: mismatch at segment offset {}\nread     : {}\nexpected : {}",
                read_id, contig_id, i,
                context_window(&segment, i), context_window(&expected, i)
            ));
        }
    }
    if expected.len() != segment.len() {
        return Err(format!(
            "Read {} on contig {}: read segment length ({}) does not match the expected length ({})",
            read_id, contig_id, segment.len(), expected.len()
        ));
    }

    Ok(())
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::alignment::Difference;

    // Builds a single-alignment store from a difference string.
    fn store_with(
        contig_range: (u32, u32), read_range: (u32, u32), is_reverse: bool, cs: &[u8],
    ) -> AlignmentStore {
        let mut store = AlignmentStore::new();
        let contig_index = store.add_or_get_contig("C", 100) as u32;
        let read_index = store.add_or_get_read("R", 100) as u32;
        let ops = Difference::parse(cs).unwrap();
        let mut mutations = Vec::new();
        for mutation in Difference::to_mutations(&ops, contig_range.0) {
            mutations.push(store.add_mutation(contig_index, mutation).unwrap());
        }
        store.add_alignment(Alignment {
            read_index, contig_index,
            read_start: read_range.0, read_end: read_range.1,
            contig_start: contig_range.0, contig_end: contig_range.1,
            is_reverse,
            mutations,
        });
        store
    }

    fn sequences(id: &str, bases: &[u8]) -> Sequences {
        let mut result = Sequences::new();
        result.insert(String::from(id), bases.to_vec());
        result
    }

    #[test]
    fn apply_perfect_match() {
        let store = store_with((0, 7), (0, 7), false, b":7");
        let result = apply_mutations(b"GATTACA", &store, store.alignment(0));
        assert_eq!(result, Ok(b"GATTACA".to_vec()));
    }

    #[test]
    fn apply_each_mutation_type() {
        // GATTACA with a substitution at 1, an insertion before 3, and a
        // deletion of CA at 4.
        let store = store_with((0, 7), (0, 7), false, b":1*ac:1+gg:1-ac:1");
        let result = apply_mutations(b"GATTACA", &store, store.alignment(0));
        assert_eq!(result, Ok(b"GCTGGTA".to_vec()));
    }

    #[test]
    fn apply_lower_case_fragment() {
        let store = store_with((0, 7), (0, 7), false, b":1*ac:5");
        let result = apply_mutations(b"gattaca", &store, store.alignment(0));
        assert_eq!(result, Ok(b"GCTTACA".to_vec()), "Soft-masked reference was not handled");
    }

    #[test]
    fn apply_reference_mismatch() {
        // The fragment has T at the substituted position, not A.
        let store = store_with((0, 7), (0, 7), false, b":2*ac:4");
        let result = apply_mutations(b"GATTACA", &store, store.alignment(0));
        assert!(result.is_err(), "Applied a substitution with the wrong reference base");

        let store = store_with((0, 7), (0, 7), false, b":2-gg:3");
        let result = apply_mutations(b"GATTACA", &store, store.alignment(0));
        assert!(result.is_err(), "Applied a deletion with the wrong reference bases");
    }

    #[test]
    fn apply_out_of_bounds() {
        let store = store_with((0, 7), (0, 7), false, b":6-ca");
        let result = apply_mutations(b"GATTAC", &store, store.alignment(0));
        assert!(result.is_err(), "Applied a deletion past the end of the fragment");
    }

    #[test]
    fn verify_forward() {
        let store = store_with((2, 9), (1, 8), false, b":1*ac:1+gg:1-ac:1");
        // Contig positions 2..9 are GATTACA; the expected segment is GCTGGTA.
        let contigs = sequences("C", b"CCGATTACAGG");
        let reads = sequences("R", b"TGCTGGTACC");
        let result = verify_alignment(&store, store.alignment(0), &reads, &contigs);
        assert!(result.is_ok(), "Verification failed: {}", result.unwrap_err());
    }

    #[test]
    fn verify_reverse() {
        let store = store_with((2, 9), (1, 8), true, b":1*ac:1+gg:1-ac:1");
        let contigs = sequences("C", b"CCGATTACAGG");
        // The read carries the reverse complement of GCTGGTA.
        let reads = sequences("R", b"TTACCAGCCC");
        let result = verify_alignment(&store, store.alignment(0), &reads, &contigs);
        assert!(result.is_ok(), "Verification failed: {}", result.unwrap_err());
    }

    #[test]
    fn verify_detects_mismatch() {
        let store = store_with((2, 9), (1, 8), false, b":7");
        let contigs = sequences("C", b"CCGATTACAGG");
        let reads = sequences("R", b"TGATTATACC");
        let result = verify_alignment(&store, store.alignment(0), &reads, &contigs);
        assert!(result.is_err(), "Verification passed with a mismatching read");
    }

    #[test]
    fn verify_detects_length_mismatch() {
        // The alignment claims an 8 bp read segment but the mutations
        // produce 7 bp.
        let store = store_with((2, 9), (0, 8), false, b":7");
        let contigs = sequences("C", b"CCGATTACAGG");
        let reads = sequences("R", b"GATTACAT");
        let result = verify_alignment(&store, store.alignment(0), &reads, &contigs);
        assert!(result.is_err(), "Verification passed with a length mismatch");
    }

    #[test]
    fn verify_missing_sequences() {
        let store = store_with((2, 9), (1, 8), false, b":7");
        let contigs = sequences("C", b"CCGATTACAGG");
        let reads = sequences("R", b"TGATTACACC");
        assert!(verify_alignment(&store, store.alignment(0), &Sequences::new(), &contigs).is_err(),
            "Verification passed without the read");
        assert!(verify_alignment(&store, store.alignment(0), &reads, &Sequences::new()).is_err(),
            "Verification passed without the contig");
    }

    #[test]
    fn verify_short_contig() {
        let store = store_with((2, 9), (1, 8), false, b":7");
        let contigs = sequences("C", b"CCGAT");
        let reads = sequences("R", b"TGATTACACC");
        assert!(verify_alignment(&store, store.alignment(0), &reads, &contigs).is_err(),
            "Verification passed with a contig shorter than the alignment");
    }
}

//-----------------------------------------------------------------------------
