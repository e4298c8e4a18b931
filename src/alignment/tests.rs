use super::*;

//-----------------------------------------------------------------------------

// Tests for `Difference`: parsing.

fn check_parse(difference_string: &[u8], truth: &[Difference]) {
    let ops = Difference::parse(difference_string);
    assert!(ops.is_ok(), "Failed to parse {}: {}",
        String::from_utf8_lossy(difference_string), ops.unwrap_err());
    assert_eq!(ops.unwrap(), truth, "Wrong operations for {}",
        String::from_utf8_lossy(difference_string));
}

fn check_parse_fails(difference_string: &[u8]) {
    let ops = Difference::parse(difference_string);
    assert!(ops.is_err(), "Parsed an invalid difference string: {}",
        String::from_utf8_lossy(difference_string));
}

#[test]
fn parse_empty() {
    check_parse(b"", &[]);
}

#[test]
fn parse_single_ops() {
    check_parse(b":123", &[Difference::Match(123)]);
    check_parse(b"*at", &[Difference::Mismatch(b'A', b'T')]);
    check_parse(b"+acgt", &[Difference::Insertion(b"ACGT".to_vec())]);
    check_parse(b"-gg", &[Difference::Deletion(b"GG".to_vec())]);
}

#[test]
fn parse_mixed_case() {
    // Stored bases are always upper case.
    check_parse(b"*aT+GgC-tAc", &[
        Difference::Mismatch(b'A', b'T'),
        Difference::Insertion(b"GGC".to_vec()),
        Difference::Deletion(b"TAC".to_vec()),
    ]);
}

#[test]
fn parse_typical_tag() {
    check_parse(b":3*at+gg-cc:2", &[
        Difference::Match(3),
        Difference::Mismatch(b'A', b'T'),
        Difference::Insertion(b"GG".to_vec()),
        Difference::Deletion(b"CC".to_vec()),
        Difference::Match(2),
    ]);
}

#[test]
fn parse_invalid() {
    // Missing the leading operation code.
    check_parse_fails(b"123:4");
    // Empty arguments.
    check_parse_fails(b":");
    check_parse_fails(b":12+");
    check_parse_fails(b"-:12");
    // Wrong mismatch length.
    check_parse_fails(b"*a");
    check_parse_fails(b"*acg");
    // Non-numeric match length.
    check_parse_fails(b":12a4");
    // Unsupported operations are parse errors as well.
    check_parse_fails(b":12=acgt");
    check_parse_fails(b":12~gt4ag");
}

#[test]
fn unsupported_ops() {
    assert_eq!(Difference::unsupported_op(b":12*at:3"), None);
    assert_eq!(Difference::unsupported_op(b"=acgt:12"), Some(b'='));
    assert_eq!(Difference::unsupported_op(b":12~gt4ag"), Some(b'~'));
}

//-----------------------------------------------------------------------------

// Tests for `Difference`: statistics and conversion to mutations.

#[test]
fn op_lengths() {
    assert_eq!(Difference::Match(42).target_len(), 42);
    assert_eq!(Difference::Match(42).query_len(), 42);
    assert_eq!(Difference::Mismatch(b'A', b'C').target_len(), 1);
    assert_eq!(Difference::Mismatch(b'A', b'C').query_len(), 1);
    assert_eq!(Difference::Insertion(b"ACG".to_vec()).target_len(), 0);
    assert_eq!(Difference::Insertion(b"ACG".to_vec()).query_len(), 3);
    assert_eq!(Difference::Deletion(b"AC".to_vec()).target_len(), 2);
    assert_eq!(Difference::Deletion(b"AC".to_vec()).query_len(), 0);
}

#[test]
fn stats() {
    let ops = Difference::parse(b":48-cat:44+gattaca:51").unwrap();
    let (query_len, target_len, matches, edits) = Difference::stats(&ops);
    assert_eq!(query_len, 48 + 44 + 7 + 51, "Wrong query length");
    assert_eq!(target_len, 48 + 3 + 44 + 51, "Wrong target length");
    assert_eq!(matches, 48 + 44 + 51, "Wrong number of matches");
    assert_eq!(edits, 3 + 7, "Wrong number of edits");
}

#[test]
fn to_mutations_positions() {
    let ops = Difference::parse(b":3*at+gg-cc:2").unwrap();
    let mutations = Difference::to_mutations(&ops, 5);
    assert_eq!(mutations, vec![
        Mutation::new(MutationType::Substitution, 8, "AT"),
        Mutation::new(MutationType::Insertion, 9, "GG"),
        Mutation::new(MutationType::Deletion, 9, "CC"),
    ], "Wrong mutations for a typical difference string");
}

#[test]
fn to_mutations_empty() {
    let ops = Difference::parse(b":100").unwrap();
    assert!(Difference::to_mutations(&ops, 10).is_empty(), "Mutations from a perfect match");
}

#[test]
fn to_mutations_adjacent() {
    // Two substitutions with no gap, then an insertion at the same position
    // as the following deletion.
    let ops = Difference::parse(b"*ac*ga+tt-gg").unwrap();
    let mutations = Difference::to_mutations(&ops, 0);
    assert_eq!(mutations, vec![
        Mutation::new(MutationType::Substitution, 0, "AC"),
        Mutation::new(MutationType::Substitution, 1, "GA"),
        Mutation::new(MutationType::Insertion, 2, "TT"),
        Mutation::new(MutationType::Deletion, 2, "GG"),
    ], "Wrong mutations for adjacent operations");
}

//-----------------------------------------------------------------------------

// Tests for cs tag generation: the round trip must be exact.

fn check_round_trip(difference_string: &[u8], contig_start: u32, target_len: u32) {
    let ops = Difference::parse(difference_string).unwrap();
    let mutations = Difference::to_mutations(&ops, contig_start);
    let generated = generate_cs_tag(mutations.iter(), contig_start, contig_start + target_len);
    assert_eq!(generated.as_bytes(), difference_string,
        "Difference string does not round-trip");

    // And the other direction: decoding the generated string gives the
    // same mutations.
    let reparsed = Difference::parse(generated.as_bytes()).unwrap();
    assert_eq!(Difference::to_mutations(&reparsed, contig_start), mutations,
        "Mutations do not round-trip");
}

#[test]
fn round_trip_simple() {
    check_round_trip(b":3*at+gg-cc:2", 5, 8);
}

#[test]
fn round_trip_no_trailing_match() {
    check_round_trip(b":10*ca", 0, 11);
    check_round_trip(b":4-tt", 100, 6);
}

#[test]
fn round_trip_no_leading_match() {
    check_round_trip(b"*ca:10", 7, 11);
    check_round_trip(b"+acgt:5", 0, 5);
}

#[test]
fn round_trip_dense() {
    check_round_trip(b"*ac*cg*gt", 3, 3);
    check_round_trip(b"+a-c+g:1", 0, 2);
}

#[test]
fn round_trip_long_runs() {
    let (query_len, target_len, _, _) = Difference::stats(
        &Difference::parse(b":1000*at:234+ggggg:766").unwrap()
    );
    assert_eq!(query_len, 2006);
    check_round_trip(b":1000*at:234+ggggg:766", 0, target_len as u32);
}

#[test]
fn generated_tag_for_perfect_match() {
    let mutations: Vec<Mutation> = Vec::new();
    let generated = generate_cs_tag(mutations.iter(), 10, 60);
    assert_eq!(generated, ":50", "Wrong difference string for a perfect match");
}

#[test]
#[should_panic]
fn generated_tag_out_of_order() {
    let mutations = vec![
        Mutation::new(MutationType::Substitution, 9, "AT"),
        Mutation::new(MutationType::Substitution, 7, "CA"),
    ];
    let _ = generate_cs_tag(mutations.iter(), 5, 15);
}

#[test]
#[should_panic]
fn generated_tag_outside_interval() {
    let mutations = vec![Mutation::new(MutationType::Substitution, 20, "AT")];
    let _ = generate_cs_tag(mutations.iter(), 5, 15);
}

//-----------------------------------------------------------------------------

// Tests for `Mutation` and the other basic types.

#[test]
fn mutation_keys() {
    let sub = Mutation::new(MutationType::Substitution, 8, "AT");
    let ins = Mutation::new(MutationType::Insertion, 9, "GG");
    let del = Mutation::new(MutationType::Deletion, 9, "CC");
    assert_eq!(sub.key(0), "0_8_SUB_AT");
    assert_eq!(ins.key(2), "2_9_INS_GG");
    assert_eq!(del.key(2), "2_9_DEL_CC");

    // Same position and type but different bases: different identity.
    let other = Mutation::new(MutationType::Insertion, 9, "GGG");
    assert_ne!(ins.key(2), other.key(2), "Distinct insertions share a key");
}

#[test]
fn mutation_descriptions() {
    assert_eq!(Mutation::new(MutationType::Substitution, 5, "AT").description(), "a:t");
    assert_eq!(Mutation::new(MutationType::Insertion, 5, "GG").description(), "+gg");
    assert_eq!(Mutation::new(MutationType::Deletion, 5, "CC").description(), "-cc");
}

#[test]
fn mutation_type_codes() {
    for mutation_type in [MutationType::Substitution, MutationType::Insertion, MutationType::Deletion] {
        assert_eq!(MutationType::from_code(mutation_type.code()), Some(mutation_type),
            "Mutation type {} does not round-trip through its code", mutation_type);
    }
    assert_eq!(MutationType::from_code(3), None, "Invalid code 3 was accepted");
}

#[test]
fn interval_display() {
    let interval = Interval::new("chr1", 120, 340);
    assert_eq!(interval.to_string(), "chr1:120-340");
    assert!(!interval.is_empty());
    assert!(Interval::new("chr1", 10, 10).is_empty());
    assert!(Interval::new("chr1", 11, 10).is_empty());
}

#[test]
fn alignment_lengths() {
    let alignment = Alignment {
        read_index: 0, contig_index: 0,
        read_start: 10, read_end: 30,
        contig_start: 100, contig_end: 121,
        is_reverse: false,
        mutations: Vec::new(),
    };
    assert_eq!(alignment.read_len(), 20);
    assert_eq!(alignment.contig_len(), 21);
}

//-----------------------------------------------------------------------------

// Tests for `TypedField`.

#[test]
fn typed_field_parse() {
    assert_eq!(TypedField::parse(b"tp:A:P"), Ok(TypedField::Char([b't', b'p'], b'P')));
    assert_eq!(TypedField::parse(b"cs:Z::12*at:3"), Ok(TypedField::String([b'c', b's'], b":12*at:3".to_vec())));
    assert_eq!(TypedField::parse(b"AS:i:-17"), Ok(TypedField::Int([b'A', b'S'], -17)));
    assert_eq!(TypedField::parse(b"de:f:0.0012"), Ok(TypedField::Float([b'd', b'e'], 0.0012)));
    assert_eq!(TypedField::parse(b"pd:b:1"), Ok(TypedField::Bool([b'p', b'd'], true)));
}

#[test]
fn typed_field_invalid() {
    assert!(TypedField::parse(b"cs").is_err(), "Parsed a truncated field");
    assert!(TypedField::parse(b"cs:Q:arbitrary").is_err(), "Parsed an unsupported type");
    assert!(TypedField::parse(b"AS:i:twelve").is_err(), "Parsed an invalid integer");
    assert!(TypedField::parse(b"pd:b:yes").is_err(), "Parsed an invalid boolean");
}

#[test]
fn typed_field_tags() {
    let field = TypedField::parse(b"cm:i:131").unwrap();
    assert_eq!(field.tag(), [b'c', b'm']);
    assert_eq!(field.to_string(), "cm:i:131");
}

//-----------------------------------------------------------------------------
