// tests/property_test.rs

//! Property-based tests for the persistence field codec and the tokenizer.

use cadenza::core::catalog::{decode_field, encode_field};
use cadenza::core::protocol::{CommandKind, parse};
use proptest::prelude::*;

#[test]
fn test_encode_replaces_whitespace_with_separator() {
    assert_eq!(encode_field("Shape of You"), "Shape-of-You");
    assert_eq!(encode_field("Believer"), "Believer");
    assert_eq!(encode_field("a\tb"), "a-b");
}

#[test]
fn test_decode_restores_spaces() {
    assert_eq!(decode_field("Shape-of-You"), "Shape of You");
    assert_eq!(decode_field("Believer"), "Believer");
}

#[test]
fn test_decode_drops_trailing_separators() {
    assert_eq!(decode_field("Believer-"), "Believer");
    assert_eq!(decode_field("a-b--"), "a b");
}

proptest! {
    // Round trip holds for names made of separator-free words joined by
    // single spaces, which is what the catalog stores in practice.
    #[test]
    fn prop_field_codec_round_trips(field in "[A-Za-z0-9']{1,12}( [A-Za-z0-9']{1,12}){0,4}") {
        let encoded = encode_field(&field);
        prop_assert!(!encoded.contains(' '));
        prop_assert_eq!(decode_field(&encoded), field);
    }

    // A quoted argument round-trips arbitrary interior text as long as it
    // contains no quote character and is not blank.
    #[test]
    fn prop_quoted_argument_survives_tokenizing(arg in "[A-Za-z0-9 ]{0,20}[A-Za-z0-9]") {
        let command = parse(&format!("play \"{arg}\" \"Singer\""));
        prop_assert_eq!(command.kind, CommandKind::Play);
        prop_assert_eq!(command.args.len(), 2);
        prop_assert_eq!(command.args[0].clone(), arg);
    }

    // Parsing never panics on arbitrary input.
    #[test]
    fn prop_parse_total(line in "\\PC{0,64}") {
        let _ = parse(&line);
    }
}
