use studyset_core::{codec, parse_line, parse_lines};

#[test]
fn codec_round_trip_with_image() {
    let packed = codec::encode("Hello", "https://example.com/hola.png");
    assert_eq!(packed, "__IMG__:https://example.com/hola.png__DEF__:Hello");

    let decoded = codec::decode(&packed);
    assert_eq!(decoded.image_url, "https://example.com/hola.png");
    assert_eq!(decoded.text, "Hello");
}

#[test]
fn codec_pass_through_without_image() {
    let packed = codec::encode("Hello", "");
    assert_eq!(packed, "Hello");

    let decoded = codec::decode(&packed);
    assert_eq!(decoded.image_url, "");
    assert_eq!(decoded.text, "Hello");
}

#[test]
fn codec_legacy_plain_text_decodes_unchanged() {
    let decoded = codec::decode("a greeting in Spanish");
    assert_eq!(decoded.image_url, "");
    assert_eq!(decoded.text, "a greeting in Spanish");
}

#[test]
fn codec_malformed_markers_fall_back_whole() {
    // empty url segment
    let decoded = codec::decode("__IMG__:__DEF__:Hello");
    assert_eq!(decoded.image_url, "");
    assert_eq!(decoded.text, "__IMG__:__DEF__:Hello");

    // empty text segment
    let decoded = codec::decode("__IMG__:https://x.png__DEF__:");
    assert_eq!(decoded.image_url, "");
    assert_eq!(decoded.text, "__IMG__:https://x.png__DEF__:");

    // no definition marker at all
    let decoded = codec::decode("__IMG__:https://x.png");
    assert_eq!(decoded.image_url, "");
    assert_eq!(decoded.text, "__IMG__:https://x.png");
}

#[test]
fn codec_text_containing_def_marker_survives() {
    let packed = codec::encode("literal __DEF__: inside", "https://x.png");
    let decoded = codec::decode(&packed);
    assert_eq!(decoded.image_url, "https://x.png");
    assert_eq!(decoded.text, "literal __DEF__: inside");
}

#[test]
fn parse_line_delimiter_priority() {
    let card = parse_line("a|b;c").unwrap();
    assert_eq!(card.term, "a");
    assert_eq!(card.definition, "b;c");
    assert_eq!(card.image_url, "");
}

#[test]
fn parse_line_rejects_single_segment() {
    assert!(parse_line("onlyoneword").is_none());
    assert!(parse_line("").is_none());
    assert!(parse_line("   ").is_none());
    // delimiter present but only one non-empty segment survives
    assert!(parse_line("term |").is_none());
}

#[test]
fn parse_line_trims_segments() {
    let card = parse_line("  Hola  |  Hello  ").unwrap();
    assert_eq!(card.term, "Hola");
    assert_eq!(card.definition, "Hello");
    assert_eq!(card.image_url, "");
}

#[test]
fn parse_line_third_segment_is_image_rest_discarded() {
    let card = parse_line("Hola | Hello | https://example.com/hola.png | extra").unwrap();
    assert_eq!(card.term, "Hola");
    assert_eq!(card.definition, "Hello");
    assert_eq!(card.image_url, "https://example.com/hola.png");
}

#[test]
fn parse_line_alternate_delimiters() {
    let card = parse_line("Gato\tCat").unwrap();
    assert_eq!((card.term.as_str(), card.definition.as_str()), ("Gato", "Cat"));

    let card = parse_line("Gato - Cat").unwrap();
    assert_eq!((card.term.as_str(), card.definition.as_str()), ("Gato", "Cat"));

    let card = parse_line("Gato – Cat").unwrap();
    assert_eq!((card.term.as_str(), card.definition.as_str()), ("Gato", "Cat"));

    let card = parse_line("Gato::Cat").unwrap();
    assert_eq!((card.term.as_str(), card.definition.as_str()), ("Gato", "Cat"));

    let card = parse_line("Gato;Cat").unwrap();
    assert_eq!((card.term.as_str(), card.definition.as_str()), ("Gato", "Cat"));
}

#[test]
fn parse_lines_skips_blank_and_unparseable() {
    let records: Vec<_> = parse_lines("Gato | Cat\n\nnodelimiter\nPerro | Dog\n").collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].term, "Gato");
    assert_eq!(records[1].term, "Perro");
}
