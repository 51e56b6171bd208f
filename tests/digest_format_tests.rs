use tg_digest::ai::prompt::{channel_marker, parse_digest, system_instruction};
use tg_digest::errors::DigestError;

#[test]
fn test_multiline_sections_survive_parsing() {
    let raw = "===OVERALL===\n- item one\n- item two\n\n===CHANNEL: Rust News===\nrelease notes\nwith details\n===CHANNEL: Infra===\nall quiet";
    let digest = parse_digest(raw).unwrap();

    assert_eq!(digest.overall, "- item one\n- item two");
    assert_eq!(digest.sections[0].text, "release notes\nwith details");
    assert_eq!(digest.sections[1].label, "Infra");
}

#[test]
fn test_preamble_before_first_marker_is_ignored() {
    let raw = "Sure, here is the digest:\n===OVERALL===\nthe digest\n===CHANNEL: A===\nnews";
    let digest = parse_digest(raw).unwrap();
    assert_eq!(digest.overall, "the digest");
}

#[test]
fn test_channel_marker_without_overall_is_rejected() {
    let raw = "===CHANNEL: A===\nnews without an overview";
    assert!(matches!(parse_digest(raw), Err(DigestError::Format(_))));
}

#[test]
fn test_instruction_lists_a_marker_per_channel() {
    let channels = vec!["Rust News".to_string(), "Infra".to_string()];
    let instruction = system_instruction("de", &channels);

    for label in &channels {
        assert!(instruction.contains(&channel_marker(label)));
    }
    assert!(instruction.contains("digests in de"));
}
