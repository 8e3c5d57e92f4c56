//! Cross-reference token embedded in task descriptions.
//!
//! ## Grammar
//!
//! ```text
//! description := content "\n\n" MARKER "\n" PREFIX " " lead-id
//! MARKER      := "---METADATA---"
//! PREFIX      := "AIRTABLE_ID:"
//! lead-id     := [A-Za-z0-9]+
//! ```
//!
//! [`decode`] is lenient: it accepts any whitespace after the prefix and
//! descriptions without the marker line (hand-written tokens). When a marker
//! line is present only the text after the last marker is searched, so a token
//! quoted in the human content cannot shadow the footer.

use std::sync::OnceLock;

use regex::Regex;

use leadsync_core::LeadId;

pub const METADATA_MARKER: &str = "---METADATA---";
pub const LEAD_ID_PREFIX: &str = "AIRTABLE_ID:";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"AIRTABLE_ID:\s*([A-Za-z0-9]+)").expect("token pattern is a valid regex")
    })
}

/// Append the metadata footer carrying `lead` to `content`.
///
/// The token is always the last line and always preceded by the marker line,
/// whatever `content` holds (including nothing).
pub fn encode(content: &str, lead: &LeadId) -> String {
    format!("{content}\n\n{METADATA_MARKER}\n{LEAD_ID_PREFIX} {lead}")
}

/// Extract the lead id from a task description.
///
/// Returns `None` for unmanaged tasks: empty descriptions, descriptions
/// without a token, or a token with no identifier after the prefix.
pub fn decode(description: &str) -> Option<LeadId> {
    if description.is_empty() {
        return None;
    }
    let region = match description.rfind(METADATA_MARKER) {
        Some(at) => &description[at + METADATA_MARKER.len()..],
        None => description,
    };
    token_pattern()
        .captures(region)
        .and_then(|caps| caps.get(1))
        .map(|m| LeadId::from(m.as_str()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn encode_appends_marker_and_token_as_last_lines() {
        let desc = encode("Email: jane@example.com", &LeadId::from("recJane1"));
        assert_eq!(
            desc,
            "Email: jane@example.com\n\n---METADATA---\nAIRTABLE_ID: recJane1"
        );
        assert_eq!(desc.lines().last(), Some("AIRTABLE_ID: recJane1"));
    }

    #[test]
    fn encode_with_empty_content_still_has_marker() {
        let desc = encode("", &LeadId::from("L1"));
        assert_eq!(desc, "\n\n---METADATA---\nAIRTABLE_ID: L1");
    }

    #[rstest]
    #[case("No additional details", "L1")]
    #[case("", "rec3kQ9xYz")]
    #[case("Email: a@b.c\nSource: LinkedIn", "recABC123")]
    #[case("multi\n\nparagraph\n\n", "R2D2")]
    #[case("mentions AIRTABLE_ID: recOther in passing", "recMine")]
    #[case("---METADATA---\nAIRTABLE_ID: recStale", "recFresh")]
    fn decode_recovers_encoded_id(#[case] content: &str, #[case] id: &str) {
        let id = LeadId::from(id);
        assert_eq!(decode(&encode(content, &id)), Some(id));
    }

    #[rstest]
    #[case("")]
    #[case("Just a card someone made by hand")]
    #[case("---METADATA---\n")]
    #[case("---METADATA---\nAIRTABLE_ID:")]
    #[case("---METADATA---\nAIRTABLE_ID: ---")]
    #[case("AIRTABLE-ID: rec123")]
    fn decode_returns_none_for_unmanaged_or_malformed(#[case] description: &str) {
        assert_eq!(decode(description), None);
    }

    #[test]
    fn decode_accepts_token_without_marker_or_space() {
        assert_eq!(
            decode("notes\nAIRTABLE_ID:rec9"),
            Some(LeadId::from("rec9"))
        );
    }

    #[test]
    fn decode_stops_at_first_non_alphanumeric() {
        assert_eq!(
            decode("---METADATA---\nAIRTABLE_ID: recAb12-extra"),
            Some(LeadId::from("recAb12"))
        );
    }
}
