//! SYSTEM note meta block: parsing, rendering and vocabulary normalization.
//!
//! Scanning agents write a free-text summary followed by `Label: value`
//! lines. The parser is purely line-prefix driven: the `---` separator and
//! blank lines carry no meaning, and label lines may appear anywhere in the
//! body. Duplicate labels resolve to the last occurrence.

use serde::{Deserialize, Serialize};

use crate::util::non_empty;

pub const CATEGORY_RFP: &str = "RFP";
pub const CATEGORY_EXPANSION: &str = "EXPANSION";
pub const CATEGORY_C_LEVEL: &str = "C_LEVEL";
pub const CATEGORY_CLEVEL: &str = "CLEVEL";
pub const CATEGORY_SECTOR: &str = "SECTOR";
pub const CATEGORY_ERP_REPLACEMENT: &str = "ERP_REPLACEMENT";
/// Fallback for anything an agent reports outside the known vocabulary.
pub const CATEGORY_ERP_SIGNAL: &str = "ERP_SIGNAL";

pub const CONFIDENCE_HIGH: &str = "HIGH";
pub const CONFIDENCE_MEDIUM: &str = "MEDIUM";
pub const CONFIDENCE_LOW: &str = "LOW";

/// Structured fields lifted out of a SYSTEM note body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSystemMeta {
    pub agent: Option<String>,
    pub category: Option<String>,
    pub confidence: Option<String>,
    pub source_url: Option<String>,
    pub detected_at: Option<String>,
}

type FieldSetter = fn(&mut ParsedSystemMeta, Option<String>);

fn set_agent(meta: &mut ParsedSystemMeta, value: Option<String>) {
    meta.agent = value;
}

fn set_category(meta: &mut ParsedSystemMeta, value: Option<String>) {
    meta.category = value.map(|v| v.to_uppercase());
}

fn set_confidence(meta: &mut ParsedSystemMeta, value: Option<String>) {
    meta.confidence = value.map(|v| v.to_uppercase());
}

fn set_source(meta: &mut ParsedSystemMeta, value: Option<String>) {
    meta.source_url = value;
}

fn set_detected(meta: &mut ParsedSystemMeta, value: Option<String>) {
    meta.detected_at = value;
}

/// Recognized line prefixes. Matching is case-sensitive on the label word.
const FIELD_TABLE: &[(&str, FieldSetter)] = &[
    ("Agent:", set_agent),
    ("Category:", set_category),
    ("Confidence:", set_confidence),
    ("Source:", set_source),
    ("Detected:", set_detected),
];

/// Parse the meta block out of a note body. `None` yields all-null meta.
pub fn parse_system_note(notes: Option<&str>) -> ParsedSystemMeta {
    let mut meta = ParsedSystemMeta::default();
    let Some(notes) = notes else {
        return meta;
    };

    for line in notes.lines() {
        let trimmed = line.trim();
        for (label, setter) in FIELD_TABLE {
            if let Some(rest) = trimmed.strip_prefix(label) {
                setter(&mut meta, non_empty(Some(rest)).map(str::to_string));
                break;
            }
        }
    }

    meta
}

/// Allow-list filter for links rendered in the console.
///
/// Only `http://` and `https://` URLs survive; relative paths, other
/// schemes and blanks map to `None`. This is not a validity check.
pub fn sanitize_source_url(url: Option<&str>) -> Option<String> {
    let trimmed = url?.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Map free-form agent vocabulary onto the closed category set.
///
/// Example: "c-level" → "C_LEVEL", "erp replacement" → "ERP_REPLACEMENT"
pub fn normalize_category(raw: Option<&str>) -> &'static str {
    let key: String = match non_empty(raw) {
        Some(value) => value
            .to_uppercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect(),
        None => return CATEGORY_ERP_SIGNAL,
    };
    match key.trim_matches('_') {
        "RFP" | "RFI" | "TENDER" => CATEGORY_RFP,
        "EXPANSION" => CATEGORY_EXPANSION,
        "C_LEVEL" => CATEGORY_C_LEVEL,
        "CLEVEL" => CATEGORY_CLEVEL,
        "SECTOR" => CATEGORY_SECTOR,
        "ERP_REPLACEMENT" | "ERPREPLACEMENT" => CATEGORY_ERP_REPLACEMENT,
        _ => CATEGORY_ERP_SIGNAL,
    }
}

/// Map agent confidence onto HIGH/MEDIUM/LOW, defaulting to LOW.
pub fn normalize_confidence(raw: Option<&str>) -> &'static str {
    match non_empty(raw).map(|v| v.to_uppercase()).as_deref() {
        Some("HIGH") => CONFIDENCE_HIGH,
        Some("MEDIUM") => CONFIDENCE_MEDIUM,
        _ => CONFIDENCE_LOW,
    }
}

/// Input for writing a new SYSTEM note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemNoteInput {
    pub summary: String,
    pub agent: Option<String>,
    pub category: Option<String>,
    pub confidence: Option<String>,
    pub source_url: Option<String>,
    pub detected_at: Option<String>,
}

/// Render a note body in the wire format the parser reads back.
///
/// Category and confidence go through the normalizers, the source URL
/// through the allow-list; absent fields are omitted.
pub fn render_system_note(input: &SystemNoteInput) -> String {
    let mut lines: Vec<String> = vec![
        format!("Category: {}", normalize_category(input.category.as_deref())),
        format!(
            "Confidence: {}",
            normalize_confidence(input.confidence.as_deref())
        ),
    ];
    if let Some(agent) = non_empty(input.agent.as_deref()) {
        lines.insert(0, format!("Agent: {}", agent));
    }
    if let Some(url) = sanitize_source_url(input.source_url.as_deref()) {
        lines.push(format!("Source: {}", url));
    }
    if let Some(detected) = non_empty(input.detected_at.as_deref()) {
        lines.push(format!("Detected: {}", detected));
    }

    let block = lines.join("\n");
    match non_empty(Some(&input.summary)) {
        Some(summary) => format!("{}\n\n---\n{}", summary, block),
        None => format!("---\n{}", block),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_NOTE: &str = "Company published a tender for a new ERP.\n\n---\nAgent: tender-scout\nCategory: rfp\nConfidence: high\nSource: https://example.com/tender/42\nDetected: 2025-02-10";

    #[test]
    fn test_parse_full_block() {
        let meta = parse_system_note(Some(FULL_NOTE));
        assert_eq!(meta.agent.as_deref(), Some("tender-scout"));
        assert_eq!(meta.category.as_deref(), Some("RFP"));
        assert_eq!(meta.confidence.as_deref(), Some("HIGH"));
        assert_eq!(
            meta.source_url.as_deref(),
            Some("https://example.com/tender/42")
        );
        assert_eq!(meta.detected_at.as_deref(), Some("2025-02-10"));
    }

    #[test]
    fn test_parse_none_is_all_null() {
        assert_eq!(parse_system_note(None), ParsedSystemMeta::default());
    }

    #[test]
    fn test_parse_plain_prose_is_all_null() {
        let meta = parse_system_note(Some("Called the CFO, no answer.\nWill retry."));
        assert_eq!(meta, ParsedSystemMeta::default());
    }

    #[test]
    fn test_parse_partial_fields() {
        let meta = parse_system_note(Some("Category: expansion"));
        assert_eq!(meta.category.as_deref(), Some("EXPANSION"));
        assert!(meta.agent.is_none());
        assert!(meta.confidence.is_none());
        assert!(meta.source_url.is_none());
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let meta = parse_system_note(Some("Category: SECTOR\nnoise\nCategory: RFP"));
        assert_eq!(meta.category.as_deref(), Some("RFP"));
    }

    #[test]
    fn test_parse_labels_embedded_in_prose() {
        let notes = "Summary line\n   Agent:  news-watcher  \nmore prose\n\tConfidence: medium";
        let meta = parse_system_note(Some(notes));
        assert_eq!(meta.agent.as_deref(), Some("news-watcher"));
        assert_eq!(meta.confidence.as_deref(), Some("MEDIUM"));
    }

    #[test]
    fn test_parse_empty_value_is_null() {
        let meta = parse_system_note(Some("Agent:   \nCategory:"));
        assert!(meta.agent.is_none());
        assert!(meta.category.is_none());
    }

    #[test]
    fn test_parse_empty_value_overwrites_earlier() {
        let meta = parse_system_note(Some("Agent: first\nAgent:"));
        assert!(meta.agent.is_none());
    }

    #[test]
    fn test_parse_labels_are_case_sensitive() {
        let meta = parse_system_note(Some("agent: lower\nCATEGORY: RFP"));
        assert_eq!(meta, ParsedSystemMeta::default());
    }

    #[test]
    fn test_parse_label_must_start_line() {
        let meta = parse_system_note(Some("See Agent: inline mention"));
        assert!(meta.agent.is_none());
    }

    #[test]
    fn test_parse_handles_crlf() {
        let meta = parse_system_note(Some("Agent: a\r\nCategory: rfp\r\n"));
        assert_eq!(meta.agent.as_deref(), Some("a"));
        assert_eq!(meta.category.as_deref(), Some("RFP"));
    }

    #[test]
    fn test_sanitize_allows_http_and_https() {
        assert_eq!(
            sanitize_source_url(Some("https://a.com/x")).as_deref(),
            Some("https://a.com/x")
        );
        assert_eq!(
            sanitize_source_url(Some("  http://a.com  ")).as_deref(),
            Some("http://a.com")
        );
    }

    #[test]
    fn test_sanitize_rejects_everything_else() {
        for bad in [
            "javascript:alert(1)",
            "/relative/path",
            "ftp://a.com",
            "www.example.com",
            "",
            "   ",
            "data:text/html,hi",
        ] {
            assert_eq!(sanitize_source_url(Some(bad)), None, "{bad} should be rejected");
        }
        assert_eq!(sanitize_source_url(None), None);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for input in ["https://a.com", " http://b.com ", "javascript:x", "", "/p"] {
            let once = sanitize_source_url(Some(input));
            let twice = sanitize_source_url(once.as_deref());
            assert_eq!(once, twice, "sanitize not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some("rfp")), CATEGORY_RFP);
        assert_eq!(normalize_category(Some("c-level")), CATEGORY_C_LEVEL);
        assert_eq!(normalize_category(Some("CLEVEL")), CATEGORY_CLEVEL);
        assert_eq!(normalize_category(Some("erp replacement")), CATEGORY_ERP_REPLACEMENT);
        assert_eq!(normalize_category(Some(" Sector ")), CATEGORY_SECTOR);
        assert_eq!(normalize_category(Some("hiring spree")), CATEGORY_ERP_SIGNAL);
        assert_eq!(normalize_category(None), CATEGORY_ERP_SIGNAL);
    }

    #[test]
    fn test_normalize_confidence_defaults_low() {
        assert_eq!(normalize_confidence(Some("high")), CONFIDENCE_HIGH);
        assert_eq!(normalize_confidence(Some("Medium")), CONFIDENCE_MEDIUM);
        assert_eq!(normalize_confidence(Some("very sure")), CONFIDENCE_LOW);
        assert_eq!(normalize_confidence(None), CONFIDENCE_LOW);
    }

    #[test]
    fn test_render_then_parse_recovers_meta() {
        let input = SystemNoteInput {
            summary: "Hiring a new CFO".to_string(),
            agent: Some("exec-tracker".to_string()),
            category: Some("c-level".to_string()),
            confidence: Some("medium".to_string()),
            source_url: Some("https://news.example.com/cfo".to_string()),
            detected_at: Some("2025-05-01".to_string()),
        };
        let body = render_system_note(&input);
        assert!(body.starts_with("Hiring a new CFO\n\n---\n"));

        let meta = parse_system_note(Some(&body));
        assert_eq!(meta.agent.as_deref(), Some("exec-tracker"));
        assert_eq!(meta.category.as_deref(), Some("C_LEVEL"));
        assert_eq!(meta.confidence.as_deref(), Some("MEDIUM"));
        assert_eq!(meta.source_url.as_deref(), Some("https://news.example.com/cfo"));
        assert_eq!(meta.detected_at.as_deref(), Some("2025-05-01"));
    }

    #[test]
    fn test_render_drops_unsafe_source_and_defaults_vocab() {
        let input = SystemNoteInput {
            summary: String::new(),
            source_url: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        };
        let body = render_system_note(&input);
        assert_eq!(body, "---\nCategory: ERP_SIGNAL\nConfidence: LOW");
    }
}
