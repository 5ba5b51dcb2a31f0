//! Repair of encoding-corrupted sector labels.
//!
//! Sector names arrive from several scanners, some of which decoded UTF-8
//! bytes as Latin-1 at some point. The repair is heuristic: two independent
//! strategies run and the one leaving fewer corruption markers wins. The
//! replacement table only covers accented Portuguese letters, so this is not
//! a general-purpose mojibake fixer and can misfire on text that
//! legitimately contains the marker characters (e.g. upper-case "Ã").

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::util::collapse_whitespace;

pub const STEP_CLEAN: &str = "clean";
pub const STEP_DETECTED: &str = "mojibake detected";

/// Two-character sequences left behind when UTF-8 accented letters are read
/// as Latin-1 / Windows-1252, mapped back to the intended letter.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("Ã¡", "á"),
    ("Ã¢", "â"),
    ("Ã£", "ã"),
    ("Ã¤", "ä"),
    ("Ã§", "ç"),
    ("Ã©", "é"),
    ("Ãª", "ê"),
    ("Ã\u{AD}", "í"),
    ("Ã³", "ó"),
    ("Ã´", "ô"),
    ("Ãº", "ú"),
    ("Ã\u{A0}", "à"),
    ("Ã‰", "É"),
    ("Ã“", "Ó"),
    ("Ãš", "Ú"),
];

/// Lead bytes of two-byte UTF-8 sequences seen as Latin-1, the replacement
/// character, and the Windows-1252 rendering of a three-byte lead.
fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[\u{C3}\u{C2}\u{FFFD}]|\u{E2}\u{20AC}").unwrap())
}

/// ASCII whitespace runs only; NBSP is preserved until repair because it is
/// the second half of the mojibake for "à".
fn ascii_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\r\n\x0B\x0C]+").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canonicalized {
    pub canonical: String,
    /// Audit trail of what was done. Not used for re-derivation.
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Latin1Reinterpret,
    ReplacementTable,
}

impl Strategy {
    fn label(&self) -> &'static str {
        match self {
            Strategy::Latin1Reinterpret => "latin1 reinterpretation",
            Strategy::ReplacementTable => "replacement table",
        }
    }
}

/// Number of corruption markers in `value`.
pub fn corruption_score(value: &str) -> usize {
    marker_re().find_iter(value).count()
}

pub fn has_mojibake(value: &str) -> bool {
    marker_re().is_match(value)
}

fn nfc(value: &str) -> String {
    value.nfc().collect()
}

fn base_normalize(raw: &str) -> String {
    nfc(ascii_space_re().replace_all(raw.trim(), " ").trim())
}

/// Read every char as one Latin-1 byte and decode the bytes as UTF-8.
///
/// Returns `None` when a char above U+00FF is present, since such text
/// cannot be the product of a plain Latin-1 misread. Invalid sequences become
/// U+FFFD, which the scorer then counts against this attempt.
fn reinterpret_latin1(value: &str) -> Option<String> {
    let bytes = value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn apply_replacement_table(value: &str) -> String {
    let mut out = value.to_string();
    for (broken, fixed) in REPLACEMENTS {
        out = out.replace(broken, fixed);
    }
    out.chars()
        .filter(|c| !matches!(c, '\u{C3}' | '\u{C2}' | '\u{FFFD}'))
        .collect()
}

fn strip_markers(value: &str) -> String {
    marker_re().replace_all(value, "").into_owned()
}

fn final_cleanup(value: &str) -> String {
    let composed = nfc(&collapse_whitespace(&strip_markers(value)));
    // Composition can only rebuild a marker from a decomposed sequence;
    // strip once more so the output never re-triggers detection.
    if has_mojibake(&composed) {
        collapse_whitespace(&strip_markers(&composed))
    } else {
        composed
    }
}

/// Canonicalize a sector label.
///
/// Clean input only gets whitespace and NFC normalization, with steps
/// `["clean"]`. Running this on its own output is a no-op.
pub fn canonicalize(raw: &str) -> Canonicalized {
    let base = base_normalize(raw);
    if !has_mojibake(&base) {
        return Canonicalized {
            canonical: collapse_whitespace(&base),
            steps: vec![STEP_CLEAN.to_string()],
        };
    }

    let latin1 = reinterpret_latin1(&base);
    let table = apply_replacement_table(&base);
    let latin1_score = latin1.as_deref().map(corruption_score);
    let table_score = corruption_score(&table);

    let strategy = match (&latin1, latin1_score) {
        (Some(_), Some(0)) => Strategy::Latin1Reinterpret,
        _ if table_score == 0 => Strategy::ReplacementTable,
        (Some(candidate), Some(score)) => {
            if score != table_score {
                if score < table_score {
                    Strategy::Latin1Reinterpret
                } else {
                    Strategy::ReplacementTable
                }
            } else if candidate.chars().count() <= table.chars().count() {
                Strategy::Latin1Reinterpret
            } else {
                Strategy::ReplacementTable
            }
        }
        _ => Strategy::ReplacementTable,
    };

    let latin1_label = match latin1_score {
        Some(score) => score.to_string(),
        None => "skipped".to_string(),
    };
    let chosen = match (strategy, latin1) {
        (Strategy::Latin1Reinterpret, Some(candidate)) => candidate,
        _ => table,
    };

    let mut steps = vec![
        STEP_DETECTED.to_string(),
        format!(
            "scores: {}={}, {}={}",
            Strategy::Latin1Reinterpret.label(),
            latin1_label,
            Strategy::ReplacementTable.label(),
            table_score
        ),
        format!("chose {}", strategy.label()),
    ];

    let canonical = final_cleanup(&chosen);
    if canonical != chosen {
        steps.push("final cleanup".to_string());
    }

    log::debug!("canonicalized sector {:?} -> {:?} via {}", raw, canonical, strategy.label());

    Canonicalized { canonical, steps }
}

/// Grouping key for deduplication: lower-cased canonical form.
pub fn sector_key(raw: &str) -> String {
    canonicalize(raw).canonical.to_lowercase()
}
