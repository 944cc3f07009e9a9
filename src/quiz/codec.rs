//! Conversions between engine interaction state and the canonical answer
//! values stored in the answer map.

use crate::quiz::{Answer, Pairing, QuestionOption};

/// Joins the blanks of a multi-blank answer. Must match what the grading
/// backend splits on.
pub const FILL_BLANK_SEPARATOR: &str = ", ";

/// Encodes fill-in values in blank order.
///
/// A single blank is reported as its trimmed text; several blanks are trimmed
/// and joined with [`FILL_BLANK_SEPARATOR`].
pub fn encode_fill_blank(values: &[String]) -> String {
    if let [single] = values {
        return single.trim().to_string();
    }
    values
        .iter()
        .map(|value| value.trim())
        .collect::<Vec<_>>()
        .join(FILL_BLANK_SEPARATOR)
}

/// Recovers per-blank values from a previously stored answer.
///
/// Accepts a JSON array encoded as a string, an array answer, or a plain
/// string (split on [`FILL_BLANK_SEPARATOR`] when there are several blanks).
/// Anything unreadable yields empty blanks. The result always holds at least
/// `blank_count` values and is never truncated.
pub fn decode_fill_blank_seed(existing: Option<&Answer>, blank_count: usize) -> Vec<String> {
    let mut values = match existing {
        None => Vec::new(),
        Some(Answer::Sequence(items)) => items.clone(),
        Some(Answer::Text(text)) => decode_text_seed(text, blank_count),
        Some(Answer::Pairs(_)) => {
            log::debug!("Ignoring pairing answer as a fill-blank seed");
            Vec::new()
        }
    };
    pad_to(&mut values, blank_count);
    values
}

fn decode_text_seed(text: &str, blank_count: usize) -> Vec<String> {
    if text.trim_start().starts_with('[') {
        return match serde_json::from_str::<Vec<serde_json::Value>>(text) {
            Ok(items) => items.into_iter().map(json_to_text).collect(),
            Err(err) => {
                log::debug!("Malformed fill-blank seed {:?}: {}", text, err);
                Vec::new()
            }
        };
    }

    if blank_count > 1 {
        return text
            .split(FILL_BLANK_SEPARATOR)
            .map(|part| part.to_string())
            .collect();
    }
    vec![text.to_string()]
}

fn json_to_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pads with empty strings up to `count`. Never removes values.
pub fn pad_to(values: &mut Vec<String>, count: usize) {
    if values.len() < count {
        values.resize(count, String::new());
    }
}

pub fn encode_pairing(pairing: &Pairing) -> Answer {
    Answer::Pairs(pairing.clone())
}

/// Projects the ordered options onto their ids. Options without an id cannot
/// be referenced by the backend and are left out of the reported list.
pub fn encode_ordering(items: &[QuestionOption]) -> Answer {
    Answer::Sequence(items.iter().filter_map(|item| item.id.clone()).collect())
}
