use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rand::seq::SliceRandom;
use serde_json::{Map, Value};

use crate::error::{BankError, RecordError};
use crate::quiz::{Question, QuestionOption, Variant};

type Record = Map<String, Value>;

// Field names used by the different generations of the question API, most
// recent first.
const QUESTION_ID_KEYS: &[&str] = &["id", "question_id", "questionId", "_id"];
const VARIANT_KEYS: &[&str] = &["variant", "type", "question_type", "questionType"];
const PROMPT_KEYS: &[&str] = &[
    "prompt",
    "prompt_text",
    "promptText",
    "question_text",
    "questionText",
    "text",
];
const OPTIONS_KEYS: &[&str] = &["options", "choices", "items"];
const OPTION_ID_KEYS: &[&str] = &["id", "option_id", "optionId", "_id", "value"];
const OPTION_TEXT_KEYS: &[&str] = &["text", "option_text", "optionText", "label", "content"];
const MEDIA_KEYS: &[&str] = &["media", "media_ref", "mediaRef", "image", "image_url"];
const METADATA_KEYS: &[&str] = &["metadata", "meta"];

/// First alias present with a usable value.
fn pick<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn pick_text(record: &Record, keys: &[&str]) -> Option<String> {
    match pick(record, keys)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub struct QuestionBank {
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn open(path: &Path) -> Result<Self, BankError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BankError> {
        let data: Value = serde_json::from_reader(reader)?;
        let records = match data {
            Value::Array(records) => records,
            Value::Object(mut wrapper) => match wrapper.remove("questions") {
                Some(Value::Array(records)) => records,
                _ => return Err(BankError::NotAnArray),
            },
            _ => return Err(BankError::NotAnArray),
        };

        let questions = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| match parse_question(record) {
                Ok(question) => Some(question),
                Err(err) => {
                    log::warn!("Skipping question record #{}: {}", position, err);
                    None
                }
            })
            .collect::<Vec<_>>();

        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        log::info!("Loaded {} questions", questions.len());
        Ok(Self { questions })
    }

    /// Up to `amount` distinct questions in random order.
    pub fn get_random_questions(&self, amount: usize) -> Vec<Question> {
        self.questions
            .choose_multiple(&mut rand::thread_rng(), amount)
            .cloned()
            .collect()
    }
}

pub fn parse_question(record: &Value) -> Result<Question, RecordError> {
    let record = record.as_object().ok_or(RecordError::NotAnObject)?;

    let id = pick_text(record, QUESTION_ID_KEYS).ok_or(RecordError::MissingField("id"))?;
    let variant = pick_text(record, VARIANT_KEYS)
        .map(|tag| Variant::from_tag(&tag))
        .ok_or(RecordError::MissingField("type"))?;
    let prompt = pick_text(record, PROMPT_KEYS).unwrap_or_default();
    let options = match pick(record, OPTIONS_KEYS) {
        Some(Value::Array(options)) => options.iter().filter_map(parse_option).collect(),
        _ => Vec::new(),
    };
    let metadata = pick(record, METADATA_KEYS).cloned();

    Ok(Question {
        id,
        variant,
        prompt,
        options,
        metadata,
    })
}

/// Bare strings are accepted as options whose text doubles as the id.
fn parse_option(value: &Value) -> Option<QuestionOption> {
    match value {
        Value::String(text) => Some(QuestionOption::new(text, text)),
        Value::Object(record) => {
            let id = pick_text(record, OPTION_ID_KEYS);
            if id.is_none() {
                log::debug!("Option without id: {}", value);
            }
            Some(QuestionOption {
                id,
                text: pick_text(record, OPTION_TEXT_KEYS).unwrap_or_default(),
                media: pick_text(record, MEDIA_KEYS),
            })
        }
        other => {
            log::debug!("Skipping option {}", other);
            None
        }
    }
}
