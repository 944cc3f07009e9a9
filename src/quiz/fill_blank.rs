use std::sync::OnceLock;

use regex::Regex;

use crate::quiz::codec;
use crate::quiz::{Answer, AnswerSink};

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\[.*?\]").expect("valid placeholder regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Segment {
    Literal(String),
    /// Zero-based position among the placeholders only.
    Blank(usize),
}

/// Prompt text split into literal spans and blanks, in original order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    segments: Vec<Segment>,
    blank_count: usize,
}

impl Template {
    pub fn parse(prompt: &str) -> Self {
        let mut segments = Vec::new();
        let mut blank_count = 0;
        let mut cursor = 0;

        for placeholder in placeholder_pattern().find_iter(prompt) {
            if placeholder.start() > cursor {
                segments.push(Segment::Literal(
                    prompt[cursor..placeholder.start()].to_string(),
                ));
            }
            segments.push(Segment::Blank(blank_count));
            blank_count += 1;
            cursor = placeholder.end();
        }
        if cursor < prompt.len() {
            segments.push(Segment::Literal(prompt[cursor..].to_string()));
        }

        Self {
            segments,
            blank_count,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// No placeholders were found; the question takes one free-text answer.
    pub fn is_free_text(&self) -> bool {
        self.blank_count == 0
    }

    /// Number of inputs to render: the placeholder count, or one implicit
    /// input in free-text mode.
    pub fn input_count(&self) -> usize {
        self.blank_count.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FillBlankEngine {
    template: Template,
    values: Vec<String>,
}

impl FillBlankEngine {
    pub fn new(prompt: &str, prior: Option<&Answer>) -> Self {
        let template = Template::parse(prompt);
        let values = codec::decode_fill_blank_seed(prior, template.input_count());
        Self { template, values }
    }

    /// Single free-text input regardless of brackets in the prompt.
    pub fn free_text(prior: Option<&Answer>) -> Self {
        let template = Template {
            segments: Vec::new(),
            blank_count: 0,
        };
        let values = codec::decode_fill_blank_seed(prior, 1);
        Self { template, values }
    }

    /// Re-parses a recomputed prompt. Values are padded up to the new blank
    /// count and never dropped.
    pub fn reconcile(&mut self, prompt: &str) {
        self.template = Template::parse(prompt);
        codec::pad_to(&mut self.values, self.template.input_count());
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn blank_count(&self) -> usize {
        self.template.input_count()
    }

    pub fn edit(&mut self, index: usize, value: &str, sink: &mut dyn AnswerSink) {
        if index >= self.blank_count() {
            log::debug!("Ignoring edit of blank {} out of {}", index, self.blank_count());
            return;
        }
        self.values[index] = value.to_string();
        sink.report(self.answer());
    }

    /// Encodes the values of the current blanks; values kept past the blank
    /// count are held back until a prompt needs them again.
    pub fn answer(&self) -> Answer {
        Answer::Text(codec::encode_fill_blank(
            &self.values[..self.blank_count()],
        ))
    }
}
