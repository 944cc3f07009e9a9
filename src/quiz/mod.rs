pub mod bank;
pub mod choice;
pub mod codec;
pub mod fill_blank;
pub mod matching;
pub mod navigation;
pub mod ordering;

use std::collections::BTreeMap;

use choice::ChoiceEngine;
use fill_blank::FillBlankEngine;
use matching::MatchingEngine;
use navigation::NavigationOverview;
use ordering::OrderingEngine;

/// Left option id -> right option id.
pub type Pairing = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Variant {
    FillBlank,
    ShortAnswer,
    Matching,
    Ordering,
    SingleChoice,
    Unsupported(String),
}

impl Variant {
    /// Maps a raw type tag from the question source onto a variant.
    /// Casing and separators are ignored, so `fill_blank`, `fillBlank` and
    /// `Fill-Blank` all land on the same variant.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "fillblank" | "fillintheblank" | "fillblanks" | "cloze" => Variant::FillBlank,
            "shortanswer" | "freetext" | "text" => Variant::ShortAnswer,
            "matching" | "match" | "pairs" => Variant::Matching,
            "ordering" | "order" | "sequencing" | "sequence" => Variant::Ordering,
            "singlechoice" | "multiplechoice" | "choice" | "truefalse" => Variant::SingleChoice,
            _ => Variant::Unsupported(tag.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuestionOption {
    /// `None` when the source record carried no recognizable id; such an
    /// option is displayed but can never be selected, paired or reported.
    pub id: Option<String>,
    pub text: String,
    pub media: Option<String>,
}

impl QuestionOption {
    pub fn new(id: &str, text: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            text: text.to_string(),
            media: None,
        }
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub id: String,
    pub variant: Variant,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub metadata: Option<serde_json::Value>,
}

impl Question {
    pub fn new(id: &str, variant: Variant, prompt: &str, options: Vec<QuestionOption>) -> Self {
        Self {
            id: id.to_string(),
            variant,
            prompt: prompt.to_string(),
            options,
            metadata: None,
        }
    }
}

/// Canonical answer value, serialized in exactly the shape the grading
/// backend reads: a string, an object of id -> id, or an array of ids.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Sequence(Vec<String>),
    Pairs(Pairing),
}

/// Receives every answer value an engine produces.
pub trait AnswerSink {
    fn report(&mut self, answer: Answer);
}

impl<F: FnMut(Answer)> AnswerSink for F {
    fn report(&mut self, answer: Answer) {
        self(answer)
    }
}

/// questionId -> answer. A key holding `None` is a stored null and does not
/// count as answered.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, Option<Answer>>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.0.get(question_id).and_then(|answer| answer.as_ref())
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some()
    }

    /// Counts every present, non-null key, including keys that belong to
    /// questions outside the current session.
    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|answer| answer.is_some()).count()
    }

    /// Writer bound to a single question id.
    pub fn slot<'a>(&'a mut self, question_id: &str) -> AnswerSlot<'a> {
        AnswerSlot {
            answers: self,
            question_id: question_id.to_string(),
        }
    }

    pub fn insert_null(&mut self, question_id: &str) {
        self.0.insert(question_id.to_string(), None);
    }

    pub fn clear(&mut self, question_id: &str) -> bool {
        self.0.remove(question_id).is_some()
    }

    /// Payload for the grading backend: one record per answered question.
    pub fn submission(&self) -> serde_json::Value {
        let records = self
            .0
            .iter()
            .filter_map(|(question_id, answer)| {
                answer.as_ref().map(|answer| {
                    serde_json::json!({
                        "question_id": question_id,
                        "answer": answer,
                    })
                })
            })
            .collect::<Vec<_>>();
        serde_json::Value::Array(records)
    }
}

pub struct AnswerSlot<'a> {
    answers: &'a mut AnswerMap,
    question_id: String,
}

impl AnswerSink for AnswerSlot<'_> {
    fn report(&mut self, answer: Answer) {
        log::debug!("Answer for question {} updated: {:?}", self.question_id, answer);
        self.answers
            .0
            .insert(self.question_id.clone(), Some(answer));
    }
}

/// Interaction state for the question currently on screen. Rebuilt from the
/// answer map every time the current question changes.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Engine {
    FillBlank(FillBlankEngine),
    Matching(MatchingEngine),
    Ordering(OrderingEngine),
    SingleChoice(ChoiceEngine),
    ReadOnly,
}

impl Engine {
    pub fn mount(question: &Question, prior: Option<&Answer>) -> Self {
        match &question.variant {
            Variant::FillBlank => Engine::FillBlank(FillBlankEngine::new(&question.prompt, prior)),
            Variant::ShortAnswer => Engine::FillBlank(FillBlankEngine::free_text(prior)),
            Variant::Matching => Engine::Matching(MatchingEngine::new(
                &question.options,
                question.metadata.as_ref(),
                prior,
            )),
            Variant::Ordering => Engine::Ordering(OrderingEngine::new(&question.options, prior)),
            Variant::SingleChoice => {
                Engine::SingleChoice(ChoiceEngine::new(&question.options, prior))
            }
            Variant::Unsupported(tag) => {
                log::warn!("Question {} has unsupported type {:?}", question.id, tag);
                Engine::ReadOnly
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    pub questions: Vec<Question>,
    pub answers: AnswerMap,
    pub current_index: usize,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            answers: AnswerMap::new(),
            current_index: 0,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Moves to `index`; out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.questions.len() {
            return false;
        }
        self.current_index = index;
        true
    }

    pub fn mount_current(&self) -> Engine {
        match self.current() {
            Some(question) => Engine::mount(question, self.answers.get(&question.id)),
            None => Engine::ReadOnly,
        }
    }

    pub fn overview(&self) -> NavigationOverview {
        navigation::project(&self.questions, self.current_index, &self.answers)
    }

    pub fn is_complete(&self) -> bool {
        self.questions
            .iter()
            .all(|question| self.answers.is_answered(&question.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_tags_ignore_casing_and_separators() {
        assert_eq!(Variant::from_tag("fill_blank"), Variant::FillBlank);
        assert_eq!(Variant::from_tag("FillBlank"), Variant::FillBlank);
        assert_eq!(Variant::from_tag("Fill-In-The-Blank"), Variant::FillBlank);
        assert_eq!(Variant::from_tag("matching"), Variant::Matching);
        assert_eq!(Variant::from_tag("ORDERING"), Variant::Ordering);
        assert_eq!(
            Variant::from_tag("hotspot"),
            Variant::Unsupported("hotspot".to_string())
        );
    }

    #[test]
    fn answered_means_present_and_not_null() {
        let mut answers = AnswerMap::new();
        answers.slot("q1").report(Answer::Text("x".to_string()));
        answers.insert_null("q2");

        assert!(answers.is_answered("q1"));
        assert!(!answers.is_answered("q2"));
        assert!(!answers.is_answered("q3"));
        assert_eq!(answers.answered_count(), 1);

        assert!(answers.clear("q1"));
        assert!(!answers.is_answered("q1"));
    }

    #[test]
    fn answers_serialize_in_canonical_shapes() {
        let mut pairs = Pairing::new();
        pairs.insert("a".to_string(), "d".to_string());

        assert_eq!(
            serde_json::to_value(Answer::Text("dog, rug".to_string())).unwrap(),
            serde_json::json!("dog, rug")
        );
        assert_eq!(
            serde_json::to_value(Answer::Pairs(pairs)).unwrap(),
            serde_json::json!({"a": "d"})
        );
        assert_eq!(
            serde_json::to_value(Answer::Sequence(vec!["3".to_string(), "1".to_string()]))
                .unwrap(),
            serde_json::json!(["3", "1"])
        );

        let parsed: AnswerMap =
            serde_json::from_str(r#"{"q1": ["b", "a"], "q2": null, "q3": {"a": "c"}}"#).unwrap();
        assert_eq!(
            parsed.get("q1"),
            Some(&Answer::Sequence(vec!["b".to_string(), "a".to_string()]))
        );
        assert!(!parsed.is_answered("q2"));
        assert!(matches!(parsed.get("q3"), Some(Answer::Pairs(_))));
    }

    #[test]
    fn submission_skips_nulls() {
        let mut answers = AnswerMap::new();
        answers.slot("q1").report(Answer::Text("cat".to_string()));
        answers.insert_null("q2");

        assert_eq!(
            answers.submission(),
            serde_json::json!([{"question_id": "q1", "answer": "cat"}])
        );
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |answer: Answer| seen.push(answer);
            sink.report(Answer::Text("one".to_string()));
        }
        assert_eq!(seen, vec![Answer::Text("one".to_string())]);
    }

    #[test]
    fn session_remounts_from_stored_answer() {
        let questions = vec![
            Question::new("q1", Variant::FillBlank, "The [cat] sat.", vec![]),
            Question::new(
                "q2",
                Variant::Ordering,
                "Sort",
                vec![QuestionOption::new("1", "one"), QuestionOption::new("2", "two")],
            ),
        ];
        let mut session = QuizSession::new(questions);

        if let Engine::FillBlank(mut engine) = session.mount_current() {
            engine.edit(0, " dog ", &mut session.answers.slot("q1"));
        } else {
            panic!("expected fill-blank engine");
        }

        assert!(session.go_to(1));
        assert!(!session.go_to(5));
        assert_eq!(session.current_index, 1);
        assert!(!session.is_complete());

        assert!(session.go_to(0));
        match session.mount_current() {
            Engine::FillBlank(engine) => assert_eq!(engine.values(), &["dog".to_string()][..]),
            other => panic!("unexpected engine {:?}", other),
        }
    }
}
