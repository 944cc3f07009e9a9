use crate::quiz::{Answer, AnswerSink, QuestionOption};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChoiceEngine {
    options: Vec<QuestionOption>,
    selected: Option<String>,
}

impl ChoiceEngine {
    pub fn new(options: &[QuestionOption], prior: Option<&Answer>) -> Self {
        let selected = match prior {
            Some(Answer::Text(id)) if options.iter().any(|option| option.has_id(id)) => {
                Some(id.clone())
            }
            _ => None,
        };
        Self {
            options: options.to_vec(),
            selected,
        }
    }

    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, option_id: &str, sink: &mut dyn AnswerSink) {
        if !self.options.iter().any(|option| option.has_id(option_id)) {
            return;
        }
        if self.selected() == Some(option_id) {
            return;
        }
        self.selected = Some(option_id.to_string());
        sink.report(Answer::Text(option_id.to_string()));
    }
}
