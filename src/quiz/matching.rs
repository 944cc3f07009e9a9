use std::collections::HashSet;

use crate::quiz::codec;
use crate::quiz::{Answer, AnswerSink, Pairing, QuestionOption};

/// At most one pending item, on one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Selection {
    #[default]
    Idle,
    LeftPending(String),
    RightPending(String),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchingEngine {
    left: Vec<QuestionOption>,
    right: Vec<QuestionOption>,
    selection: Selection,
    pairing: Pairing,
}

impl MatchingEngine {
    pub fn new(
        options: &[QuestionOption],
        metadata: Option<&serde_json::Value>,
        prior: Option<&Answer>,
    ) -> Self {
        let (left, right) = split_columns(options, metadata);
        let pairing = match prior {
            Some(Answer::Pairs(pairs)) => sanitize_seed(pairs, &left, &right),
            Some(other) => {
                log::debug!("Ignoring non-pairing seed for matching: {:?}", other);
                Pairing::new()
            }
            None => Pairing::new(),
        };

        Self {
            left,
            right,
            selection: Selection::Idle,
            pairing,
        }
    }

    pub fn left(&self) -> &[QuestionOption] {
        &self.left
    }

    pub fn right(&self) -> &[QuestionOption] {
        &self.right
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    pub fn is_left_matched(&self, left_id: &str) -> bool {
        self.pairing.contains_key(left_id)
    }

    pub fn is_right_matched(&self, right_id: &str) -> bool {
        self.partner_of_right(right_id).is_some()
    }

    pub fn partner_of_right(&self, right_id: &str) -> Option<&str> {
        self.pairing
            .iter()
            .find(|(_, right)| right.as_str() == right_id)
            .map(|(left, _)| left.as_str())
    }

    pub fn click_left(&mut self, left_id: &str, sink: &mut dyn AnswerSink) {
        if !self.left.iter().any(|option| option.has_id(left_id)) {
            return;
        }

        // Clicking a matched item un-matches it
        if self.pairing.remove(left_id).is_some() {
            self.selection = Selection::Idle;
            sink.report(codec::encode_pairing(&self.pairing));
            return;
        }

        match std::mem::take(&mut self.selection) {
            Selection::RightPending(right_id) => self.pair(left_id, &right_id, sink),
            Selection::LeftPending(pending) if pending == left_id => {}
            _ => self.selection = Selection::LeftPending(left_id.to_string()),
        }
    }

    /// Matched right items are inert.
    pub fn click_right(&mut self, right_id: &str, sink: &mut dyn AnswerSink) {
        if !self.right.iter().any(|option| option.has_id(right_id)) {
            return;
        }
        if self.is_right_matched(right_id) {
            return;
        }

        match std::mem::take(&mut self.selection) {
            Selection::LeftPending(left_id) => self.pair(&left_id, right_id, sink),
            Selection::RightPending(pending) if pending == right_id => {}
            _ => self.selection = Selection::RightPending(right_id.to_string()),
        }
    }

    /// The new pair wins: any earlier mapping from `left_id`, and any earlier
    /// mapping onto `right_id`, is replaced.
    fn pair(&mut self, left_id: &str, right_id: &str, sink: &mut dyn AnswerSink) {
        let previous_owner = self.partner_of_right(right_id).map(str::to_string);
        if let Some(owner) = previous_owner {
            log::warn!(
                "Right item {} was already paired with {}; overwriting with {}",
                right_id,
                owner,
                left_id
            );
            self.pairing.remove(&owner);
        }

        self.pairing
            .insert(left_id.to_string(), right_id.to_string());
        self.selection = Selection::Idle;
        sink.report(codec::encode_pairing(&self.pairing));
    }
}

/// Splits options into the left and right columns.
///
/// Metadata of the form `{"left": [ids], "right": [ids]}` (or a JSON string
/// holding it) decides the columns when it places every option exactly once.
/// Otherwise the first half, rounded up, goes left.
pub fn split_columns(
    options: &[QuestionOption],
    metadata: Option<&serde_json::Value>,
) -> (Vec<QuestionOption>, Vec<QuestionOption>) {
    if let Some(columns) = metadata.and_then(|metadata| columns_from_metadata(options, metadata)) {
        return columns;
    }

    let midpoint = (options.len() + 1) / 2;
    let (left, right) = options.split_at(midpoint);
    (left.to_vec(), right.to_vec())
}

fn columns_from_metadata(
    options: &[QuestionOption],
    metadata: &serde_json::Value,
) -> Option<(Vec<QuestionOption>, Vec<QuestionOption>)> {
    let parsed;
    let metadata = match metadata {
        serde_json::Value::String(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(err) => {
                log::debug!("Unreadable matching metadata, using midpoint split: {}", err);
                return None;
            }
        },
        other => other,
    };

    let mut used = HashSet::new();
    let mut column = |key: &str| -> Option<Vec<QuestionOption>> {
        metadata
            .get(key)?
            .as_array()?
            .iter()
            .map(|id| {
                let id = match id {
                    serde_json::Value::String(id) => id.clone(),
                    serde_json::Value::Number(id) => id.to_string(),
                    _ => return None,
                };
                if !used.insert(id.clone()) {
                    return None;
                }
                options.iter().find(|option| option.has_id(&id)).cloned()
            })
            .collect()
    };

    let left = column("left");
    let right = column("right");
    match (left, right) {
        (Some(left), Some(right)) if left.len() + right.len() == options.len() => {
            Some((left, right))
        }
        _ => {
            log::debug!("Matching metadata does not describe columns, using midpoint split");
            None
        }
    }
}

/// Keeps stored pairs that still point at known items, dropping any pair
/// that would reuse a right item.
fn sanitize_seed(pairs: &Pairing, left: &[QuestionOption], right: &[QuestionOption]) -> Pairing {
    let mut taken = HashSet::new();
    let mut pairing = Pairing::new();

    for (left_id, right_id) in pairs {
        let known = left.iter().any(|option| option.has_id(left_id))
            && right.iter().any(|option| option.has_id(right_id));
        if !known || !taken.insert(right_id.clone()) {
            log::debug!("Dropping stored pair {} -> {}", left_id, right_id);
            continue;
        }
        pairing.insert(left_id.clone(), right_id.clone());
    }
    pairing
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn options(ids: &[&str]) -> Vec<QuestionOption> {
        ids.iter()
            .map(|id| QuestionOption::new(id, &format!("item {}", id)))
            .collect()
    }

    fn engine(ids: &[&str]) -> MatchingEngine {
        MatchingEngine::new(&options(ids), None, None)
    }

    fn pairs(entries: &[(&str, &str)]) -> Pairing {
        entries
            .iter()
            .map(|(left, right)| (left.to_string(), right.to_string()))
            .collect()
    }

    fn ids(column: &[QuestionOption]) -> Vec<&str> {
        column.iter().filter_map(|option| option.id.as_deref()).collect()
    }

    #[test]
    fn columns_split_at_rounded_up_midpoint() {
        let (left, right) = split_columns(&options(&["a", "b", "c", "d", "e"]), None);
        assert_eq!(ids(&left), vec!["a", "b", "c"]);
        assert_eq!(ids(&right), vec!["d", "e"]);

        let (left, right) = split_columns(&[], None);
        assert!(left.is_empty() && right.is_empty());
    }

    #[test]
    fn metadata_overrides_columns() {
        let metadata = serde_json::json!({"left": ["c", "a"], "right": ["b", "d"]});
        let (left, right) = split_columns(&options(&["a", "b", "c", "d"]), Some(&metadata));
        assert_eq!(ids(&left), vec!["c", "a"]);
        assert_eq!(ids(&right), vec!["b", "d"]);

        let metadata = serde_json::json!(r#"{"left": ["d"], "right": ["a", "b", "c"]}"#);
        let (left, right) = split_columns(&options(&["a", "b", "c", "d"]), Some(&metadata));
        assert_eq!(ids(&left), vec!["d"]);
        assert_eq!(ids(&right), vec!["a", "b", "c"]);
    }

    #[test]
    fn bad_metadata_falls_back_to_midpoint() {
        let all = options(&["a", "b", "c", "d"]);
        for metadata in [
            serde_json::json!("{not json"),
            serde_json::json!({"left": ["a", "zzz"], "right": ["b"]}),
            serde_json::json!({"left": ["a"], "right": ["a"]}),
            serde_json::json!({"left": ["a"]}),
            serde_json::json!({"left": ["a"], "right": ["b"]}),
            serde_json::json!(42),
        ] {
            let (left, right) = split_columns(&all, Some(&metadata));
            assert_eq!(ids(&left), vec!["a", "b"]);
            assert_eq!(ids(&right), vec!["c", "d"]);
        }
    }

    #[test]
    fn click_pair_then_unmatch_from_left() {
        let mut engine = engine(&["A", "B", "C", "D"]);
        let mut reported = Vec::new();
        let mut sink = |answer: Answer| reported.push(answer);

        engine.click_left("A", &mut sink);
        assert_eq!(engine.selection(), &Selection::LeftPending("A".to_string()));
        engine.click_right("D", &mut sink);
        assert_eq!(engine.pairing(), &pairs(&[("A", "D")]));
        assert_eq!(engine.selection(), &Selection::Idle);

        // matched right items do not toggle
        engine.click_right("D", &mut sink);
        assert_eq!(engine.pairing(), &pairs(&[("A", "D")]));
        assert_eq!(engine.selection(), &Selection::Idle);

        engine.click_left("A", &mut sink);
        assert!(engine.pairing().is_empty());

        assert_eq!(
            reported,
            vec![
                Answer::Pairs(pairs(&[("A", "D")])),
                Answer::Pairs(Pairing::new()),
            ]
        );
    }

    #[test]
    fn right_first_then_left_pairs() {
        let mut engine = engine(&["A", "B", "C", "D"]);
        let mut sink = |_: Answer| {};

        engine.click_right("C", &mut sink);
        assert_eq!(engine.selection(), &Selection::RightPending("C".to_string()));
        engine.click_left("B", &mut sink);
        assert_eq!(engine.pairing(), &pairs(&[("B", "C")]));
        assert_eq!(engine.partner_of_right("C"), Some("B"));
    }

    #[test]
    fn clicking_pending_item_again_deselects() {
        let mut engine = engine(&["A", "B", "C", "D"]);
        let mut reported: Vec<Answer> = Vec::new();
        let mut sink = |answer: Answer| reported.push(answer);

        engine.click_left("A", &mut sink);
        engine.click_left("A", &mut sink);
        assert_eq!(engine.selection(), &Selection::Idle);

        engine.click_right("C", &mut sink);
        engine.click_right("C", &mut sink);
        assert_eq!(engine.selection(), &Selection::Idle);

        engine.click_left("A", &mut sink);
        engine.click_left("B", &mut sink);
        assert_eq!(engine.selection(), &Selection::LeftPending("B".to_string()));

        assert!(reported.is_empty());
    }

    #[test]
    fn unmatching_clears_pending_selection() {
        let mut engine = engine(&["A", "B", "C", "D"]);
        let mut sink = |_: Answer| {};

        engine.click_left("A", &mut sink);
        engine.click_right("C", &mut sink);
        engine.click_right("D", &mut sink);
        assert_eq!(engine.selection(), &Selection::RightPending("D".to_string()));

        engine.click_left("A", &mut sink);
        assert_eq!(engine.selection(), &Selection::Idle);
        assert!(engine.pairing().is_empty());
    }

    #[test]
    fn unknown_and_wrong_column_clicks_are_ignored() {
        let mut engine = engine(&["A", "B", "C", "D"]);
        let mut sink = |_: Answer| {};

        engine.click_left("C", &mut sink);
        engine.click_right("A", &mut sink);
        engine.click_left("zzz", &mut sink);
        assert_eq!(engine.selection(), &Selection::Idle);
    }

    #[test]
    fn pairing_onto_taken_right_overwrites_previous_owner() {
        let mut engine = engine(&["A", "B", "C", "D"]);
        engine.pairing = pairs(&[("A", "C")]);
        let mut reported = Vec::new();

        engine.pair("B", "C", &mut |answer: Answer| reported.push(answer));

        assert_eq!(engine.pairing(), &pairs(&[("B", "C")]));
        assert_eq!(reported, vec![Answer::Pairs(pairs(&[("B", "C")]))]);
    }

    #[test]
    fn seeds_from_stored_pairs() {
        let prior = Answer::Pairs(pairs(&[("A", "C"), ("B", "C"), ("X", "D")]));
        let engine = MatchingEngine::new(&options(&["A", "B", "C", "D"]), None, Some(&prior));
        assert_eq!(engine.pairing(), &pairs(&[("A", "C")]));
        assert!(engine.is_left_matched("A"));
        assert!(engine.is_right_matched("C"));
        assert!(!engine.is_right_matched("D"));
    }

    #[test]
    fn empty_question_is_renderable() {
        let mut engine = MatchingEngine::new(&[], None, None);
        engine.click_left("A", &mut |_: Answer| {});
        assert!(engine.left().is_empty());
        assert!(engine.right().is_empty());
    }

    #[test]
    fn options_without_id_are_inert() {
        let mut all = options(&["A", "C"]);
        all[0].id = None;
        let mut engine = MatchingEngine::new(&all, None, None);
        let mut sink = |_: Answer| {};

        engine.click_right("C", &mut sink);
        engine.click_left("", &mut sink);
        assert_eq!(engine.selection(), &Selection::RightPending("C".to_string()));
        assert!(engine.pairing().is_empty());
    }

    #[test]
    fn random_clicks_keep_pairing_injective() {
        let all = options(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let mut engine = MatchingEngine::new(&all, None, None);
            let mut last = None;
            for _ in 0..100 {
                let mut sink = |answer: Answer| last = Some(answer);
                let option = &all[rng.gen_range(0..all.len())];
                let id = option.id.as_deref().unwrap();
                if rng.gen_bool(0.5) {
                    engine.click_left(id, &mut sink);
                } else {
                    engine.click_right(id, &mut sink);
                }

                let rights = engine.pairing().values().collect::<HashSet<_>>();
                assert_eq!(rights.len(), engine.pairing().len());
            }
            if let Some(Answer::Pairs(reported)) = &last {
                assert_eq!(reported, engine.pairing());
            }
        }
    }
}
