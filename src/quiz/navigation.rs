use crate::quiz::{AnswerMap, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Current,
    Answered,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCell {
    pub index: usize,
    pub question_id: String,
    pub status: QuestionStatus,
    /// Whether the answer map holds a value, regardless of `status`.
    pub answered: bool,
}

/// Snapshot of the overview grid. Recomputed from the session on every
/// render; it owns nothing the session does not already hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOverview {
    pub cells: Vec<NavigationCell>,
    pub current_index: usize,
    pub answered_count: usize,
}

pub fn project(questions: &[Question], current_index: usize, answers: &AnswerMap) -> NavigationOverview {
    let cells = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let answered = answers.is_answered(&question.id);
            let status = if index == current_index {
                QuestionStatus::Current
            } else if answered {
                QuestionStatus::Answered
            } else {
                QuestionStatus::Unanswered
            };
            NavigationCell {
                index,
                question_id: question.id.clone(),
                status,
                answered,
            }
        })
        .collect();

    NavigationOverview {
        cells,
        current_index,
        answered_count: answers.answered_count(),
    }
}

impl NavigationOverview {
    pub fn total(&self) -> usize {
        self.cells.len()
    }

    /// Invokes `go_to` with `index` when it names a cell.
    pub fn select(&self, index: usize, go_to: impl FnOnce(usize)) {
        if index < self.total() {
            go_to(index);
        }
    }

    pub fn previous(&self) -> Option<usize> {
        self.current_index.checked_sub(1)
    }

    pub fn next(&self) -> Option<usize> {
        let next = self.current_index + 1;
        (next < self.total()).then_some(next)
    }

    pub fn unanswered(&self) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|cell| !cell.answered)
            .map(|cell| cell.index)
            .collect()
    }

    pub fn first_unanswered(&self) -> Option<usize> {
        self.cells
            .iter()
            .find(|cell| !cell.answered)
            .map(|cell| cell.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Answer, AnswerSink, Variant};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| Question::new(&format!("q{}", i), Variant::ShortAnswer, "?", vec![]))
            .collect()
    }

    fn answer(answers: &mut AnswerMap, id: &str) {
        answers.slot(id).report(Answer::Text("x".to_string()));
    }

    #[test]
    fn statuses_follow_current_then_answers() {
        let questions = questions(4);
        let mut answers = AnswerMap::new();
        answer(&mut answers, "q0");
        answer(&mut answers, "q1");
        answers.insert_null("q2");

        let overview = project(&questions, 1, &answers);
        let statuses = overview
            .cells
            .iter()
            .map(|cell| cell.status)
            .collect::<Vec<_>>();

        assert_eq!(
            statuses,
            vec![
                QuestionStatus::Answered,
                QuestionStatus::Current,
                QuestionStatus::Unanswered,
                QuestionStatus::Unanswered,
            ]
        );
        assert_eq!(overview.answered_count, 2);
        assert_eq!(overview.total(), 4);
        assert_eq!(overview.unanswered(), vec![2, 3]);
        assert_eq!(overview.first_unanswered(), Some(2));
    }

    #[test]
    fn count_includes_keys_outside_the_question_list() {
        let mut answers = AnswerMap::new();
        answer(&mut answers, "q0");
        answer(&mut answers, "other-quiz");

        let overview = project(&questions(2), 0, &answers);
        assert_eq!(overview.answered_count, 2);
    }

    #[test]
    fn select_jumps_only_to_existing_cells() {
        let overview = project(&questions(3), 0, &AnswerMap::new());
        let mut jumps = Vec::new();

        overview.select(2, |index| jumps.push(index));
        overview.select(3, |index| jumps.push(index));

        assert_eq!(jumps, vec![2]);
    }

    #[test]
    fn previous_and_next_stop_at_bounds() {
        let answers = AnswerMap::new();
        let first = project(&questions(3), 0, &answers);
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(1));

        let last = project(&questions(3), 2, &answers);
        assert_eq!(last.previous(), Some(1));
        assert_eq!(last.next(), None);

        let empty = project(&[], 0, &answers);
        assert_eq!(empty.next(), None);
        assert_eq!(empty.first_unanswered(), None);
    }

    #[test]
    fn answered_count_matches_scoped_answers() {
        let questions = questions(8);
        let mut rng = StdRng::seed_from_u64(5);
        let mut answers = AnswerMap::new();

        for _ in 0..200 {
            let id = format!("q{}", rng.gen_range(0..questions.len()));
            match rng.gen_range(0..3) {
                0 => answer(&mut answers, &id),
                1 => answers.insert_null(&id),
                _ => {
                    answers.clear(&id);
                }
            }

            let current = rng.gen_range(0..questions.len());
            let overview = project(&questions, current, &answers);
            let expected = questions
                .iter()
                .filter(|question| answers.is_answered(&question.id))
                .count();
            assert_eq!(overview.answered_count, expected);
            assert_eq!(
                overview.cells.iter().filter(|cell| cell.answered).count(),
                expected
            );
        }
    }
}
