use std::collections::HashSet;

use crate::quiz::codec;
use crate::quiz::{Answer, AnswerSink, QuestionOption};

/// Moves the element at `from` so it ends up at `to`.
///
/// The element is removed and re-inserted, so nothing is ever dropped or
/// duplicated. Out-of-range indices and `from == to` leave `items` as is.
pub fn reorder<T>(mut items: Vec<T>, from: usize, to: usize) -> Vec<T> {
    if !is_move(items.len(), from, to) {
        return items;
    }
    let item = items.remove(from);
    items.insert(to, item);
    items
}

fn is_move(len: usize, from: usize, to: usize) -> bool {
    from != to && from < len && to < len
}

/// Translates drag events into a single `(from, to)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DragState {
    source: Option<usize>,
    over: Option<usize>,
}

impl DragState {
    pub fn begin(&mut self, index: usize) {
        self.source = Some(index);
        self.over = None;
    }

    pub fn hover(&mut self, index: usize) {
        if self.source.is_some() {
            self.over = Some(index);
        }
    }

    pub fn source(&self) -> Option<usize> {
        self.source
    }

    pub fn over(&self) -> Option<usize> {
        self.over
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Ends the gesture. `None` when nothing was being dragged.
    pub fn drop_on(&mut self, index: usize) -> Option<(usize, usize)> {
        let source = self.source.take();
        self.over = None;
        source.map(|from| (from, index))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderingEngine {
    items: Vec<QuestionOption>,
    drag: DragState,
}

impl OrderingEngine {
    /// Starts from the stored order when there is one; options it does not
    /// mention follow in their original order.
    pub fn new(options: &[QuestionOption], prior: Option<&Answer>) -> Self {
        let items = match prior {
            Some(Answer::Sequence(ids)) => restore(options, ids),
            Some(other) => {
                log::debug!("Ignoring non-sequence seed for ordering: {:?}", other);
                options.to_vec()
            }
            None => options.to_vec(),
        };

        Self {
            items,
            drag: DragState::default(),
        }
    }

    pub fn items(&self) -> &[QuestionOption] {
        &self.items
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn move_up(&mut self, index: usize, sink: &mut dyn AnswerSink) {
        if index == 0 {
            return;
        }
        self.apply(index, index - 1, sink);
    }

    pub fn move_down(&mut self, index: usize, sink: &mut dyn AnswerSink) {
        self.apply(index, index.saturating_add(1), sink);
    }

    pub fn drag(&mut self, from: usize, to: usize, sink: &mut dyn AnswerSink) {
        self.apply(from, to, sink);
    }

    pub fn begin_drag(&mut self, index: usize) {
        if index < self.items.len() {
            self.drag.begin(index);
        }
    }

    pub fn drag_over(&mut self, index: usize) {
        self.drag.hover(index);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn drop_on(&mut self, index: usize, sink: &mut dyn AnswerSink) {
        if let Some((from, to)) = self.drag.drop_on(index) {
            self.apply(from, to, sink);
        }
    }

    /// Reports the current order as the answer without changing it.
    pub fn confirm(&self, sink: &mut dyn AnswerSink) {
        sink.report(codec::encode_ordering(&self.items));
    }

    fn apply(&mut self, from: usize, to: usize, sink: &mut dyn AnswerSink) {
        if !is_move(self.items.len(), from, to) {
            return;
        }
        let items = std::mem::take(&mut self.items);
        self.items = reorder(items, from, to);
        sink.report(codec::encode_ordering(&self.items));
    }
}

fn restore(options: &[QuestionOption], ids: &[String]) -> Vec<QuestionOption> {
    let mut placed = HashSet::new();
    let mut items = Vec::with_capacity(options.len());

    for id in ids {
        let found = options
            .iter()
            .enumerate()
            .find(|(_, option)| option.has_id(id));
        match found {
            Some((index, option)) if placed.insert(index) => items.push(option.clone()),
            Some(_) => log::debug!("Stored order repeats item {}", id),
            None => log::debug!("Stored order refers to unknown item {}", id),
        }
    }

    for (index, option) in options.iter().enumerate() {
        if !placed.contains(&index) {
            items.push(option.clone());
        }
    }
    items
}
