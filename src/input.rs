//! Turns chat messages into engine operations.
//!
//! Every message is one interaction event: it is parsed into a [`Command`]
//! and applied to the session before the next message is read.

use crate::quiz::{Engine, QuizSession};

pub const PREVIOUS_BUTTON: &str = "⬅️ Назад";
pub const NEXT_BUTTON: &str = "Далі ➡️";
pub const OVERVIEW_BUTTON: &str = "📋 Огляд";
pub const FINISH_BUTTON: &str = "🏁 Завершити";
pub const CONFIRM_ORDER_BUTTON: &str = "✅ Підтвердити порядок";
pub const MOVE_UP_PREFIX: &str = "⬆";
pub const MOVE_DOWN_PREFIX: &str = "⬇";
pub const LEFT_PREFIX: &str = "L";
pub const RIGHT_PREFIX: &str = "R";

/// Indices are zero-based; the chat shows them one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    Overview,
    Finish,
    Jump(usize),
    FillBlanks(Vec<(usize, String)>),
    ClickLeft(usize),
    ClickRight(usize),
    MoveUp(usize),
    MoveDown(usize),
    Drag { from: usize, to: usize },
    ConfirmOrder,
    Choose(usize),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The current question changed and its engine was re-mounted.
    Navigated,
    Updated,
    ShowOverview,
    Finish,
    Ignored,
}

/// "3" -> 2. Zero and garbage are rejected.
fn parse_position(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

pub fn parse(text: &str, engine: &Engine) -> Command {
    let text = text.trim();
    match text {
        PREVIOUS_BUTTON => return Command::Previous,
        NEXT_BUTTON => return Command::Next,
        OVERVIEW_BUTTON => return Command::Overview,
        FINISH_BUTTON => return Command::Finish,
        _ => {}
    }
    if let Some(position) = text.strip_prefix('#').and_then(parse_position) {
        return Command::Jump(position);
    }

    match engine {
        Engine::FillBlank(engine) => parse_fill_blank(text, engine.blank_count()),
        Engine::Matching(_) => parse_matching(text),
        Engine::Ordering(_) => parse_ordering(text),
        Engine::SingleChoice(engine) => engine
            .options()
            .iter()
            .position(|option| option.text.trim() == text)
            .map(Command::Choose)
            .unwrap_or(Command::Unknown),
        Engine::ReadOnly => Command::Unknown,
    }
}

fn parse_fill_blank(text: &str, blank_count: usize) -> Command {
    if blank_count <= 1 {
        return Command::FillBlanks(vec![(0, text.to_string())]);
    }

    if let Some((position, value)) = text.split_once(':') {
        if let Some(index) = parse_position(position).filter(|index| *index < blank_count) {
            return Command::FillBlanks(vec![(index, value.trim_start().to_string())]);
        }
    }

    let lines = text.lines().collect::<Vec<_>>();
    if lines.len() == blank_count {
        return Command::FillBlanks(
            lines
                .into_iter()
                .enumerate()
                .map(|(index, line)| (index, line.to_string()))
                .collect(),
        );
    }
    Command::Unknown
}

fn parse_matching(text: &str) -> Command {
    let label = text.split(|c: char| c == ':' || c.is_whitespace()).next().unwrap_or("");
    if let Some(position) = label.strip_prefix(LEFT_PREFIX).and_then(parse_position) {
        return Command::ClickLeft(position);
    }
    if let Some(position) = label.strip_prefix(RIGHT_PREFIX).and_then(parse_position) {
        return Command::ClickRight(position);
    }
    Command::Unknown
}

fn parse_ordering(text: &str) -> Command {
    if text == CONFIRM_ORDER_BUTTON {
        return Command::ConfirmOrder;
    }
    if let Some(position) = text.strip_prefix(MOVE_UP_PREFIX).and_then(parse_position) {
        return Command::MoveUp(position);
    }
    if let Some(position) = text.strip_prefix(MOVE_DOWN_PREFIX).and_then(parse_position) {
        return Command::MoveDown(position);
    }
    if let Some((from, to)) = text.split_once('>') {
        if let (Some(from), Some(to)) = (parse_position(from), parse_position(to)) {
            return Command::Drag { from, to };
        }
    }
    Command::Unknown
}

/// Runs `command` against the session. Engine output is written to the
/// current question's slot in the answer map.
pub fn apply(command: &Command, session: &mut QuizSession, engine: &mut Engine) -> Outcome {
    let overview = session.overview();
    let target = match command {
        Command::Previous => overview.previous(),
        Command::Next => overview.next(),
        Command::Jump(index) => Some(*index),
        Command::Overview => return Outcome::ShowOverview,
        Command::Finish => return Outcome::Finish,
        Command::Unknown => return Outcome::Ignored,
        _ => return apply_to_engine(command, session, engine),
    };

    let mut moved = false;
    if let Some(index) = target {
        overview.select(index, |index| moved = session.go_to(index));
    }
    if !moved {
        return Outcome::Ignored;
    }
    *engine = session.mount_current();
    Outcome::Navigated
}

fn apply_to_engine(command: &Command, session: &mut QuizSession, engine: &mut Engine) -> Outcome {
    let question_id = match session.current() {
        Some(question) => question.id.clone(),
        None => return Outcome::Ignored,
    };
    let mut slot = session.answers.slot(&question_id);

    match (command, engine) {
        (Command::FillBlanks(edits), Engine::FillBlank(engine)) => {
            for (index, value) in edits {
                engine.edit(*index, value, &mut slot);
            }
        }
        (Command::ClickLeft(position), Engine::Matching(engine)) => {
            if let Some(id) = engine.left().get(*position).and_then(|option| option.id.clone()) {
                engine.click_left(&id, &mut slot);
            }
        }
        (Command::ClickRight(position), Engine::Matching(engine)) => {
            if let Some(id) = engine.right().get(*position).and_then(|option| option.id.clone()) {
                engine.click_right(&id, &mut slot);
            }
        }
        (Command::MoveUp(index), Engine::Ordering(engine)) => engine.move_up(*index, &mut slot),
        (Command::MoveDown(index), Engine::Ordering(engine)) => {
            engine.move_down(*index, &mut slot)
        }
        (Command::Drag { from, to }, Engine::Ordering(engine)) => {
            engine.begin_drag(*from);
            engine.drag_over(*to);
            engine.drop_on(*to, &mut slot);
        }
        (Command::ConfirmOrder, Engine::Ordering(engine)) => engine.confirm(&mut slot),
        (Command::Choose(position), Engine::SingleChoice(engine)) => {
            if let Some(id) = engine.options().get(*position).and_then(|option| option.id.clone()) {
                engine.select(&id, &mut slot);
            }
        }
        _ => return Outcome::Ignored,
    }
    Outcome::Updated
}
