use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::input::{
    CONFIRM_ORDER_BUTTON, FINISH_BUTTON, LEFT_PREFIX, MOVE_DOWN_PREFIX, MOVE_UP_PREFIX,
    NEXT_BUTTON, OVERVIEW_BUTTON, PREVIOUS_BUTTON, RIGHT_PREFIX,
};
use crate::quiz::choice::ChoiceEngine;
use crate::quiz::fill_blank::{FillBlankEngine, Segment};
use crate::quiz::matching::{MatchingEngine, Selection};
use crate::quiz::navigation::{NavigationOverview, QuestionStatus};
use crate::quiz::ordering::OrderingEngine;
use crate::quiz::{Engine, QuestionOption, QuizSession};

const GRID_WIDTH: usize = 5;
const EMPTY_BLANK: &str = "___";

fn option_label(option: &QuestionOption) -> String {
    match &option.media {
        Some(media) => format!("{} (🖼 {})", option.text, media),
        None => option.text.clone(),
    }
}

pub fn question_text(session: &QuizSession, engine: &Engine) -> String {
    let Some(question) = session.current() else {
        return "У цьому тесті немає питань".to_string();
    };
    let overview = session.overview();
    let header = format!(
        "Питання №{} з {} (відповідей: {})",
        session.current_index + 1,
        overview.total(),
        overview.answered_count
    );

    let body = match engine {
        Engine::FillBlank(engine) => fill_blank_body(&question.prompt, engine),
        Engine::Matching(engine) => format!("{}\n\n{}", question.prompt, matching_body(engine)),
        Engine::Ordering(engine) => format!("{}\n\n{}", question.prompt, ordering_body(engine)),
        Engine::SingleChoice(engine) => format!("{}\n\n{}", question.prompt, choice_body(engine)),
        Engine::ReadOnly => format!(
            "{}\n\nЦей тип питань поки що не підтримується, переходь до наступного.",
            question.prompt
        ),
    };
    format!("{}\n\n{}", header, body)
}

fn fill_blank_body(prompt: &str, engine: &FillBlankEngine) -> String {
    let template = engine.template();
    if template.is_free_text() {
        let value = engine.values().first().map(|value| value.trim()).unwrap_or("");
        let value = if value.is_empty() { EMPTY_BLANK } else { value };
        return format!(
            "{}\n\nТвоя відповідь: {}\n\nНадішли відповідь повідомленням.",
            prompt, value
        );
    }

    let sentence = template
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.clone(),
            Segment::Blank(index) => {
                let value = engine.values()[*index].trim();
                if value.is_empty() {
                    format!("[{}: {}]", index + 1, EMPTY_BLANK)
                } else {
                    format!("[{}: {}]", index + 1, value)
                }
            }
        })
        .collect::<String>();

    if engine.blank_count() == 1 {
        return format!("{}\n\nНадішли слово для пропуску.", sentence);
    }
    format!(
        "{}\n\nНадішли «номер: відповідь» або по рядку на кожен з {} пропусків.",
        sentence,
        engine.blank_count()
    )
}

fn matching_body(engine: &MatchingEngine) -> String {
    let left_index = |id: &str| {
        engine
            .left()
            .iter()
            .position(|option| option.has_id(id))
            .map(|index| index + 1)
    };
    let right_index = |id: &str| {
        engine
            .right()
            .iter()
            .position(|option| option.has_id(id))
            .map(|index| index + 1)
    };

    let mut lines = vec!["Ліва колонка:".to_string()];
    for (index, option) in engine.left().iter().enumerate() {
        let id = option.id.as_deref().unwrap_or("");
        let mark = match (engine.pairing().get(id), engine.selection()) {
            (Some(right), _) => match right_index(right.as_str()) {
                Some(position) => format!(" ↔ {}{}", RIGHT_PREFIX, position),
                None => String::new(),
            },
            (None, Selection::LeftPending(pending)) if pending == id => " 👈".to_string(),
            _ => String::new(),
        };
        lines.push(format!("{}{}. {}{}", LEFT_PREFIX, index + 1, option_label(option), mark));
    }

    lines.push(String::new());
    lines.push("Права колонка:".to_string());
    for (index, option) in engine.right().iter().enumerate() {
        let id = option.id.as_deref().unwrap_or("");
        let mark = match (engine.partner_of_right(id), engine.selection()) {
            (Some(left), _) => match left_index(left) {
                Some(position) => format!(" ✔ {}{}", LEFT_PREFIX, position),
                None => " ✔".to_string(),
            },
            (None, Selection::RightPending(pending)) if pending == id => " 👈".to_string(),
            _ => String::new(),
        };
        lines.push(format!("{}{}. {}{}", RIGHT_PREFIX, index + 1, option_label(option), mark));
    }

    lines.push(String::new());
    lines.push(
        "Обери елемент зліва і справа, щоб з'єднати їх. Повторне натискання на з'єднаний елемент зліва роз'єднує пару."
            .to_string(),
    );
    lines.join("\n")
}

fn ordering_body(engine: &OrderingEngine) -> String {
    let mut lines = engine
        .items()
        .iter()
        .enumerate()
        .map(|(index, option)| format!("{}. {}", index + 1, option_label(option)))
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(format!(
        "Переміщуй кнопками {} n / {} n або надішли «n > m», щоб поставити елемент n на місце m.",
        MOVE_UP_PREFIX, MOVE_DOWN_PREFIX
    ));
    lines.join("\n")
}

fn choice_body(engine: &ChoiceEngine) -> String {
    engine
        .options()
        .iter()
        .map(|option| {
            let chosen = option.id.is_some() && option.id.as_deref() == engine.selected();
            format!("{} {}", if chosen { "●" } else { "○" }, option_label(option))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn keyboard(session: &QuizSession, engine: &Engine) -> KeyboardMarkup {
    let mut rows: Vec<Vec<KeyboardButton>> = match engine {
        Engine::FillBlank(_) | Engine::ReadOnly => Vec::new(),
        Engine::Matching(engine) => {
            let left = engine
                .left()
                .iter()
                .enumerate()
                .map(|(index, option)| {
                    KeyboardButton::new(format!("{}{}: {}", LEFT_PREFIX, index + 1, option.text))
                });
            let right = engine
                .right()
                .iter()
                .enumerate()
                .map(|(index, option)| {
                    KeyboardButton::new(format!("{}{}: {}", RIGHT_PREFIX, index + 1, option.text))
                });
            vec![left.collect(), right.collect()]
        }
        Engine::Ordering(engine) => {
            let mut rows = (0..engine.items().len())
                .map(|index| {
                    vec![
                        KeyboardButton::new(format!("{} {}", MOVE_UP_PREFIX, index + 1)),
                        KeyboardButton::new(format!("{} {}", MOVE_DOWN_PREFIX, index + 1)),
                    ]
                })
                .collect::<Vec<_>>();
            rows.push(vec![KeyboardButton::new(CONFIRM_ORDER_BUTTON)]);
            rows
        }
        Engine::SingleChoice(engine) => engine
            .options()
            .iter()
            .map(|option| vec![KeyboardButton::new(option.text.clone())])
            .collect(),
    };

    let overview = session.overview();
    let mut navigation = Vec::new();
    if overview.previous().is_some() {
        navigation.push(KeyboardButton::new(PREVIOUS_BUTTON));
    }
    navigation.push(KeyboardButton::new(OVERVIEW_BUTTON));
    if overview.next().is_some() {
        navigation.push(KeyboardButton::new(NEXT_BUTTON));
    }
    rows.push(navigation);
    rows.push(vec![KeyboardButton::new(FINISH_BUTTON)]);

    KeyboardMarkup::new(rows)
}

fn status_mark(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::Current => "▶",
        QuestionStatus::Answered => "✅",
        QuestionStatus::Unanswered => "⬜",
    }
}

pub fn overview_text(overview: &NavigationOverview) -> String {
    let grid = overview
        .cells
        .chunks(GRID_WIDTH)
        .map(|row| {
            row.iter()
                .map(|cell| format!("{}{}", status_mark(cell.status), cell.index + 1))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut text = format!(
        "{}\n\nВідповідей: {} з {}",
        grid,
        overview.answered_count,
        overview.total()
    );
    if let Some(first) = overview.first_unanswered() {
        text.push_str(&format!("\nПерше питання без відповіді: #{}", first + 1));
    }
    text
}

/// `#n` buttons for every question.
pub fn overview_keyboard(overview: &NavigationOverview) -> KeyboardMarkup {
    let rows = overview
        .cells
        .chunks(GRID_WIDTH)
        .map(|row| {
            row.iter()
                .map(|cell| KeyboardButton::new(format!("#{}", cell.index + 1)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    KeyboardMarkup::new(rows)
}

pub fn finish_text(overview: &NavigationOverview) -> String {
    let unanswered = overview.unanswered();
    let mut text = format!(
        "Тест завершено! Ти відповів на {} з {} питань.",
        overview.total() - unanswered.len(),
        overview.total()
    );
    if !unanswered.is_empty() {
        let numbers = unanswered
            .iter()
            .map(|index| format!("#{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&format!("\nБез відповіді залишились: {}", numbers));
    }
    text
}
