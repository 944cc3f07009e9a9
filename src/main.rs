use std::sync::Arc;

use log::{debug, info};
use quiz_capture_bot::{
    config::Config,
    error::AppError,
    input::{self, Outcome},
    quiz::{bank::QuestionBank, Engine, QuizSession},
    render,
};
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ReceiveAmountOfQuestions,
    TakingQuiz {
        session: QuizSession,
        engine: Engine,
    },
}

type UserInfoStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    pretty_env_logger::init();
    info!("Starting quiz bot...");

    let bank = Arc::new(QuestionBank::open(&config.bank_path)?);

    let bot = Bot::from_env();

    info!("Opening dialogue storage at {}", config.db_path);
    let storage: UserInfoStorage = SqliteStorage::open(&config.db_path, Json)
        .await
        .map_err(|err| AppError::Storage(err.to_string()))?
        .erase();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(receive_full_name))
            .branch(
                dptree::case![State::ReceiveAmountOfQuestions]
                    .endpoint(receive_amount_of_questions),
            )
            .branch(
                dptree::case![State::TakingQuiz { session, engine }].endpoint(take_quiz),
            ),
    )
    .dependencies(dptree::deps![storage, bank, Arc::new(config)])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

const GREETING_TEXT: &str = "Привіт! Я допоможу тобі пройти тест. Давай познайомимося! Як тебе звати?";
async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

fn amount_keyboard(max_questions: usize) -> KeyboardMarkup {
    let mut amounts = [5, 10, 15]
        .into_iter()
        .filter(|amount| *amount < max_questions)
        .collect::<Vec<_>>();
    amounts.push(max_questions);

    KeyboardMarkup::new(
        amounts
            .into_iter()
            .map(|amount| vec![KeyboardButton::new(amount.to_string())])
            .collect::<Vec<_>>(),
    )
}

async fn receive_full_name(
    config: Arc<Config>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    let Some(full_name) = msg.text() else {
        bot.send_message(msg.chat.id, "Будь ласка, введіть своє ім'я (текстом)")
            .await?;
        return Ok(());
    };

    bot.send_message(
        msg.chat.id,
        format!("Приємно познайомитися, {}! Скільки питань буде в тесті?", full_name),
    )
    .reply_markup(amount_keyboard(config.max_questions))
    .await?;

    dialogue.update(State::ReceiveAmountOfQuestions).await?;
    Ok(())
}

async fn receive_amount_of_questions(
    bank: Arc<QuestionBank>,
    config: Arc<Config>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    let amount = match msg.text().map(|text| text.trim().parse::<usize>()) {
        Some(Ok(amount)) => amount,
        _ => {
            bot.send_message(msg.chat.id, "Будь ласка, введіть число")
                .reply_markup(amount_keyboard(config.max_questions))
                .await?;
            return Ok(());
        }
    };
    if amount == 0 {
        bot.send_message(msg.chat.id, "Кількість питань не може бути 0")
            .await?;
        return Ok(());
    }

    let questions = bank.get_random_questions(amount.min(config.max_questions));
    info!(
        "Chat {} starts a quiz with {} questions",
        msg.chat.id.0,
        questions.len()
    );
    let session = QuizSession::new(questions);
    let engine = session.mount_current();

    bot.send_message(msg.chat.id, "Чудово! Почнемо тест!").await?;
    send_question(&bot, msg.chat.id, &session, &engine).await?;

    dialogue
        .update(State::TakingQuiz { session, engine })
        .await?;
    Ok(())
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    session: &QuizSession,
    engine: &Engine,
) -> HandlerResult {
    bot.send_message(chat_id, render::question_text(session, engine))
        .reply_markup(render::keyboard(session, engine))
        .await?;
    Ok(())
}

async fn take_quiz(
    config: Arc<Config>,
    bot: Bot,
    dialogue: QuizDialogue,
    (mut session, mut engine): (QuizSession, Engine),
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Будь ласка, надішли відповідь текстом")
            .await?;
        return Ok(());
    };

    let command = input::parse(text, &engine);
    debug!("Chat {} sent {:?}", msg.chat.id.0, command);

    match input::apply(&command, &mut session, &mut engine) {
        Outcome::Finish => return finish_quiz(config, bot, dialogue, session, msg).await,
        Outcome::ShowOverview => {
            let overview = session.overview();
            bot.send_message(msg.chat.id, render::overview_text(&overview))
                .reply_markup(render::overview_keyboard(&overview))
                .await?;
        }
        Outcome::Ignored => {
            bot.send_message(msg.chat.id, "Не зрозумів тебе, скористайся кнопками під питанням")
                .await?;
            send_question(&bot, msg.chat.id, &session, &engine).await?;
        }
        Outcome::Navigated | Outcome::Updated => {
            send_question(&bot, msg.chat.id, &session, &engine).await?;
        }
    }

    dialogue
        .update(State::TakingQuiz { session, engine })
        .await?;
    Ok(())
}

async fn finish_quiz(
    config: Arc<Config>,
    bot: Bot,
    dialogue: QuizDialogue,
    session: QuizSession,
    msg: Message,
) -> HandlerResult {
    let overview = session.overview();
    // Grading happens on the backend; the payload is what it receives
    info!(
        "Chat {} submitted: {}",
        msg.chat.id.0,
        session.answers.submission()
    );

    bot.send_message(
        msg.chat.id,
        format!(
            "{}\n\nСкільки питань буде в наступному тесті?",
            render::finish_text(&overview)
        ),
    )
    .reply_markup(amount_keyboard(config.max_questions))
    .await?;

    dialogue.update(State::ReceiveAmountOfQuestions).await?;
    Ok(())
}
