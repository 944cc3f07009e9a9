use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

const DEFAULT_BANK_PATH: &str = "questions.json";
const DEFAULT_DB_PATH: &str = "db.sqlite";
const DEFAULT_MAX_QUESTIONS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bank_path: PathBuf,
    pub db_path: String,
    pub max_questions: usize,
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenv::dotenv() {
            log::debug!("No .env file loaded: {}", err);
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_questions = match lookup("QUIZ_MAX_QUESTIONS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(amount) if amount > 0 => amount,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "QUIZ_MAX_QUESTIONS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_MAX_QUESTIONS,
        };

        Ok(Self {
            bank_path: lookup("QUIZ_BANK_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BANK_PATH)),
            db_path: lookup("QUIZ_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            max_questions,
        })
    }
}
