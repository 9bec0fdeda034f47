//! Test utilities for database setup and a scripted completion service.
//!
//! `TestEnv` reuses the real schema and seeds a small curriculum, so unit
//! tests exercise the same tables as production.

use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

use crate::auth::db as auth_db;
use crate::auth::AuthContext;
use crate::config::AppConfig;
use crate::db::{self, DbPool};
use crate::domain::{Difficulty, NewQuestion, QuestionType};
use crate::llm::{CompletionError, CompletionRequest, CompletionService};
use crate::state::AppState;

/// Seeded database in a temporary directory.
///
/// Layout: subject ECON, theme 1 with topic 1.2 (one question of each type)
/// and topic 1.1 (one short answer question), and a user with an open session.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub pool: DbPool,
    pub user_id: i64,
    pub token: String,
    pub subject_id: i64,
    pub theme_id: i64,
    pub topic_id: i64,
    pub other_topic_id: i64,
    pub mc_question_id: i64,
    pub calc_question_id: i64,
    pub short_question_id: i64,
    pub essay_question_id: i64,
    pub other_topic_question_id: i64,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let pool = db::init_db(&temp.path().join("exam_coach.db")).expect("init test database");

        let env = {
            let conn = pool.lock().expect("lock test database");
            let user_id = auth_db::create_user(&conn, "student", Some("Student")).unwrap();
            let token =
                auth_db::create_session(&conn, user_id, auth_db::SESSION_DURATION_HOURS).unwrap();

            let subject_id =
                db::insert_subject(&conn, "Economics", "econ", "A-Level Economics").unwrap();
            let theme_id =
                db::insert_theme(&conn, subject_id, 1, "Introduction to markets and market failure")
                    .unwrap();
            let topic_id = db::insert_topic(
                &conn,
                theme_id,
                "1.2",
                "How markets work",
                "Demand, supply and price determination.",
            )
            .unwrap();
            let other_topic_id = db::insert_topic(
                &conn,
                theme_id,
                "1.1",
                "Nature of economics",
                "Scarcity, choice and opportunity cost.",
            )
            .unwrap();

            let mc_question_id = db::insert_question(
                &conn,
                topic_id,
                &NewQuestion {
                    question_text: "Which shifts the demand curve right? A) Price fall B) Income rise"
                        .to_string(),
                    question_type: QuestionType::MultipleChoice,
                    difficulty: Difficulty::Easy,
                    marks: 2,
                    correct_answer: "B".to_string(),
                    explanation: "Normal goods see higher demand as income rises.".to_string(),
                    mark_scheme: String::new(),
                },
            )
            .unwrap();
            let calc_question_id = db::insert_question(
                &conn,
                topic_id,
                &NewQuestion {
                    question_text: "Price rises from £10 to £12. Calculate the percentage change in price."
                        .to_string(),
                    question_type: QuestionType::Calculation,
                    difficulty: Difficulty::Medium,
                    marks: 3,
                    correct_answer: "20".to_string(),
                    explanation: String::new(),
                    mark_scheme: String::new(),
                },
            )
            .unwrap();
            let short_question_id = db::insert_question(
                &conn,
                topic_id,
                &NewQuestion {
                    question_text: "Explain how equilibrium price is determined.".to_string(),
                    question_type: QuestionType::ShortAnswer,
                    difficulty: Difficulty::Medium,
                    marks: 4,
                    correct_answer: String::new(),
                    explanation: String::new(),
                    mark_scheme: "Award marks for \"supply\" and \"demand\" meeting at equilibrium."
                        .to_string(),
                },
            )
            .unwrap();
            let essay_question_id = db::insert_question(
                &conn,
                topic_id,
                &NewQuestion {
                    question_text: "Evaluate the view that markets always allocate resources efficiently."
                        .to_string(),
                    question_type: QuestionType::Essay,
                    difficulty: Difficulty::Hard,
                    marks: 12,
                    correct_answer: String::new(),
                    explanation: String::new(),
                    mark_scheme: "\"market failure\", \"externalities\", \"information gaps\"".to_string(),
                },
            )
            .unwrap();
            let other_topic_question_id = db::insert_question(
                &conn,
                other_topic_id,
                &sample_question(QuestionType::ShortAnswer, Difficulty::Medium),
            )
            .unwrap();

            TestEnvIds {
                user_id,
                token,
                subject_id,
                theme_id,
                topic_id,
                other_topic_id,
                mc_question_id,
                calc_question_id,
                short_question_id,
                essay_question_id,
                other_topic_question_id,
            }
        };

        Self {
            temp,
            pool,
            user_id: env.user_id,
            token: env.token,
            subject_id: env.subject_id,
            theme_id: env.theme_id,
            topic_id: env.topic_id,
            other_topic_id: env.other_topic_id,
            mc_question_id: env.mc_question_id,
            calc_question_id: env.calc_question_id,
            short_question_id: env.short_question_id,
            essay_question_id: env.essay_question_id,
            other_topic_question_id: env.other_topic_question_id,
        }
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.pool.lock().expect("lock test database")
    }

    /// Application state over this database
    pub fn state(&self, completion: Arc<dyn CompletionService>, grade_with_llm: bool) -> AppState {
        let config = AppConfig {
            database_path: self.temp.path().join("exam_coach.db"),
            grade_with_llm,
            ..AppConfig::default()
        };
        AppState::new(self.pool.clone(), completion, config)
    }

    pub fn auth(&self) -> AuthContext {
        AuthContext {
            user_id: self.user_id,
            username: "student".to_string(),
        }
    }
}

struct TestEnvIds {
    user_id: i64,
    token: String,
    subject_id: i64,
    theme_id: i64,
    topic_id: i64,
    other_topic_id: i64,
    mc_question_id: i64,
    calc_question_id: i64,
    short_question_id: i64,
    essay_question_id: i64,
    other_topic_question_id: i64,
}

/// Minimal valid question of the given type
pub fn sample_question(question_type: QuestionType, difficulty: Difficulty) -> NewQuestion {
    NewQuestion {
        question_text: format!("Sample {} question", question_type.as_str()),
        question_type,
        difficulty,
        marks: 4,
        correct_answer: "A".to_string(),
        explanation: String::new(),
        mark_scheme: "\"scarcity\"".to_string(),
    }
}

/// Completion service that replays canned replies and records requests
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    /// Always answer with `text`
    pub fn replying(text: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with each reply in turn, then fail
    pub fn sequence(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a 503
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let next = self.replies.lock().unwrap().pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(text) => Ok(text),
            None => Err(CompletionError::Status {
                status: 503,
                body: "scripted failure".to_string(),
            }),
        }
    }
}
