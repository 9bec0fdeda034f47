//! Shared setup for API integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{header, HeaderValue};
use axum_test::{TestRequest, TestServer};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use exam_coach::auth::db as auth_db;
use exam_coach::config::AppConfig;
use exam_coach::db::{self, DbPool};
use exam_coach::domain::{Difficulty, NewQuestion, QuestionType};
use exam_coach::llm::{CompletionError, CompletionRequest, CompletionService};
use exam_coach::router;
use exam_coach::state::AppState;

/// Completion service returning queued replies; fails once the queue is empty
#[derive(Default)]
pub struct FakeCompletion {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn with_replies(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CompletionError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub pool: DbPool,
    pub completion: Arc<FakeCompletion>,
    pub token: String,
    pub user_id: i64,
    pub subject_id: i64,
    pub topic_id: i64,
    pub mc_question_id: i64,
    pub calc_question_id: i64,
    pub short_question_id: i64,
    pub essay_question_id: i64,
    _temp: TempDir,
}

fn question(
    text: &str,
    question_type: QuestionType,
    difficulty: Difficulty,
    marks: u32,
    correct_answer: &str,
    mark_scheme: &str,
) -> NewQuestion {
    NewQuestion {
        question_text: text.to_string(),
        question_type,
        difficulty,
        marks,
        correct_answer: correct_answer.to_string(),
        explanation: String::new(),
        mark_scheme: mark_scheme.to_string(),
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(FakeCompletion::failing(), false)
    }

    pub fn with_completion(completion: FakeCompletion) -> Self {
        Self::build(completion, false)
    }

    pub fn with_llm_grading(completion: FakeCompletion) -> Self {
        Self::build(completion, true)
    }

    fn build(completion: FakeCompletion, grade_with_llm: bool) -> Self {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("exam_coach.db");
        let pool = db::init_db(&db_path).unwrap();

        let (token, user_id, subject_id, topic_id, ids) = {
            let conn = pool.lock().unwrap();
            let user_id = auth_db::create_user(&conn, "student", None).unwrap();
            let token =
                auth_db::create_session(&conn, user_id, auth_db::SESSION_DURATION_HOURS).unwrap();

            let subject_id = db::insert_subject(&conn, "Economics", "ECON", "").unwrap();
            let theme_id = db::insert_theme(&conn, subject_id, 1, "Markets").unwrap();
            let topic_id =
                db::insert_topic(&conn, theme_id, "1.2", "How markets work", "Supply and demand.")
                    .unwrap();

            let ids: Vec<i64> = [
                question(
                    "Which causes a rightward demand shift? A) Price fall B) Income rise",
                    QuestionType::MultipleChoice,
                    Difficulty::Easy,
                    2,
                    "B",
                    "",
                ),
                question(
                    "Price rises from 10 to 12. Percentage change?",
                    QuestionType::Calculation,
                    Difficulty::Medium,
                    3,
                    "20%",
                    "",
                ),
                question(
                    "Explain how equilibrium price is determined.",
                    QuestionType::ShortAnswer,
                    Difficulty::Medium,
                    4,
                    "",
                    "Credit \"supply\" and \"demand\".",
                ),
                question(
                    "Evaluate price controls.",
                    QuestionType::Essay,
                    Difficulty::Hard,
                    12,
                    "",
                    "\"shortage\", \"black market\"",
                ),
            ]
            .iter()
            .map(|q| db::insert_question(&conn, topic_id, q).unwrap())
            .collect();

            (token, user_id, subject_id, topic_id, ids)
        };

        let completion = Arc::new(completion);
        let config = AppConfig {
            database_path: db_path,
            grade_with_llm,
            ..AppConfig::default()
        };
        let state = AppState::new(pool.clone(), completion.clone(), config);
        let server = TestServer::new(router(state)).unwrap();

        Self {
            server,
            pool,
            completion,
            token,
            user_id,
            subject_id,
            topic_id,
            mc_question_id: ids[0],
            calc_question_id: ids[1],
            short_question_id: ids[2],
            essay_question_id: ids[3],
            _temp: temp,
        }
    }

    pub fn get(&self, path: &str) -> TestRequest {
        self.server.get(path).add_header(header::AUTHORIZATION, self.bearer())
    }

    pub fn post(&self, path: &str) -> TestRequest {
        self.server.post(path).add_header(header::AUTHORIZATION, self.bearer())
    }

    fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap()
    }
}
