pub mod curriculum;
pub mod grading;
pub mod progress;
pub mod question;
pub mod recall;
pub mod tutor;

pub use curriculum::{Subject, Theme, Topic, TopicContext, TopicSummary};
pub use grading::{GradingRequest, GradingResult};
pub use progress::{AnswerRecord, MasteryLevel, TopicProgress, WeakTopic};
pub use question::{Difficulty, NewQuestion, Question, QuestionType};
pub use recall::{DueReview, QuestionSummary, ReviewQueueEntry};
pub use tutor::TutorMemory;
