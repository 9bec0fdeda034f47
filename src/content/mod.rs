//! Curriculum content produced outside the request/response core.

pub mod generator;

pub use generator::{
    build_generation_request, parse_generated_questions, GeneratedBatch, GenerationError,
};
