//! Evaluation pipeline: flags, grade bands, criteria matching and the
//! assembler that turns one submission into an `EvaluationRecord`.

pub mod assembler;
pub mod criteria;
pub mod feedback;
pub mod flags;
pub mod grade;
pub mod handlers;
pub mod record;
pub mod upload;

pub use assembler::Evaluator;
