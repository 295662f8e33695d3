//! filingdb-answer
//!
//! Turns ranked chunks into grounded answers or explicit abstentions, and
//! exposes the two public operations: [`build_index`] and
//! [`Engine::answer_question`].

pub mod compose;
pub mod engine;
pub mod policy;

pub use compose::{compose, ABSTAIN_ANSWER};
pub use engine::{build_index, BuildReport, Engine};
pub use policy::{decide, Decision};
