// Question and explanation generation.
// Every external call goes through llm_client; every failure ends in local fallback content.

pub mod explanation;
pub mod prompts;
pub mod questions;
