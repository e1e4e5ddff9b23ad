// Interview sessions: CRUD over sessions, question generation, and question explanations.

pub mod handlers;
pub mod workflow;
