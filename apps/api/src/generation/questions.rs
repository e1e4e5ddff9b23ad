//! Question Generator — produces question/answer pairs for a role.
//!
//! Primary path: one call to the generative service, fences stripped, JSON array parsed.
//! Any failure (transport, status, timeout, unparsable text, nothing usable) is logged and
//! replaced by a fixed, locally templated set. The result is therefore never empty.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{INITIAL_QUESTIONS_PROMPT_TEMPLATE, MORE_QUESTIONS_PROMPT_TEMPLATE};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, LlmError, TextGenerator};
use crate::models::session::{NewQuestion, QuestionSource};

/// Questions requested from the service per batch.
pub const QUESTIONS_PER_BATCH: usize = 5;

/// Which call site is asking. Selects both the prompt wording and the fallback set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Batch {
    /// First questions of a freshly created session (fallback: 2 items).
    Initial,
    /// "Generate more" on an existing session (fallback: 5 items).
    More,
}

#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub role: String,
    pub experience: String,
    pub skills: Vec<String>,
    pub count: usize,
}

impl QuestionRequest {
    /// Splits `skills` on commas and trims each item. Empty items are dropped.
    pub fn new(role: &str, experience: &str, skills: &str, count: usize) -> Result<Self, AppError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("Please provide a title".to_string()));
        }

        let skills: Vec<String> = skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if skills.is_empty() {
            return Err(AppError::Validation("Please specify skills".to_string()));
        }

        Ok(Self {
            role: role.to_string(),
            experience: experience.trim().to_string(),
            skills,
            count,
        })
    }

    pub fn primary_skill(&self) -> &str {
        // `new` guarantees at least one skill
        self.skills.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedPair {
    #[serde(default)]
    question_text: String,
    #[serde(default)]
    answer: String,
}

/// Produces the questions for one batch. Never fails and never returns an empty list.
pub async fn generate_questions(
    generator: &dyn TextGenerator,
    request: &QuestionRequest,
    batch: Batch,
) -> Vec<NewQuestion> {
    match request_ai_questions(generator, request, batch).await {
        Ok(questions) => {
            info!(
                "Generated {} AI questions for role '{}'",
                questions.len(),
                request.role
            );
            questions
        }
        Err(e) => {
            warn!(
                "AI question generation failed for role '{}', using fallback questions: {e}",
                request.role
            );
            fallback_questions(request, batch)
        }
    }
}

async fn request_ai_questions(
    generator: &dyn TextGenerator,
    request: &QuestionRequest,
    batch: Batch,
) -> Result<Vec<NewQuestion>, LlmError> {
    let prompt = build_prompt(request, batch);
    let pairs: Vec<GeneratedPair> = complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;

    let questions: Vec<NewQuestion> = pairs
        .into_iter()
        .filter(|p| !p.question_text.trim().is_empty() && !p.answer.trim().is_empty())
        .map(|p| NewQuestion {
            question_text: p.question_text.trim().to_string(),
            answer: p.answer.trim().to_string(),
            source: QuestionSource::AiGenerated,
        })
        .collect();

    if questions.is_empty() {
        return Err(LlmError::EmptyResult);
    }
    Ok(questions)
}

fn build_prompt(request: &QuestionRequest, batch: Batch) -> String {
    let template = match batch {
        Batch::Initial => INITIAL_QUESTIONS_PROMPT_TEMPLATE,
        Batch::More => MORE_QUESTIONS_PROMPT_TEMPLATE,
    };
    template
        .replace("{count}", &request.count.to_string())
        .replace("{role}", &request.role)
        .replace("{experience}", &request.experience)
        .replace("{skills}", &request.skills.join(", "))
}

/// Deterministic substitute content built from the first skill and the experience level.
pub fn fallback_questions(request: &QuestionRequest, batch: Batch) -> Vec<NewQuestion> {
    let skill = request.primary_skill();
    let experience = &request.experience;

    let pairs = match batch {
        Batch::Initial => vec![
            (
                format!("Explain your experience with {skill}"),
                format!("As a {experience} developer, I would approach {skill} by..."),
            ),
            (
                format!("What are the core concepts of {skill}?"),
                "The core concepts include...".to_string(),
            ),
        ],
        Batch::More => vec![
            (
                format!("Explain your experience with {skill}"),
                format!("As a {experience} developer, I would approach {skill} by..."),
            ),
            (
                format!("What are the advanced concepts of {skill}?"),
                "The advanced concepts include...".to_string(),
            ),
            (
                format!("How would you optimize {skill} performance?"),
                "Performance optimization can be achieved through...".to_string(),
            ),
            (
                format!("Describe a challenging project involving {skill}"),
                "In one of my recent projects, I had to...".to_string(),
            ),
            (
                format!("What are the best practices for {skill} development?"),
                "Some best practices include...".to_string(),
            ),
        ],
    };

    pairs
        .into_iter()
        .map(|(question_text, answer)| NewQuestion {
            question_text,
            answer,
            source: QuestionSource::Fallback,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;

    fn backend_request() -> QuestionRequest {
        QuestionRequest::new("Backend Engineer", "3 years", "Go, SQL", QUESTIONS_PER_BATCH).unwrap()
    }

    fn five_pairs_json() -> String {
        let items: Vec<String> = (1..=5)
            .map(|i| format!(r#"{{"questionText": "Question {i}?", "answer": "Answer {i}."}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    #[test]
    fn test_request_splits_and_trims_skills() {
        let request = QuestionRequest::new(" Backend Engineer ", "3 years", " Go ,SQL,, ", 5).unwrap();
        assert_eq!(request.role, "Backend Engineer");
        assert_eq!(request.skills, vec!["Go".to_string(), "SQL".to_string()]);
        assert_eq!(request.primary_skill(), "Go");
    }

    #[test]
    fn test_request_rejects_blank_skills_and_role() {
        assert!(matches!(
            QuestionRequest::new("Backend Engineer", "3 years", " , ,", 5),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            QuestionRequest::new("   ", "3 years", "Go", 5),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_prompt_embeds_role_experience_skills_and_count() {
        let prompt = build_prompt(&backend_request(), Batch::Initial);
        assert!(prompt.contains("Generate 5 interview questions"));
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("3 years"));
        assert!(prompt.contains("Go, SQL"));
        assert!(prompt.contains("questionText"));

        let prompt = build_prompt(&backend_request(), Batch::More);
        assert!(prompt.contains("Generate 5 more interview questions about Go, SQL"));
    }

    #[test]
    fn test_fallback_sizes_and_provenance() {
        let request = backend_request();
        let initial = fallback_questions(&request, Batch::Initial);
        let more = fallback_questions(&request, Batch::More);

        assert_eq!(initial.len(), 2);
        assert_eq!(more.len(), 5);
        for q in initial.iter().chain(more.iter()) {
            assert_eq!(q.source, QuestionSource::Fallback);
            assert!(!q.question_text.is_empty());
            assert!(!q.answer.is_empty());
            assert!(q.question_text.contains("Go"));
            assert!(!q.question_text.contains("SQL"));
        }
        assert!(initial[0].answer.contains("3 years"));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let request = backend_request();
        assert_eq!(
            fallback_questions(&request, Batch::More),
            fallback_questions(&request, Batch::More)
        );
    }

    #[tokio::test]
    async fn test_fenced_ai_reply_yields_ai_questions() {
        let reply = format!("```json\n{}\n```", five_pairs_json());
        let generator = ScriptedGenerator::replying(vec![reply.as_str()]);

        let questions = generate_questions(&generator, &backend_request(), Batch::Initial).await;

        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.source == QuestionSource::AiGenerated));
        assert_eq!(questions[0].question_text, "Question 1?");
        assert_eq!(generator.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_falls_back_after_one_attempt() {
        let generator = ScriptedGenerator::failing();
        let questions = generate_questions(&generator, &backend_request(), Batch::Initial).await;

        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.source == QuestionSource::Fallback));
        assert_eq!(generator.prompt_count(), 1, "no retry of the external call");
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let generator = ScriptedGenerator::replying(vec!["I'm sorry, I can't produce JSON today."]);
        let questions = generate_questions(&generator, &backend_request(), Batch::More).await;

        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.source == QuestionSource::Fallback));
    }

    #[tokio::test]
    async fn test_empty_array_falls_back() {
        let generator = ScriptedGenerator::replying(vec!["[]"]);
        let questions = generate_questions(&generator, &backend_request(), Batch::Initial).await;
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.source == QuestionSource::Fallback));
    }

    #[tokio::test]
    async fn test_blank_items_are_dropped_and_all_blank_falls_back() {
        let generator = ScriptedGenerator::replying(vec![
            r#"[{"questionText": "Real?", "answer": "Yes."}, {"questionText": "", "answer": "x"}]"#,
            r#"[{"questionText": " ", "answer": " "}]"#,
        ]);
        let request = backend_request();

        let first = generate_questions(&generator, &request, Batch::Initial).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].source, QuestionSource::AiGenerated);

        let second = generate_questions(&generator, &request, Batch::Initial).await;
        assert_eq!(second.len(), 2);
        assert!(second.iter().all(|q| q.source == QuestionSource::Fallback));
    }
}
