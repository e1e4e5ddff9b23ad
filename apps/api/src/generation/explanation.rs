//! Explanation Generator — long-form breakdown of a single interview question.
//!
//! Nothing is persisted; each call generates afresh. The fallback depends only on the
//! question text, so it is byte-identical across calls.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generation::prompts::EXPLANATION_PROMPT_TEMPLATE;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, LlmError, TextGenerator};

const REACT_HOOKS_SAMPLE: &str = r#"// Example of using React Hooks
import React, { useState, useEffect, useCallback } from 'react';

function MyComponent() {
  const [data, setData] = useState([]);

  const fetchData = useCallback(async () => {
    const response = await fetch('https://api.example.com/data');
    const result = await response.json();
    setData(result);
  }, []);

  useEffect(() => {
    fetchData();
  }, [fetchData]);

  return <div>{/* Component JSX */}</div>;
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sections: Vec<ExplanationSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub points: Vec<String>,
}

/// Always returns a well-formed explanation.
pub async fn explain_question(generator: &dyn TextGenerator, question_text: &str) -> Explanation {
    match request_ai_explanation(generator, question_text).await {
        Ok(explanation) => explanation,
        Err(e) => {
            warn!("AI explanation failed, using fallback explanation: {e}");
            fallback_explanation(question_text)
        }
    }
}

async fn request_ai_explanation(
    generator: &dyn TextGenerator,
    question_text: &str,
) -> Result<Explanation, LlmError> {
    let prompt = EXPLANATION_PROMPT_TEMPLATE.replace("{question}", question_text);
    let explanation: Explanation = complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;
    normalize(explanation).ok_or(LlmError::EmptyResult)
}

/// Trims fields, turns blank optionals into `None`, and rejects a missing title or intro.
fn normalize(mut explanation: Explanation) -> Option<Explanation> {
    explanation.title = explanation.title.trim().to_string();
    explanation.content = explanation.content.trim().to_string();
    if explanation.title.is_empty() || explanation.content.is_empty() {
        return None;
    }

    for section in &mut explanation.sections {
        section.title = section.title.take().filter(|t| !t.trim().is_empty());
        section.code = section.code.take().filter(|c| !c.trim().is_empty());
        section.points.retain(|p| !p.trim().is_empty());
    }
    Some(explanation)
}

pub fn fallback_explanation(question_text: &str) -> Explanation {
    let lead_word = question_text
        .split_whitespace()
        .next()
        .unwrap_or(question_text);

    let code = question_text
        .contains("React")
        .then(|| REACT_HOOKS_SAMPLE.to_string());

    Explanation {
        title: format!("Understanding {question_text}"),
        content: format!(
            "This question explores your knowledge of {lead_word} concepts. \
             Let's break down the key aspects you should cover in your answer."
        ),
        sections: vec![
            ExplanationSection {
                title: Some("Core Concepts".to_string()),
                content: format!(
                    "When answering about {question_text}, focus on the fundamental principles \
                     and how they apply in real-world scenarios."
                ),
                code,
                points: vec![
                    "Explain the basic concept clearly and concisely".to_string(),
                    "Provide practical examples from your experience".to_string(),
                    "Discuss advantages and potential drawbacks".to_string(),
                ],
            },
            ExplanationSection {
                title: Some("Best Practices".to_string()),
                content: "When answering this question in an interview, follow these guidelines \
                          to make a strong impression."
                    .to_string(),
                code: None,
                points: vec![
                    "Structure your answer with an introduction, main points, and conclusion"
                        .to_string(),
                    "Use specific examples from your own projects".to_string(),
                    "Connect your answer to the specific requirements of the role".to_string(),
                    "Demonstrate your problem-solving approach".to_string(),
                ],
            },
        ],
    }
}
