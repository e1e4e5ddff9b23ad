// All LLM prompt templates for the Generation module.
// Placeholders are replaced with `str::replace` before sending.

/// Initial batch for a new session.
/// Replace: {count}, {role}, {experience}, {skills}
pub const INITIAL_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate {count} interview questions for a {role} role requiring {experience} experience with these skills: {skills}.

Return a JSON ARRAY where each element has exactly these string properties:
[
  {
    "questionText": "The interview question",
    "answer": "A strong model answer a candidate could give"
  }
]

RULES:
1. Every question must be answerable in a spoken interview
2. Answers must be concrete and specific to the listed skills
3. Calibrate depth to the stated experience level"#;

/// Follow-up batch for an existing session.
/// Replace: {count}, {role}, {experience}, {skills}
pub const MORE_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate {count} more interview questions about {skills} for a {role} role at {experience} level.

Return a JSON ARRAY where each element has exactly these string properties:
[
  {
    "questionText": "The interview question",
    "answer": "A strong model answer a candidate could give"
  }
]"#;

/// Long-form explanation of one question.
/// Replace: {question}
pub const EXPLANATION_PROMPT_TEMPLATE: &str = r#"Provide a detailed explanation for the following interview question: "{question}".
Include an introduction, key concepts, code examples if applicable, and best practices.

Return a JSON OBJECT with this EXACT structure:
{
  "title": "Title of the explanation",
  "content": "Brief introduction",
  "sections": [
    {
      "title": "Section title",
      "content": "Section content with multiple paragraphs",
      "code": "Code example if applicable, otherwise omit this field",
      "points": ["Key point 1", "Key point 2"]
    }
  ]
}"#;
