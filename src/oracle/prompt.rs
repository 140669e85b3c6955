//! Prompt rendering for one batch request.

use crate::provider::ChatMessage;
use crate::types::{Batch, BusinessContext};

pub const SYSTEM_PROMPT: &str = "You are an expert social media manager with 15+ years of \
experience in professional social media management. Generate content based on the user's \
input, strictly adhering to the provided JSON schema.";

/// Structural contract the response must satisfy.
pub const CALENDAR_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "contentPillars": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "name": { "type": "string" },
          "keyword": { "type": "string" },
          "questions": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["name", "keyword", "questions"]
      }
    },
    "contentIdeas": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "date": { "type": "string" },
          "platform": { "type": "string" },
          "pillar": { "type": "string" },
          "contentType": { "type": "string" },
          "summary": { "type": "string" },
          "question": { "type": "string" },
          "contentIdea": { "type": "string" }
        },
        "required": ["date", "platform", "pillar", "contentType", "summary", "question", "contentIdea"]
      }
    }
  },
  "required": ["contentPillars", "contentIdeas"]
}"#;

pub fn render_user_prompt(batch: &Batch, context: &BusinessContext) -> String {
    let platforms: Vec<String> = context.platforms.iter().map(ToString::to_string).collect();
    let dates = batch.iso_dates();

    format!(
        "Generate a social media content calendar based on the following information:\n\
         Business description: {description}\n\
         Target platforms: {platforms}\n\
         Posting dates ({count}): {dates}\n\n\
         Please provide the following in your response:\n\
         1. 5 content pillars relevant to the business\n\
         2. For each pillar, one relevant keyword\n\
         3. For each keyword, 3 frequently asked questions by the target audience\n\
         4. Exactly {count} content ideas, one for each posting date listed above, \
         each assigned to one of the target platforms. Use the date exactly as given (YYYY-MM-DD).\n\n\
         Ensure your response strictly adheres to the following JSON schema:\n\
         {schema}\n\n\
         Your response should be a valid JSON object matching this schema exactly.",
        description = context.description.trim(),
        platforms = platforms.join(", "),
        count = dates.len(),
        dates = dates.join(", "),
        schema = CALENDAR_SCHEMA,
    )
}

pub fn build_messages(batch: &Batch, context: &BusinessContext) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(render_user_prompt(batch, context)),
    ]
}
