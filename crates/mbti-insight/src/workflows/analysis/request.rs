use serde::{Deserialize, Serialize};

use crate::workflows::questionnaire::PersonalityType;

pub const SYSTEM_PROMPT: &str = "你是一个专业的心理学分析师，专门分析MBTI性格类型。请根据用户的MBTI类型提供详细、准确、有见地的性格分析，包括优势、劣势、适合的职业方向、人际关系建议等。回答请用中文，语气专业但友好。";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub fn user_prompt(kind: PersonalityType) -> String {
    format!("我的MBTI类型是{kind}，请为我提供详细的性格分析和建议。")
}

/// Output budget for the completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisProfile {
    #[default]
    Detailed,
    LongContext,
}

impl AnalysisProfile {
    pub const fn max_tokens(self) -> u32 {
        match self {
            Self::Detailed => 1000,
            Self::LongContext => 500,
        }
    }
}

/// Everything needed for one analysis call, built fresh per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub personality_type: PersonalityType,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl AnalysisRequest {
    pub fn new(kind: PersonalityType, model: impl Into<String>, profile: AnalysisProfile) -> Self {
        Self {
            personality_type: kind,
            model: model.into(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: user_prompt(kind),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: profile.max_tokens(),
        }
    }

    pub fn chat_body(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", &self.system_prompt),
                ChatMessage::new("user", &self.user_prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// Body posted to the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Subset of the chat-completion response that the pipeline reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if it carries any non-blank text.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}
