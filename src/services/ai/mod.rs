// SPDX-License-Identifier: GPL-3.0-or-later
// src/services/ai/mod.rs
//
// Generative AI collaborator: exercise suggestions, grading and diagrams.

mod gemini;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::grading::Grade;
use crate::domain::lesson::DiagramKind;
use crate::domain::media::DataUrl;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured (set LECTERN_API_KEY or ai.api_key in the config file)")]
    MissingApiKey,

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to the AI service failed")]
    Http(#[from] reqwest::Error),

    #[error("AI service responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("AI service returned malformed JSON")]
    Malformed(#[from] serde_json::Error),

    #[error("AI service returned an unexpected response: {0}")]
    Unexpected(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match crate::records::normalize_key(value).as_str() {
            "easy" | "de" => Ok(Self::Easy),
            "medium" | "trungbinh" => Ok(Self::Medium),
            "hard" | "kho" => Ok(Self::Hard),
            _ => Err(format!("unknown difficulty `{value}` (easy, medium, hard)")),
        }
    }
}

/// What the grader needs to know about the question being answered.
#[derive(Debug, Clone, Copy)]
pub struct GradingContext<'a> {
    pub lesson_title: &'a str,
    pub question: &'a str,
}

pub trait AiContentService {
    /// Up to `count` exercise prompts about `topic`.
    fn suggest_exercises(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> impl Future<Output = Result<Vec<String>, AiError>> + Send;

    fn grade_submission(
        &self,
        context: GradingContext<'_>,
        answer: &str,
        image: Option<&DataUrl>,
    ) -> impl Future<Output = Result<Grade, AiError>> + Send;

    /// Data URL of the generated figure, or `None` when the model returned
    /// no image.
    fn generate_diagram(
        &self,
        prompt: &str,
        kind: DiagramKind,
    ) -> impl Future<Output = Result<Option<String>, AiError>> + Send;
}

/// Deterministic service for workflow tests.
#[cfg(test)]
pub mod scripted {
    use std::sync::Mutex;

    use super::*;

    pub type Grader = fn(&str, &str) -> Result<Grade, AiError>;

    pub struct ScriptedAi {
        pub suggestions: Vec<String>,
        pub grader: Grader,
        pub diagram: Option<String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl Default for ScriptedAi {
        fn default() -> Self {
            Self {
                suggestions: Vec::new(),
                grader: |_, _| Ok(Grade::new(10.0, "ok")),
                diagram: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl AiContentService for ScriptedAi {
        async fn suggest_exercises(
            &self,
            topic: &str,
            _difficulty: Difficulty,
            count: usize,
        ) -> Result<Vec<String>, AiError> {
            self.prompts.lock().unwrap().push(topic.to_string());
            Ok(self.suggestions.iter().take(count).cloned().collect())
        }

        async fn grade_submission(
            &self,
            context: GradingContext<'_>,
            answer: &str,
            _image: Option<&DataUrl>,
        ) -> Result<Grade, AiError> {
            (self.grader)(context.question, answer)
        }

        async fn generate_diagram(
            &self,
            prompt: &str,
            _kind: DiagramKind,
        ) -> Result<Option<String>, AiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.diagram.clone())
        }
    }
}
