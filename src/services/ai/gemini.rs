// SPDX-License-Identifier: GPL-3.0-or-later
// src/services/ai/gemini.rs
//
// `generateContent` REST client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{AiContentService, AiError, Difficulty, GradingContext};
use crate::config::AiConfig;
use crate::domain::grading::Grade;
use crate::domain::lesson::DiagramKind;
use crate::domain::media::{DataUrl, sniff_image_mime, to_base64};

const DIAGRAM_MIME: &str = "image/png";

// Request

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

impl GenerationConfig {
    fn json(schema: Value) -> Self {
        Self {
            response_mime_type: Some("application/json"),
            response_schema: Some(schema),
            ..Self::default()
        }
    }

    fn square_image() -> Self {
        Self {
            response_modalities: Some(vec!["IMAGE"]),
            image_config: Some(ImageConfig { aspect_ratio: "1:1" }),
            ..Self::default()
        }
    }
}

// Response

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ResponseInline>,
}

#[derive(Debug, Deserialize)]
struct ResponseInline {
    data: String,
}

impl GenerateResponse {
    fn parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let text: String = self
            .parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }

    /// Base64 payload of the first inline image.
    fn first_image(&self) -> Option<&str> {
        self.parts()
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
    }
}

// Prompts

fn style_instruction(language: &str) -> String {
    format!(
        "You are an educational assistant in an e-learning system. \
         Write every variable, constant and formula as LaTeX inside $...$, \
         and put longer formulas or final results on their own line inside $$...$$. \
         Use Markdown bold for key terms and bullet lists for solution steps. \
         Never show raw code. Respond in {language}, in a clear teaching register."
    )
}

fn suggestion_prompt(language: &str, topic: &str, difficulty: Difficulty, count: usize) -> String {
    format!(
        "{}\nCreate exactly {count} exercise questions on the topic \"{topic}\" \
         at {difficulty} difficulty. Keep every formula inside $ or $$. \
         Return a JSON array of {count} strings.",
        style_instruction(language)
    )
}

fn grading_prompt(language: &str) -> String {
    format!(
        "{}\nGrade the answer on a scale from 0 to 10. The feedback must use $...$ \
         for formulas and explain any mistakes in detail. \
         Return JSON {{score: number, feedback: string}}.",
        style_instruction(language)
    )
}

fn diagram_prompt(prompt: &str, kind: DiagramKind) -> String {
    let figure = match kind {
        DiagramKind::Plane => "2D geometry figure",
        DiagramKind::Solid => "3D geometry figure",
        DiagramKind::Chart => "chart",
    };
    format!(
        "Draw a professional {figure}: {prompt}. \
         White background, black lines, mathematical style."
    )
}

// Parsing

/// Drop a Markdown code fence the model sometimes wraps JSON in.
fn strip_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_suggestions(text: &str, count: usize) -> Result<Vec<String>, AiError> {
    let items: Vec<Value> = serde_json::from_str(strip_fence(text))?;
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .take(count)
        .collect())
}

fn parse_grade(text: &str) -> Result<Grade, AiError> {
    let value: Value = serde_json::from_str(strip_fence(text))?;
    let score = match &value["score"] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
    .ok_or(AiError::Unexpected("grade without a numeric score"))?;
    let feedback = value["feedback"].as_str().unwrap_or_default();

    Ok(Grade::new(score as f32, feedback))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

// Client

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    image_model: String,
    solid_image_model: String,
    language: String,
}

impl GeminiClient {
    pub fn new(
        config: &AiConfig,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AiError::Client)?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            solid_image_model: config.solid_image_model.clone(),
            language: config.response_language.clone(),
        })
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        log::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn text_request(parts: Vec<Part>, schema: Value) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig::json(schema)),
        }
    }
}

impl AiContentService for GeminiClient {
    async fn suggest_exercises(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<String>, AiError> {
        let request = Self::text_request(
            vec![Part::Text {
                text: suggestion_prompt(&self.language, topic, difficulty, count),
            }],
            json!({"type": "ARRAY", "items": {"type": "STRING"}}),
        );

        let response = self.generate(&self.text_model, &request).await?;
        let suggestions = match response.text() {
            Some(text) => parse_suggestions(&text, count)?,
            None => Vec::new(),
        };
        log::info!("Received {} exercise suggestions for {topic:?}", suggestions.len());
        Ok(suggestions)
    }

    async fn grade_submission(
        &self,
        context: GradingContext<'_>,
        answer: &str,
        image: Option<&DataUrl>,
    ) -> Result<Grade, AiError> {
        let mut parts = vec![Part::Text {
            text: format!(
                "Lesson: {}\nQuestion: {}\nAnswer: {answer}",
                context.lesson_title, context.question
            ),
        }];
        if let Some(image) = image {
            let mime_type = sniff_image_mime(&image.bytes)
                .map(str::to_string)
                .unwrap_or_else(|| image.mime.clone());
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type,
                    data: to_base64(&image.bytes),
                },
            });
        }
        parts.push(Part::Text {
            text: grading_prompt(&self.language),
        });

        let request = Self::text_request(
            parts,
            json!({
                "type": "OBJECT",
                "properties": {
                    "score": {"type": "NUMBER"},
                    "feedback": {"type": "STRING"}
                },
                "required": ["score", "feedback"]
            }),
        );

        let response = self.generate(&self.text_model, &request).await?;
        let text = response
            .text()
            .ok_or(AiError::Unexpected("grading reply without text"))?;
        parse_grade(&text)
    }

    async fn generate_diagram(
        &self,
        prompt: &str,
        kind: DiagramKind,
    ) -> Result<Option<String>, AiError> {
        let model = match kind {
            DiagramKind::Solid => &self.solid_image_model,
            DiagramKind::Plane | DiagramKind::Chart => &self.image_model,
        };
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: diagram_prompt(prompt, kind),
                }],
            }],
            generation_config: Some(GenerationConfig::square_image()),
        };

        let response = self.generate(model, &request).await?;
        let image = response
            .first_image()
            .map(|data| format!("data:{DIAGRAM_MIME};base64,{data}"));
        if image.is_none() {
            log::warn!("Model {model} returned no image for a {kind} diagram");
        }
        Ok(image)
    }
}
