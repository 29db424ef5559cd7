// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/lesson.rs
//
// Lessons, their questions and the visual aids attached to them.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constant::{LESSON_CODE_ALPHABET, LESSON_CODE_LEN};
use crate::domain::content;

/// How the lesson's content link should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Document,
    #[default]
    Link,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Document => "document",
            Self::Link => "link",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "video" => Some(Self::Video),
            "document" | "doc" => Some(Self::Document),
            "link" => Some(Self::Link),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of illustration attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualAidKind {
    #[serde(rename = "chart")]
    Chart,
    #[serde(rename = "geometry_2d")]
    Geometry2d,
    #[serde(rename = "geometry_3d")]
    Geometry3d,
    #[serde(rename = "illustration")]
    Illustration,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "original_crop")]
    OriginalCrop,
}

impl VisualAidKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Geometry2d => "geometry_2d",
            Self::Geometry3d => "geometry_3d",
            Self::Illustration => "illustration",
            Self::Table => "table",
            Self::OriginalCrop => "original_crop",
        }
    }
}

impl fmt::Display for VisualAidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing style requested from the diagram generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Plane,
    Solid,
    Chart,
}

impl DiagramKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plane => "2d",
            Self::Solid => "3d",
            Self::Chart => "chart",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "2d" | "plane" => Some(Self::Plane),
            "3d" | "solid" => Some(Self::Solid),
            "chart" => Some(Self::Chart),
            _ => None,
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DiagramKind> for VisualAidKind {
    fn from(kind: DiagramKind) -> Self {
        match kind {
            DiagramKind::Plane => Self::Geometry2d,
            DiagramKind::Solid => Self::Geometry3d,
            DiagramKind::Chart => Self::Chart,
        }
    }
}

impl From<VisualAidKind> for DiagramKind {
    fn from(kind: VisualAidKind) -> Self {
        match kind {
            VisualAidKind::Chart => Self::Chart,
            VisualAidKind::Geometry3d => Self::Solid,
            _ => Self::Plane,
        }
    }
}

/// Illustration attached to one question of a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualAid {
    #[serde(rename = "type")]
    pub kind: VisualAidKind,
    /// Data URL or remote URL of the image.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lesson {
    pub stt: Option<String>,
    pub code: String,
    pub title: String,
    pub teacher_id: String,
    pub content_url: Option<String>,
    pub content_kind: ContentKind,
    pub questions: Vec<String>,
    /// Keyed by question index.
    pub visual_aids: BTreeMap<usize, VisualAid>,
}

impl Lesson {
    /// Questions with blank entries removed.
    pub fn valid_questions(&self) -> Vec<String> {
        self.questions
            .iter()
            .filter(|q| !q.trim().is_empty())
            .cloned()
            .collect()
    }

    /// Drop blank questions, moving each visual aid to its question's new
    /// index. Aids without a surviving question are dropped.
    pub fn compact(&mut self) {
        let mut questions = Vec::with_capacity(self.questions.len());
        let mut aids = BTreeMap::new();
        for (index, question) in std::mem::take(&mut self.questions).into_iter().enumerate() {
            if question.trim().is_empty() {
                continue;
            }
            if let Some(aid) = self.visual_aids.remove(&index) {
                aids.insert(questions.len(), aid);
            }
            questions.push(question);
        }
        self.questions = questions;
        self.visual_aids = aids;
    }

    /// Case-insensitive search over title and code.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.title.to_lowercase().contains(&term)
            || self.code.to_lowercase().contains(&term)
    }

    pub fn has_code(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty() && self.code.trim().eq_ignore_ascii_case(code)
    }

    /// Embeddable form of the content link, if there is one.
    pub fn embed_url(&self) -> Option<String> {
        self.content_url
            .as_deref()
            .map(content::embed_url)
            .filter(|url| !url.is_empty())
    }
}

/// Random lesson code drawn from an unambiguous alphabet.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..LESSON_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..LESSON_CODE_ALPHABET.len());
            char::from(LESSON_CODE_ALPHABET[idx])
        })
        .collect()
}
