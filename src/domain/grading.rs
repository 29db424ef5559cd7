// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/grading.rs
//
// Per-question grades and their aggregation into a result.

use serde::{Deserialize, Serialize};

use crate::constant::MAX_SCORE;

/// Score (0..=10) and feedback for one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub score: f32,
    pub feedback: String,
}

impl Grade {
    pub fn new(score: f32, feedback: impl Into<String>) -> Self {
        Self {
            score,
            feedback: feedback.into(),
        }
        .clamped()
    }

    /// Zero score used when an answer could not be graded.
    pub fn unavailable(feedback: impl Into<String>) -> Self {
        Self::new(0.0, feedback)
    }

    /// Pull the score onto the grading scale; NaN counts as zero.
    pub fn clamped(mut self) -> Self {
        self.score = if self.score.is_nan() {
            0.0
        } else {
            self.score.clamp(0.0, MAX_SCORE)
        };
        self
    }
}

/// Grades for every question of one submission, in question order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradeSheet {
    pub grades: Vec<Grade>,
}

impl GradeSheet {
    pub fn new(grades: Vec<Grade>) -> Self {
        Self { grades }
    }

    /// Mean score; an empty sheet averages to zero.
    pub fn average(&self) -> f32 {
        let total: f32 = self.grades.iter().map(|g| g.score).sum();
        total / self.grades.len().max(1) as f32
    }

    /// Per-question scores joined as stored on result rows.
    pub fn scores_line(&self) -> String {
        self.grades
            .iter()
            .map(|g| g.score.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn average_display(&self) -> String {
        format!("{:.1}", self.average())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_clamped() {
        assert_eq!(Grade::new(14.0, "").score, 10.0);
        assert_eq!(Grade::new(-2.0, "").score, 0.0);
        assert_eq!(Grade::new(f32::NAN, "").score, 0.0);
    }

    #[test]
    fn sheet_average_and_line() {
        let sheet = GradeSheet::new(vec![
            Grade::new(8.0, "ok"),
            Grade::new(6.5, "ok"),
            Grade::new(10.0, "ok"),
        ]);
        assert_eq!(sheet.scores_line(), "8, 6.5, 10");
        assert_eq!(sheet.average_display(), "8.2");
    }

    #[test]
    fn empty_sheet_averages_zero() {
        let sheet = GradeSheet::default();
        assert_eq!(sheet.average(), 0.0);
        assert_eq!(sheet.scores_line(), "");
    }
}
