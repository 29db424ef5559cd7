// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/student.rs
//
// Taking lessons: fetch by code, submit answers for grading, history.

use futures_util::{StreamExt, stream};

use super::WorkflowError;
use crate::constant::BLANK_ANSWER;
use crate::domain::account::{ExamResult, Student};
use crate::domain::grading::{Grade, GradeSheet};
use crate::domain::lesson::Lesson;
use crate::domain::media::DataUrl;
use crate::fl;
use crate::records::{Collection, FromRecord, RecordField, ResultField, ToRecord};
use crate::services::ai::{AiContentService, GradingContext};
use crate::services::record_store::{RecordStore, WriteOutcome};

/// Outcome of one submission.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub sheet: GradeSheet,
    pub result: ExamResult,
    /// Whether the result row was stored; grading is kept either way.
    pub stored: WriteOutcome,
}

pub struct StudentWorkspace<'a, S, A> {
    store: &'a S,
    ai: &'a A,
    student: Student,
    max_concurrent: usize,
}

impl<'a, S: RecordStore, A: AiContentService> StudentWorkspace<'a, S, A> {
    pub fn new(store: &'a S, ai: &'a A, student: Student, max_concurrent: usize) -> Self {
        Self {
            store,
            ai,
            student,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn fetch_lesson(&self, code: &str) -> Result<Lesson, WorkflowError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(WorkflowError::Required("lesson code"));
        }

        let rows = self.store.read_all(Collection::Lessons).await?;
        let lesson = rows
            .iter()
            .map(Lesson::from_record)
            .find(|lesson| lesson.has_code(code))
            .ok_or_else(|| WorkflowError::LessonNotFound(code.to_string()))?;

        log::info!("Opened lesson {} ({})", lesson.code, lesson.title);
        Ok(lesson)
    }

    /// Grade every question of `lesson` and record the result.
    ///
    /// `answers` and `images` are indexed like the lesson's non-blank
    /// questions; missing entries count as blank.
    pub async fn submit(
        &self,
        lesson: &Lesson,
        answers: &[String],
        images: &[Option<DataUrl>],
    ) -> Result<SubmissionReport, WorkflowError> {
        let questions = lesson.valid_questions();
        if questions.is_empty() {
            return Err(WorkflowError::NoQuestions);
        }

        let grades: Vec<Grade> = stream::iter(questions.iter().enumerate())
            .map(|(i, question)| {
                let answer = answers
                    .get(i)
                    .map(|a| a.trim())
                    .filter(|a| !a.is_empty())
                    .unwrap_or(BLANK_ANSWER);
                let image = images.get(i).and_then(Option::as_ref);
                let context = GradingContext {
                    lesson_title: &lesson.title,
                    question,
                };

                async move {
                    match self.ai.grade_submission(context, answer, image).await {
                        Ok(grade) => grade,
                        Err(err) => {
                            log::warn!("Grading question {} failed: {err}", i + 1);
                            Grade::unavailable(fl!("grade-unavailable"))
                        }
                    }
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let sheet = GradeSheet::new(grades);
        let result = ExamResult {
            stt: None,
            username: self.student.username.trim().to_string(),
            student_name: self.student.name_with_class(),
            lesson_code: lesson.code.clone(),
            teacher_id: lesson.teacher_id.clone(),
            lesson_title: lesson.title.clone(),
            question_count: sheet.grades.len() as u32,
            question_scores: sheet.scores_line(),
            total_score: sheet.average(),
        };

        let stored = self.store.write(Collection::Results, result.to_record()).await?;
        match &stored {
            WriteOutcome::Saved => log::info!(
                "{} scored {} on {}",
                result.username,
                result.total_display(),
                result.lesson_code
            ),
            WriteOutcome::Rejected(message) => {
                log::warn!("Result for {} was not stored: {message}", result.username)
            }
        }

        Ok(SubmissionReport {
            sheet,
            result,
            stored,
        })
    }

    /// Past results of this student.
    pub async fn history(&self) -> Result<Vec<ExamResult>, WorkflowError> {
        let username = self.student.username.trim();
        let rows = self.store.read_all(Collection::Results).await?;
        Ok(rows
            .iter()
            .filter(|row| ResultField::Username.text(row) == username)
            .map(ExamResult::from_record)
            .collect())
    }
}
