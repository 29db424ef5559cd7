// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/teacher.rs
//
// Lesson authoring for a signed-in teacher.

use std::collections::btree_map::Entry;

use super::WorkflowError;
use super::cropper::CroppedImage;
use crate::domain::account::{ExamResult, Teacher};
use crate::domain::lesson::{self, DiagramKind, Lesson, VisualAid, VisualAidKind};
use crate::records::{Collection, FromRecord, RecordField, ResultField, ToRecord};
use crate::services::ai::{AiContentService, Difficulty};
use crate::services::record_store::RecordStore;

/// Append the chosen suggestions after the lesson's non-blank questions.
/// Returns the number of questions added.
pub fn add_selected(
    lesson: &mut Lesson,
    suggestions: &[String],
    selection: &[usize],
) -> Result<usize, WorkflowError> {
    let selected: Vec<String> = suggestions
        .iter()
        .enumerate()
        .filter(|(i, _)| selection.contains(i))
        .map(|(_, s)| s.clone())
        .collect();
    if selected.is_empty() {
        return Err(WorkflowError::EmptySelection);
    }

    let added = selected.len();
    lesson.compact();
    lesson.questions.extend(selected);
    Ok(added)
}

fn put_aid(lesson: &mut Lesson, index: usize, aid: VisualAid) -> &VisualAid {
    match lesson.visual_aids.entry(index) {
        Entry::Occupied(mut slot) => {
            slot.insert(aid);
            slot.into_mut()
        }
        Entry::Vacant(slot) => slot.insert(aid),
    }
}

/// Attach a cropped image as the visual aid of question `index`.
pub fn crop_visual_aid<'l>(
    lesson: &'l mut Lesson,
    index: usize,
    cropped: &CroppedImage,
) -> Result<&'l VisualAid, WorkflowError> {
    if lesson.questions.get(index).is_none_or(|q| q.trim().is_empty()) {
        return Err(WorkflowError::NoSuchQuestion(index));
    }

    let aid = VisualAid {
        kind: VisualAidKind::OriginalCrop,
        source: cropped.to_data_url(),
        prompt: None,
    };
    log::debug!(
        "Attached {}x{} crop to question {index}",
        cropped.width(),
        cropped.height()
    );
    Ok(put_aid(lesson, index, aid))
}

pub struct TeacherWorkspace<'a, S, A> {
    store: &'a S,
    ai: &'a A,
    teacher: Teacher,
}

impl<'a, S: RecordStore, A: AiContentService> TeacherWorkspace<'a, S, A> {
    pub fn new(store: &'a S, ai: &'a A, teacher: Teacher) -> Self {
        Self { store, ai, teacher }
    }

    fn is_mine(&self, teacher_id: &str) -> bool {
        teacher_id.trim() == self.teacher.username.trim()
    }

    /// Lessons created by this teacher.
    pub async fn my_lessons(&self) -> Result<Vec<Lesson>, WorkflowError> {
        let rows = self.store.read_all(Collection::Lessons).await?;
        Ok(rows
            .iter()
            .map(Lesson::from_record)
            .filter(|lesson| self.is_mine(&lesson.teacher_id))
            .collect())
    }

    pub async fn search_lessons(&self, term: &str) -> Result<Vec<Lesson>, WorkflowError> {
        let mut lessons = self.my_lessons().await?;
        lessons.retain(|lesson| lesson.matches(term));
        Ok(lessons)
    }

    pub async fn suggest_questions(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<String>, WorkflowError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(WorkflowError::Required("topic"));
        }
        Ok(self.ai.suggest_exercises(topic, difficulty, count).await?)
    }

    /// Validate, complete and write `lesson`; returns what was stored.
    pub async fn save_lesson(&self, mut lesson: Lesson) -> Result<Lesson, WorkflowError> {
        lesson.title = lesson.title.trim().to_string();
        if lesson.title.is_empty() {
            return Err(WorkflowError::Required("title"));
        }

        lesson.compact();
        if lesson.questions.is_empty() {
            return Err(WorkflowError::NoQuestions);
        }

        if lesson.code.trim().is_empty() {
            lesson.code = lesson::generate_code(&mut rand::thread_rng());
        }
        lesson.teacher_id = self.teacher.username.trim().to_string();
        lesson.content_url = lesson
            .content_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let outcome = self.store.write(Collection::Lessons, lesson.to_record()).await?;
        WorkflowError::check(outcome)?;

        log::info!("Saved lesson {} ({})", lesson.code, lesson.title);
        Ok(lesson)
    }

    /// Generate a figure for question `index` from its text.
    pub async fn draw_visual_aid<'l>(
        &self,
        lesson: &'l mut Lesson,
        index: usize,
        kind: DiagramKind,
    ) -> Result<&'l VisualAid, WorkflowError> {
        let question = lesson
            .questions
            .get(index)
            .filter(|q| !q.trim().is_empty())
            .cloned()
            .ok_or(WorkflowError::NoSuchQuestion(index))?;

        let source = self
            .ai
            .generate_diagram(&question, kind)
            .await?
            .ok_or(WorkflowError::NoImage)?;

        let aid = VisualAid {
            kind: kind.into(),
            source,
            prompt: Some(question),
        };
        Ok(put_aid(lesson, index, aid))
    }

    /// Regenerate the figure of question `index` with an extra instruction.
    pub async fn redraw_visual_aid<'l>(
        &self,
        lesson: &'l mut Lesson,
        index: usize,
        note: &str,
    ) -> Result<&'l VisualAid, WorkflowError> {
        let current = lesson
            .visual_aids
            .get(&index)
            .ok_or(WorkflowError::NoVisualAid(index))?;
        let base = current.prompt.as_deref().unwrap_or_default();
        let prompt = format!("{base}. {}", note.trim());
        let kind = DiagramKind::from(current.kind);

        let source = self
            .ai
            .generate_diagram(&prompt, kind)
            .await?
            .ok_or(WorkflowError::NoImage)?;

        let aid = VisualAid {
            kind: current.kind,
            source,
            prompt: Some(prompt),
        };
        Ok(put_aid(lesson, index, aid))
    }

    /// Results of students who took this teacher's lessons.
    pub async fn results_for_me(&self) -> Result<Vec<ExamResult>, WorkflowError> {
        let rows = self.store.read_all(Collection::Results).await?;
        Ok(rows
            .iter()
            .filter(|row| self.is_mine(&ResultField::TeacherId.text(row)))
            .map(ExamResult::from_record)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::{LESSON_CODE_ALPHABET, LESSON_CODE_LEN};
    use crate::domain::crop::CropRegion;
    use crate::services::ai::scripted::ScriptedAi;
    use crate::services::record_store::memory::MemoryStore;
    use serde_json::json;

    fn teacher() -> Teacher {
        Teacher {
            username: "gv01".into(),
            ..Teacher::default()
        }
    }

    fn lessons_store() -> MemoryStore {
        MemoryStore::with_rows(
            Collection::Lessons,
            vec![
                json!({"code": "AAA", "title": "Hàm số bậc nhất", "teacherId": "gv01"}),
                json!({"MÃ BÀI HỌC": "BBB", "TÊN BÀI HỌC": "Hình chóp", "GIÁO VIÊN TẠO": " gv01 "}),
                json!({"code": "CCC", "title": "Hàm số mũ", "teacherId": "gv02"}),
            ],
        )
    }

    #[tokio::test]
    async fn lists_and_searches_own_lessons() {
        let store = lessons_store();
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());

        let mine = desk.my_lessons().await.unwrap();
        assert_eq!(mine.len(), 2);

        let found = desk.search_lessons("hàm số").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "AAA");

        let by_code = desk.search_lessons("bbb").await.unwrap();
        assert_eq!(by_code[0].title, "Hình chóp");
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let store = MemoryStore::default();
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());
        let err = desk
            .suggest_questions("  ", Difficulty::Easy, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Required("topic")));
        assert!(ai.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggestions_respect_count() {
        let store = MemoryStore::default();
        let ai = ScriptedAi {
            suggestions: vec!["a".into(), "b".into(), "c".into()],
            ..ScriptedAi::default()
        };
        let desk = TeacherWorkspace::new(&store, &ai, teacher());
        let got = desk.suggest_questions("Đạo hàm", Difficulty::Hard, 2).await.unwrap();
        assert_eq!(got, vec!["a", "b"]);
    }

    #[test]
    fn selected_suggestions_follow_existing_questions() {
        let mut lesson = Lesson {
            questions: vec!["q1".into(), "  ".into()],
            ..Lesson::default()
        };
        let suggestions = vec!["s0".to_string(), "s1".to_string(), "s2".to_string()];

        let added = add_selected(&mut lesson, &suggestions, &[2, 0]).unwrap();
        assert_eq!(added, 2);
        assert_eq!(lesson.questions, vec!["q1", "s0", "s2"]);

        assert!(matches!(
            add_selected(&mut lesson, &suggestions, &[7]),
            Err(WorkflowError::EmptySelection)
        ));
    }

    #[tokio::test]
    async fn save_assigns_code_and_owner() {
        let store = MemoryStore::default();
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());

        let lesson = Lesson {
            title: " Tích phân ".into(),
            teacher_id: "someone-else".into(),
            content_url: Some("   ".into()),
            questions: vec!["".into(), "∫x dx".into()],
            ..Lesson::default()
        };
        let saved = desk.save_lesson(lesson).await.unwrap();

        assert_eq!(saved.code.len(), LESSON_CODE_LEN);
        assert!(saved.code.bytes().all(|b| LESSON_CODE_ALPHABET.contains(&b)));
        assert_eq!(saved.teacher_id, "gv01");
        assert_eq!(saved.title, "Tích phân");
        assert_eq!(saved.questions, vec!["∫x dx"]);
        assert_eq!(saved.content_url, None);

        let rows = store.rows(Collection::Lessons);
        assert_eq!(rows[0]["teacherId"], "gv01");
        assert_eq!(rows[0]["contentType"], "link");
        assert_eq!(rows[0]["visualAids"], "{}");
    }

    #[tokio::test]
    async fn save_requires_title_and_questions() {
        let store = MemoryStore::default();
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());

        let untitled = Lesson {
            questions: vec!["q".into()],
            ..Lesson::default()
        };
        assert!(matches!(
            desk.save_lesson(untitled).await,
            Err(WorkflowError::Required("title"))
        ));

        let empty = Lesson {
            title: "T".into(),
            questions: vec![" ".into()],
            ..Lesson::default()
        };
        assert!(matches!(desk.save_lesson(empty).await, Err(WorkflowError::NoQuestions)));
        assert!(store.rows(Collection::Lessons).is_empty());
    }

    #[tokio::test]
    async fn draw_and_redraw_visual_aid() {
        let store = MemoryStore::default();
        let ai = ScriptedAi {
            diagram: Some("data:image/png;base64,AA==".into()),
            ..ScriptedAi::default()
        };
        let desk = TeacherWorkspace::new(&store, &ai, teacher());
        let mut lesson = Lesson {
            questions: vec!["Hình lập phương cạnh a".into()],
            ..Lesson::default()
        };

        let aid = desk
            .draw_visual_aid(&mut lesson, 0, DiagramKind::Solid)
            .await
            .unwrap();
        assert_eq!(aid.kind, VisualAidKind::Geometry3d);
        assert_eq!(aid.prompt.as_deref(), Some("Hình lập phương cạnh a"));

        let aid = desk
            .redraw_visual_aid(&mut lesson, 0, "tô màu mặt đáy")
            .await
            .unwrap();
        assert_eq!(aid.kind, VisualAidKind::Geometry3d);
        assert_eq!(
            aid.prompt.as_deref(),
            Some("Hình lập phương cạnh a. tô màu mặt đáy")
        );
        assert_eq!(
            ai.prompts.lock().unwrap().last().map(String::as_str),
            Some("Hình lập phương cạnh a. tô màu mặt đáy")
        );

        assert!(matches!(
            desk.draw_visual_aid(&mut lesson, 3, DiagramKind::Plane).await,
            Err(WorkflowError::NoSuchQuestion(3))
        ));
        assert!(matches!(
            desk.redraw_visual_aid(&mut lesson, 1, "x").await,
            Err(WorkflowError::NoVisualAid(1))
        ));
    }

    #[tokio::test]
    async fn missing_image_is_reported() {
        let store = MemoryStore::default();
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());
        let mut lesson = Lesson {
            questions: vec!["q".into()],
            ..Lesson::default()
        };
        assert!(matches!(
            desk.draw_visual_aid(&mut lesson, 0, DiagramKind::Chart).await,
            Err(WorkflowError::NoImage)
        ));
        assert!(lesson.visual_aids.is_empty());
    }

    #[test]
    fn cropped_image_becomes_original_crop_aid() {
        let mut lesson = Lesson {
            questions: vec!["q".into()],
            ..Lesson::default()
        };
        let cropped = CroppedImage {
            region: CropRegion::new(0, 0, 2, 2),
            png: vec![0x89, b'P', b'N', b'G'],
        };
        let aid = crop_visual_aid(&mut lesson, 0, &cropped).unwrap();
        assert_eq!(aid.kind, VisualAidKind::OriginalCrop);
        assert!(aid.source.starts_with("data:image/png;base64,"));
        assert!(crop_visual_aid(&mut lesson, 1, &cropped).is_err());

        lesson.questions.push("  ".into());
        assert!(matches!(
            crop_visual_aid(&mut lesson, 1, &cropped),
            Err(WorkflowError::NoSuchQuestion(1))
        ));
    }

    #[tokio::test]
    async fn saved_aids_stay_on_their_questions() {
        let store = MemoryStore::default();
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());

        let mut lesson = Lesson {
            title: "T".into(),
            questions: vec!["a".into(), " ".into(), "b".into()],
            ..Lesson::default()
        };
        lesson.visual_aids.insert(
            2,
            VisualAid {
                kind: VisualAidKind::Chart,
                source: "data:image/png;base64,AA==".into(),
                prompt: Some("b".into()),
            },
        );

        let saved = desk.save_lesson(lesson).await.unwrap();
        assert_eq!(saved.questions, vec!["a", "b"]);
        assert_eq!(saved.visual_aids.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(saved.visual_aids[&1].prompt.as_deref(), Some("b"));

        let stored = Lesson::from_record(&store.rows(Collection::Lessons)[0]);
        assert_eq!(stored.visual_aids, saved.visual_aids);
    }

    #[test]
    fn adding_suggestions_keeps_aids_aligned() {
        let mut lesson = Lesson {
            questions: vec![String::new(), "q".into()],
            ..Lesson::default()
        };
        let cropped = CroppedImage {
            region: CropRegion::new(0, 0, 1, 1),
            png: vec![0x89, b'P', b'N', b'G'],
        };
        crop_visual_aid(&mut lesson, 1, &cropped).unwrap();

        add_selected(&mut lesson, &["s".to_string()], &[0]).unwrap();
        assert_eq!(lesson.questions, vec!["q", "s"]);
        assert_eq!(lesson.visual_aids.keys().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[tokio::test]
    async fn results_filtered_by_creator() {
        let store = MemoryStore::with_rows(
            Collection::Results,
            vec![
                json!({"TÀI KHOẢN": "hs01", "GIÁO VIÊN TẠO": "gv01", "TỔNG ĐIỂM": "9.0"}),
                json!({"TÀI KHOẢN": "hs02", "GIÁO VIÊN TẠO": "gv02", "TỔNG ĐIỂM": "5.0"}),
            ],
        );
        let ai = ScriptedAi::default();
        let desk = TeacherWorkspace::new(&store, &ai, teacher());
        let results = desk.results_for_me().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].username, "hs01");
        assert_eq!(results[0].total_score, 9.0);
    }
}
