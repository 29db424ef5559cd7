// SPDX-License-Identifier: GPL-3.0-or-later
// src/records/decode.rs
//
// Conversions between store rows and domain values.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::fields::{LessonField, RecordField, ResultField, StudentField, TeacherField};
use super::{Record, value_to_text};
use crate::domain::account::{ExamResult, Student, Teacher};
use crate::domain::lesson::{ContentKind, Lesson, VisualAid};

/// Lenient decode: missing columns become empty values.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Self;
}

/// Encode into a row ready to be written back.
pub trait ToRecord {
    fn to_record(&self) -> Record;
}

fn optional(text: String) -> Option<String> {
    Some(text).filter(|s| !s.is_empty())
}

fn parse_number(text: &str) -> Option<f32> {
    text.trim().replace(',', ".").parse::<f32>().ok()
}

fn build<F: RecordField>(values: impl IntoIterator<Item = (F, Value)>) -> Record {
    values
        .into_iter()
        .map(|(field, value)| (field.column().to_string(), value))
        .collect()
}

impl FromRecord for Teacher {
    fn from_record(record: &Record) -> Self {
        Self {
            username: TeacherField::Username.text(record),
            password: TeacherField::Password.text(record),
            full_name: TeacherField::FullName.text(record),
            email: TeacherField::Email.text(record),
            phone: TeacherField::Phone.text(record),
        }
    }
}

impl ToRecord for Teacher {
    fn to_record(&self) -> Record {
        build([
            (TeacherField::Username, Value::from(self.username.as_str())),
            (TeacherField::Password, Value::from(self.password.as_str())),
            (TeacherField::FullName, Value::from(self.full_name.as_str())),
            (TeacherField::Email, Value::from(self.email.as_str())),
            (TeacherField::Phone, Value::from(self.phone.as_str())),
        ])
    }
}

impl FromRecord for Student {
    fn from_record(record: &Record) -> Self {
        Self {
            username: StudentField::Username.text(record),
            password: StudentField::Password.text(record),
            full_name: StudentField::FullName.text(record),
            school: StudentField::School.text(record),
            grade: StudentField::Grade.text(record),
            email: StudentField::Email.text(record),
            phone: StudentField::Phone.text(record),
            registration_date: optional(StudentField::RegistrationDate.text(record)),
        }
    }
}

impl ToRecord for Student {
    fn to_record(&self) -> Record {
        let mut values = vec![
            (StudentField::Username, Value::from(self.username.as_str())),
            (StudentField::Password, Value::from(self.password.as_str())),
            (StudentField::FullName, Value::from(self.full_name.as_str())),
            (StudentField::School, Value::from(self.school.as_str())),
            (StudentField::Grade, Value::from(self.grade.as_str())),
            (StudentField::Email, Value::from(self.email.as_str())),
            (StudentField::Phone, Value::from(self.phone.as_str())),
        ];
        if let Some(date) = &self.registration_date {
            values.push((StudentField::RegistrationDate, Value::from(date.as_str())));
        }
        build(values)
    }
}

/// Questions arrive either as an array or as its JSON text. A plain string
/// that is not a JSON array is a single question.
fn parse_questions(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::String(raw) if raw.trim_start().starts_with('[') => {
            match serde_json::from_str::<Vec<Value>>(raw) {
                Ok(items) => items,
                Err(err) => {
                    log::warn!("Questions column is not a valid JSON array: {err}");
                    vec![value.clone()]
                }
            }
        }
        Value::String(_) => vec![value.clone()],
        _ => Vec::new(),
    };

    items.iter().map(value_to_text).collect()
}

/// Visual aids arrive either as an object keyed by question index or as its
/// JSON text. Entries that do not decode are skipped.
fn parse_visual_aids(value: &Value) -> BTreeMap<usize, VisualAid> {
    let parsed;
    let entries = match value {
        Value::Object(entries) => entries,
        Value::String(raw) if raw.trim().is_empty() => return BTreeMap::new(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(entries)) => {
                parsed = entries;
                &parsed
            }
            Ok(_) => return BTreeMap::new(),
            Err(err) => {
                log::warn!("Visual aids column is not valid JSON: {err}");
                return BTreeMap::new();
            }
        },
        _ => return BTreeMap::new(),
    };

    entries
        .iter()
        .filter_map(|(key, aid)| {
            let index = key.trim().parse::<usize>().ok()?;
            match serde_json::from_value::<VisualAid>(aid.clone()) {
                Ok(aid) => Some((index, aid)),
                Err(err) => {
                    log::warn!("Skipping visual aid {index}: {err}");
                    None
                }
            }
        })
        .collect()
}

fn visual_aid_value(aid: &VisualAid) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), Value::from(aid.kind.as_str()));
    object.insert("source".into(), Value::from(aid.source.as_str()));
    if let Some(prompt) = &aid.prompt {
        object.insert("prompt".into(), Value::from(prompt.as_str()));
    }
    Value::Object(object)
}

/// Visual aids as the JSON text stored in the lessons sheet.
fn visual_aids_json(aids: &BTreeMap<usize, VisualAid>) -> String {
    let object: Map<String, Value> = aids
        .iter()
        .map(|(index, aid)| (index.to_string(), visual_aid_value(aid)))
        .collect();
    Value::Object(object).to_string()
}

impl FromRecord for Lesson {
    fn from_record(record: &Record) -> Self {
        let mut lesson = Self {
            stt: optional(LessonField::Stt.text(record)),
            code: LessonField::Code.text(record),
            title: LessonField::Title.text(record),
            teacher_id: LessonField::TeacherId.text(record),
            content_url: optional(LessonField::ContentUrl.text(record)),
            content_kind: ContentKind::parse(&LessonField::ContentKind.text(record))
                .unwrap_or_default(),
            questions: LessonField::Questions
                .get(record)
                .map(parse_questions)
                .unwrap_or_default(),
            visual_aids: LessonField::VisualAids
                .get(record)
                .map(parse_visual_aids)
                .unwrap_or_default(),
        };
        lesson.compact();
        lesson
    }
}

impl ToRecord for Lesson {
    fn to_record(&self) -> Record {
        let mut lesson = self.clone();
        lesson.compact();

        let mut values = Vec::with_capacity(LessonField::ALL.len());
        if let Some(stt) = &lesson.stt {
            values.push((LessonField::Stt, Value::from(stt.as_str())));
        }
        values.extend([
            (LessonField::Code, Value::from(lesson.code.as_str())),
            (LessonField::Title, Value::from(lesson.title.as_str())),
            (LessonField::TeacherId, Value::from(lesson.teacher_id.as_str())),
            (
                LessonField::ContentUrl,
                Value::from(lesson.content_url.as_deref().unwrap_or_default()),
            ),
            (LessonField::ContentKind, Value::from(lesson.content_kind.as_str())),
            (
                LessonField::Questions,
                Value::from(lesson.questions),
            ),
            (
                LessonField::VisualAids,
                Value::from(visual_aids_json(&lesson.visual_aids)),
            ),
        ]);
        build(values)
    }
}

impl FromRecord for ExamResult {
    fn from_record(record: &Record) -> Self {
        let question_count = parse_number(&ResultField::QuestionCount.text(record))
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);

        Self {
            stt: optional(ResultField::Stt.text(record)),
            username: ResultField::Username.text(record),
            student_name: ResultField::StudentName.text(record),
            lesson_code: ResultField::LessonCode.text(record),
            teacher_id: ResultField::TeacherId.text(record),
            lesson_title: ResultField::LessonTitle.text(record),
            question_count,
            question_scores: ResultField::QuestionScores.text(record),
            total_score: parse_number(&ResultField::TotalScore.text(record)).unwrap_or(0.0),
        }
    }
}

impl ToRecord for ExamResult {
    fn to_record(&self) -> Record {
        let mut values = Vec::with_capacity(ResultField::ALL.len());
        if let Some(stt) = &self.stt {
            values.push((ResultField::Stt, Value::from(stt.as_str())));
        }
        values.extend([
            (ResultField::Username, Value::from(self.username.as_str())),
            (ResultField::StudentName, Value::from(self.student_name.as_str())),
            (ResultField::LessonCode, Value::from(self.lesson_code.as_str())),
            (ResultField::TeacherId, Value::from(self.teacher_id.as_str())),
            (ResultField::LessonTitle, Value::from(self.lesson_title.as_str())),
            (ResultField::QuestionCount, Value::from(self.question_count)),
            (ResultField::QuestionScores, Value::from(self.question_scores.as_str())),
            (ResultField::TotalScore, Value::from(self.total_display())),
        ]);
        build(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lesson::VisualAidKind;
    use serde_json::json;

    fn row(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn lesson_from_localized_sheet_row() {
        let record = row(json!({
            "STT": 3,
            "MÃ BÀI HỌC": "ABCDEFGH23",
            "TÊN BÀI HỌC": "Hình chóp",
            "GIÁO VIÊN TẠO": "gv01",
            "LINK BÀI HỌC": "https://youtu.be/xyz",
            "ĐỊNH DẠNG": "video",
            "questions": "[\"Tính thể tích\", \"  \", \"Tính diện tích\"]",
            "visualAids": "{\"0\":{\"type\":\"geometry_3d\",\"source\":\"data:image/png;base64,AA==\"}}"
        }));

        let lesson = Lesson::from_record(&record);
        assert_eq!(lesson.stt.as_deref(), Some("3"));
        assert_eq!(lesson.code, "ABCDEFGH23");
        assert_eq!(lesson.title, "Hình chóp");
        assert_eq!(lesson.teacher_id, "gv01");
        assert_eq!(lesson.content_kind, ContentKind::Video);
        assert_eq!(lesson.questions, vec!["Tính thể tích", "Tính diện tích"]);
        assert_eq!(lesson.visual_aids[&0].kind, VisualAidKind::Geometry3d);
    }

    #[test]
    fn lesson_questions_as_array() {
        let record = row(json!({
            "code": "X",
            "questions": ["1 + 1", "", 42],
            "visualAids": {
                "1": {"type": "chart", "source": "u", "prompt": "blank"},
                "2": {"type": "chart", "source": "u", "prompt": "p"}
            }
        }));
        let lesson = Lesson::from_record(&record);
        assert_eq!(lesson.questions, vec!["1 + 1", "42"]);
        assert_eq!(lesson.visual_aids.len(), 1);
        assert_eq!(lesson.visual_aids[&1].prompt.as_deref(), Some("p"));
        assert_eq!(lesson.content_kind, ContentKind::Link);
    }

    #[test]
    fn broken_visual_aids_are_dropped() {
        let record = row(json!({"visualAids": "{not json", "questions": "Một câu"}));
        let lesson = Lesson::from_record(&record);
        assert!(lesson.visual_aids.is_empty());
        assert_eq!(lesson.questions, vec!["Một câu"]);
    }

    #[test]
    fn lesson_record_stores_aids_as_text() {
        let mut lesson = Lesson {
            code: "C".into(),
            title: "T".into(),
            questions: vec!["q".into(), " ".into()],
            ..Lesson::default()
        };
        lesson.visual_aids.insert(
            0,
            VisualAid {
                kind: VisualAidKind::OriginalCrop,
                source: "data:image/png;base64,AA==".into(),
                prompt: None,
            },
        );

        let record = lesson.to_record();
        assert_eq!(record["questions"], json!(["q"]));
        assert_eq!(record["contentType"], json!("link"));
        assert_eq!(record["contentUrl"], json!(""));
        let aids: Value = serde_json::from_str(record["visualAids"].as_str().unwrap()).unwrap();
        assert_eq!(aids["0"]["type"], "original_crop");
        assert!(!record.contains_key("stt"));

        assert_eq!(Lesson::from_record(&record).visual_aids, lesson.visual_aids);
    }

    #[test]
    fn result_row_columns() {
        let result = ExamResult {
            username: "hs01".into(),
            student_name: "An - Lớp 10A".into(),
            lesson_code: "C".into(),
            teacher_id: "gv01".into(),
            lesson_title: "T".into(),
            question_count: 3,
            question_scores: "8, 6.5, 10".into(),
            total_score: 8.166_667,
            ..ExamResult::default()
        };
        let record = result.to_record();
        assert_eq!(record["TÀI KHOẢN"], json!("hs01"));
        assert_eq!(record["HỌ TÊN HỌC SINH"], json!("An - Lớp 10A"));
        assert_eq!(record["MÃ SỐ BÀI HỌC"], json!("C"));
        assert_eq!(record["TỔNG SỐ CÂU"], json!(3));
        assert_eq!(record["TỔNG ĐIỂM"], json!("8.2"));

        let decoded = ExamResult::from_record(&record);
        assert_eq!(decoded.question_count, 3);
        assert!((decoded.total_score - 8.2).abs() < 1e-6);
    }

    #[test]
    fn student_rows_use_english_keys() {
        let student = Student {
            username: "hs01".into(),
            full_name: "An".into(),
            registration_date: Some("08:00:00 01/09/2026".into()),
            ..Student::default()
        };
        let record = student.to_record();
        assert_eq!(record["username"], json!("hs01"));
        assert_eq!(record["fullName"], json!("An"));
        assert_eq!(record["registrationDate"], json!("08:00:00 01/09/2026"));
        assert_eq!(Student::from_record(&record), student);
    }

    #[test]
    fn teacher_from_mixed_headers() {
        let record = row(json!({
            "TÀI KHOẢN": "gv01",
            "Mật khẩu": 1234,
            "HỌ TÊN GIÁO VIÊN": "Cô Lan",
            "SỐ ĐIỆN THOẠI": "0900"
        }));
        let teacher = Teacher::from_record(&record);
        assert_eq!(teacher.username, "gv01");
        assert_eq!(teacher.password, "1234");
        assert_eq!(teacher.full_name, "Cô Lan");
        assert_eq!(teacher.phone, "0900");
        assert_eq!(teacher.email, "");
    }
}
