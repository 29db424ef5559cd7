// SPDX-License-Identifier: GPL-3.0-or-later
// src/records/fields.rs
//
// Alias tables: one typed field enum per record kind.

use serde_json::Value;

use super::{Record, lookup, resolve_key, value_to_text};
use crate::fl;

/// Column of a record kind, with the spellings it is known under.
pub trait RecordField: Copy + Sized + 'static {
    const ALL: &'static [Self];

    /// Column written for rows that do not carry the field yet.
    fn column(self) -> &'static str;

    /// Candidate keys, most specific first.
    fn aliases(self) -> &'static [&'static str];

    /// Localized label for editors and tables.
    fn label(self) -> String;

    /// Stable identifier accepted on the command line.
    fn key(self) -> &'static str;

    fn parse(name: &str) -> Option<Self> {
        let folded = super::normalize_key(name);
        Self::ALL.iter().copied().find(|field| {
            super::normalize_key(field.key()) == folded
                || super::normalize_key(field.column()) == folded
        })
    }

    fn get(self, record: &Record) -> Option<&Value> {
        lookup(record, self.aliases())
    }

    fn text(self, record: &Record) -> String {
        self.get(record)
            .map(value_to_text)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    /// Write `value` under the column already holding this field, or under
    /// [`RecordField::column`] when the row has none.
    fn set(self, record: &mut Record, value: Value) {
        let key = resolve_key(record, self.aliases())
            .unwrap_or(self.column())
            .to_string();
        record.insert(key, value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherField {
    Username,
    Password,
    FullName,
    Email,
    Phone,
}

impl RecordField for TeacherField {
    const ALL: &'static [Self] = &[
        Self::Username,
        Self::Password,
        Self::FullName,
        Self::Email,
        Self::Phone,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Username => "TÀI KHOẢN",
            Self::Password => "MẬT KHẨU",
            Self::FullName => "HỌ TÊN GIÁO VIÊN",
            Self::Email => "EMAIL",
            Self::Phone => "SỐ ĐIỆN THOẠI",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Username => &["username", "taikhoan", "user", "TÀI KHOẢN"],
            Self::Password => &["password", "matkhau", "pass", "MẬT KHẨU"],
            Self::FullName => &["fullName", "hotengiaovien", "hoten", "HỌ TÊN GIÁO VIÊN"],
            Self::Email => &["email", "EMAIL"],
            Self::Phone => &["phone", "sodienthoai", "SỐ ĐIỆN THOẠI"],
        }
    }

    fn label(self) -> String {
        match self {
            Self::Username => fl!("field-username"),
            Self::Password => fl!("field-password"),
            Self::FullName => fl!("field-teacher-name"),
            Self::Email => fl!("field-email"),
            Self::Phone => fl!("field-phone"),
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::FullName => "full-name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    Username,
    Password,
    FullName,
    School,
    Grade,
    Email,
    Phone,
    RegistrationDate,
}

impl RecordField for StudentField {
    const ALL: &'static [Self] = &[
        Self::Username,
        Self::Password,
        Self::FullName,
        Self::School,
        Self::Grade,
        Self::Email,
        Self::Phone,
        Self::RegistrationDate,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::FullName => "fullName",
            Self::School => "school",
            Self::Grade => "grade",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::RegistrationDate => "registrationDate",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Username => &["username", "tendangnhap", "taikhoan", "user", "TÊN ĐĂNG NHẬP"],
            Self::Password => &["password", "matkhau", "pass", "MẬT KHẨU"],
            Self::FullName => &["fullName", "hotenhocsinh", "hoten", "HỌ TÊN HỌC SINH"],
            Self::School => &["school", "truong", "TRƯỜNG"],
            Self::Grade => &["grade", "lophoc", "lop", "LỚP"],
            Self::Email => &["email", "EMAIL"],
            Self::Phone => &["phone", "sodienthoai", "SỐ ĐIỆN THOẠI"],
            Self::RegistrationDate => &["registrationDate", "ngaydangky", "NGÀY ĐĂNG KÝ"],
        }
    }

    fn label(self) -> String {
        match self {
            Self::Username => fl!("field-login-name"),
            Self::Password => fl!("field-password"),
            Self::FullName => fl!("field-student-name"),
            Self::School => fl!("field-school"),
            Self::Grade => fl!("field-grade"),
            Self::Email => fl!("field-email"),
            Self::Phone => fl!("field-phone"),
            Self::RegistrationDate => fl!("field-registration-date"),
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::FullName => "full-name",
            Self::School => "school",
            Self::Grade => "grade",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::RegistrationDate => "registration-date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonField {
    Stt,
    Code,
    Title,
    TeacherId,
    ContentUrl,
    ContentKind,
    Questions,
    VisualAids,
}

impl RecordField for LessonField {
    const ALL: &'static [Self] = &[
        Self::Stt,
        Self::Code,
        Self::Title,
        Self::TeacherId,
        Self::ContentUrl,
        Self::ContentKind,
        Self::Questions,
        Self::VisualAids,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Stt => "stt",
            Self::Code => "code",
            Self::Title => "title",
            Self::TeacherId => "teacherId",
            Self::ContentUrl => "contentUrl",
            Self::ContentKind => "contentType",
            Self::Questions => "questions",
            Self::VisualAids => "visualAids",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Stt => &["stt", "STT"],
            Self::Code => &["code", "mabaihoc", "lessonCode", "MÃ BÀI HỌC"],
            Self::Title => &["title", "tenbaihoc", "TÊN BÀI HỌC"],
            Self::TeacherId => &["teacherId", "giaovien", "GIÁO VIÊN TẠO"],
            Self::ContentUrl => &["contentUrl", "linkbaihoc", "LINK BÀI HỌC"],
            Self::ContentKind => &["contentType", "dinhdang", "ĐỊNH DẠNG"],
            Self::Questions => &["questions", "cauhoi", "CÂU HỎI"],
            Self::VisualAids => &["visualAids", "hinhminhhoa", "HÌNH MINH HỌA"],
        }
    }

    fn label(self) -> String {
        match self {
            Self::Stt => fl!("field-stt"),
            Self::Code => fl!("field-lesson-code"),
            Self::Title => fl!("field-lesson-title"),
            Self::TeacherId => fl!("field-created-by"),
            Self::ContentUrl => fl!("field-lesson-link"),
            Self::ContentKind => fl!("field-content-kind"),
            Self::Questions => fl!("field-questions"),
            Self::VisualAids => fl!("field-visual-aids"),
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Stt => "stt",
            Self::Code => "code",
            Self::Title => "title",
            Self::TeacherId => "teacher",
            Self::ContentUrl => "link",
            Self::ContentKind => "content-kind",
            Self::Questions => "questions",
            Self::VisualAids => "visual-aids",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultField {
    Stt,
    Username,
    StudentName,
    LessonCode,
    TeacherId,
    LessonTitle,
    QuestionCount,
    QuestionScores,
    TotalScore,
}

impl RecordField for ResultField {
    const ALL: &'static [Self] = &[
        Self::Stt,
        Self::Username,
        Self::StudentName,
        Self::LessonCode,
        Self::TeacherId,
        Self::LessonTitle,
        Self::QuestionCount,
        Self::QuestionScores,
        Self::TotalScore,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Stt => "STT",
            Self::Username => "TÀI KHOẢN",
            Self::StudentName => "HỌ TÊN HỌC SINH",
            Self::LessonCode => "MÃ SỐ BÀI HỌC",
            Self::TeacherId => "GIÁO VIÊN TẠO",
            Self::LessonTitle => "TÊN BÀI HỌC",
            Self::QuestionCount => "TỔNG SỐ CÂU",
            Self::QuestionScores => "ĐIỂM TỪNG CÂU",
            Self::TotalScore => "TỔNG ĐIỂM",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Stt => &["STT", "stt"],
            Self::Username => &["TÀI KHOẢN", "username", "taikhoan"],
            Self::StudentName => &["HỌ TÊN HỌC SINH", "fullName", "hotenhocsinh"],
            Self::LessonCode => &["MÃ SỐ BÀI HỌC", "lessonCode", "masobaihoc", "mabaihoc"],
            Self::TeacherId => &["GIÁO VIÊN TẠO", "teacherId", "giaovien"],
            Self::LessonTitle => &["TÊN BÀI HỌC", "lessonName", "tenbaihoc"],
            Self::QuestionCount => &["TỔNG SỐ CÂU", "questionCount", "tongsocau"],
            Self::QuestionScores => &["ĐIỂM TỪNG CÂU", "scores", "diemtungcau"],
            Self::TotalScore => &["TỔNG ĐIỂM", "totalScore", "tongdiem"],
        }
    }

    fn label(self) -> String {
        match self {
            Self::Stt => fl!("field-stt"),
            Self::Username => fl!("field-username"),
            Self::StudentName => fl!("field-student-name"),
            Self::LessonCode => fl!("field-lesson-code"),
            Self::TeacherId => fl!("field-created-by"),
            Self::LessonTitle => fl!("field-lesson-title"),
            Self::QuestionCount => fl!("field-question-count"),
            Self::QuestionScores => fl!("field-question-scores"),
            Self::TotalScore => fl!("field-total-score"),
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Stt => "stt",
            Self::Username => "username",
            Self::StudentName => "student-name",
            Self::LessonCode => "lesson-code",
            Self::TeacherId => "teacher",
            Self::LessonTitle => "lesson-title",
            Self::QuestionCount => "question-count",
            Self::QuestionScores => "question-scores",
            Self::TotalScore => "total-score",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn set_reuses_existing_column() {
        let mut record = row(json!({"TÊN ĐĂNG NHẬP": "hs01"}));
        StudentField::Username.set(&mut record, json!("hs02"));
        assert_eq!(record.len(), 1);
        assert_eq!(record["TÊN ĐĂNG NHẬP"], json!("hs02"));
    }

    #[test]
    fn set_falls_back_to_canonical_column() {
        let mut record = Record::new();
        ResultField::TotalScore.set(&mut record, json!("7.5"));
        assert_eq!(record["TỔNG ĐIỂM"], json!("7.5"));
    }

    #[test]
    fn field_text_is_trimmed() {
        let record = row(json!({"TÀI KHOẢN": "  gv01 "}));
        assert_eq!(TeacherField::Username.text(&record), "gv01");
        assert_eq!(TeacherField::Email.text(&record), "");
    }

    #[test]
    fn lesson_title_does_not_pick_up_code_column() {
        let record = row(json!({"MÃ BÀI HỌC": "ABC", "TÊN BÀI HỌC": "Hàm số"}));
        assert_eq!(LessonField::Code.text(&record), "ABC");
        assert_eq!(LessonField::Title.text(&record), "Hàm số");
    }

    #[test]
    fn parse_by_key_or_column() {
        assert_eq!(LessonField::parse("content-kind"), Some(LessonField::ContentKind));
        assert_eq!(ResultField::parse("tổng điểm"), Some(ResultField::TotalScore));
        assert_eq!(TeacherField::parse("school"), None);
    }

    #[test]
    fn result_username_ignores_student_name_column() {
        let record = row(json!({"HỌ TÊN HỌC SINH": "An", "TÀI KHOẢN": "hs01"}));
        assert_eq!(ResultField::Username.text(&record), "hs01");
        assert_eq!(ResultField::StudentName.text(&record), "An");
    }
}
