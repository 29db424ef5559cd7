// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/account.rs
//
// Accounts and exam results.

use std::fmt;

use crate::constant::CLASS_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    Teacher,
    Student,
    #[default]
    Guest,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
            Self::Guest => "GUEST",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Teacher {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Student {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub school: String,
    pub grade: String,
    pub email: String,
    pub phone: String,
    pub registration_date: Option<String>,
}

impl Student {
    /// Name as stored on result rows: `"<full name> - Lớp <grade>"`.
    pub fn name_with_class(&self) -> String {
        let name = self.full_name.trim();
        let grade = self.grade.trim();
        if grade.is_empty() {
            return name.to_string();
        }

        let class = if grade.to_lowercase().starts_with(&CLASS_PREFIX.to_lowercase()) {
            grade.to_string()
        } else {
            format!("{CLASS_PREFIX} {grade}")
        };
        format!("{name} - {class}")
    }
}

/// Signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    Admin { username: String },
    Teacher(Teacher),
    Student(Student),
}

impl Account {
    pub fn role(&self) -> Role {
        match self {
            Self::Admin { .. } => Role::Admin,
            Self::Teacher(_) => Role::Teacher,
            Self::Student(_) => Role::Student,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Self::Admin { username } => username,
            Self::Teacher(teacher) => &teacher.username,
            Self::Student(student) => &student.username,
        }
    }

    pub fn display_name(&self) -> &str {
        let full_name = match self {
            Self::Admin { username } => username.as_str(),
            Self::Teacher(teacher) => teacher.full_name.as_str(),
            Self::Student(student) => student.full_name.as_str(),
        };
        if full_name.trim().is_empty() {
            self.username()
        } else {
            full_name
        }
    }
}

/// One graded submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExamResult {
    pub stt: Option<String>,
    pub username: String,
    pub student_name: String,
    pub lesson_code: String,
    pub teacher_id: String,
    pub lesson_title: String,
    pub question_count: u32,
    /// Comma separated per-question scores, e.g. `"8, 6.5, 10"`.
    pub question_scores: String,
    pub total_score: f32,
}

impl ExamResult {
    pub fn total_display(&self) -> String {
        format!("{:.1}", self.total_score)
    }
}
