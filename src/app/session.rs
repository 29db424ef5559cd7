// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/session.rs
//
// Sign-in for every role and student self-registration.

use chrono::NaiveDateTime;

use super::WorkflowError;
use crate::config::AdminConfig;
use crate::constant::REGISTRATION_DATE_FORMAT;
use crate::domain::account::{Account, Student, Teacher};
use crate::records::{Collection, FromRecord, Record, RecordField, StudentField, TeacherField, ToRecord};
use crate::services::record_store::RecordStore;

fn credentials_match<F: RecordField>(
    row: &Record,
    user_field: F,
    password_field: F,
    username: &str,
    password: &str,
) -> bool {
    !username.is_empty()
        && user_field.text(row) == username
        && password_field.text(row) == password
}

pub async fn login_teacher<S: RecordStore>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<Teacher, WorkflowError> {
    let (username, password) = (username.trim(), password.trim());
    let rows = store.read_all(Collection::Teachers).await?;

    let teacher = rows
        .iter()
        .find(|row| {
            credentials_match(row, TeacherField::Username, TeacherField::Password, username, password)
        })
        .map(Teacher::from_record)
        .ok_or(WorkflowError::InvalidCredentials)?;

    log::info!("Teacher {} signed in", teacher.username);
    Ok(teacher)
}

pub async fn login_student<S: RecordStore>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<Student, WorkflowError> {
    let (username, password) = (username.trim(), password.trim());
    let rows = store.read_all(Collection::Students).await?;

    let student = rows
        .iter()
        .find(|row| {
            credentials_match(row, StudentField::Username, StudentField::Password, username, password)
        })
        .map(Student::from_record)
        .ok_or(WorkflowError::InvalidCredentials)?;

    log::info!("Student {} signed in", student.username);
    Ok(student)
}

pub fn login_admin(
    admin: &AdminConfig,
    username: &str,
    password: &str,
) -> Result<Account, WorkflowError> {
    if !admin.verify(username, password) {
        log::warn!("Rejected admin sign-in for {:?}", username.trim());
        return Err(WorkflowError::InvalidCredentials);
    }
    Ok(Account::Admin {
        username: admin.username.trim().to_string(),
    })
}

/// Write a new student row stamped with `registered_at`.
pub async fn register_student<S: RecordStore>(
    store: &S,
    mut student: Student,
    registered_at: NaiveDateTime,
) -> Result<Student, WorkflowError> {
    student.username = student.username.trim().to_string();
    student.password = student.password.trim().to_string();
    student.full_name = student.full_name.trim().to_string();

    if student.username.is_empty() {
        return Err(WorkflowError::Required("username"));
    }
    if student.password.is_empty() {
        return Err(WorkflowError::Required("password"));
    }
    if student.full_name.is_empty() {
        return Err(WorkflowError::Required("full name"));
    }

    let rows = store.read_all(Collection::Students).await?;
    if rows
        .iter()
        .any(|row| StudentField::Username.text(row) == student.username)
    {
        return Err(WorkflowError::UsernameTaken(student.username));
    }

    student.registration_date = Some(registered_at.format(REGISTRATION_DATE_FORMAT).to_string());
    let outcome = store.write(Collection::Students, student.to_record()).await?;
    WorkflowError::check(outcome)?;

    log::info!("Registered student {}", student.username);
    Ok(student)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::record_store::memory::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn teachers() -> MemoryStore {
        MemoryStore::with_rows(
            Collection::Teachers,
            vec![
                json!({"TÀI KHOẢN": "gv01", "MẬT KHẨU": 1234, "HỌ TÊN GIÁO VIÊN": "Cô Lan"}),
                json!({"TÀI KHOẢN": "gv02", "MẬT KHẨU": "abcd"}),
            ],
        )
    }

    #[tokio::test]
    async fn teacher_login_with_localized_columns() {
        let store = teachers();
        let teacher = login_teacher(&store, " gv01 ", "1234").await.unwrap();
        assert_eq!(teacher.full_name, "Cô Lan");

        let err = login_teacher(&store, "gv01", "abcd").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidCredentials));
    }

    #[tokio::test]
    async fn blank_username_never_matches() {
        let store = MemoryStore::with_rows(
            Collection::Students,
            vec![json!({"username": "", "password": ""})],
        );
        assert!(login_student(&store, "", "").await.is_err());
    }

    #[tokio::test]
    async fn student_login_with_any_alias() {
        let store = MemoryStore::with_rows(
            Collection::Students,
            vec![json!({"TÊN ĐĂNG NHẬP": "hs01", "Mật khẩu": "pw", "LỚP": "10A"})],
        );
        let student = login_student(&store, "hs01", "pw").await.unwrap();
        assert_eq!(student.grade, "10A");
    }

    #[tokio::test]
    async fn registration_stamps_date_and_rejects_duplicates() {
        let store = MemoryStore::default();
        let at = NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(8, 5, 9)
            .unwrap();
        let student = Student {
            username: "hs01 ".into(),
            password: "pw".into(),
            full_name: "An".into(),
            grade: "10A".into(),
            ..Student::default()
        };

        let saved = register_student(&store, student.clone(), at).await.unwrap();
        assert_eq!(saved.registration_date.as_deref(), Some("08:05:09 01/09/2026"));
        let rows = store.rows(Collection::Students);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["username"], "hs01");

        let err = register_student(&store, student, at).await.unwrap_err();
        assert!(matches!(err, WorkflowError::UsernameTaken(name) if name == "hs01"));
    }

    #[tokio::test]
    async fn registration_requires_credentials() {
        let store = MemoryStore::default();
        let at = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let err = register_student(&store, Student::default(), at).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Required("username")));
    }

    #[test]
    fn admin_login_uses_digest() {
        let mut admin = AdminConfig::default();
        admin.set_password("root-pw");
        assert_eq!(
            login_admin(&admin, "admin", "root-pw").unwrap(),
            Account::Admin {
                username: "admin".into()
            }
        );
        assert!(login_admin(&admin, "admin", "nope").is_err());
    }
}
