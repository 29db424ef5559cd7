// SPDX-License-Identifier: GPL-3.0-or-later
// src/records/schema.rs
//
// Editable fields per collection, used by the admin editor.

use serde_json::Value;
use thiserror::Error;

use super::fields::{LessonField, RecordField, ResultField, StudentField, TeacherField};
use super::{Collection, Record};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{collection} has no editable field `{field}`")]
pub struct UnknownField {
    pub collection: Collection,
    pub field: String,
}

/// One editor column as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorColumn {
    pub key: &'static str,
    pub column: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorSchema {
    Teachers(&'static [TeacherField]),
    Students(&'static [StudentField]),
    Lessons(&'static [LessonField]),
    Results(&'static [ResultField]),
}

impl EditorSchema {
    pub fn for_collection(collection: Collection) -> Self {
        match collection {
            Collection::Teachers => Self::Teachers(TeacherField::ALL),
            Collection::Students => Self::Students(&[
                StudentField::Username,
                StudentField::Password,
                StudentField::FullName,
                StudentField::School,
                StudentField::Grade,
                StudentField::Email,
                StudentField::Phone,
            ]),
            Collection::Lessons => Self::Lessons(&[
                LessonField::Code,
                LessonField::Title,
                LessonField::TeacherId,
                LessonField::ContentUrl,
                LessonField::ContentKind,
            ]),
            Collection::Results => Self::Results(&[
                ResultField::Username,
                ResultField::StudentName,
                ResultField::LessonTitle,
                ResultField::TotalScore,
            ]),
        }
    }

    pub fn collection(self) -> Collection {
        match self {
            Self::Teachers(_) => Collection::Teachers,
            Self::Students(_) => Collection::Students,
            Self::Lessons(_) => Collection::Lessons,
            Self::Results(_) => Collection::Results,
        }
    }

    pub fn columns(self) -> Vec<EditorColumn> {
        match self {
            Self::Teachers(fields) => columns_of(fields),
            Self::Students(fields) => columns_of(fields),
            Self::Lessons(fields) => columns_of(fields),
            Self::Results(fields) => columns_of(fields),
        }
    }

    /// Current text of every editable field of `record`, in column order.
    pub fn cells(self, record: &Record) -> Vec<String> {
        match self {
            Self::Teachers(fields) => cells_of(fields, record),
            Self::Students(fields) => cells_of(fields, record),
            Self::Lessons(fields) => cells_of(fields, record),
            Self::Results(fields) => cells_of(fields, record),
        }
    }

    /// Set an editable field, named by key or column, to `value`.
    pub fn set(self, record: &mut Record, field: &str, value: &str) -> Result<(), UnknownField> {
        let applied = match self {
            Self::Teachers(fields) => set_in(fields, record, field, value),
            Self::Students(fields) => set_in(fields, record, field, value),
            Self::Lessons(fields) => set_in(fields, record, field, value),
            Self::Results(fields) => set_in(fields, record, field, value),
        };

        if applied {
            Ok(())
        } else {
            Err(UnknownField {
                collection: self.collection(),
                field: field.to_string(),
            })
        }
    }
}

fn columns_of<F: RecordField>(fields: &[F]) -> Vec<EditorColumn> {
    fields
        .iter()
        .map(|field| EditorColumn {
            key: field.key(),
            column: field.column(),
            label: field.label(),
        })
        .collect()
}

fn cells_of<F: RecordField>(fields: &[F], record: &Record) -> Vec<String> {
    fields.iter().map(|field| field.text(record)).collect()
}

fn set_in<F: RecordField + PartialEq>(
    fields: &[F],
    record: &mut Record,
    name: &str,
    value: &str,
) -> bool {
    match F::parse(name).filter(|field| fields.contains(field)) {
        Some(field) => {
            field.set(record, Value::from(value));
            true
        }
        None => false,
    }
}
