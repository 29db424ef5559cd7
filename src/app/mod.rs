// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/mod.rs
//
// Application layer: the crop tool and the role workflows built on the
// record store and AI services.

pub mod admin;
pub mod cropper;
pub mod message;
pub mod session;
pub mod student;
pub mod teacher;

use thiserror::Error;

use crate::records::UnknownField;
use crate::services::ai::AiError;
use crate::services::record_store::{StoreError, WriteOutcome};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Field(#[from] UnknownField),

    #[error("the record store rejected the change: {0}")]
    Rejected(String),

    #[error("wrong username or password")]
    InvalidCredentials,

    #[error("{0} is required")]
    Required(&'static str),

    #[error("username `{0}` is already registered")]
    UsernameTaken(String),

    #[error("no lesson with code `{0}`")]
    LessonNotFound(String),

    #[error("no row with id `{0}`")]
    RowNotFound(String),

    #[error("a lesson needs at least one question")]
    NoQuestions,

    #[error("select at least one suggested question")]
    EmptySelection,

    #[error("question {0} does not exist")]
    NoSuchQuestion(usize),

    #[error("question {0} has no visual aid")]
    NoVisualAid(usize),

    #[error("the model did not return an image")]
    NoImage,
}

impl WorkflowError {
    /// Turn a rejected write into an error.
    pub(crate) fn check(outcome: WriteOutcome) -> Result<(), Self> {
        match outcome {
            WriteOutcome::Saved => Ok(()),
            WriteOutcome::Rejected(message) => Err(Self::Rejected(message)),
        }
    }
}
