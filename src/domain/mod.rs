// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Pure domain models: no I/O, no services.

pub mod account;
pub mod content;
pub mod crop;
pub mod grading;
pub mod lesson;
pub mod media;
