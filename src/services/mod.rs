// SPDX-License-Identifier: GPL-3.0-or-later
// src/services/mod.rs
//
// Remote collaborators: the record store and the AI content service.

pub mod ai;
pub mod record_store;
