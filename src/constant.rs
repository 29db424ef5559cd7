// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Application constants that should not be changed by the user.

use image::Rgba;

/// Opacity of the dark mask drawn over the unselected area.
pub const CROP_OVERLAY_ALPHA: f32 = 0.5;

/// Selection border color (opaque blue).
pub const CROP_BORDER_COLOR: Rgba<u8> = Rgba([0x25, 0x63, 0xeb, 0xff]);

/// Selection border stroke width in image pixels.
pub const CROP_BORDER_WIDTH: f32 = 4.0;

/// Mime type of every cropped output.
pub const CROP_OUTPUT_MIME: &str = "image/png";

/// Config directory name below the platform config dir.
pub const CONFIG_DIR: &str = "lectern";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Alphabet for generated lesson codes (no 0/O, 1/I look-alikes).
pub const LESSON_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated lesson codes.
pub const LESSON_CODE_LEN: usize = 10;

/// Number of exercise suggestions requested when none is given.
pub const DEFAULT_SUGGESTION_COUNT: usize = 10;

/// Upper bound of the grading scale.
pub const MAX_SCORE: f32 = 10.0;

/// Prefix used in the store for a student's class ("Lớp 10A").
pub const CLASS_PREFIX: &str = "Lớp";

/// Timestamp layout of the registration date column.
pub const REGISTRATION_DATE_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

/// Body content type that keeps record-store POSTs free of CORS preflight.
pub const STORE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Environment variables checked for the AI API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["LECTERN_API_KEY", "API_KEY"];

/// Base URL of the generative language REST API.
pub const AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model for suggestions and grading.
pub const AI_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Model for flat figures and charts.
pub const AI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Model for solid (3D) figures.
pub const AI_SOLID_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Language the AI is asked to answer in.
pub const AI_RESPONSE_LANGUAGE: &str = "Vietnamese";

/// Grading calls in flight at once during a submission.
pub const AI_MAX_CONCURRENT_REQUESTS: usize = 4;

/// Per-request timeout for both remote services.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Answer text sent for a question the student left blank.
pub const BLANK_ANSWER: &str = "The student submitted a blank answer.";
