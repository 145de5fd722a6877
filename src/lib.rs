//! Deckscribe - slide deck upload, rasterization, and commentary.
//!
//! Accepts pptx/pdf uploads, converts them to per-slide PNG images using
//! LibreOffice and Poppler, and stores free-text (and audio) commentary per
//! slide. One uuid token assigned at upload time keys the original file,
//! the slide image directory, and the commentary file.

pub mod cli;
pub mod commentary;
pub mod config;
pub mod convert;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
