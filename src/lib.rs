//! Quillpad
//!
//! A markdown editor with structural table editing. The table engine in
//! [`table`] is pure and synchronous; the remaining modules build the
//! editor session, preferences, file access, and export around it.

pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod export;
pub mod files;
pub mod markdown;
pub mod string_utils;
pub mod table;
