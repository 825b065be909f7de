// src/lib.rs

//! Journal Archiver Library
//!
//! Crawls a journal's archive listing, builds a catalogue of every issue's
//! articles, and downloads the article PDFs into a volume/issue tree.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
