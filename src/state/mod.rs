//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `BookState`: Tracks one book URL through fetch, validation, extraction and downloads
//! - `SkipReason`: Why a book was dropped without stopping the run
//! - `BookRecord`: The collected data for one book

mod book_record;
mod book_state;

// Re-export main types
pub use book_record::BookRecord;
pub use book_state::{BookState, SkipReason};
