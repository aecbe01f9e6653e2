//! State module for tracking crawl progress
//!
//! - `TermState`: the per-prefix state machine driven by the term crawler

mod term_state;

pub use term_state::TermState;
