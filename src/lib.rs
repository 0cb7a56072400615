//! Career advisor: a tool-augmented LLM loop that answers career questions.
//!
//! A question is enriched with matching career records, sent to a hosted
//! chat model together with a small set of local tools (job search, skill
//! gap analysis, learning timeline), and driven to a final answer by a
//! bounded dispatch loop.

pub mod agent;
pub mod careers;
pub mod config;
pub mod format;
pub mod model;
pub mod server;
pub mod state;
pub mod tools;
pub mod types;
