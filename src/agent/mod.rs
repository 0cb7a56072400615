pub mod context;
pub mod loop_;
pub mod system_prompt;

pub use loop_::{AdviceReport, Advisor, DEFAULT_MAX_ROUNDS};
