pub mod correction;
pub mod fields;
pub mod pipeline;
pub mod prompts;
