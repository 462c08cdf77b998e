pub mod analyzer;
pub mod bigram;
pub mod coverage;
pub mod prompt;
pub mod sampler;
pub mod weakness;

pub use bigram::BigramKey;
pub use weakness::{WeaknessEntry, WeaknessOptions};
