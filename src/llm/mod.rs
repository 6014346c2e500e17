pub mod client;
pub mod fence;
#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod validation;

pub use client::*;
pub use fence::*;
pub use prompts::*;
pub use validation::*;
