pub mod category;
pub mod result;
pub mod segment;
pub mod vocabulary;

pub use category::*;
pub use result::*;
pub use segment::*;
pub use vocabulary::{fields_for, Choice, VocabularyField, OTHER, VOCABULARY};
