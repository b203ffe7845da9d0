pub mod translation;

pub use translation::{RowSnapshot, TranslationItem};
