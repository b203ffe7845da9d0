pub mod collector;
pub mod extractor;
pub mod filler;
pub mod notifier;
pub mod translator;
pub mod work_list;

pub use collector::{Collector, RowProvider};
pub use filler::{Filler, RowEditor};
pub use notifier::Notifier;
pub use translator::{GeminiTranslator, TranslateBackend};
pub use work_list::WorkListStore;
