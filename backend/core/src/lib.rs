pub mod error;
pub mod message;
pub mod session_export;
pub mod store;
pub mod traits;
pub mod types;

pub use error::TandemError;
pub use message::{ChatMessage, ChatRole, Transcript, TranscriptEntry, SYSTEM_SPEAKER};
pub use session_export::{HtmlExporter, JsonFileSink, SessionRecord, TranscriptSink};
pub use store::{InMemoryProfileStore, ProfileStore};
pub use traits::{CompletionProvider, CompletionRequest, CompletionResponse, ContentBlock};
pub use types::{
    CalibrationPair, Demographics, Gender, LooseInt, MatchPreferences, PersonaDescription, Profile,
};
