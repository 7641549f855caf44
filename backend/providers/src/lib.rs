pub mod key;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod registry;
pub mod runtime;

pub use key::sanitize_api_key;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatProvider;
pub use registry::{build_provider, ProviderKind, ProviderRegistry, ProviderSpec, UnknownProviderKind};
