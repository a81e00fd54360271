pub mod config;
pub mod cosine;
pub mod embed;
pub mod error;
pub mod openai;

pub use config::EmbedConfig;
pub use cosine::cosine_similarity;
pub use embed::Embedder;
pub use error::EmbedError;
pub use openai::OpenAI;
