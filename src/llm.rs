mod providers;
mod story;

pub use providers::{DynEmbeddingModel, EmbeddingProvider};
pub use story::StoryTeller;
