use rig::embeddings::Embedding;

use crate::config::structure::AppConfigInner;
use crate::llm::DynEmbeddingModel;

use super::{Movie, MovieStore};

/// Retrieval front: embeds a plot description and ranks movies against it.
pub struct MovieRag {
    store: MovieStore,
    embedder: Box<dyn DynEmbeddingModel>,
}

impl MovieRag {
    pub fn new(config: &AppConfigInner) -> anyhow::Result<Self> {
        let embedder = config
            .embedding
            .provider
            .model(&config.embedding, "search_query")?;
        let store = MovieStore::new(&config.vector)?;

        Ok(Self { store, embedder })
    }

    /// Asks the provider for a single embedding to learn the real vector
    /// width, then verifies the collection agrees with it.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        let Embedding { vec, .. } = self.embedder.embed_text("a").await?;

        self.store.health_check(vec.len() as u64).await
    }

    pub async fn similar_movies(&self, plot: &str, top_k: u64) -> anyhow::Result<Vec<Movie>> {
        let Embedding { vec, .. } = self.embedder.embed_text(plot).await?;

        let embedding = vec.into_iter().map(|x| x as f32).collect::<Vec<f32>>();

        self.store.search(embedding, top_k).await
    }
}
