use qdrant_client::{
    Qdrant,
    qdrant::{
        CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
        UpsertPointsBuilder, VectorParamsBuilder, point_id::PointIdOptions,
        vectors_config::Config,
    },
};

use crate::config::structure::VectorConfig;

use super::Movie;

/// Thin client over the external vector database. All similarity ranking
/// happens inside qdrant; this type only moves points and payloads around.
pub struct MovieStore {
    client: Qdrant,
    collection: String,
}

impl MovieStore {
    pub fn new(config: &VectorConfig) -> anyhow::Result<Self> {
        let client = Qdrant::from_url(&format!(
            "http{}://{}:{}",
            match config.https.unwrap_or(false) {
                true => "s",
                false => "",
            },
            config.host,
            config.port.unwrap_or(6334)
        ))
        .skip_compatibility_check()
        .build()?;

        Ok(MovieStore {
            client,
            collection: config.collection.clone(),
        })
    }

    /// Verifies connectivity and that the collection's vector size matches
    /// what the configured embedding model produces.
    pub async fn health_check(&self, vector_size: u64) -> anyhow::Result<()> {
        self.client.health_check().await?;

        self.ensure_collection(vector_size).await?;

        let collection_info = self.client.collection_info(&self.collection).await?;

        let actual: u64 = async {
            if let Config::Params(params) = collection_info
                .result?
                .config?
                .params?
                .vectors_config?
                .config?
            {
                Some(params.size)
            } else {
                None
            }
        }
        .await
        .ok_or(anyhow::anyhow!("failed to get vector size"))?;

        if actual != vector_size {
            Err(anyhow::anyhow!(
                "vector size mismatch, expected {} but got {}",
                vector_size,
                actual
            ))
        } else {
            Ok(())
        }
    }

    pub async fn ensure_collection(&self, vector_size: u64) -> anyhow::Result<()> {
        if !self.client.collection_exists(&self.collection).await? {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(vector_size, Distance::Cosine),
                    ),
                )
                .await?;
            log::info!("created collection {}", self.collection);
        }

        Ok(())
    }

    pub async fn upsert(&self, movies: Vec<(Movie, Vec<f32>)>) -> anyhow::Result<()> {
        let points = movies
            .into_iter()
            .map(|(movie, embedding)| {
                PointStruct::new(movie.id, embedding, movie.into_payload())
            })
            .collect::<Vec<_>>();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await?;

        Ok(())
    }

    /// Nearest-neighbor search over plot embeddings, best match first.
    pub async fn search(&self, embedding: Vec<f32>, limit: u64) -> anyhow::Result<Vec<Movie>> {
        let search_result = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding, limit).with_payload(true),
            )
            .await?;

        Ok(search_result
            .result
            .into_iter()
            .filter_map(|point| {
                let id = if let PointIdOptions::Num(id) = point.id?.point_id_options? {
                    id
                } else {
                    return None;
                };

                log::debug!("hit #{id} with score {}", point.score);

                Movie::try_from_payload(id, point.payload)
            })
            .collect())
    }
}
