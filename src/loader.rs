//! Dataset loader: embeds a JSON movie dataset and upserts it into the
//! vector database in concurrent batches.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use rig::embeddings::Embedding;
use serde::Deserialize;

use crate::config::store::AppConfig;
use crate::movies::{Movie, MovieStore};

const EMBED_CONCURRENCY: usize = 8;
const UPSERT_BATCH: usize = 64;

/// One dataset entry. Looser than [`Movie`] so partially-filled exports
/// still load; entries without a plot cannot be indexed and are skipped.
#[derive(Debug, Deserialize)]
struct MovieRecord {
    id: u64,
    title: String,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    poster_url: Option<String>,
    #[serde(default)]
    imdb_id: Option<String>,
}

impl MovieRecord {
    fn into_movie(self) -> Option<Movie> {
        let plot = self.plot.filter(|plot| !plot.trim().is_empty())?;

        Some(Movie {
            id: self.id,
            title: self.title,
            plot,
            release_date: self.release_date,
            tagline: self.tagline,
            genre: self.genre,
            poster_url: self.poster_url,
            imdb_id: self.imdb_id,
        })
    }
}

pub async fn run(config: AppConfig, file: &Path) -> anyhow::Result<()> {
    let embedder = config
        .embedding
        .provider
        .model(&config.embedding, "search_document")?;
    let store = MovieStore::new(&config.vector)?;

    let raw = tokio::fs::read_to_string(file).await?;
    let records: Vec<MovieRecord> = serde_json::from_str(&raw)?;

    let total = records.len();
    let movies = records
        .into_iter()
        .filter_map(MovieRecord::into_movie)
        .collect::<Vec<_>>();
    let skipped = total - movies.len();
    if skipped > 0 {
        log::warn!("skipping {skipped} of {total} records without a plot");
    }

    let Embedding { vec, .. } = embedder.embed_text("a").await?;
    store.ensure_collection(vec.len() as u64).await?;

    let bar = ProgressBar::new(movies.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} ({per_sec}, eta {eta})",
    )?);

    let started = Instant::now();
    let embedder = &embedder;

    let mut embedded = stream::iter(movies.into_iter().map(|movie| async move {
        let embedding = embedder.embed_text(&movie.plot).await?;
        let vector = embedding
            .vec
            .into_iter()
            .map(|x| x as f32)
            .collect::<Vec<f32>>();

        Ok::<_, anyhow::Error>((movie, vector))
    }))
    .buffer_unordered(EMBED_CONCURRENCY);

    let mut batch = Vec::with_capacity(UPSERT_BATCH);
    let mut loaded = 0usize;

    while let Some(result) = embedded.next().await {
        batch.push(result?);
        bar.inc(1);

        if batch.len() >= UPSERT_BATCH {
            loaded += batch.len();
            store.upsert(std::mem::take(&mut batch)).await?;
        }
    }
    if !batch.is_empty() {
        loaded += batch.len();
        store.upsert(batch).await?;
    }
    bar.finish();

    let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
    log::info!(
        "loaded {loaded} movies in {elapsed:.2}s ({:.0} ops/sec)",
        loaded as f64 / elapsed
    );

    Ok(())
}
