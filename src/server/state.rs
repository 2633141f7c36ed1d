use crate::config::structure::AppConfigInner;
use crate::llm::StoryTeller;
use crate::movies::MovieRag;

/// Shared clients for the request handlers. The server keeps no per-session
/// state; the chat transcript lives in the browser tab.
pub struct AppState {
    pub rag: MovieRag,
    pub story: StoryTeller,
}

impl AppState {
    pub fn new(config: &AppConfigInner) -> anyhow::Result<Self> {
        Ok(Self {
            rag: MovieRag::new(config)?,
            story: StoryTeller::new(&config.llm),
        })
    }
}
