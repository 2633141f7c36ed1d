mod model;
mod rag;
mod store;

pub use model::Movie;
pub use rag::MovieRag;
pub use store::MovieStore;
