use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("retrieval: catalog is empty")]
    EmptyCatalog,

    #[error("retrieval: embedding error: {0}")]
    Embed(#[from] mosaic_embed::EmbedError),

    #[error("retrieval: catalog error: {0}")]
    Catalog(#[from] mosaic_catalog::CatalogError),
}
