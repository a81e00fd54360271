use thiserror::Error;

#[derive(Error, Debug)]
pub enum DedupeError {
    #[error("dedupe: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dedupe: audio error: {0}")]
    Audio(#[from] mosaic_audio::AudioError),

    #[error("dedupe: catalog error: {0}")]
    Catalog(#[from] mosaic_catalog::CatalogError),
}
