mod catalog;
mod encoder;
mod preprocess;
mod pipeline;
mod vector_store;

pub use catalog::{CatalogClient, CatalogSource, MENU_QUERY, filter_by_ids};
pub use encoder::{
    ClipImageEncoder, Device, ImageEncoder, MODEL_FILE, ORT_DYLIB_ENV, OnnxImageModel, normalize,
    runtime_library,
};
pub use preprocess::{CLIP_MEAN, CLIP_STD, ImageFetcher, preprocess};
pub use pipeline::{ItemProgress, SeedingPipeline};
pub use vector_store::{IndexInfo, PineconeBackend, VectorStore, create_backend};
