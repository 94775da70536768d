use crate::embedding::KeywordEmbedder;
use lectern_rs_memory::{Embedder, EngineOptions, MemoryEngine};
use std::sync::Arc;
use tempfile::TempDir;

/// Hash-embedding engine in a fresh temp directory. Keep the `TempDir` alive
/// for the duration of the test.
pub fn temp_engine() -> (TempDir, Arc<MemoryEngine>) {
    temp_engine_with(|_| {})
}

/// Like [`temp_engine`] with options adjusted by `configure`.
pub fn temp_engine_with(configure: impl FnOnce(&mut EngineOptions)) -> (TempDir, Arc<MemoryEngine>) {
    let temp = TempDir::new().expect("tempdir");
    let mut options = EngineOptions::new(temp.path().join("memory"));
    configure(&mut options);
    let engine = MemoryEngine::new(options);
    (temp, Arc::new(engine))
}

/// Engine backed by [`KeywordEmbedder`], so related texts land close together.
pub fn keyword_engine(
    configure: impl FnOnce(&mut EngineOptions),
) -> (TempDir, Arc<MemoryEngine>) {
    let temp = TempDir::new().expect("tempdir");
    let mut options = EngineOptions::new(temp.path().join("memory"));
    configure(&mut options);
    let embedder = Embedder::with_provider(
        Arc::new(KeywordEmbedder::new(options.dimensions)),
        options.dimensions,
    );
    let engine = MemoryEngine::with_embedder(options, embedder);
    (temp, Arc::new(engine))
}
