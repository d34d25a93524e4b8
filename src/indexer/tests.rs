use super::*;
use crate::test_support::{FailingEmbedder, HashEmbedder, TEST_DIMENSION};
use tempfile::TempDir;

fn create_test_indexer(embedder: Arc<dyn Embedder>) -> (Indexer, Arc<IndexStore>, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = Arc::new(IndexStore::new(temp_dir.path()));
    store.init().expect("should init store");
    let indexer = Indexer::new(Arc::clone(&store), embedder, Chunker::default());
    (indexer, store, temp_dir)
}

#[test]
fn indexes_document_into_fixed_chunks() {
    let (indexer, store, _temp_dir) = create_test_indexer(Arc::new(HashEmbedder::default()));
    let text = "disk full on node-7 ".repeat(60);

    let summary = indexer
        .index_document(Some("disk.pdf"), &text)
        .expect("should index");

    assert_eq!(summary.chunks, text.chars().count().div_ceil(500));
    assert_eq!(summary.dimension, TEST_DIMENSION);

    let loaded = store.load().expect("should load");
    assert_eq!(loaded.metadata.chunks.concat(), text);
    assert_eq!(loaded.metadata.filename.as_deref(), Some("disk.pdf"));
}

#[test]
fn blank_text_is_rejected_without_touching_store() {
    let embedder = Arc::new(HashEmbedder::default());
    let (indexer, store, _temp_dir) = create_test_indexer(Arc::clone(&embedder) as Arc<dyn Embedder>);

    for text in ["", "   ", "\n\t\n"] {
        assert!(matches!(
            indexer.index_document(None, text),
            Err(RagError::EmptyDocument)
        ));
    }

    assert!(!store.exists());
    assert_eq!(embedder.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn embedding_failure_keeps_previous_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = Arc::new(IndexStore::new(temp_dir.path()));

    let working = Indexer::new(
        Arc::clone(&store),
        Arc::new(HashEmbedder::default()),
        Chunker::default(),
    );
    let first = working
        .index_document(Some("a.pdf"), "the sky is blue")
        .expect("first index");

    let failing = Indexer::new(Arc::clone(&store), Arc::new(FailingEmbedder), Chunker::default());
    assert!(matches!(
        failing.index_document(Some("b.pdf"), "the grass is green"),
        Err(RagError::Embedding(_))
    ));

    let loaded = store.load().expect("should load");
    assert_eq!(loaded.metadata.build_id, first.build_id);
}

#[test]
fn short_embedding_response_is_rejected() {
    struct ShortEmbedder;
    impl Embedder for ShortEmbedder {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0]])
        }
    }

    let (indexer, store, _temp_dir) = create_test_indexer(Arc::new(ShortEmbedder));
    let result = indexer.index_chunks(None, vec!["a".to_string(), "b".to_string()]);

    assert!(matches!(result, Err(RagError::Embedding(_))));
    assert!(!store.exists());
}
