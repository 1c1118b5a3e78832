use super::*;

#[tokio::test]
async fn test_loads_and_tracks_documents() {
    let engine = HeadlessEngine::new();
    engine.load().await.unwrap();
    engine.bind_container().await.unwrap();

    let path = DocPath::file("/w/main.rs");
    let handle = engine
        .create_document(&path, "fn main() {}", LanguageId::Rust)
        .unwrap();
    engine.bind_document(handle).unwrap();
    assert_eq!(engine.document_count(), 1);
    assert_eq!(engine.document_path(handle), Some(path));

    engine.dispose_document(handle);
    assert_eq!(engine.document_count(), 0);
    assert!(matches!(
        engine.bind_document(handle),
        Err(EngineError::Bind(_))
    ));
}

#[test]
fn test_handles_are_unique() {
    let engine = HeadlessEngine::new();
    let a = engine
        .create_document(&DocPath::file("/w/a"), "", LanguageId::PlainText)
        .unwrap();
    let b = engine
        .create_document(&DocPath::file("/w/a"), "", LanguageId::PlainText)
        .unwrap();
    assert_ne!(a, b);
}
