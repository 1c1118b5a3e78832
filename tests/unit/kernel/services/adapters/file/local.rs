use super::*;
use tempfile::tempdir;

#[test]
fn test_read_write_file() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.txt");

    let provider = LocalFileProvider::new();
    provider.write_file(&file_path, "Hello, World!").unwrap();

    assert_eq!(provider.read_file(&file_path).unwrap(), "Hello, World!");
    assert_eq!(
        provider.read_file_bytes(&file_path).unwrap(),
        b"Hello, World!".to_vec()
    );
}

#[test]
fn test_write_creates_missing_parents() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("a").join("b").join("c.txt");

    LocalFileProvider::new().write_file(&file_path, "deep").unwrap();
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "deep");
}

#[test]
fn test_write_overwrites() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.txt");
    let provider = LocalFileProvider::new();

    provider.write_file(&file_path, "first version").unwrap();
    provider.write_file(&file_path, "second").unwrap();
    assert_eq!(provider.read_file(&file_path).unwrap(), "second");
}

#[test]
fn test_not_found_error() {
    let dir = tempdir().unwrap();
    let result = LocalFileProvider::new().read_file(&dir.path().join("missing.txt"));
    assert!(matches!(result, Err(FileError::NotFound(_))));
}

#[test]
fn test_directory_is_not_a_file() {
    let dir = tempdir().unwrap();
    let provider = LocalFileProvider::new();

    assert!(matches!(
        provider.read_file(dir.path()),
        Err(FileError::NotAFile(_))
    ));
    assert!(matches!(
        provider.write_file(dir.path(), "x"),
        Err(FileError::NotAFile(_))
    ));
}

#[test]
fn test_invalid_utf8_is_not_text() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("latin1.txt");
    fs::write(&file_path, b"caf\xe9").unwrap();

    let provider = LocalFileProvider::new();
    assert!(matches!(
        provider.read_file(&file_path),
        Err(FileError::NotText(_))
    ));
    assert_eq!(provider.read_file_bytes(&file_path).unwrap().len(), 4);
}
