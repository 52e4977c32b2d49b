use quiz_core::model::TestId;
use storage::{HttpTestRepository, StorageError, TestRepository};

const BODY: &str = r#"{
    "title": "Remote",
    "code": "R-1",
    "questions": [{"id": "q1", "q": "?", "choices": ["x", "y"], "answer": 0}]
}"#;

#[tokio::test]
async fn fetches_document_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/tests/remote/test.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BODY)
        .create_async()
        .await;

    let repo = HttpTestRepository::new(&server.url()).unwrap();
    let loaded = repo.load_test(&TestId::new("remote").unwrap()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(loaded.record.title, "Remote");
    assert_eq!(loaded.base_path, format!("{}/tests/remote/", server.url()));
}

#[tokio::test]
async fn missing_document_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/tests/gone/test.json")
        .with_status(404)
        .create_async()
        .await;

    let repo = HttpTestRepository::new(&server.url()).unwrap();
    let err = repo.load_test(&TestId::new("gone").unwrap()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/tests/flaky/test.json")
        .with_status(503)
        .create_async()
        .await;

    let repo = HttpTestRepository::new(&server.url()).unwrap();
    let err = repo.load_test(&TestId::new("flaky").unwrap()).await.unwrap_err();
    assert!(matches!(err, StorageError::Status(503)));
}

#[tokio::test]
async fn listing_reads_index_and_skips_failures() {
    let mut server = mockito::Server::new_async().await;
    let _index = server
        .mock("GET", "/tests/index.json")
        .with_status(200)
        .with_body(r#"["remote", "gone"]"#)
        .create_async()
        .await;
    let _remote = server
        .mock("GET", "/tests/remote/test.json")
        .with_status(200)
        .with_body(BODY)
        .create_async()
        .await;
    let _gone = server
        .mock("GET", "/tests/gone/test.json")
        .with_status(404)
        .create_async()
        .await;

    let repo = HttpTestRepository::new(&server.url()).unwrap();
    let listed = repo.list_tests().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Remote");
}

#[tokio::test]
async fn listing_skips_invalid_ids_in_index() {
    let mut server = mockito::Server::new_async().await;
    let _index = server
        .mock("GET", "/tests/index.json")
        .with_status(200)
        .with_body(r#"["remote", "bad id"]"#)
        .create_async()
        .await;
    let _remote = server
        .mock("GET", "/tests/remote/test.json")
        .with_status(200)
        .with_body(BODY)
        .create_async()
        .await;

    let repo = HttpTestRepository::new(&server.url()).unwrap();
    let listed = repo.list_tests().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id.as_str(), "remote");
}
