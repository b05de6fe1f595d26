mod harness;

use harness::config::ConfigBuilder;
use harness::mock_upstream::MockUpstream;
use harness::server::TestServer;

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let mock = MockUpstream::start().await.unwrap();
    let config = ConfigBuilder::new().with_speech(&mock).build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let mock = MockUpstream::start().await.unwrap();
    let config = ConfigBuilder::new().with_speech(&mock).without_health().build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
}
