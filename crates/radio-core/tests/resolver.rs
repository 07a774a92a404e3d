use radio_core::{PlaylistResolver, ResolveError, ResolverConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver() -> PlaylistResolver {
    PlaylistResolver::new(ResolverConfig::default())
}

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolve_pls() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/radio.pls",
        "[playlist]\nNumberOfEntries=2\nFile1=http://a/stream\nFile2=http://b/stream\n",
    )
    .await;

    let uris = resolver()
        .resolve(&format!("{}/radio.pls", server.uri()), false, None)
        .await
        .unwrap();
    assert_eq!(uris, ["http://a/stream", "http://b/stream"]);
}

#[tokio::test]
async fn test_resolve_m3u_with_uppercase_extension() {
    let server = MockServer::start().await;
    serve(&server, "/radio.M3U", "#EXTM3U\r\nhttp://a\r\n\r\nhttp://b\r\n").await;

    let uris = resolver()
        .resolve(&format!("{}/radio.M3U?token=1", server.uri()), false, None)
        .await
        .unwrap();
    assert_eq!(uris, ["http://a", "http://b"]);
}

#[tokio::test]
async fn test_resolve_xspf() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/list.xspf",
        r#"<?xml version="1.0"?>
<playlist version="1" xmlns="http://xspf.org/ns/0/">
  <trackList>
    <track><location>http://a/1</location></track>
    <track><location><![CDATA[http://a/2]]></location></track>
  </trackList>
</playlist>"#,
    )
    .await;

    let uris = resolver()
        .resolve(&format!("{}/list.xspf", server.uri()), false, None)
        .await
        .unwrap();
    assert_eq!(uris, ["http://a/1", "http://a/2"]);
}

#[tokio::test]
async fn test_custom_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/radio.asx"))
        .and(header("user-agent", "VLC/3.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<asx version="3.0"><entry><ref href="mms://a"/></entry></asx>"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uris = resolver()
        .resolve(&format!("{}/radio.asx", server.uri()), false, Some("VLC/3.0"))
        .await
        .unwrap();
    assert_eq!(uris, ["mms://a"]);
}

#[tokio::test]
async fn test_empty_body_fails_with_empty() {
    let server = MockServer::start().await;
    serve(&server, "/radio.pls", "").await;

    let err = resolver()
        .resolve(&format!("{}/radio.pls", server.uri()), false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Empty));
}

#[tokio::test]
async fn test_not_found_fails_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = resolver()
        .resolve(&format!("{}/gone.m3u", server.uri()), false, None)
        .await
        .unwrap_err();
    match err {
        ResolveError::Transport { status, reason } => {
            assert_eq!(status, Some(404));
            assert_eq!(reason, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unsupported_format_is_still_downloaded() {
    let server = MockServer::start().await;
    serve(&server, "/stream.mp3", "ID3 not a playlist").await;

    let err = resolver()
        .resolve(&format!("{}/stream.mp3", server.uri()), false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnsupportedFormat(_)));
    server.verify().await;
}

#[tokio::test]
async fn test_playlist_without_streams_fails_with_no_entries() {
    let server = MockServer::start().await;
    serve(&server, "/comments.m3u", "#EXTM3U\n# nothing here\n").await;

    let err = resolver()
        .resolve(&format!("{}/comments.m3u", server.uri()), false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NoEntries));
}

#[tokio::test]
async fn test_malformed_playlist_fails_with_parse() {
    let server = MockServer::start().await;
    serve(&server, "/broken.pls", "File1=http://a\n").await;

    let err = resolver()
        .resolve(&format!("{}/broken.pls", server.uri()), false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Parse(_)));
}
