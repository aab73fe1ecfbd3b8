// tests/dev_server.rs

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use assetflow::engine::{RuntimeEvent, RuntimeOptions};
use assetflow::errors::PipelineError;
use assetflow::exec::ProgressReporter;
use assetflow::pipeline::Pipeline;
use assetflow::server::{inject_client, router, DevServer, ReloadHub, CLIENT_SCRIPT, LIVERELOAD_PATH};
use assetflow::tasks::{BuildTask, TaskRegistry};
use assetflow::types::TaskId;
use assetflow_test_utils::{init_tracing, with_timeout, RecordingNotifier, SiteBuilder};

type TestResult = Result<(), Box<dyn Error>>;

async fn serve(root: &std::path::Path, hub: ReloadHub) -> Result<SocketAddr, Box<dyn Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(root, hub);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    Ok(addr)
}

async fn get(addr: SocketAddr, path: &str) -> Result<String, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[tokio::test]
async fn html_pages_get_the_reload_client() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new()
        .output("index.html", "<html><body><h1>home</h1></body></html>")
        .output("css/site.css", "body{color:red}")
        .build();
    let addr = serve(&site.paths().output_root, ReloadHub::new()).await?;

    let page = with_timeout(get(addr, "/index.html")).await?;
    assert!(page.starts_with("HTTP/1.1 200"), "{page}");
    assert!(
        page.contains(&format!("<h1>home</h1>{CLIENT_SCRIPT}</body>")),
        "{page}"
    );

    let root = with_timeout(get(addr, "/")).await?;
    assert!(root.contains(CLIENT_SCRIPT), "{root}");

    let css = with_timeout(get(addr, "/css/site.css")).await?;
    assert!(css.starts_with("HTTP/1.1 200"), "{css}");
    assert!(css.ends_with("body{color:red}"), "{css}");
    assert!(!css.contains("EventSource"));

    let missing = with_timeout(get(addr, "/nope.html")).await?;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");
    assert!(!missing.contains("EventSource"));

    Ok(())
}

#[tokio::test]
async fn reload_signal_reaches_event_stream() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new().build();
    let hub = ReloadHub::new();
    let addr = serve(&site.paths().output_root, hub.clone()).await?;

    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {LIVERELOAD_PATH} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut seen = String::new();
    let mut buf = [0u8; 1024];
    with_timeout(async {
        while !seen.contains("text/event-stream") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed early: {seen}");
            seen.push_str(&String::from_utf8_lossy(&buf[..n]));
        }
    })
    .await;

    hub.reload(vec!["public/index.html".into()]);

    with_timeout(async {
        while !seen.contains("event: reload") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed early: {seen}");
            seen.push_str(&String::from_utf8_lossy(&buf[..n]));
        }
    })
    .await;
    assert!(seen.contains("public/index.html"), "{seen}");

    Ok(())
}

#[tokio::test]
async fn dev_server_reports_progress_once_bound() -> TestResult {
    init_tracing();

    let site = SiteBuilder::new().build();
    let ctx = Arc::new(site.context(Arc::new(RecordingNotifier::new())));
    let (tx, mut rx) = mpsc::channel(4);

    let server_ctx = Arc::clone(&ctx);
    let handle = tokio::spawn(async move {
        DevServer
            .execute(&server_ctx, ProgressReporter::new(TaskId::DevServer, tx))
            .await
    });

    match with_timeout(rx.recv()).await {
        Some(RuntimeEvent::TaskProgressed { task }) => assert_eq!(task, TaskId::DevServer),
        other => panic!("expected progress, got {other:?}"),
    }
    assert!(!handle.is_finished(), "server should keep running");
    handle.abort();

    Ok(())
}

#[tokio::test]
async fn port_in_use_aborts_the_pipeline() -> TestResult {
    init_tracing();

    let taken = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = taken.local_addr()?.port();
    let site = SiteBuilder::new().port(port).build();

    let result = with_timeout(assetflow::run_pipeline(
        Pipeline::Default,
        site.context(Arc::new(RecordingNotifier::new())),
        TaskRegistry::standard(),
        RuntimeOptions {
            exit_when_idle: true,
        },
    ))
    .await;

    match result {
        Err(PipelineError::ServerStart(message)) => assert!(message.contains(&port.to_string()), "{message}"),
        other => panic!("expected ServerStart error, got {other:?}"),
    }
    drop(taken);

    Ok(())
}

#[test]
fn client_goes_before_last_closing_body() {
    let html = "<html><BODY><p></p></BODY></html>";
    assert_eq!(
        inject_client(html),
        format!("<html><BODY><p></p>{CLIENT_SCRIPT}</BODY></html>")
    );

    let fragment = "<p>no body</p>";
    assert_eq!(inject_client(fragment), format!("{fragment}{CLIENT_SCRIPT}"));
}
