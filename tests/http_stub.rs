//! End-to-end tests against a local HTTP stub of the catalog
//!
//! The stub serves a listing page, answers HEAD and GET for two files, and
//! only serves file requests that carry the session cookie from the jar.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use audiovault_fetcher::app::{
    fetch_results, CatalogClient, ClientConfig, DownloadStatus, Ledger, ProgressReporter,
    ScriptedPrompt,
};
use audiovault_fetcher::cli::{run_search_workflow, WorkflowPaths};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const EPISODE_BODY: &[u8] = b"hello world";

const LISTING: &str = r#"<html><body>
<table>
  <thead><tr><th>ID</th><th>Name</th><th>Download</th></tr></thead>
  <tbody>
    <tr><td>101</td><td>Demo Episode One</td><td><a href="/files/ep1">Download</a></td></tr>
    <tr><td>102</td><td>Demo Episode Two</td><td><a href="/files/ep2">Download</a></td></tr>
  </tbody>
</table>
</body></html>"#;

type RequestLog = Arc<Mutex<Vec<String>>>;

struct StubResponse {
    status: &'static str,
    headers: Vec<(&'static str, String)>,
    body: Vec<u8>,
}

impl StubResponse {
    fn new(status: &'static str, body: &[u8]) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn to_bytes(&self, include_body: bool) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        if include_body {
            bytes.extend_from_slice(&self.body);
        }
        bytes
    }
}

fn route(method: &str, target: &str, has_session: bool) -> StubResponse {
    if target.starts_with("/shows?") {
        return StubResponse::new("200 OK", LISTING.as_bytes())
            .header("Content-Type", "text/html; charset=utf-8");
    }
    if target.starts_with("/broken") {
        return StubResponse::new("500 Internal Server Error", b"");
    }
    if target.starts_with("/files/") && !has_session {
        return StubResponse::new("403 Forbidden", b"");
    }

    match (method, target) {
        (_, "/files/ep1") => StubResponse::new("200 OK", EPISODE_BODY)
            .header("Content-Type", "audio/mpeg")
            .header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT")
            .header("Content-Disposition", "attachment; filename=\"ep1.mp3\""),
        _ => StubResponse::new("404 Not Found", b""),
    }
}

async fn spawn_catalog() -> (SocketAddr, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let server_log = Arc::clone(&log);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = Arc::clone(&server_log);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buffer = [0u8; 2048];
                loop {
                    let read = socket.read(&mut buffer).await.unwrap_or(0);
                    if read == 0 {
                        break;
                    }
                    request.extend_from_slice(&buffer[..read]);
                    if request.windows(4).any(|window| window == b"\r\n\r\n") {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&request).to_string();
                let mut request_line = request.lines().next().unwrap_or_default().split(' ');
                let method = request_line.next().unwrap_or_default().to_string();
                let target = request_line.next().unwrap_or_default().to_string();
                let has_session = request.lines().any(|line| {
                    line.to_ascii_lowercase().starts_with("cookie:")
                        && line.contains("session=abc123")
                });

                log.lock().unwrap().push(format!("{} {}", method, target));

                let response = route(&method, &target, has_session);
                let _ = socket
                    .write_all(&response.to_bytes(method != "HEAD"))
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, log)
}

fn write_cookie_file(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("cookies.txt");
    std::fs::write(
        &path,
        "# Netscape HTTP Cookie File\n127.0.0.1\tFALSE\t/\tFALSE\t0\tsession\tabc123\n",
    )
    .unwrap();
    path
}

fn client_for(addr: SocketAddr, path: &str, cookie_file: &Path) -> CatalogClient {
    let search_url = Url::parse(&format!("http://{}{}", addr, path)).unwrap();
    CatalogClient::with_search_url(&ClientConfig::default(), cookie_file, search_url).unwrap()
}

#[tokio::test]
async fn test_search_keeps_links_and_client_resolves_them() {
    let temp_dir = TempDir::new().unwrap();
    let (addr, log) = spawn_catalog().await;
    let client = client_for(addr, "/shows", &temp_dir.path().join("missing.txt"));

    let results = fetch_results(&client, "demo").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "101");
    assert_eq!(results[0].name, "Demo Episode One");
    assert_eq!(results[0].download_link, "/files/ep1");
    assert_eq!(
        client.resolve_link(&results[0].download_link),
        format!("http://{}/files/ep1", addr)
    );
    assert_eq!(
        log.lock().unwrap().clone(),
        vec!["GET /shows?search=demo".to_string()]
    );
}

#[tokio::test]
async fn test_search_error_status_gives_no_results() {
    let temp_dir = TempDir::new().unwrap();
    let (addr, _log) = spawn_catalog().await;
    let client = client_for(addr, "/broken", &temp_dir.path().join("missing.txt"));

    assert!(fetch_results(&client, "demo").await.is_empty());
}

#[tokio::test]
async fn test_full_workflow_against_stub() {
    let temp_dir = TempDir::new().unwrap();
    let (addr, log) = spawn_catalog().await;
    let cookie_file = write_cookie_file(temp_dir.path());
    let client = client_for(addr, "/shows", &cookie_file);

    let paths = WorkflowPaths {
        output_csv: temp_dir.path().join("results.csv"),
        download_root: temp_dir.path().join("download"),
    };
    let mut prompt = ScriptedPrompt::new(["1"]);

    let summary = run_search_workflow(
        &client,
        &["demo".to_string()],
        &mut prompt,
        &paths,
        &ProgressReporter::hidden(),
    )
    .await
    .unwrap()
    .expect("rows were marked, so the download step runs");

    assert_eq!(summary.success, 1);
    assert_eq!(summary.fail, 1);

    let saved = std::fs::read(paths.download_root.join("demo").join("ep1.mp3")).unwrap();
    assert_eq!(saved, EPISODE_BODY);
    assert!(!paths.download_root.join("demo").join("ep1.mp3.part").exists());

    let ledger = Ledger::load_csv(&paths.output_csv).unwrap();
    let rows = ledger.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].result.download_link, "/files/ep1");
    assert_eq!(rows[0].metadata.filename.as_deref(), Some("ep1.mp3"));
    assert_eq!(
        rows[0].metadata.content_length,
        Some(EPISODE_BODY.len() as u64)
    );
    assert_eq!(rows[0].metadata.content_type.as_deref(), Some("audio/mpeg"));
    assert_eq!(rows[0].downloaded, DownloadStatus::Success);
    assert!(rows[1].metadata.is_empty());
    assert_eq!(rows[1].downloaded, DownloadStatus::Fail);

    let requests = log.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            "GET /shows?search=demo",
            "HEAD /files/ep1",
            "HEAD /files/ep2",
            "GET /files/ep1",
            "GET /files/ep2",
        ]
    );
}

#[tokio::test]
async fn test_nothing_marked_skips_downloads() {
    let temp_dir = TempDir::new().unwrap();
    let (addr, log) = spawn_catalog().await;
    let cookie_file = write_cookie_file(temp_dir.path());
    let client = client_for(addr, "/shows", &cookie_file);

    let paths = WorkflowPaths {
        output_csv: temp_dir.path().join("results.csv"),
        download_root: temp_dir.path().join("download"),
    };
    let mut prompt = ScriptedPrompt::new(["2"]);

    let summary = run_search_workflow(
        &client,
        &["demo".to_string()],
        &mut prompt,
        &paths,
        &ProgressReporter::hidden(),
    )
    .await
    .unwrap();

    assert!(summary.is_none());
    assert!(!paths.download_root.exists());
    assert!(log
        .lock()
        .unwrap()
        .iter()
        .all(|request| !request.starts_with("GET /files")));

    let ledger = Ledger::load_csv(&paths.output_csv).unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(!ledger.any_marked());
}

#[tokio::test]
async fn test_missing_session_leaves_metadata_empty() {
    let temp_dir = TempDir::new().unwrap();
    let (addr, _log) = spawn_catalog().await;
    let client = client_for(addr, "/shows", &temp_dir.path().join("missing.txt"));

    let mut ledger = Ledger::from_results(fetch_results(&client, "demo").await);
    audiovault_fetcher::app::add_metadata_to_ledger(
        &mut ledger,
        &client,
        &ProgressReporter::hidden(),
    )
    .await;

    assert_eq!(ledger.len(), 2);
    assert!(ledger.rows().iter().all(|row| row.metadata.is_empty()));
}
