//! In-process stand-in for the generation service.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sql_chatbox::{CatalogStore, ChatboxConfig, TableDescriptor};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct StubRequest {
    pub head: String,
    pub body: String,
}

impl StubRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

pub enum Reply {
    /// Status plus a body written in the given pieces.
    Chunks(u16, Vec<String>),
    /// Accept the request and never answer.
    Hang,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Chunks(200, vec![body.into()])
    }
}

pub struct StubServer {
    pub config: ChatboxConfig,
    pub requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubServer {
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn spawn_stub<F>(handler: F) -> StubServer
where
    F: Fn(&StubRequest) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let handler = handler.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                serve(stream, handler.as_ref(), &seen).await;
            });
        }
    });

    let config = ChatboxConfig {
        endpoint: format!("http://{}/api/generate", addr),
        request_timeout: Duration::from_secs(10),
        ..ChatboxConfig::default()
    };

    StubServer { config, requests }
}

/// An endpoint on a port nothing listens on.
pub async fn refused_config() -> ChatboxConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    ChatboxConfig {
        endpoint: format!("http://{}/api/generate", addr),
        request_timeout: Duration::from_secs(5),
        ..ChatboxConfig::default()
    }
}

async fn serve<F>(mut stream: TcpStream, handler: &F, seen: &Mutex<Vec<StubRequest>>)
where
    F: Fn(&StubRequest) -> Reply,
{
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let reply = handler(&request);
    seen.lock().unwrap().push(request);

    match reply {
        Reply::Hang => tokio::time::sleep(Duration::from_secs(30)).await,
        Reply::Chunks(status, chunks) => {
            let len: usize = chunks.iter().map(String::len).sum();
            let head = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n",
                status, len
            );
            if stream.write_all(head.as_bytes()).await.is_err() {
                return;
            }
            for chunk in chunks {
                if stream.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
                let _ = stream.flush().await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            let _ = stream.shutdown().await;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<StubRequest> {
    let mut buf = Vec::new();
    let mut scratch = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut scratch).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&scratch[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut request = StubRequest {
        head,
        body: String::new(),
    };
    let content_length = request
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = stream.read(&mut scratch).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&scratch[..n]);
    }

    let body = &buf[body_start..body_start + content_length];
    request.body = String::from_utf8_lossy(body).into_owned();
    Some(request)
}

pub struct StaticCatalog(pub Vec<TableDescriptor>);

#[async_trait]
impl CatalogStore for StaticCatalog {
    async fn fetch_tables(&self) -> sql_chatbox::Result<Vec<TableDescriptor>> {
        Ok(self.0.clone())
    }
}

/// Split `text` into pieces of at most `size` bytes (ASCII input only).
pub fn pieces(text: &str, size: usize) -> Vec<String> {
    text.as_bytes()
        .chunks(size)
        .map(|c| String::from_utf8(c.to_vec()).unwrap())
        .collect()
}
