//! Local HTTP/1.1 listener that stands in for OpenAI or S3 in tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub enum StubReply {
    /// Answer with this status and body, then close.
    Respond(u16, String),
    /// Read the whole request and close without answering.
    Hangup,
}

pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serves every connection with `reply(n)`, where `n` counts requests from 0.
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(usize) -> StubReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let reply = Arc::new(reply);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let seen = seen.clone();
                let reply = reply.clone();
                tokio::spawn(async move { handle(stream, seen, reply.as_ref()).await });
            }
        });

        Self { url, requests }
    }

    /// Base URL on which nothing is listening.
    pub async fn unused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    /// Request lines (`METHOD /path`) in arrival order, query strings dropped.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    mut stream: TcpStream,
    seen: Arc<Mutex<Vec<String>>>,
    reply: &(dyn Fn(usize) -> StubReply + Send + Sync),
) {
    let Some((request_line, content_length, mut body_read)) = read_head(&mut stream).await else {
        return;
    };

    let hit = {
        let mut seen = seen.lock().unwrap();
        seen.push(request_line);
        seen.len() - 1
    };

    match reply(hit) {
        StubReply::Hangup => {
            let mut buf = [0u8; 4096];
            while body_read < content_length {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => body_read += n,
                }
            }
        }
        StubReply::Respond(status, body) => {
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            if stream.write_all(response.as_bytes()).await.is_err() {
                return;
            }
            // Drain whatever the client still sends so closing does not reset it.
            let mut buf = [0u8; 4096];
            let _ = tokio::time::timeout(Duration::from_secs(2), async {
                while let Ok(n) = stream.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            })
            .await;
        }
    }
}

/// Reads up to the end of the headers. Returns the request line without its
/// query and HTTP version, the declared body length and the body bytes
/// already consumed.
async fn read_head(stream: &mut TcpStream) -> Option<(String, usize, usize)> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?.split('?').next()?;

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0);

    Some((format!("{method} {path}"), content_length, data.len() - head_end))
}
