// src/server/livereload.rs

//! Live reload: a broadcast hub fed by the bundle task, an SSE endpoint the
//! browser subscribes to, and the client snippet injected into HTML pages.

use std::convert::Infallible;
use std::path::PathBuf;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Path of the SSE endpoint.
pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Inline client: reload the page on every `reload` event.
pub const CLIENT_SCRIPT: &str = "<script>(function(){var es=new EventSource('/__livereload');es.addEventListener('reload',function(){window.location.reload();});})();</script>";

const CHANNEL_CAPACITY: usize = 16;

/// One "output changed" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadSignal {
    pub paths: Vec<PathBuf>,
}

impl ReloadSignal {
    fn describe(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Fan-out point between the tasks that write output and connected browsers.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadSignal>,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadSignal> {
        self.tx.subscribe()
    }

    /// Broadcast a reload naming `paths`; returns how many listeners got it.
    ///
    /// Having no listeners is not an error.
    pub fn reload(&self, paths: Vec<PathBuf>) -> usize {
        match self.tx.send(ReloadSignal { paths }) {
            Ok(n) => n,
            Err(_) => {
                debug!("reload signal sent with no listeners");
                0
            }
        }
    }
}

/// `GET /__livereload`: one `reload` event per signal.
pub async fn reload_events(
    State(hub): State<ReloadHub>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(hub.subscribe()).map(|msg| {
        let data = match msg {
            Ok(signal) => signal.describe(),
            // Lagged: some signals were dropped, a reload is still due.
            Err(_) => String::new(),
        };
        Ok::<_, Infallible>(Event::default().event("reload").data(data))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Insert [`CLIENT_SCRIPT`] before the last `</body>`, or append it.
pub fn inject_client(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + CLIENT_SCRIPT.len());
    if let Some(idx) = html.to_ascii_lowercase().rfind("</body>") {
        out.push_str(&html[..idx]);
        out.push_str(CLIENT_SCRIPT);
        out.push_str(&html[idx..]);
    } else {
        out.push_str(html);
        out.push_str(CLIENT_SCRIPT);
    }
    out
}
