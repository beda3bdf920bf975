#![allow(dead_code)]

use reqwest::Url;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use wirebind::{RequestScope, ScopeGuard};
use wirebind_httpbin_server::serve_with_listener;

// --- Test Setup: Httpbin Server ---

/// Starts the httpbin server on the current runtime.
pub async fn start_server() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_with_listener(listener));
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Starts the httpbin server on a dedicated runtime thread, for blocking
/// clients that must not run inside a runtime themselves.
pub fn start_server_thread() -> Url {
    let (addr_tx, addr_rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            addr_tx.send(listener.local_addr().unwrap()).unwrap();
            let _ = serve_with_listener(listener).await;
        });
    });

    let addr = addr_rx.recv().unwrap();
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

// --- Test Setup: Request Scope ---

/// Counts scope entries and the guards still alive.
#[derive(Debug, Default, Clone)]
pub struct CountingScope {
    pub entered: Arc<AtomicUsize>,
    pub active: Arc<AtomicUsize>,
}

struct CountingGuard(Arc<AtomicUsize>);

impl Drop for CountingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestScope for CountingScope {
    fn enter(&self, _method: &str) -> ScopeGuard {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        Box::new(CountingGuard(Arc::clone(&self.active)))
    }
}

impl CountingScope {
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}
