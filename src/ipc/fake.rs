//! In-process stand-in for the compositor control socket, used by tests

use std::collections::HashMap;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

static NEXT_SOCKET: AtomicUsize = AtomicUsize::new(0);

/// Fresh socket path in the temp dir that nothing listens on yet
pub fn unique_socket_path() -> PathBuf {
    let n = NEXT_SOCKET.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("hyprborder-test-{}-{n}.sock", std::process::id()))
}

#[derive(Default)]
struct Shared {
    lines: Mutex<Vec<String>>,
    options: Mutex<HashMap<String, String>>,
    connections: Mutex<Vec<UnixStream>>,
    accepted: AtomicUsize,
    stall_queries: AtomicBool,
    stop: AtomicBool,
}

/// Records every `keyword` line it receives and answers `getoption` from a table
pub struct FakeCompositor {
    path: PathBuf,
    shared: Arc<Shared>,
    accept_thread: Option<JoinHandle<()>>,
}

impl FakeCompositor {
    pub fn start() -> Self {
        Self::start_at(unique_socket_path())
    }

    pub fn start_at(path: PathBuf) -> Self {
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).expect("bind fake compositor socket");
        listener.set_nonblocking(true).expect("nonblocking listener");

        let shared = Arc::new(Shared::default());
        let accept_shared = Arc::clone(&shared);
        let accept_thread = thread::spawn(move || accept_loop(listener, accept_shared));

        Self {
            path,
            shared,
            accept_thread: Some(accept_thread),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reply sent for `getoption <variable>`
    pub fn set_option(&self, variable: &str, reply: &str) {
        self.shared
            .options
            .lock()
            .unwrap()
            .insert(variable.to_string(), reply.to_string());
    }

    /// Leave `getoption` requests unanswered until the fake is dropped
    pub fn stall_queries(&self) {
        self.shared.stall_queries.store(true, Ordering::Release);
    }

    /// Connections accepted so far, including one-shot requests
    pub fn connections_accepted(&self) -> usize {
        self.shared.accepted.load(Ordering::Acquire)
    }

    pub fn lines(&self) -> Vec<String> {
        self.shared.lines.lock().unwrap().clone()
    }

    /// Block (up to two seconds) until at least `count` lines arrived
    pub fn wait_for_lines(&self, count: usize) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let lines = self.lines();
            if lines.len() >= count || Instant::now() > deadline {
                return lines;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Hang up every open client connection, as a compositor restart would
    pub fn drop_connections(&self) {
        for stream in self.shared.connections.lock().unwrap().drain(..) {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }
}

impl Drop for FakeCompositor {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }
        self.drop_connections();
        let _ = std::fs::remove_file(&self.path);
    }
}

fn accept_loop(listener: UnixListener, shared: Arc<Shared>) {
    while !shared.stop.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((stream, _)) => {
                shared.accepted.fetch_add(1, Ordering::AcqRel);
                let _ = stream.set_nonblocking(false);
                if let Ok(clone) = stream.try_clone() {
                    shared.connections.lock().unwrap().push(clone);
                }
                let conn_shared = Arc::clone(&shared);
                thread::spawn(move || serve(stream, conn_shared));
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(Duration::from_millis(2)),
            Err(_) => break,
        }
    }
}

fn serve(stream: UnixStream, shared: Arc<Shared>) {
    let Ok(mut writer) = stream.try_clone() else {
        return;
    };
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let Ok(line) = line else {
            return;
        };
        if let Some(variable) = line.strip_prefix("getoption ") {
            if shared.stall_queries.load(Ordering::Acquire) {
                while !shared.stop.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_millis(10));
                }
                return;
            }
            let reply = shared
                .options
                .lock()
                .unwrap()
                .get(variable.trim())
                .cloned()
                .unwrap_or_else(|| "no such option".to_string());
            let _ = writer.write_all(reply.as_bytes());
            let _ = writer.shutdown(std::net::Shutdown::Both);
            return;
        }
        shared.lines.lock().unwrap().push(line);
        let _ = writer.write_all(b"ok");
    }
}
