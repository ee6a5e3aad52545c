//! Remote control via Unix socket
//!
//! Accepts one command per line over a Unix socket and hands them to the
//! main loop as if the matching keys were pressed.

use std::io::{self, BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::input::Command;

pub const SOCKET_PATH: &str = "/tmp/aquarium.sock";

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    path: PathBuf,
    shutdown: Arc<AtomicBool>,
    listener_thread: Option<thread::JoinHandle<()>>,
}

impl Controller {
    /// Listen on [`SOCKET_PATH`]
    pub fn new() -> io::Result<Self> {
        Self::bind(SOCKET_PATH)
    }

    /// Listen on `path`, replacing a stale socket file
    pub fn bind(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_owned();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)?;
        // Non-blocking so the thread can check the shutdown flag
        listener.set_nonblocking(true)?;

        let (sender, receiver) = mpsc::channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || {
            Self::listener_loop(&listener, &sender, &flag);
        });

        Ok(Self {
            receiver,
            path,
            shutdown,
            listener_thread: Some(handle),
        })
    }

    fn listener_loop(listener: &UnixListener, sender: &Sender<Command>, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, &sender);
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    debug!(error = %e, "control socket closed");
                    break;
                }
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: &Sender<Command>) {
        // Accepted streams inherit non-blocking mode on some platforms
        let _ = stream.set_nonblocking(false);
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            match Command::parse(&line) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                }
                None => warn!(line = line.trim(), "unknown control command"),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.listener_thread.take() {
            let _ = handle.join();
        }
        let _ = std::fs::remove_file(&self.path);
    }
}
