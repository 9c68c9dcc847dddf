// Network reachability signals.
// Polled before each fetch, off the async executor, to choose between network and cache.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;

/// Answers "is the network reachable right now?". May block; callers run it on the blocking pool.
pub trait Reachability: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// A flag set by hand: forced offline mode, tests.
#[derive(Debug)]
pub struct FixedReachability {
    online: AtomicBool,
}

impl FixedReachability {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Reachability for FixedReachability {
    fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Wraps another signal and reports unreachable while forced offline.
#[derive(Debug)]
pub struct OfflineSwitch<R> {
    inner: R,
    forced_offline: AtomicBool,
}

impl<R: Reachability> OfflineSwitch<R> {
    pub fn new(inner: R, forced_offline: bool) -> Self {
        Self {
            inner,
            forced_offline: AtomicBool::new(forced_offline),
        }
    }

    pub fn set_forced_offline(&self, offline: bool) {
        self.forced_offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_forced_offline(&self) -> bool {
        self.forced_offline.load(Ordering::SeqCst)
    }
}

impl<R: Reachability> Reachability for OfflineSwitch<R> {
    fn is_reachable(&self) -> bool {
        !self.is_forced_offline() && self.inner.is_reachable()
    }
}

/// Reachable when a TCP connection to `host` succeeds within `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    timeout: Duration,
}

impl TcpProbe {
    /// `host` is `host:port`.
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }
}

impl Reachability for TcpProbe {
    fn is_reachable(&self) -> bool {
        let addrs = match self.host.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!(host = %self.host, error = %e, "probe host did not resolve");
                return false;
            }
        };

        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        debug!(host = %self.host, "probe could not connect");
        false
    }
}
