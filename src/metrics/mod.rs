//! StatsD metrics client.
//!
//! A [`MetricsClient`] is either live (backed by a `cadence` UDP client) or a
//! no-op that drops everything. Consumers call the same methods on both, so
//! they never need to check whether metrics are enabled.

mod tags;

pub use tags::TagSet;

use std::fmt;
use std::net::{Ipv6Addr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use cadence::prelude::*;
use cadence::{StatsdClient, UdpMetricSink};
use tracing::warn;

use crate::error::ClientInitError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8125;

const CLIENT_NAME: &str = "metrics";

/// Handle for emitting metrics.
#[derive(Clone, Default)]
pub enum MetricsClient {
    Live(Arc<StatsdClient>),
    #[default]
    NoOp,
}

impl MetricsClient {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    /// Adds one to a counter.
    pub fn incr(&self, key: &str) {
        self.count(key, 1);
    }

    /// Adds `value` to a counter. Send failures are logged and dropped.
    pub fn count(&self, key: &str, value: i64) {
        if let Self::Live(client) = self {
            if let Err(err) = client.count(key, value) {
                warn!(key, error = %err, "dropped counter");
            }
        }
    }

    /// Sets a gauge.
    pub fn gauge(&self, key: &str, value: u64) {
        if let Self::Live(client) = self {
            if let Err(err) = client.gauge(key, value) {
                warn!(key, error = %err, "dropped gauge");
            }
        }
    }

    /// Records a timing in milliseconds.
    pub fn timing(&self, key: &str, elapsed: Duration) {
        if let Self::Live(client) = self {
            let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            if let Err(err) = client.time(key, millis) {
                warn!(key, error = %err, "dropped timing");
            }
        }
    }
}

impl fmt::Debug for MetricsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(_) => f.write_str("MetricsClient::Live"),
            Self::NoOp => f.write_str("MetricsClient::NoOp"),
        }
    }
}

/// A StatsD client that has been constructed but not yet initialized.
///
/// Construction only validates the address. [`init`](Self::init) binds the
/// socket and resolves the host, and is the step that yields a live client.
#[derive(Debug, Clone)]
pub struct StatsdConfig {
    host: String,
    port: u16,
    namespace: String,
    tags: TagSet,
}

impl StatsdConfig {
    /// Creates a client config for `addr`.
    ///
    /// An empty address means `127.0.0.1:8125`. A missing port means `8125`.
    pub fn new(addr: &str) -> Result<Self, ClientInitError> {
        let (host, port) = split_addr(addr)?;
        Ok(Self {
            host,
            port,
            namespace: String::new(),
            tags: TagSet::new(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Prefix for every metric name. A trailing `.` is added when missing.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    /// Tags attached to every metric.
    pub fn set_tags(&mut self, tags: TagSet) {
        self.tags = tags;
    }

    /// Binds the UDP socket and returns a live client.
    pub fn init(self) -> Result<MetricsClient, ClientInitError> {
        let bind_addr = if self.host.parse::<Ipv6Addr>().is_ok() {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };
        let socket =
            UdpSocket::bind(bind_addr).map_err(|e| ClientInitError::new(CLIENT_NAME, e))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| ClientInitError::new(CLIENT_NAME, e))?;

        let sink = UdpMetricSink::from((self.host.as_str(), self.port), socket)
            .map_err(|e| ClientInitError::new(CLIENT_NAME, e))?;

        let mut builder = StatsdClient::builder(&self.namespace, sink);
        for (key, value) in self.tags.iter() {
            builder = builder.with_tag(key, value);
        }

        Ok(MetricsClient::Live(Arc::new(builder.build())))
    }
}

fn split_addr(addr: &str) -> Result<(String, u16), ClientInitError> {
    if addr.is_empty() {
        return Ok((DEFAULT_HOST.to_string(), DEFAULT_PORT));
    }

    // [v6]:port
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| ClientInitError::new(CLIENT_NAME, format!("invalid address '{addr}'")))?;
        let port = match tail {
            "" => DEFAULT_PORT,
            tail => match tail.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None => {
                    return Err(ClientInitError::new(
                        CLIENT_NAME,
                        format!("invalid address '{addr}'"),
                    ))
                }
            },
        };
        return Ok((host.to_string(), port));
    }

    match addr.rsplit_once(':') {
        // A bare IPv6 literal has several colons and no port.
        Some((host, _)) if host.contains(':') => Ok((addr.to_string(), DEFAULT_PORT)),
        Some((host, port)) => {
            let host = if host.is_empty() { DEFAULT_HOST } else { host };
            Ok((host.to_string(), parse_port(port)?))
        }
        None => Ok((addr.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16, ClientInitError> {
    port.parse::<u16>()
        .map_err(|e| ClientInitError::new(CLIENT_NAME, format!("invalid port '{port}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receiver() -> (UdpSocket, String) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        (socket, addr)
    }

    fn recv(socket: &UdpSocket) -> String {
        let mut buf = [0u8; 1024];
        let n = socket.recv(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[test]
    fn test_split_addr_defaults() {
        let config = StatsdConfig::new("").unwrap();
        assert_eq!((config.host(), config.port()), (DEFAULT_HOST, DEFAULT_PORT));

        let config = StatsdConfig::new("statsd.internal").unwrap();
        assert_eq!((config.host(), config.port()), ("statsd.internal", DEFAULT_PORT));

        let config = StatsdConfig::new(":9125").unwrap();
        assert_eq!((config.host(), config.port()), (DEFAULT_HOST, 9125));
    }

    #[test]
    fn test_split_addr_ipv6() {
        let config = StatsdConfig::new("[::1]:9125").unwrap();
        assert_eq!((config.host(), config.port()), ("::1", 9125));

        let config = StatsdConfig::new("::1").unwrap();
        assert_eq!((config.host(), config.port()), ("::1", DEFAULT_PORT));
    }

    #[test]
    fn test_invalid_port_fails_construction() {
        let err = StatsdConfig::new("localhost:notaport").unwrap_err();
        assert_eq!(err.client, "metrics");
        assert!(err.to_string().contains("invalid port 'notaport'"));

        assert!(StatsdConfig::new("localhost:70000").is_err());
        assert!(StatsdConfig::new("[::1]9125").is_err());
    }

    #[test]
    fn test_unresolvable_host_fails_init() {
        let config = StatsdConfig::new("statsd.invalid:8125").unwrap();
        assert!(config.init().is_err());
    }

    #[test]
    fn test_live_client_sends_namespaced_tagged_metrics() {
        let (socket, addr) = receiver();

        let mut config = StatsdConfig::new(&addr).unwrap();
        config.set_namespace("svc.");
        config.set_tags(TagSet::from_iter([("application", "svc"), ("team", "core")]));
        let client = config.init().unwrap();
        assert!(client.is_live());

        client.incr("hits");

        let packet = recv(&socket);
        assert!(packet.starts_with("svc.hits:1|c"), "packet: {packet}");
        assert!(packet.contains("application:svc"), "packet: {packet}");
        assert!(packet.contains("team:core"), "packet: {packet}");
    }

    #[test]
    fn test_live_client_gauge_and_timing() {
        let (socket, addr) = receiver();
        let client = StatsdConfig::new(&addr).unwrap().init().unwrap();

        client.gauge("queue.depth", 7);
        assert!(recv(&socket).starts_with("queue.depth:7|g"));

        client.timing("request", Duration::from_millis(250));
        assert!(recv(&socket).starts_with("request:250|ms"));
    }

    #[test]
    fn test_noop_client_drops_everything() {
        let client = MetricsClient::default();

        assert!(!client.is_live());
        client.incr("hits");
        client.gauge("depth", 1);
        client.timing("latency", Duration::from_millis(5));
        assert_eq!(format!("{client:?}"), "MetricsClient::NoOp");
    }
}
