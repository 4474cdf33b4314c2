//! End-to-end relay behaviour over real sockets.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use socket_relay::config::RelayConfig;
use socket_relay::server::RelayServer;
use socket_relay::service::BroadcastRouter;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);
const QUIET_PERIOD: Duration = Duration::from_millis(200);

struct Harness {
    router: BroadcastRouter,
    tcp_addr: SocketAddr,
    http_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    _site: tempfile::TempDir,
}

impl Harness {
    async fn start(liveness_interval: Duration) -> Self {
        let Ok(site) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        if std::fs::write(site.path().join("404.html"), "<p>no such page</p>").is_err() {
            panic!("failed to write 404.html");
        }

        let mut config = RelayConfig::ephemeral(site.path());
        config.liveness_interval = liveness_interval;

        let Ok(server) = RelayServer::bind(config).await else {
            panic!("bind failed");
        };
        let (Ok(tcp_addr), Ok(http_addr)) = (server.tcp_local_addr(), server.http_local_addr())
        else {
            panic!("no local addresses");
        };
        let router = server.router().clone();

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(server.run(async move {
            let _ = rx.await;
        }));

        Self {
            router,
            tcp_addr,
            http_addr,
            shutdown: Some(tx),
            _site: site,
        }
    }

    async fn tcp_client(&self) -> TcpStream {
        let Ok(stream) = TcpStream::connect(self.tcp_addr).await else {
            panic!("tcp connect failed");
        };
        stream
    }

    async fn ws_client(&self) -> WsClient {
        let Ok((stream, _)) = connect_async(format!("ws://{}/", self.http_addr)).await else {
            panic!("ws connect failed");
        };
        stream
    }

    async fn wait_for_pools(&self, tcp: usize, ws: usize) {
        for _ in 0..300 {
            if self.router.tcp_pool().len().await == tcp && self.router.ws_pool().len().await == ws
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("pools never reached tcp={tcp} ws={ws}");
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn next_binary(client: &mut WsClient) -> Vec<u8> {
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, client.next()).await {
            Ok(Some(Ok(Message::Binary(data)))) => return data.to_vec(),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
            other => panic!("expected a binary message, got {other:?}"),
        }
    }
}

async fn assert_ws_quiet(client: &mut WsClient) {
    let next = tokio::time::timeout(QUIET_PERIOD, client.next()).await;
    assert!(next.is_err(), "unexpected extra message: {next:?}");
}

async fn read_exactly(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    match tokio::time::timeout(RECV_TIMEOUT, stream.read_exact(&mut buf)).await {
        Ok(Ok(_)) => buf,
        other => panic!("tcp read failed: {other:?}"),
    }
}

async fn assert_tcp_quiet(stream: &mut TcpStream) {
    let mut buf = [0u8; 16];
    let read = tokio::time::timeout(QUIET_PERIOD, stream.read(&mut buf)).await;
    assert!(read.is_err(), "unexpected tcp data: {read:?}");
}

#[tokio::test]
async fn tcp_bytes_fan_out_to_every_ws_peer() {
    let relay = Harness::start(Duration::from_secs(30)).await;
    let mut a = relay.tcp_client().await;
    let mut x = relay.ws_client().await;
    let mut y = relay.ws_client().await;
    relay.wait_for_pools(1, 2).await;

    assert!(a.write_all(b"hello").await.is_ok());

    assert_eq!(next_binary(&mut x).await, b"hello");
    assert_eq!(next_binary(&mut y).await, b"hello");
    assert_ws_quiet(&mut x).await;
    assert_ws_quiet(&mut y).await;
}

#[tokio::test]
async fn ws_message_fans_out_to_connected_tcp_peers_only() {
    let relay = Harness::start(Duration::from_secs(30)).await;
    let mut a = relay.tcp_client().await;
    let mut b = relay.tcp_client().await;
    let mut x = relay.ws_client().await;
    relay.wait_for_pools(2, 1).await;

    assert!(x.send(Message::text("ping")).await.is_ok());

    assert_eq!(read_exactly(&mut a, 4).await, b"ping");
    assert_eq!(read_exactly(&mut b, 4).await, b"ping");

    let mut late = relay.tcp_client().await;
    relay.wait_for_pools(3, 1).await;
    assert_tcp_quiet(&mut late).await;
    assert_tcp_quiet(&mut a).await;
}

#[tokio::test]
async fn binary_ws_message_is_relayed_verbatim() {
    let relay = Harness::start(Duration::from_secs(30)).await;
    let mut a = relay.tcp_client().await;
    let mut x = relay.ws_client().await;
    relay.wait_for_pools(1, 1).await;

    let payload = vec![0u8, 159, 146, 150, 255];
    assert!(x.send(Message::binary(payload.clone())).await.is_ok());
    assert_eq!(read_exactly(&mut a, payload.len()).await, payload);
}

#[tokio::test]
async fn missing_asset_returns_custom_404() {
    let relay = Harness::start(Duration::from_secs(30)).await;

    let Ok(response) = reqwest::get(format!("http://{}/missing.html", relay.http_addr)).await
    else {
        panic!("http request failed");
    };
    assert_eq!(response.status().as_u16(), 404);
    let Ok(body) = response.text().await else {
        panic!("body read failed");
    };
    assert_eq!(body, "<p>no such page</p>");
}

#[tokio::test]
async fn payload_sent_before_disconnect_is_still_delivered() {
    let relay = Harness::start(Duration::from_secs(30)).await;
    let mut a = relay.tcp_client().await;
    let mut x = relay.ws_client().await;
    let mut y = relay.ws_client().await;
    relay.wait_for_pools(1, 2).await;

    assert!(a.write_all(b"bye").await.is_ok());
    assert!(a.shutdown().await.is_ok());
    drop(a);

    assert_eq!(next_binary(&mut x).await, b"bye");
    assert_eq!(next_binary(&mut y).await, b"bye");
    relay.wait_for_pools(0, 2).await;
}

#[tokio::test]
async fn closed_ws_peer_leaves_pool() {
    let relay = Harness::start(Duration::from_secs(30)).await;
    let mut x = relay.ws_client().await;
    let _y = relay.ws_client().await;
    relay.wait_for_pools(0, 2).await;

    assert!(x.close(None).await.is_ok());
    relay.wait_for_pools(0, 1).await;
}

#[tokio::test]
async fn unresponsive_ws_peer_is_dropped_by_liveness_probe() {
    let relay = Harness::start(Duration::from_millis(300)).await;

    // Responsive client: keeps reading, so pings get answered.
    let mut responsive = relay.ws_client().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(Ok(msg)) = responsive.next().await {
            if let Message::Binary(data) = msg {
                let _ = seen_tx.send(data.to_vec());
            }
        }
    });

    // Silent client: never reads, so never pongs.
    let _silent = relay.ws_client().await;
    relay.wait_for_pools(0, 2).await;

    relay.wait_for_pools(0, 1).await;

    let mut a = relay.tcp_client().await;
    relay.wait_for_pools(1, 1).await;
    assert!(a.write_all(b"still here").await.is_ok());

    let received = tokio::time::timeout(RECV_TIMEOUT, seen_rx.recv()).await;
    assert_eq!(received.ok().flatten(), Some(b"still here".to_vec()));
}

#[tokio::test]
async fn stalled_unresponsive_ws_peer_has_its_socket_closed() {
    let relay = Harness::start(Duration::from_millis(300)).await;

    // Never reads: no pongs, and its receive window fills up.
    let mut stalled = relay.ws_client().await;
    let mut a = relay.tcp_client().await;
    relay.wait_for_pools(1, 1).await;

    let writer = tokio::spawn(async move {
        let chunk = vec![0x5au8; 64 * 1024];
        for _ in 0..256 {
            if a.write_all(&chunk).await.is_err() {
                break;
            }
        }
        a
    });

    relay.wait_for_pools(1, 0).await;

    // Whatever was buffered before the forced close can still be read, but
    // the stream has to end instead of waiting on a server that stays open.
    let mut ended = false;
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, stalled.next()).await {
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(_)) | None) => {
                ended = true;
                break;
            }
            Err(_) => break,
        }
    }
    writer.abort();
    assert!(ended, "server kept the stalled ws socket open after dropping the peer");
}
