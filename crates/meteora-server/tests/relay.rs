/// End-to-end: run the real router on a loopback port and talk to it over
/// WebSocket the way a client would.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use meteora_crypto::compute_id;
use meteora_crypto::keys::{generate_signing_key, seal};
use meteora_db::Database;
use meteora_server::router;
use meteora_types::{Content, Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_relay() -> (SocketAddr, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(db.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, db)
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}{path}")).await.unwrap();
    ws
}

async fn send(ws: &mut Client, message: &Message) {
    ws.send(WsMessage::text(serde_json::to_string(message).unwrap()))
        .await
        .unwrap();
}

/// Next text frame parsed as a page, or `None` once the server has closed.
async fn next_page(ws: &mut Client) -> Option<Vec<Message>> {
    while let Some(frame) = ws.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => return Some(serde_json::from_str(text.as_str()).unwrap()),
            Ok(WsMessage::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

#[tokio::test]
async fn submit_then_fetch() {
    let (addr, db) = spawn_relay().await;
    let key = generate_signing_key();

    let mut ws = connect(addr, "/ws/send").await;
    let hello = seal(Content::new(1700000000, "hello"), &key).unwrap();
    send(&mut ws, &hello).await;

    let page = next_page(&mut ws).await.unwrap();
    assert_eq!(page[0].content.text, "hello");
    assert_eq!(page[0].id, compute_id(&Content::new(1700000000, "hello")).unwrap());

    send(&mut ws, &seal(Content::new(1700000001, "world"), &key).unwrap()).await;
    let page = next_page(&mut ws).await.unwrap();
    assert_eq!(page.iter().map(|m| m.content.text.as_str()).collect::<Vec<_>>(), vec!["world", "hello"]);
    ws.close(None).await.unwrap();

    let mut fetcher = connect(addr, "/ws/fetch/?limit=1&offset=1").await;
    let page = next_page(&mut fetcher).await.unwrap();
    assert_eq!(page, vec![hello]);
    assert!(next_page(&mut fetcher).await.is_none());

    assert_eq!(db.count_messages().unwrap(), 2);
}

#[tokio::test]
async fn bad_signature_gets_no_reply() {
    let (addr, db) = spawn_relay().await;

    let mut forged = seal(Content::new(1, "trust me"), &generate_signing_key()).unwrap();
    forged.pubkey = seal(Content::new(1, "trust me"), &generate_signing_key()).unwrap().pubkey;

    let mut ws = connect(addr, "/ws/send").await;
    send(&mut ws, &forged).await;

    assert!(next_page(&mut ws).await.is_none());
    assert_eq!(db.count_messages().unwrap(), 0);
}

#[tokio::test]
async fn fetch_without_slash_and_bad_params() {
    let (addr, db) = spawn_relay().await;
    for ts in 0..3 {
        db.insert_message(&seal(Content::new(ts, "m"), &generate_signing_key()).unwrap())
            .unwrap();
    }

    let mut fetcher = connect(addr, "/ws/fetch?limit=zero&offset=-3").await;
    let page = next_page(&mut fetcher).await.unwrap();
    assert_eq!(page.iter().map(|m| m.content.created_at).collect::<Vec<_>>(), vec![2, 1, 0]);
}
