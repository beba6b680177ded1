#![cfg(all(unix, feature = "stream"))]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use wirebridge_channel::{
    Channel, ChannelError, CorrelationId, Frame, FrameKind, ReplySink, Responder, StreamChannel,
    WireCodec,
};

type Delivered = (CorrelationId, Result<Bytes, String>);

fn forwarding_sink(tx: mpsc::UnboundedSender<Delivered>) -> Arc<dyn ReplySink> {
    Arc::new(
        move |id: CorrelationId, reply: wirebridge_channel::Result<Bytes>| {
            let _ = tx.send((id, reply.map_err(|e| e.to_string())));
        },
    )
}

#[tokio::test]
async fn out_of_order_replies_reach_their_own_requests() {
    let (left, right) = UnixStream::pair().unwrap();
    let client = StreamChannel::new(left);
    let server = StreamChannel::new(right);

    // Hold every responder, then answer in reverse order.
    let parked: Arc<Mutex<Vec<(Bytes, Responder)>>> = Arc::new(Mutex::new(Vec::new()));
    let keep = Arc::clone(&parked);
    server.set_message_handler(
        "park",
        Some(Arc::new(move |message: Bytes, responder: Responder| {
            keep.lock().unwrap().push((message, responder));
        })),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ids = Vec::new();
    for n in 0..16u8 {
        let id = client.next_correlation_id();
        client
            .send("park", id, Bytes::from(vec![n]), forwarding_sink(tx.clone()))
            .unwrap();
        ids.push((id, n));
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while parked.lock().unwrap().len() < 16 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    let mut held: Vec<_> = parked.lock().unwrap().drain(..).collect();
    held.reverse();
    for (message, responder) in held {
        responder.send(message);
    }

    for _ in 0..16 {
        let (id, reply) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let (_, n) = ids.iter().find(|(sent, _)| *sent == id).unwrap();
        assert_eq!(reply.unwrap(), Bytes::from(vec![*n]));
    }
    assert_eq!(client.outstanding(), 0);
}

#[tokio::test]
async fn raw_peer_sees_request_frames() {
    let (left, right) = UnixStream::pair().unwrap();
    let client = StreamChannel::new(left);
    let mut peer = Framed::new(right, WireCodec::default());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = client.next_correlation_id();
    client
        .send("svc", id, Bytes::from_static(b"req"), forwarding_sink(tx))
        .unwrap();

    let frame = peer.next().await.unwrap().unwrap();
    assert_eq!(frame.kind, FrameKind::Request);
    assert_eq!(frame.name, "svc");
    assert_eq!(frame.id, id);

    // A reply for an id nobody asked about is ignored.
    peer.send(Frame::reply(CorrelationId(9999), Bytes::from_static(b"stray")))
        .await
        .unwrap();
    peer.send(Frame::reply(id, Bytes::from_static(b"resp")))
        .await
        .unwrap();

    let (got, reply) = rx.recv().await.unwrap();
    assert_eq!(got, id);
    assert_eq!(reply.unwrap(), Bytes::from_static(b"resp"));
}

#[tokio::test]
async fn garbage_on_the_wire_closes_the_channel() {
    use tokio::io::AsyncWriteExt;

    let (left, mut right) = UnixStream::pair().unwrap();
    let client = StreamChannel::new(left);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = client.next_correlation_id();
    client
        .send("svc", id, Bytes::new(), forwarding_sink(tx))
        .unwrap();

    right.write_all(&[0xFF; 32]).await.unwrap();

    let (got, reply) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got, id);
    assert_eq!(reply.unwrap_err(), ChannelError::Closed.to_string());
    assert!(client.is_closed());
}
