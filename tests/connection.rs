use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};

use rudis::connection::Connection;
use rudis::frame::Frame;

async fn create_tcp_connection() -> Result<(UnboundedSender<Vec<u8>>, TcpStream), std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            while let Some(data) = rx.recv().await {
                // Write the received channel data to the socket.
                if socket.write_all(&data).await.is_err() {
                    break;
                }
            }
        }
    });

    // Connect to the server as a client to complete the setup.
    let stream = TcpStream::connect(local_addr).await?;

    Ok((tx, stream))
}

#[tokio::test]
async fn test_read_simple_string() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"+OK\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Simple("OK".to_string()));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_read_bulk_string() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"$5\r\nhello\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Bulk(Bytes::from("hello")));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_read_simple_error() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"-Error message\r\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Error(String::from("Error message")));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_read_array() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx
        .send(b"*2\r\n$4\r\nname\r\n$5\r\nvalue\r\n".to_vec())
        .unwrap();

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("name")),
        Frame::Bulk(Bytes::from("value")),
    ]));

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_read_multiple_frames_sequentially() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    tcp_stream_tx.send(b"+OK\r\n".to_vec()).unwrap();
    tcp_stream_tx.send(b"$5\r\nhello\r\n".to_vec()).unwrap();
    tcp_stream_tx.send(b":1000\r\n".to_vec()).unwrap();

    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Simple("OK".to_string()))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Bulk(Bytes::from("hello")))
    );
    assert_eq!(
        connection.read_frame().await.unwrap(),
        Some(Frame::Integer(1000))
    );
}

#[tokio::test]
async fn test_read_incomplete_frame() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    // Reply split into three parts to simulate partial/incomplete data
    // sending: "*3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$7\r\nmyvalue\r\n"
    let part1 = b"*3\r\n$3\r\nSE";
    let part2 = b"T\r\n$5\r\nmyke";
    let part3 = b"y\r\n$7\r\nmyvalue\r\n";

    tokio::spawn(async move {
        let parts = vec![part1.to_vec(), part2.to_vec(), part3.to_vec()];
        for part in parts {
            tcp_stream_tx.send(part.to_vec()).unwrap();
            // Simulate a delay in sending/receiving the data.
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    });

    let actual = connection.read_frame().await.unwrap();
    let expected = Some(Frame::Array(vec![
        Frame::Bulk(Bytes::from("SET")),
        Frame::Bulk(Bytes::from("mykey")),
        Frame::Bulk(Bytes::from("myvalue")),
    ]));
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_read_frame_on_closed_connection() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream);

    drop(tcp_stream_tx);

    assert_eq!(connection.read_frame().await.unwrap(), None);
}

#[tokio::test]
async fn test_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local_addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut conn = Connection::new(socket);

        let request = conn.read_frame().await.unwrap().unwrap();
        assert_eq!(
            request,
            Frame::Array(vec![Frame::bulk("PING")]),
        );

        conn.write_frame(Frame::Simple("PONG".to_string()))
            .await
            .unwrap();
    });

    let mut connection = Connection::connect("127.0.0.1", local_addr.port())
        .await
        .unwrap();

    let reply = connection
        .round_trip(Frame::Array(vec![Frame::bulk("PING")]))
        .await
        .unwrap();

    assert_eq!(reply, Frame::Simple("PONG".to_string()));

    server.await.unwrap();
}

#[tokio::test]
async fn test_round_trip_on_closed_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local_addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        // Accept and hang up without answering.
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let mut connection = Connection::connect("127.0.0.1", local_addr.port())
        .await
        .unwrap();
    server.await.unwrap();

    let result = connection
        .round_trip(Frame::Array(vec![Frame::bulk("PING")]))
        .await;

    assert!(result.is_err());
}
