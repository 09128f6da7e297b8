#![allow(dead_code)]

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use rudis::connection::Connection;
use rudis::frame::Frame;
use rudis::{Client, Config};

/// A scripted server session: the exact command frames the client is expected
/// to send, in order, each paired with the reply to answer with.
pub struct Script {
    exchanges: Vec<(Frame, Frame)>,
}

impl Script {
    pub fn new() -> Script {
        Script {
            exchanges: Vec::new(),
        }
    }

    pub fn expect(mut self, command: &[&str], reply: Frame) -> Script {
        self.exchanges.push((request(command), reply));
        self
    }
}

/// Spawns the scripted server on an ephemeral port and connects a client to
/// it. The returned handle must be awaited at the end of the test; a command
/// mismatch panics inside the server task and surfaces there.
pub async fn connect(script: Script) -> (Client, JoinHandle<()>) {
    connect_to_db(script, 0).await
}

pub async fn connect_to_db(script: Script, db: u32) -> (Client, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut conn = Connection::new(socket);

        for (expected, reply) in script.exchanges {
            let received = conn
                .read_frame()
                .await
                .unwrap()
                .expect("client closed the connection mid-script");

            assert_eq!(received, expected);
            conn.write_frame(reply).await.unwrap();
        }
    });

    let config = Config::new("127.0.0.1", addr.port(), db);
    let client = Client::connect_with(config).await.unwrap();

    (client, server)
}

/// A command frame the way clients send it: an array of bulk strings.
pub fn request(parts: &[&str]) -> Frame {
    Frame::Array(parts.iter().map(|part| bulk(part)).collect())
}

pub fn bulk(data: &str) -> Frame {
    Frame::bulk(data.to_string())
}

pub fn ok() -> Frame {
    Frame::Simple("OK".to_string())
}

pub fn int(value: i64) -> Frame {
    Frame::Integer(value)
}

pub fn bulk_array(items: &[&str]) -> Frame {
    Frame::Array(items.iter().map(|item| bulk(item)).collect())
}

/// An XRANGE-shaped entry: `[id, [field, value, ...]]`.
pub fn stream_entry(id: &str, fields: &[(&str, &str)]) -> Frame {
    let mut flat = Vec::new();
    for (field, value) in fields {
        flat.push(bulk(field));
        flat.push(bulk(value));
    }

    Frame::Array(vec![bulk(id), Frame::Array(flat)])
}
