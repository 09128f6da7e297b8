use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

/// A single framed TCP connection to the server. All commands issued through
/// one [`crate::Client`] are multiplexed over this handle in call order; the
/// stream is closed when the connection is dropped.
pub struct Connection {
    frames: Framed<TcpStream, FrameCodec>,
    pub id: Uuid,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            frames: Framed::new(stream, FrameCodec),
            id: Uuid::new_v4(),
        }
    }

    pub async fn connect(host: &str, port: u16) -> Result<Connection, Error> {
        let stream = TcpStream::connect((host, port)).await?;
        let conn = Connection::new(stream);

        debug!(connection_id = %conn.id, host, port, "connected");

        Ok(conn)
    }

    /// Reads the next frame, or `None` once the server closes the connection.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        self.frames.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.frames.send(frame).await
    }

    /// One command, one reply. Blocking commands simply keep the read side
    /// pending until the server answers or the caller-specified timeout
    /// elapses server-side.
    #[instrument(name = "request", skip(self, frame), fields(connection_id = %self.id))]
    pub async fn round_trip(&mut self, frame: Frame) -> Result<Frame, Error> {
        debug!("sending command: {}", frame);
        self.write_frame(frame).await?;

        match self.read_frame().await? {
            Some(reply) => {
                debug!("received reply: {}", reply);
                Ok(reply)
            }
            None => Err("connection closed by server before a reply arrived".into()),
        }
    }
}
