use bytes::{Buf, BytesMut};
use std::convert::TryInto;
use std::env;
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{self, Frame};
use crate::Error;

/// Frame-level codec for the connection: decodes reply frames out of the read
/// buffer and encodes command frames into the write buffer.
pub struct FrameCodec;

impl FrameCodec {
    fn max_frame_size() -> usize {
        env::var("RUDIS_MAX_FRAME_SIZE")
            .map(|s| s.parse().expect("RUDIS_MAX_FRAME_SIZE must be a number"))
            .unwrap_or(512 * 1024 * 1024)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() > FrameCodec::max_frame_size() {
            return Err("frame size exceeds limit".into());
        }

        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            // Not enough data to parse a frame; wait for the next read.
            Err(frame::Error::Incomplete) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let position: usize = cursor
            .position()
            .try_into()
            .expect("Cursor position is too large");

        tracing::trace!(bytes = position, "decoded frame: {}", frame);

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = frame.serialize();

        if bytes.len() > FrameCodec::max_frame_size() {
            return Err("frame size exceeds limit".into());
        }

        dst.extend_from_slice(&bytes);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decode_complete_frame() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"+OK\r\n:42\r\n"[..]);

        let first = codec.decode(&mut buffer).unwrap();
        assert_eq!(first, Some(Frame::Simple("OK".to_string())));

        let second = codec.decode(&mut buffer).unwrap();
        assert_eq!(second, Some(Frame::Integer(42)));

        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_incomplete_frame_waits_for_more_data() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::from(&b"$5\r\nhel"[..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
        // The partial frame stays buffered.
        assert_eq!(&buffer[..], b"$5\r\nhel");

        buffer.extend_from_slice(b"lo\r\n");
        assert_eq!(
            codec.decode(&mut buffer).unwrap(),
            Some(Frame::Bulk(Bytes::from("hello")))
        );
    }

    #[test]
    fn encode_writes_serialized_frame() {
        let mut codec = FrameCodec;
        let mut buffer = BytesMut::new();

        let frame = Frame::Array(vec![Frame::bulk("GET"), Frame::bulk("foo")]);
        codec.encode(frame, &mut buffer).unwrap();

        assert_eq!(&buffer[..], b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n");
    }
}
