// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::str::FromStr;
use std::string::FromUtf8Error;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {0}")]
    InvalidDataType(u8),
    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// A single RESP frame. Commands are serialized as arrays of bulk strings;
/// replies may use any of the RESP2 types or, when the server chooses to, the
/// RESP3 additions (booleans, doubles, big numbers, maps, sets).
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Boolean(bool),
    Double(f64),
    BigNumber(String),
    Array(Vec<Frame>),
    Map(Vec<(Frame, Frame)>),
    Set(Vec<Frame>),
}

impl Frame {
    /// Bulk string frame from anything byte-like. Every command argument on
    /// the request path goes through this.
    pub fn bulk(data: impl Into<Bytes>) -> Frame {
        Frame::Bulk(data.into())
    }

    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in an RESP-serialized payload always identifies its
        // type. Subsequent bytes constitute the type's contents.
        let first_byte = get_byte(src)?;
        let data_type = DataType::try_from(first_byte)?;

        match data_type {
            DataType::SimpleString => {
                let line = read_line(src)?.to_vec();
                let string = String::from_utf8(line)?;
                Ok(Frame::Simple(string))
            }
            DataType::SimpleError => {
                let line = read_line(src)?.to_vec();
                let string = String::from_utf8(line)?;
                Ok(Frame::Error(string))
            }
            DataType::Integer => {
                let integer = parse_decimal::<i64>(read_line(src)?)?;
                Ok(Frame::Integer(integer))
            }
            // $<length>\r\n<data>\r\n
            //
            // The payload is read by its declared length, not up to the next
            // CRLF, so binary values containing CRLF survive.
            DataType::BulkString => {
                let length = parse_decimal::<isize>(read_line(src)?)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }

                let data = read_exact(src, length as usize)?;
                Ok(Frame::Bulk(data))
            }
            // !<length>\r\n<error>\r\n
            DataType::BulkError => {
                let length = parse_decimal::<isize>(read_line(src)?)?;

                // NOTE: the protocol does not specify a way to represent a
                // null bulk error.
                if length == -1 {
                    return Ok(Frame::Null);
                }

                let msg = read_exact(src, length as usize)?;
                let msg = String::from_utf8(msg.to_vec())?;
                Ok(Frame::Error(msg))
            }
            // =<length>\r\n<format>:<data>\r\n
            //
            // The three-character format prefix carries no command semantics;
            // verbatim strings collapse into plain bulk payloads.
            DataType::VerbatimString => {
                let length = parse_decimal::<isize>(read_line(src)?)?;

                if length < 4 {
                    return Err(Error::Malformed(
                        "verbatim string shorter than its format prefix".into(),
                    ));
                }

                let data = read_exact(src, length as usize)?;
                Ok(Frame::Bulk(data.slice(4..)))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Array => {
                let length = parse_decimal::<isize>(read_line(src)?)?;

                if length == -1 {
                    return Ok(Frame::Null);
                }

                let mut frames = Vec::with_capacity(length as usize);
                for _ in 0..length {
                    frames.push(Self::parse(src)?);
                }

                Ok(Frame::Array(frames))
            }
            // ><number-of-elements>\r\n<element-1>...<element-n>
            //
            // Push frames only show up for subscriptions, which this client
            // does not issue; parse them like arrays so a surprise push does
            // not poison the connection.
            DataType::Push => {
                let length = parse_decimal::<usize>(read_line(src)?)?;

                let mut frames = Vec::with_capacity(length);
                for _ in 0..length {
                    frames.push(Self::parse(src)?);
                }

                Ok(Frame::Array(frames))
            }
            // %<number-of-entries>\r\n<key-1><value-1>...<key-n><value-n>
            DataType::Map => {
                let length = parse_decimal::<usize>(read_line(src)?)?;

                let mut entries = Vec::with_capacity(length);
                for _ in 0..length {
                    let key = Self::parse(src)?;
                    let value = Self::parse(src)?;
                    entries.push((key, value));
                }

                Ok(Frame::Map(entries))
            }
            // ~<number-of-elements>\r\n<element-1>...<element-n>
            DataType::Set => {
                let length = parse_decimal::<usize>(read_line(src)?)?;

                let mut frames = Vec::with_capacity(length);
                for _ in 0..length {
                    frames.push(Self::parse(src)?);
                }

                Ok(Frame::Set(frames))
            }
            // #t\r\n | #f\r\n
            DataType::Boolean => match read_line(src)? {
                b"t" => Ok(Frame::Boolean(true)),
                b"f" => Ok(Frame::Boolean(false)),
                other => Err(Error::Malformed(format!(
                    "invalid boolean payload: {:?}",
                    String::from_utf8_lossy(other)
                ))),
            },
            // ,<floating-point-number>\r\n (inf, -inf and nan included)
            DataType::Double => {
                let double = parse_decimal::<f64>(read_line(src)?)?;
                Ok(Frame::Double(double))
            }
            // (<big number>\r\n -- kept textual, values exceed i64 by design
            DataType::BigNumber => {
                let line = read_line(src)?.to_vec();
                let digits = String::from_utf8(line)?;
                Ok(Frame::BigNumber(digits))
            }
            DataType::Null => {
                // Advance the cursor past the frame terminator.
                let _ = read_line(src)?;
                Ok(Frame::Null)
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Frame::Simple(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleString));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Error(s) => {
                let mut bytes = Vec::with_capacity(1 + s.len() + CRLF.len());
                bytes.push(u8::from(DataType::SimpleError));
                bytes.extend_from_slice(s.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Integer(i) => {
                let digits = i.to_string();
                let mut bytes = Vec::with_capacity(1 + digits.len() + CRLF.len());
                bytes.push(u8::from(DataType::Integer));
                bytes.extend_from_slice(digits.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Bulk(data) => {
                let length = data.len().to_string();
                let mut bytes =
                    Vec::with_capacity(1 + length.len() + CRLF.len() + data.len() + CRLF.len());
                bytes.push(u8::from(DataType::BulkString));
                bytes.extend_from_slice(length.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes.extend_from_slice(data);
                bytes.extend_from_slice(CRLF);
                bytes
            }
            // RESP2 null bulk string, understood by every server version.
            Frame::Null => b"$-1\r\n".to_vec(),
            Frame::Boolean(b) => {
                let mut bytes = Vec::with_capacity(2 + CRLF.len());
                bytes.push(u8::from(DataType::Boolean));
                bytes.push(if *b { b't' } else { b'f' });
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Double(d) => {
                let repr = if d.is_infinite() {
                    if *d > 0.0 {
                        "inf".to_string()
                    } else {
                        "-inf".to_string()
                    }
                } else if d.is_nan() {
                    "nan".to_string()
                } else {
                    d.to_string()
                };
                let mut bytes = Vec::with_capacity(1 + repr.len() + CRLF.len());
                bytes.push(u8::from(DataType::Double));
                bytes.extend_from_slice(repr.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::BigNumber(digits) => {
                let mut bytes = Vec::with_capacity(1 + digits.len() + CRLF.len());
                bytes.push(u8::from(DataType::BigNumber));
                bytes.extend_from_slice(digits.as_bytes());
                bytes.extend_from_slice(CRLF);
                bytes
            }
            Frame::Array(items) => {
                let mut bytes = Vec::new();
                bytes.push(u8::from(DataType::Array));
                bytes.extend_from_slice(items.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in items {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
            Frame::Map(entries) => {
                let mut bytes = Vec::new();
                bytes.push(u8::from(DataType::Map));
                bytes.extend_from_slice(entries.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                for (key, value) in entries {
                    bytes.extend(key.serialize());
                    bytes.extend(value.serialize());
                }
                bytes
            }
            Frame::Set(items) => {
                let mut bytes = Vec::new();
                bytes.push(u8::from(DataType::Set));
                bytes.extend_from_slice(items.len().to_string().as_bytes());
                bytes.extend_from_slice(CRLF);
                for frame in items {
                    bytes.extend(frame.serialize());
                }
                bytes
            }
        }
    }
}

impl From<Frame> for Vec<u8> {
    fn from(frame: Frame) -> Self {
        frame.serialize()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(i) => write!(f, ":{}", i),
            Frame::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Frame::Null => write!(f, "$-1"),
            Frame::Boolean(b) => write!(f, "#{}", if *b { 't' } else { 'f' }),
            Frame::Double(d) => write!(f, ",{}", d),
            Frame::BigNumber(digits) => write!(f, "({}", digits),
            Frame::Array(items) => {
                write!(f, "*{}", items.len())?;
                for frame in items {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
            Frame::Map(entries) => {
                write!(f, "%{}", entries.len())?;
                for (key, value) in entries {
                    write!(f, " {}={}", key, value)?;
                }
                Ok(())
            }
            Frame::Set(items) => {
                write!(f, "~{}", items.len())?;
                for frame in items {
                    write!(f, " {}", frame)?;
                }
                Ok(())
            }
        }
    }
}

/// Reads up to the next CRLF, leaving the cursor past the terminator.
fn read_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let buffer = *src.get_ref();

    let terminator = buffer[start..]
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((terminator + CRLF.len()) as u64);

    Ok(&buffer[start..terminator])
}

/// Reads a length-prefixed payload plus its trailing CRLF.
fn read_exact(src: &mut Cursor<&[u8]>, length: usize) -> Result<Bytes, Error> {
    let start = src.position() as usize;
    let buffer = *src.get_ref();

    if buffer.len() < start + length + CRLF.len() {
        return Err(Error::Incomplete);
    }

    if &buffer[start + length..start + length + CRLF.len()] != CRLF {
        return Err(Error::Malformed(
            "bulk payload is not terminated by CRLF".into(),
        ));
    }

    src.set_position((start + length + CRLF.len()) as u64);

    Ok(Bytes::copy_from_slice(&buffer[start..start + length]))
}

fn parse_decimal<T: FromStr>(line: &[u8]) -> Result<T, Error> {
    std::str::from_utf8(line)
        .map_err(|_| Error::Malformed("invalid UTF-8 in numeric payload".into()))?
        .parse::<T>()
        .map_err(|_| {
            Error::Malformed(format!(
                "invalid numeric payload: {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

#[derive(Debug)]
enum DataType {
    SimpleString,   // '+'
    BulkString,     // '$'
    VerbatimString, // '='
    SimpleError,    // '-'
    BulkError,      // '!'
    Boolean,        // '#'
    Integer,        // ':'
    Double,         // ','
    BigNumber,      // '('
    Array,          // '*'
    Map,            // '%'
    Set,            // '~'
    Push,           // '>'
    // Due to historical reasons, RESP2 features two specially crafted values
    // for representing null values of bulk strings and arrays. The null type,
    // introduced in RESP3, replaces that duality.
    Null, // '_'
}

impl TryFrom<u8> for DataType {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'!' => Ok(Self::BulkError),
            b'*' => Ok(Self::Array),
            b'_' => Ok(Self::Null),
            b'#' => Ok(Self::Boolean),
            b',' => Ok(Self::Double),
            b'(' => Ok(Self::BigNumber),
            b'=' => Ok(Self::VerbatimString),
            b'%' => Ok(Self::Map),
            b'~' => Ok(Self::Set),
            b'>' => Ok(Self::Push),
            _ => Err(Error::InvalidDataType(byte)),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::BulkError => b'!',
            DataType::Array => b'*',
            DataType::Null => b'_',
            DataType::Boolean => b'#',
            DataType::Double => b',',
            DataType::BigNumber => b'(',
            DataType::VerbatimString => b'=',
            DataType::Map => b'%',
            DataType::Set => b'~',
            DataType::Push => b'>',
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_src: FromUtf8Error) -> Error {
        Error::Malformed("invalid UTF-8 in frame".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &[u8]) -> Result<Frame, Error> {
        let mut cursor = Cursor::new(data);
        Frame::parse(&mut cursor)
    }

    #[test]
    fn parse_simple_string_frame() {
        let frame = parse(b"+OK\r\n");

        assert!(matches!(frame, Ok(Frame::Simple(ref s)) if s == "OK"));
    }

    #[test]
    fn parse_simple_error_frame() {
        let frame = parse(b"-Error message\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Error(ref s)) if s == "Error message"
        ));
    }

    fn parse_integer_frame(data: &[u8], expected: i64) {
        let frame = parse(data);

        assert!(matches!(frame, Ok(Frame::Integer(i)) if i == expected));
    }

    #[test]
    fn parse_integer_frame_positive() {
        parse_integer_frame(b":1000\r\n", 1000);
    }

    #[test]
    fn parse_integer_frame_negative() {
        parse_integer_frame(b":-1000\r\n", -1000);
    }

    #[test]
    fn parse_integer_frame_zero() {
        parse_integer_frame(b":0\r\n", 0);
    }

    #[test]
    fn parse_integer_frame_positive_signed() {
        parse_integer_frame(b":+1000\r\n", 1000);
    }

    #[test]
    fn parse_bulk_string_frame() {
        let frame = parse(b"$6\r\nfoobar\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("foobar")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_empty() {
        let frame = parse(b"$0\r\n\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_with_embedded_crlf() {
        let frame = parse(b"$12\r\nhello\r\nworld\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("hello\r\nworld")
        ));
    }

    #[test]
    fn parse_bulk_string_frame_null() {
        let frame = parse(b"$-1\r\n");

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_bulk_string_frame_incomplete_payload() {
        let frame = parse(b"$6\r\nfoo");

        assert!(matches!(frame, Err(Error::Incomplete)));
    }

    #[test]
    fn parse_bulk_error_frame() {
        let frame = parse(b"!6\r\nfoobar\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Error(ref s)) if s == "foobar"
        ));
    }

    #[test]
    fn parse_verbatim_string_frame() {
        let frame = parse(b"=15\r\ntxt:Some string\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::Bulk(ref b)) if b == &Bytes::from("Some string")
        ));
    }

    #[test]
    fn parse_boolean_frames() {
        assert!(matches!(parse(b"#t\r\n"), Ok(Frame::Boolean(true))));
        assert!(matches!(parse(b"#f\r\n"), Ok(Frame::Boolean(false))));
    }

    #[test]
    fn parse_double_frame() {
        let frame = parse(b",3.141\r\n");

        assert!(matches!(frame, Ok(Frame::Double(d)) if (d - 3.141).abs() < f64::EPSILON));
    }

    #[test]
    fn parse_double_frame_infinite() {
        assert!(matches!(
            parse(b",inf\r\n"),
            Ok(Frame::Double(d)) if d == f64::INFINITY
        ));
        assert!(matches!(
            parse(b",-inf\r\n"),
            Ok(Frame::Double(d)) if d == f64::NEG_INFINITY
        ));
    }

    #[test]
    fn parse_big_number_frame() {
        let frame = parse(b"(3492890328409238509324850943850943825024385\r\n");

        assert!(matches!(
            frame,
            Ok(Frame::BigNumber(ref digits))
                if digits == "3492890328409238509324850943850943825024385"
        ));
    }

    #[test]
    fn parse_null_frame() {
        let frame = parse(b"_\r\n");

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_array_frame_empty() {
        let frame = parse(b"*0\r\n");

        assert!(matches!(frame, Ok(Frame::Array(ref a)) if a.is_empty()));
    }

    #[test]
    fn parse_array_frame() {
        let frame = parse(b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n");

        assert_eq!(
            frame.unwrap(),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("hello")),
                Frame::Bulk(Bytes::from("world")),
            ])
        );
    }

    #[test]
    fn parse_array_frame_nested() {
        let frame = parse(b"*2\r\n*3\r\n:1\r\n:2\r\n:3\r\n*2\r\n+Hello\r\n-World\r\n");

        assert_eq!(
            frame.unwrap(),
            Frame::Array(vec![
                Frame::Array(vec![
                    Frame::Integer(1),
                    Frame::Integer(2),
                    Frame::Integer(3)
                ]),
                Frame::Array(vec![
                    Frame::Simple("Hello".to_string()),
                    Frame::Error("World".to_string())
                ]),
            ])
        );
    }

    #[test]
    fn parse_array_frame_null() {
        let frame = parse(b"*-1\r\n");

        assert!(matches!(frame, Ok(Frame::Null)));
    }

    #[test]
    fn parse_array_frame_null_in_the_middle() {
        let frame = parse(b"*3\r\n$5\r\nhello\r\n$-1\r\n$5\r\nworld\r\n");

        assert_eq!(
            frame.unwrap(),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("hello")),
                Frame::Null,
                Frame::Bulk(Bytes::from("world")),
            ])
        );
    }

    #[test]
    fn parse_map_frame() {
        let frame = parse(b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n");

        assert_eq!(
            frame.unwrap(),
            Frame::Map(vec![
                (Frame::Simple("first".to_string()), Frame::Integer(1)),
                (Frame::Simple("second".to_string()), Frame::Integer(2)),
            ])
        );
    }

    #[test]
    fn parse_set_frame() {
        let frame = parse(b"~2\r\n$1\r\na\r\n$1\r\nb\r\n");

        assert_eq!(
            frame.unwrap(),
            Frame::Set(vec![
                Frame::Bulk(Bytes::from("a")),
                Frame::Bulk(Bytes::from("b")),
            ])
        );
    }

    #[test]
    fn parse_push_frame_as_array() {
        let frame = parse(b">2\r\n$7\r\nmessage\r\n$5\r\nhello\r\n");

        assert_eq!(
            frame.unwrap(),
            Frame::Array(vec![
                Frame::Bulk(Bytes::from("message")),
                Frame::Bulk(Bytes::from("hello")),
            ])
        );
    }

    #[test]
    fn parse_invalid_data_type() {
        let frame = parse(b"@oops\r\n");

        assert!(matches!(frame, Err(Error::InvalidDataType(b'@'))));
    }

    #[test]
    fn serialize_command_array() {
        let frame = Frame::Array(vec![
            Frame::bulk("SET"),
            Frame::bulk("mykey"),
            Frame::bulk("myvalue"),
        ]);

        assert_eq!(
            frame.serialize(),
            b"*3\r\n$3\r\nSET\r\n$5\r\nmykey\r\n$7\r\nmyvalue\r\n".to_vec()
        );
    }

    #[test]
    fn serialize_parse_round_trip() {
        let frames = vec![
            Frame::Simple("OK".to_string()),
            Frame::Error("ERR oops".to_string()),
            Frame::Integer(-42),
            Frame::Bulk(Bytes::from("payload\r\nwith crlf")),
            Frame::Null,
            Frame::Boolean(true),
            Frame::Double(1.5),
            Frame::BigNumber("123456789012345678901234567890".to_string()),
            Frame::Array(vec![Frame::Integer(1), Frame::bulk("two")]),
            Frame::Map(vec![(Frame::bulk("k"), Frame::bulk("v"))]),
            Frame::Set(vec![Frame::bulk("member")]),
        ];

        for frame in frames {
            let bytes = frame.serialize();
            let mut cursor = Cursor::new(&bytes[..]);
            assert_eq!(Frame::parse(&mut cursor).unwrap(), frame);
        }
    }
}
