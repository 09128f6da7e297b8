use std::str::FromStr;

use bytes::Bytes;
use itertools::Itertools;
use thiserror::Error as ThisError;

use crate::frame::Frame;

/// A reply frame that does not have the shape the issued command calls for.
/// This is distinct from a server-reported error, which surfaces as
/// [`crate::ServerError`] before reply extraction runs.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unexpected reply; expected {expected}, got {actual}")]
    Unexpected {
        expected: &'static str,
        actual: Frame,
    },
    #[error("reply array ended before all expected elements were read")]
    EndOfStream,
    #[error("invalid UTF-8 payload in reply")]
    InvalidUtf8,
    #[error("expected a numeric payload, got {0:?}")]
    NotANumber(String),
}

pub fn simple(frame: Frame) -> Result<String, Error> {
    match frame {
        Frame::Simple(s) => Ok(s),
        frame => Err(Error::Unexpected {
            expected: "simple string",
            actual: frame,
        }),
    }
}

/// The `+OK` acknowledgment shared by SET, LTRIM, HMSET, FLUSHDB and friends.
pub fn ok(frame: Frame) -> Result<(), Error> {
    match simple(frame)? {
        s if s == "OK" => Ok(()),
        s => Err(Error::Unexpected {
            expected: "OK",
            actual: Frame::Simple(s),
        }),
    }
}

pub fn integer(frame: Frame) -> Result<i64, Error> {
    match frame {
        Frame::Integer(i) => Ok(i),
        frame => Err(Error::Unexpected {
            expected: "integer",
            actual: frame,
        }),
    }
}

/// Predicate replies: `:0`/`:1`, or a RESP3 boolean.
pub fn boolean(frame: Frame) -> Result<bool, Error> {
    match frame {
        Frame::Boolean(b) => Ok(b),
        frame => Ok(integer(frame)? != 0),
    }
}

/// Integer replies that are null when the subject is absent (ZRANK and co).
pub fn optional_integer(frame: Frame) -> Result<Option<i64>, Error> {
    match frame {
        Frame::Null => Ok(None),
        frame => integer(frame).map(Some),
    }
}

/// Bulk payload, `None` for the null reply that marks an absent value.
pub fn bulk(frame: Frame) -> Result<Option<Bytes>, Error> {
    match frame {
        Frame::Bulk(data) => Ok(Some(data)),
        Frame::Simple(s) => Ok(Some(Bytes::from(s))),
        Frame::Null => Ok(None),
        frame => Err(Error::Unexpected {
            expected: "bulk string",
            actual: frame,
        }),
    }
}

/// Bulk payload that the command guarantees to be present and textual, such
/// as the entry id returned by XADD.
pub fn string(frame: Frame) -> Result<String, Error> {
    let data = bulk(frame)?.ok_or(Error::EndOfStream)?;
    utf8(&data)
}

pub fn float(frame: Frame) -> Result<f64, Error> {
    match frame {
        Frame::Double(d) => Ok(d),
        Frame::Integer(i) => Ok(i as f64),
        Frame::Bulk(data) => number::<f64>(&data),
        frame => Err(Error::Unexpected {
            expected: "double or bulk string",
            actual: frame,
        }),
    }
}

pub fn optional_float(frame: Frame) -> Result<Option<f64>, Error> {
    match frame {
        Frame::Null => Ok(None),
        frame => float(frame).map(Some),
    }
}

/// Multi-element replies. A null array marks "no data" and collapses to an
/// empty vector; RESP3 sets qualify as well.
pub fn array(frame: Frame) -> Result<Vec<Frame>, Error> {
    match frame {
        Frame::Array(items) => Ok(items),
        Frame::Set(items) => Ok(items),
        Frame::Null => Ok(Vec::new()),
        frame => Err(Error::Unexpected {
            expected: "array",
            actual: frame,
        }),
    }
}

pub fn bulk_array(frame: Frame) -> Result<Vec<Bytes>, Error> {
    array(frame)?
        .into_iter()
        .map(|item| bulk(item)?.ok_or(Error::EndOfStream))
        .collect()
}

/// Like [`bulk_array`], but positions may hold nulls (HMGET keeps the reply
/// aligned with the requested fields).
pub fn optional_bulk_array(frame: Frame) -> Result<Vec<Option<Bytes>>, Error> {
    array(frame)?.into_iter().map(bulk).collect()
}

/// Field/value style replies: either a flat array (RESP2) or a map frame
/// (RESP3), normalized to ordered pairs.
pub fn pairs(frame: Frame) -> Result<Vec<(Bytes, Bytes)>, Error> {
    let entries = match frame {
        Frame::Map(entries) => entries,
        frame => array(frame)?.into_iter().tuples().collect(),
    };

    entries
        .into_iter()
        .map(|(field, value)| {
            let field = bulk(field)?.ok_or(Error::EndOfStream)?;
            let value = bulk(value)?.ok_or(Error::EndOfStream)?;
            Ok((field, value))
        })
        .collect()
}

/// Member/score style replies, with the score parsed into the caller's
/// numeric representation.
pub fn scored<S: FromStr>(frame: Frame) -> Result<Vec<(Bytes, S)>, Error> {
    pairs(frame)?
        .into_iter()
        .map(|(member, score)| Ok((member, number::<S>(&score)?)))
        .collect()
}

/// SCAN-family replies: `[next-cursor, [element, ...]]`.
pub fn scan_page(frame: Frame) -> Result<(u64, Vec<Frame>), Error> {
    let mut items = array(frame)?.into_iter();

    let cursor = items.next().ok_or(Error::EndOfStream)?;
    let cursor = bulk(cursor)?.ok_or(Error::EndOfStream)?;
    let cursor = number::<u64>(&cursor)?;

    let elements = items.next().ok_or(Error::EndOfStream)?;

    Ok((cursor, array(elements)?))
}

pub fn utf8(data: &Bytes) -> Result<String, Error> {
    std::str::from_utf8(data)
        .map(|s| s.to_string())
        .map_err(|_| Error::InvalidUtf8)
}

pub fn number<S: FromStr>(data: &Bytes) -> Result<S, Error> {
    let text = std::str::from_utf8(data).map_err(|_| Error::InvalidUtf8)?;
    text.parse::<S>()
        .map_err(|_| Error::NotANumber(text.to_string()))
}
