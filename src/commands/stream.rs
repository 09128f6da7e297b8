use bytes::Bytes;

use crate::client::Client;
use crate::cmd::{cmd, Cmd, ToArg};
use crate::frame::Frame;
use crate::reply;
use crate::Error;

/// One stream entry: its monotonically-increasing id and the field/value
/// pairs it carries, in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamEntry {
    pub id: String,
    pub fields: Vec<(Bytes, Bytes)>,
}

fn entry(frame: Frame) -> Result<StreamEntry, reply::Error> {
    let mut items = reply::array(frame)?.into_iter();

    let id = items.next().ok_or(reply::Error::EndOfStream)?;
    let id = reply::string(id)?;

    let fields = match items.next() {
        Some(frame) => reply::pairs(frame)?,
        None => Vec::new(),
    };

    Ok(StreamEntry { id, fields })
}

fn entries(frame: Frame) -> Result<Vec<StreamEntry>, reply::Error> {
    reply::array(frame)?.into_iter().map(entry).collect()
}

fn add_fields<I, F, V>(mut cmd: Cmd, fields: I) -> Cmd
where
    I: IntoIterator<Item = (F, V)>,
    F: ToArg,
    V: ToArg,
{
    for (field, value) in fields {
        cmd = cmd.arg(field).arg(value);
    }
    cmd
}

impl Client {
    /// Appends an entry, creating the stream when absent. `id` is either a
    /// caller-supplied id (which must sort after every existing one) or `"*"`
    /// to let the server assign it. Returns the entry's id.
    pub async fn xadd<I, F, V>(&mut self, key: &str, id: &str, fields: I) -> Result<String, Error>
    where
        I: IntoIterator<Item = (F, V)>,
        F: ToArg,
        V: ToArg,
    {
        let command = add_fields(cmd("XADD").arg(key).arg(id), fields);
        let frame = self.command(command).await?;
        Ok(reply::string(frame)?)
    }

    /// [`xadd`](Client::xadd) that also trims the stream to roughly
    /// `max_len` entries; `approximate` lets the server round the trim up to
    /// a convenient boundary, which is the cheap mode.
    pub async fn xadd_maxlen<I, F, V>(
        &mut self,
        key: &str,
        max_len: u64,
        approximate: bool,
        id: &str,
        fields: I,
    ) -> Result<String, Error>
    where
        I: IntoIterator<Item = (F, V)>,
        F: ToArg,
        V: ToArg,
    {
        let mut command = cmd("XADD").arg(key).arg("MAXLEN");
        if approximate {
            command = command.arg("~");
        }
        command = add_fields(command.arg(max_len).arg(id), fields);

        let frame = self.command(command).await?;
        Ok(reply::string(frame)?)
    }

    pub async fn xlen(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("XLEN").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Entries with ids between `start` and `end`, oldest first. `-`/`+`
    /// stand for the smallest and greatest id.
    pub async fn xrange(
        &mut self,
        key: &str,
        start: &str,
        end: &str,
        count: Option<u64>,
    ) -> Result<Vec<StreamEntry>, Error> {
        let mut command = cmd("XRANGE").arg(key).arg(start).arg(end);
        if let Some(count) = count {
            command = command.arg("COUNT").arg(count);
        }

        let frame = self.command(command).await?;
        Ok(entries(frame)?)
    }

    /// Like [`xrange`](Client::xrange) but newest first; note the reversed
    /// bound order.
    pub async fn xrevrange(
        &mut self,
        key: &str,
        end: &str,
        start: &str,
        count: Option<u64>,
    ) -> Result<Vec<StreamEntry>, Error> {
        let mut command = cmd("XREVRANGE").arg(key).arg(end).arg(start);
        if let Some(count) = count {
            command = command.arg("COUNT").arg(count);
        }

        let frame = self.command(command).await?;
        Ok(entries(frame)?)
    }

    /// Drops the oldest entries until roughly `max_len` remain. Returns the
    /// number of entries removed.
    pub async fn xtrim(
        &mut self,
        key: &str,
        max_len: u64,
        approximate: bool,
    ) -> Result<i64, Error> {
        let mut command = cmd("XTRIM").arg(key).arg("MAXLEN");
        if approximate {
            command = command.arg("~");
        }
        command = command.arg(max_len);

        let frame = self.command(command).await?;
        Ok(reply::integer(frame)?)
    }

    /// Deletes specific entries by id; returns how many actually existed.
    pub async fn xdel<I>(&mut self, key: &str, ids: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("XDEL").arg(key).args(ids)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Entries with ids strictly greater than `last_id`. With `block_ms` set
    /// the call suspends until something arrives or the window elapses
    /// (0 blocks indefinitely); an empty result marks the timeout, never an
    /// error.
    pub async fn xread(
        &mut self,
        key: &str,
        last_id: &str,
        count: Option<u64>,
        block_ms: Option<u64>,
    ) -> Result<Vec<StreamEntry>, Error> {
        let mut command = cmd("XREAD");
        if let Some(count) = count {
            command = command.arg("COUNT").arg(count);
        }
        if let Some(block_ms) = block_ms {
            command = command.arg("BLOCK").arg(block_ms);
        }
        command = command.arg("STREAMS").arg(key).arg(last_id);

        let frame = self.command(command).await?;

        // One stream requested, so the reply holds at most one
        // `[name, entries]` group; a null reply means nothing arrived.
        let mut streams = reply::array(frame)?.into_iter();
        match streams.next() {
            Some(stream) => {
                let mut parts = reply::array(stream)?.into_iter();
                let _name = parts.next().ok_or(reply::Error::EndOfStream)?;
                let group = parts.next().ok_or(reply::Error::EndOfStream)?;
                Ok(entries(group)?)
            }
            None => Ok(Vec::new()),
        }
    }

    /// The oldest entry, `None` when the stream is missing or empty.
    pub async fn first_stream_record(&mut self, key: &str) -> Result<Option<StreamEntry>, Error> {
        let records = self.xrange(key, "-", "+", Some(1)).await?;
        Ok(records.into_iter().next())
    }

    /// The newest entry, `None` when the stream is missing or empty.
    pub async fn last_stream_record(&mut self, key: &str) -> Result<Option<StreamEntry>, Error> {
        let records = self.xrevrange(key, "+", "-", Some(1)).await?;
        Ok(records.into_iter().next())
    }
}
