use bytes::Bytes;

use crate::client::Client;
use crate::cmd::{cmd, ToArg};
use crate::frame::Frame;
use crate::reply;
use crate::Error;

/// Where LINSERT places the new element relative to the pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    fn as_str(self) -> &'static str {
        match self {
            InsertPosition::Before => "BEFORE",
            InsertPosition::After => "AFTER",
        }
    }
}

impl Client {
    /// Pushes one or more values at the head, creating the list when absent.
    /// Returns the resulting list length.
    pub async fn lpush<I>(&mut self, key: &str, values: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("LPUSH").arg(key).args(values)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Head push that is a no-op unless the list already exists.
    pub async fn lpushx(&mut self, key: &str, value: impl ToArg) -> Result<i64, Error> {
        let frame = self.command(cmd("LPUSHX").arg(key).arg(value)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn rpush<I>(&mut self, key: &str, values: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("RPUSH").arg(key).args(values)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn rpushx(&mut self, key: &str, value: impl ToArg) -> Result<i64, Error> {
        let frame = self.command(cmd("RPUSHX").arg(key).arg(value)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn lpop(&mut self, key: &str) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("LPOP").arg(key)).await?;
        Ok(reply::bulk(frame)?)
    }

    pub async fn rpop(&mut self, key: &str) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("RPOP").arg(key)).await?;
        Ok(reply::bulk(frame)?)
    }

    /// Elements between `start` and `stop`, both inclusive. Negative indexes
    /// count from the tail: -1 is the last element.
    pub async fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, Error> {
        let frame = self
            .command(cmd("LRANGE").arg(key).arg(start).arg(stop))
            .await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn llen(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("LLEN").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Removes occurrences of `value`. `count` > 0 searches from the head for
    /// that many, `count` < 0 from the tail, `count` == 0 removes all.
    /// Returns the number removed.
    pub async fn lrem(&mut self, key: &str, count: i64, value: impl ToArg) -> Result<i64, Error> {
        let frame = self
            .command(cmd("LREM").arg(key).arg(count).arg(value))
            .await?;
        Ok(reply::integer(frame)?)
    }

    /// Keeps only the elements between `start` and `stop`, dropping the rest.
    pub async fn ltrim(&mut self, key: &str, start: i64, stop: i64) -> Result<(), Error> {
        let frame = self
            .command(cmd("LTRIM").arg(key).arg(start).arg(stop))
            .await?;
        Ok(reply::ok(frame)?)
    }

    /// Inserts next to the first occurrence of `pivot`. Returns the new list
    /// length, -1 when the pivot is missing, 0 when the list does not exist.
    pub async fn linsert(
        &mut self,
        key: &str,
        position: InsertPosition,
        pivot: impl ToArg,
        value: impl ToArg,
    ) -> Result<i64, Error> {
        let frame = self
            .command(
                cmd("LINSERT")
                    .arg(key)
                    .arg(position.as_str())
                    .arg(pivot)
                    .arg(value),
            )
            .await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn lindex(&mut self, key: &str, index: i64) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("LINDEX").arg(key).arg(index)).await?;
        Ok(reply::bulk(frame)?)
    }

    /// Blocking head pop over one or more lists. Suspends until an element
    /// arrives or `timeout_secs` elapses (0 blocks indefinitely); a timeout
    /// yields `None`, not an error. The reply names the list the element
    /// came from.
    pub async fn blpop(
        &mut self,
        keys: &[&str],
        timeout_secs: u64,
    ) -> Result<Option<(Bytes, Bytes)>, Error> {
        let frame = self
            .command(cmd("BLPOP").args(keys).arg(timeout_secs))
            .await?;
        popped_entry(frame)
    }

    pub async fn brpop(
        &mut self,
        keys: &[&str],
        timeout_secs: u64,
    ) -> Result<Option<(Bytes, Bytes)>, Error> {
        let frame = self
            .command(cmd("BRPOP").args(keys).arg(timeout_secs))
            .await?;
        popped_entry(frame)
    }
}

/// BLPOP/BRPOP reply: null on timeout, otherwise `[key, value]`.
fn popped_entry(frame: Frame) -> Result<Option<(Bytes, Bytes)>, Error> {
    if frame == Frame::Null {
        return Ok(None);
    }

    let mut items = reply::array(frame)?.into_iter();
    let key = items
        .next()
        .map(reply::bulk)
        .transpose()?
        .flatten()
        .ok_or(reply::Error::EndOfStream)?;
    let value = items
        .next()
        .map(reply::bulk)
        .transpose()?
        .flatten()
        .ok_or(reply::Error::EndOfStream)?;

    Ok(Some((key, value)))
}
