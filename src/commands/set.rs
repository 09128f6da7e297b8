use bytes::Bytes;

use crate::client::Client;
use crate::cmd::{cmd, ToArg};
use crate::commands::scan_args;
use crate::reply;
use crate::Error;

impl Client {
    /// Adds members, ignoring ones already present. The reply counts only
    /// the members actually added.
    pub async fn sadd<I>(&mut self, key: &str, members: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("SADD").arg(key).args(members)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn scard(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("SCARD").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Members of the first set that appear in none of the others.
    pub async fn sdiff(&mut self, keys: &[&str]) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("SDIFF").args(keys)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// SDIFF materialized into `dest`; returns the cardinality of the result.
    pub async fn sdiffstore(&mut self, dest: &str, keys: &[&str]) -> Result<i64, Error> {
        let frame = self.command(cmd("SDIFFSTORE").arg(dest).args(keys)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn sinter(&mut self, keys: &[&str]) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("SINTER").args(keys)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn sinterstore(&mut self, dest: &str, keys: &[&str]) -> Result<i64, Error> {
        let frame = self.command(cmd("SINTERSTORE").arg(dest).args(keys)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn sunion(&mut self, keys: &[&str]) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("SUNION").args(keys)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn sunionstore(&mut self, dest: &str, keys: &[&str]) -> Result<i64, Error> {
        let frame = self.command(cmd("SUNIONSTORE").arg(dest).args(keys)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn sismember(&mut self, key: &str, member: impl ToArg) -> Result<bool, Error> {
        let frame = self.command(cmd("SISMEMBER").arg(key).arg(member)).await?;
        Ok(reply::boolean(frame)?)
    }

    pub async fn smembers(&mut self, key: &str) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("SMEMBERS").arg(key)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// Moves `member` from `src` to `dst`. False when `member` was not in
    /// `src` and nothing happened.
    pub async fn smove(
        &mut self,
        src: &str,
        dst: &str,
        member: impl ToArg,
    ) -> Result<bool, Error> {
        let frame = self
            .command(cmd("SMOVE").arg(src).arg(dst).arg(member))
            .await?;
        Ok(reply::boolean(frame)?)
    }

    /// Removes and returns one random member, `None` on a missing or empty
    /// set.
    pub async fn spop(&mut self, key: &str) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("SPOP").arg(key)).await?;
        Ok(reply::bulk(frame)?)
    }

    pub async fn spop_count(&mut self, key: &str, count: u64) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("SPOP").arg(key).arg(count)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// One random member without removing it.
    pub async fn srandmember(&mut self, key: &str) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("SRANDMEMBER").arg(key)).await?;
        Ok(reply::bulk(frame)?)
    }

    /// Random sampling without removal. A negative count may repeat members;
    /// a positive one returns distinct members only.
    pub async fn srandmember_count(&mut self, key: &str, count: i64) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("SRANDMEMBER").arg(key).arg(count)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn srem<I>(&mut self, key: &str, members: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("SREM").arg(key).args(members)).await?;
        Ok(reply::integer(frame)?)
    }

    /// One page of an incremental scan. Returns the cursor to resume from (0
    /// once the iteration is complete) and the members of this page.
    pub async fn sscan(
        &mut self,
        key: &str,
        cursor: u64,
        pattern: Option<&str>,
        count: Option<u64>,
    ) -> Result<(u64, Vec<Bytes>), Error> {
        let frame = self
            .command(scan_args(cmd("SSCAN").arg(key).arg(cursor), pattern, count))
            .await?;

        let (cursor, elements) = reply::scan_page(frame)?;
        let members = elements
            .into_iter()
            .map(|item| reply::bulk(item)?.ok_or(reply::Error::EndOfStream))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((cursor, members))
    }
}
