use bytes::Bytes;

use crate::client::Client;
use crate::cmd::{cmd, ToArg};
use crate::commands::scan_args;
use crate::frame::Frame;
use crate::reply;
use crate::Error;

impl Client {
    /// Sets one field, creating the hash when absent. The reply counts newly
    /// created fields, so overwriting an existing field yields 0.
    pub async fn hset(
        &mut self,
        key: &str,
        field: impl ToArg,
        value: impl ToArg,
    ) -> Result<i64, Error> {
        let frame = self
            .command(cmd("HSET").arg(key).arg(field).arg(value))
            .await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn hget(&mut self, key: &str, field: impl ToArg) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("HGET").arg(key).arg(field)).await?;
        Ok(reply::bulk(frame)?)
    }

    /// Deletes fields, ignoring absent ones. Returns the number actually
    /// removed.
    pub async fn hdel<I>(&mut self, key: &str, fields: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("HDEL").arg(key).args(fields)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn hexists(&mut self, key: &str, field: impl ToArg) -> Result<bool, Error> {
        let frame = self.command(cmd("HEXISTS").arg(key).arg(field)).await?;
        Ok(reply::boolean(frame)?)
    }

    /// Bulk field write; existing fields are overwritten.
    pub async fn hmset<I, F, V>(&mut self, key: &str, entries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (F, V)>,
        F: ToArg,
        V: ToArg,
    {
        let mut command = cmd("HMSET").arg(key);
        for (field, value) in entries {
            command = command.arg(field).arg(value);
        }

        let frame = self.command(command).await?;
        Ok(reply::ok(frame)?)
    }

    /// Bulk field read; the reply stays aligned with the requested fields,
    /// with `None` holding the place of absent ones.
    pub async fn hmget<I>(&mut self, key: &str, fields: I) -> Result<Vec<Option<Bytes>>, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("HMGET").arg(key).args(fields)).await?;
        Ok(reply::optional_bulk_array(frame)?)
    }

    pub async fn hkeys(&mut self, key: &str) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("HKEYS").arg(key)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn hvals(&mut self, key: &str) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("HVALS").arg(key)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// All fields and values, empty when the key does not exist.
    pub async fn hgetall(&mut self, key: &str) -> Result<Vec<(Bytes, Bytes)>, Error> {
        let frame = self.command(cmd("HGETALL").arg(key)).await?;
        Ok(reply::pairs(frame)?)
    }

    pub async fn hlen(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("HLEN").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Sets the field only when it does not exist yet.
    pub async fn hsetnx(
        &mut self,
        key: &str,
        field: impl ToArg,
        value: impl ToArg,
    ) -> Result<bool, Error> {
        let frame = self
            .command(cmd("HSETNX").arg(key).arg(field).arg(value))
            .await?;
        Ok(reply::boolean(frame)?)
    }

    /// Integer increment of a field's value, creating the field at zero when
    /// absent. Non-numeric content makes the server reject the call.
    pub async fn hincrby(
        &mut self,
        key: &str,
        field: impl ToArg,
        amount: i64,
    ) -> Result<i64, Error> {
        let frame = self
            .command(cmd("HINCRBY").arg(key).arg(field).arg(amount))
            .await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn hincrbyfloat(
        &mut self,
        key: &str,
        field: impl ToArg,
        amount: f64,
    ) -> Result<f64, Error> {
        let frame = self
            .command(cmd("HINCRBYFLOAT").arg(key).arg(field).arg(amount))
            .await?;
        Ok(reply::float(frame)?)
    }

    /// Byte length of the value held by `field`, 0 when the key or field is
    /// missing.
    pub async fn hstrlen(&mut self, key: &str, field: impl ToArg) -> Result<i64, Error> {
        let frame = self.command(cmd("HSTRLEN").arg(key).arg(field)).await?;
        Ok(reply::integer(frame)?)
    }

    /// One page of an incremental scan over field/value pairs.
    pub async fn hscan(
        &mut self,
        key: &str,
        cursor: u64,
        pattern: Option<&str>,
        count: Option<u64>,
    ) -> Result<(u64, Vec<(Bytes, Bytes)>), Error> {
        let frame = self
            .command(scan_args(cmd("HSCAN").arg(key).arg(cursor), pattern, count))
            .await?;

        let (cursor, elements) = reply::scan_page(frame)?;
        let entries = reply::pairs(Frame::Array(elements))?;

        Ok((cursor, entries))
    }
}
