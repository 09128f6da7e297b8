use bytes::Bytes;

use crate::client::Client;
use crate::cmd::{cmd, ToArg};
use crate::reply;
use crate::Error;

impl Client {
    pub async fn set(&mut self, key: &str, value: impl ToArg) -> Result<(), Error> {
        let frame = self.command(cmd("SET").arg(key).arg(value)).await?;
        Ok(reply::ok(frame)?)
    }

    pub async fn get(&mut self, key: &str) -> Result<Option<Bytes>, Error> {
        let frame = self.command(cmd("GET").arg(key)).await?;
        Ok(reply::bulk(frame)?)
    }

    /// Increments the integer stored at `key` by one, creating it at zero
    /// first if absent. A key holding non-numeric content makes the server
    /// reject the call.
    pub async fn incr(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("INCR").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn incrby(&mut self, key: &str, amount: i64) -> Result<i64, Error> {
        let frame = self.command(cmd("INCRBY").arg(key).arg(amount)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn decr(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("DECR").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn decrby(&mut self, key: &str, amount: i64) -> Result<i64, Error> {
        let frame = self.command(cmd("DECRBY").arg(key).arg(amount)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Appends to the value at `key` (creating it when absent) and returns
    /// the resulting length in bytes.
    pub async fn append(&mut self, key: &str, value: impl ToArg) -> Result<i64, Error> {
        let frame = self.command(cmd("APPEND").arg(key).arg(value)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn strlen(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("STRLEN").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    /// SET with a time-to-live in seconds.
    pub async fn setex(
        &mut self,
        key: &str,
        seconds: u64,
        value: impl ToArg,
    ) -> Result<(), Error> {
        let frame = self
            .command(cmd("SETEX").arg(key).arg(seconds).arg(value))
            .await?;
        Ok(reply::ok(frame)?)
    }

    /// Sets only when the key does not exist yet; the reply tells whether the
    /// value was written.
    pub async fn setnx(&mut self, key: &str, value: impl ToArg) -> Result<bool, Error> {
        let frame = self.command(cmd("SETNX").arg(key).arg(value)).await?;
        Ok(reply::boolean(frame)?)
    }
}
