use bytes::Bytes;
use thiserror::Error as ThisError;
use tracing::debug;

use crate::cmd::{cmd, Cmd};
use crate::connection::Connection;
use crate::frame::Frame;
use crate::reply;
use crate::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 6379;

/// Where to connect and which logical database to land in.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db: 0,
        }
    }
}

impl Config {
    pub fn new(host: impl Into<String>, port: u16, db: u32) -> Config {
        Config {
            host: host.into(),
            port,
            db,
        }
    }
}

/// An error reply from the server, carried verbatim. The client performs no
/// validation of its own, so every `WRONGTYPE`, `ERR wrong number of
/// arguments` and the like originates server-side and aborts only the call
/// that triggered it.
#[derive(Debug, ThisError, PartialEq)]
#[error("{0}")]
pub struct ServerError(pub String);

impl ServerError {
    /// The leading token of the message (`ERR`, `WRONGTYPE`, ...).
    pub fn code(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or("")
    }
}

/// The command façade: one typed method per server command, all sharing one
/// connection. The method inventory lives in the [`crate::commands`] modules,
/// split by data-structure category; key-space administration is below.
pub struct Client {
    conn: Connection,
}

impl Client {
    /// Connects with defaults: `127.0.0.1:6379`, database 0.
    pub async fn connect() -> Result<Client, Error> {
        Client::connect_with(Config::default()).await
    }

    /// Database 0 is what a fresh connection lands in, so SELECT is only
    /// issued for the other indexes.
    pub async fn connect_with(config: Config) -> Result<Client, Error> {
        let conn = Connection::connect(&config.host, config.port).await?;
        let mut client = Client { conn };

        if config.db != 0 {
            client.select(config.db).await?;
        }

        Ok(client)
    }

    pub fn from_connection(conn: Connection) -> Client {
        Client { conn }
    }

    /// Sends one command and hands back the reply frame, with server-reported
    /// errors surfaced as [`ServerError`].
    pub(crate) async fn command(&mut self, cmd: Cmd) -> Result<Frame, Error> {
        match self.conn.round_trip(cmd.into_frame()).await? {
            Frame::Error(message) => {
                debug!(connection_id = %self.conn.id, %message, "server error reply");
                Err(ServerError(message).into())
            }
            frame => Ok(frame),
        }
    }

    pub async fn ping(&mut self) -> Result<(), Error> {
        let frame = self.command(cmd("PING")).await?;
        match reply::simple(frame)? {
            s if s == "PONG" => Ok(()),
            s => Err(format!("unexpected PING reply: {}", s).into()),
        }
    }

    pub async fn select(&mut self, db: u32) -> Result<(), Error> {
        let frame = self.command(cmd("SELECT").arg(db)).await?;
        Ok(reply::ok(frame)?)
    }

    /// Removes every key in the connected database.
    pub async fn flushdb(&mut self) -> Result<(), Error> {
        let frame = self.command(cmd("FLUSHDB")).await?;
        Ok(reply::ok(frame)?)
    }

    /// Keys matching a glob-style pattern. Matching happens server-side; the
    /// pattern is passed through untouched.
    pub async fn keys(&mut self, pattern: &str) -> Result<Vec<Bytes>, Error> {
        let frame = self.command(cmd("KEYS").arg(pattern)).await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// Sets a time-to-live in seconds on any entity. Returns whether the key
    /// existed and got a timeout.
    pub async fn expire(&mut self, key: &str, seconds: u64) -> Result<bool, Error> {
        let frame = self.command(cmd("EXPIRE").arg(key).arg(seconds)).await?;
        Ok(reply::boolean(frame)?)
    }

    /// Deletes a key of any kind. The reply is the number of keys that
    /// actually existed, i.e. 1 or 0 for a single-key delete.
    pub async fn del(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("DEL").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_exposes_its_code() {
        let err = ServerError(
            "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
        );

        assert_eq!(err.code(), "WRONGTYPE");
        assert_eq!(
            err.to_string(),
            "WRONGTYPE Operation against a key holding the wrong kind of value"
        );
    }

    #[test]
    fn server_error_code_of_empty_message() {
        assert_eq!(ServerError(String::new()).code(), "");
    }

    #[test]
    fn config_defaults_to_local_server() {
        let config = Config::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db, 0);
    }
}
