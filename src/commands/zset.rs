use std::str::FromStr;

use bytes::Bytes;

use crate::client::Client;
use crate::cmd::{cmd, Cmd, ToArg};
use crate::commands::scan_args;
use crate::frame::Frame;
use crate::reply;
use crate::Error;

/// Conditional behavior for ZADD. The flags mirror the command's own: `nx`
/// only adds new members, `xx` only updates existing ones, `ch` makes the
/// reply count changed members instead of added ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZAddOptions {
    pub nx: bool,
    pub xx: bool,
    pub ch: bool,
}

impl ZAddOptions {
    /// Only add new members, never update existing ones.
    pub fn only_new() -> ZAddOptions {
        ZAddOptions {
            nx: true,
            ..ZAddOptions::default()
        }
    }

    /// Only update existing members, never add new ones.
    pub fn only_existing() -> ZAddOptions {
        ZAddOptions {
            xx: true,
            ..ZAddOptions::default()
        }
    }

    pub fn count_changed(mut self) -> ZAddOptions {
        self.ch = true;
        self
    }

    fn apply(self, mut cmd: Cmd) -> Cmd {
        if self.nx {
            cmd = cmd.arg("NX");
        }
        if self.xx {
            cmd = cmd.arg("XX");
        }
        if self.ch {
            cmd = cmd.arg("CH");
        }
        cmd
    }
}

/// A score-range endpoint: inclusive or exclusive, or one of the infinities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreBound {
    NegInf,
    PosInf,
    Incl(f64),
    Excl(f64),
}

impl ToArg for ScoreBound {
    fn to_arg(&self) -> Bytes {
        match self {
            ScoreBound::NegInf => Bytes::from_static(b"-inf"),
            ScoreBound::PosInf => Bytes::from_static(b"+inf"),
            ScoreBound::Incl(score) => score.to_arg(),
            ScoreBound::Excl(score) => {
                let mut bytes = b"(".to_vec();
                bytes.extend_from_slice(&score.to_arg());
                Bytes::from(bytes)
            }
        }
    }
}

/// A lexicographic-range endpoint: `Min`/`Max` are the open ends (`-`/`+`),
/// member values are inclusive (`[`) or exclusive (`(`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexBound<'a> {
    Min,
    Max,
    Incl(&'a str),
    Excl(&'a str),
}

impl ToArg for LexBound<'_> {
    fn to_arg(&self) -> Bytes {
        match self {
            LexBound::Min => Bytes::from_static(b"-"),
            LexBound::Max => Bytes::from_static(b"+"),
            LexBound::Incl(member) => Bytes::from(format!("[{}", member)),
            LexBound::Excl(member) => Bytes::from(format!("({}", member)),
        }
    }
}

/// Offset/count pagination for the by-score and by-lex range queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limit {
    pub offset: i64,
    pub count: i64,
}

/// How ZINTERSTORE/ZUNIONSTORE combine the scores of a member present in
/// several source sets. The server defaults to summing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

impl Aggregate {
    fn as_str(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }
}

fn limit_args(cmd: Cmd, limit: Option<Limit>) -> Cmd {
    match limit {
        Some(limit) => cmd.arg("LIMIT").arg(limit.offset).arg(limit.count),
        None => cmd,
    }
}

fn store_command(
    name: &str,
    dest: &str,
    keys: &[&str],
    aggregate: Option<Aggregate>,
) -> Cmd {
    let command = cmd(name).arg(dest).arg(keys.len()).args(keys);
    match aggregate {
        Some(aggregate) => command.arg("AGGREGATE").arg(aggregate.as_str()),
        None => command,
    }
}

impl Client {
    /// Adds members with their scores, updating the score of members already
    /// present. Scores may be `±inf`. Returns the number of members added.
    pub async fn zadd<I, M>(&mut self, key: &str, members: I) -> Result<i64, Error>
    where
        I: IntoIterator<Item = (f64, M)>,
        M: ToArg,
    {
        self.zadd_options(key, ZAddOptions::default(), members).await
    }

    /// ZADD with its conditional flags; see [`ZAddOptions`].
    pub async fn zadd_options<I, M>(
        &mut self,
        key: &str,
        options: ZAddOptions,
        members: I,
    ) -> Result<i64, Error>
    where
        I: IntoIterator<Item = (f64, M)>,
        M: ToArg,
    {
        let mut command = options.apply(cmd("ZADD").arg(key));
        for (score, member) in members {
            command = command.arg(score).arg(member);
        }

        let frame = self.command(command).await?;
        Ok(reply::integer(frame)?)
    }

    /// ZADD in INCR mode: increments one member's score in place and returns
    /// the new score, or `None` when the NX/XX condition skipped the member.
    pub async fn zadd_incr(
        &mut self,
        key: &str,
        options: ZAddOptions,
        score: f64,
        member: impl ToArg,
    ) -> Result<Option<f64>, Error> {
        let command = options
            .apply(cmd("ZADD").arg(key))
            .arg("INCR")
            .arg(score)
            .arg(member);

        let frame = self.command(command).await?;
        Ok(reply::optional_float(frame)?)
    }

    pub async fn zcard(&mut self, key: &str) -> Result<i64, Error> {
        let frame = self.command(cmd("ZCARD").arg(key)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Number of members with a score inside the range.
    pub async fn zcount(
        &mut self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<i64, Error> {
        let frame = self.command(cmd("ZCOUNT").arg(key).arg(min).arg(max)).await?;
        Ok(reply::integer(frame)?)
    }

    /// Number of members inside a lexicographic range; only meaningful when
    /// all members share one score.
    pub async fn zlexcount(
        &mut self,
        key: &str,
        min: LexBound<'_>,
        max: LexBound<'_>,
    ) -> Result<i64, Error> {
        let frame = self
            .command(cmd("ZLEXCOUNT").arg(key).arg(min).arg(max))
            .await?;
        Ok(reply::integer(frame)?)
    }

    /// Adds `amount` (possibly negative) to the member's score, treating a
    /// missing member as score 0. Returns the new score.
    pub async fn zincrby(
        &mut self,
        key: &str,
        amount: f64,
        member: impl ToArg,
    ) -> Result<f64, Error> {
        let frame = self
            .command(cmd("ZINCRBY").arg(key).arg(amount).arg(member))
            .await?;
        Ok(reply::float(frame)?)
    }

    /// Intersection of the source sets materialized into `dest`; scores are
    /// combined per `aggregate` (server default: sum). Returns the result
    /// cardinality.
    pub async fn zinterstore(
        &mut self,
        dest: &str,
        keys: &[&str],
        aggregate: Option<Aggregate>,
    ) -> Result<i64, Error> {
        let frame = self
            .command(store_command("ZINTERSTORE", dest, keys, aggregate))
            .await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn zunionstore(
        &mut self,
        dest: &str,
        keys: &[&str],
        aggregate: Option<Aggregate>,
    ) -> Result<i64, Error> {
        let frame = self
            .command(store_command("ZUNIONSTORE", dest, keys, aggregate))
            .await?;
        Ok(reply::integer(frame)?)
    }

    /// Members between two ranks, ascending by score with ties broken by
    /// member. Negative ranks count from the highest-ranked end.
    pub async fn zrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>, Error> {
        let frame = self
            .command(cmd("ZRANGE").arg(key).arg(start).arg(stop))
            .await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// [`zrange`](Client::zrange) with scores attached, parsed into the
    /// caller's numeric representation (`f64` or `i64`).
    pub async fn zrange_withscores<S: FromStr>(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, S)>, Error> {
        let frame = self
            .command(cmd("ZRANGE").arg(key).arg(start).arg(stop).arg("WITHSCORES"))
            .await?;
        Ok(reply::scored(frame)?)
    }

    pub async fn zrevrange(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<Bytes>, Error> {
        let frame = self
            .command(cmd("ZREVRANGE").arg(key).arg(start).arg(stop))
            .await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn zrevrange_withscores<S: FromStr>(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, S)>, Error> {
        let frame = self
            .command(
                cmd("ZREVRANGE")
                    .arg(key)
                    .arg(start)
                    .arg(stop)
                    .arg("WITHSCORES"),
            )
            .await?;
        Ok(reply::scored(frame)?)
    }

    /// Members whose score falls inside the range, ascending.
    pub async fn zrangebyscore(
        &mut self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>, Error> {
        let command = limit_args(cmd("ZRANGEBYSCORE").arg(key).arg(min).arg(max), limit);
        let frame = self.command(command).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn zrangebyscore_withscores<S: FromStr>(
        &mut self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
        limit: Option<Limit>,
    ) -> Result<Vec<(Bytes, S)>, Error> {
        let command = limit_args(
            cmd("ZRANGEBYSCORE")
                .arg(key)
                .arg(min)
                .arg(max)
                .arg("WITHSCORES"),
            limit,
        );
        let frame = self.command(command).await?;
        Ok(reply::scored(frame)?)
    }

    /// Descending variant; note the max-before-min argument order.
    pub async fn zrevrangebyscore(
        &mut self,
        key: &str,
        max: ScoreBound,
        min: ScoreBound,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>, Error> {
        let command = limit_args(cmd("ZREVRANGEBYSCORE").arg(key).arg(max).arg(min), limit);
        let frame = self.command(command).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn zrevrangebyscore_withscores<S: FromStr>(
        &mut self,
        key: &str,
        max: ScoreBound,
        min: ScoreBound,
        limit: Option<Limit>,
    ) -> Result<Vec<(Bytes, S)>, Error> {
        let command = limit_args(
            cmd("ZREVRANGEBYSCORE")
                .arg(key)
                .arg(max)
                .arg(min)
                .arg("WITHSCORES"),
            limit,
        );
        let frame = self.command(command).await?;
        Ok(reply::scored(frame)?)
    }

    /// Members inside a lexicographic range, ascending.
    pub async fn zrangebylex(
        &mut self,
        key: &str,
        min: LexBound<'_>,
        max: LexBound<'_>,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>, Error> {
        let command = limit_args(cmd("ZRANGEBYLEX").arg(key).arg(min).arg(max), limit);
        let frame = self.command(command).await?;
        Ok(reply::bulk_array(frame)?)
    }

    pub async fn zrevrangebylex(
        &mut self,
        key: &str,
        max: LexBound<'_>,
        min: LexBound<'_>,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>, Error> {
        let command = limit_args(cmd("ZREVRANGEBYLEX").arg(key).arg(max).arg(min), limit);
        let frame = self.command(command).await?;
        Ok(reply::bulk_array(frame)?)
    }

    /// Ascending rank of a member, 0 being the lowest score. `None` when the
    /// member is absent.
    pub async fn zrank(&mut self, key: &str, member: impl ToArg) -> Result<Option<i64>, Error> {
        let frame = self.command(cmd("ZRANK").arg(key).arg(member)).await?;
        Ok(reply::optional_integer(frame)?)
    }

    /// Descending rank: 0 is the highest score.
    pub async fn zrevrank(&mut self, key: &str, member: impl ToArg) -> Result<Option<i64>, Error> {
        let frame = self.command(cmd("ZREVRANK").arg(key).arg(member)).await?;
        Ok(reply::optional_integer(frame)?)
    }

    /// Removes members, ignoring absent ones. Returns the number removed.
    pub async fn zrem<I>(&mut self, key: &str, members: I) -> Result<i64, Error>
    where
        I: IntoIterator,
        I::Item: ToArg,
    {
        let frame = self.command(cmd("ZREM").arg(key).args(members)).await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn zremrangebylex(
        &mut self,
        key: &str,
        min: LexBound<'_>,
        max: LexBound<'_>,
    ) -> Result<i64, Error> {
        let frame = self
            .command(cmd("ZREMRANGEBYLEX").arg(key).arg(min).arg(max))
            .await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn zremrangebyrank(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<i64, Error> {
        let frame = self
            .command(cmd("ZREMRANGEBYRANK").arg(key).arg(start).arg(stop))
            .await?;
        Ok(reply::integer(frame)?)
    }

    pub async fn zremrangebyscore(
        &mut self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<i64, Error> {
        let frame = self
            .command(cmd("ZREMRANGEBYSCORE").arg(key).arg(min).arg(max))
            .await?;
        Ok(reply::integer(frame)?)
    }

    /// The member's score, `None` when the member or the key is absent.
    pub async fn zscore(&mut self, key: &str, member: impl ToArg) -> Result<Option<f64>, Error> {
        let frame = self.command(cmd("ZSCORE").arg(key).arg(member)).await?;
        Ok(reply::optional_float(frame)?)
    }

    /// One page of an incremental scan over member/score pairs.
    pub async fn zscan(
        &mut self,
        key: &str,
        cursor: u64,
        pattern: Option<&str>,
        count: Option<u64>,
    ) -> Result<(u64, Vec<(Bytes, f64)>), Error> {
        let frame = self
            .command(scan_args(cmd("ZSCAN").arg(key).arg(cursor), pattern, count))
            .await?;

        let (cursor, elements) = reply::scan_page(frame)?;
        let members = reply::scored(Frame::Array(elements))?;

        Ok((cursor, members))
    }
}
