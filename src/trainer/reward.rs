use std::net::SocketAddr;

use log::{info, warn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    net::{tcp::OwnedReadHalf, TcpListener},
};
use tokio_util::sync::CancellationToken;

use super::{Result, TrainerErr};

type RewardLines = Lines<BufReader<OwnedReadHalf>>;

/// Parses one line sent by the reward program.
pub fn parse_reward(line: &str) -> Result<f64> {
    match line.trim().parse::<f64>() {
        Ok(reward) if reward.is_finite() => Ok(reward),
        _ => Err(TrainerErr::InvalidReward(line.to_string())),
    }
}

/// Reads the next reward off a line oriented stream.
///
/// # Returns
/// The reward, or `ChannelClosed` once the stream ends.
pub async fn read_reward<R>(lines: &mut Lines<R>) -> Result<f64>
where
    R: AsyncBufRead + Unpin,
{
    match lines.next_line().await? {
        Some(line) => parse_reward(&line),
        None => Err(TrainerErr::ChannelClosed),
    }
}

/// The TCP endpoint a reward program connects to. Serves one connection at a time and
/// accepts a new one whenever the current one drops.
pub struct RewardChannel {
    listener: TcpListener,
    conn: Option<RewardLines>,
}

impl RewardChannel {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("waiting for a reward program at {}", listener.local_addr()?);

        Ok(Self {
            listener,
            conn: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Waits for the next reward, accepting a connection first if there's none.
    ///
    /// # Returns
    /// `None` once `token` is cancelled, otherwise the reward or why this attempt failed.
    /// A failed read drops the connection so the next call accepts a new one.
    pub async fn next_reward(&mut self, token: &CancellationToken) -> Option<Result<f64>> {
        if self.conn.is_none() {
            let accepted = tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    info!("reward program connected from {peer}");
                    let (rx, _) = stream.into_split();
                    self.conn = Some(BufReader::new(rx).lines());
                }
                Err(e) => {
                    warn!("failed to accept a reward program: {e}");
                    return Some(Err(e.into()));
                }
            }
        }

        let lines = self.conn.as_mut()?;
        let read = tokio::select! {
            biased;
            _ = token.cancelled() => return None,
            read = read_reward(lines) => read,
        };

        if matches!(read, Err(TrainerErr::ChannelClosed | TrainerErr::Io(_))) {
            warn!("reward program disconnected");
            self.conn = None;
        }

        Some(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_lines() {
        assert_eq!(parse_reward("0.75").unwrap(), 0.75);
        assert_eq!(parse_reward(" -1 \r").unwrap(), -1.);
        assert!(matches!(parse_reward("lots"), Err(TrainerErr::InvalidReward(_))));
        assert!(parse_reward("NaN").is_err());
        assert!(parse_reward("inf").is_err());
    }

    #[tokio::test]
    async fn reads_rewards_until_the_stream_ends() {
        let mock = tokio_test::io::Builder::new()
            .read(b"1.5\n-0.25\n")
            .read(b"oops\n")
            .build();
        let mut lines = BufReader::new(mock).lines();

        assert_eq!(read_reward(&mut lines).await.unwrap(), 1.5);
        assert_eq!(read_reward(&mut lines).await.unwrap(), -0.25);
        assert!(matches!(
            read_reward(&mut lines).await,
            Err(TrainerErr::InvalidReward(_))
        ));
        assert!(matches!(
            read_reward(&mut lines).await,
            Err(TrainerErr::ChannelClosed)
        ));
    }
}
