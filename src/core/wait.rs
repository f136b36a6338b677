//! # Cancellable waits.
//!
//! Every pause the supervisor takes (warning delays, the interval sleep) and every network
//! fetch races the shutdown token. The first to complete wins:
//!
//! ```text
//! pause(token, d):          select { sleep(d) ─► Ok(()) , token.cancelled() ─► Err(Interrupted) }
//! interruptible(token, f):  select { f        ─► Ok(out), token.cancelled() ─► Err(Interrupted) }
//! ```
//!
//! An already-cancelled token wins immediately, even for a zero-length pause.
//!
//! Steps that cannot be raced (the world archive, the post-`stop` grace) are bracketed
//! with [`live`] so a request that arrived meanwhile stops the cycle before the next step.

use std::future::Future;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::error::Interrupted;

/// Sleeps for `duration` unless `token` is cancelled first.
pub async fn pause(token: &CancellationToken, duration: Duration) -> Result<(), Interrupted> {
    interruptible(token, time::sleep(duration)).await
}

/// `Err(Interrupted)` once `token` has been cancelled.
#[inline]
pub fn live(token: &CancellationToken) -> Result<(), Interrupted> {
    if token.is_cancelled() {
        Err(Interrupted)
    } else {
        Ok(())
    }
}

/// Drives `fut` to completion unless `token` is cancelled first; `fut` is dropped on cancel.
pub async fn interruptible<F>(token: &CancellationToken, fut: F) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    select! {
        biased;
        _ = token.cancelled() => Err(Interrupted),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn pause_elapses_without_cancel() {
        let token = CancellationToken::new();
        let t0 = Instant::now();
        assert_eq!(pause(&token, Duration::from_secs(3600)).await, Ok(()));
        assert_eq!(t0.elapsed(), Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_cuts_pause_short() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let t0 = Instant::now();
        assert_eq!(
            pause(&token, Duration::from_secs(3600)).await,
            Err(Interrupted)
        );
        assert_eq!(t0.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_wins_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(pause(&token, Duration::ZERO).await, Err(Interrupted));
        assert_eq!(interruptible(&token, async { 7 }).await, Err(Interrupted));
    }

    #[tokio::test]
    async fn interruptible_returns_output() {
        let token = CancellationToken::new();
        assert_eq!(interruptible(&token, async { 7 }).await, Ok(7));
    }

    #[test]
    fn live_reflects_token() {
        let token = CancellationToken::new();
        assert_eq!(live(&token), Ok(()));
        token.cancel();
        assert_eq!(live(&token), Err(Interrupted));
    }
}
