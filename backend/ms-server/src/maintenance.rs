use crate::Gatekeeper;

use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

/// How often expired limiter buckets are dropped
pub const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drop rate-limit buckets whose window has elapsed.
///
/// The first purge happens one `every` after start.
pub fn spawn_purge_task(gatekeeper: Gatekeeper, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let purged = gatekeeper.purge_expired();
            if purged > 0 {
                debug!("Purged {purged} expired rate-limit buckets");
            }
        }
    })
}
