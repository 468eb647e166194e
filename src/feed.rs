use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Result, anyhow};

use crate::config::AppConfig;
use crate::sheets::{fetch_roster, fetch_settings, fetch_stats};
use crate::state::{Delta, ProviderCommand, Snapshot};

/// Background fetcher. Each `Refresh` loads all three sheets and reports back
/// tagged with its cycle id; the UI thread decides whether it is still wanted.
pub fn spawn_sheet_provider(
    config: AppConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            // Refreshes queued behind this one supersede it.
            let mut latest = cmd;
            let mut skipped = 0usize;
            while let Ok(next) = cmd_rx.try_recv() {
                latest = next;
                skipped += 1;
            }

            let ProviderCommand::Refresh { cycle } = latest;
            if skipped > 0
                && tx
                    .send(Delta::Log(format!(
                        "[INFO] Coalesced {skipped} queued refresh(es) into cycle {cycle}"
                    )))
                    .is_err()
            {
                break;
            }
            let delta = match load_snapshot(&config) {
                Ok(snapshot) => Delta::Snapshot { cycle, snapshot },
                Err(err) => Delta::CycleFailed {
                    cycle,
                    error: format!("{err:#}"),
                },
            };
            if tx.send(delta).is_err() {
                break;
            }
        }
    });
}

/// Fetches stats, roster and settings concurrently; all three must succeed.
pub fn load_snapshot(config: &AppConfig) -> Result<Snapshot> {
    let (stats, roster, settings) = thread::scope(|scope| {
        let stats = scope.spawn(|| fetch_stats(config));
        let roster = scope.spawn(|| fetch_roster(config));
        let settings = fetch_settings(config);
        (
            stats
                .join()
                .unwrap_or_else(|_| Err(anyhow!("stats fetch panicked"))),
            roster
                .join()
                .unwrap_or_else(|_| Err(anyhow!("roster fetch panicked"))),
            settings,
        )
    });
    let stats = stats?;
    let roster = roster?;
    let settings = settings?;

    Ok(Snapshot {
        updated_at: stats.updated_at.max(roster.updated_at).max(settings.updated_at),
        source: stats.source,
        stats: stats.data,
        roster: roster.data,
        settings: settings.data,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn queued_refreshes_collapse_into_the_newest() {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        for cycle in 1..=3 {
            cmd_tx.send(ProviderCommand::Refresh { cycle }).unwrap();
        }
        spawn_sheet_provider(AppConfig::from_lookup(|_| None), tx, cmd_rx);

        match rx.recv_timeout(WAIT).unwrap() {
            Delta::Log(line) => {
                assert!(line.contains("Coalesced 2"), "{line}");
                assert!(line.ends_with("cycle 3"), "{line}");
            }
            other => panic!("expected coalescing log, got {other:?}"),
        }
        assert!(matches!(
            rx.recv_timeout(WAIT).unwrap(),
            Delta::Snapshot { cycle: 3, .. }
        ));

        drop(cmd_tx);
        assert!(rx.recv_timeout(WAIT).is_err());
    }

    #[test]
    fn lone_refresh_sends_only_its_snapshot() {
        let (tx, rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel();
        cmd_tx.send(ProviderCommand::Refresh { cycle: 7 }).unwrap();
        spawn_sheet_provider(AppConfig::from_lookup(|_| None), tx, cmd_rx);

        assert!(matches!(
            rx.recv_timeout(WAIT).unwrap(),
            Delta::Snapshot { cycle: 7, .. }
        ));
        drop(cmd_tx);
        assert!(rx.recv_timeout(WAIT).is_err());
    }
}
