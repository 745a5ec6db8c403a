use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ServerTarget;
use crate::discord::Notifier;
use crate::history::HistoryStore;
use crate::nitrado::BoostSource;
use crate::reconcile::reconcile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Normal,
    /// Stop after the first server that announced something.
    SlowMode,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub message: String,
    pub new_boosts: usize,
    pub early_exit: bool,
    pub failed_servers: usize,
}

pub struct Runner<'a, S: ?Sized, N: ?Sized, H: ?Sized> {
    source: &'a S,
    notifier: &'a N,
    history: &'a H,
}

impl<'a, S, N, H> Runner<'a, S, N, H>
where
    S: BoostSource + ?Sized,
    N: Notifier + ?Sized,
    H: HistoryStore + ?Sized,
{
    pub fn new(source: &'a S, notifier: &'a N, history: &'a H) -> Self {
        Self { source, notifier, history }
    }

    /// Checks every target once, one after the other.
    pub async fn run(&self, targets: &[ServerTarget], mode: RunMode) -> RunSummary {
        let mut new_boosts = 0;
        let mut failed_servers = 0;

        for target in targets {
            let fetched = match self.source.boost_history(target.server_id, &target.auth_token).await {
                Ok(boosts) => boosts,
                Err(e) => {
                    warn!(server_id = target.server_id, error = %e, "Unable to fetch boost history");
                    continue;
                }
            };

            if fetched.is_empty() {
                continue;
            }

            let stored = match self.history.get(target.server_id) {
                Ok(stored) => stored,
                Err(e) => {
                    error!(server_id = target.server_id, error = %e, "Unable to read boost history, skipping server");
                    failed_servers += 1;
                    continue;
                }
            };

            let result = reconcile(target, Some(fetched), stored, self.notifier).await;
            new_boosts += result.notified_boosts.len();

            if result.notified_boosts.len() < result.new_boosts.len() {
                warn!(
                    server_id = target.server_id,
                    pending = result.new_boosts.len() - result.notified_boosts.len(),
                    "Some boosts were not announced"
                );
            }

            let Some(record) = result.updated_record else {
                continue;
            };

            if let Err(e) = self.history.put(record.server_id, &record.boosts) {
                error!(
                    server_id = target.server_id,
                    announced = result.notified_boosts.len(),
                    error = %e,
                    "Unable to save boost history"
                );
                failed_servers += 1;
            }

            if mode == RunMode::SlowMode {
                info!(server_id = target.server_id, "Exiting for slow mode");

                return RunSummary {
                    message: "Success in slow mode".to_string(),
                    new_boosts,
                    early_exit: true,
                    failed_servers,
                };
            }
        }

        info!(new_boosts, failed_servers, "Run finished");

        RunSummary {
            message: "Success".to_string(),
            new_boosts,
            early_exit: false,
            failed_servers,
        }
    }
}
