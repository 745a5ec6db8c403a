use tracing::{info, warn};

use crate::boosts::{Boost, ServerBoostRecord};
use crate::config::ServerTarget;
use crate::discord::Notifier;
use crate::embed;

/// Outcome of reconciling one server's fetched boosts against its history.
#[derive(Debug, Default, PartialEq)]
pub struct ReconciliationResult {
    /// Fetched boosts that were not in the history yet.
    pub new_boosts: Vec<Boost>,
    /// The part of `new_boosts` that was announced successfully.
    pub notified_boosts: Vec<Boost>,
    /// Record to write back, `None` when nothing changed.
    pub updated_record: Option<ServerBoostRecord>,
}

/// Announces every fetched boost missing from `stored` and works out the
/// history to persist.
///
/// A boost only enters the history once its announcement went through, so a
/// failed announcement is tried again on the next run and a successful one is
/// never repeated.
pub async fn reconcile<N>(
    target: &ServerTarget,
    fetched: Option<Vec<Boost>>,
    stored: Option<ServerBoostRecord>,
    notifier: &N,
) -> ReconciliationResult
where
    N: Notifier + ?Sized,
{
    let fetched = match fetched {
        Some(boosts) if !boosts.is_empty() => boosts,
        _ => return ReconciliationResult::default(),
    };

    let existing = stored
        .map(|record| ServerBoostRecord::new(target.server_id, record.boosts))
        .unwrap_or_else(|| ServerBoostRecord::new(target.server_id, vec![]));

    let mut new_boosts: Vec<Boost> = vec![];

    for boost in fetched {
        // the provider may list the same boost twice
        if existing.contains(&boost) || new_boosts.iter().any(|seen| seen.is_same_event(&boost)) {
            continue;
        }
        new_boosts.push(boost);
    }

    if new_boosts.is_empty() {
        return ReconciliationResult::default();
    }

    info!(server_id = target.server_id, count = new_boosts.len(), "found new boosts");

    let mut notified_boosts = vec![];

    for boost in &new_boosts {
        let message = embed::boost_embed(&target.name, boost);

        match notifier.create_message(&message).await {
            Ok(_) => notified_boosts.push(boost.clone()),
            Err(e) => {
                warn!(
                    server_id = target.server_id,
                    username = %boost.username,
                    error = %e,
                    "Unable to announce boost, retrying next run"
                );
            }
        }
    }

    let updated_record = if notified_boosts.is_empty() {
        None
    } else {
        let mut boosts = existing.boosts;
        boosts.extend(notified_boosts.iter().cloned());
        Some(ServerBoostRecord::new(target.server_id, boosts))
    };

    ReconciliationResult {
        new_boosts,
        notified_boosts,
        updated_record,
    }
}
