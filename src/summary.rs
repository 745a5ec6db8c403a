use serde::Serialize;
use tracing::{info, warn};

use crate::config::ServerTarget;
use crate::discord::Notifier;
use crate::embed::{self, ServerSection};
use crate::error::ClientError;
use crate::nitrado::BoostSource;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub message: String,
    pub servers: usize,
    pub boosts: usize,
}

/// Rewrites the single summary message with the full boost history of every
/// target. Nothing is stored; each run overwrites the previous summary.
pub async fn publish_summary<S, N>(source: &S, notifier: &N, targets: &[ServerTarget]) -> Result<SummaryReport, ClientError>
where
    S: BoostSource + ?Sized,
    N: Notifier + ?Sized,
{
    let mut sections = vec![];

    for target in targets {
        let boosts = match source.boost_history(target.server_id, &target.auth_token).await {
            Ok(boosts) => boosts,
            Err(e) => {
                warn!(server_id = target.server_id, error = %e, "Unable to fetch boost history");
                vec![]
            }
        };

        sections.push(ServerSection {
            name: target.name.clone(),
            boosts,
        });
    }

    let message = embed::summary_embed(&sections);

    match notifier.latest_own_message().await? {
        Some(id) => {
            info!(message_id = %id, "Updating summary message");
            notifier.edit_message(&id, &message).await?;
        }
        None => {
            info!("Creating summary message");
            notifier.create_message(&message).await?;
        }
    }

    Ok(SummaryReport {
        message: "Success".to_string(),
        servers: sections.len(),
        boosts: sections.iter().map(|section| section.boosts.len()).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boosts::boost;
    use crate::discord::MessageId;
    use crate::testing::{RecordingNotifier, ScriptedSource};

    fn targets() -> Vec<ServerTarget> {
        vec![
            ServerTarget { server_id: 1, name: "Island".to_string(), auth_token: "t".to_string() },
            ServerTarget { server_id: 2, name: "Ragnarok".to_string(), auth_token: "t".to_string() },
        ]
    }

    #[tokio::test]
    async fn edits_existing_summary() {
        let source = ScriptedSource::new()
            .with_boosts(1, vec![boost("A", "2024-01-01T00:00:00", 86400), boost("B", "2024-01-02T00:00:00", 172800)]);
        let notifier = RecordingNotifier::new().with_latest("900");

        let report = publish_summary(&source, &notifier, &targets()).await.unwrap();

        assert_eq!(report, SummaryReport { message: "Success".to_string(), servers: 2, boosts: 2 });
        assert!(notifier.created().is_empty());

        let edited = notifier.edited();
        assert_eq!(edited.len(), 1);
        assert_eq!(edited[0].0, MessageId("900".to_string()));
        assert_eq!(edited[0].1.fields[0].value, "**A** - 2024-01-01 - 1.0 day\n**B** - 2024-01-02 - 2.0 days");
        assert_eq!(edited[0].1.fields[1].value, "No boosts");
    }

    #[tokio::test]
    async fn creates_summary_when_bot_has_no_message() {
        let source = ScriptedSource::new();
        let notifier = RecordingNotifier::new();

        publish_summary(&source, &notifier, &targets()).await.unwrap();

        assert_eq!(notifier.created().len(), 1);
        assert!(notifier.edited().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_renders_empty_section() {
        let source = ScriptedSource::new()
            .failing(1)
            .with_boosts(2, vec![boost("C", "2024-01-03T00:00:00", 86400)]);
        let notifier = RecordingNotifier::new();

        let report = publish_summary(&source, &notifier, &targets()).await.unwrap();

        assert_eq!(report.boosts, 1);
        assert_eq!(notifier.created()[0].fields[0].value, "No boosts");
    }

    #[tokio::test]
    async fn chat_outage_is_an_error() {
        let source = ScriptedSource::new();
        let notifier = RecordingNotifier::new();
        notifier.set_unavailable();

        assert!(publish_summary(&source, &notifier, &targets()).await.is_err());
    }
}
