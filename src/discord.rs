use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Duration;
use tracing::debug;

use crate::config;
use crate::embed::Embed;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publishes messages to the boost channel.
#[async_trait]
pub trait Notifier {
    async fn create_message(&self, embed: &Embed) -> Result<MessageId, ClientError>;

    async fn edit_message(&self, message_id: &MessageId, embed: &Embed) -> Result<MessageId, ClientError>;

    /// Most recent message in the channel written by this bot, if any.
    async fn latest_own_message(&self) -> Result<Option<MessageId>, ClientError>;
}

#[derive(Deserialize, Debug)]
struct Message {
    id: MessageId,
    author: Author,
}

#[derive(Deserialize, Debug)]
struct Author {
    id: String,
}

#[derive(Deserialize, Debug)]
struct Created {
    id: MessageId,
}

#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: reqwest::Client,
    auth: String,
    bot_client_id: String,
    channel_id: String,
    base_url: String,
    message_history_path: String,
    create_message_path: String,
    edit_message_path: String,
}

impl DiscordClient {
    pub fn new(cfg: &config::Discord) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            auth: format!("Bot {}", cfg.token),
            bot_client_id: cfg.bot_client_id.clone(),
            channel_id: cfg.channel_id.clone(),
            base_url: cfg.base_url.clone(),
            message_history_path: cfg.message_history_path.clone(),
            create_message_path: cfg.create_message_path.clone(),
            edit_message_path: cfg.edit_message_path.clone(),
        })
    }

    fn url(&self, template: &str, message_id: Option<&MessageId>) -> String {
        let mut path = template.replacen(":channel_id", &self.channel_id, 1);

        if let Some(id) = message_id {
            path = path.replacen(":message_id", &id.0, 1);
        }

        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: String) -> Result<reqwest::Response, ClientError> {
        let resp = request
            .header(reqwest::header::AUTHORIZATION, &self.auth)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClientError::Status { status: resp.status().as_u16(), url });
        }

        Ok(resp)
    }
}

#[async_trait]
impl Notifier for DiscordClient {
    async fn create_message(&self, embed: &Embed) -> Result<MessageId, ClientError> {
        let url = self.url(&self.create_message_path, None);
        let request = self.client.post(&url).json(&json!({ "embeds": [embed] }));

        let created = self.send(request, url).await?
            .json::<Created>()
            .await?;

        debug!(message_id = %created.id, "created message");

        Ok(created.id)
    }

    async fn edit_message(&self, message_id: &MessageId, embed: &Embed) -> Result<MessageId, ClientError> {
        let url = self.url(&self.edit_message_path, Some(message_id));
        let request = self.client.patch(&url).json(&json!({ "embeds": [embed] }));

        let edited = self.send(request, url).await?
            .json::<Created>()
            .await?;

        debug!(message_id = %edited.id, "edited message");

        Ok(edited.id)
    }

    async fn latest_own_message(&self) -> Result<Option<MessageId>, ClientError> {
        let url = self.url(&self.message_history_path, None);
        let request = self.client.get(&url);

        let history = self.send(request, url).await?
            .json::<Vec<Message>>()
            .await?;

        Ok(first_by_author(history, &self.bot_client_id))
    }
}

// channel history is returned newest first
fn first_by_author(history: Vec<Message>, author_id: &str) -> Option<MessageId> {
    history.into_iter()
        .find(|message| message.author.id == author_id)
        .map(|message| message.id)
}
