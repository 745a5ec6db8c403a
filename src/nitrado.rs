use async_trait::async_trait;
use reqwest;
use serde::Deserialize;
use tokio::time::Duration;

use crate::boosts::Boost;
use crate::config;
use crate::error::ClientError;

/// Where boost history comes from.
#[async_trait]
pub trait BoostSource {
    async fn boost_history(&self, server_id: u64, auth_token: &str) -> Result<Vec<Boost>, ClientError>;
}

#[derive(Deserialize, Debug)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Deserialize, Debug)]
struct EnvelopeData {
    #[serde(default)]
    boosts: Option<Vec<Boost>>,
}

#[derive(Debug, Clone)]
pub struct NitradoClient {
    client: reqwest::Client,
    base_url: String,
    boost_history_path: String,
}

impl NitradoClient {
    pub fn new(cfg: &config::Nitrado) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            boost_history_path: cfg.boost_history_path.clone(),
        })
    }

    fn boost_history_url(&self, server_id: u64) -> String {
        let path = self.boost_history_path.replacen(":id", &server_id.to_string(), 1);
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BoostSource for NitradoClient {
    async fn boost_history(&self, server_id: u64, auth_token: &str) -> Result<Vec<Boost>, ClientError> {
        let url = self.boost_history_url(server_id);

        let resp = self.client.get(&url)
            .bearer_auth(auth_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClientError::Status { status: resp.status().as_u16(), url });
        }

        let envelope = resp.json::<Envelope>().await?;

        boosts_from_envelope(envelope)
    }
}

fn boosts_from_envelope(envelope: Envelope) -> Result<Vec<Boost>, ClientError> {
    if envelope.status != "success" {
        return Err(ClientError::Envelope(envelope.status));
    }

    let boosts = envelope.data
        .and_then(|data| data.boosts)
        .unwrap_or_default();

    Ok(boosts)
}
