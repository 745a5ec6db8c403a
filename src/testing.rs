//! Test doubles for the run's collaborators, recording every call.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::boosts::{Boost, ServerBoostRecord};
use crate::discord::{MessageId, Notifier};
use crate::embed::Embed;
use crate::error::{ClientError, StoreError};
use crate::history::HistoryStore;
use crate::nitrado::BoostSource;

// pulls the booster out of "... boosted by **name** for ..."
fn booster(embed: &Embed) -> String {
    embed.description
        .split("by **")
        .nth(1)
        .and_then(|rest| rest.split("**").next())
        .unwrap_or_default()
        .to_string()
}

#[derive(Default)]
pub struct RecordingNotifier {
    failing: Mutex<HashSet<String>>,
    attempts: Mutex<Vec<String>>,
    created: Mutex<Vec<Embed>>,
    edited: Mutex<Vec<(MessageId, Embed)>>,
    latest: Mutex<Option<MessageId>>,
    unavailable: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, username: &str) {
        self.failing.lock().unwrap().insert(username.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Every call fails, like a chat API that is down.
    pub fn set_unavailable(&self) {
        *self.unavailable.lock().unwrap() = true;
    }

    pub fn with_latest(self, id: &str) -> Self {
        *self.latest.lock().unwrap() = Some(MessageId(id.to_string()));
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<Embed> {
        self.created.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<(MessageId, Embed)> {
        self.edited.lock().unwrap().clone()
    }

    fn refused() -> ClientError {
        ClientError::Status { status: 503, url: "https://chat.test".to_string() }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn create_message(&self, embed: &Embed) -> Result<MessageId, ClientError> {
        let name = booster(embed);
        self.attempts.lock().unwrap().push(name.clone());

        if *self.unavailable.lock().unwrap() || self.failing.lock().unwrap().contains(&name) {
            return Err(Self::refused());
        }

        let mut created = self.created.lock().unwrap();
        created.push(embed.clone());

        Ok(MessageId(created.len().to_string()))
    }

    async fn edit_message(&self, message_id: &MessageId, embed: &Embed) -> Result<MessageId, ClientError> {
        if *self.unavailable.lock().unwrap() {
            return Err(Self::refused());
        }

        self.edited.lock().unwrap().push((message_id.clone(), embed.clone()));

        Ok(message_id.clone())
    }

    async fn latest_own_message(&self) -> Result<Option<MessageId>, ClientError> {
        if *self.unavailable.lock().unwrap() {
            return Err(Self::refused());
        }

        Ok(self.latest.lock().unwrap().clone())
    }
}

/// In-memory history that remembers every write.
#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<HashMap<u64, Vec<Boost>>>,
    writes: Mutex<Vec<u64>>,
    failing_reads: Mutex<HashSet<u64>>,
    failing_writes: Mutex<HashSet<u64>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, server_id: u64, boosts: Vec<Boost>) -> Self {
        self.records.lock().unwrap().insert(server_id, boosts);
        self
    }

    pub fn fail_reads_for(&self, server_id: u64) {
        self.failing_reads.lock().unwrap().insert(server_id);
    }

    pub fn fail_writes_for(&self, server_id: u64) {
        self.failing_writes.lock().unwrap().insert(server_id);
    }

    pub fn boosts(&self, server_id: u64) -> Option<Vec<Boost>> {
        self.records.lock().unwrap().get(&server_id).cloned()
    }

    pub fn writes(&self) -> Vec<u64> {
        self.writes.lock().unwrap().clone()
    }

    fn broken() -> StoreError {
        StoreError::Sqlite(rusqlite::Error::InvalidQuery)
    }
}

impl HistoryStore for MemoryHistory {
    fn get(&self, server_id: u64) -> Result<Option<ServerBoostRecord>, StoreError> {
        if self.failing_reads.lock().unwrap().contains(&server_id) {
            return Err(Self::broken());
        }

        Ok(self.records.lock().unwrap()
            .get(&server_id)
            .map(|boosts| ServerBoostRecord::new(server_id, boosts.clone())))
    }

    fn put(&self, server_id: u64, boosts: &[Boost]) -> Result<(), StoreError> {
        self.writes.lock().unwrap().push(server_id);

        if self.failing_writes.lock().unwrap().contains(&server_id) {
            return Err(Self::broken());
        }

        self.records.lock().unwrap().insert(server_id, boosts.to_vec());

        Ok(())
    }
}

/// Boost source answering from a fixed table.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<HashMap<u64, Vec<Boost>>>,
    failing: Mutex<HashSet<u64>>,
    queried: Mutex<Vec<(u64, String)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boosts(self, server_id: u64, boosts: Vec<Boost>) -> Self {
        self.responses.lock().unwrap().insert(server_id, boosts);
        self
    }

    pub fn failing(self, server_id: u64) -> Self {
        self.failing.lock().unwrap().insert(server_id);
        self
    }

    pub fn queried(&self) -> Vec<u64> {
        self.queried.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.queried.lock().unwrap().iter().map(|(_, token)| token.clone()).collect()
    }
}

#[async_trait]
impl BoostSource for ScriptedSource {
    async fn boost_history(&self, server_id: u64, auth_token: &str) -> Result<Vec<Boost>, ClientError> {
        self.queried.lock().unwrap().push((server_id, auth_token.to_string()));

        if self.failing.lock().unwrap().contains(&server_id) {
            return Err(ClientError::Envelope("error".to_string()));
        }

        Ok(self.responses.lock().unwrap().get(&server_id).cloned().unwrap_or_default())
    }
}
