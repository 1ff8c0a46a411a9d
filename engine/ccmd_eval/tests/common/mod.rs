//! Recording host used by the integration tests.

#![allow(dead_code, reason = "each test binary uses a subset")]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ccmd_eval::{
    async_trait, Engine, EngineConfig, EntryType, HostError, HostResult, Member, MessageContent,
    Platform, Query, QueryPolicy, Row, Store,
};
use ccmd_value::{Context, Value};
use parking_lot::Mutex;

/// Something the host was asked to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Nickname { member: String, nickname: String },
    AddRole { member: String, role: String },
    RemoveRole { member: String, role: String },
    Message { channel: String, content: MessageContent },
    Direct { user: String, content: MessageContent },
}

#[derive(Default)]
pub struct RecordingHost {
    pub members: Mutex<BTreeMap<String, Member>>,
    pub actions: Mutex<Vec<Action>>,
    pub entries: Mutex<BTreeMap<(String, EntryType), Value>>,
    pub rows: Mutex<BTreeMap<String, Vec<Row>>>,
    /// Delay applied to every query.
    pub query_delay: Option<Duration>,
}

impl RecordingHost {
    pub fn with_member(self, member: Member) -> Self {
        self.members.lock().insert(member.id.clone(), member);
        self
    }

    pub fn with_rows(self, table: &str, rows: Vec<Row>) -> Self {
        self.rows.lock().insert(table.to_string(), rows);
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().clone()
    }
}

#[async_trait]
impl Platform for RecordingHost {
    async fn resolve_member(&self, id: &str) -> HostResult<Option<Member>> {
        Ok(self.members.lock().get(id).cloned())
    }

    async fn set_nickname(&self, member: &str, nickname: &str) -> HostResult<()> {
        if !self.members.lock().contains_key(member) {
            return Err(HostError::NotFound(format!("member {member}")));
        }
        self.actions.lock().push(Action::Nickname {
            member: member.to_string(),
            nickname: nickname.to_string(),
        });
        Ok(())
    }

    async fn add_role(&self, member: &str, role: &str) -> HostResult<()> {
        let mut members = self.members.lock();
        let Some(found) = members.get_mut(member) else {
            return Err(HostError::NotFound(format!("member {member}")));
        };
        found.roles.push(role.to_string());
        self.actions.lock().push(Action::AddRole {
            member: member.to_string(),
            role: role.to_string(),
        });
        Ok(())
    }

    async fn remove_role(&self, member: &str, role: &str) -> HostResult<()> {
        let mut members = self.members.lock();
        let Some(found) = members.get_mut(member) else {
            return Err(HostError::NotFound(format!("member {member}")));
        };
        found.roles.retain(|r| r != role);
        self.actions.lock().push(Action::RemoveRole {
            member: member.to_string(),
            role: role.to_string(),
        });
        Ok(())
    }

    async fn send_message(&self, channel: &str, content: MessageContent) -> HostResult<String> {
        let mut actions = self.actions.lock();
        actions.push(Action::Message {
            channel: channel.to_string(),
            content,
        });
        Ok(actions.len().to_string())
    }

    async fn send_direct_message(&self, user: &str, content: MessageContent) -> HostResult<()> {
        self.actions.lock().push(Action::Direct {
            user: user.to_string(),
            content,
        });
        Ok(())
    }
}

#[async_trait]
impl Store for RecordingHost {
    async fn get(&self, key: &str, ty: EntryType) -> HostResult<Option<Value>> {
        Ok(self.entries.lock().get(&(key.to_string(), ty)).cloned())
    }

    async fn set(
        &self,
        key: &str,
        ty: EntryType,
        value: Value,
        _description: &str,
    ) -> HostResult<()> {
        self.entries.lock().insert((key.to_string(), ty), value);
        Ok(())
    }

    async fn delete(&self, key: &str, ty: EntryType) -> HostResult<bool> {
        Ok(self.entries.lock().remove(&(key.to_string(), ty)).is_some())
    }

    async fn query(&self, query: Query<'_>) -> HostResult<Vec<Row>> {
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        let rows = self.rows.lock();
        let Some(table) = rows.get(query.table) else {
            return Ok(Vec::new());
        };
        Ok(table
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(column, value)| row.get(column) == Some(value))
            })
            .cloned()
            .collect())
    }
}

pub fn member(id: &str, username: &str) -> Member {
    Member {
        id: id.to_string(),
        username: username.to_string(),
        ..Member::default()
    }
}

pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub fn context() -> Context {
    Context::builder()
        .field("User", "ID", "42")
        .field("User", "Username", "Nova")
        .field("Channel", "ID", "7")
        .field("Guild", "ID", "1")
        .build()
}

pub fn scores_policy() -> EngineConfig {
    EngineConfig {
        query: QueryPolicy::default().with_table("scores", ["user", "points"]),
        ..EngineConfig::default()
    }
}

pub fn engine(host: &Arc<RecordingHost>, config: EngineConfig) -> Engine {
    Engine::builder()
        .platform(host.clone())
        .store(host.clone())
        .config(config)
        .build()
}

pub async fn run(engine: &Engine, template: &str) -> String {
    match engine.evaluate(template, &context(), &[]).await {
        Ok(out) => out,
        Err(err) => format!("engine error: {err}"),
    }
}
