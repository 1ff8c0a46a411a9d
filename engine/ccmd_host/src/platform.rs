//! In-memory chat platform.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ccmd_eval::{HostError, HostResult, Member, MessageContent, Platform};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

/// Something a template made the platform do.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Nickname {
        member: String,
        nickname: String,
    },
    RoleAdded {
        member: String,
        role: String,
    },
    RoleRemoved {
        member: String,
        role: String,
    },
    Message {
        id: String,
        channel: String,
        content: MessageContent,
    },
    DirectMessage {
        user: String,
        content: MessageContent,
    },
}

/// A platform whose guild lives in memory.
///
/// Member mutations are applied in place; every action is also appended to
/// an event log that [`MemoryPlatform::events`] returns in order.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    members: DashMap<String, Member>,
    events: Mutex<Vec<Event>>,
    next_message_id: AtomicU64,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member.
    pub fn insert_member(&self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    #[must_use]
    pub fn with_member(self, member: Member) -> Self {
        self.insert_member(member);
        self
    }

    /// Current state of a member.
    pub fn member(&self, id: &str) -> Option<Member> {
        self.members.get(id).map(|m| m.value().clone())
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Everything done so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Drain the event log.
    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: Event) {
        debug!(?event, "platform event");
        self.events.lock().push(event);
    }

    fn update<F>(&self, id: &str, f: F) -> HostResult<()>
    where
        F: FnOnce(&mut Member),
    {
        let mut member = self
            .members
            .get_mut(id)
            .ok_or_else(|| HostError::NotFound(format!("member {id}")))?;
        f(member.value_mut());
        Ok(())
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn resolve_member(&self, id: &str) -> HostResult<Option<Member>> {
        Ok(self.member(id))
    }

    async fn set_nickname(&self, member: &str, nickname: &str) -> HostResult<()> {
        self.update(member, |m| {
            m.nickname = (!nickname.is_empty()).then(|| nickname.to_string());
        })?;
        self.record(Event::Nickname {
            member: member.to_string(),
            nickname: nickname.to_string(),
        });
        Ok(())
    }

    async fn add_role(&self, member: &str, role: &str) -> HostResult<()> {
        self.update(member, |m| {
            if !m.has_role(role) {
                m.roles.push(role.to_string());
            }
        })?;
        self.record(Event::RoleAdded {
            member: member.to_string(),
            role: role.to_string(),
        });
        Ok(())
    }

    async fn remove_role(&self, member: &str, role: &str) -> HostResult<()> {
        self.update(member, |m| m.roles.retain(|r| r != role))?;
        self.record(Event::RoleRemoved {
            member: member.to_string(),
            role: role.to_string(),
        });
        Ok(())
    }

    async fn send_message(&self, channel: &str, content: MessageContent) -> HostResult<String> {
        if channel.is_empty() {
            return Err(HostError::NotFound("channel".to_string()));
        }
        let id = (self.next_message_id.fetch_add(1, Ordering::Relaxed) + 1).to_string();
        self.record(Event::Message {
            id: id.clone(),
            channel: channel.to_string(),
            content,
        });
        Ok(id)
    }

    async fn send_direct_message(&self, user: &str, content: MessageContent) -> HostResult<()> {
        if !self.members.contains_key(user) {
            return Err(HostError::NotFound(format!("member {user}")));
        }
        self.record(Event::DirectMessage {
            user: user.to_string(),
            content,
        });
        Ok(())
    }
}
