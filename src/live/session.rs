use std::collections::HashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::SessionState;

pub type MemberId = Uuid;

/// A connected member as seen by the registry: its id plus the outbound
/// queue drained by the member's connection task.
#[derive(Debug, Clone)]
pub struct MemberHandle {
    pub id: MemberId,
    pub tx: mpsc::UnboundedSender<String>,
}

impl MemberHandle {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }
}

/// One live session: the last published chart state and its current members.
#[derive(Debug)]
pub struct LiveSession {
    state: SessionState,
    members: HashMap<MemberId, mpsc::UnboundedSender<String>>,
}

impl LiveSession {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            members: HashMap::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Full replace, never a merge.
    pub fn replace_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Returns false if the member was already present (its queue is replaced).
    pub fn add_member(&mut self, member: MemberHandle) -> bool {
        self.members.insert(member.id, member.tx).is_none()
    }

    pub fn remove_member(&mut self, id: &MemberId) -> bool {
        self.members.remove(id).is_some()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> impl Iterator<Item = (&MemberId, &mpsc::UnboundedSender<String>)> {
        self.members.iter()
    }
}
