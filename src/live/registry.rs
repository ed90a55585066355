use dashmap::DashMap;

use super::events::{SessionBroadcast, SessionState};
use super::session::{LiveSession, MemberHandle, MemberId};

/// Result of a publish: the frame that was queued and who it was queued for.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub frame: SessionBroadcast,
    /// Members of the session at the moment of publish.
    pub recipients: Vec<MemberId>,
    /// Recipients whose outbound queue was already closed.
    pub failed: Vec<MemberId>,
}

impl Broadcast {
    pub fn member_count(&self) -> usize {
        self.recipients.len()
    }
}

/// Process-wide table of live sessions.
///
/// Every operation runs under the map's entry lock for that session id, so
/// joins, leaves and publishes on one session are serialized while other
/// sessions proceed independently. None of them await.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, LiveSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `member` to `session_id`, creating the session from `proposed` if
    /// it does not exist yet. Returns the session state after the join.
    pub fn join_or_create(
        &self,
        session_id: &str,
        proposed: SessionState,
        member: MemberHandle,
    ) -> SessionState {
        let member_id = member.id;
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, ?proposed, "creating live session");
                LiveSession::new(proposed)
            });

        if !session.add_member(member) {
            tracing::warn!(session_id, %member_id, "member joined a session twice");
        }
        tracing::debug!(
            session_id,
            %member_id,
            members = session.member_count(),
            "member joined live session"
        );
        session.state()
    }

    /// Remove `member_id` from `session_id`. Returns false (and logs) when the
    /// session is unknown or the member was not in it.
    pub fn leave(&self, session_id: &str, member_id: MemberId) -> bool {
        let Some(mut session) = self.sessions.get_mut(session_id) else {
            tracing::error!(session_id, %member_id, "leave for unknown live session");
            return false;
        };
        if !session.remove_member(&member_id) {
            tracing::error!(session_id, %member_id, "leave for member not in live session");
            return false;
        }
        tracing::debug!(
            session_id,
            %member_id,
            members = session.member_count(),
            "member left live session"
        );
        true
    }

    /// Replace the session state and queue the resulting broadcast for every
    /// current member, in publish order. A closed member queue is skipped
    /// without affecting the rest. Returns None for an unknown session.
    pub fn publish(&self, session_id: &str, state: SessionState) -> Option<Broadcast> {
        let Some(mut session) = self.sessions.get_mut(session_id) else {
            tracing::error!(session_id, "publish to unknown live session");
            return None;
        };
        session.replace_state(state);

        let frame = SessionBroadcast {
            conf: state.conf,
            area: state.area,
            num_clients: session.member_count(),
        };
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session_id, "failed to encode broadcast: {e}");
                return None;
            }
        };

        let mut recipients = Vec::with_capacity(frame.num_clients);
        let mut failed = Vec::new();
        for (member_id, tx) in session.members() {
            recipients.push(*member_id);
            if tx.send(text.clone()).is_err() {
                tracing::warn!(session_id, %member_id, "member queue closed, skipping broadcast");
                failed.push(*member_id);
            }
        }

        Some(Broadcast {
            frame,
            recipients,
            failed,
        })
    }

    /// Current state and member count of a session, if it exists.
    pub fn snapshot(&self, session_id: &str) -> Option<(SessionState, usize)> {
        self.sessions
            .get(session_id)
            .map(|session| (session.state(), session.member_count()))
    }

    /// Number of sessions ever created. Empty sessions are kept so a rejoin
    /// restores their last state.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn member() -> (MemberHandle, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MemberHandle::new(tx), rx)
    }

    fn state(conf: i64, area: i64) -> SessionState {
        SessionState { conf, area }
    }

    fn recv_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> SessionBroadcast {
        let text = rx.try_recv().expect("expected a queued broadcast");
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn first_join_seeds_session_state() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = member();
        let (b, _rx_b) = member();

        assert_eq!(registry.join_or_create("s1", state(5, 2), a), state(5, 2));
        assert_eq!(registry.join_or_create("s1", state(99, 99), b), state(5, 2));
        assert_eq!(registry.snapshot("s1"), Some((state(5, 2), 2)));
    }

    #[test]
    fn publish_reaches_every_member_with_count() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = member();
        let (b, mut rx_b) = member();
        let (c, mut rx_c) = member();
        let ids = [a.id, b.id, c.id];
        registry.join_or_create("s1", state(1, 1), a);
        registry.join_or_create("s1", state(0, 0), b);
        registry.join_or_create("s1", state(0, 0), c);

        let broadcast = registry.publish("s1", state(7, 3)).unwrap();
        assert_eq!(broadcast.member_count(), 3);
        assert!(broadcast.failed.is_empty());
        for id in ids {
            assert!(broadcast.recipients.contains(&id));
        }

        let expected = SessionBroadcast {
            conf: 7,
            area: 3,
            num_clients: 3,
        };
        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            assert_eq!(recv_frame(rx), expected);
            assert!(rx.try_recv().is_err(), "expected exactly one broadcast");
        }
        assert_eq!(registry.snapshot("s1"), Some((state(7, 3), 3)));
    }

    #[test]
    fn leave_shrinks_broadcast_audience() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = member();
        let (b, mut rx_b) = member();
        let b_id = b.id;
        registry.join_or_create("s1", state(1, 1), a);
        registry.join_or_create("s1", state(1, 1), b);

        assert!(registry.leave("s1", b_id));
        let broadcast = registry.publish("s1", state(8, 2)).unwrap();
        assert_eq!(broadcast.frame.num_clients, 1);
        assert_eq!(recv_frame(&mut rx_a).num_clients, 1);
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn double_leave_is_a_noop() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = member();
        let (b, _rx_b) = member();
        let (a_id, b_id) = (a.id, b.id);
        registry.join_or_create("s1", state(1, 1), a);
        registry.join_or_create("s1", state(1, 1), b);

        assert!(registry.leave("s1", a_id));
        assert!(!registry.leave("s1", a_id));
        assert_eq!(registry.snapshot("s1"), Some((state(1, 1), 1)));
        assert!(registry.leave("s1", b_id));
    }

    #[test]
    fn unknown_session_operations_do_not_panic() {
        let registry = SessionRegistry::new();
        assert!(!registry.leave("missing", MemberId::new_v4()));
        assert!(registry.publish("missing", state(1, 1)).is_none());
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn sessions_do_not_cross_deliver() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = member();
        let (b, mut rx_b) = member();
        registry.join_or_create("s1", state(1, 1), a);
        registry.join_or_create("s2", state(2, 2), b);

        registry.publish("s1", state(3, 3)).unwrap();
        assert_eq!(recv_frame(&mut rx_a).conf, 3);
        assert!(rx_b.try_recv().is_err());
        assert_eq!(registry.snapshot("s2"), Some((state(2, 2), 1)));
    }

    #[test]
    fn closed_member_queue_does_not_block_others() {
        let registry = SessionRegistry::new();
        let (a, rx_a) = member();
        let (b, mut rx_b) = member();
        let a_id = a.id;
        registry.join_or_create("s1", state(1, 1), a);
        registry.join_or_create("s1", state(1, 1), b);
        drop(rx_a);

        let broadcast = registry.publish("s1", state(4, 4)).unwrap();
        assert_eq!(broadcast.failed, vec![a_id]);
        assert_eq!(broadcast.member_count(), 2);
        assert_eq!(recv_frame(&mut rx_b).conf, 4);
    }

    #[test]
    fn empty_session_keeps_last_state_on_rejoin() {
        let registry = SessionRegistry::new();
        let (a, _rx_a) = member();
        let a_id = a.id;
        registry.join_or_create("s1", state(5, 2), a);
        registry.publish("s1", state(9, 1)).unwrap();
        registry.leave("s1", a_id);
        assert_eq!(registry.snapshot("s1"), Some((state(9, 1), 0)));

        let (b, _rx_b) = member();
        assert_eq!(registry.join_or_create("s1", state(0, 0), b), state(9, 1));
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn broadcasts_arrive_in_publish_order() {
        let registry = SessionRegistry::new();
        let (a, mut rx_a) = member();
        let (b, mut rx_b) = member();
        registry.join_or_create("s1", state(0, 0), a);
        registry.join_or_create("s1", state(0, 0), b);

        for conf in 1..=5 {
            registry.publish("s1", state(conf, 0)).unwrap();
        }
        for rx in [&mut rx_a, &mut rx_b] {
            let confs: Vec<i64> = (0..5).map(|_| recv_frame(rx).conf).collect();
            assert_eq!(confs, vec![1, 2, 3, 4, 5]);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_joins_create_one_session() {
        let registry = Arc::new(SessionRegistry::new());
        let mut receivers = Vec::new();
        let mut tasks = Vec::new();
        for i in 0..32 {
            let (handle, rx) = member();
            receivers.push(rx);
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.join_or_create("shared", state(i, i), handle)
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }
        let (current, members) = registry.snapshot("shared").unwrap();
        assert_eq!(members, 32);
        assert!(results.iter().all(|s| *s == current));
        assert_eq!(registry.session_count(), 1);
    }
}
