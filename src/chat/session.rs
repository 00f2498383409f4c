use crate::core::currency::CurrencyCode;
use crate::core::engine::ConversionRequest;
use std::collections::HashMap;
use std::fmt::{self, Display};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationId(pub i64);

impl Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the guided conversion is waiting for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftStage {
    #[default]
    SelectingFrom,
    AwaitingAmount,
    SelectingTo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingItem {
    pub from: CurrencyCode,
    pub amount: Option<f64>,
}

/// A conversion assembled one button press at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertDraft {
    pub items: Vec<PendingItem>,
    pub to: Option<CurrencyCode>,
    pub stage: DraftStage,
}

impl ConvertDraft {
    pub fn begin_item(&mut self, from: CurrencyCode) {
        self.items.push(PendingItem { from, amount: None });
        self.stage = DraftStage::AwaitingAmount;
    }

    /// Fills the most recent item still missing an amount.
    pub fn set_pending_amount(&mut self, amount: f64) -> bool {
        match self.items.iter_mut().rev().find(|item| item.amount.is_none()) {
            Some(item) => {
                item.amount = Some(amount);
                self.stage = DraftStage::SelectingFrom;
                true
            }
            None => false,
        }
    }

    pub fn has_missing_amounts(&self) -> bool {
        self.items.iter().any(|item| item.amount.is_none())
    }

    /// `None` until there is a target and every item has an amount.
    pub fn to_request(&self) -> Option<ConversionRequest> {
        let to = self.to?;
        let items = self
            .items
            .iter()
            .map(|item| item.amount.map(|amount| (amount, item.from)))
            .collect::<Option<Vec<_>>>()?;
        ConversionRequest::from_items(items, to)
    }
}

/// Scratch state of a single conversation.
#[derive(Debug, Default)]
pub struct Session {
    pub draft: Option<ConvertDraft>,
    pub selected: Vec<CurrencyCode>,
}

impl Session {
    pub fn toggle(&mut self, code: CurrencyCode) {
        if let Some(pos) = self.selected.iter().position(|c| *c == code) {
            self.selected.remove(pos);
        } else {
            self.selected.push(code);
        }
    }

    pub fn is_awaiting_amount(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|d| d.stage == DraftStage::AwaitingAmount)
    }

    /// Nothing worth keeping: no draft and no selection.
    pub fn is_idle(&self) -> bool {
        self.draft.is_none() && self.selected.is_empty()
    }
}

/// Per-conversation sessions. Never shared between conversations.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<ConversationId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the conversation's session, creating it on first use.
    ///
    /// A session left idle by `f` is dropped, so the store only holds
    /// conversations with a draft or a selection in progress.
    pub async fn with_session<R>(
        &self,
        id: ConversationId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> R {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(id).or_insert_with(|| {
            debug!(conversation = %id, "Opening session");
            Session::default()
        });
        let result = f(session);
        if session.is_idle() {
            sessions.remove(&id);
            debug!(conversation = %id, open = sessions.len(), "Closed idle session");
        }
        result
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Reads the conversation's session without creating one.
    pub async fn peek<R>(&self, id: ConversationId, f: impl FnOnce(Option<&Session>) -> R) -> R {
        let sessions = self.sessions.lock().await;
        f(sessions.get(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_draft_builds_multi_request() {
        let mut draft = ConvertDraft::default();
        draft.begin_item(code("USD"));
        assert_eq!(draft.stage, DraftStage::AwaitingAmount);
        assert!(draft.set_pending_amount(30.0));
        draft.begin_item(code("EUR"));
        assert!(draft.set_pending_amount(40.0));
        assert_eq!(draft.stage, DraftStage::SelectingFrom);

        assert_eq!(draft.to_request(), None);
        draft.to = Some(code("RUB"));
        assert_eq!(
            draft.to_request(),
            Some(ConversionRequest::Multi {
                items: vec![(30.0, code("USD")), (40.0, code("EUR"))],
                to: code("RUB"),
            })
        );
    }

    #[test]
    fn test_draft_with_missing_amount_has_no_request() {
        let mut draft = ConvertDraft::default();
        draft.begin_item(code("USD"));
        draft.to = Some(code("RUB"));
        assert!(draft.has_missing_amounts());
        assert_eq!(draft.to_request(), None);
        assert!(draft.set_pending_amount(5.0));
        assert!(!draft.set_pending_amount(6.0));
        assert_eq!(
            draft.to_request(),
            Some(ConversionRequest::Simple {
                amount: 5.0,
                from: code("USD"),
                to: code("RUB"),
            })
        );
    }

    #[test]
    fn test_session_toggle() {
        let mut session = Session::default();
        session.toggle(code("USD"));
        session.toggle(code("EUR"));
        session.toggle(code("USD"));
        assert_eq!(session.selected, vec![code("EUR")]);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store
            .with_session(ConversationId(1), |s| s.toggle(code("USD")))
            .await;
        let other = store
            .with_session(ConversationId(2), |s| s.selected.clone())
            .await;
        let mine = store
            .with_session(ConversationId(1), |s| s.selected.clone())
            .await;
        assert!(other.is_empty());
        assert_eq!(mine, vec![code("USD")]);
    }

    #[tokio::test]
    async fn test_read_only_turns_leave_no_sessions() {
        let store = SessionStore::new();
        for id in 0..1000 {
            let awaiting = store
                .peek(ConversationId(id), |s| s.is_some_and(Session::is_awaiting_amount))
                .await;
            assert!(!awaiting);
            store
                .with_session(ConversationId(id), |s| s.is_awaiting_amount())
                .await;
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_session_dropped_once_idle() {
        let store = SessionStore::new();
        let id = ConversationId(5);
        store
            .with_session(id, |s| s.draft = Some(ConvertDraft::default()))
            .await;
        store.with_session(id, |s| s.toggle(code("EUR"))).await;
        assert_eq!(store.len().await, 1);

        // Finishing the draft keeps the selection alive
        store.with_session(id, |s| s.draft = None).await;
        assert_eq!(store.len().await, 1);

        store.with_session(id, |s| s.toggle(code("EUR"))).await;
        assert_eq!(store.len().await, 0);
    }
}
