use super::AppEvent;
use crate::render::{DeleteHandler, MessageView};
use tokio::sync::mpsc::UnboundedSender;

/// Forwards delete requests from message views to the UI task, which owns
/// the conversation store.
pub struct TuiDeleteHandler {
    sender: UnboundedSender<AppEvent>,
}

impl TuiDeleteHandler {
    #[must_use]
    pub const fn new(sender: UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }
}

impl DeleteHandler for TuiDeleteHandler {
    fn on_delete_requested(&self, view: &MessageView) {
        let _ = self.sender.send(AppEvent::DeleteMessage(view.message_id()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Author, MessageId};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn delete_request_is_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut view = MessageView::new("hello", Author::User, MessageId::new(4));
        view.set_delete_handler(Arc::new(TuiDeleteHandler::new(tx)));
        view.request_delete();

        let event = rx.recv().await.expect("Expected event");
        assert!(matches!(event, AppEvent::DeleteMessage(id) if id == MessageId::new(4)));
    }

    #[tokio::test]
    async fn closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let mut view = MessageView::new("hello", Author::User, MessageId::new(1));
        view.set_delete_handler(Arc::new(TuiDeleteHandler::new(tx)));
        view.request_delete();
    }
}
