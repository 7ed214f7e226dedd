//! Shared fixtures for the unit tests in this crate.

use std::sync::Arc;

use gymshop_client::{Session, StorefrontClient, TokenPair};
use gymshop_core::{Customer, MemoryStore};
use tokio::sync::mpsc;

use crate::notify::{ChannelNotifier, Notice, Notifier};

pub(crate) const CUSTOMER_ID: i64 = 42;

/// A client for `base_url` signed in as customer 42.
pub(crate) fn signed_in_client(base_url: &str) -> Arc<StorefrontClient> {
    let session = Session::new(Arc::new(MemoryStore::new()));
    session
        .set_tokens(&TokenPair {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
        })
        .unwrap();
    session
        .set_user_info(&Customer {
            id: CUSTOMER_ID,
            name: "Minh".into(),
            email: "minh@example.com".into(),
            phone: None,
            default_address_id: None,
        })
        .unwrap();
    Arc::new(StorefrontClient::new(base_url, 5, "gymshop-test/0.1", session).unwrap())
}

pub(crate) fn channel_notifier() -> (Arc<dyn Notifier>, mpsc::UnboundedReceiver<Notice>) {
    let (notifier, rx) = ChannelNotifier::new();
    (Arc::new(notifier), rx)
}

pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(n) = rx.try_recv() {
        notices.push(n);
    }
    notices
}
