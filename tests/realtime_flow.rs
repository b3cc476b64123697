//! End-to-end engine tests
//!
//! Drive the full connection lifecycle and the chat handlers against the
//! in-memory collaborators, without a WebSocket transport.

mod common;

use common::{drain, drain_broadcast, FailingMessageStore, TestContext};

use std::sync::Arc;

use chatrelay::backend::chat::handlers::handle_client_event;
use chatrelay::backend::chat::socket::open_session;
use chatrelay::backend::server::state::AppState;
use chatrelay::backend::store::MessageStore;
use chatrelay::backend::users::MemoryUserDirectory;
use chatrelay::shared::{
    direct_room_key, ClientEvent, ConversationQuery, Identity, ServerEvent,
};

fn join(chat_id: &str, is_group: bool) -> ClientEvent {
    ClientEvent::JoinChat {
        chat_id: chat_id.to_string(),
        is_group,
    }
}

fn send_direct(receiver: &str, content: &str) -> ClientEvent {
    ClientEvent::SendMessage {
        content: content.to_string(),
        receiver_id: Some(receiver.to_string()),
        chat_room_id: None,
        is_group: false,
    }
}

fn mark_read(chat_id: &str, is_group: bool) -> ClientEvent {
    ClientEvent::MarkMessagesRead {
        chat_id: chat_id.to_string(),
        is_group,
    }
}

/// The full one-to-one scenario: u1 sends "hi", both sessions receive it,
/// u2 marks it read, both sessions see the receipt.
#[tokio::test]
async fn direct_conversation_flow() {
    let ctx = TestContext::new();
    let (u1, mut u1_rx) = ctx.connect("u1", "u1").await;
    let (u2, mut u2_rx) = ctx.connect("u2", "u2").await;

    handle_client_event(&ctx.state, &u1, join("u2", false)).await;
    handle_client_event(&ctx.state, &u2, join("u1", false)).await;

    handle_client_event(&ctx.state, &u1, send_direct("u2", "hi")).await;

    // persisted with the direct-message shape
    let query = ConversationQuery::from_target("u2", "u1", false);
    let stored = ctx.messages.find_unread(&query, "u2").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender, "u1");
    assert_eq!(stored[0].receiver.as_deref(), Some("u2"));
    assert!(stored[0].chat_room.is_none());
    assert!(!stored[0].is_group);

    // both sessions received the fan-out with the sender's display name
    for rx in [&mut u1_rx, &mut u2_rx] {
        let events = drain(rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::ReceiveMessage(outgoing) => {
                assert_eq!(outgoing.message.content, "hi");
                assert_eq!(outgoing.sender_name, "u1");
            }
            other => panic!("expected receiveMessage, got {:?}", other),
        }
    }

    // u2 marks the conversation read
    handle_client_event(&ctx.state, &u2, mark_read("u1", false)).await;

    let u2_events = drain(&mut u2_rx);
    assert_eq!(
        u2_events,
        vec![
            ServerEvent::messages_read("u1", "u2", 1),
            ServerEvent::messages_read_ack("u1", 1),
        ]
    );

    // u1's session in the same room sees the broadcast too
    let u1_events = drain(&mut u1_rx);
    assert_eq!(u1_events, vec![ServerEvent::messages_read("u1", "u2", 1)]);

    // the receipt is recorded exactly once
    let message = ctx.messages.get(stored[0].id).unwrap();
    assert_eq!(message.read_by, vec!["u2".to_string()]);
}

/// Marking read twice: the second call reports zero and adds nothing.
#[tokio::test]
async fn mark_read_is_idempotent() {
    let ctx = TestContext::new();
    let (u1, _u1_rx) = ctx.connect("u1", "u1").await;
    let (u2, mut u2_rx) = ctx.connect("u2", "u2").await;

    handle_client_event(&ctx.state, &u1, join("u2", false)).await;
    handle_client_event(&ctx.state, &u1, send_direct("u2", "hi")).await;

    handle_client_event(&ctx.state, &u2, mark_read("u1", false)).await;
    drain(&mut u2_rx);

    handle_client_event(&ctx.state, &u2, mark_read("u1", false)).await;
    let events = drain(&mut u2_rx);
    assert_eq!(events, vec![ServerEvent::messages_read_ack("u1", 0)]);

    let query = ConversationQuery::from_target("u2", "u1", false);
    let all = ctx
        .messages
        .list(&query, Default::default())
        .await
        .unwrap();
    assert_eq!(all[0].read_by, vec!["u2".to_string()]);
}

/// Two sessions of the same identity marking read concurrently must not
/// produce a duplicate read_by entry.
#[tokio::test]
async fn concurrent_mark_read_single_entry() {
    let ctx = TestContext::new();
    let (u1, _u1_rx) = ctx.connect("u1", "u1").await;
    let (u2_first, mut first_rx) = ctx.connect("u2", "u2").await;
    let (u2_second, mut second_rx) = ctx.connect("u2", "u2").await;

    handle_client_event(&ctx.state, &u1, send_direct("u2", "one")).await;
    handle_client_event(&ctx.state, &u1, send_direct("u2", "two")).await;

    tokio::join!(
        handle_client_event(&ctx.state, &u2_first, mark_read("u1", false)),
        handle_client_event(&ctx.state, &u2_second, mark_read("u1", false)),
    );
    drain(&mut first_rx);
    drain(&mut second_rx);

    let query = ConversationQuery::from_target("u1", "u2", false);
    let all = ctx
        .messages
        .list(&query, Default::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    for message in all {
        assert_eq!(
            message.read_by.iter().filter(|r| *r == "u2").count(),
            1,
            "duplicate read_by entry for {}",
            message.id
        );
    }
}

/// A user with two live sessions goes offline only when the last one
/// closes.
#[tokio::test]
async fn presence_transitions_are_reference_counted() {
    let ctx = TestContext::new();
    let mut global = ctx.state.events.subscribe();

    let (first, _first_rx) = ctx.connect("u1", "u1").await;
    let (second, _second_rx) = ctx.connect("u1", "u1").await;

    // only the first connection is a transition
    assert_eq!(
        drain_broadcast(&mut global),
        vec![ServerEvent::user_online("u1")]
    );
    assert!(ctx.users.is_online("u1"));

    ctx.disconnect(&first).await;
    assert!(drain_broadcast(&mut global).is_empty());
    assert!(ctx.users.is_online("u1"));

    ctx.disconnect(&second).await;
    assert_eq!(
        drain_broadcast(&mut global),
        vec![ServerEvent::user_offline("u1")]
    );
    assert!(!ctx.users.is_online("u1"));
}

/// Disconnect removes the session from its rooms; later fan-out skips it.
#[tokio::test]
async fn disconnect_leaves_joined_rooms() {
    let ctx = TestContext::new();
    let (u1, mut u1_rx) = ctx.connect("u1", "u1").await;
    let (u2, mut u2_rx) = ctx.connect("u2", "u2").await;

    handle_client_event(&ctx.state, &u1, join("u2", false)).await;
    handle_client_event(&ctx.state, &u2, join("u1", false)).await;
    ctx.disconnect(&u2).await;

    let key = direct_room_key("u1", "u2");
    assert_eq!(ctx.state.registry.members_of(&key).await.len(), 1);

    handle_client_event(&ctx.state, &u1, send_direct("u2", "anyone there?")).await;
    assert_eq!(drain(&mut u1_rx).len(), 1);
    assert!(drain(&mut u2_rx).is_empty());
}

/// Group messages reach every joined session, including the sender's.
#[tokio::test]
async fn group_fanout() {
    let ctx = TestContext::new();
    let (u1, mut u1_rx) = ctx.connect("u1", "u1").await;
    let (u2, mut u2_rx) = ctx.connect("u2", "u2").await;
    let (u3, mut u3_rx) = ctx.connect("u3", "u3").await;

    for session in [&u1, &u2, &u3] {
        handle_client_event(&ctx.state, session, join("room-7", true)).await;
    }

    handle_client_event(
        &ctx.state,
        &u1,
        ClientEvent::SendMessage {
            content: "hello all".to_string(),
            receiver_id: None,
            chat_room_id: Some("room-7".to_string()),
            is_group: true,
        },
    )
    .await;

    for rx in [&mut u1_rx, &mut u2_rx, &mut u3_rx] {
        let events = drain(rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::ReceiveMessage(outgoing) => {
                assert_eq!(outgoing.message.chat_room.as_deref(), Some("room-7"));
                assert!(outgoing.message.is_group);
            }
            other => panic!("expected receiveMessage, got {:?}", other),
        }
    }
}

/// Typing is relayed to the room but never back to the sending connection;
/// the sender's other sessions still see it.
#[tokio::test]
async fn typing_excludes_sending_connection_only() {
    let ctx = TestContext::new();
    let (u1_first, mut first_rx) = ctx.connect("u1", "u1").await;
    let (u1_second, mut second_rx) = ctx.connect("u1", "u1").await;
    let (u2, mut u2_rx) = ctx.connect("u2", "u2").await;

    handle_client_event(&ctx.state, &u1_first, join("u2", false)).await;
    handle_client_event(&ctx.state, &u1_second, join("u2", false)).await;
    handle_client_event(&ctx.state, &u2, join("u1", false)).await;

    handle_client_event(
        &ctx.state,
        &u1_first,
        ClientEvent::Typing {
            chat_id: "u2".to_string(),
            is_group: false,
        },
    )
    .await;

    assert!(drain(&mut first_rx).is_empty());
    assert_eq!(
        drain(&mut second_rx),
        vec![ServerEvent::user_typing("u1")]
    );
    assert_eq!(drain(&mut u2_rx), vec![ServerEvent::user_typing("u1")]);
    // nothing is persisted for typing
    assert!(ctx.messages.is_empty());
}

/// A failed write is reported to the sender only; nobody else sees
/// anything.
#[tokio::test]
async fn persistence_failure_has_no_partial_fanout() {
    let state = AppState::new(
        Arc::new(MemoryUserDirectory::new()),
        Arc::new(FailingMessageStore),
    );
    let (u1, mut u1_rx) = open_session(&state, Identity::new("u1", "u1")).await;
    let (u2, mut u2_rx) = open_session(&state, Identity::new("u2", "u2")).await;

    handle_client_event(&state, &u1, join("u2", false)).await;
    handle_client_event(&state, &u2, join("u1", false)).await;

    handle_client_event(&state, &u1, send_direct("u2", "hi")).await;

    let events = drain(&mut u1_rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ServerEvent::Error { .. }));
    assert!(drain(&mut u2_rx).is_empty());
}

/// Validation failures produce an error event and leave the connection
/// usable.
#[tokio::test]
async fn validation_failure_keeps_connection_usable() {
    let ctx = TestContext::new();
    let (u1, mut u1_rx) = ctx.connect("u1", "u1").await;

    handle_client_event(&ctx.state, &u1, join("u2", false)).await;
    handle_client_event(&ctx.state, &u1, send_direct("u2", "   ")).await;

    let events = drain(&mut u1_rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ServerEvent::Error { .. }));

    // the same session can still send
    handle_client_event(&ctx.state, &u1, send_direct("u2", "hello")).await;
    let events = drain(&mut u1_rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ServerEvent::ReceiveMessage(_)));
}

/// Within one room, delivery order matches persistence order.
#[tokio::test]
async fn room_delivery_order_matches_persistence_order() {
    let ctx = TestContext::new();
    let (u1, _u1_rx) = ctx.connect("u1", "u1").await;
    let (u2, mut u2_rx) = ctx.connect("u2", "u2").await;

    handle_client_event(&ctx.state, &u2, join("u1", false)).await;
    for content in ["one", "two", "three"] {
        handle_client_event(&ctx.state, &u1, send_direct("u2", content)).await;
    }

    let contents: Vec<String> = drain(&mut u2_rx)
        .into_iter()
        .map(|event| match event {
            ServerEvent::ReceiveMessage(outgoing) => outgoing.message.content,
            other => panic!("expected receiveMessage, got {:?}", other),
        })
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

/// Messages sent to a conversation nobody joined are persisted but reach
/// no one.
#[tokio::test]
async fn send_without_members_persists_quietly() {
    let ctx = TestContext::new();
    let (u1, mut u1_rx) = ctx.connect("u1", "u1").await;

    handle_client_event(&ctx.state, &u1, send_direct("u2", "hi")).await;

    assert!(drain(&mut u1_rx).is_empty());
    assert_eq!(ctx.messages.len(), 1);
}
