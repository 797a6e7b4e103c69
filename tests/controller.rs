mod support;

use std::sync::Arc;

use convo_api::StatusCode;
use convo_engine::{ConversationController, Role, TurnError, TurnOutcome};
use pretty_assertions::assert_eq;
use serde_json::json;
use token_source::TokenError;
use token_source_static::{ScriptedTokenProvider, StaticTokenProvider};

use support::{lock_unpoisoned, status_error, ScriptedTransport, TransportCall};

fn controller_with_token(transport: ScriptedTransport) -> ConversationController {
    ConversationController::new(
        Arc::new(transport),
        Arc::new(StaticTokenProvider::new("token-1")),
    )
    .with_time_zone("Europe/Berlin")
}

#[tokio::test]
async fn first_prompt_creates_session_and_backfills_echo() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"id": "abc", "messages": [{"id": "m1", "text": "Hello"}]}));
    }
    let mut controller = controller_with_token(transport);

    let outcome = controller.submit("Hello").await;

    assert!(outcome.is_completed());
    assert_eq!(controller.session_id(), Some("abc"));
    assert_eq!(controller.messages().len(), 1);
    let user = &controller.messages()[0];
    assert_eq!(user.role, Role::User);
    assert_eq!(user.content, "Hello");
    assert_eq!(user.remote_message_id.as_deref(), Some("m1"));
    assert!(controller.pending().is_empty());
    assert_eq!(controller.last_error(), None);

    let trace = lock_unpoisoned(&trace);
    assert_eq!(trace.calls.len(), 2);
    assert_eq!(
        trace.calls[0],
        TransportCall::CreateConversation {
            token: "token-1".to_string(),
        }
    );
    let TransportCall::SendChat {
        token,
        conversation_id,
        request,
    } = &trace.calls[1]
    else {
        panic!("expected a chat call, got {:?}", trace.calls[1]);
    };
    assert_eq!(token, "token-1");
    assert_eq!(conversation_id, "abc");
    assert_eq!(
        serde_json::to_value(request).expect("request serializes"),
        json!({"message": {"text": "Hello"}, "locationHint": {"timeZone": "Europe/Berlin"}})
    );
}

#[tokio::test]
async fn assistant_reply_is_appended_and_session_reused() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"conversationId": "abc"}));
        trace.push_chat(json!({"messages": [
            {"id": "m1", "text": "Hello"},
            {"id": "m2", "text": "Hi there", "createdDateTime": "2026-02-14T10:00:00Z"}
        ]}));
        trace.push_chat(json!({"messages": [
            {"id": "m1", "text": "Hello"},
            {"id": "m2", "text": "Hi there"},
            {"id": "m3", "text": "Thanks"},
            {"id": "m4", "text": "You're welcome"}
        ]}));
    }
    let mut controller = controller_with_token(transport);

    controller.submit("Hello").await;
    controller.submit("Thanks").await;

    let contents: Vec<(Role, &str)> = controller
        .messages()
        .iter()
        .map(|message| (message.role, message.content.as_str()))
        .collect();
    assert_eq!(
        contents,
        vec![
            (Role::User, "Hello"),
            (Role::Assistant, "Hi there"),
            (Role::User, "Thanks"),
            (Role::Assistant, "You're welcome"),
        ]
    );
    assert_eq!(controller.messages()[1].id, "assistant-m2");
    assert_eq!(controller.processed().len(), 4);

    let trace = lock_unpoisoned(&trace);
    assert_eq!(trace.create_calls(), 1);
    assert_eq!(trace.chat_conversation_ids(), vec!["abc", "abc"]);
}

#[tokio::test]
async fn observer_sees_user_message_before_any_network_call() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"messages": []}));
    }
    let mut controller = controller_with_token(transport);
    let observed_trace = Arc::clone(&trace);
    let mut observed = None;

    controller
        .submit_with_observer("Hello", |session| {
            let calls = lock_unpoisoned(&observed_trace).calls.len();
            observed = Some((session.len(), session.messages()[0].content.clone(), calls));
        })
        .await;

    assert_eq!(observed, Some((1, "Hello".to_string(), 0)));
}

#[tokio::test]
async fn blank_submission_is_ignored() {
    let (transport, trace) = ScriptedTransport::new();
    let mut controller = controller_with_token(transport);

    let outcome = controller.submit("  \n\t ").await;

    assert!(matches!(outcome, TurnOutcome::Ignored));
    assert!(controller.messages().is_empty());
    assert!(controller.pending().is_empty());
    assert!(lock_unpoisoned(&trace).calls.is_empty());
}

#[tokio::test]
async fn token_failure_is_auth_error_without_network() {
    let (transport, trace) = ScriptedTransport::new();
    let tokens = ScriptedTokenProvider::new(vec![
        Err(TokenError::failed("consent revoked")),
        Ok(Some("   ".to_string())),
    ]);
    let mut controller = ConversationController::new(Arc::new(transport), Arc::new(tokens));

    let first = controller.submit("Hello").await;
    assert!(matches!(first.error(), Some(TurnError::Auth { .. })));
    assert!(controller
        .last_error()
        .is_some_and(|error| error.contains("consent revoked")));

    let second = controller.submit("Hello again").await;
    assert!(matches!(second.error(), Some(TurnError::Auth { .. })));

    assert_eq!(controller.messages().len(), 2);
    assert!(controller.pending().is_empty());
    assert_eq!(controller.session_id(), None);
    assert!(lock_unpoisoned(&trace).calls.is_empty());
}

#[tokio::test]
async fn create_without_id_is_session_creation_error() {
    let (transport, trace) = ScriptedTransport::new();
    lock_unpoisoned(&trace).push_created(json!({"id": "  "}));
    let mut controller = controller_with_token(transport);

    let outcome = controller.submit("Hello").await;

    assert!(matches!(
        outcome.error(),
        Some(TurnError::SessionCreation { .. })
    ));
    assert_eq!(controller.session_id(), None);
    assert!(controller.pending().is_empty());
    assert_eq!(lock_unpoisoned(&trace).calls.len(), 1);
}

#[tokio::test]
async fn create_http_failure_reports_status_and_detail() {
    let (transport, trace) = ScriptedTransport::new();
    lock_unpoisoned(&trace).push_create_error(status_error(
        StatusCode::BAD_REQUEST,
        r#"{"error":"bad"}"#,
    ));
    let mut controller = controller_with_token(transport);

    controller.submit("Hello").await;

    assert_eq!(
        controller.last_error(),
        Some(r#"conversation creation failed (400 Bad Request): {"error":"bad"}"#)
    );
}

#[tokio::test]
async fn chat_failure_keeps_user_message_and_rolls_back_pending() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat_error(status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"));
    }
    let mut controller = controller_with_token(transport);

    let outcome = controller.submit("Hello").await;

    match outcome {
        TurnOutcome::Failed(TurnError::ChatRequest { status, detail }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(detail, "boom");
        }
        other => panic!("expected chat request failure, got {other:?}"),
    }
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(controller.messages()[0].content, "Hello");
    assert!(controller.pending().is_empty());
    assert_eq!(controller.session_id(), Some("abc"));
    assert_eq!(
        controller.last_error(),
        Some("chat request failed (500 Internal Server Error): boom")
    );
}

#[tokio::test]
async fn next_submission_clears_previous_error() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat_error(status_error(StatusCode::SERVICE_UNAVAILABLE, "later"));
        trace.push_chat(json!({"messages": [{"id": "m9", "text": "ok"}]}));
    }
    let mut controller = controller_with_token(transport);

    controller.submit("first").await;
    assert!(controller.last_error().is_some());

    let outcome = controller.submit("second").await;
    assert!(outcome.is_completed());
    assert_eq!(controller.last_error(), None);
}

#[tokio::test]
async fn reset_clears_everything_and_next_submit_creates_new_session() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"messages": [{"id": "m1", "text": "answer"}]}));
        trace.push_created(json!({"id": "def"}));
        trace.push_chat(json!({"messages": [{"id": "m1", "text": "answer"}]}));
    }
    let mut controller = controller_with_token(transport);

    controller.submit("question").await;
    assert_eq!(controller.messages().len(), 2);

    controller.reset();
    assert!(controller.messages().is_empty());
    assert_eq!(controller.session_id(), None);
    assert!(controller.pending().is_empty());
    assert!(controller.processed().is_empty());

    controller.submit("question").await;
    assert_eq!(controller.session_id(), Some("def"));
    // m1 is new again after a reset.
    assert_eq!(controller.messages().len(), 2);

    let trace = lock_unpoisoned(&trace);
    assert_eq!(trace.create_calls(), 2);
    assert_eq!(trace.chat_conversation_ids(), vec!["abc", "def"]);
}

#[tokio::test]
async fn server_session_rename_replaces_held_id() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"id": "abc-2", "messages": []}));
        trace.push_chat(json!({"messages": []}));
    }
    let mut controller = controller_with_token(transport);

    let outcome = controller.submit("one").await;
    let TurnOutcome::Completed(summary) = outcome else {
        panic!("turn should complete");
    };
    assert_eq!(summary.session_id, "abc-2");
    assert_eq!(controller.session_id(), Some("abc-2"));

    controller.submit("two").await;
    assert_eq!(
        lock_unpoisoned(&trace).chat_conversation_ids(),
        vec!["abc", "abc-2"]
    );
}

#[tokio::test]
async fn cited_reply_gets_numbered_sources() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"messages": [{
            "id": "m2",
            "text": "Alpha\u{E200}a\u{E201} and beta\u{E200}b\u{E201}.",
            "attributions": [
                {"providerDisplayName": "Alpha docs", "seeMoreWebUrl": "https://a.test"},
                {"providerDisplayName": "Beta docs", "seeMoreWebUrl": "https://b.test"}
            ]
        }]}));
    }
    let mut controller = controller_with_token(transport);

    controller.submit("compare").await;

    assert_eq!(
        controller.messages()[1].content,
        "Alpha[1] and beta[2].\n\nSources:\n1. Alpha docs (https://a.test)\n2. Beta docs (https://b.test)"
    );
}

#[tokio::test]
async fn non_matching_echo_leaves_pending_entry_queued() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"messages": [{"id": "m2", "text": "reply"}]}));
    }
    let mut controller = controller_with_token(transport);

    let outcome = controller.submit("prompt").await;

    assert!(outcome.is_completed());
    assert_eq!(controller.pending().len(), 1);
    assert_eq!(controller.messages()[0].remote_message_id, None);
}

// Known limitation: identical prompts are correlated first-in, first-out, so
// an echo always annotates the oldest still-pending copy.
#[tokio::test]
async fn identical_prompts_echo_annotates_oldest_pending_copy() {
    let (transport, trace) = ScriptedTransport::new();
    {
        let mut trace = lock_unpoisoned(&trace);
        trace.push_created(json!({"id": "abc"}));
        trace.push_chat(json!({"messages": []}));
        trace.push_chat(json!({"messages": [{"id": "m7", "text": "same"}]}));
    }
    let mut controller = controller_with_token(transport);

    controller.submit("same").await;
    controller.submit("same").await;

    let remote_ids: Vec<Option<&str>> = controller
        .messages()
        .iter()
        .map(|message| message.remote_message_id.as_deref())
        .collect();
    assert_eq!(remote_ids, vec![Some("m7"), None]);
    assert_eq!(controller.pending().len(), 1);
}
