use serde_json::json;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geniex::config::{ChatConfig, StoreConfig};
use geniex::identity::StaticIdentity;
use geniex::session::{EditOutcome, Role, SendOutcome, Synchronizer, REPLY_ERROR_NOTICE};
use geniex::store::ChatStoreClient;

fn sync_for(server: &MockServer) -> Synchronizer {
    let store = ChatStoreClient::new(&StoreConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();
    let identity = StaticIdentity::shared(Some("u-1".to_string()));
    Synchronizer::new(store, identity, &ChatConfig::default())
}

async fn mount_reply(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": reply })))
        .mount(server)
        .await;
}

async fn mount_create(server: &MockServer, chat_id: &str) {
    Mock::given(method("POST"))
        .and(path("/save-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Chat saved",
            "chatId": chat_id
        })))
        .mount(server)
        .await;
}

async fn mount_update(server: &MockServer, chat_id: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/update-chat/{}", chat_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Chat updated" })))
        .mount(server)
        .await;
}

async fn mount_summaries(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/get-chat-summaries/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_send_appends_user_then_assistant_and_creates_chat() {
    let server = MockServer::start().await;
    mount_reply(&server, "Hi! How can I help?").await;
    mount_summaries(
        &server,
        json!([{ "_id": "c1", "title": "Hello", "timestamp": 1 }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/save-chat"))
        .and(body_partial_json(json!({ "userId": "u-1", "folder": "Default" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chatId": "c1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    let outcome = sync.send_message("Hello").await.unwrap();

    assert!(matches!(outcome, SendOutcome::Delivered(_)));
    assert_eq!(sync.messages().len(), 2);
    assert_eq!(sync.messages()[0].role, Role::User);
    assert_eq!(sync.messages()[0].content, "Hello");
    assert_eq!(sync.messages()[1].role, Role::Assistant);
    assert_eq!(sync.messages()[1].content, "Hi! How can I help?");
    assert_eq!(sync.active_id(), Some("c1"));
    assert_eq!(sync.summaries().len(), 1);
    assert!(!sync.state().dirty);
}

#[tokio::test]
async fn test_second_send_updates_instead_of_creating() {
    let server = MockServer::start().await;
    mount_reply(&server, "Sure!").await;
    mount_summaries(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/save-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chatId": "c1" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/update-chat/c1"))
        .and(body_partial_json(json!({ "userId": "u-1", "chatId": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    sync.send_message("First").await.unwrap();
    sync.send_message("Second").await.unwrap();

    assert_eq!(sync.messages().len(), 4);
    assert_eq!(sync.active_id(), Some("c1"));
}

#[tokio::test]
async fn test_edit_first_message_truncates_then_appends_reply() {
    let server = MockServer::start().await;
    mount_reply(&server, "Answer").await;
    mount_create(&server, "c1").await;
    mount_update(&server, "c1").await;
    mount_summaries(&server, json!([])).await;

    let mut sync = sync_for(&server);
    sync.send_message("question one").await.unwrap();
    sync.send_message("question two").await.unwrap();
    assert_eq!(sync.messages().len(), 4);

    let first_id = sync.messages()[0].id.clone();
    let outcome = sync.edit_message(&first_id, "a better question").await.unwrap();

    assert!(matches!(outcome, EditOutcome::Delivered(_)));
    assert_eq!(sync.messages().len(), 2);
    assert_eq!(sync.messages()[0].content, "a better question");
    assert!(sync.messages()[0].edited);
    assert_eq!(sync.messages()[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_edit_unknown_id_leaves_history_untouched() {
    let server = MockServer::start().await;
    mount_reply(&server, "Answer").await;
    mount_create(&server, "c1").await;
    mount_update(&server, "c1").await;
    mount_summaries(&server, json!([])).await;

    let mut sync = sync_for(&server);
    sync.send_message("question").await.unwrap();

    let outcome = sync.edit_message("no-such-id", "text").await.unwrap();
    assert!(matches!(outcome, EditOutcome::Ignored));
    assert_eq!(sync.messages().len(), 2);
}

#[tokio::test]
async fn test_refresh_summaries_dedupes_and_is_idempotent() {
    let server = MockServer::start().await;
    mount_summaries(
        &server,
        json!([
            { "_id": "a", "title": "stale", "timestamp": 1 },
            { "_id": "b", "title": "other", "timestamp": 2 },
            { "_id": "a", "title": "fresh", "timestamp": 3 }
        ]),
    )
    .await;

    let mut sync = sync_for(&server);
    let first = sync.refresh_summaries().await.unwrap().to_vec();
    let second = sync.refresh_summaries().await.unwrap().to_vec();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "a");
    assert_eq!(first[0].title, "fresh");
    assert_eq!(first[1].id, "b");
}

#[tokio::test]
async fn test_delete_active_chat_resets_to_draft_and_refreshes() {
    let server = MockServer::start().await;
    mount_reply(&server, "Hi").await;
    mount_create(&server, "c1").await;
    mount_summaries(&server, json!([])).await;

    Mock::given(method("DELETE"))
        .and(path("/delete-chat/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    sync.send_message("Hello").await.unwrap();
    assert_eq!(sync.active_id(), Some("c1"));

    sync.delete_chat("c1").await.unwrap();

    assert_eq!(sync.active_id(), None);
    assert!(sync.messages().is_empty());
    assert!(!sync.summaries().iter().any(|s| s.id == "c1"));
}

#[tokio::test]
async fn test_move_chat_updates_folder_locally_and_remotely() {
    let server = MockServer::start().await;
    mount_reply(&server, "Hi").await;
    mount_create(&server, "c1").await;
    mount_summaries(
        &server,
        json!([{ "_id": "c1", "title": "Hello", "folder": "Work", "timestamp": 1 }]),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/update-folder/c1"))
        .and(body_partial_json(json!({ "folder": "Work" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    sync.send_message("Hello").await.unwrap();
    sync.move_chat("c1", "Work").await.unwrap();

    assert_eq!(sync.state().session.folder, "Work");
    let summary = sync.summaries().iter().find(|s| s.id == "c1").unwrap();
    assert_eq!(summary.folder, "Work");
}

#[tokio::test]
async fn test_reply_failure_appends_bubble_and_skips_persist() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/save-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chatId": "c1" })))
        .expect(0)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    let outcome = sync.send_message("Hello").await.unwrap();

    assert!(matches!(outcome, SendOutcome::Failed(_)));
    assert_eq!(sync.messages().len(), 2);
    assert_eq!(sync.messages()[0].content, "Hello");
    assert_eq!(sync.messages()[1].content, REPLY_ERROR_NOTICE);
    assert_eq!(sync.active_id(), None);
}

#[tokio::test]
async fn test_switch_chat_persists_dirty_session_first() {
    let server = MockServer::start().await;

    // Reply generation is down, so the draft stays dirty and unpersisted.
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/save-chat"))
        .and(body_partial_json(json!({ "userId": "u-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chatId": "c-old" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/get-chat/c-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "c-new",
            "userId": "u-1",
            "title": "Older chat",
            "timestamp": 5,
            "messages": [
                { "id": "m1", "role": "user", "content": "earlier", "timestamp": 1 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    sync.send_message("Hello").await.unwrap();
    assert!(sync.state().dirty);

    sync.switch_chat("c-new").await.unwrap();

    assert_eq!(sync.active_id(), Some("c-new"));
    assert_eq!(sync.messages().len(), 1);
    assert_eq!(sync.messages()[0].content, "earlier");
    assert!(!sync.state().dirty);
}

#[tokio::test]
async fn test_create_new_chat_persists_current_and_adopts_new_id() {
    let server = MockServer::start().await;
    mount_reply(&server, "Hi").await;
    mount_summaries(&server, json!([])).await;

    // The send creates the active chat; create_new_chat creates the fresh one.
    Mock::given(method("POST"))
        .and(path("/save-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chatId": "c-fresh" })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/update-chat/c-fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    sync.send_message("Hello").await.unwrap();

    let created = sync.create_new_chat().await.unwrap();

    assert_eq!(created.as_deref(), Some("c-fresh"));
    assert_eq!(sync.active_id(), Some("c-fresh"));
    assert!(sync.messages().is_empty());
    assert!(!sync.state().dirty);
}

#[tokio::test]
async fn test_resume_latest_activates_most_recent_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-chats/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "c-old",
                "userId": "u-1",
                "title": "Old",
                "timestamp": 100,
                "messages": [{ "id": "m1", "role": "user", "content": "old", "timestamp": 100 }]
            },
            {
                "_id": "c-recent",
                "userId": "u-1",
                "title": "Recent",
                "timestamp": 900,
                "messages": [{ "id": "m2", "role": "user", "content": "recent", "timestamp": 900 }]
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    let resumed = sync.resume_latest().await.unwrap();

    assert_eq!(resumed.as_deref(), Some("c-recent"));
    assert_eq!(sync.active_id(), Some("c-recent"));
    assert_eq!(sync.messages()[0].content, "recent");
}

#[tokio::test]
async fn test_resume_latest_with_no_sessions_keeps_draft() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-chats/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    let resumed = sync.resume_latest().await.unwrap();

    assert!(resumed.is_none());
    assert!(sync.active_id().is_none());
    assert!(sync.messages().is_empty());
}

#[tokio::test]
async fn test_rename_refreshes_summaries() {
    let server = MockServer::start().await;
    mount_summaries(
        &server,
        json!([{ "_id": "c1", "title": "New name", "timestamp": 1 }]),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/rename-chat/c1"))
        .and(body_partial_json(json!({ "title": "New name" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut sync = sync_for(&server);
    sync.rename_chat("c1", "New name").await.unwrap();

    assert_eq!(sync.summaries()[0].title, "New name");
}
