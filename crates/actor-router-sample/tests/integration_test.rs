use actor_router::{args, ActorCell, DispatcherConfig, Lifecycle};
use actor_router_sample::chat_actor::{ChatLine, SAY};
use actor_router_sample::lifecycle::GameServer;
use actor_router_sample::session_actor::{GUEST, LOGIN, ONLINE};

fn test_config() -> DispatcherConfig {
    DispatcherConfig {
        workers: 2,
        poll_interval_ms: 5,
        ..Default::default()
    }
}

/// Full session flow through the real dispatcher.
#[tokio::test(start_paused = true)]
async fn test_login_chat_logout_flow() {
    let server = GameServer::start(test_config())
        .await
        .expect("Failed to start server");

    // guests cannot chat
    assert!(!server.say("alice", "too early"));

    assert!(server.login("alice"));
    assert!(server.login("bob"));
    server.settle().await;
    assert_eq!(server.online(), vec!["alice".to_string(), "bob".to_string()]);

    assert!(server.say("alice", "  hello bob  "));
    assert!(server.say("bob", "hi"));
    assert!(server.heartbeat("alice"));
    server.settle().await;

    assert_eq!(
        server.history(),
        vec![
            ChatLine {
                user: "alice".to_string(),
                text: "hello bob".to_string(),
            },
            ChatLine {
                user: "bob".to_string(),
                text: "hi".to_string(),
            },
        ]
    );
    assert_eq!(
        server
            .sessions
            .actor()
            .session("alice")
            .map(|session| session.heartbeats),
        Some(1)
    );

    assert!(server.logout("bob"));
    server.settle().await;
    assert_eq!(server.online(), vec!["alice".to_string()]);
    assert!(!server.logout("bob"));

    let sessions = server.sessions.clone();
    server.shutdown().await;
    assert_eq!(sessions.lifecycle(), Lifecycle::Destroyed);
    assert!(sessions.actor().online().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_gates_follow_session_state() {
    let server = GameServer::start(test_config())
        .await
        .expect("Failed to start server");
    let router = server.router();

    assert!(!router.enqueue(SAY, GUEST, args!["mallory", "spam"]));
    assert!(!router.enqueue(LOGIN, ONLINE, args!["mallory"]));
    assert!(router.enqueue(LOGIN, GUEST, args!["mallory"]));
    // accepted by the gate, refused by the handler once the first login lands
    assert!(router.enqueue(LOGIN, GUEST, args!["mallory"]));
    server.settle().await;

    assert_eq!(server.online(), vec!["mallory".to_string()]);
    assert_eq!(router.owner_of(SAY), Some("chat"));
    assert_eq!(router.owner_of(LOGIN), Some("sessions"));

    server.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_blank_and_oversized_lines_are_dropped() {
    let server = GameServer::start(test_config())
        .await
        .expect("Failed to start server");

    server.login("carol");
    server.settle().await;

    assert!(server.say("carol", "    "));
    assert!(server.say("carol", &"x".repeat(1000)));
    assert!(server.say("carol", "ok"));
    server.settle().await;

    assert_eq!(
        server.history(),
        vec![ChatLine {
            user: "carol".to_string(),
            text: "ok".to_string(),
        }]
    );

    server.shutdown().await;
}
