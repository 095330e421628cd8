use super::*;

fn sample_user() -> SessionUser {
    SessionUser {
        id: UserId(42),
        name: "Marta".into(),
        last_name: "Ruiz".into(),
        email: "marta@broker.test".into(),
        profile_picture: None,
    }
}

#[tokio::test]
async fn initialize_without_persisted_session_is_anonymous() {
    let context = SessionContext::new(Arc::new(MemorySessionStore::default()));
    assert_eq!(context.state(), SessionState::Uninitialized);

    let state = context.initialize().await;
    assert_eq!(state, SessionState::Anonymous);
    assert!(context.token().await.is_none());
    assert!(matches!(
        context.require_user_id(),
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn initialize_restores_token_and_user() {
    let store = MemorySessionStore::with_session(PersistedSession {
        token: "tok-1".into(),
        user: sample_user(),
    });
    let context = SessionContext::new(Arc::new(store));

    let state = context.initialize().await;
    assert_eq!(state, SessionState::Authenticated(sample_user()));
    assert_eq!(context.token().await.as_deref(), Some("tok-1"));
    assert_eq!(context.require_user_id().expect("user id"), UserId(42));
}

#[tokio::test]
async fn clear_wipes_store_and_notifies_subscribers() {
    let store = Arc::new(MemorySessionStore::default());
    let context = SessionContext::new(store.clone());
    context.initialize().await;
    let mut rx = context.subscribe();

    context
        .establish("tok-2".into(), sample_user())
        .await
        .expect("establish");
    rx.changed().await.expect("changed");
    assert!(rx.borrow_and_update().user().is_some());

    context.clear().await.expect("clear");
    rx.changed().await.expect("changed");
    assert_eq!(*rx.borrow(), SessionState::Anonymous);
    assert!(store.load().expect("load").is_none());
    assert!(context.token().await.is_none());
}

#[tokio::test]
async fn update_user_keeps_token() {
    let store = Arc::new(MemorySessionStore::default());
    let context = SessionContext::new(store.clone());
    context
        .establish("tok-3".into(), sample_user())
        .await
        .expect("establish");

    let mut renamed = sample_user();
    renamed.name = "Marta Elena".into();
    context.update_user(renamed.clone()).await.expect("update");

    let persisted = store.load().expect("load").expect("session");
    assert_eq!(persisted.token, "tok-3");
    assert_eq!(persisted.user, renamed);
}

#[tokio::test]
async fn update_user_without_token_is_rejected() {
    let context = SessionContext::new(Arc::new(MemorySessionStore::default()));
    let err = context.update_user(sample_user()).await.unwrap_err();
    assert!(err.requires_reauth());
}

#[test]
fn file_store_round_trips_and_clears() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
    assert!(store.load().expect("empty load").is_none());

    let session = PersistedSession {
        token: "tok-4".into(),
        user: sample_user(),
    };
    store.save(&session).expect("save");
    assert_eq!(store.load().expect("load"), Some(session));

    store.clear().expect("clear");
    store.clear().expect("clear twice");
    assert!(!store.path().exists());
}

#[tokio::test]
async fn corrupt_session_file_is_treated_as_anonymous() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("session.json");
    fs::write(&path, "{not json").expect("write");

    let context = SessionContext::new(Arc::new(FileSessionStore::new(path)));
    assert_eq!(context.initialize().await, SessionState::Anonymous);
}
