//! Bearer injection and rejected-session handling.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parish_client::{
    ClientConfig, ClientError, ErrorKind, MemorySessionStore, ParishClient, Screen, Session,
    SessionStore, StoreError,
};
use parish_core::{Email, Event, Member, Role, UserId, UserRecord};
use parish_integration_tests::FakeBackend;
use secrecy::SecretString;
use tokio::task::JoinSet;

fn email(s: &str) -> Email {
    Email::parse(s).unwrap()
}

fn password(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

/// Memory store that counts how often it is cleared.
#[derive(Default)]
struct CountingStore {
    inner: MemorySessionStore,
    clears: Arc<AtomicUsize>,
}

impl SessionStore for CountingStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        self.inner.load()
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.inner.save(session)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear()
    }
}

async fn signed_in_admin(backend: &FakeBackend) -> ParishClient {
    backend.add_account("Father Tom", "tom@parish.org", "secret", Role::Admin, None);
    let client = backend.client().await;
    client
        .auth()
        .login(&email("tom@parish.org"), &password("secret"))
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn test_bearer_attached_only_after_login() {
    let backend = FakeBackend::start().await;
    let client = signed_in_admin(&backend).await;

    client.resource::<Event>().list().await.unwrap();

    let requests = backend.requests();
    let login = requests.iter().find(|r| r.path == "/auth/login").unwrap();
    assert_eq!(login.authorization, None);

    let list = requests.iter().find(|r| r.path == "/events/").unwrap();
    let header = list.authorization.as_deref().unwrap();
    assert!(header.starts_with("Bearer token-"));
}

#[tokio::test]
async fn test_no_session_sends_no_header() {
    let backend = FakeBackend::start().await;
    let client = backend.client().await;

    let err = client.resource::<Event>().list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn test_concurrent_rejections_clear_once() {
    let backend = FakeBackend::start().await;
    backend.add_account("Father Tom", "tom@parish.org", "secret", Role::Admin, None);
    let store = CountingStore::default();
    let clears = store.clears.clone();
    let client = backend.client_with_store(store).await;
    client
        .auth()
        .login(&email("tom@parish.org"), &password("secret"))
        .await
        .unwrap();
    client.guard().enter(Screen::Events).await;

    backend.revoke_tokens();

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let events = client.resource::<Event>();
        tasks.spawn(async move { events.list().await });
    }
    let results = tasks.join_all().await;

    for result in &results {
        let err = result.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization, "{err}");
    }
    assert_eq!(clears.load(Ordering::SeqCst), 1);
    assert_eq!(client.navigator().login_redirects(), 1);
    assert_eq!(client.navigator().current(), Screen::Login);
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_relogin_after_expiry_works() {
    let backend = FakeBackend::start().await;
    let client = signed_in_admin(&backend).await;
    backend.revoke_tokens();

    let err = client.resource::<Event>().list().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));

    client
        .auth()
        .login(&email("tom@parish.org"), &password("secret"))
        .await
        .unwrap();
    assert!(client.resource::<Event>().list().await.unwrap().is_empty());
    assert_eq!(client.navigator().current(), Screen::Home);
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let backend = FakeBackend::start().await;
    backend.add_account("Maria", "maria@parish.org", "secret", Role::Member, Some(4));
    let client = backend.client().await;
    client
        .auth()
        .login(&email("maria@parish.org"), &password("secret"))
        .await
        .unwrap();

    let err = client.resource::<Member>().list().await.unwrap_err();

    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(client.session().is_authenticated().await);
    assert_eq!(client.navigator().login_redirects(), 0);
}

#[tokio::test]
async fn test_unreachable_backend_keeps_session() {
    let user = UserRecord {
        id: UserId::new(1),
        name: "Father Tom".into(),
        email: email("tom@parish.org"),
        role: Role::Admin,
        member_id: None,
    };
    let store = MemorySessionStore::with_session(Session::new(password("tok"), user));
    let config = ClientConfig::new("http://127.0.0.1:9", "unused.json").unwrap();
    let client = ParishClient::with_store(&config, store).await.unwrap();

    let err = client.resource::<Event>().list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(client.session().is_authenticated().await);
    assert_eq!(client.navigator().current(), Screen::Home);
    assert_eq!(client.navigator().login_redirects(), 0);
}
