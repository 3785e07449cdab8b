//! End-to-end flows over real HTTP against the in-memory posts service.

use posts_client::{
    ClientConfig, CreatePostForm, DeleteOutcome, HttpClient, ListingView, PostStore, PostsApi,
    PostsClientError, StoreEvent,
};
use std::collections::BTreeSet;
use std::time::Duration;

async fn start_server() -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(posts_mock_server::run(listener));

    ClientConfig::default()
        .with_api_base_url(format!("http://{addr}/api/posts/"))
        .unwrap()
}

async fn wait_for_reload(events: &mut tokio::sync::broadcast::Receiver<StoreEvent>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !matches!(events.recv().await, Ok(StoreEvent::Reloaded { .. })) {}
    })
    .await
    .expect("listing did not reload");
}

#[tokio::test]
async fn create_then_list_contains_post_once() {
    let config = start_server().await;
    let store = posts_client::connect(&config);
    let view = ListingView::open(store.clone());
    let mut events = store.subscribe();

    let mut form = CreatePostForm::new(store.clone());
    form.author = "Ann".into();
    form.content = "Hi".into();
    let created = form.submit().await.unwrap();
    assert_eq!(created.author, "Ann");
    assert_eq!(created.content, "Hi");

    wait_for_reload(&mut events).await;
    let items = view.items().await;
    assert_eq!(items.iter().filter(|i| i.id == created.id).count(), 1);
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn delete_then_list_omits_id() {
    let config = start_server().await;
    let store = posts_client::connect(&config);
    let view = ListingView::open(store.clone());

    let mut form = CreatePostForm::new(store.clone());
    form.author = "Ann".into();
    form.content = "Hi".into();
    let created = form.submit().await.unwrap();
    view.refresh().await.unwrap();

    let outcome = view.delete(created.id, &|_: &str| true).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(view.items().await.is_empty());

    let err = view.delete(created.id, &|_: &str| true).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_shows_modified_timestamp() {
    let config = start_server().await;
    let store = posts_client::connect(&config);
    let view = ListingView::open(store.clone());

    let mut form = CreatePostForm::new(store.clone());
    form.author = "Ann".into();
    form.content = "Hi".into();
    form.image_url = "https://img.example/cat.png".into();
    let created = form.submit().await.unwrap();
    view.refresh().await.unwrap();

    let mut session = view.begin_edit(created.id).await.unwrap();
    session.content = "Edited".into();
    let updated = session.submit().await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.image_url.as_deref(), Some("https://img.example/cat.png"));

    let items = view.items().await;
    assert_eq!(items[0].content, "Edited");
    assert!(items[0].modified.is_some());
}

#[tokio::test]
async fn listing_is_newest_first_and_stable() {
    let config = start_server().await;
    let store = posts_client::connect(&config);
    let mut form = CreatePostForm::new(store.clone());

    for i in 0..4 {
        form.author = format!("author {i}");
        form.content = format!("post {i}");
        form.submit().await.unwrap();
    }

    let first = store.refresh().await.unwrap();
    for pair in first.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
        if pair[0].created_at == pair[1].created_at {
            assert!(pair[0].id > pair[1].id);
        }
    }

    let second = store.refresh().await.unwrap();
    let ids = |posts: &[posts_client::Post]| posts.iter().map(|p| p.id).collect::<BTreeSet<_>>();
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn concurrent_refreshes_settle_on_one_list() {
    let config = start_server().await;
    let store = posts_client::connect(&config);
    let mut form = CreatePostForm::new(store.clone());
    form.author = "Ann".into();
    form.content = "Hi".into();
    form.submit().await.unwrap();

    let results = futures::future::join_all((0..5).map(|_| store.refresh())).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(store.snapshot().await.posts.len(), 1);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn server_errors_surface_as_network_errors() {
    let config = start_server().await;
    let api = HttpClient::new(&config);

    let post = posts_client::Post {
        id: 77,
        author: "Ann".into(),
        content: "Hi".into(),
        image_url: None,
        created_at: chrono::Utc::now(),
        modified_at: None,
    };
    let err = api.update(77, &post).await.unwrap_err();
    assert!(err.is_not_found());

    // The mock rejects blank fields the client would never send
    let store = PostStore::new(api);
    let draft = posts_client::PostDraft {
        author: " ".into(),
        content: "Hi".into(),
        image_url: None,
    };
    match store.create(&draft).await.unwrap_err() {
        PostsClientError::Status { status, .. } => assert_eq!(status, 400),
        other => panic!("unexpected error: {other}"),
    }
}
