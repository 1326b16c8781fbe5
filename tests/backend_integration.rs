use std::sync::mpsc;
use std::time::Duration;

use newsdesk::api::Backend;
use newsdesk::tui::event::Event;

/// Integration tests that hit a live news backend on localhost:8080.
///
/// They require the backend from the default configuration to be running
/// and are marked ignored so offline and CI runs skip them. Run manually
/// with: `cargo test -- --ignored`.

#[test]
#[ignore = "requires a running news backend on localhost:8080"]
fn fetches_live_users() {
    let (sender, receiver) = mpsc::channel();
    let backend = Backend::new(
        "http://localhost:8080/api/news/fetch-latest",
        "http://localhost:8080/api/news/search",
        "http://localhost:8080/api/users",
        sender,
    )
    .expect("backend client");

    backend.fetch_users(1);

    match receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("no completion arrived")
    {
        Event::Users { seq, result } => {
            assert_eq!(seq, 1);
            let users = result.expect("users fetch failed");
            println!("fetched {} users", users.len());
        }
        _ => panic!("expected a users completion"),
    }
}

#[test]
#[ignore = "requires a running news backend on localhost:8080"]
fn fetches_live_news_for_default_country() {
    let (sender, receiver) = mpsc::channel();
    let backend = Backend::new(
        "http://localhost:8080/api/news/fetch-latest",
        "http://localhost:8080/api/news/search",
        "http://localhost:8080/api/users",
        sender,
    )
    .expect("backend client");

    backend.fetch_news(1, "in".to_string(), None);

    match receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("no completion arrived")
    {
        Event::News { seq, result } => {
            assert_eq!(seq, 1);
            let items = result.expect("news fetch failed");
            for item in items.iter().take(3) {
                println!("{} - {}", item.display_title(), item.display_url());
            }
        }
        _ => panic!("expected a news completion"),
    }
}
