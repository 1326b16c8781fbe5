/*
* Newsdesk API Module
*
* HTTP client for the news backend. Requests run on a dedicated tokio
* runtime; completions are posted into the TUI event channel so the draw
* loop applies them in arrival order.
*/

use std::sync::mpsc::Sender;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::models::{LoginRequest, NewsItem, SignupRequest, SignupResponse, User};
use crate::tui::event::Event;

/// Failure modes of a single backend operation. None of these are retried
/// here; the periodic refresh timer is the only retry mechanism.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("backend did not return an array")]
    NotArray,
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
}

/// Handle to the backend, cheap to keep on the main thread. Each request is
/// spawned as a detached task; the sequence number travels with it so the
/// app can discard responses that were overtaken by a newer request.
pub struct Backend {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    events: Sender<Event>,
    news_url: String,
    news_search_url: String,
    users_url: String,
}

impl Backend {
    pub fn new(
        news_url: impl Into<String>,
        news_search_url: impl Into<String>,
        users_url: impl Into<String>,
        events: Sender<Event>,
    ) -> std::io::Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            runtime: tokio::runtime::Runtime::new()?,
            events,
            news_url: news_url.into(),
            news_search_url: news_search_url.into(),
            users_url: users_url.into(),
        })
    }

    /// Fetch headlines filtered by country and, when selected, category.
    pub fn fetch_news(&self, seq: u64, country: String, category: Option<String>) {
        let client = self.client.clone();
        let base = self.news_url.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = match news_url(&base, &country, category.as_deref()) {
                Ok(url) => fetch_array::<NewsItem>(&client, url).await,
                Err(err) => Err(err.into()),
            };
            let _ = events.send(Event::News { seq, result });
        });
    }

    /// Fetch headlines matching a search keyword. Results flow through the
    /// same news pipeline (and the same sequence guard) as a filtered fetch.
    pub fn search_news(&self, seq: u64, query: String) {
        let client = self.client.clone();
        let base = self.news_search_url.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = match search_url(&base, &query) {
                Ok(url) => fetch_array::<NewsItem>(&client, url).await,
                Err(err) => Err(err.into()),
            };
            let _ = events.send(Event::News { seq, result });
        });
    }

    pub fn fetch_users(&self, seq: u64) {
        let client = self.client.clone();
        let base = self.users_url.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = match Url::parse(&base) {
                Ok(url) => fetch_array::<User>(&client, url).await,
                Err(err) => Err(err.into()),
            };
            let _ = events.send(Event::Users { seq, result });
        });
    }

    pub fn signup(&self, request: SignupRequest) {
        let client = self.client.clone();
        let base = self.users_url.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = signup_request(&client, &base, &request).await;
            let _ = events.send(Event::Signup(result));
        });
    }

    pub fn login(&self, request: LoginRequest) {
        let client = self.client.clone();
        let base = self.users_url.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = login_request(&client, &base, &request).await;
            let _ = events.send(Event::Login(result));
        });
    }
}

/// Build the news URL. `country` is always present; `category` is appended
/// only when one is selected. Both values are percent-encoded.
pub fn news_url(base: &str, country: &str, category: Option<&str>) -> Result<Url, url::ParseError> {
    let mut params: Vec<(&str, &str)> = vec![("country", country)];
    if let Some(category) = category {
        params.push(("category", category));
    }
    Url::parse_with_params(base, params)
}

/// Build the keyword-search URL.
pub fn search_url(base: &str, query: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(base, [("query", query)])
}

/// GET a JSON array. A 2xx status with a non-array body is an error, same
/// as any transport or decode failure.
async fn fetch_array<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
) -> Result<Vec<T>, ApiError> {
    let res = client.get(url).send().await?;
    if !res.status().is_success() {
        return Err(ApiError::Status(res.status()));
    }
    let body: Value = res.json().await?;
    decode_array(body)
}

fn decode_array<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    if !body.is_array() {
        return Err(ApiError::NotArray);
    }
    Ok(serde_json::from_value(body)?)
}

async fn signup_request(
    client: &reqwest::Client,
    users_url: &str,
    request: &SignupRequest,
) -> Result<SignupResponse, ApiError> {
    let url = endpoint(users_url, "signup");
    let res = client.post(url).json(request).send().await?;
    if !res.status().is_success() {
        return Err(ApiError::Status(res.status()));
    }
    Ok(res.json().await?)
}

/// Login responses are status-coded: 404 and 401 carry meaning, a 2xx body
/// is plain text surfaced verbatim, anything else is unexpected.
async fn login_request(
    client: &reqwest::Client,
    users_url: &str,
    request: &LoginRequest,
) -> Result<String, ApiError> {
    let url = endpoint(users_url, "login");
    let res = client.post(url).json(request).send().await?;
    match res.status() {
        StatusCode::NOT_FOUND => Err(ApiError::UserNotFound),
        StatusCode::UNAUTHORIZED => Err(ApiError::InvalidPassword),
        status if status.is_success() => Ok(res.text().await?),
        status => Err(ApiError::Status(status)),
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    const NEWS: &str = "http://localhost:8080/api/news/fetch-latest";

    #[test]
    fn news_url_always_carries_country() {
        let url = news_url(NEWS, "in", None).unwrap();
        assert_eq!(url.query(), Some("country=in"));
    }

    #[test]
    fn news_url_appends_category_only_when_selected() {
        let url = news_url(NEWS, "in", Some("science")).unwrap();
        assert_eq!(url.query(), Some("country=in&category=science"));

        let url = news_url(NEWS, "in", None).unwrap();
        assert!(!url.query().unwrap().contains("category"));
    }

    #[test]
    fn news_url_percent_encodes_query_values() {
        let url = news_url(NEWS, "in", Some("tech & sci")).unwrap();
        assert_eq!(url.query(), Some("country=in&category=tech+%26+sci"));
    }

    #[test]
    fn search_url_encodes_keyword() {
        let url = search_url("http://localhost:8080/api/news/search", "monsoon rains").unwrap();
        assert_eq!(url.query(), Some("query=monsoon+rains"));
    }

    #[test]
    fn endpoint_joins_without_doubling_slashes() {
        assert_eq!(
            endpoint("http://localhost:8080/api/users/", "signup"),
            "http://localhost:8080/api/users/signup"
        );
        assert_eq!(
            endpoint("http://localhost:8080/api/users", "login"),
            "http://localhost:8080/api/users/login"
        );
    }

    #[test]
    fn decode_array_rejects_non_array_payloads() {
        let body = serde_json::json!({"error": "rate limited"});
        assert!(matches!(
            decode_array::<User>(body),
            Err(ApiError::NotArray)
        ));
    }

    #[test]
    fn decode_array_accepts_user_records() {
        let body = serde_json::json!([
            {"id": 1, "name": "Asha", "email": "asha@example.com"}
        ]);
        let users: Vec<User> = decode_array(body).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Asha");
    }
}
