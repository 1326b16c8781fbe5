/*
* Newsdesk Models Module
*
* Wire types exchanged with the news backend, plus the fallback values the
* dashboard substitutes when a field is missing or blank.
*/

use serde::{Deserialize, Serialize};

/// Shown when a news item arrives without a usable title.
pub const NO_TITLE: &str = "No Title";
/// Shown when a news item arrives without a usable description.
pub const NO_DESCRIPTION: &str = "No Description";
/// Stand-in thumbnail for items without an image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/190x101";
/// Dead link used when an item has no article URL.
pub const PLACEHOLDER_LINK: &str = "#";

/// A single headline as returned by the backend. Every field is optional:
/// the backend aggregates third-party feeds and passes gaps through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl NewsItem {
    pub fn display_title(&self) -> &str {
        field_or(&self.title, NO_TITLE)
    }

    pub fn display_description(&self) -> &str {
        field_or(&self.description, NO_DESCRIPTION)
    }

    pub fn display_image_url(&self) -> &str {
        field_or(&self.image_url, PLACEHOLDER_IMAGE)
    }

    pub fn display_url(&self) -> &str {
        field_or(&self.url, PLACEHOLDER_LINK)
    }
}

/// Absent and whitespace-only values both fall back.
fn field_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

/// A registered user of the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl User {
    /// One-line list entry, `{id} - {name} ({email})`.
    pub fn display_line(&self) -> String {
        format!("{} - {} ({})", self.id, self.name, self.email)
    }
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response body of a successful signup. Only the name is relied upon; the
/// rest is whatever the backend chooses to echo back.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, description: &str, image: &str, url: &str) -> NewsItem {
        let opt = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        NewsItem {
            title: opt(title),
            description: opt(description),
            image_url: opt(image),
            url: opt(url),
        }
    }

    #[test]
    fn fallbacks_cover_missing_and_blank_fields() {
        let missing = NewsItem {
            title: None,
            description: None,
            image_url: None,
            url: None,
        };
        assert_eq!(missing.display_title(), NO_TITLE);
        assert_eq!(missing.display_description(), NO_DESCRIPTION);
        assert_eq!(missing.display_image_url(), PLACEHOLDER_IMAGE);
        assert_eq!(missing.display_url(), PLACEHOLDER_LINK);

        let blank = item("   ", "\t", " ", "");
        assert_eq!(blank.display_title(), NO_TITLE);
        assert_eq!(blank.display_description(), NO_DESCRIPTION);
        assert_eq!(blank.display_image_url(), PLACEHOLDER_IMAGE);
        assert_eq!(blank.display_url(), PLACEHOLDER_LINK);
    }

    #[test]
    fn present_fields_pass_through() {
        let full = item(
            "Budget tabled",
            "The finance minister presented the budget.",
            "https://example.com/a.jpg",
            "https://example.com/a",
        );
        assert_eq!(full.display_title(), "Budget tabled");
        assert_eq!(full.display_url(), "https://example.com/a");
    }

    #[test]
    fn news_item_reads_camel_case_wire_names() {
        let parsed: NewsItem = serde_json::from_str(
            r#"{"title":"t","imageUrl":"https://example.com/i.png","url":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(parsed.image_url.as_deref(), Some("https://example.com/i.png"));
        assert!(parsed.description.is_none());
    }

    #[test]
    fn user_display_line_format() {
        let user = User {
            id: 7,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        };
        assert_eq!(user.display_line(), "7 - Asha (asha@example.com)");
    }
}
