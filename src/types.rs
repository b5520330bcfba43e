use serde::{Deserialize, Serialize};

/// Users shown per page. Pages exist only on the client; the API knows cursors.
pub const USERS_PER_PAGE: u32 = 20;

/// Largest relative move the move-cursor endpoint accepts in one call.
pub const MAX_CURSOR_SHIFT: i64 = 100;

/// GitHub user as returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "bioHTML")]
    pub bio_html: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub starred_repositories: u64,
}

impl User {
    /// Bio with markup removed, whitespace collapsed
    pub fn bio_text(&self) -> Option<String> {
        let html = self.bio_html.as_deref()?;
        let mut text = String::with_capacity(html.len());
        let mut in_tag = false;
        for ch in html.chars() {
            match ch {
                '<' => in_tag = true,
                '>' if in_tag => {
                    in_tag = false;
                    text.push(' ');
                }
                _ if !in_tag => text.push(ch),
                _ => {}
            }
        }
        let text = decode_entities(&text);
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }
}

/// Decode the character references GitHub emits in rendered bios. Unknown
/// references are kept as written.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let name = &rest[1..end];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => {
                    let code = if let Some(hex) =
                        name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        name.strip_prefix('#').and_then(|dec| dec.parse().ok())
                    };
                    code.and_then(char::from_u32)
                }
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Opaque cursor pair bounding a page of results. Never parsed, only compared
/// and handed back to the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub start_cursor: String,
    #[serde(default)]
    pub end_cursor: String,
}

/// Page info reported by the move-cursor endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCursorPageInfo {
    #[serde(default)]
    pub start_cursor: String,
    #[serde(default)]
    pub end_cursor: String,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub users: Vec<User>,
    pub user_count: u64,
    pub page_info: PageInfo,
}

impl SearchResult {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.user_count)
    }

    /// "Found N users" label for the result header
    pub fn found_label(&self) -> String {
        if self.user_count == 1 {
            "Found 1 user".to_string()
        } else {
            format!("Found {} users", self.user_count)
        }
    }
}

/// Number of pages for a result count.
///
/// Always `count / 20 + 1`, so an exact multiple of the page size reports one
/// trailing empty page.
pub fn total_pages(user_count: u64) -> u32 {
    let pages = user_count / u64::from(USERS_PER_PAGE) + 1;
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_down_then_adds_one() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(19), 1);
        assert_eq!(total_pages(21), 2);
        assert_eq!(total_pages(220), 12);
    }

    #[test]
    fn total_pages_exact_multiple_keeps_extra_page() {
        assert_eq!(total_pages(20), 2);
        assert_eq!(total_pages(40), 3);
    }

    #[test]
    fn found_label_singular_and_plural() {
        let mut result = SearchResult {
            users: vec![],
            user_count: 1,
            page_info: PageInfo::default(),
        };
        assert_eq!(result.found_label(), "Found 1 user");
        result.user_count = 220;
        assert_eq!(result.found_label(), "Found 220 users");
    }

    #[test]
    fn user_deserializes_from_wire_names() {
        let json = r#"{
            "id": "MDQ6VXNlcjE=",
            "login": "salvo",
            "name": "Salvo",
            "email": "",
            "bioHTML": "<div>Rust <b>and</b> coffee</div>",
            "avatarUrl": "https://avatars.example/u/1",
            "url": "https://github.com/salvo",
            "followers": 12,
            "following": 3
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.login, "salvo");
        assert_eq!(user.followers, 12);
        assert_eq!(user.starred_repositories, 0);
        assert_eq!(user.bio_text().as_deref(), Some("Rust and coffee"));
    }

    #[test]
    fn bio_text_empty_markup_is_none() {
        let user = User {
            id: "1".into(),
            login: "x".into(),
            name: None,
            email: None,
            bio_html: Some("<div></div>".into()),
            avatar_url: String::new(),
            url: String::new(),
            followers: 0,
            following: 0,
            starred_repositories: 0,
        };
        assert_eq!(user.bio_text(), None);
    }

    #[test]
    fn bio_text_decodes_character_references() {
        let user = User {
            id: "1".into(),
            login: "x".into(),
            name: None,
            email: None,
            bio_html: Some("<p>Tom &amp; Jerry&#39;s &lt;3 caf&#xE9; &copy; AT&T</p>".into()),
            avatar_url: String::new(),
            url: String::new(),
            followers: 0,
            following: 0,
            starred_repositories: 0,
        };
        assert_eq!(
            user.bio_text().as_deref(),
            Some("Tom & Jerry's <3 café &copy; AT&T")
        );
    }
}
