use serde::{Deserialize, Deserializer};

/// One search hit from the Algolia Hacker News API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Story {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_comments: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: i64,
}

// The API sends `null` for missing titles, urls and counts (e.g. on Ask HN posts)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a `/search` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchPage {
    pub hits: Vec<Story>,
    #[serde(default)]
    pub page: usize,
}

/// Everything the story list needs to render: the fetched data and where the
/// fetch lifecycle currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoriesState {
    pub data: Vec<Story>,
    /// Latest page merged into `data`.
    pub page: usize,
    pub is_loading: bool,
    pub is_error: bool,
}

impl StoriesState {
    pub fn sum_comments(&self) -> u64 {
        self.data
            .iter()
            .map(|story| u64::from(story.num_comments))
            .sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Story;

    pub fn story(id: &str, title: &str, author: &str, num_comments: u32, points: i64) -> Story {
        Story {
            object_id: id.to_string(),
            url: format!("https://example.com/{}", id),
            title: title.to_string(),
            author: author.to_string(),
            num_comments,
            points,
        }
    }

    pub fn story_one() -> Story {
        Story {
            object_id: "0".to_string(),
            url: "https://reactjs.org/".to_string(),
            title: "React".to_string(),
            author: "Jordan Walke".to_string(),
            num_comments: 3,
            points: 4,
        }
    }

    pub fn story_two() -> Story {
        Story {
            object_id: "1".to_string(),
            url: "https://redux.js.org/".to_string(),
            title: "Redux".to_string(),
            author: "Dan Abramov, Andrew Clark".to_string(),
            num_comments: 2,
            points: 5,
        }
    }

    pub fn story_three() -> Story {
        Story {
            object_id: "2".to_string(),
            url: "https://jestjs.io/".to_string(),
            title: "Jest".to_string(),
            author: "Christoph Nakazawa".to_string(),
            num_comments: 2,
            points: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{story_one, story_three, story_two};
    use super::*;

    #[test]
    fn parses_search_page_with_null_fields() {
        let body = r#"{
            "hits": [
                {"objectID": "42", "url": null, "title": "Ask HN: Anything?", "author": "pg",
                 "num_comments": null, "points": 12, "created_at": "2024-01-01T00:00:00Z"},
                {"objectID": "43", "url": "https://example.com", "title": "Show HN", "author": "dang",
                 "num_comments": 7, "points": null}
            ],
            "page": 2,
            "nbPages": 50
        }"#;

        let page: SearchPage = serde_json::from_str(body).unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.hits[0].object_id, "42");
        assert_eq!(page.hits[0].url, "");
        assert_eq!(page.hits[0].num_comments, 0);
        assert_eq!(page.hits[1].points, 0);
        assert_eq!(page.hits[1].num_comments, 7);
    }

    #[test]
    fn missing_page_defaults_to_zero() {
        let page: SearchPage = serde_json::from_str(r#"{"hits": []}"#).unwrap();
        assert_eq!(page.page, 0);
        assert!(page.hits.is_empty());
    }

    #[test]
    fn sums_comments_over_all_stories() {
        let state = StoriesState {
            data: vec![story_one(), story_two(), story_three()],
            ..Default::default()
        };
        assert_eq!(state.sum_comments(), 7);
        assert_eq!(StoriesState::default().sum_comments(), 0);
    }
}
