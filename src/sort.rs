use std::cmp::Ordering;

use crate::models::Story;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Title,
    Author,
    Comment,
    Point,
}

impl SortKey {
    pub const COLUMNS: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Author,
        SortKey::Comment,
        SortKey::Point,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "",
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Comment => "Comments",
            SortKey::Point => "Points",
        }
    }

    /// Natural order for this key. Counts come out largest first, with ties in
    /// the reverse of their original order.
    fn apply(self, list: &[Story]) -> Vec<Story> {
        let mut sorted = list.to_vec();
        match self {
            SortKey::None => {}
            SortKey::Title => sorted.sort_by(|a, b| utf16_cmp(&a.title, &b.title)),
            SortKey::Author => sorted.sort_by(|a, b| utf16_cmp(&a.author, &b.author)),
            SortKey::Comment => {
                sorted.sort_by_key(|story| story.num_comments);
                sorted.reverse();
            }
            SortKey::Point => {
                sorted.sort_by_key(|story| story.points);
                sorted.reverse();
            }
        }
        sorted
    }
}

// Code-unit order, so astral characters sort before the top of the BMP
fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// Ordering chosen through the list's column headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub sort_key: SortKey,
    pub is_reverse: bool,
}

impl SortState {
    /// Clicking the active column flips direction, any other column starts over.
    pub fn clicked(self, key: SortKey) -> Self {
        if self.sort_key == key {
            Self {
                sort_key: key,
                is_reverse: !self.is_reverse,
            }
        } else {
            Self {
                sort_key: key,
                is_reverse: false,
            }
        }
    }

    /// The list is taken off screen while a fetch is loading, and comes back
    /// unsorted.
    pub fn reset_while_loading(self, is_loading: bool) -> Self {
        if is_loading {
            Self::default()
        } else {
            self
        }
    }

    pub fn sorted(&self, list: &[Story]) -> Vec<Story> {
        let mut sorted = self.sort_key.apply(list);
        if self.is_reverse {
            sorted.reverse();
        }
        sorted
    }
}
