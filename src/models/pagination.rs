use serde::{Deserialize, Serialize};
use std::fmt;

use super::Property;

/// Page number issued by the property source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(pub u32);

impl PageToken {
    pub const FIRST: PageToken = PageToken(1);

    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of properties as returned by `GET /api/user/properties?page=N`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub properties: Vec<Property>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<PageToken>,
}

/// How much of the remote collection has been retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    /// `None` means there is nothing left to load
    pub next_page: Option<PageToken>,
    pub total_pages: u32,
}

impl Cursor {
    pub fn from_page(page: &Page) -> Self {
        Self {
            next_page: page.next_page,
            total_pages: page.total_pages,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_page_has_null_next_page() {
        let page: Page = serde_json::from_value(json!({
            "properties": [],
            "total_pages": 3,
            "next_page": null
        }))
        .unwrap();

        let cursor = Cursor::from_page(&page);
        assert!(!cursor.has_more());
        assert_eq!(cursor.total_pages, 3);
    }

    #[test]
    fn default_cursor_has_nothing_to_load() {
        assert!(!Cursor::default().has_more());
    }
}
