//! Group-based page visibility.
//!
//! A page with no group restrictions is public. A restricted page is visible
//! only to users in at least one of its groups.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Menu position used for pages that have no menu item
pub const UNLISTED_SORT_ORDER: i64 = 999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub group_ids: Vec<String>,

    /// Columns this module does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            slug: String::new(),
            category: None,
            created_at: None,
            group_ids: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.group_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGroup {
    pub page_id: String,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub page_id: String,
    pub sort_order: i64,
}

/// Everything needed to answer "which pages may this user see"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageCatalog {
    pub pages: Vec<Page>,
    #[serde(default)]
    pub page_groups: Vec<PageGroup>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
}

impl PageCatalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page catalog {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse page catalog {}", path.display()))
    }

    pub fn visible_to(&self, user_groups: &[String]) -> Vec<Page> {
        visible_pages(
            self.pages.clone(),
            &self.page_groups,
            &self.menu_items,
            user_groups,
        )
    }
}

/// Fill each page's `group_ids` from the page/group relation rows
pub fn attach_groups(pages: &mut [Page], relations: &[PageGroup]) {
    let mut by_page: HashMap<&str, Vec<String>> = HashMap::new();
    for rel in relations {
        by_page
            .entry(rel.page_id.as_str())
            .or_default()
            .push(rel.group_id.clone());
    }
    for page in pages.iter_mut() {
        page.group_ids = by_page.remove(page.id.as_str()).unwrap_or_default();
    }
}

/// Order by menu position, then creation time. Pages without a timestamp
/// sort after dated pages with the same menu position.
pub fn order_pages(pages: &mut [Page], menu_items: &[MenuItem]) {
    let positions: HashMap<&str, i64> = menu_items
        .iter()
        .map(|m| (m.page_id.as_str(), m.sort_order))
        .collect();

    pages.sort_by(|a, b| {
        let a_pos = positions.get(a.id.as_str()).copied().unwrap_or(UNLISTED_SORT_ORDER);
        let b_pos = positions.get(b.id.as_str()).copied().unwrap_or(UNLISTED_SORT_ORDER);
        a_pos.cmp(&b_pos).then_with(|| match (&a.created_at, &b.created_at) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });
}

pub fn can_view(page: &Page, user_groups: &[String]) -> bool {
    if page.is_public() {
        return true;
    }
    let groups: HashSet<&str> = user_groups.iter().map(String::as_str).collect();
    page.group_ids.iter().any(|g| groups.contains(g.as_str()))
}

/// Attach groups, order, then drop pages the user may not see
pub fn visible_pages(
    mut pages: Vec<Page>,
    relations: &[PageGroup],
    menu_items: &[MenuItem],
    user_groups: &[String],
) -> Vec<Page> {
    attach_groups(&mut pages, relations);
    order_pages(&mut pages, menu_items);
    let total = pages.len();
    let visible: Vec<Page> = pages
        .into_iter()
        .filter(|p| can_view(p, user_groups))
        .collect();
    debug!(target: "access", "{} of {} pages visible to groups {:?}", visible.len(), total, user_groups);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn page(id: &str, day: u32) -> Page {
        let mut p = Page::new(id, id.to_uppercase());
        p.created_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single();
        p
    }

    fn rel(page_id: &str, group_id: &str) -> PageGroup {
        PageGroup {
            page_id: page_id.to_string(),
            group_id: group_id.to_string(),
        }
    }

    #[test]
    fn test_public_and_restricted_pages() {
        let pages = vec![page("home", 1), page("admin", 2), page("ops", 3)];
        let relations = vec![rel("admin", "admins"), rel("ops", "ops"), rel("ops", "admins")];

        let guest = visible_pages(pages.clone(), &relations, &[], &[]);
        assert_eq!(guest.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["home"]);

        let ops = visible_pages(pages, &relations, &[], &["ops".to_string()]);
        assert_eq!(ops.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["home", "ops"]);
    }

    #[test]
    fn test_menu_order_then_created_at() {
        let mut pages = vec![page("c", 3), page("b", 2), page("a", 1), page("menu", 9)];
        let menu = vec![MenuItem {
            page_id: "menu".to_string(),
            sort_order: 1,
        }];
        order_pages(&mut pages, &menu);
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["menu", "a", "b", "c"]);
    }

    #[test]
    fn test_catalog_parses_extra_columns() {
        let json = r#"{
            "pages": [{"id": "p1", "title": "One", "slug": "one", "created_at": "2024-03-01T10:00:00Z", "is_published": true}],
            "page_groups": [{"page_id": "p1", "group_id": "g"}]
        }"#;
        let catalog: PageCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.pages[0].extra.get("is_published"), Some(&serde_json::Value::Bool(true)));
        assert!(catalog.visible_to(&[]).is_empty());
        assert_eq!(catalog.visible_to(&["g".to_string()]).len(), 1);
    }
}
