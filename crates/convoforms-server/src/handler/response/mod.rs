//! Response types for HTTP handlers.

use convoforms_postgres::query::Pagination;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod activities;
mod errors;
mod invitations;
mod members;
mod monitors;
mod onboarding;
mod workspaces;

pub use activities::*;
pub use errors::*;
pub use invitations::*;
pub use members::*;
pub use monitors::*;
pub use onboarding::*;
pub use workspaces::*;

/// Page of an offset-paginated listing.
///
/// `nextOffset` is present when the page came back full, so another request
/// may return more items.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "{T}sPage")]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<i64>,
}

impl<T> Page<T> {
    /// Wraps already converted items.
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        let full = items.len() as i64 >= pagination.limit;
        Self {
            next_offset: full.then(|| pagination.offset + pagination.limit),
            items,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }

    /// Converts every model and wraps the result.
    pub fn from_models<M>(models: Vec<M>, pagination: Pagination, f: impl FnMut(M) -> T) -> Self {
        Self::new(models.into_iter().map(f).collect(), pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_has_next_offset() {
        let page = Page::new(vec![1, 2], Pagination::new(2, 4));
        assert_eq!(page.next_offset, Some(6));
    }

    #[test]
    fn short_page_is_last() {
        let page = Page::new(vec![1], Pagination::new(2, 0));
        assert_eq!(page.next_offset, None);

        let json = serde_json::to_value(&page).unwrap_or_default();
        assert!(json.get("nextOffset").is_none());
    }
}
