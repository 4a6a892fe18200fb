use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Three-state update field: distinguishes "field absent from the request"
/// from "field explicitly set to null". Used for the free-text and
/// structured-document fields where clearing and leaving-unchanged are
/// different operations.
///
/// Annotate the field with `#[serde(default)]` so an absent key
/// deserializes to `Missing`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

/// Pagination and filter parameters for the environment listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page, clamped to 1..=100
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Substring match on name
    pub search: Option<String>,
    /// Filter by active flag
    pub active: Option<bool>,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: None,
            active: None,
        }
    }
}

impl ListQuery {
    /// Zero-based page index and clamped page size for the paginator.
    pub fn normalized(&self) -> (u64, u64) {
        let page = self.page.max(1);
        let page_size = self.page_size.clamp(1, 100);
        (page - 1, page_size)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default)]
        description: Patch<String>,
    }

    #[test]
    fn test_patch_absent_vs_null_vs_value() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.description, Patch::Missing);

        let null: Probe = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Patch::Null);

        let value: Probe = serde_json::from_str(r#"{"description": "hello"}"#).unwrap();
        assert_eq!(value.description, Patch::Value("hello".to_string()));
    }

    #[test]
    fn test_list_query_defaults_and_clamping() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.normalized(), (0, 20));

        let query = ListQuery {
            page: 0,
            page_size: 1000,
            ..Default::default()
        };
        assert_eq!(query.normalized(), (0, 100));

        let query = ListQuery {
            page: 3,
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(query.normalized(), (2, 10));
    }
}
