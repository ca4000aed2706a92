use crate::domain::{Category, Status};

/// Parameters for listing stories.
///
/// An empty query lists the whole collection. Free text and filters are
/// delegated to the backend's search endpoint as query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text search.
    pub text: Option<String>,
    /// Restrict to one category.
    pub category: Option<Category>,
    /// Restrict to one status.
    pub status: Option<Status>,
}

impl SearchQuery {
    /// A free-text search.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether the query has no parameters at all.
    ///
    /// Blank text counts as absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_param().is_none() && self.category.is_none() && self.status.is_none()
    }

    fn text_param(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }

    /// The query-string parameters, in a stable order.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(text) = self.text_param() {
            params.push(("query", text.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("category", category.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_empty() {
        assert!(SearchQuery::default().is_empty());
        assert!(SearchQuery::text("   ").is_empty());
        assert!(SearchQuery::text("   ").params().is_empty());
    }

    #[test]
    fn params_include_filters() {
        let query = SearchQuery {
            text: Some("sea".to_string()),
            category: Some(Category::Health),
            status: Some(Status::Draft),
        };

        assert_eq!(
            query.params(),
            [
                ("query", "sea".to_string()),
                ("category", "Health".to_string()),
                ("status", "Draft".to_string()),
            ]
        );
    }
}
