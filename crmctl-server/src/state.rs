//! Application state shared across handlers

use std::sync::Arc;

use crate::graphql::CrmSchema;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    schema: CrmSchema,
    graphql_path: String,
}

impl AppState {
    pub fn new(schema: CrmSchema, graphql_path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                schema,
                graphql_path: graphql_path.into(),
            }),
        }
    }

    pub fn schema(&self) -> &CrmSchema {
        &self.inner.schema
    }

    /// Path the GraphiQL page posts to
    pub fn graphql_path(&self) -> &str {
        &self.inner.graphql_path
    }
}
