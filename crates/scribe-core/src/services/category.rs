//! Category service.

use std::sync::Arc;

use crate::domain::Category;
use crate::error::{ServiceError, ServiceFailure};
use crate::ports::DataStore;
use crate::query::Select;
use crate::schema::CATEGORY;

use super::{decode_all, normalize};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn DataStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Every category. No categories at all is reported as an error.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        async {
            let rows = self.store.select(&Select::from(CATEGORY)).await?;
            let categories: Vec<Category> = decode_all(rows)?;
            if categories.is_empty() {
                return Err(ServiceFailure::NotFound("No categories found".to_string()));
            }
            Ok::<_, ServiceFailure>(categories)
        }
        .await
        .map_err(|e| normalize("Error fetching categories", e))
    }
}
