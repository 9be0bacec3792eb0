use serde::Deserialize;
use sqlx::MySqlPool;

use super::{required, WorkflowError};
use crate::app::AppState;
use crate::database::models::news::{self, News, NewsListing};

const PUBLIC_NEWS_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct NewsInput {
    pub title: String,
    pub description: String,
}

pub struct NewsService {
    pool: MySqlPool,
}

impl NewsService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
        }
    }

    pub async fn list_public(&self) -> Result<Vec<NewsListing>, WorkflowError> {
        Ok(news::list_public(&self.pool, PUBLIC_NEWS_LIMIT).await?)
    }

    pub async fn list_for_organization(&self, organization_id: i64) -> Result<Vec<News>, WorkflowError> {
        Ok(news::list_by_organization(&self.pool, organization_id).await?)
    }

    pub async fn get(&self, organization_id: i64, id: i64) -> Result<News, WorkflowError> {
        news::find_owned(&self.pool, id, organization_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("News {} not found", id)))
    }

    pub async fn create(&self, organization_id: i64, input: NewsInput) -> Result<News, WorkflowError> {
        let title = required("title", &input.title)?;
        let description = required("description", &input.description)?;
        let id = news::insert(&self.pool, organization_id, &title, &description).await?;
        tracing::info!(news_id = id, organization_id, "News posted");
        self.get(organization_id, id).await
    }

    pub async fn update(&self, organization_id: i64, id: i64, input: NewsInput) -> Result<News, WorkflowError> {
        let title = required("title", &input.title)?;
        let description = required("description", &input.description)?;
        news::update_owned(&self.pool, id, organization_id, &title, &description).await?;
        self.get(organization_id, id).await
    }

    pub async fn delete(&self, organization_id: i64, id: i64) -> Result<(), WorkflowError> {
        news::delete_owned(&self.pool, id, organization_id).await?;
        tracing::info!(news_id = id, organization_id, "News deleted");
        Ok(())
    }
}
