use crate::domain::model::{Blueprint, Entity, Project};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The developer-portal side of the sync.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn authenticate(&mut self) -> Result<()>;
    async fn blueprint_exists(&self, identifier: &str) -> Result<bool>;
    async fn create_blueprint(&self, blueprint: &Blueprint) -> Result<()>;
    async fn upsert_entity(&self, blueprint: &str, entity: &Entity) -> Result<()>;
}

/// The scanning-service side of the sync.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn authenticate(&mut self) -> Result<()>;
    async fn fetch_projects(&self) -> Result<Vec<Project>>;
}
