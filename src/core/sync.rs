use crate::adapters::{checkmarx::CheckmarxClient, port::PortClient};
use crate::config::SyncConfig;
use crate::core::mapping;
use crate::domain::ports::{Catalog, ProjectSource};
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedProject {
    pub identifier: String,
    pub name: String,
    pub error: String,
}

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub blueprint_created: bool,
    pub fetched: usize,
    pub upserted: usize,
    pub failed: Vec<FailedProject>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub blueprint: String,
    pub service_blueprint: String,
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            blueprint: config.port.blueprint.clone(),
            service_blueprint: config.port.service_blueprint.clone(),
        }
    }
}

pub struct SyncEngine<C: Catalog, S: ProjectSource> {
    catalog: C,
    source: S,
    settings: SyncSettings,
}

impl<C: Catalog, S: ProjectSource> SyncEngine<C, S> {
    pub fn new(catalog: C, source: S, settings: SyncSettings) -> Self {
        Self {
            catalog,
            source,
            settings,
        }
    }

    /// Authentication, blueprint and fetch failures abort the run; a failed
    /// entity upsert is recorded in the report and the next project continues.
    pub async fn run(&mut self) -> Result<SyncReport> {
        tracing::info!("🔐 Authenticating with Port...");
        self.catalog.authenticate().await?;
        tracing::info!("🔐 Authenticating with Checkmarx...");
        self.source.authenticate().await?;

        let blueprint_created = self.ensure_blueprint().await?;

        tracing::info!("📥 Fetching projects from Checkmarx...");
        let projects = self.source.fetch_projects().await?;
        tracing::info!("Fetched {} projects", projects.len());

        let mut report = SyncReport {
            blueprint_created,
            fetched: projects.len(),
            ..Default::default()
        };

        if projects.is_empty() {
            tracing::warn!("No projects found in Checkmarx");
            return Ok(report);
        }

        for project in &projects {
            let entity = mapping::project_to_entity(project);

            match self
                .catalog
                .upsert_entity(&self.settings.blueprint, &entity)
                .await
            {
                Ok(()) => {
                    tracing::info!("✅ Upserted entity for project: {}", project.name);
                    report.upserted += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Error creating entity for project {}: {}",
                        project.name,
                        e
                    );
                    if let Some(body) = e.response_body() {
                        tracing::error!("Response content: {}", body);
                    }
                    report.failed.push(FailedProject {
                        identifier: entity.identifier,
                        name: project.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn ensure_blueprint(&self) -> Result<bool> {
        let identifier = &self.settings.blueprint;

        if self.catalog.blueprint_exists(identifier).await? {
            tracing::info!("{} blueprint already exists", identifier);
            return Ok(false);
        }

        tracing::info!("Creating {} blueprint...", identifier);
        let blueprint = mapping::project_blueprint(identifier, &self.settings.service_blueprint);
        self.catalog.create_blueprint(&blueprint).await?;
        tracing::info!("{} blueprint created successfully", identifier);
        Ok(true)
    }
}

/// Build both HTTP clients from configuration and run one sync.
pub async fn run_from_config(config: &SyncConfig) -> Result<SyncReport> {
    let catalog = PortClient::new(&config.port, config.http_timeout)?;
    let source = CheckmarxClient::new(&config.checkmarx, config.http_timeout)?;

    SyncEngine::new(catalog, source, SyncSettings::from(config))
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Blueprint, Entity, Project};
    use crate::utils::error::SyncError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct CatalogState {
        blueprints: HashMap<String, Blueprint>,
        entities: HashMap<(String, String), Entity>,
        blueprint_creations: usize,
        upsert_attempts: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct FakeCatalog {
        state: Arc<Mutex<CatalogState>>,
        reject: HashSet<String>,
        fail_auth: bool,
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn authenticate(&mut self) -> Result<()> {
            if self.fail_auth {
                return Err(SyncError::AuthError {
                    service: "Port",
                    status: StatusCode::UNAUTHORIZED,
                    body: "bad credentials".to_string(),
                });
            }
            Ok(())
        }

        async fn blueprint_exists(&self, identifier: &str) -> Result<bool> {
            Ok(self.state.lock().await.blueprints.contains_key(identifier))
        }

        async fn create_blueprint(&self, blueprint: &Blueprint) -> Result<()> {
            let mut state = self.state.lock().await;
            state.blueprint_creations += 1;
            state
                .blueprints
                .insert(blueprint.identifier.clone(), blueprint.clone());
            Ok(())
        }

        async fn upsert_entity(&self, blueprint: &str, entity: &Entity) -> Result<()> {
            let mut state = self.state.lock().await;
            state.upsert_attempts.push(entity.identifier.clone());
            if self.reject.contains(&entity.identifier) {
                return Err(SyncError::UnexpectedStatus {
                    operation: "upsert entity".to_string(),
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    body: "relation target not found".to_string(),
                });
            }
            state.entities.insert(
                (blueprint.to_string(), entity.identifier.clone()),
                entity.clone(),
            );
            Ok(())
        }
    }

    #[derive(Clone)]
    struct FakeSource {
        projects: Vec<Project>,
        authenticated: bool,
    }

    impl FakeSource {
        fn new(names: &[(&str, &str)]) -> Self {
            let projects = names
                .iter()
                .map(|(id, name)| Project {
                    id: id.to_string(),
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect();
            Self {
                projects,
                authenticated: false,
            }
        }
    }

    #[async_trait]
    impl ProjectSource for FakeSource {
        async fn authenticate(&mut self) -> Result<()> {
            self.authenticated = true;
            Ok(())
        }

        async fn fetch_projects(&self) -> Result<Vec<Project>> {
            if !self.authenticated {
                return Err(SyncError::NotAuthenticated {
                    service: "Checkmarx",
                });
            }
            Ok(self.projects.clone())
        }
    }

    fn settings() -> SyncSettings {
        SyncSettings {
            blueprint: "checkMarxProject".to_string(),
            service_blueprint: "service".to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_creates_blueprint_and_entities() {
        let catalog = FakeCatalog::default();
        let source = FakeSource::new(&[("1", "payments/api"), ("2", "billing")]);

        let mut engine = SyncEngine::new(catalog.clone(), source, settings());
        let report = engine.run().await.unwrap();

        assert!(report.blueprint_created);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.upserted, 2);
        assert!(!report.has_failures());

        let state = catalog.state.lock().await;
        let stored = &state.entities[&("checkMarxProject".to_string(), "1".to_string())];
        assert_eq!(stored.relations["service"], serde_json::json!("payments"));
        let stored = &state.entities[&("checkMarxProject".to_string(), "2".to_string())];
        assert_eq!(stored.relations["service"], serde_json::json!("billing"));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let catalog = FakeCatalog::default();
        let source = FakeSource::new(&[("1", "payments/api"), ("2", "payments/worker")]);

        let first = SyncEngine::new(catalog.clone(), source.clone(), settings())
            .run()
            .await
            .unwrap();
        let second = SyncEngine::new(catalog.clone(), source, settings())
            .run()
            .await
            .unwrap();

        assert!(first.blueprint_created);
        assert!(!second.blueprint_created);

        let state = catalog.state.lock().await;
        assert_eq!(state.blueprint_creations, 1);
        assert_eq!(state.blueprints.len(), 1);
        assert_eq!(state.entities.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_upsert_does_not_stop_later_projects() {
        let catalog = FakeCatalog {
            reject: HashSet::from(["2".to_string()]),
            ..Default::default()
        };
        let source = FakeSource::new(&[("1", "a/one"), ("2", "b/two"), ("3", "c/three")]);

        let mut engine = SyncEngine::new(catalog.clone(), source, settings());
        let report = engine.run().await.unwrap();

        assert_eq!(report.upserted, 2);
        assert_eq!(
            report.failed,
            vec![FailedProject {
                identifier: "2".to_string(),
                name: "b/two".to_string(),
                error: "upsert entity failed with status 422 Unprocessable Entity".to_string(),
            }]
        );

        let state = catalog.state.lock().await;
        assert_eq!(state.upsert_attempts, vec!["1", "2", "3"]);
        assert!(state
            .entities
            .contains_key(&("checkMarxProject".to_string(), "3".to_string())));
    }

    #[tokio::test]
    async fn test_auth_failure_is_fatal() {
        let catalog = FakeCatalog {
            fail_auth: true,
            ..Default::default()
        };
        let source = FakeSource::new(&[("1", "a/one")]);

        let mut engine = SyncEngine::new(catalog.clone(), source, settings());
        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, SyncError::AuthError { .. }));
        let state = catalog.state.lock().await;
        assert_eq!(state.blueprint_creations, 0);
        assert!(state.upsert_attempts.is_empty());
    }

    #[tokio::test]
    async fn test_no_projects_still_ensures_blueprint() {
        let catalog = FakeCatalog::default();
        let source = FakeSource::new(&[]);

        let mut engine = SyncEngine::new(catalog.clone(), source, settings());
        let report = engine.run().await.unwrap();

        assert!(report.blueprint_created);
        assert_eq!(report.fetched, 0);
        assert_eq!(report.upserted, 0);
        assert!(catalog.state.lock().await.entities.is_empty());
    }
}
