use crate::domain::model::{
    Blueprint, BlueprintSchema, Entity, Project, PropertySchema, RelationSchema,
};
use chrono::SecondsFormat;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const SERVICE_RELATION: &str = "service";

/// The part of a project name before the first `/`, or the whole name.
pub fn service_identifier(project_name: &str) -> &str {
    let name = project_name.trim();
    name.split_once('/')
        .map(|(service, _)| service.trim())
        .unwrap_or(name)
}

/// Entity identifiers come from the project id so that upserts are idempotent.
pub fn entity_identifier(project: &Project) -> String {
    let id = project.id.trim();
    if id.is_empty() {
        project.name.trim().to_string()
    } else {
        id.to_string()
    }
}

pub fn project_to_entity(project: &Project) -> Entity {
    let identifier = entity_identifier(project);

    let mut properties = serde_json::Map::new();
    properties.insert("projectId".to_string(), json!(identifier));
    properties.insert("projectName".to_string(), json!(project.name));
    properties.insert(
        "description".to_string(),
        json!(project.description.as_deref().unwrap_or_default()),
    );
    properties.insert(
        "lastScanDate".to_string(),
        json!(project.last_scan_date.as_deref().unwrap_or_default()),
    );
    if let Some(created_at) = project.created_at {
        properties.insert(
            "createdAt".to_string(),
            json!(created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
    if let Some(updated_at) = project.updated_at {
        properties.insert(
            "updatedAt".to_string(),
            json!(updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
    properties.insert("tags".to_string(), json!(project.tags));
    properties.insert("groups".to_string(), json!(project.groups));

    // 空的服務名稱不建立關聯
    let service = service_identifier(&project.name);
    let service = if service.is_empty() {
        Value::Null
    } else {
        json!(service)
    };

    let mut relations = BTreeMap::new();
    relations.insert(SERVICE_RELATION.to_string(), service);

    Entity {
        identifier,
        title: project.name.clone(),
        properties,
        relations,
    }
}

fn string_property(title: &str, description: &str) -> PropertySchema {
    PropertySchema {
        kind: "string".to_string(),
        title: title.to_string(),
        description: description.to_string(),
        format: None,
    }
}

fn date_property(title: &str, description: &str) -> PropertySchema {
    PropertySchema {
        format: Some("date-time".to_string()),
        ..string_property(title, description)
    }
}

/// The fixed schema for Checkmarx project entities.
pub fn project_blueprint(identifier: &str, service_blueprint: &str) -> Blueprint {
    let mut properties = BTreeMap::new();
    properties.insert(
        "projectId".to_string(),
        string_property("Project ID", "Unique identifier for the project"),
    );
    properties.insert(
        "projectName".to_string(),
        string_property("Project Name", "Full Checkmarx project name"),
    );
    properties.insert(
        "description".to_string(),
        string_property("Description", "Project description"),
    );
    properties.insert(
        "lastScanDate".to_string(),
        string_property("Last Scan Date", "Date of the last scan"),
    );
    properties.insert(
        "createdAt".to_string(),
        date_property("Created At", "When the project was created in Checkmarx"),
    );
    properties.insert(
        "updatedAt".to_string(),
        date_property("Updated At", "When the project was last updated in Checkmarx"),
    );
    properties.insert(
        "tags".to_string(),
        PropertySchema {
            kind: "object".to_string(),
            title: "Tags".to_string(),
            description: "Checkmarx project tags".to_string(),
            format: None,
        },
    );
    properties.insert(
        "groups".to_string(),
        PropertySchema {
            kind: "array".to_string(),
            title: "Groups".to_string(),
            description: "Checkmarx groups the project belongs to".to_string(),
            format: None,
        },
    );

    let mut relations = BTreeMap::new();
    relations.insert(
        SERVICE_RELATION.to_string(),
        RelationSchema {
            title: "Service".to_string(),
            target: service_blueprint.to_string(),
            required: false,
            many: false,
        },
    );

    Blueprint {
        identifier: identifier.to_string(),
        title: "Checkmarx Project".to_string(),
        description: "Represents a Checkmarx project".to_string(),
        icon: "Checkmarx".to_string(),
        schema: BlueprintSchema {
            properties,
            required: Vec::new(),
        },
        relations,
    }
}
