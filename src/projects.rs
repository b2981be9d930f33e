//! Regroup flat task rows under the project each one embeds.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Field carrying the embedded project object on each task row
pub const PROJECT_FIELD: &str = "s42_projects";

/// Group tasks into `[{...project, tasks: [...]}]`. Projects keep the order in
/// which they first appear; tasks keep their input order within a project.
pub fn nest_tasks(tasks: Vec<JsonValue>) -> Result<Vec<JsonValue>> {
    let mut order: Vec<String> = Vec::new();
    let mut projects: HashMap<String, Map<String, JsonValue>> = HashMap::new();

    for (position, task) in tasks.into_iter().enumerate() {
        let JsonValue::Object(mut task) = task else {
            bail!("Task at position {} is not an object", position);
        };

        let project = match task.remove(PROJECT_FIELD) {
            Some(JsonValue::Object(project)) => project,
            _ => bail!("Task at position {} has no '{}' object", position, PROJECT_FIELD),
        };
        let project_id = match project.get("id") {
            Some(JsonValue::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => return Err(anyhow!("Project of task at position {} has no id", position)),
        };

        let entry = projects.entry(project_id.clone()).or_insert_with(|| {
            order.push(project_id);
            let mut nested = project;
            nested.insert("tasks".to_string(), JsonValue::Array(Vec::new()));
            nested
        });
        if let Some(JsonValue::Array(list)) = entry.get_mut("tasks") {
            list.push(JsonValue::Object(task));
        }
    }

    debug!(target: "store", "Nested tasks into {} projects", order.len());
    Ok(order
        .into_iter()
        .filter_map(|id| projects.remove(&id))
        .map(JsonValue::Object)
        .collect())
}

pub fn load_and_nest<P: AsRef<Path>>(path: P) -> Result<Vec<JsonValue>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tasks file {}", path.display()))?;
    let tasks: Vec<JsonValue> = serde_json::from_str(&contents)
        .with_context(|| format!("Tasks file {} is not a JSON array", path.display()))?;
    nest_tasks(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_groups_in_first_appearance_order() {
        let tasks = vec![
            json!({"id": 1, "title": "wire", "s42_projects": {"id": "p2", "name": "Grid"}}),
            json!({"id": 2, "title": "paint", "s42_projects": {"id": "p1", "name": "Site"}}),
            json!({"id": 3, "title": "test", "s42_projects": {"id": "p2", "name": "Grid"}}),
        ];
        let nested = nest_tasks(tasks).unwrap();

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0]["id"], "p2");
        assert_eq!(nested[0]["tasks"].as_array().unwrap().len(), 2);
        assert_eq!(nested[0]["tasks"][1]["title"], "test");
        assert!(nested[0]["tasks"][0].get(PROJECT_FIELD).is_none());
        assert_eq!(nested[1]["name"], "Site");
    }

    #[test]
    fn test_task_without_project_is_error() {
        let err = nest_tasks(vec![json!({"id": 1, "title": "orphan"})]).unwrap_err();
        assert!(err.to_string().contains(PROJECT_FIELD));
    }

    #[test]
    fn test_numeric_project_ids() {
        let nested = nest_tasks(vec![
            json!({"id": 1, "s42_projects": {"id": 7}}),
            json!({"id": 2, "s42_projects": {"id": 7}}),
        ])
        .unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0]["id"], 7);
    }
}
