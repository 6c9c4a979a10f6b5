//! Loading dispatch records from JSON or YAML files.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::DataError;
use crate::model::{CustomerProfile, Employee, Job, PropertyTemplate};

/// Everything needed to plan a week, as exported by the dispatch system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub templates: Vec<PropertyTemplate>,
    #[serde(default)]
    pub profiles: Vec<CustomerProfile>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl Dataset {
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn profile(&self, id: &str) -> Option<&CustomerProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

/// Loads a dataset, choosing the format from the file extension
/// (`.json`, `.yaml` or `.yml`).
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset, DataError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path).map_err(|e| DataError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let dataset = match extension.as_str() {
        "json" => parse_dataset_json(&content)?,
        "yaml" | "yml" => parse_dataset_yaml(&content)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    info!(
        "Loaded {} jobs, {} templates, {} profiles, {} employees from {}",
        dataset.jobs.len(),
        dataset.templates.len(),
        dataset.profiles.len(),
        dataset.employees.len(),
        path.display()
    );

    Ok(dataset)
}

pub fn parse_dataset_json(content: &str) -> Result<Dataset, DataError> {
    let dataset: Dataset = serde_json::from_str(content)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

pub fn parse_dataset_yaml(content: &str) -> Result<Dataset, DataError> {
    let dataset: Dataset = serde_yaml::from_str(content)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Rejects empty or duplicate ids, nameless records and out-of-range
/// employee locations.
pub fn validate_dataset(dataset: &Dataset) -> Result<(), DataError> {
    check_ids("template", dataset.templates.iter().map(|t| t.id.as_str()))?;
    check_ids("profile", dataset.profiles.iter().map(|p| p.id.as_str()))?;
    check_ids("job", dataset.jobs.iter().map(|j| j.id.as_str()))?;
    check_ids("employee", dataset.employees.iter().map(|e| e.id.as_str()))?;

    for template in &dataset.templates {
        require_name("template", &template.id, &template.name)?;
    }
    for employee in &dataset.employees {
        require_name("employee", &employee.id, &employee.name)?;
        if let Some(location) = employee.current_location {
            if !location.is_valid() {
                return Err(DataError::InvalidRecord {
                    kind: "employee",
                    id: employee.id.clone(),
                    reason: format!("location {} is out of range", location),
                });
            }
        }
    }
    for job in &dataset.jobs {
        if let (Some(start), Some(end)) = (job.start_time, job.end_time) {
            if end < start {
                return Err(DataError::InvalidRecord {
                    kind: "job",
                    id: job.id.clone(),
                    reason: format!("ends at {} before it starts at {}", end, start),
                });
            }
        }
    }

    Ok(())
}

fn check_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(DataError::InvalidRecord {
                kind,
                id: id.to_string(),
                reason: "id is empty".to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(DataError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn require_name(kind: &'static str, id: &str, name: &str) -> Result<(), DataError> {
    if name.trim().is_empty() {
        return Err(DataError::InvalidRecord {
            kind,
            id: id.to_string(),
            reason: "name is empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
templates:
  - id: T1
    name: Harbour Cafe
    address: 12 Wharf St, Brisbane QLD 4000
profiles:
  - id: P1
    name: Harbour Cafe
    address: 12 Wharf Street
    recurringEnabled: true
jobs:
  - id: J1
    customerName: Harbour Cafe
    customerAddress: 12 Wharf Street, Brisbane
    serviceType: Office clean
    scheduledDate: 2024-03-04
    startTime: "08:30:00"
    status: confirmed
    assignedEmployeeIds: [E1]
    customerProfileId: P1
employees:
  - id: E1
    name: Sam Lee
    currentLocation: { lat: -27.4698, lng: 153.0251 }
"#;

    #[test]
    fn test_parse_yaml_dataset() {
        let dataset = parse_dataset_yaml(YAML).unwrap();
        assert_eq!(dataset.templates.len(), 1);
        assert_eq!(dataset.jobs[0].assigned_employee_ids, vec!["E1".to_string()]);
        assert!(dataset.profile("P1").unwrap().recurring_enabled);
        let employee = dataset.employee("E1").unwrap();
        assert_eq!(employee.current_location.unwrap().latitude, -27.4698);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{
            "templates": [
                { "id": "T1", "name": "A" },
                { "id": "T1", "name": "B" }
            ]
        }"#;
        let result = parse_dataset_json(json);
        assert!(matches!(
            result,
            Err(DataError::DuplicateId { kind: "template", .. })
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let json = r#"{ "employees": [ { "id": "E1", "name": "  " } ] }"#;
        assert!(matches!(
            parse_dataset_json(json),
            Err(DataError::InvalidRecord { kind: "employee", .. })
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("week.yml");
        std::fs::write(&yaml_path, YAML).unwrap();
        assert_eq!(load_dataset(&yaml_path).unwrap().jobs.len(), 1);

        let json_path = dir.path().join("week.json");
        std::fs::write(&json_path, r#"{ "jobs": [] }"#).unwrap();
        assert!(load_dataset(&json_path).unwrap().jobs.is_empty());

        let csv_path = dir.path().join("week.csv");
        std::fs::write(&csv_path, "id,name").unwrap();
        assert!(matches!(
            load_dataset(&csv_path),
            Err(DataError::UnsupportedFormat(_))
        ));
    }
}
