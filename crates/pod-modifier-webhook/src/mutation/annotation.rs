use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Suffix appended to the `--annotation` prefix to build the key holding
/// the override document.
pub const POD_DEFINITION_SUFFIX: &str = ".podDefinition";

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotation {0} not found")]
    NotPresent(String),

    #[error("cannot decode annotation {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The document stored inside of the annotation.
///
/// Each entry is shaped like a Pod, only the fields below are taken into
/// account:
///
/// ```json
/// {"Pods": [{"metadata": {"name": "<pod>"},
///            "spec": {"containers": [{"name": "<container>", "resources": {...}}]}}]}
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideSpec {
    #[serde(rename = "Pods", default)]
    pub pods: Vec<OverridePod>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverridePod {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: OverridePodSpec,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverridePodSpec {
    #[serde(default)]
    pub containers: Vec<OverrideContainer>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideContainer {
    pub name: String,
    #[serde(default)]
    pub resources: ResourceRequirements,
}

impl OverrideSpec {
    /// Returns the first entry targeting the Pod with the given name
    pub fn find_pod(&self, name: &str) -> Option<&OverridePod> {
        self.pods
            .iter()
            .find(|pod| pod.metadata.name.as_deref() == Some(name))
    }
}

/// Extracts the override document from the annotations of a Pod
#[derive(Clone, Debug)]
pub struct OverrideParser {
    annotation_key: String,
}

impl OverrideParser {
    pub fn new(annotation_key: impl Into<String>) -> Self {
        Self {
            annotation_key: annotation_key.into(),
        }
    }

    pub fn parse(
        &self,
        annotations: Option<&BTreeMap<String, String>>,
    ) -> Result<OverrideSpec, AnnotationError> {
        let value = annotations
            .and_then(|annotations| annotations.get(&self.annotation_key))
            .ok_or_else(|| AnnotationError::NotPresent(self.annotation_key.clone()))?;

        serde_json::from_str(value).map_err(|source| AnnotationError::Malformed {
            key: self.annotation_key.clone(),
            source,
        })
    }
}
