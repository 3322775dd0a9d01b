//! Decides whether a Pod has to be rewritten and computes the patch doing it.
//!
//! The override document is read from a Pod annotation, see
//! [`annotation::OverrideSpec`]. Containers named by the document get their
//! resource requirements replaced wholesale; every other field of the Pod is
//! left untouched.

pub mod annotation;
pub mod patch;
pub mod policy;

use json_patch::Patch;
use k8s_openapi::api::core::v1::Pod;
use thiserror::Error;
use tracing::{debug, info};

use annotation::{AnnotationError, OverrideParser, OverridePod};
use patch::PatchError;
use policy::NamespacePolicy;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("{0}")]
    AnnotationMalformed(#[source] AnnotationError),

    #[error("{0}")]
    DiffEncoding(#[from] PatchError),
}

/// The mutation pipeline: namespace policy, annotation parsing and
/// resource override.
#[derive(Clone, Debug)]
pub struct Mutator {
    policy: NamespacePolicy,
    parser: OverrideParser,
}

impl Mutator {
    pub fn new(policy: NamespacePolicy, parser: OverrideParser) -> Self {
        Self { policy, parser }
    }

    /// Returns the patch to apply to `pod`, `None` when the Pod must be
    /// admitted as it is.
    pub fn compute_mutation(
        &self,
        pod: &Pod,
        namespace: &str,
    ) -> Result<Option<Patch>, MutationError> {
        let pod_name = pod.metadata.name.as_deref().unwrap_or_default();

        if !self.policy.is_eligible(namespace) {
            return Ok(None);
        }

        let overrides = match self.parser.parse(pod.metadata.annotations.as_ref()) {
            Ok(overrides) => overrides,
            Err(AnnotationError::NotPresent(key)) => {
                info!(
                    pod = pod_name,
                    annotation = key.as_str(),
                    "required annotation missing, skipping pod"
                );
                return Ok(None);
            }
            Err(error) => return Err(MutationError::AnnotationMalformed(error)),
        };

        let Some(pod_override) = (!pod_name.is_empty())
            .then(|| overrides.find_pod(pod_name))
            .flatten()
        else {
            info!(pod = pod_name, "pod name is not matching annotation, skipping pod");
            return Ok(None);
        };

        let mut initialized_pod = pod.clone();
        if !override_resources(&mut initialized_pod, pod_override) {
            info!(
                pod = pod_name,
                "no container name is matching annotation, skipping pod"
            );
            return Ok(None);
        }

        let patch = patch::diff(pod, &initialized_pod)?;
        if patch.0.is_empty() {
            info!(pod = pod_name, "resources already match annotation, skipping pod");
            return Ok(None);
        }
        debug!(pod = pod_name, patch = ?patch, "patch computed");

        Ok(Some(patch))
    }
}

/// Replaces the resources of every container named by the override. Container
/// names are not required to be unique, all the matching containers are
/// changed. Returns whether at least one container matched.
fn override_resources(pod: &mut Pod, pod_override: &OverridePod) -> bool {
    let Some(spec) = pod.spec.as_mut() else {
        return false;
    };

    let mut found = false;
    for override_container in &pod_override.spec.containers {
        for container in spec
            .containers
            .iter_mut()
            .filter(|container| container.name == override_container.name)
        {
            container.resources = Some(override_container.resources.clone());
            found = true;
        }
    }
    found
}
