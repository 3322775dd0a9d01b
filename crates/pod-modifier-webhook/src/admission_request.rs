use std::fmt;

use k8s_openapi::api::authentication::v1::UserInfo;
use k8s_openapi::apimachinery::pkg::runtime::RawExtension;
use serde::{Deserialize, Serialize};

/// This models the admission/v1/AdmissionRequest object of Kubernetes.
///
/// Only `uid` is mandatory. Missing fields are zero-filled, the way the API
/// server's own decoder does.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,
    #[serde(default)]
    pub kind: GroupVersionKind,
    #[serde(default)]
    pub resource: GroupVersionResource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<RawExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_object: Option<RawExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<RawExtension>,
}

impl AdmissionRequest {
    /// The name of the user who issued the request, empty when the
    /// API server did not provide one.
    pub fn username(&self) -> &str {
        self.user_info.username.as_deref().unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

/// The operation being performed on the resource under review
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
    /// Missing or not recognized
    #[default]
    #[serde(rename = "", other)]
    Unknown,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
            Operation::Unknown => "",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn deserialize_pod_creation_request() {
        let input = json!({
            "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
            "kind": {"group": "", "version": "v1", "kind": "Pod"},
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "namespace": "solace",
            "operation": "CREATE",
            "userInfo": {
                "username": "system:serviceaccount:kube-system:statefulset-controller",
                "groups": ["system:serviceaccounts"]
            },
            "object": {"apiVersion": "v1", "kind": "Pod"},
            "dryRun": false
        });

        let request: AdmissionRequest =
            serde_json::from_value(input).expect("deserialization should work");

        assert_eq!(request.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
        assert_eq!(request.kind.kind, "Pod");
        assert_eq!(request.resource.resource, "pods");
        assert_eq!(request.namespace.as_deref(), Some("solace"));
        assert_eq!(request.name, None);
        assert_eq!(request.operation, Operation::Create);
        assert_eq!(
            request.username(),
            "system:serviceaccount:kube-system:statefulset-controller"
        );
        assert!(request.object.is_some());
        assert!(request.old_object.is_none());
    }

    #[rstest]
    #[case("CREATE", Operation::Create)]
    #[case("UPDATE", Operation::Update)]
    #[case("DELETE", Operation::Delete)]
    #[case("CONNECT", Operation::Connect)]
    fn operation_wire_format(#[case] wire: &str, #[case] expected: Operation) {
        let operation: Operation = serde_json::from_value(json!(wire)).unwrap();
        assert_eq!(operation, expected);
        assert_eq!(operation.to_string(), wire);
    }

    #[rstest]
    #[case::not_an_admission_operation("PATCH")]
    #[case::empty("")]
    fn unknown_operation(#[case] wire: &str) {
        let operation: Operation = serde_json::from_value(json!(wire)).unwrap();
        assert_eq!(operation, Operation::Unknown);
        assert_eq!(operation.to_string(), "");
    }

    #[test]
    fn missing_fields_are_zero_filled() {
        let input = json!({
            "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
            "kind": {"kind": "Pod"},
            "namespace": "solace",
            "object": {"apiVersion": "v1", "kind": "Pod"}
        });

        let request: AdmissionRequest =
            serde_json::from_value(input).expect("deserialization should work");

        assert_eq!(
            request.kind,
            GroupVersionKind {
                kind: String::from("Pod"),
                ..Default::default()
            }
        );
        assert_eq!(request.resource, GroupVersionResource::default());
        assert_eq!(request.operation, Operation::Unknown);
        assert_eq!(request.username(), "");
        assert!(request.object.is_some());
    }

    #[test]
    fn request_without_uid_is_rejected() {
        let result = serde_json::from_value::<AdmissionRequest>(json!({"kind": {"kind": "Pod"}}));
        assert!(result.is_err());
    }
}
