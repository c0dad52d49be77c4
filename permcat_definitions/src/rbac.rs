use std::collections::BTreeMap;

pub const USER_KIND: &str = "User";
pub const GROUP_KIND: &str = "Group";
pub const SERVICE_ACCOUNT_KIND: &str = "ServiceAccount";
pub const ROLE_KIND: &str = "Role";
pub const CLUSTER_ROLE_KIND: &str = "ClusterRole";

/// Wildcard used in verbs, api groups and resources
pub const WILDCARD: &str = "*";

/// Subset of kubernetes ObjectMeta used by rbac objects
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl Metadata {
    pub fn cluster(name: &str) -> Self {
        Metadata {
            name: name.to_string(),
            namespace: String::new(),
        }
    }

    pub fn namespaced(namespace: &str, name: &str) -> Self {
        Metadata {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// A kubernetes PolicyRule
///
/// Empty `resourceNames` means any name.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PolicyRule {
    pub verbs: Vec<String>,
    #[serde(default)]
    pub apiGroups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resourceNames: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nonResourceURLs: Vec<String>,
}

impl PolicyRule {
    pub fn new(verbs: &[&str], api_groups: &[&str], resources: &[&str]) -> Self {
        PolicyRule {
            verbs: to_strings(verbs),
            apiGroups: to_strings(api_groups),
            resources: to_strings(resources),
            ..PolicyRule::default()
        }
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.resourceNames = to_strings(names);
        self
    }
}

fn to_strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Role {
    pub metadata: Metadata,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ClusterRole {
    pub metadata: Metadata,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Reference from a binding to a Role or ClusterRole
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RoleRef {
    #[serde(default)]
    pub apiGroup: String,
    pub kind: String,
    pub name: String,
}

impl RoleRef {
    pub fn role(name: &str) -> Self {
        RoleRef {
            apiGroup: "rbac.authorization.k8s.io".into(),
            kind: ROLE_KIND.into(),
            name: name.into(),
        }
    }

    pub fn cluster_role(name: &str) -> Self {
        RoleRef {
            apiGroup: "rbac.authorization.k8s.io".into(),
            kind: CLUSTER_ROLE_KIND.into(),
            name: name.into(),
        }
    }
}

/// A binding subject; a user, group or service account
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Subject {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub apiGroup: String,
}

impl Subject {
    pub fn user(name: &str) -> Self {
        Subject {
            kind: USER_KIND.into(),
            name: name.into(),
            apiGroup: "rbac.authorization.k8s.io".into(),
            ..Subject::default()
        }
    }

    pub fn group(name: &str) -> Self {
        Subject {
            kind: GROUP_KIND.into(),
            name: name.into(),
            apiGroup: "rbac.authorization.k8s.io".into(),
            ..Subject::default()
        }
    }

    pub fn service_account(namespace: &str, name: &str) -> Self {
        Subject {
            kind: SERVICE_ACCOUNT_KIND.into(),
            name: name.into(),
            namespace: namespace.into(),
            ..Subject::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RoleBinding {
    pub metadata: Metadata,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub roleRef: RoleRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ClusterRoleBinding {
    pub metadata: Metadata,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub roleRef: RoleRef,
}

/// Identity of the user being evaluated
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl UserInfo {
    pub fn new(name: &str, groups: &[&str]) -> Self {
        UserInfo {
            name: name.to_string(),
            groups: to_strings(groups),
            ..UserInfo::default()
        }
    }
}
