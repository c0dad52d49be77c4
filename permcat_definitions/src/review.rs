use std::collections::BTreeMap;

use super::permissions::Match;
use super::rbac::Metadata;

/// A request to enumerate the scopes in which a user may act
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorizationReview {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub apiVersion: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: AuthorizationReviewSpec,
    #[serde(default)]
    pub status: AuthorizationReviewStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorizationReviewSpec {
    #[serde(default)]
    pub resourceAttributes: Vec<ResourceAttributes>,
    /// User to evaluate; the requesting user when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Vec<String>>,
}

/// Verbs requested for a set of resources in one api group
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceAttributes {
    #[serde(default)]
    pub apiGroup: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorizationReviewStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorizedResourceVerbs: Vec<AuthorizedResourceVerbs>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorizedResourceVerbs {
    #[serde(default)]
    pub apiGroup: String,
    pub resource: String,
    #[serde(default)]
    pub verbs: Vec<AuthorizedResourceVerb>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AuthorizedResourceVerb {
    pub verb: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resourceGroups: Vec<AuthorizedResourceGroup>,
}

/// A scope in which a verb is authorized; empty fields are unconstrained
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizedResourceGroup {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uiSettingsGroup: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub managedCluster: String,
}

impl From<Match> for AuthorizedResourceGroup {
    fn from(m: Match) -> Self {
        trace!("converting {}", m);
        AuthorizedResourceGroup {
            tier: m.tier,
            namespace: m.namespace,
            uiSettingsGroup: m.ui_settings_group,
            managedCluster: m.managed_cluster,
        }
    }
}
