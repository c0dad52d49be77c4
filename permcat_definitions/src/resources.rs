use std::fmt;
use std::str::FromStr;

use super::permissions::{Match, ResourceType};
use super::{Error, ErrorKind, Result};

/// Api group owning tiers, tiered policies and the ui settings types
pub const CALICO_API_GROUP: &str = "projectcalico.org";

/// Resources whose instances are grouped by tier
pub const TIERED_POLICY_RESOURCES: [&str; 4] = [
    "networkpolicies",
    "globalnetworkpolicies",
    "stagednetworkpolicies",
    "stagedglobalnetworkpolicies",
];

const UI_SETTINGS_RESOURCE: &str = "uisettings";
const UI_SETTINGS_RBAC_RESOURCE: &str = "uisettingsgroups/data";

/// A bounded, enumerable scoping dimension
///
/// Each dimension is backed by a catalog resource type whose members can be listed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Namespace,
    Tier,
    UISettingsGroup,
    ManagedCluster,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Namespace,
        Dimension::Tier,
        Dimension::UISettingsGroup,
        Dimension::ManagedCluster,
    ];

    /// Stable index for per-dimension storage
    pub fn index(self) -> usize {
        match self {
            Dimension::Namespace => 0,
            Dimension::Tier => 1,
            Dimension::UISettingsGroup => 2,
            Dimension::ManagedCluster => 3,
        }
    }

    /// Plural resource name of the catalog type
    pub fn resource(self) -> &'static str {
        match self {
            Dimension::Namespace => "namespaces",
            Dimension::Tier => "tiers",
            Dimension::UISettingsGroup => "uisettingsgroups",
            Dimension::ManagedCluster => "managedclusters",
        }
    }

    /// The catalog resource type, given the primary api group
    pub fn resource_type(self, primary_group: &str) -> ResourceType {
        match self {
            Dimension::Namespace => ResourceType::new("", self.resource()),
            _ => ResourceType::new(primary_group, self.resource()),
        }
    }

    /// The catalog dimension a resource type enumerates, if any
    pub fn of_catalog(rt: &ResourceType, primary_group: &str) -> Option<Dimension> {
        Dimension::ALL
            .iter()
            .cloned()
            .find(|d| d.resource_type(primary_group) == *rt)
    }

    /// Match selecting a single member of this dimension
    pub fn scope(self, member: &NamespacedName) -> Match {
        match self {
            Dimension::Namespace => Match::namespace(&member.name),
            Dimension::Tier => Match::tier(&member.name),
            Dimension::UISettingsGroup => Match::ui_settings_group(&member.name),
            Dimension::ManagedCluster => Match::managed_cluster(&member.name).in_namespace(&member.namespace),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Dimension::Namespace => "Namespaces",
            Dimension::Tier => "Tiers",
            Dimension::UISettingsGroup => "UISettingsGroups",
            Dimension::ManagedCluster => "ManagedClusters",
        };
        f.write_str(name)
    }
}

/// How a resource type is scoped beyond the namespace
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// Ordinary resource
    Plain,
    /// The resource is the catalog of a dimension
    Catalog(Dimension),
    /// Instances are grouped by a member of a dimension
    Grouped(Dimension),
}

impl ScopeKind {
    pub fn classify(rt: &ResourceType, primary_group: &str) -> ScopeKind {
        if let Some(dim) = Dimension::of_catalog(rt, primary_group) {
            return ScopeKind::Catalog(dim);
        }
        if rt.api_group != primary_group {
            return ScopeKind::Plain;
        }
        if TIERED_POLICY_RESOURCES.contains(&rt.resource.as_str()) {
            ScopeKind::Grouped(Dimension::Tier)
        } else if rt.resource == UI_SETTINGS_RESOURCE {
            ScopeKind::Grouped(Dimension::UISettingsGroup)
        } else {
            ScopeKind::Plain
        }
    }
}

/// Scope metadata of a registered resource type
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceInfo {
    pub resource_type: ResourceType,
    pub namespaced: bool,
    pub kind: ScopeKind,
}

impl ResourceInfo {
    pub fn new(resource_type: ResourceType, namespaced: bool, primary_group: &str) -> Self {
        let kind = ScopeKind::classify(&resource_type, primary_group);
        ResourceInfo {
            resource_type,
            namespaced,
            kind,
        }
    }

    pub fn is_tiered_policy(&self) -> bool {
        self.kind == ScopeKind::Grouped(Dimension::Tier)
    }

    pub fn catalog(&self) -> Option<Dimension> {
        match self.kind {
            ScopeKind::Catalog(d) => Some(d),
            _ => None,
        }
    }

    pub fn grouped_by(&self) -> Option<Dimension> {
        match self.kind {
            ScopeKind::Grouped(d) => Some(d),
            _ => None,
        }
    }

    /// Resource name used when matching rbac rules
    pub fn rbac_resource(&self) -> String {
        match self.kind {
            ScopeKind::Grouped(Dimension::Tier) => format!("tier.{}", self.resource_type.resource),
            ScopeKind::Grouped(Dimension::UISettingsGroup) => UI_SETTINGS_RBAC_RESOURCE.to_string(),
            _ => self.resource_type.resource.clone(),
        }
    }

    /// Resource name used when matching rbac rules for a single group member
    pub fn rbac_name(&self, member: &str) -> String {
        match self.kind {
            ScopeKind::Grouped(Dimension::Tier) => format!("{}.*", member),
            _ => member.to_string(),
        }
    }
}

/// A catalog member; the namespace is only set for multi-tenant managed clusters
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespacedName {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl NamespacedName {
    pub fn new(name: &str) -> Self {
        NamespacedName {
            name: name.to_string(),
            namespace: String::new(),
        }
    }

    pub fn in_namespace(name: &str, namespace: &str) -> Self {
        NamespacedName {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// A parsed `group/version` string
#[derive(Clone, Debug, PartialEq)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl FromStr for GroupVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<GroupVersion> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [version] if !version.is_empty() => Ok(GroupVersion {
                group: String::new(),
                version: version.to_string(),
            }),
            [group, version] if !version.is_empty() => Ok(GroupVersion {
                group: group.to_string(),
                version: version.to_string(),
            }),
            _ => bail!(ErrorKind::InvalidGroupVersion(s.to_string())),
        }
    }
}

/// A discovered api resource
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ApiResource {
    pub name: String,
    #[serde(default)]
    pub namespaced: bool,
    /// Group override; set for resources served from another group
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
}

impl ApiResource {
    pub fn new(name: &str, namespaced: bool, kind: &str) -> Self {
        ApiResource {
            name: name.to_string(),
            namespaced,
            kind: kind.to_string(),
            ..ApiResource::default()
        }
    }
}

/// Discovery document for one group version
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ApiResourceList {
    pub groupVersion: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

impl ApiResourceList {
    pub fn new(group_version: &str, resources: Vec<ApiResource>) -> Self {
        ApiResourceList {
            groupVersion: group_version.to_string(),
            resources,
        }
    }
}
