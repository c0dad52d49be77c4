#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::{env, fs, path::Path};

use maplit::btreemap;

use permcat::catalog::GroupFailure;
use permcat::listers::{
    ClusterRoleBindingLister, ClusterRoleGetter, ManagedClusterLister, NamespaceLister, RoleBindingLister,
    RoleGetter, TierLister, UISettingsGroupLister,
};
use permcat::{Calculator, Discovery, DiscoverySource, Error, ResourceCatalog, Result, StaticDiscovery};
use permcat_definitions::{
    ApiResource, ApiResourceList, ClusterRole, ClusterRoleBinding, Metadata, NamespacedName, PolicyRule,
    ResourceType, ResourceVerbs, Role, RoleBinding, RoleRef, Subject, UserInfo, ALL_VERBS,
};

static START: Once = Once::new();

/// Point `PERMCAT_CONFIG_DIR` at the test fixtures
pub fn setup() {
    START.call_once(|| {
        let pwd = env::current_dir().unwrap();
        let pth = fs::canonicalize(Path::new(&pwd).join("tests").join("fixtures")).unwrap();
        env::set_var("PERMCAT_CONFIG_DIR", pth.clone());
        println!("Initializing tests - using fixtures in {}", pth.display());
    });
}

pub const USER: &str = "my-user";

pub fn user() -> UserInfo {
    UserInfo::new(USER, &[])
}

pub fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

/// In-memory cluster
///
/// Every binding binds `my-user`. A role binding entry of `/name` refers to a Role,
/// a plain `name` to a ClusterRole. Catalogs and binding lists set to `None` fail to list.
#[derive(Clone, Debug)]
pub struct MockClient {
    pub namespaces: Option<Vec<String>>,
    pub tiers: Option<Vec<String>>,
    pub ui_settings_groups: Option<Vec<String>>,
    pub managed_clusters: Option<Vec<NamespacedName>>,
    /// Role rules keyed by `namespace/name`
    pub roles: BTreeMap<String, Vec<PolicyRule>>,
    pub role_bindings: Option<BTreeMap<String, Vec<String>>>,
    pub cluster_roles: BTreeMap<String, Vec<PolicyRule>>,
    pub cluster_role_bindings: Option<Vec<String>>,
}

impl Default for MockClient {
    fn default() -> Self {
        MockClient {
            namespaces: Some(strings(&["ns1", "ns2", "ns3", "ns4", "ns5"])),
            tiers: Some(strings(&["default", "tier1", "tier2", "tier3", "tier4"])),
            ui_settings_groups: Some(strings(&["group1", "group2", "group3", "group4"])),
            managed_clusters: Some(vec![NamespacedName::new("cluster1"), NamespacedName::new("cluster2")]),
            roles: btreemap! {},
            role_bindings: Some(btreemap! {}),
            cluster_roles: btreemap! {},
            cluster_role_bindings: Some(vec![]),
        }
    }
}

fn binding_subjects() -> Vec<Subject> {
    vec![Subject::user(USER)]
}

impl NamespaceLister for MockClient {
    fn list_namespaces(&self) -> Result<Vec<String>> {
        self.namespaces.clone().ok_or_else(|| Error::from("no Namespaces set"))
    }
}

impl TierLister for MockClient {
    fn list_tiers(&self) -> Result<Vec<String>> {
        self.tiers.clone().ok_or_else(|| Error::from("no Tiers set"))
    }
}

impl UISettingsGroupLister for MockClient {
    fn list_ui_settings_groups(&self) -> Result<Vec<String>> {
        self.ui_settings_groups.clone().ok_or_else(|| Error::from("no UISettingsGroups set"))
    }
}

impl ManagedClusterLister for MockClient {
    fn list_managed_clusters(&self) -> Result<Vec<NamespacedName>> {
        self.managed_clusters.clone().ok_or_else(|| Error::from("no ManagedClusters set"))
    }
}

impl RoleGetter for MockClient {
    fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>> {
        match self.roles.get(&format!("{}/{}", namespace, name)) {
            Some(rules) => Ok(Some(Role {
                metadata: Metadata::namespaced(namespace, name),
                rules: rules.clone(),
            })),
            None => Err(format!("Role({}/{}) does not exist", namespace, name).into()),
        }
    }
}

impl RoleBindingLister for MockClient {
    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<RoleBinding>> {
        let bindings = self.role_bindings.as_ref().ok_or_else(|| Error::from("no RoleBindings set"))?;
        let names = bindings.get(namespace).cloned().unwrap_or_default();
        Ok(names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let role_ref = if name.starts_with('/') {
                    RoleRef::role(&name[1..])
                } else {
                    RoleRef::cluster_role(name)
                };
                RoleBinding {
                    metadata: Metadata::namespaced(namespace, &format!("role-binding-{}", i)),
                    subjects: binding_subjects(),
                    roleRef: role_ref,
                }
            })
            .collect())
    }
}

impl ClusterRoleGetter for MockClient {
    fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>> {
        match self.cluster_roles.get(name) {
            Some(rules) => Ok(Some(ClusterRole {
                metadata: Metadata::cluster(name),
                rules: rules.clone(),
            })),
            None => Err(format!("ClusterRole({}) does not exist", name).into()),
        }
    }
}

impl ClusterRoleBindingLister for MockClient {
    fn list_cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>> {
        let names = self
            .cluster_role_bindings
            .as_ref()
            .ok_or_else(|| Error::from("no ClusterRoleBindings set"))?;
        Ok(names
            .iter()
            .enumerate()
            .map(|(i, name)| ClusterRoleBinding {
                metadata: Metadata::cluster(&format!("clusterrole-binding-{}", i)),
                subjects: binding_subjects(),
                roleRef: RoleRef::cluster_role(name),
            })
            .collect())
    }
}

/// Calculator over a mock cluster and the built-in resource registry
pub fn calculator(mock: MockClient) -> Calculator {
    let catalog = ResourceCatalog::new(Arc::new(StaticDiscovery::default()));
    Calculator::new(Arc::new(catalog), Arc::new(mock))
}

/// Discovery that serves `dummy0`, `dummy1` and then `dummy2` on successive calls
#[derive(Debug, Default)]
pub struct MockDiscovery {
    pub calls: AtomicUsize,
}

impl DiscoverySource for MockDiscovery {
    fn server_preferred_resources(&self) -> Result<Discovery> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let name = format!("dummy{}", call.min(2));
        Ok(Discovery {
            resources: vec![ApiResourceList::new("v1", vec![ApiResource::new(&name, true, "Dummy")])],
            failed: vec![],
        })
    }
}

/// Discovery that partially fails for the given group versions
#[derive(Debug, Default)]
pub struct FailingDiscovery {
    pub failed: Vec<(String, String)>,
}

impl FailingDiscovery {
    pub fn new(failed: &[(&str, &str)]) -> Self {
        FailingDiscovery {
            failed: failed.iter().map(|(gv, msg)| (gv.to_string(), msg.to_string())).collect(),
        }
    }
}

impl DiscoverySource for FailingDiscovery {
    fn server_preferred_resources(&self) -> Result<Discovery> {
        let mut discovery = StaticDiscovery::default().server_preferred_resources()?;
        discovery.failed = self
            .failed
            .iter()
            .map(|(gv, msg)| GroupFailure {
                group_version: gv.clone(),
                message: msg.clone(),
            })
            .collect();
        Ok(discovery)
    }
}

/// Resource types exercised by the broad calculator tests
pub fn default_resource_types() -> Vec<ResourceType> {
    vec![
        ResourceType::new("projectcalico.org", "hostendpoints"),
        ResourceType::new("projectcalico.org", "tiers"),
        ResourceType::new("projectcalico.org", "stagedkubernetesnetworkpolicies"),
        ResourceType::new("projectcalico.org", "networkpolicies"),
        ResourceType::new("projectcalico.org", "stagednetworkpolicies"),
        ResourceType::new("projectcalico.org", "globalnetworkpolicies"),
        ResourceType::new("projectcalico.org", "stagedglobalnetworkpolicies"),
        ResourceType::new("projectcalico.org", "networksets"),
        ResourceType::new("projectcalico.org", "globalnetworksets"),
        ResourceType::new("networking.k8s.io", "networkpolicies"),
        ResourceType::new("extensions", "networkpolicies"),
        ResourceType::new("", "pods"),
    ]
}

pub fn all_verbs(rts: &[ResourceType]) -> Vec<ResourceVerbs> {
    rts.iter().map(|rt| ResourceVerbs::new(rt.clone(), ALL_VERBS.to_vec())).collect()
}

pub fn is_tiered_policy(rt: &ResourceType) -> bool {
    rt.api_group == "projectcalico.org"
        && [
            "networkpolicies",
            "stagednetworkpolicies",
            "globalnetworkpolicies",
            "stagedglobalnetworkpolicies",
        ]
        .contains(&rt.resource.as_str())
}

pub fn is_namespaced(rt: &ResourceType) -> bool {
    [
        "networkpolicies",
        "stagednetworkpolicies",
        "stagedkubernetesnetworkpolicies",
        "networksets",
        "pods",
    ]
    .contains(&rt.resource.as_str())
}

pub fn rule(verbs: &[&str], groups: &[&str], resources: &[&str]) -> PolicyRule {
    PolicyRule::new(verbs, groups, resources)
}
