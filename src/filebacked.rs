use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use permcat_definitions::{
    ApiResourceList, ClusterRole, ClusterRoleBinding, NamespacedName, Role, RoleBinding,
};

use super::catalog::{Discovery, DiscoverySource, StaticDiscovery};
use super::listers::{
    ClusterRoleBindingLister, ClusterRoleGetter, ManagedClusterLister, NamespaceLister, RoleBindingLister,
    RoleGetter, TierLister, UISettingsGroupLister,
};
use super::Result;

/// A cluster described in a yaml file
///
/// Catalogs that are left out are not set, and listing them fails.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ClusterState {
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
    #[serde(default)]
    pub tiers: Option<Vec<String>>,
    #[serde(default)]
    pub uiSettingsGroups: Option<Vec<String>>,
    #[serde(default)]
    pub managedClusters: Option<Vec<NamespacedName>>,

    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub clusterRoles: Vec<ClusterRole>,
    #[serde(default)]
    pub roleBindings: Vec<RoleBinding>,
    #[serde(default)]
    pub clusterRoleBindings: Vec<ClusterRoleBinding>,

    /// Discovery documents; the built-in registry is used when unset
    #[serde(default)]
    pub resources: Option<Vec<ApiResourceList>>,
}

impl ClusterState {
    pub fn read_from(path: &Path) -> Result<ClusterState> {
        trace!("Using cluster state in {}", path.display());
        if !path.exists() {
            bail!("Cluster state file {} does not exist", path.display())
        }
        let mut f = File::open(path)?;
        let mut data = String::new();
        f.read_to_string(&mut data)?;
        let state: ClusterState = serde_yaml::from_str(&data)?;
        debug!(
            "Loaded {} cluster role bindings and {} role bindings",
            state.clusterRoleBindings.len(),
            state.roleBindings.len()
        );
        Ok(state)
    }
}

fn listed<T: Clone>(xs: &Option<Vec<T>>, what: &str) -> Result<Vec<T>> {
    match xs {
        Some(xs) => Ok(xs.clone()),
        None => bail!("no {} set", what),
    }
}

impl NamespaceLister for ClusterState {
    fn list_namespaces(&self) -> Result<Vec<String>> {
        listed(&self.namespaces, "Namespaces")
    }
}

impl TierLister for ClusterState {
    fn list_tiers(&self) -> Result<Vec<String>> {
        listed(&self.tiers, "Tiers")
    }
}

impl UISettingsGroupLister for ClusterState {
    fn list_ui_settings_groups(&self) -> Result<Vec<String>> {
        listed(&self.uiSettingsGroups, "UISettingsGroups")
    }
}

impl ManagedClusterLister for ClusterState {
    fn list_managed_clusters(&self) -> Result<Vec<NamespacedName>> {
        listed(&self.managedClusters, "ManagedClusters")
    }
}

impl RoleGetter for ClusterState {
    fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>> {
        Ok(self
            .roles
            .iter()
            .find(|r| r.metadata.namespace == namespace && r.metadata.name == name)
            .cloned())
    }
}

impl RoleBindingLister for ClusterState {
    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<RoleBinding>> {
        Ok(self
            .roleBindings
            .iter()
            .filter(|rb| rb.metadata.namespace == namespace)
            .cloned()
            .collect())
    }
}

impl ClusterRoleGetter for ClusterState {
    fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>> {
        Ok(self.clusterRoles.iter().find(|r| r.metadata.name == name).cloned())
    }
}

impl ClusterRoleBindingLister for ClusterState {
    fn list_cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>> {
        Ok(self.clusterRoleBindings.clone())
    }
}

impl DiscoverySource for ClusterState {
    fn server_preferred_resources(&self) -> Result<Discovery> {
        match &self.resources {
            Some(lists) => Ok(Discovery {
                resources: lists.clone(),
                failed: vec![],
            }),
            None => StaticDiscovery::default().server_preferred_resources(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClusterState;
    use crate::listers::{NamespaceLister, RoleBindingLister, TierLister};

    #[test]
    fn unset_catalogs_fail_to_list() {
        let state: ClusterState = serde_yaml::from_str("namespaces: [ns1]\n").unwrap();
        assert_eq!(state.list_namespaces().unwrap(), vec!["ns1".to_string()]);
        assert_eq!(state.list_tiers().unwrap_err().to_string(), "no Tiers set");
        assert!(state.list_role_bindings("ns1").unwrap().is_empty());
    }
}
