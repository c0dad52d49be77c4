use permcat_definitions::{ClusterRole, ClusterRoleBinding, NamespacedName, Role, RoleBinding};

use super::Result;

/// Lists the namespaces of the cluster
pub trait NamespaceLister {
    fn list_namespaces(&self) -> Result<Vec<String>>;
}

/// Lists policy tiers
pub trait TierLister {
    fn list_tiers(&self) -> Result<Vec<String>>;
}

pub trait UISettingsGroupLister {
    fn list_ui_settings_groups(&self) -> Result<Vec<String>>;
}

/// Lists managed clusters along with their owning namespace in multi-tenant setups
pub trait ManagedClusterLister {
    fn list_managed_clusters(&self) -> Result<Vec<NamespacedName>>;
}

/// Role retrieval; `Ok(None)` when the role does not exist
pub trait RoleGetter {
    fn get_role(&self, namespace: &str, name: &str) -> Result<Option<Role>>;
}

pub trait RoleBindingLister {
    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<RoleBinding>>;
}

/// ClusterRole retrieval; `Ok(None)` when the role does not exist
pub trait ClusterRoleGetter {
    fn get_cluster_role(&self, name: &str) -> Result<Option<ClusterRole>>;
}

pub trait ClusterRoleBindingLister {
    fn list_cluster_role_bindings(&self) -> Result<Vec<ClusterRoleBinding>>;
}

/// Everything the calculator needs from a cluster
pub trait ClusterClient:
    NamespaceLister
    + TierLister
    + UISettingsGroupLister
    + ManagedClusterLister
    + RoleGetter
    + RoleBindingLister
    + ClusterRoleGetter
    + ClusterRoleBindingLister
    + Send
    + Sync
{
}

impl<T> ClusterClient for T where
    T: NamespaceLister
        + TierLister
        + UISettingsGroupLister
        + ManagedClusterLister
        + RoleGetter
        + RoleBindingLister
        + ClusterRoleGetter
        + ClusterRoleBindingLister
        + Send
        + Sync
{
}
