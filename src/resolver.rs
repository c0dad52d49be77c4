use std::sync::Arc;

use permcat_definitions::rbac::{CLUSTER_ROLE_KIND, GROUP_KIND, ROLE_KIND, SERVICE_ACCOUNT_KIND, USER_KIND};
use permcat_definitions::{PolicyRule, RoleRef, Subject, UserInfo};

use super::listers::ClusterClient;
use super::{ErrorKind, ErrorList, Result};

/// Resolves the rbac rules that apply to a user
pub trait RuleResolver: Send + Sync {
    /// Rules effective in a namespace, or at cluster scope for an empty namespace
    ///
    /// Failures are returned alongside whatever rules could be resolved.
    fn rules_for(&self, user: &UserInfo, namespace: &str) -> (Vec<PolicyRule>, ErrorList);
}

/// Which bindings a resolver considers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BindingScope {
    /// ClusterRoleBindings only
    Cluster,
    /// RoleBindings only
    Namespaced,
}

/// Rule resolution over the role and binding getters of a cluster
pub struct DefaultRuleResolver {
    client: Arc<dyn ClusterClient>,
    scope: BindingScope,
}

impl DefaultRuleResolver {
    pub fn cluster(client: Arc<dyn ClusterClient>) -> Self {
        DefaultRuleResolver {
            client,
            scope: BindingScope::Cluster,
        }
    }

    pub fn namespaced(client: Arc<dyn ClusterClient>) -> Self {
        DefaultRuleResolver {
            client,
            scope: BindingScope::Namespaced,
        }
    }

    fn role_rules(&self, role_ref: &RoleRef, namespace: &str) -> Result<Vec<PolicyRule>> {
        let rules = match role_ref.kind.as_str() {
            CLUSTER_ROLE_KIND => self.client.get_cluster_role(&role_ref.name)?.map(|r| r.rules),
            ROLE_KIND => self.client.get_role(namespace, &role_ref.name)?.map(|r| r.rules),
            _ => bail!(ErrorKind::UnsupportedRoleRef(role_ref.kind.clone(), role_ref.name.clone())),
        };
        match rules {
            Some(rs) => Ok(rs),
            None => {
                debug!("{}({}) not found, binding contributes no rules", role_ref.kind, role_ref.name);
                Ok(vec![])
            }
        }
    }
}

impl RuleResolver for DefaultRuleResolver {
    fn rules_for(&self, user: &UserInfo, namespace: &str) -> (Vec<PolicyRule>, ErrorList) {
        let mut rules = vec![];
        let mut errors = ErrorList::new();
        let bindings = match self.scope {
            BindingScope::Cluster => self
                .client
                .list_cluster_role_bindings()
                .map(|bs| bs.into_iter().map(|b| (b.subjects, b.roleRef)).collect::<Vec<_>>()),
            BindingScope::Namespaced if namespace.is_empty() => Ok(vec![]),
            BindingScope::Namespaced => self
                .client
                .list_role_bindings(namespace)
                .map(|bs| bs.into_iter().map(|b| (b.subjects, b.roleRef)).collect::<Vec<_>>()),
        };
        let bindings = match bindings {
            Ok(bs) => bs,
            Err(e) => {
                errors.push(e);
                return (rules, errors);
            }
        };
        for (subjects, role_ref) in bindings {
            if !subjects.iter().any(|s| applies_to(s, user, namespace)) {
                continue;
            }
            match self.role_rules(&role_ref, namespace) {
                Ok(rs) => rules.extend(rs),
                Err(e) => errors.push(e),
            }
        }
        trace!("{} rules for {} in '{}'", rules.len(), user.name, namespace);
        (rules, errors)
    }
}

/// Whether a binding subject refers to the user
///
/// `binding_namespace` is used for service accounts without an explicit namespace.
pub fn applies_to(subject: &Subject, user: &UserInfo, binding_namespace: &str) -> bool {
    match subject.kind.as_str() {
        USER_KIND => subject.name == user.name,
        GROUP_KIND => user.groups.iter().any(|g| *g == subject.name),
        SERVICE_ACCOUNT_KIND => {
            let ns = if subject.namespace.is_empty() {
                binding_namespace
            } else {
                &subject.namespace
            };
            user.name == format!("system:serviceaccount:{}:{}", ns, subject.name)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::applies_to;
    use permcat_definitions::{Subject, UserInfo};

    #[test]
    fn subject_matching() {
        let user = UserInfo::new("jane", &["devs"]);
        assert!(applies_to(&Subject::user("jane"), &user, ""));
        assert!(!applies_to(&Subject::user("john"), &user, ""));
        assert!(applies_to(&Subject::group("devs"), &user, ""));
        assert!(!applies_to(&Subject::group("ops"), &user, ""));

        let sa = UserInfo::new("system:serviceaccount:ns1:builder", &[]);
        assert!(applies_to(&Subject::service_account("ns1", "builder"), &sa, ""));
        assert!(applies_to(&Subject::service_account("", "builder"), &sa, "ns1"));
        assert!(!applies_to(&Subject::service_account("", "builder"), &sa, "ns2"));
    }
}
