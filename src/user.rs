use std::sync::Arc;

use permcat_definitions::{Dimension, NamespacedName, Permissions, PolicyRule, ResourceInfo, ResourceType, UserInfo, Verb};

use super::authorizer::{rules_allow, Attributes};
use super::calculator::Calculator;
use super::catalog::Snapshot;
use super::ErrorList;

/// A lazily computed value
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Memo<T> {
    Pending,
    Empty,
    Ready(Vec<T>),
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Memo::Pending
    }
}

impl<T> Memo<T> {
    fn from_vec(xs: Vec<T>) -> Self {
        if xs.is_empty() {
            Memo::Empty
        } else {
            Memo::Ready(xs)
        }
    }

    fn is_pending(&self) -> bool {
        match self {
            Memo::Pending => true,
            _ => false,
        }
    }

    pub(crate) fn values(&self) -> &[T] {
        match self {
            Memo::Ready(xs) => xs,
            _ => &[],
        }
    }
}

/// Memoized state of a single catalog dimension
#[derive(Debug, Default)]
struct DimensionState {
    members: Memo<NamespacedName>,
    gettable: Memo<NamespacedName>,
    can_get_all: Option<bool>,
}

/// Per-query permission accumulator for one user
///
/// Every lister and resolver call is made at most once and only when first needed.
pub(crate) struct UserCalculator<'a> {
    calculator: &'a Calculator,
    user: &'a UserInfo,
    snapshot: Arc<Snapshot>,
    refreshed: bool,
    pub(crate) errors: ErrorList,
    cluster_rules: Memo<PolicyRule>,
    namespaced_rules: Memo<(String, Vec<PolicyRule>)>,
    dimensions: [DimensionState; 4],
    pub(crate) permissions: Permissions,
}

impl<'a> UserCalculator<'a> {
    pub(crate) fn new(calculator: &'a Calculator, user: &'a UserInfo, snapshot: Arc<Snapshot>) -> Self {
        UserCalculator {
            calculator,
            user,
            snapshot,
            refreshed: false,
            errors: ErrorList::new(),
            cluster_rules: Memo::Pending,
            namespaced_rules: Memo::Pending,
            dimensions: Default::default(),
            permissions: Permissions::new(),
        }
    }

    pub(crate) fn primary_group(&self) -> &str {
        self.calculator.catalog().primary_group()
    }

    /// Scope metadata, refreshing the catalog at most once per query
    pub(crate) fn resource_info(&mut self, rt: &ResourceType) -> Option<ResourceInfo> {
        if let Some(info) = self.snapshot.get(rt) {
            return Some(info.clone());
        }
        if self.refreshed {
            return None;
        }
        self.refreshed = true;
        debug!("{} not in resource catalog, refreshing", rt);
        match self.calculator.catalog().refresh(&self.snapshot) {
            Ok(snap) => self.snapshot = snap,
            Err(e) => {
                warn!("Unable to update registered resources, calculated permissions may be incomplete: {}", e);
                self.errors.push(e);
            }
        }
        self.snapshot.get(rt).cloned()
    }

    /// Rules granted to the user through cluster role bindings
    pub(crate) fn cluster_rules(&mut self) -> &[PolicyRule] {
        if self.cluster_rules.is_pending() {
            let (rules, errors) = self.calculator.cluster_resolver().rules_for(self.user, "");
            if !errors.is_empty() {
                debug!("Unable to resolve all cluster rules for {}", self.user.name);
                self.errors.extend(errors);
            }
            self.cluster_rules = Memo::from_vec(rules);
        }
        self.cluster_rules.values()
    }

    /// Rules granted through role bindings, per namespace in lister order
    ///
    /// Namespaces without rules, or whose rules failed to resolve, are left out.
    pub(crate) fn namespaced_rules(&mut self) -> &[(String, Vec<PolicyRule>)] {
        if self.namespaced_rules.is_pending() {
            let mut all = vec![];
            for ns in self.members(Dimension::Namespace) {
                let (rules, errors) = self.calculator.namespaced_resolver().rules_for(self.user, &ns.name);
                if !errors.is_empty() {
                    debug!("Unable to resolve rules for {} in {}", self.user.name, ns.name);
                    self.errors.extend(errors);
                } else if !rules.is_empty() {
                    all.push((ns.name, rules));
                }
            }
            self.namespaced_rules = Memo::from_vec(all);
        }
        self.namespaced_rules.values()
    }

    fn rules_in(&mut self, namespace: &str) -> Option<&[PolicyRule]> {
        self.namespaced_rules()
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Members of a catalog dimension, empty when listing failed
    pub(crate) fn members(&mut self, dim: Dimension) -> Vec<NamespacedName> {
        let idx = dim.index();
        if self.dimensions[idx].members.is_pending() {
            let client = self.calculator.client();
            let listed = match dim {
                Dimension::Namespace => client.list_namespaces().map(names),
                Dimension::Tier => client.list_tiers().map(names),
                Dimension::UISettingsGroup => client.list_ui_settings_groups().map(names),
                Dimension::ManagedCluster => client.list_managed_clusters(),
            };
            self.dimensions[idx].members = match listed {
                Ok(ms) => Memo::from_vec(ms),
                Err(e) => {
                    debug!("Unable to list {}: {}", dim, e);
                    self.errors.push(e);
                    Memo::Empty
                }
            };
        }
        self.dimensions[idx].members.values().to_vec()
    }

    /// Whether cluster rules allow getting every member of a dimension
    fn can_get_all(&mut self, dim: Dimension) -> bool {
        let idx = dim.index();
        if let Some(all) = self.dimensions[idx].can_get_all {
            return all;
        }
        let rt = dim.resource_type(self.primary_group());
        let attrs = Attributes::new(Verb::Get, &rt.api_group, &rt.resource);
        let all = rules_allow(&attrs, self.cluster_rules());
        trace!("{} can get all {}: {}", self.user.name, dim, all);
        self.dimensions[idx].can_get_all = Some(all);
        all
    }

    /// Members of a dimension the user can individually get
    pub(crate) fn gettable(&mut self, dim: Dimension) -> Vec<NamespacedName> {
        let idx = dim.index();
        if self.dimensions[idx].gettable.is_pending() {
            let members = self.members(dim);
            let all = self.can_get_all(dim);
            let rt = dim.resource_type(self.primary_group());
            let attrs = Attributes::new(Verb::Get, &rt.api_group, &rt.resource);
            let mut gettable = vec![];
            for m in members {
                if all || self.member_allowed(&attrs, &m) {
                    gettable.push(m);
                }
            }
            debug!("{} can get {} of {}", self.user.name, gettable.len(), dim);
            self.dimensions[idx].gettable = Memo::from_vec(gettable);
        }
        self.dimensions[idx].gettable.values().to_vec()
    }

    /// Whether a request naming a catalog member is allowed
    ///
    /// Members owned by a namespace are also checked against that namespace's rules.
    pub(crate) fn member_allowed(&mut self, attrs: &Attributes, member: &NamespacedName) -> bool {
        let named = attrs.named(&member.name);
        if rules_allow(&named, self.cluster_rules()) {
            return true;
        }
        if member.namespace.is_empty() {
            return false;
        }
        match self.rules_in(&member.namespace) {
            Some(rules) => rules_allow(&named, rules),
            None => false,
        }
    }

    pub(crate) fn finish(self) -> (Permissions, ErrorList) {
        (self.permissions, self.errors)
    }
}

fn names(xs: Vec<String>) -> Vec<NamespacedName> {
    xs.iter().map(|x| NamespacedName::new(x)).collect()
}
