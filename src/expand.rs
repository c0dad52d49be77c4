use permcat_definitions::{Dimension, Match, ResourceInfo, ScopeKind, Verb};

use super::authorizer::{rules_allow, Attributes};
use super::user::UserCalculator;

impl<'a> UserCalculator<'a> {
    /// The coarsest set of matches covering everything the user may do with a verb
    ///
    /// Cluster wide grants collapse to a single unconstrained match, except for grouped
    /// resources which always name their group member. Catalog `get` always enumerates.
    pub(crate) fn matches(&mut self, verb: Verb, info: &ResourceInfo) -> Vec<Match> {
        if let (ScopeKind::Catalog(dim), Verb::Get) = (info.kind, verb) {
            trace!("{} {}: enumerating gettable {}", verb, info.resource_type, dim);
            return self.gettable(dim).iter().map(|m| dim.scope(m)).collect();
        }

        let all = Attributes::new(verb, &info.resource_type.api_group, &info.rbac_resource());
        if rules_allow(&all, self.cluster_rules()) {
            return match info.kind {
                ScopeKind::Grouped(dim) => {
                    trace!("{} {}: cluster wide in every gettable {}", verb, info.resource_type, dim);
                    self.gettable(dim).iter().map(|m| dim.scope(m)).collect()
                }
                _ => {
                    trace!("{} {}: cluster wide", verb, info.resource_type);
                    vec![Match::all()]
                }
            };
        }

        // namespaces are scoped by the rbac namespace itself, never by resource name
        if let ScopeKind::Catalog(dim) = info.kind {
            if dim == Dimension::Namespace {
                return vec![];
            }
            let mut matches = vec![];
            for member in self.members(dim) {
                if self.member_allowed(&all, &member) {
                    matches.push(dim.scope(&member));
                }
            }
            return matches;
        }

        let mut matches = vec![];
        let mut unresolved = vec![];
        if let ScopeKind::Grouped(dim) = info.kind {
            for member in self.gettable(dim) {
                let named = all.named(&info.rbac_name(&member.name));
                if rules_allow(&named, self.cluster_rules()) {
                    matches.push(dim.scope(&member));
                } else {
                    unresolved.push(member);
                }
            }
            if unresolved.is_empty() {
                return matches;
            }
        }
        if !info.namespaced {
            return matches;
        }

        let grouped = info.grouped_by();
        for (ns, rules) in self.namespaced_rules() {
            if rules_allow(&all, rules) {
                match grouped {
                    None => matches.push(Match::namespace(ns)),
                    Some(dim) => {
                        for member in &unresolved {
                            matches.push(dim.scope(member).in_namespace(ns));
                        }
                    }
                }
                continue;
            }
            if let Some(dim) = grouped {
                for member in &unresolved {
                    if rules_allow(&all.named(&info.rbac_name(&member.name)), rules) {
                        matches.push(dim.scope(member).in_namespace(ns));
                    }
                }
            }
        }
        matches
    }
}
