use std::collections::HashMap;

use permcat_definitions::{Dimension, Match, ResourceInfo, ScopeKind};

use super::user::UserCalculator;

impl<'a> UserCalculator<'a> {
    /// Narrow watch matches to what the user can also list
    pub(crate) fn filter_watch(&mut self, info: &ResourceInfo, watch: Vec<Match>, list: &[Match]) -> Vec<Match> {
        let filtered = match info.kind {
            ScopeKind::Catalog(dim @ Dimension::Tier) | ScopeKind::Catalog(dim @ Dimension::UISettingsGroup) => {
                self.filter_catalog_watch(dim, watch, list)
            }
            _ => filter_against_list(watch, list),
        };
        trace!("{} watch narrowed to {} matches", info.resource_type, filtered.len());
        filtered
    }

    /// Tiers and ui settings groups are watched member by member unless listable wholesale
    fn filter_catalog_watch(&mut self, dim: Dimension, watch: Vec<Match>, list: &[Match]) -> Vec<Match> {
        let gettable: Vec<Match> = self.gettable(dim).iter().map(|m| dim.scope(m)).collect();
        if is_unconstrained(&watch) {
            if is_unconstrained(list) {
                return watch;
            }
            debug!("Expanding cluster wide watch of {} to gettable members", dim);
            return gettable;
        }
        watch.into_iter().filter(|m| gettable.contains(m)).collect()
    }
}

fn is_unconstrained(matches: &[Match]) -> bool {
    matches.len() == 1 && matches[0].is_unconstrained()
}

/// Namespaces with list access for a group of matches sharing every non-namespace field
#[derive(Default)]
struct Listed {
    all_namespaces: bool,
    namespaces: Vec<String>,
}

/// Drop or narrow watch matches that have no list coverage
///
/// A watch across namespaces is split into one match per listed namespace when the
/// list is namespace restricted.
pub fn filter_against_list(watch: Vec<Match>, list: &[Match]) -> Vec<Match> {
    let mut listed: HashMap<Match, Listed> = HashMap::new();
    for m in list {
        let entry = listed.entry(m.without_namespace()).or_default();
        if m.namespace.is_empty() {
            entry.all_namespaces = true;
        } else if !entry.namespaces.contains(&m.namespace) {
            entry.namespaces.push(m.namespace.clone());
        }
    }

    let mut filtered = vec![];
    for w in watch {
        let candidates = match listed.get(&w.without_namespace()) {
            None => {
                trace!("dropping {}: not listable", w);
                continue;
            }
            Some(l) if l.all_namespaces => vec![w],
            Some(l) if w.namespace.is_empty() => l.namespaces.iter().map(|ns| w.clone().in_namespace(ns)).collect(),
            Some(l) if l.namespaces.contains(&w.namespace) => vec![w],
            Some(_) => {
                trace!("dropping {}: namespace not listable", w);
                continue;
            }
        };
        for c in candidates {
            if !filtered.contains(&c) {
                filtered.push(c);
            }
        }
    }
    filtered
}
