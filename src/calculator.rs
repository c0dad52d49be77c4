use std::collections::BTreeMap;
use std::sync::Arc;

use permcat_definitions::{Permissions, ResourceType, ResourceVerbs, UserInfo, Verb};

use super::catalog::ResourceCatalog;
use super::listers::ClusterClient;
use super::resolver::{DefaultRuleResolver, RuleResolver};
use super::user::UserCalculator;
use super::{Error, ErrorKind, Result};

/// Outcome of a permission calculation
///
/// `permissions` holds a key for every requested resource type and verb even when
/// `error` is set; it is the best answer available despite the failures.
#[derive(Debug)]
pub struct Evaluation {
    pub permissions: Permissions,
    pub error: Option<Error>,
}

impl Evaluation {
    /// Treat any soft failure as fatal
    pub fn into_result(self) -> Result<Permissions> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.permissions),
        }
    }
}

/// Calculates the scopes in which a user may use each verb of a resource type
pub struct Calculator {
    catalog: Arc<ResourceCatalog>,
    client: Arc<dyn ClusterClient>,
    cluster_resolver: Box<dyn RuleResolver>,
    namespaced_resolver: Box<dyn RuleResolver>,
}

impl Calculator {
    pub fn new(catalog: Arc<ResourceCatalog>, client: Arc<dyn ClusterClient>) -> Self {
        Calculator {
            catalog,
            cluster_resolver: Box::new(DefaultRuleResolver::cluster(client.clone())),
            namespaced_resolver: Box::new(DefaultRuleResolver::namespaced(client.clone())),
            client,
        }
    }

    /// Replace the rule resolvers
    pub fn with_resolvers(mut self, cluster: Box<dyn RuleResolver>, namespaced: Box<dyn RuleResolver>) -> Self {
        self.cluster_resolver = cluster;
        self.namespaced_resolver = namespaced;
        self
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub(crate) fn client(&self) -> &dyn ClusterClient {
        self.client.as_ref()
    }

    pub(crate) fn cluster_resolver(&self) -> &dyn RuleResolver {
        self.cluster_resolver.as_ref()
    }

    pub(crate) fn namespaced_resolver(&self) -> &dyn RuleResolver {
        self.namespaced_resolver.as_ref()
    }

    /// Calculate permissions for a set of resource types and verbs
    ///
    /// Only a failure to load the resource catalog is returned as an `Err`.
    /// Every other failure is reported in `Evaluation::error`.
    pub fn calculate_permissions(&self, user: &UserInfo, rvs: &[ResourceVerbs]) -> Result<Evaluation> {
        debug!("Calculating permissions for {} over {} resource types", user.name, rvs.len());
        let snapshot = self.catalog.snapshot()?;
        let mut uc = UserCalculator::new(self, user, snapshot);
        for rv in rvs {
            uc.update_permissions(&rv.resourceType, &rv.verbs);
        }
        let (permissions, errors) = uc.finish();
        let error = errors.flatten();
        if let Some(e) = &error {
            warn!("Permissions for {} are incomplete: {}", user.name, e);
        }
        Ok(Evaluation { permissions, error })
    }
}

impl<'a> UserCalculator<'a> {
    /// Evaluate the verbs of a resource type into the permissions map
    pub(crate) fn update_permissions(&mut self, rt: &ResourceType, verbs: &[Verb]) {
        let mut computed: BTreeMap<Verb, _> = verbs.iter().map(|v| (*v, vec![])).collect();
        match self.resource_info(rt) {
            None => {
                debug!("{} is not a registered resource type", rt);
                self.errors.push(ErrorKind::UnknownResourceType(rt.to_string()).into());
            }
            Some(info) => {
                for verb in verbs {
                    let matches = self.matches(*verb, &info);
                    debug!("{} {}: {} matches", verb, rt, matches.len());
                    computed.insert(*verb, matches);
                }
                let watch = computed.get(&Verb::Watch).cloned().unwrap_or_default();
                if !watch.is_empty() {
                    let list = match computed.get(&Verb::List) {
                        Some(list) => list.clone(),
                        None => self.matches(Verb::List, &info),
                    };
                    computed.insert(Verb::Watch, self.filter_watch(&info, watch, &list));
                }
            }
        }
        self.permissions.entry(rt.clone()).or_default().extend(computed);
    }
}
