use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use permcat_definitions::{
    ApiResource, ApiResourceList, GroupVersion, ResourceInfo, ResourceType, CALICO_API_GROUP,
};

use super::{Error, ErrorKind, Result};

/// A group version that could not be discovered
#[derive(Clone, Debug, PartialEq)]
pub struct GroupFailure {
    pub group_version: String,
    pub message: String,
}

/// Result of a discovery call
///
/// Discovery may partially succeed; groups that failed are listed in `failed`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Discovery {
    pub resources: Vec<ApiResourceList>,
    pub failed: Vec<GroupFailure>,
}

/// Source of the preferred api resources served by a cluster
pub trait DiscoverySource: Send + Sync {
    fn server_preferred_resources(&self) -> Result<Discovery>;
}

/// An immutable view of the registered resource types
#[derive(Debug)]
pub struct Snapshot {
    generation: u64,
    loaded_at: Instant,
    resources: HashMap<ResourceType, ResourceInfo>,
}

impl Snapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, rt: &ResourceType) -> Option<&ResourceInfo> {
        self.resources.get(rt)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All registered resources ordered by resource type
    pub fn resources(&self) -> Vec<&ResourceInfo> {
        let mut res: Vec<&ResourceInfo> = self.resources.values().collect();
        res.sort_by(|a, b| a.resource_type.cmp(&b.resource_type));
        res
    }
}

/// Process-wide catalog of resource types and their scoping
///
/// Loaded lazily on first use. Refreshes replace the snapshot wholesale, so readers
/// holding an older snapshot are never affected by a refresh.
pub struct ResourceCatalog {
    source: Arc<dyn DiscoverySource>,
    primary_group: String,
    min_refresh_interval: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl ResourceCatalog {
    pub fn new(source: Arc<dyn DiscoverySource>) -> Self {
        ResourceCatalog {
            source,
            primary_group: CALICO_API_GROUP.to_string(),
            min_refresh_interval: Duration::from_secs(0),
            current: RwLock::new(None),
        }
    }

    pub fn with_primary_group(mut self, group: &str) -> Self {
        self.primary_group = group.to_string();
        self
    }

    /// Refreshes within this interval of the last load reuse the current snapshot
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn primary_group(&self) -> &str {
        &self.primary_group
    }

    /// The current snapshot, loading it if this is the first use
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        {
            let guard = self.current.read().map_err(|_| Error::from(ErrorKind::CatalogPoisoned))?;
            if let Some(snap) = guard.as_ref() {
                return Ok(snap.clone());
            }
        }
        let mut guard = self.current.write().map_err(|_| Error::from(ErrorKind::CatalogPoisoned))?;
        if let Some(snap) = guard.as_ref() {
            return Ok(snap.clone());
        }
        let snap = Arc::new(self.load(1)?);
        info!("Loaded {} resource types from discovery", snap.len());
        *guard = Some(snap.clone());
        Ok(snap)
    }

    /// Replace the snapshot a caller has found stale
    ///
    /// If another caller already replaced `seen`, or the last load is more recent than the
    /// minimum refresh interval, the current snapshot is returned without a reload.
    pub fn refresh(&self, seen: &Snapshot) -> Result<Arc<Snapshot>> {
        let mut guard = self.current.write().map_err(|_| Error::from(ErrorKind::CatalogPoisoned))?;
        let mut generation = 1;
        if let Some(cur) = guard.as_ref() {
            if cur.generation != seen.generation {
                debug!("Adopting resource catalog generation {}", cur.generation);
                return Ok(cur.clone());
            }
            if cur.loaded_at.elapsed() < self.min_refresh_interval {
                debug!("Resource catalog refreshed recently, not reloading");
                return Ok(cur.clone());
            }
            generation = cur.generation + 1;
        }
        let snap = Arc::new(self.load(generation)?);
        info!("Refreshed resource catalog: {} resource types (generation {})", snap.len(), generation);
        *guard = Some(snap.clone());
        Ok(snap)
    }

    /// Resolve a resource type, refreshing once if it is unknown
    pub fn lookup(&self, rt: &ResourceType) -> Result<Option<ResourceInfo>> {
        let snap = self.snapshot()?;
        if let Some(info) = snap.get(rt) {
            return Ok(Some(info.clone()));
        }
        let snap = self.refresh(&snap)?;
        Ok(snap.get(rt).cloned())
    }

    fn load(&self, generation: u64) -> Result<Snapshot> {
        let discovery = self.source.server_preferred_resources()?;
        self.check_failures(&discovery.failed)?;

        let mut resources = HashMap::new();
        for list in discovery.resources {
            let gv: GroupVersion = match list.groupVersion.parse() {
                Ok(gv) => gv,
                Err(e) => {
                    warn!("Skipping discovered resources: {}", e);
                    continue;
                }
            };
            for r in list.resources {
                if !r.group.is_empty() {
                    trace!("Skipping {} in {}: served from group {}", r.name, list.groupVersion, r.group);
                    continue;
                }
                let rt = ResourceType::new(&gv.group, &r.name);
                trace!("Registering {} (namespaced={})", rt, r.namespaced);
                let info = ResourceInfo::new(rt.clone(), r.namespaced, &self.primary_group);
                resources.insert(rt, info);
            }
        }
        Ok(Snapshot {
            generation,
            loaded_at: Instant::now(),
            resources,
        })
    }

    /// Only failures of the primary group are fatal
    fn check_failures(&self, failed: &[GroupFailure]) -> Result<()> {
        let mut fatal = false;
        for f in failed {
            let group = f.group_version.parse::<GroupVersion>().map(|gv| gv.group).unwrap_or_default();
            if group == self.primary_group {
                fatal = true;
            } else {
                warn!("Ignoring discovery failure for {}: {}", f.group_version, f.message);
            }
        }
        if fatal {
            let mut msgs: Vec<String> = failed
                .iter()
                .map(|f| format!("{}: {}", f.group_version, f.message))
                .collect();
            msgs.sort();
            bail!(ErrorKind::DiscoveryFailed(msgs));
        }
        Ok(())
    }
}

/// Built-in registry of the core and calico resources
#[derive(Clone, Debug)]
pub struct StaticDiscovery {
    lists: Vec<ApiResourceList>,
}

impl Default for StaticDiscovery {
    fn default() -> Self {
        let calico = format!("{}/v3", CALICO_API_GROUP);
        let lists = vec![
            ApiResourceList::new("v1", vec![
                ApiResource::new("namespaces", false, "Namespace"),
                ApiResource::new("nodes", false, "Node"),
                ApiResource::new("pods", true, "Pod"),
                ApiResource::new("pods/status", true, "Pod"),
                ApiResource::new("services", true, "Service"),
                ApiResource::new("serviceaccounts", true, "ServiceAccount"),
            ]),
            ApiResourceList::new("networking.k8s.io/v1", vec![
                ApiResource::new("networkpolicies", true, "NetworkPolicy"),
            ]),
            ApiResourceList::new("extensions/v1beta1", vec![
                ApiResource::new("networkpolicies", true, "NetworkPolicy"),
            ]),
            ApiResourceList::new(&calico, vec![
                ApiResource::new("tiers", false, "Tier"),
                ApiResource::new("networkpolicies", true, "NetworkPolicy"),
                ApiResource::new("globalnetworkpolicies", false, "GlobalNetworkPolicy"),
                ApiResource::new("stagednetworkpolicies", true, "StagedNetworkPolicy"),
                ApiResource::new("stagedglobalnetworkpolicies", false, "StagedGlobalNetworkPolicy"),
                ApiResource::new("stagedkubernetesnetworkpolicies", true, "StagedKubernetesNetworkPolicy"),
                ApiResource::new("networksets", true, "NetworkSet"),
                ApiResource::new("globalnetworksets", false, "GlobalNetworkSet"),
                ApiResource::new("hostendpoints", false, "HostEndpoint"),
                ApiResource::new("managedclusters", false, "ManagedCluster"),
                ApiResource::new("uisettingsgroups", false, "UISettingsGroup"),
                ApiResource::new("uisettings", false, "UISettings"),
            ]),
        ];
        StaticDiscovery { lists }
    }
}

impl StaticDiscovery {
    pub fn new(lists: Vec<ApiResourceList>) -> Self {
        StaticDiscovery { lists }
    }
}

impl DiscoverySource for StaticDiscovery {
    fn server_preferred_resources(&self) -> Result<Discovery> {
        Ok(Discovery {
            resources: self.lists.clone(),
            failed: vec![],
        })
    }
}
