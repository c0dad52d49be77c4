use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

use super::{Error, ErrorKind, Result};

/// The RBAC verbs evaluated by the calculator
///
/// Ordering follows the declaration order, which is also the order used when printing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    Get,
    List,
    Watch,
    Create,
    Update,
    Patch,
    Delete,
}

pub const ALL_VERBS: [Verb; 7] = [
    Verb::Get,
    Verb::List,
    Verb::Watch,
    Verb::Create,
    Verb::Update,
    Verb::Patch,
    Verb::Delete,
];

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Watch => "watch",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Verb> {
        match ALL_VERBS.iter().find(|v| v.as_str() == s) {
            Some(v) => Ok(*v),
            None => bail!(ErrorKind::UnknownVerb(s.to_string())),
        }
    }
}

impl Serialize for Verb {
    fn serialize<S: Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Verb, D::Error> {
        deserializer.deserialize_str(ParsedVisitor::<Verb>::new("a lowercase rbac verb"))
    }
}

/// A kubernetes resource identified by api group and plural resource name
///
/// Prints as `resource.group`, or just `resource` for the core group.
/// Subresources are kept in the resource name, e.g. `pods/status`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceType {
    pub api_group: String,
    pub resource: String,
}

impl ResourceType {
    pub fn new(api_group: &str, resource: &str) -> Self {
        ResourceType {
            api_group: api_group.to_string(),
            resource: resource.to_string(),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.api_group.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.api_group)
        }
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<ResourceType> {
        let (resource, group) = match s.find('.') {
            Some(idx) => (&s[..idx], &s[idx + 1..]),
            None => (s, ""),
        };
        if resource.is_empty() {
            bail!(ErrorKind::InvalidResourceType(s.to_string()));
        }
        Ok(ResourceType::new(group, resource))
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> ::std::result::Result<ResourceType, D::Error> {
        deserializer.deserialize_str(ParsedVisitor::<ResourceType>::new("a resource type like resource.group"))
    }
}

/// Visitor for string-encoded types with a `FromStr` impl
struct ParsedVisitor<T> {
    expected: &'static str,
    marker: ::std::marker::PhantomData<T>,
}

impl<T> ParsedVisitor<T> {
    fn new(expected: &'static str) -> Self {
        ParsedVisitor {
            expected,
            marker: ::std::marker::PhantomData,
        }
    }
}

impl<'de, T> Visitor<'de> for ParsedVisitor<T>
where
    T: FromStr<Err = Error>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.expected)
    }

    fn visit_str<E>(self, v: &str) -> ::std::result::Result<T, E>
    where
        E: de::Error,
    {
        v.parse().map_err(|e: Error| E::custom(e.to_string()))
    }
}

/// A set of verbs requested for a resource type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceVerbs {
    pub resourceType: ResourceType,
    pub verbs: Vec<Verb>,
}

impl ResourceVerbs {
    pub fn new(resource_type: ResourceType, verbs: Vec<Verb>) -> Self {
        ResourceVerbs {
            resourceType: resource_type,
            verbs,
        }
    }
}

/// A single scope in which a verb is authorized
///
/// Empty fields are unconstrained. A match with every field empty grants the verb everywhere.
/// All fields are always serialized, empty or not.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, rename = "uisettingsgroup")]
    pub ui_settings_group: String,
    #[serde(default, rename = "managedcluster")]
    pub managed_cluster: String,
}

impl Match {
    /// The unconstrained match
    pub fn all() -> Self {
        Match::default()
    }

    pub fn namespace(ns: &str) -> Self {
        Match {
            namespace: ns.to_string(),
            ..Match::default()
        }
    }

    pub fn tier(tier: &str) -> Self {
        Match {
            tier: tier.to_string(),
            ..Match::default()
        }
    }

    pub fn ui_settings_group(group: &str) -> Self {
        Match {
            ui_settings_group: group.to_string(),
            ..Match::default()
        }
    }

    pub fn managed_cluster(cluster: &str) -> Self {
        Match {
            managed_cluster: cluster.to_string(),
            ..Match::default()
        }
    }

    pub fn in_namespace(mut self, ns: &str) -> Self {
        self.namespace = ns.to_string();
        self
    }

    /// Whether every scoping field is empty
    pub fn is_unconstrained(&self) -> bool {
        self.tier.is_empty()
            && self.namespace.is_empty()
            && self.ui_settings_group.is_empty()
            && self.managed_cluster.is_empty()
    }

    /// The same match with the namespace cleared
    pub fn without_namespace(&self) -> Self {
        Match {
            namespace: String::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Match(tier={}; namespace={}; uisettingsgroup={}; managedcluster={})",
            self.tier, self.namespace, self.ui_settings_group, self.managed_cluster
        )
    }
}

/// The matches for each requested verb of a single resource type
///
/// An empty vector means the verb was evaluated and nothing was granted.
pub type VerbMatches = BTreeMap<Verb, Vec<Match>>;

/// Calculated permissions for every requested resource type
pub type Permissions = BTreeMap<ResourceType, VerbMatches>;
