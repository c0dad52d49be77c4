#![recursion_limit = "1024"]
#![allow(renamed_and_removed_lints)]
#![allow(non_snake_case)]

#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
extern crate serde_json;
extern crate serde;

#[macro_use]
extern crate log;

extern crate regex;

#[macro_use]
extern crate error_chain;
error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }
    links {}
    foreign_links {
        Fmt(::std::fmt::Error);
        Io(::std::io::Error);
        Defs(permcat_definitions::Error);
        SerdeY(serde_yaml::Error);
        SerdeJ(serde_json::Error);
        Regex(regex::Error);
    }
    errors {
        Aggregate(errors: Vec<String>) {
            description("multiple errors")
            display("[{}]", errors.join(", "))
        }
        DiscoveryFailed(failures: Vec<String>) {
            description("unable to retrieve the complete list of server APIs")
            display("unable to retrieve the complete list of server APIs: {}", failures.join(", "))
        }
        UnknownResourceType(rt: String) {
            description("resource type not registered")
            display("resource type {} is not registered", &rt)
        }
        UnsupportedRoleRef(kind: String, name: String) {
            description("unsupported role reference")
            display("unsupported role reference kind {} for {}", &kind, &name)
        }
        CatalogPoisoned {
            description("resource catalog lock poisoned")
            display("resource catalog lock poisoned")
        }
        MissingConfig(dir: String) {
            description("permcat.yml not found")
            display("no permcat.yml found in {}", &dir)
        }
        InvalidConfig(reason: String) {
            description("config does not validate")
            display("invalid config: {}", &reason)
        }
    }
}

pub use permcat_definitions::{
    Dimension, Match, Permissions, ResourceInfo, ResourceType, ResourceVerbs, ScopeKind, UserInfo, Verb,
};

/// Soft failure accumulation
pub mod aggregate;
pub use aggregate::ErrorList;

/// Kubernetes RBAC rule matching
pub mod authorizer;

/// Collaborator traits for catalog enumeration and role retrieval
pub mod listers;
pub use listers::ClusterClient;

/// Binding to rule resolution
pub mod resolver;
pub use resolver::{DefaultRuleResolver, RuleResolver};

/// Discovery-backed resource catalog
pub mod catalog;
pub use catalog::{Discovery, DiscoverySource, ResourceCatalog, Snapshot, StaticDiscovery};

/// The permissions calculator
pub mod calculator;
pub use calculator::{Calculator, Evaluation};

// Per-query memoized state
mod user;
// Rule to match expansion
mod expand;
// Watch narrowing against list
mod watch;
pub use watch::filter_against_list;

/// AuthorizationReview handling
pub mod review;

/// Configuration of the binary
pub mod config;
pub use config::Config;

/// File backed cluster state
pub mod filebacked;
pub use filebacked::ClusterState;

/// Command handlers for the binary
pub mod show;
