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
        SerdeY(serde_yaml::Error);
        SerdeJ(serde_json::Error);
    }
    errors {
        UnknownVerb(verb: String) {
            description("unknown verb")
            display("unsupported verb '{}'", &verb)
        }
        InvalidResourceType(rt: String) {
            description("invalid resource type")
            display("invalid resource type '{}'", &rt)
        }
        InvalidGroupVersion(gv: String) {
            description("invalid group version")
            display("unexpected GroupVersion string: {}", &gv)
        }
    }
}

/// Verbs, resource types, matches and the permissions map
pub mod permissions;
pub use permissions::{Match, Permissions, ResourceType, ResourceVerbs, Verb, VerbMatches, ALL_VERBS};

/// Kubernetes RBAC objects
pub mod rbac;
pub use rbac::{
    ClusterRole, ClusterRoleBinding, Metadata, PolicyRule, Role, RoleBinding, RoleRef, Subject, UserInfo,
};

/// Resource scoping metadata and discovery documents
pub mod resources;
pub use resources::{
    ApiResource, ApiResourceList, Dimension, GroupVersion, NamespacedName, ResourceInfo, ScopeKind,
    CALICO_API_GROUP,
};

/// AuthorizationReview request and response objects
pub mod review;
pub use review::{
    AuthorizationReview, AuthorizationReviewSpec, AuthorizationReviewStatus, AuthorizedResourceGroup,
    AuthorizedResourceVerb, AuthorizedResourceVerbs, ResourceAttributes,
};
