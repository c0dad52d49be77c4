use permcat_definitions::rbac::WILDCARD;
use permcat_definitions::{PolicyRule, Verb};

/// A resource request checked against rbac rules
///
/// `resource` may carry a subresource (`pods/status`).
/// An empty `name` requests every instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Attributes {
    pub verb: Verb,
    pub api_group: String,
    pub resource: String,
    pub name: String,
}

impl Attributes {
    /// Request for every instance of a resource
    pub fn new(verb: Verb, api_group: &str, resource: &str) -> Self {
        Attributes {
            verb,
            api_group: api_group.to_string(),
            resource: resource.to_string(),
            name: String::new(),
        }
    }

    /// The same request narrowed to a single instance
    pub fn named(&self, name: &str) -> Self {
        Attributes {
            name: name.to_string(),
            ..self.clone()
        }
    }
}

/// Whether any rule allows the request
pub fn rules_allow(attrs: &Attributes, rules: &[PolicyRule]) -> bool {
    rules.iter().any(|r| rule_allows(attrs, r))
}

pub fn rule_allows(attrs: &Attributes, rule: &PolicyRule) -> bool {
    verb_matches(rule, attrs.verb)
        && api_group_matches(rule, &attrs.api_group)
        && resource_matches(rule, &attrs.resource)
        && resource_name_matches(rule, &attrs.name)
}

fn verb_matches(rule: &PolicyRule, verb: Verb) -> bool {
    rule.verbs.iter().any(|v| v == WILDCARD || v == verb.as_str())
}

fn api_group_matches(rule: &PolicyRule, group: &str) -> bool {
    rule.apiGroups.iter().any(|g| g == WILDCARD || g == group)
}

fn resource_matches(rule: &PolicyRule, resource: &str) -> bool {
    let subresource = resource.find('/').map(|idx| &resource[idx..]);
    rule.resources.iter().any(|r| {
        if r == WILDCARD || r == resource {
            return true;
        }
        // "*/scale" grants the scale subresource of everything
        match subresource {
            Some(sub) => r.starts_with(WILDCARD) && &r[WILDCARD.len()..] == sub,
            None => false,
        }
    })
}

fn resource_name_matches(rule: &PolicyRule, name: &str) -> bool {
    if rule.resourceNames.is_empty() {
        return true;
    }
    !name.is_empty() && rule.resourceNames.iter().any(|n| n == name)
}
