use std::collections::{BTreeMap, BTreeSet};

use permcat_definitions::{
    AuthorizationReview, AuthorizationReviewStatus, AuthorizedResourceGroup, AuthorizedResourceVerb,
    AuthorizedResourceVerbs, Permissions, ResourceAttributes, ResourceType, ResourceVerbs, UserInfo, Verb,
};

use super::{Calculator, Result};

/// Complete an AuthorizationReview
///
/// The user named in the review is evaluated, falling back to the requesting user.
/// Without either the review is returned with an empty status.
pub fn create(
    calculator: &Calculator,
    mut review: AuthorizationReview,
    requester: Option<&UserInfo>,
) -> Result<AuthorizationReview> {
    let user = if !review.spec.user.is_empty() {
        UserInfo {
            name: review.spec.user.clone(),
            uid: review.spec.uid.clone(),
            groups: review.spec.groups.clone(),
            extra: review.spec.extra.clone(),
        }
    } else if let Some(u) = requester {
        review.spec.user = u.name.clone();
        review.spec.uid = u.uid.clone();
        review.spec.groups = u.groups.clone();
        review.spec.extra = u.extra.clone();
        u.clone()
    } else {
        debug!("No user in review or request, nothing to evaluate");
        return Ok(review);
    };

    let rvs = resource_verbs(&review.spec.resourceAttributes)?;
    info!("Reviewing {} resource types for {}", rvs.len(), user.name);
    let permissions = calculator.calculate_permissions(&user, &rvs)?.into_result()?;
    review.status = AuthorizationReviewStatus {
        authorizedResourceVerbs: authorized_resource_verbs(permissions),
    };
    Ok(review)
}

/// Requested verbs per resource type, deduplicated
pub fn resource_verbs(attrs: &[ResourceAttributes]) -> Result<Vec<ResourceVerbs>> {
    let mut requested: BTreeMap<ResourceType, BTreeSet<Verb>> = BTreeMap::new();
    for attr in attrs {
        let mut verbs = BTreeSet::new();
        for v in &attr.verbs {
            verbs.insert(v.parse::<Verb>()?);
        }
        for r in &attr.resources {
            let rt = ResourceType::new(&attr.apiGroup, r);
            requested.entry(rt).or_default().extend(verbs.iter().cloned());
        }
    }
    Ok(requested
        .into_iter()
        .map(|(rt, verbs)| ResourceVerbs::new(rt, verbs.into_iter().collect()))
        .collect())
}

/// Status entries sorted by api group, resource, verb and then match
pub fn authorized_resource_verbs(permissions: Permissions) -> Vec<AuthorizedResourceVerbs> {
    let mut res = vec![];
    for (rt, verbs) in permissions {
        let mut authorized: Vec<AuthorizedResourceVerb> = verbs
            .into_iter()
            .map(|(verb, mut matches)| {
                matches.sort();
                matches.dedup();
                AuthorizedResourceVerb {
                    verb: verb.to_string(),
                    resourceGroups: matches.into_iter().map(AuthorizedResourceGroup::from).collect(),
                }
            })
            .collect();
        authorized.sort_by(|a, b| a.verb.cmp(&b.verb));
        res.push(AuthorizedResourceVerbs {
            apiGroup: rt.api_group,
            resource: rt.resource,
            verbs: authorized,
        });
    }
    res
}
