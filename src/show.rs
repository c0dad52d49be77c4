use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use regex::Regex;

use permcat_definitions::{AuthorizationReview, ResourceType, ResourceVerbs, UserInfo, Verb};

use super::{review, Config, Result};

/// Parse a `resource[.group]:verb,verb` argument
pub fn parse_resource_verbs(arg: &str) -> Result<ResourceVerbs> {
    let re = Regex::new(r"^(?P<rt>[^:]+):(?P<verbs>[a-z]+(,[a-z]+)*)$")?;
    let caps = match re.captures(arg) {
        Some(caps) => caps,
        None => bail!("'{}' is not of the form resource[.group]:verb,verb", arg),
    };
    let rt: ResourceType = caps["rt"].parse()?;
    let mut verbs = vec![];
    for v in caps["verbs"].split(',') {
        let verb: Verb = v.parse()?;
        if !verbs.contains(&verb) {
            verbs.push(verb);
        }
    }
    Ok(ResourceVerbs::new(rt, verbs))
}

/// Print the permissions of a user as json
///
/// Soft failures are logged; the partial permissions are still printed.
pub fn permissions(conf: &Config, user: &UserInfo, rvs: &[ResourceVerbs]) -> Result<()> {
    let calc = conf.calculator()?;
    let eval = calc.calculate_permissions(user, rvs)?;
    if let Some(e) = &eval.error {
        warn!("Permissions may be incomplete: {}", e);
    }
    println!("{}", serde_json::to_string_pretty(&eval.permissions)?);
    Ok(())
}

/// Complete a review read from a yaml or json file and print it as yaml
pub fn review(conf: &Config, path: &Path, requester: Option<&UserInfo>) -> Result<()> {
    if !path.exists() {
        bail!("Review file {} does not exist", path.display())
    }
    let mut f = File::open(path)?;
    let mut data = String::new();
    f.read_to_string(&mut data)?;
    let ar: AuthorizationReview = serde_yaml::from_str(&data)?;
    let calc = conf.calculator()?;
    let completed = review::create(&calc, ar, requester)?;
    println!("{}", serde_yaml::to_string(&completed)?);
    Ok(())
}

/// Print the resource catalog
pub fn resources(conf: &Config) -> Result<()> {
    let calc = conf.calculator()?;
    let snap = calc.catalog().snapshot()?;
    for info in snap.resources() {
        println!("{:<60} namespaced={:<5} {:?}", info.resource_type.to_string(), info.namespaced, info.kind);
    }
    Ok(())
}

/// Print the config
pub fn config(conf: &Config) -> Result<()> {
    conf.print()?;
    Ok(())
}
