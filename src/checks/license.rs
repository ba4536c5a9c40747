//! Licensing markers must match the component's declared category.
//!
//! The category (tier) comes from the descriptor property `category`. Each
//! tier maps to the licensing markers a connector class must and must not
//! carry; the mapping lives in [`TIER_POLICIES`], one row per tier group.

use crate::checks::{RuleInfo, TreeCheck, TreeContext};
use crate::context::{Node, NodeKind};
use crate::error::CollaboratorFault;
use crate::issue::{Issue, IssueSink};

pub const KEY: &str = "license-by-category";

/// Descriptor property naming the tier.
pub const CATEGORY_PROPERTY: &str = "category";

const CONNECTOR: &str = "Connector";
const ENTERPRISE_LICENSE: &str = "RequiresEnterpriseLicense";
const ENTITLEMENT: &str = "RequiresEntitlement";

/// Marker requirements for a group of tiers.
pub struct TierPolicy {
    /// Upper-case tier names this row applies to.
    pub tiers: &'static [&'static str],
    pub required: &'static [&'static str],
    pub forbidden: &'static [&'static str],
    /// `(marker, argument)` pairs: when the marker is present it must carry
    /// the named argument.
    pub required_arguments: &'static [(&'static str, &'static str)],
    pub message: &'static str,
}

pub const TIER_POLICIES: &[TierPolicy] = &[
    TierPolicy {
        tiers: &["PREMIUM"],
        required: &[ENTERPRISE_LICENSE, ENTITLEMENT],
        forbidden: &[],
        required_arguments: &[(ENTITLEMENT, "name")],
        message: "@RequiresEnterpriseLicense and @RequiresEntitlement need to be defined for Premium category.",
    },
    TierPolicy {
        tiers: &["STANDARD", "SELECT", "CERTIFIED"],
        required: &[ENTERPRISE_LICENSE],
        forbidden: &[ENTITLEMENT],
        required_arguments: &[],
        message: "@RequiresEnterpriseLicense must be defined and @RequiresEntitlement must not be present for Select and Certified category.",
    },
    TierPolicy {
        tiers: &["COMMUNITY"],
        required: &[],
        forbidden: &[ENTERPRISE_LICENSE, ENTITLEMENT],
        required_arguments: &[],
        message: "@RequiresEnterpriseLicense and @RequiresEntitlement must not be present for Community category.",
    },
];

/// Looks up the policy for `tier`, ignoring case.
pub fn policy_for(tier: &str) -> Option<&'static TierPolicy> {
    let upper = tier.trim().to_uppercase();
    TIER_POLICIES
        .iter()
        .find(|p| p.tiers.contains(&upper.as_str()))
}

/// `true` when the class carries every required marker and no forbidden one.
fn satisfies_markers(class: &Node, policy: &TierPolicy) -> bool {
    policy.required.iter().all(|m| class.has_marker(m))
        && !policy.forbidden.iter().any(|m| class.has_marker(m))
}

/// Required `(marker, argument)` pairs whose marker is present without the argument.
fn missing_arguments<'p>(class: &Node, policy: &'p TierPolicy) -> Vec<(&'p str, &'p str)> {
    policy
        .required_arguments
        .iter()
        .filter(|(marker, argument)| {
            class
                .marker(marker)
                .is_some_and(|m| !m.has_argument(argument))
        })
        .map(|(marker, argument)| (*marker, *argument))
        .collect()
}

#[derive(Debug, Default)]
pub struct LicenseByCategoryCheck;

impl LicenseByCategoryCheck {
    pub fn new() -> Self {
        LicenseByCategoryCheck
    }
}

impl TreeCheck for LicenseByCategoryCheck {
    fn key(&self) -> &str {
        KEY
    }

    fn evaluate(&self, ctx: &TreeContext<'_>) -> Result<Vec<Issue>, CollaboratorFault> {
        let mut sink = IssueSink::new(KEY);
        let connectors: Vec<&Node> = ctx
            .tree
            .nodes_of_kind(NodeKind::Class)
            .into_iter()
            .filter(|c| c.has_marker(CONNECTOR))
            .collect();
        if connectors.is_empty() {
            return Ok(sink.finish());
        }

        let Some(category) = ctx.descriptor.property(CATEGORY_PROPERTY) else {
            sink.invalid_configuration(
                format!("Descriptor does not declare the '{CATEGORY_PROPERTY}' property"),
                None,
            );
            return Ok(sink.finish());
        };
        tracing::debug!(rule = KEY, category, "checking licensing markers");

        let policy = policy_for(category);
        for class in connectors {
            let Some(policy) = policy else {
                sink.invalid_configuration(
                    format!("Invalid category specified in descriptor: '{category}'"),
                    Some(class.location()),
                );
                continue;
            };
            if !satisfies_markers(class, policy) {
                sink.violation(policy.message, Some(class.location()));
            }
            for (marker, argument) in missing_arguments(class, policy) {
                sink.violation(
                    format!("'{argument}' attribute must be defined for @{marker} using connector name."),
                    Some(class.location()),
                );
            }
        }

        Ok(sink.finish())
    }
}

pub fn rules() -> Vec<RuleInfo> {
    vec![RuleInfo {
        key: KEY,
        priority: "critical",
        context: "tree",
        name: "Licensing annotations must match the category declared in the descriptor",
        description: "Checks @RequiresEnterpriseLicense and @RequiresEntitlement on @Connector classes against the descriptor 'category' property: Premium requires both (and a 'name' on @RequiresEntitlement), Standard/Select/Certified require only @RequiresEnterpriseLicense, Community forbids both.",
    }]
}
