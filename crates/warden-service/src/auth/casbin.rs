//! Casbin enforcer holding the compiled ACEs of every node.
//!
//! Policies are `p(subject, node, privilege)`, one per granted privilege of
//! each ACE. `g2(all, privilege)` rows encode the umbrella privilege.

use std::collections::BTreeSet;

use casbin::{CoreApi, MgmtApi};

use super::acl::Ace;
use super::privilege::implication_rules;
use crate::error::ServiceResult;
use crate::tree::node::NodeId;

/// ## Summary
/// Initialize an in-memory Casbin enforcer loaded with the privilege rules.
///
/// ## Errors
/// Returns an error if the model does not parse or the rules cannot be added.
#[tracing::instrument]
pub async fn init_enforcer() -> ServiceResult<casbin::Enforcer> {
    tracing::debug!("Initializing Casbin enforcer");

    let model = casbin::DefaultModel::from_str(include_str!("casbin_model.conf")).await?;
    tracing::debug!("Casbin model loaded");

    let mut enforcer = casbin::Enforcer::new(model, casbin::MemoryAdapter::default()).await?;
    enforcer
        .add_named_grouping_policies("g2", implication_rules())
        .await?;

    tracing::info!(
        grouping_count = enforcer.get_named_grouping_policy("g2").len(),
        "Casbin enforcer initialized successfully"
    );
    Ok(enforcer)
}

/// Compiles ACEs into deduplicated `p` rows for one node.
#[must_use]
pub fn compile_policies(node: NodeId, aces: &[Ace]) -> Vec<Vec<String>> {
    let node = node.to_string();
    let rows: BTreeSet<(String, &'static str)> = aces
        .iter()
        .flat_map(|ace| {
            let subject = ace.principal.subject().casbin_subject();
            ace.privileges
                .iter()
                .map(move |privilege| (subject.clone(), privilege.as_str()))
        })
        .collect();

    rows.into_iter()
        .map(|(subject, privilege)| vec![subject, node.clone(), privilege.to_string()])
        .collect()
}

/// ## Summary
/// Swaps every policy of `node` for the compiled form of `aces`.
///
/// ## Errors
/// Returns an error if Casbin rejects the change.
pub async fn replace_node_policies(
    enforcer: &mut casbin::Enforcer,
    node: NodeId,
    aces: &[Ace],
) -> ServiceResult<()> {
    enforcer
        .remove_filtered_policy(1, vec![node.to_string()])
        .await?;
    let rows = compile_policies(node, aces);
    if !rows.is_empty() {
        tracing::trace!(%node, rows = rows.len(), "Adding node policies");
        enforcer.add_policies(rows).await?;
    }
    Ok(())
}

/// ## Summary
/// Drops every policy whose subject is `subject`.
///
/// ## Errors
/// Returns an error if Casbin rejects the change.
pub async fn remove_subject_policies(
    enforcer: &mut casbin::Enforcer,
    subject: &str,
) -> ServiceResult<()> {
    enforcer
        .remove_filtered_policy(0, vec![subject.to_string()])
        .await?;
    Ok(())
}

/// Checks one `(subject, node, privilege)` triple.
///
/// ## Errors
/// Returns an error if Casbin evaluation fails.
pub fn enforce(
    enforcer: &casbin::Enforcer,
    subject: &str,
    node: NodeId,
    privilege: &str,
) -> ServiceResult<bool> {
    Ok(enforcer.enforce((subject, node.to_string().as_str(), privilege))?)
}
