//! Action expansion (C4): mapping a virtual action on a composite resource
//! to its post-completion concrete peer before an edge is evaluated.

use ordering_model::{ActionKey, Resource, ResourceKey, Scheduler, TaskName, Variant};
use thiserror::Error;

/// Failure to make sense of an action's `uuid` or of the expansion target it
/// names. Always a configuration problem in the host's input, never a bug in
/// this crate; callers log it and fall back to the unexpanded action (§7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("uuid `{0}` does not match `<resource-id>_<task>_<interval-ms>`")]
    Unparseable(Box<str>),
    #[error("interval `{0}` in uuid is not a valid non-negative integer")]
    BadInterval(Box<str>),
    #[error("expanded task `{task}` not found among resource's actions")]
    TargetNotFound { task: Box<str> },
}

/// The three fields parsed out of an action `uuid` (§6.3): the owning
/// resource's id, the task name, and the recurring-monitor interval in
/// milliseconds (0 for one-shot actions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUuid {
    pub resource_id: Box<str>,
    pub task: Box<str>,
    pub interval_ms: u32,
}

/// Parses `<resource-id>_<task>_<interval-ms>`, tolerating the notify form's
/// extra `_confirmed-post_...` suffix by only ever consuming the last two
/// underscore-delimited fields as task and interval.
pub fn parse_uuid(uuid: &str) -> Result<ParsedUuid, ExpansionError> {
    let mut parts: Vec<&str> = uuid.rsplitn(3, '_').collect();
    if parts.len() != 3 {
        return Err(ExpansionError::Unparseable(uuid.into()));
    }
    // rsplitn yields fields in reverse: [interval, task, resource-id-rest]
    let interval_str = parts.remove(0);
    let task = parts.remove(0);
    let resource_id = parts.remove(0);

    let interval_ms: u32 = interval_str
        .parse()
        .map_err(|_| ExpansionError::BadInterval(interval_str.into()))?;

    Ok(ParsedUuid {
        resource_id: resource_id.into(),
        task: task.into(),
        interval_ms,
    })
}

/// The conversion table from §4.4: a composite action's task mapped onto its
/// post-completion pseudo-event, or `None` when the task is not a candidate
/// for expansion at all (`monitor`, `shutdown`, `fence`, or already one of
/// the expanded forms, which is returned unchanged by the caller rather than
/// by this table).
fn expanded_task(task: &TaskName) -> Option<TaskName> {
    match task {
        TaskName::Start => Some(TaskName::Running),
        TaskName::Stop => Some(TaskName::Stopped),
        TaskName::Notify => Some(TaskName::Notified),
        TaskName::Promote => Some(TaskName::Promoted),
        TaskName::Demote => Some(TaskName::Demoted),
        _ => None,
    }
}

/// Expands `action` in place of the raw reference used by an edge, per the
/// rules in §4.4. Returns the (possibly identical) key of the action to use
/// from here on. Any `ExpansionError` is logged at warning level and
/// swallowed; the original action is used unchanged, since one malformed
/// uuid must not stall the whole pass (§7).
#[tracing::instrument(level = "debug", skip(ctx), fields(uuid = %ctx.action(action).uuid))]
pub fn expand(ctx: &Scheduler, action: ActionKey) -> ActionKey {
    let a = ctx.action(action);

    if a.uuid.contains("notify") {
        return action;
    }
    let Some(resource) = a.resource else {
        return action;
    };
    let resource_data: &Resource = ctx.resource(resource);
    if resource_data.variant < Variant::Group {
        return action;
    }
    if a.task.is_already_expanded() {
        return action;
    }

    let parsed = match parse_uuid(&a.uuid) {
        Ok(p) => p,
        Err(err) => {
            tracing::warn!(%err, "action uuid did not parse, skipping expansion");
            return action;
        }
    };
    if parsed.interval_ms > 0 {
        return action;
    }

    let Some(target_task) = expanded_task(&a.task) else {
        // monitor / shutdown / fence / Other: the constraint refers to the
        // primitive event directly, nothing to expand.
        return action;
    };

    match find_expansion_target(ctx, resource, &target_task) {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(%err, "expansion target not found, using original action");
            action
        }
    }
}

fn find_expansion_target(
    ctx: &Scheduler,
    resource: ResourceKey,
    target_task: &TaskName,
) -> Result<ActionKey, ExpansionError> {
    let resource_data = ctx.resource(resource);
    resource_data
        .actions
        .iter()
        .copied()
        .find(|&key| ctx.action(key).task == *target_task)
        .ok_or_else(|| ExpansionError::TargetNotFound {
            task: target_task.to_string().into_boxed_str(),
        })
}
