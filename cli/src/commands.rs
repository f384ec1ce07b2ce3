//! Subcommands and their execution against a state file.

use crate::state;
use anyhow::anyhow;
use clap::Subcommand;
use permit_governance::{
    Direction, Governance, GovernanceConfig, GovernanceError, GovernanceEvent,
};
use permit_types::{AccountId, QuorumPolicy, SlotKey, Timestamp};
use permit_utils::{format_duration, remaining_secs};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new state file with a bootstrap admin.
    Init {
        #[arg(long)]
        bootstrap: AccountId,
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },
    AddAdmin {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        target: AccountId,
    },
    RemoveAdmin {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        target: AccountId,
    },
    /// Seed admins in bulk (setup only).
    AddAdmins {
        #[arg(long)]
        caller: AccountId,
        /// Comma-separated account list.
        #[arg(long, value_delimiter = ',', required = true)]
        targets: Vec<AccountId>,
    },
    /// Close setup permanently.
    LockSetup {
        #[arg(long)]
        caller: AccountId,
    },
    /// Vote to install a super admin, or with `--remove` to depose one.
    Vote {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        candidate: AccountId,
        #[arg(long)]
        remove: bool,
    },
    RevertVote {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        candidate: AccountId,
        #[arg(long)]
        remove: bool,
    },
    /// Step down as super admin.
    Resign {
        #[arg(long)]
        caller: AccountId,
    },
    SetQuorum {
        #[arg(long)]
        caller: AccountId,
        /// majority, two-thirds, two-thirds-plus-one or fixed.
        #[arg(long)]
        policy: QuorumPolicy,
    },
    SetFixedQuorum {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        number: u32,
    },
    SetVoteDuration {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        secs: u64,
    },
    SetQuarantine {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        secs: u64,
    },
    /// Propose a registry value, or vote for an existing proposal.
    Propose {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        slot: SlotKey,
        #[arg(long)]
        value: AccountId,
    },
    /// Wire a registry slot directly (setup only, bootstrap authority).
    RegisterSlot {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        slot: SlotKey,
        #[arg(long)]
        value: AccountId,
    },
    /// Purge expired quarantine stamps, votes and proposals.
    Sanitize,
    /// Print the current governance state.
    Status {
        /// Also report live votes for this candidate.
        #[arg(long)]
        candidate: Option<AccountId>,
    },
}

/// Everything a command needs besides its own arguments.
#[derive(Clone, Debug)]
pub struct Context {
    pub state_path: PathBuf,
    /// Only consulted by `init`.
    pub governance: GovernanceConfig,
    pub now: Timestamp,
}

fn direction(remove: bool) -> Direction {
    if remove {
        Direction::Remove
    } else {
        Direction::Install
    }
}

/// Run `command` and return its output as JSON lines.
pub fn execute(command: &Command, ctx: &Context) -> anyhow::Result<Vec<String>> {
    let now = ctx.now;
    match command {
        Command::Init { bootstrap, force } => {
            let governance = Governance::new(*bootstrap, ctx.governance.clone(), now)
                .map_err(rejected)?;
            state::create(&ctx.state_path, &governance, *force)?;
            tracing::info!(path = %ctx.state_path.display(), %bootstrap, "state initialised");
            Ok(vec![json!({
                "initialised": ctx.state_path.display().to_string(),
                "bootstrap": bootstrap,
            })
            .to_string()])
        }
        Command::AddAdmin { caller, target } => {
            mutate(ctx, |g| g.add_admin(*caller, *target, now).map(one))
        }
        Command::RemoveAdmin { caller, target } => {
            mutate(ctx, |g| g.remove_admin(*caller, *target, now).map(one))
        }
        Command::AddAdmins { caller, targets } => {
            mutate(ctx, |g| g.add_admins(*caller, targets, now))
        }
        Command::LockSetup { caller } => mutate(ctx, |g| g.lock_setup(*caller, now).map(one)),
        Command::Vote {
            caller,
            candidate,
            remove,
        } => mutate(ctx, |g| {
            g.vote(*caller, *candidate, direction(*remove), now).map(one)
        }),
        Command::RevertVote {
            caller,
            candidate,
            remove,
        } => mutate(ctx, |g| {
            g.revert_vote(*caller, *candidate, direction(*remove), now)
                .map(one)
        }),
        Command::Resign { caller } => mutate(ctx, |g| g.resign_super_admin(*caller).map(one)),
        Command::SetQuorum { caller, policy } => {
            mutate(ctx, |g| g.set_quorum_type(*caller, *policy).map(one))
        }
        Command::SetFixedQuorum { caller, number } => {
            mutate(ctx, |g| g.set_fixed_quorum_number(*caller, *number).map(one))
        }
        Command::SetVoteDuration { caller, secs } => {
            mutate(ctx, |g| g.set_vote_duration(*caller, *secs).map(one))
        }
        Command::SetQuarantine { caller, secs } => {
            mutate(ctx, |g| g.set_quarantine(*caller, *secs).map(one))
        }
        Command::Propose {
            caller,
            slot,
            value,
        } => mutate(ctx, |g| {
            g.propose_or_vote(*caller, slot.clone(), *value, now).map(one)
        }),
        Command::RegisterSlot {
            caller,
            slot,
            value,
        } => mutate(ctx, |g| g.register_slot(*caller, slot.clone(), *value).map(one)),
        Command::Sanitize => {
            let mut governance = state::load(&ctx.state_path)?;
            let report = governance.sanitize(now);
            state::save(&ctx.state_path, &governance)?;
            Ok(vec![json!({ "sanitized": report }).to_string()])
        }
        Command::Status { candidate } => {
            let governance = state::load(&ctx.state_path)?;
            Ok(vec![status(&governance, candidate.as_ref(), now).to_string()])
        }
    }
}

fn one(event: GovernanceEvent) -> Vec<GovernanceEvent> {
    vec![event]
}

fn rejected(e: GovernanceError) -> anyhow::Error {
    anyhow!("rejected [{}]: {e}", e.code())
}

/// Load, apply, and save only if the operation was accepted.
fn mutate<F>(ctx: &Context, op: F) -> anyhow::Result<Vec<String>>
where
    F: FnOnce(&mut Governance) -> Result<Vec<GovernanceEvent>, GovernanceError>,
{
    let mut governance = state::load(&ctx.state_path)?;
    let events = op(&mut governance).map_err(rejected)?;
    state::save(&ctx.state_path, &governance)?;
    events
        .iter()
        .map(|e| serde_json::to_string(e).map_err(Into::into))
        .collect()
}

fn status(governance: &Governance, candidate: Option<&AccountId>, now: Timestamp) -> serde_json::Value {
    let params = governance.params();
    let admins: Vec<_> = governance
        .admins()
        .iter()
        .map(|admin| {
            let until = governance.quarantined_until(admin);
            json!({
                "account": admin,
                "super_admin": governance.is_super_admin(admin),
                "quarantine_left": remaining_secs(now.as_secs(), until.as_secs()).map(format_duration),
            })
        })
        .collect();
    let slots: serde_json::Map<String, serde_json::Value> = governance
        .slot_keys()
        .iter()
        .filter_map(|slot| {
            governance
                .resolved_slot_value(slot)
                .map(|value| (slot.to_string(), json!(value)))
        })
        .collect();

    let mut out = json!({
        "now": now.as_secs(),
        "setup_open": governance.is_setup_open(),
        "bootstrap_authority": governance.bootstrap_authority(),
        "super_admin": governance.super_admin(),
        "admins": admins,
        "quorum_policy": params.quorum_policy.as_str(),
        "fixed_quorum_number": params.fixed_quorum_number,
        "required_votes": governance.required_votes(),
        "vote_duration": format_duration(params.vote_duration_secs),
        "quarantine": format_duration(params.quarantine_secs),
        "slots": slots,
    });
    if let Some(candidate) = candidate {
        let tally = governance.votes_for(candidate, now);
        out["votes"] = json!({
            "candidate": candidate,
            "install": tally.install,
            "remove": tally.remove,
        });
    }
    out
}
