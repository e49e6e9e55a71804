//! Intent-to-task planning.
//!
//! Turns a user intent into the ordered task list a queue executes.
//! Planning resolves routing needs (bridge across chains, swap across
//! tokens sized to the wallet shortfall), constructs one leg task per
//! route step, appends the terminal venue operation, injects
//! prerequisite tasks immediately before the tasks that need them, and
//! finally drops tasks whose needed check reports them unnecessary.
//!
//! Insertion order is execution order; every task depending on state
//! written by another appears strictly after its dependency.

use crate::context::ExecutionContext;
use crate::tasks::{
	ApproveTask, DepositTask, PayFeesTask, PermitTask, RouteLegTask, Task, WithdrawTask,
};
use alloy_primitives::{Address, U256};
use futures::future::join_all;
use ramp_routing::RoutingError;
use ramp_types::{Intent, IntentKind, Route, RouteRequest, TaskParams, TokenMetadata};
use thiserror::Error;

/// Errors that can occur during planning.
#[derive(Debug, Error)]
pub enum PlannerError {
	/// The routing oracle returned no routes for a required request.
	#[error("No routes available")]
	NoRoutes,
	/// The routing oracle failed.
	#[error("Routing error: {0}")]
	Routing(String),
}

impl From<RoutingError> for PlannerError {
	fn from(err: RoutingError) -> Self {
		match err {
			RoutingError::NoRoutes => PlannerError::NoRoutes,
			other => PlannerError::Routing(other.to_string()),
		}
	}
}

/// Plans the ordered task list fulfilling an intent.
///
/// May perform network calls: route requests, registry lookups for
/// display metadata, and the concurrent needed probes.
pub async fn plan_tasks(
	intent: &Intent,
	ctx: &ExecutionContext,
) -> Result<Vec<Box<dyn Task>>, PlannerError> {
	let core = match intent.kind {
		IntentKind::Deposit => plan_deposit(intent, ctx).await?,
		IntentKind::Withdraw => plan_withdraw(intent, ctx).await?,
	};
	let tasks = inject_prerequisites(core, ctx).await;
	Ok(filter_needed(tasks, ctx).await)
}

async fn plan_deposit(
	intent: &Intent,
	ctx: &ExecutionContext,
) -> Result<Vec<Box<dyn Task>>, PlannerError> {
	let mut tasks: Vec<Box<dyn Task>> = Vec::new();

	if intent.from_chain != intent.to_chain {
		let route = ctx
			.routing()
			.best_route(&route_request(intent, intent.amount))
			.await?;
		push_leg_tasks(&mut tasks, ctx, route).await;
	} else if intent.source_token() != intent.to_token {
		// Size the swap to what the wallet does not already hold,
		// clamped to zero. A covered shortfall needs no route at all.
		let held = ctx.balance_for(&intent.destination_asset());
		let shortfall = intent.amount.saturating_sub(held);
		if !shortfall.is_zero() {
			let route = ctx
				.routing()
				.best_route(&route_request(intent, shortfall))
				.await?;
			push_leg_tasks(&mut tasks, ctx, route).await;
		} else {
			tracing::debug!(held = %held, "Wallet already covers the deposit; skipping swap");
		}
	}

	let metadata = resolve_metadata(ctx, intent.to_chain, intent.to_token).await;
	tasks.push(Box::new(DepositTask::new(
		intent.to_chain,
		intent.to_token,
		intent.amount,
		metadata,
	)));
	Ok(tasks)
}

async fn plan_withdraw(
	intent: &Intent,
	ctx: &ExecutionContext,
) -> Result<Vec<Box<dyn Task>>, PlannerError> {
	let metadata = resolve_metadata(ctx, intent.from_chain, intent.source_token()).await;
	let mut tasks: Vec<Box<dyn Task>> = vec![Box::new(WithdrawTask::new(
		intent.from_chain,
		intent.source_token(),
		intent.amount,
		metadata,
	))];

	// Post-withdraw routing moves the withdrawn funds onward, e.g. to
	// another chain or token.
	if intent.needs_routing() {
		let route = ctx
			.routing()
			.best_route(&route_request(intent, intent.amount))
			.await?;
		push_leg_tasks(&mut tasks, ctx, route).await;
	}
	Ok(tasks)
}

fn route_request(intent: &Intent, amount: U256) -> RouteRequest {
	RouteRequest {
		from_chain: intent.from_chain,
		to_chain: intent.to_chain,
		from_token: intent.source_token(),
		to_token: intent.to_token,
		amount,
		from_address: intent.user,
	}
}

async fn push_leg_tasks(tasks: &mut Vec<Box<dyn Task>>, ctx: &ExecutionContext, route: Route) {
	let count = route.legs.len();
	for (index, leg) in route.legs.into_iter().enumerate() {
		let metadata = resolve_metadata(ctx, leg.from_chain, leg.from_token).await;
		// The final leg alone records the route's received output.
		let final_leg = index + 1 == count;
		tasks.push(Box::new(RouteLegTask::new(leg, final_leg, metadata)));
	}
}

/// Injects prerequisite tasks immediately before each task that needs
/// them, per the static prerequisite table: a deposit needs an approval
/// of the venue spender and a permit signature, a route leg needs an
/// approval of its spender, a withdrawal needs the fees paid first.
async fn inject_prerequisites(
	core: Vec<Box<dyn Task>>,
	ctx: &ExecutionContext,
) -> Vec<Box<dyn Task>> {
	let mut ordered: Vec<Box<dyn Task>> = Vec::with_capacity(core.len() * 2);
	for task in core {
		let mut prereqs = prerequisites_for(task.as_ref(), ctx).await;
		ordered.append(&mut prereqs);
		ordered.push(task);
	}
	ordered
}

async fn prerequisites_for(task: &dyn Task, ctx: &ExecutionContext) -> Vec<Box<dyn Task>> {
	match &task.descriptor().params {
		TaskParams::Deposit {
			chain_id,
			token,
			amount,
		} => {
			let metadata = resolve_metadata(ctx, *chain_id, *token).await;
			let mut prereqs: Vec<Box<dyn Task>> = Vec::new();
			if let Some(spender) = ctx.config().venue_spender(*chain_id) {
				prereqs.push(Box::new(ApproveTask::new(
					*chain_id,
					*token,
					spender,
					*amount,
					metadata.clone(),
				)));
			}
			prereqs.push(Box::new(PermitTask::new(
				*chain_id, *token, *amount, metadata,
			)));
			prereqs
		},
		TaskParams::RouteLeg { leg, .. } => match leg.approval_spender {
			Some(spender) => {
				let metadata = resolve_metadata(ctx, leg.from_chain, leg.from_token).await;
				vec![Box::new(ApproveTask::new(
					leg.from_chain,
					leg.from_token,
					spender,
					leg.from_amount,
					metadata,
				))]
			},
			None => Vec::new(),
		},
		TaskParams::Withdraw { chain_id, .. } => {
			vec![Box::new(PayFeesTask::new(*chain_id))]
		},
		_ => Vec::new(),
	}
}

/// Runs the needed probes concurrently and drops unnecessary tasks.
///
/// A failed probe keeps its task: dropping a required prerequisite is
/// more dangerous than running a redundant one.
async fn filter_needed(tasks: Vec<Box<dyn Task>>, ctx: &ExecutionContext) -> Vec<Box<dyn Task>> {
	let checks = join_all(tasks.iter().map(|task| task.is_needed(ctx))).await;
	tasks
		.into_iter()
		.zip(checks)
		.filter_map(|(task, needed)| match needed {
			Ok(true) => Some(task),
			Ok(false) => {
				tracing::debug!(task = %task.name(), "Dropping unnecessary task");
				None
			},
			Err(e) => {
				tracing::warn!(task = %task.name(), error = %e, "Needed check failed; keeping task");
				Some(task)
			},
		})
		.collect()
}

async fn resolve_metadata(
	ctx: &ExecutionContext,
	chain_id: u64,
	token: Address,
) -> Option<TokenMetadata> {
	// Metadata feeds display names and approval quirks; a failed lookup
	// falls back to generic behavior rather than failing the plan.
	match ctx.registry().resolve_by_address(token, chain_id).await {
		Ok(metadata) => metadata,
		Err(e) => {
			tracing::warn!(token = %token, chain_id, error = %e, "Token metadata lookup failed");
			None
		},
	}
}
