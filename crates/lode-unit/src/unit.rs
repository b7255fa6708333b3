//! The mining unit state machine.
//!
//! Every mutating operation runs as one transaction:
//!
//! 1. the absorbing terminate flag is checked,
//! 2. the operation body runs against a [`Draft`] copy of the state: state
//!    guards, then the caller's role, then effects (including settlement
//!    bookkeeping),
//! 3. outgoing ledger transfers run as one atomic batch,
//! 4. the draft and its events are committed.
//!
//! An error at any step drops the draft, so the unit is left exactly as it
//! was. All bookkeeping is finished on the draft before the ledger is
//! touched, and `&mut self` rules out re-entry through the same handle.

use tracing::{debug, info};

use lode_core::constants::{first_year_allocation, required_funding};
use lode_core::error::UnitError;
use lode_core::traits::Transfer;
use lode_core::types::{Address, Category, LifecycleState, Role, UnitKind};

use crate::config::{CollectPolicy, UnitConfig};
use crate::engine::{AccrualEngine, Payout};
use crate::events::UnitEvent;
use crate::state::{UnitContext, UnitParams, UnitState};

/// One pool of reward tokens and its owner-facing lifecycle.
#[derive(Debug)]
pub struct MiningUnit {
    state: UnitState,
    ctx: UnitContext,
    config: UnitConfig,
    journal: Vec<UnitEvent>,
}

/// Staged effects of a single operation.
struct Draft<'a> {
    operation: &'static str,
    caller: Address,
    today: u64,
    state: UnitState,
    ctx: &'a UnitContext,
    outgoing: Vec<Transfer>,
    events: Vec<UnitEvent>,
}

impl Draft<'_> {
    /// State guard. Fails with `InvalidState` naming the current lifecycle state.
    fn require(&self, ok: bool) -> Result<(), UnitError> {
        if ok {
            Ok(())
        } else {
            Err(UnitError::InvalidState {
                operation: self.operation,
                state: self.state.lifecycle,
            })
        }
    }

    fn require_state(&self, expected: LifecycleState) -> Result<(), UnitError> {
        self.require(self.state.lifecycle == expected)
    }

    fn authorize(&self, role: Role) -> Result<(), UnitError> {
        let roles = &self.ctx.roles;
        let caller = &self.caller;
        let is_owner = !self.state.owner.is_zero() && *caller == self.state.owner;
        let allowed = match role {
            Role::SystemOperator => roles.is_system_operator(caller),
            Role::CoreTeamAdmin => roles.is_core_team_admin(caller),
            Role::Supervisor => roles.is_supervisor(caller),
            Role::Owner => is_owner,
            Role::OwnerOrOperator => is_owner || roles.is_system_operator(caller),
        };
        if allowed {
            Ok(())
        } else {
            Err(UnitError::PermissionDenied { role })
        }
    }

    /// Settle everything owed up to today, if the unit is accruing.
    fn settle(&mut self) -> Result<Option<Payout>, UnitError> {
        let engine = AccrualEngine::new(self.ctx.schedule.as_ref());
        let Some(settlement) = engine.plan(&self.state, self.today)? else {
            return Ok(None);
        };

        self.outgoing.extend(settlement.legs(&self.state));
        settlement.apply(&mut self.state);
        self.events.push(UnitEvent::Settled {
            day: self.today,
            owner: self.state.owner,
            referral: self.state.referral,
            payout: settlement.payout,
            cumulative_mined_days: self.state.cumulative_mined_days,
        });
        Ok(Some(settlement.payout))
    }

    fn emit(&mut self, event: UnitEvent) {
        self.events.push(event);
    }
}

impl MiningUnit {
    /// Construct a unit in the `Deactivated` state.
    ///
    /// # Errors
    ///
    /// [`UnitError::InvalidConstruction`] for a category above 5, a zero unit
    /// address, a zero owner, or a zero referral on a pool-based unit.
    pub fn new(params: UnitParams, ctx: UnitContext, config: UnitConfig) -> Result<Self, UnitError> {
        let state = UnitState::new(params, ctx.clock.today())?;
        info!(
            unit = %state.address,
            kind = ?state.kind,
            category = %state.category,
            owner = %state.owner,
            "unit created"
        );
        Ok(Self {
            state,
            ctx,
            config,
            journal: Vec::new(),
        })
    }

    /// Rebuild a unit from a [`snapshot`](Self::snapshot).
    pub fn restore(state: UnitState, ctx: UnitContext, config: UnitConfig) -> Self {
        debug!(unit = %state.address, lifecycle = %state.lifecycle, "unit restored");
        Self {
            state,
            ctx,
            config,
            journal: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Transaction plumbing
    // ------------------------------------------------------------------

    fn execute<T>(
        &mut self,
        operation: &'static str,
        caller: &Address,
        body: impl FnOnce(&mut Draft<'_>) -> Result<T, UnitError>,
    ) -> Result<T, UnitError> {
        let result = self.transact(operation, caller, body);
        if let Err(e) = &result {
            debug!(unit = %self.state.address, operation, %caller, error = %e, "operation rejected");
        }
        result
    }

    fn transact<T>(
        &mut self,
        operation: &'static str,
        caller: &Address,
        body: impl FnOnce(&mut Draft<'_>) -> Result<T, UnitError>,
    ) -> Result<T, UnitError> {
        if self.state.terminated {
            return Err(UnitError::Terminated);
        }

        let mut draft = Draft {
            operation,
            caller: *caller,
            today: self.ctx.clock.today(),
            state: self.state.clone(),
            ctx: &self.ctx,
            outgoing: Vec::new(),
            events: Vec::new(),
        };
        let output = body(&mut draft)?;

        if !draft.outgoing.is_empty() {
            self.ctx
                .ledger
                .transfer_batch(&self.state.address, &draft.outgoing)?;
        }

        let Draft { state, events, today, .. } = draft;
        self.state = state;
        self.journal.extend(events);
        info!(
            unit = %self.state.address,
            operation,
            %caller,
            day = today,
            lifecycle = %self.state.lifecycle,
            mining = self.state.mining,
            "operation committed"
        );
        Ok(output)
    }

    // ------------------------------------------------------------------
    // Core-team operations
    // ------------------------------------------------------------------

    /// `Deactivated` → `Activated`.
    ///
    /// On the first activation of a pool-based unit the held balance must
    /// equal capacity + 10% exactly; the first-year allocation is then fixed
    /// at half the capacity and never recomputed.
    pub fn activate(&mut self, caller: &Address) -> Result<(), UnitError> {
        self.execute("activate", caller, |op| {
            op.require_state(LifecycleState::Deactivated)?;
            op.authorize(Role::CoreTeamAdmin)?;

            let mut funded_allocation = None;
            if op.state.kind.is_pool_based() && !op.state.funded {
                let capacity = op.ctx.schedule.capacity_for_category(op.state.category);
                let required = required_funding(capacity).ok_or(UnitError::ArithmeticOverflow)?;
                let held = op.ctx.ledger.balance_of(&op.state.address);
                if held != required {
                    return Err(UnitError::FundingMismatch { held, required });
                }
                let allocation = first_year_allocation(capacity);
                op.state.funded = true;
                op.state.first_year_allocation = allocation;
                funded_allocation = Some(allocation);
            }

            op.state.lifecycle = LifecycleState::Activated;
            let day = op.today;
            op.emit(UnitEvent::Activated { day, funded_allocation });
            Ok(())
        })
    }

    /// Any state but `Deactivated` → `Deactivated`, settling first and
    /// clearing the mining flag.
    pub fn deactivate(&mut self, caller: &Address) -> Result<Option<Payout>, UnitError> {
        self.execute("deactivate", caller, |op| {
            op.require(op.state.lifecycle != LifecycleState::Deactivated)?;
            op.authorize(Role::CoreTeamAdmin)?;

            let payout = op.settle()?;
            op.state.lifecycle = LifecycleState::Deactivated;
            op.state.mining = false;
            let day = op.today;
            op.emit(UnitEvent::Deactivated { day });
            Ok(payout)
        })
    }

    /// Sweep the entire held balance to `to`. Only while `Deactivated`.
    ///
    /// Returns the amount moved. A zero balance commits without a transfer.
    pub fn migrate_ownership(&mut self, caller: &Address, to: &Address) -> Result<u64, UnitError> {
        self.execute("migrate_ownership", caller, |op| {
            op.require_state(LifecycleState::Deactivated)?;
            op.authorize(Role::CoreTeamAdmin)?;
            if to.is_zero() {
                return Err(UnitError::ZeroAddress);
            }

            let amount = op.ctx.ledger.balance_of(&op.state.address);
            if amount > 0 {
                op.outgoing.push(Transfer { to: *to, amount });
            }
            let day = op.today;
            op.emit(UnitEvent::Migrated { day, to: *to, amount });
            Ok(amount)
        })
    }

    /// Set the absorbing terminate flag. Every later mutating call fails
    /// with [`UnitError::Terminated`].
    pub fn terminate(&mut self, caller: &Address) -> Result<(), UnitError> {
        self.execute("terminate", caller, |op| {
            op.authorize(Role::CoreTeamAdmin)?;
            op.state.terminated = true;
            let day = op.today;
            op.emit(UnitEvent::Terminated { day });
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Supervisor operations
    // ------------------------------------------------------------------

    /// `Activated` → `Suspended`, settling first.
    pub fn suspend(&mut self, caller: &Address) -> Result<Option<Payout>, UnitError> {
        self.execute("suspend", caller, |op| {
            op.require_state(LifecycleState::Activated)?;
            op.authorize(Role::Supervisor)?;

            let payout = op.settle()?;
            op.state.lifecycle = LifecycleState::Suspended;
            let day = op.today;
            op.emit(UnitEvent::Suspended { day });
            Ok(payout)
        })
    }

    /// `Suspended` → `Activated`. Restarts the mining clock so suspended
    /// days are never paid.
    pub fn resume(&mut self, caller: &Address) -> Result<(), UnitError> {
        self.execute("resume", caller, |op| {
            op.require_state(LifecycleState::Suspended)?;
            op.authorize(Role::Supervisor)?;

            op.state.lifecycle = LifecycleState::Activated;
            let day = op.today;
            op.state.restart_clock(day);
            op.emit(UnitEvent::Resumed { day });
            Ok(())
        })
    }

    /// Any state but `Stopped` → `Stopped`. Settles to the current owner and
    /// referral, then clears mining and zeroes both addresses.
    pub fn stop(&mut self, caller: &Address) -> Result<Option<Payout>, UnitError> {
        self.execute("stop", caller, |op| {
            op.require(op.state.lifecycle != LifecycleState::Stopped)?;
            op.authorize(Role::Supervisor)?;

            let payout = op.settle()?;
            op.state.lifecycle = LifecycleState::Stopped;
            op.state.mining = false;
            op.state.owner = Address::ZERO;
            op.state.referral = Address::ZERO;
            let day = op.today;
            op.emit(UnitEvent::Stopped { day });
            Ok(payout)
        })
    }

    /// `Stopped` → `Activated` under a new owner and referral.
    pub fn reset(
        &mut self,
        caller: &Address,
        new_owner: &Address,
        new_referral: &Address,
    ) -> Result<(), UnitError> {
        self.execute("reset", caller, |op| {
            op.require_state(LifecycleState::Stopped)?;
            op.authorize(Role::Supervisor)?;
            if new_owner.is_zero() || (op.state.kind.is_pool_based() && new_referral.is_zero()) {
                return Err(UnitError::ZeroAddress);
            }

            op.state.lifecycle = LifecycleState::Activated;
            op.state.owner = *new_owner;
            op.state.referral = *new_referral;
            let day = op.today;
            op.emit(UnitEvent::Reset {
                day,
                owner: *new_owner,
                referral: *new_referral,
            });
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Owner operations
    // ------------------------------------------------------------------

    /// Turn the mining flag on and restart the mining clock.
    pub fn start_mining(&mut self, caller: &Address) -> Result<(), UnitError> {
        self.execute("start_mining", caller, |op| {
            op.require(op.state.lifecycle == LifecycleState::Activated && !op.state.mining)?;
            op.authorize(Role::Owner)?;

            op.state.mining = true;
            let day = op.today;
            op.state.restart_clock(day);
            op.emit(UnitEvent::MiningStarted { day });
            Ok(())
        })
    }

    /// Settle, then turn the mining flag off.
    pub fn stop_mining(&mut self, caller: &Address) -> Result<Option<Payout>, UnitError> {
        self.execute("stop_mining", caller, |op| {
            op.require(op.state.lifecycle == LifecycleState::Activated && op.state.mining)?;
            op.authorize(Role::Owner)?;

            let payout = op.settle()?;
            op.state.mining = false;
            let day = op.today;
            op.emit(UnitEvent::MiningStopped { day });
            Ok(payout)
        })
    }

    /// Pay out everything owed so far. Owner or system operator.
    ///
    /// With [`CollectPolicy::SettleIfMining`] a unit whose mining flag is off
    /// returns `Ok(None)`; with [`CollectPolicy::RequireMining`] it fails
    /// with `InvalidState`.
    pub fn collect(&mut self, caller: &Address) -> Result<Option<Payout>, UnitError> {
        let policy = self.config.collect_policy;
        self.execute("collect", caller, |op| {
            op.require(
                op.state.kind.is_pool_based() && op.state.lifecycle == LifecycleState::Activated,
            )?;
            if policy == CollectPolicy::RequireMining {
                op.require(op.state.mining)?;
            }
            op.authorize(Role::OwnerOrOperator)?;

            op.settle()
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Address under which the unit holds its pool.
    pub fn address(&self) -> Address {
        self.state.address
    }

    pub fn reward_token(&self) -> Address {
        self.state.reward_token
    }

    pub fn kind(&self) -> UnitKind {
        self.state.kind
    }

    pub fn is_pool_based(&self) -> bool {
        self.state.kind.is_pool_based()
    }

    pub fn category(&self) -> Category {
        self.state.category
    }

    /// Current owner; zero while stopped.
    pub fn owner(&self) -> Address {
        self.state.owner
    }

    /// Current referral beneficiary; zero while stopped.
    pub fn referral(&self) -> Address {
        self.state.referral
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.state.lifecycle
    }

    /// `Activated` and the owner's mining flag is on.
    pub fn is_mining(&self) -> bool {
        self.state.is_mining()
    }

    pub fn first_year_allocation(&self) -> u64 {
        self.state.first_year_allocation
    }

    /// Whether the first funded activation has happened.
    pub fn is_funded(&self) -> bool {
        self.state.funded
    }

    pub fn last_settlement_day(&self) -> u64 {
        self.state.last_settlement_day
    }

    pub fn cumulative_mined_days(&self) -> u64 {
        self.state.cumulative_mined_days
    }

    pub fn mining_since_day(&self) -> u64 {
        self.state.mining_since_day
    }

    pub fn is_terminated(&self) -> bool {
        self.state.terminated
    }

    /// Raw `today - last_settlement_day`, whether or not anything is owed.
    pub fn unsettled_elapsed_days(&self) -> u64 {
        self.ctx
            .clock
            .today()
            .saturating_sub(self.state.last_settlement_day)
    }

    /// What a settlement would pay right now, without performing it.
    ///
    /// `Ok(None)` when the unit is terminated, not accruing, or no day has
    /// elapsed. Errors are those the settlement itself would raise.
    pub fn pending_reward(&self) -> Result<Option<Payout>, UnitError> {
        if self.state.terminated {
            return Ok(None);
        }
        let engine = AccrualEngine::new(self.ctx.schedule.as_ref());
        Ok(engine
            .plan(&self.state, self.ctx.clock.today())?
            .map(|settlement| settlement.payout))
    }

    /// The unit's current balance on the reward ledger.
    pub fn held_balance(&self) -> u64 {
        self.ctx.ledger.balance_of(&self.state.address)
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    /// Copy of the full persistent record.
    pub fn snapshot(&self) -> UnitState {
        self.state.clone()
    }

    /// Events committed since creation or the last [`drain_events`](Self::drain_events).
    pub fn events(&self) -> &[UnitEvent] {
        &self.journal
    }

    pub fn drain_events(&mut self) -> Vec<UnitEvent> {
        std::mem::take(&mut self.journal)
    }
}
