use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::components::protocol::{FighterAction, FighterEvent, MoveTiming};
use crate::components::{FighterContext, FighterId, MoveId};
use crate::config::{FighterConfig, FighterTuning};
use crate::error::FsmError;
use crate::states::StateId;

/// Per-fighter combat state machine.
///
/// Owns the fighter's [`FighterContext`], an inbound event queue and the
/// outbound action buffer. Exactly one [`StateId`] is active at any time and
/// it only changes in two places: while draining queued events, or when the
/// active state's per-tick update asks for a new state.
///
/// # Usage
/// ```
/// use bout::components::{FighterEvent, FighterId};
/// use bout::config::FighterTuning;
/// use bout::fsm::FighterMachine;
/// use bout::states::StateId;
///
/// let mut fsm = FighterMachine::new(FighterId(0), FighterTuning::default());
/// // Each tick:
/// fsm.push_event(FighterEvent::RequestBlock);
/// fsm.update();
/// assert_eq!(fsm.state(), StateId::Blocking);
/// let actions = fsm.drain_actions();
/// assert!(!actions.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct FighterMachine {
    state: StateId,
    previous: StateId,
    ctx: FighterContext,
    events: VecDeque<FighterEvent>,
    /// Phase durations of the move in flight, taken from the request that
    /// started it and consumed by the windup→active and →recovery overrides.
    cached_timing: Option<MoveTiming>,
    /// Ticks spent in the current state, counting the tick it was entered on.
    ticks_in_state: u32,
    entered_this_tick: bool,
}

impl FighterMachine {
    /// Create a machine starting in IDLE with all timers at zero.
    pub fn new(fighter_id: FighterId, tuning: FighterTuning) -> Self {
        Self::start(fighter_id, tuning, StateId::Idle)
    }

    /// Create a machine from configuration. The initial state is looked up by
    /// name; an unknown name is a wiring bug and aborts construction.
    pub fn from_config(fighter_id: FighterId, config: &FighterConfig) -> Result<Self, FsmError> {
        let initial = StateId::from_name(&config.initial_state)?;
        let mut fsm = Self::start(fighter_id, config.tuning, initial);
        fsm.ctx.position_x = config.start_x;
        Ok(fsm)
    }

    fn start(fighter_id: FighterId, tuning: FighterTuning, initial: StateId) -> Self {
        let mut ctx = FighterContext::new(fighter_id, tuning);
        initial.enter(&mut ctx, None);
        // Entry markers of the initial state are not part of any tick.
        ctx.pending_actions.clear();
        Self {
            state: initial,
            previous: initial,
            ctx,
            events: VecDeque::new(),
            cached_timing: None,
            ticks_in_state: 0,
            entered_this_tick: false,
        }
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Queue an event for the next [`update`](Self::update). FIFO order is kept.
    pub fn push_event(&mut self, event: FighterEvent) {
        self.events.push_back(event);
    }

    /// Advance one simulation tick:
    ///
    /// 1. count the attack cooldown down,
    /// 2. drain queued events in arrival order, transitioning immediately on each,
    /// 3. run the now-current state's update and apply its transition, if any.
    pub fn update(&mut self) {
        self.entered_this_tick = false;
        self.ctx.attack_cooldown = self.ctx.attack_cooldown.saturating_sub(1);

        self.process_events();

        if let Some(next) = self.state.update(&mut self.ctx) {
            self.transition(next);
        }
        self.ticks_in_state += 1;
    }

    /// Drain the event queue without running the per-tick update. `update`
    /// calls this first; hosts call it directly to observe the immediate
    /// effect of an event.
    pub fn process_events(&mut self) {
        while let Some(event) = self.events.pop_front() {
            let Some(next) = self.state.handle_event(&mut self.ctx, &event) else {
                trace!(
                    fighter = %self.ctx.fighter_id,
                    state = %self.state,
                    event = event.name(),
                    "event caused no transition"
                );
                continue;
            };
            if matches!(next, StateId::AttackWindup | StateId::FinisherSetup) {
                if let Some(timing) = event.move_timing() {
                    self.cached_timing = Some(timing);
                }
            }
            self.transition(next);
        }
    }

    /// Take every action emitted since the last drain.
    pub fn drain_actions(&mut self) -> Vec<FighterAction> {
        std::mem::take(&mut self.ctx.pending_actions)
    }

    /// exit(old) → transition record → swap → timer override → enter(new).
    ///
    /// Re-entering the current state (stun-lock) runs the full sequence too.
    fn transition(&mut self, next: StateId) {
        let from = self.state;
        from.exit(&mut self.ctx);
        self.ctx.emit(FighterAction::Transition {
            fighter: self.ctx.fighter_id,
            from,
            to: next,
        });

        self.previous = from;
        self.state = next;

        if let Some(frames) = timer_override(from, next, self.cached_timing) {
            self.ctx.state_timer = frames;
        }
        next.enter(&mut self.ctx, self.cached_timing);
        if !next.is_attack_phase() {
            self.cached_timing = None;
        }

        self.ticks_in_state = 0;
        self.entered_this_tick = true;

        debug!(
            fighter = %self.ctx.fighter_id,
            from = %from,
            to = %next,
            timer = self.ctx.state_timer,
            "state transition"
        );
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    pub fn fighter_id(&self) -> FighterId {
        self.ctx.fighter_id
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn previous_state(&self) -> StateId {
        self.previous
    }

    pub fn state_timer(&self) -> u32 {
        self.ctx.state_timer
    }

    pub fn attack_cooldown(&self) -> u32 {
        self.ctx.attack_cooldown
    }

    pub fn position_x(&self) -> f32 {
        self.ctx.position_x
    }

    pub fn active_move_id(&self) -> Option<&MoveId> {
        self.ctx.active_move_id.as_ref()
    }

    /// True iff IDLE with the cooldown run out.
    pub fn can_attack(&self) -> bool {
        self.state == StateId::Idle && self.ctx.attack_cooldown == 0
    }

    /// True iff IDLE.
    pub fn accepts_input(&self) -> bool {
        self.state == StateId::Idle
    }

    /// Returns `true` if the last `update` (or `process_events`) changed state.
    pub fn just_entered(&self) -> bool {
        self.entered_this_tick
    }

    /// Mid-finisher: from FINISHER_SETUP until the recovery that follows it ends.
    pub fn is_finisher_active(&self) -> bool {
        self.ctx.finisher_active
    }

    pub fn ticks_in_state(&self) -> u32 {
        self.ticks_in_state
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn context(&self) -> &FighterContext {
        &self.ctx
    }

    // -----------------------------------------------------------------------
    // Cross-system sync
    // -----------------------------------------------------------------------

    pub fn set_comeback_active(&mut self, active: bool) {
        self.ctx.comeback_active = active;
    }

    /// Movement authority lives with the integrator; this only mirrors it.
    pub fn set_position_x(&mut self, x: f32) {
        self.ctx.position_x = x;
    }

    pub fn set_knockdown_count(&mut self, count: u32) {
        self.ctx.knockdown_count = count;
    }

    /// Arm a combo window of `frames` to open when the current recovery ends.
    /// Zero frames disarms it.
    pub fn set_combo_window(&mut self, frames: u32) {
        self.ctx.combo_window_pending = frames > 0;
        self.ctx.combo_window_frames = frames;
    }

    /// Record that the move in its active phase connected.
    pub fn mark_attack_connected(&mut self) {
        self.ctx.attack_connected = true;
    }
}

/// Phase timers that cross a transition boundary. Finishers reuse the same
/// phases: setup→impact takes the active frames, impact→recovery the recovery.
fn timer_override(from: StateId, to: StateId, timing: Option<MoveTiming>) -> Option<u32> {
    let timing = timing?;
    match (from, to) {
        (StateId::AttackWindup, StateId::AttackActive)
        | (StateId::FinisherSetup, StateId::FinisherImpact) => Some(timing.active_frames),
        (
            StateId::AttackWindup | StateId::AttackActive | StateId::FinisherImpact,
            StateId::AttackRecovery,
        ) => Some(timing.recovery_frames),
        _ => None,
    }
}
