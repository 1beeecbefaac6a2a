//! Active/dormant cycle scheduling for buy policies.
//!
//! A buy policy alternates between active windows (it issues requests)
//! and dormant windows (it issues none). Window lengths are drawn from
//! the policy's distributions against the context RNG. In cumulative-cap
//! mode there is no sampled active window; the policy stays active until
//! its per-cycle intake cap is reached and only the dormant length is
//! drawn.
//!
//! Timeline convention: an active window starting at `start` with length
//! `n` covers steps `start..start + n`; `next_active_end` is the first
//! step after it. `next_dormant_end` works the same way, with `-1`
//! meaning "no dormant window scheduled" (always active).

use crate::context::SimContext;
use crate::models::WindowKind;
use crate::rng::distributions::IntDistribution;

/// Window bookkeeping for one buy policy
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    agent_id: String,
    policy: String,
    active_dist: IntDistribution,
    dormant_dist: IntDistribution,
    use_cumulative_cap: bool,
    next_active_end: i64,
    next_dormant_end: i64,
}

impl CycleScheduler {
    /// Draw the initial windows and record them.
    ///
    /// A negative draw from the dormant distribution marks the policy as
    /// always active (the default `Fixed { value: -1 }` does this), as
    /// does cumulative-cap mode, where dormancy only starts once the cap
    /// is hit.
    pub fn init(
        ctx: &mut SimContext,
        agent_id: &str,
        policy: &str,
        active_dist: IntDistribution,
        dormant_dist: IntDistribution,
        use_cumulative_cap: bool,
    ) -> Self {
        let mut sched = Self {
            agent_id: agent_id.to_string(),
            policy: policy.to_string(),
            active_dist,
            dormant_dist,
            use_cumulative_cap,
            next_active_end: 0,
            next_dormant_end: -1,
        };
        sched.set_next_active_time(ctx);
        if sched.dormant_dist.sample(ctx.rng()) < 0 {
            sched.next_dormant_end = -1;
            log::info!(
                "policy {}:{} is always active",
                sched.agent_id,
                sched.policy
            );
        } else if sched.use_cumulative_cap {
            sched.next_dormant_end = -1;
        } else {
            sched.next_dormant_end = 0;
            sched.set_next_dormant_time(ctx);
        }
        sched
    }

    /// Whether requests are suppressed at `time`
    pub fn dormant(&self, time: i64) -> bool {
        self.next_dormant_end >= 0 && time >= self.next_active_end && time < self.next_dormant_end
    }

    /// Per-step window maintenance, called once per request round.
    /// When the current dormant window ends, reopen: cumulative-cap mode
    /// clears the window (active until the cap is hit again), normal mode
    /// draws the next active and dormant windows.
    pub fn step(&mut self, ctx: &mut SimContext) {
        if ctx.time() == self.next_dormant_end {
            if self.use_cumulative_cap {
                self.next_dormant_end = -1;
            } else {
                self.set_next_active_time(ctx);
                self.set_next_dormant_time(ctx);
            }
            log::debug!(
                "policy {}:{} active window ends at {}, dormant window ends at {}",
                self.agent_id,
                self.policy,
                self.next_active_end,
                self.next_dormant_end
            );
        }
    }

    /// Start the post-cap dormant window at the next step
    pub fn begin_dormancy_after_cap(&mut self, ctx: &mut SimContext) {
        self.set_next_dormant_time(ctx);
    }

    pub fn next_active_end(&self) -> i64 {
        self.next_active_end
    }

    pub fn next_dormant_end(&self) -> i64 {
        self.next_dormant_end
    }

    fn set_next_active_time(&mut self, ctx: &mut SimContext) {
        let time = ctx.time();
        let length = self.active_dist.sample(ctx.rng());
        self.next_active_end = time + length;
        let kind = if self.use_cumulative_cap {
            WindowKind::CumulativeCap
        } else {
            WindowKind::Active
        };
        ctx.record_cycle_window(time, &self.agent_id, &self.policy, kind, length);
    }

    fn set_next_dormant_time(&mut self, ctx: &mut SimContext) {
        let start;
        let length;
        if self.use_cumulative_cap {
            length = self.dormant_dist.sample(ctx.rng());
            start = ctx.time() + 1;
        } else if self.next_dormant_end >= 0 {
            length = self.dormant_dist.sample(ctx.rng());
            // dormancy cannot begin before step 1
            start = self.next_active_end.max(1);
        } else {
            return;
        }
        self.next_dormant_end = start + length;
        ctx.record_cycle_window(start, &self.agent_id, &self.policy, WindowKind::Dormant, length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::models::WindowKind;

    fn scheduler(ctx: &mut SimContext, active: i64, dormant: i64) -> CycleScheduler {
        CycleScheduler::init(
            ctx,
            "agent-1",
            "buy",
            IntDistribution::fixed(active),
            IntDistribution::fixed(dormant),
            false,
        )
    }

    #[test]
    fn test_always_active_by_default() {
        let mut ctx = SimContext::new(1);
        let sched = scheduler(&mut ctx, 1, -1);
        assert_eq!(sched.next_dormant_end(), -1);
        for t in 0..20 {
            assert!(!sched.dormant(t));
        }
    }

    #[test]
    fn test_fixed_active_dormant_alternation() {
        let mut ctx = SimContext::new(1);
        let mut sched = scheduler(&mut ctx, 2, 3);
        // active covers steps 0..2, dormant covers 2..5
        assert_eq!(sched.next_active_end(), 2);
        assert_eq!(sched.next_dormant_end(), 5);

        let mut dormant_steps = Vec::new();
        for t in 0..10 {
            if sched.dormant(t) {
                dormant_steps.push(t);
            }
            sched.step(&mut ctx);
            ctx.advance_time();
        }
        assert_eq!(dormant_steps, vec![2, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn test_dormant_start_floored_at_one() {
        let mut ctx = SimContext::new(1);
        // zero-length active window: dormancy still starts at step 1,
        // so its end lands at 1 + 3 rather than 0 + 3
        let sched = scheduler(&mut ctx, 0, 3);
        assert_eq!(sched.next_dormant_end(), 4);
    }

    #[test]
    fn test_cumulative_cap_mode_windows() {
        let mut ctx = SimContext::new(1);
        let mut sched = CycleScheduler::init(
            &mut ctx,
            "agent-1",
            "buy",
            IntDistribution::fixed(1),
            IntDistribution::fixed(2),
            true,
        );
        // active until the cap is hit
        assert_eq!(sched.next_dormant_end(), -1);

        // cap reached at time 4: dormant covers 5..7
        for _ in 0..4 {
            ctx.advance_time();
        }
        sched.begin_dormancy_after_cap(&mut ctx);
        assert_eq!(sched.next_dormant_end(), 7);
        assert!(sched.dormant(5));
        assert!(sched.dormant(6));

        // window expiry flips back to always-active
        for _ in 4..7 {
            ctx.advance_time();
        }
        sched.step(&mut ctx);
        assert_eq!(sched.next_dormant_end(), -1);
        assert!(!sched.dormant(7));
    }

    #[test]
    fn test_windows_recorded() {
        let mut ctx = SimContext::new(1);
        let _sched = scheduler(&mut ctx, 2, 3);
        let active = ctx.events().windows_of_kind(WindowKind::Active);
        let dormant = ctx.events().windows_of_kind(WindowKind::Dormant);
        assert_eq!(active.len(), 1);
        assert_eq!(dormant.len(), 1);
    }
}
