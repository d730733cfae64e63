use chrono::{DateTime, Duration, Local};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AlarmPhase {
    Idle,
    Armed,
    Ringing,
}

#[derive(Debug, Clone)]
struct PendingRing {
    due: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TickOutcome {
    pub fired: usize,
}

#[derive(Debug, Default)]
pub struct AlarmLifecycle {
    armed: bool,
    ringing: bool,
    armed_time: Option<DateTime<Local>>,
    pending: Vec<PendingRing>,
}

impl AlarmLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm_at(&mut self, target: DateTime<Local>, now: DateTime<Local>) {
        self.armed = true;
        self.armed_time = Some(target);
        // A target at or before `now` never fires; the armed flag stays set.
        if target > now {
            self.pending.push(PendingRing { due: target });
        }
    }

    pub fn arm_after(&mut self, delay: Duration, selected: DateTime<Local>, now: DateTime<Local>) {
        self.armed = true;
        // The selected time is what the stop log records; the delay alone
        // decides when the ring fires.
        self.armed_time = Some(selected);
        self.pending.push(PendingRing { due: now + delay });
    }

    pub fn tick(&mut self, now: DateTime<Local>) -> TickOutcome {
        let before = self.pending.len();
        self.pending.retain(|ring| ring.due > now);
        let fired = before - self.pending.len();
        if fired > 0 {
            self.ringing = true;
        }
        TickOutcome { fired }
    }

    pub fn stop(&mut self) {
        self.ringing = false;
    }

    pub fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.armed = false;
        self.armed_time = None;
        cancelled
    }

    pub fn phase(&self) -> AlarmPhase {
        if self.ringing {
            AlarmPhase::Ringing
        } else if self.armed {
            AlarmPhase::Armed
        } else {
            AlarmPhase::Idle
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_ringing(&self) -> bool {
        self.ringing
    }

    pub fn armed_time(&self) -> Option<DateTime<Local>> {
        self.armed_time
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_arm_fires_exactly_once_at_target() {
        let now = Local::now();
        let target = now + Duration::seconds(5);
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(target, now);
        assert_eq!(lifecycle.phase(), AlarmPhase::Armed);
        assert_eq!(lifecycle.pending_count(), 1);

        let early = lifecycle.tick(now + Duration::seconds(4));
        assert_eq!(early.fired, 0);
        assert!(!lifecycle.is_ringing());

        let at_target = lifecycle.tick(target);
        assert_eq!(at_target.fired, 1);
        assert_eq!(lifecycle.phase(), AlarmPhase::Ringing);

        let after = lifecycle.tick(target + Duration::seconds(10));
        assert_eq!(after.fired, 0);
        assert!(lifecycle.is_ringing());
    }

    #[test]
    fn past_or_present_target_arms_but_never_fires() {
        let now = Local::now();
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(now - Duration::seconds(2), now);
        lifecycle.arm_at(now, now);

        assert!(lifecycle.is_armed());
        assert_eq!(lifecycle.pending_count(), 0);

        let outcome = lifecycle.tick(now + Duration::days(1));
        assert_eq!(outcome.fired, 0);
        assert_eq!(lifecycle.phase(), AlarmPhase::Armed);
    }

    #[test]
    fn fixed_delay_arm_ignores_the_selected_time() {
        let now = Local::now();
        let selected = now + Duration::hours(1);
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_after(Duration::seconds(3), selected, now);

        assert_eq!(lifecycle.armed_time(), Some(selected));
        assert_eq!(lifecycle.tick(now + Duration::milliseconds(2_900)).fired, 0);
        assert_eq!(lifecycle.tick(now + Duration::milliseconds(3_000)).fired, 1);
        assert!(lifecycle.is_ringing());
    }

    #[test]
    fn double_arm_keeps_both_timers_pending() {
        let now = Local::now();
        let first = now + Duration::seconds(2);
        let second = now + Duration::seconds(6);
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(first, now);
        lifecycle.arm_at(second, now);
        assert_eq!(lifecycle.pending_count(), 2);

        assert_eq!(lifecycle.tick(first).fired, 1);
        assert_eq!(lifecycle.pending_count(), 1);

        assert_eq!(lifecycle.tick(second).fired, 1);
        assert_eq!(lifecycle.pending_count(), 0);
    }

    #[test]
    fn both_timers_fire_together_when_overdue() {
        let now = Local::now();
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(now + Duration::seconds(1), now);
        lifecycle.arm_at(now + Duration::seconds(2), now);

        let outcome = lifecycle.tick(now + Duration::seconds(3));
        assert_eq!(outcome.fired, 2);
        assert!(lifecycle.is_ringing());
    }

    #[test]
    fn stop_clears_ringing_but_keeps_the_armed_flag() {
        let now = Local::now();
        let target = now + Duration::seconds(1);
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(target, now);
        lifecycle.tick(target);
        assert!(lifecycle.is_ringing());

        lifecycle.stop();
        assert!(!lifecycle.is_ringing());
        assert!(lifecycle.is_armed());
        assert_eq!(lifecycle.armed_time(), Some(target));
        assert_eq!(lifecycle.phase(), AlarmPhase::Armed);
    }

    #[test]
    fn late_timer_retriggers_while_already_ringing() {
        let now = Local::now();
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(now + Duration::seconds(1), now);
        lifecycle.arm_at(now + Duration::seconds(5), now);

        assert_eq!(lifecycle.tick(now + Duration::seconds(1)).fired, 1);
        assert!(lifecycle.is_ringing());

        let retrigger = lifecycle.tick(now + Duration::seconds(5));
        assert_eq!(retrigger.fired, 1);
        assert!(lifecycle.is_ringing());
    }

    #[test]
    fn cancel_pending_clears_timers_and_armed_state() {
        let now = Local::now();
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(now + Duration::seconds(5), now);
        lifecycle.arm_at(now + Duration::seconds(9), now);

        assert_eq!(lifecycle.cancel_pending(), 2);
        assert_eq!(lifecycle.pending_count(), 0);
        assert!(!lifecycle.is_armed());
        assert_eq!(lifecycle.armed_time(), None);
        assert_eq!(lifecycle.phase(), AlarmPhase::Idle);

        let outcome = lifecycle.tick(now + Duration::days(1));
        assert_eq!(outcome.fired, 0);
    }

    #[test]
    fn rearming_does_not_cancel_the_earlier_timer() {
        let now = Local::now();
        let early = now + Duration::seconds(2);
        let mut lifecycle = AlarmLifecycle::new();
        lifecycle.arm_at(early, now);
        lifecycle.arm_after(Duration::seconds(30), now, now);

        assert_eq!(lifecycle.pending_count(), 2);
        assert_eq!(lifecycle.tick(early).fired, 1);
    }
}
