//! Points earned across runs in one sitting.
//!
//! Fed from the score callback: a non-zero score updates the current run, a
//! drop back to zero closes it. Storing the totals anywhere durable is left to
//! whatever service owns player records.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: u32,
    runs: u32,
    points: u64,
    best: u32,
}

impl Session {
    /// Applies one score-change notification.
    pub fn on_score(&mut self, score: u32) {
        if score == 0 {
            self.close_run();
        } else {
            self.current = score;
        }
    }

    /// Records the current run if it scored anything. Called on reset and
    /// once more at exit for a run that never got reset.
    pub fn close_run(&mut self) {
        if self.current == 0 {
            return;
        }
        self.runs += 1;
        self.points += u64::from(self.current);
        self.best = self.best.max(self.current);
        log::info!(
            "run {} closed: {} points ({} total)",
            self.runs,
            self.current,
            self.points
        );
        self.current = 0;
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Runs that scored at least one point.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn best(&self) -> u32 {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_closes_run() {
        let mut s = Session::default();
        for score in 1..=4 {
            s.on_score(score);
        }
        assert_eq!(s.current(), 4);
        s.on_score(0);
        assert_eq!((s.runs(), s.points(), s.best(), s.current()), (1, 4, 4, 0));

        s.on_score(1);
        s.on_score(2);
        s.on_score(0);
        assert_eq!((s.runs(), s.points(), s.best()), (2, 6, 4));
    }

    #[test]
    fn test_close_without_points_is_ignored() {
        let mut s = Session::default();
        s.close_run();
        s.on_score(0);
        assert_eq!(s, Session::default());
    }

    #[test]
    fn test_close_at_exit_is_idempotent() {
        let mut s = Session::default();
        s.on_score(3);
        s.close_run();
        s.close_run();
        assert_eq!((s.runs(), s.points()), (1, 3));
    }
}
