//! Document verification and submission services.
//!
//! The verifier behind [`DocumentVerifier`] is a stand-in for a real
//! verification backend: it runs three independent document checks on a
//! fixed timetable and draws outcomes and scores at random. The trait is
//! the seam where a real backend would plug in without touching the
//! wizard logic.

use rand::Rng;
use rand::rngs::ThreadRng;
use std::time::{Duration, Instant};

/// One independent document check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    BusinessDocument,
    IdDocument,
    Selfie,
}

impl Lane {
    pub fn all() -> [Lane; 3] {
        [Lane::BusinessDocument, Lane::IdDocument, Lane::Selfie]
    }

    pub fn label(self) -> &'static str {
        match self {
            Lane::BusinessDocument => "Business Document",
            Lane::IdDocument => "ID Verification",
            Lane::Selfie => "Face Match (Selfie vs ID)",
        }
    }

    fn index(self) -> usize {
        match self {
            Lane::BusinessDocument => 0,
            Lane::IdDocument => 1,
            Lane::Selfie => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneStatus {
    Pending,
    Analyzing,
    Verified,
    Failed,
}

impl LaneStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LaneStatus::Verified | LaneStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            LaneStatus::Pending => "Waiting...",
            LaneStatus::Analyzing => "Analyzing...",
            LaneStatus::Verified => "Verified",
            LaneStatus::Failed => "Review Required",
        }
    }
}

/// Scores reported once every lane has resolved. The overall score is an
/// independent draw, not derived from the lane outcomes or the other two
/// scores; 80 and above reads as an automatic pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationReport {
    pub face_match_score: u8,
    pub document_quality_score: u8,
    pub overall_score: u8,
}

impl VerificationReport {
    pub fn auto_approved(&self) -> bool {
        self.overall_score >= 80
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationEvent {
    LaneAnalyzing(Lane),
    LaneResolved(Lane, LaneStatus),
    /// Fired exactly once, when the last lane resolves.
    Completed(VerificationReport),
}

/// Interface between the wizard and whatever verifies documents.
pub trait DocumentVerifier {
    /// Begins a run. Resets any previous lane state.
    fn start(&mut self, now: Instant);

    /// Applies every state transition due by `now` and returns the
    /// resulting events in order.
    fn poll(&mut self, now: Instant) -> Vec<VerificationEvent>;

    fn lane_status(&self, lane: Lane) -> LaneStatus;

    fn report(&self) -> Option<VerificationReport>;

    fn is_complete(&self) -> bool {
        self.report().is_some()
    }

    /// Fraction of the run elapsed, for progress display.
    fn progress(&self, now: Instant) -> f64 {
        let _ = now;
        if self.is_complete() { 1.0 } else { 0.0 }
    }
}

struct LaneTiming {
    lane: Lane,
    analyzing_at_ms: u64,
    resolved_at_ms: u64,
    verified_bias: f64,
}

/// Timetable and pass biases for the simulated run.
const LANE_TIMETABLE: [LaneTiming; 3] = [
    LaneTiming {
        lane: Lane::BusinessDocument,
        analyzing_at_ms: 500,
        resolved_at_ms: 2500,
        verified_bias: 0.80,
    },
    LaneTiming {
        lane: Lane::IdDocument,
        analyzing_at_ms: 3000,
        resolved_at_ms: 5000,
        verified_bias: 0.85,
    },
    LaneTiming {
        lane: Lane::Selfie,
        analyzing_at_ms: 5500,
        resolved_at_ms: 7500,
        verified_bias: 0.80,
    },
];

const RUN_DURATION_MS: u64 = 7500;

enum ScheduledAction {
    BeginAnalysis(Lane),
    Resolve(Lane, f64),
}

/// Timer-queue implementation of [`DocumentVerifier`]. The schedule is
/// built once at `start`; `poll` consumes entries as their deadlines pass.
/// Dropping the verifier discards the remaining schedule, so a run that is
/// navigated away from can never touch live state.
pub struct SimulatedVerifier {
    schedule: Vec<(Instant, ScheduledAction)>,
    statuses: [LaneStatus; 3],
    report: Option<VerificationReport>,
    started_at: Option<Instant>,
    rng: ThreadRng,
}

impl SimulatedVerifier {
    pub fn new() -> Self {
        Self {
            schedule: Vec::new(),
            statuses: [LaneStatus::Pending; 3],
            report: None,
            started_at: None,
            rng: rand::thread_rng(),
        }
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentVerifier for SimulatedVerifier {
    fn start(&mut self, now: Instant) {
        self.statuses = [LaneStatus::Pending; 3];
        self.report = None;
        self.started_at = Some(now);
        self.schedule.clear();
        for entry in &LANE_TIMETABLE {
            self.schedule.push((
                now + Duration::from_millis(entry.analyzing_at_ms),
                ScheduledAction::BeginAnalysis(entry.lane),
            ));
            self.schedule.push((
                now + Duration::from_millis(entry.resolved_at_ms),
                ScheduledAction::Resolve(entry.lane, entry.verified_bias),
            ));
        }
        self.schedule.sort_by_key(|(at, _)| *at);
    }

    fn poll(&mut self, now: Instant) -> Vec<VerificationEvent> {
        let mut events = Vec::new();
        while self.schedule.first().is_some_and(|(at, _)| *at <= now) {
            let (_, action) = self.schedule.remove(0);
            match action {
                ScheduledAction::BeginAnalysis(lane) => {
                    self.statuses[lane.index()] = LaneStatus::Analyzing;
                    events.push(VerificationEvent::LaneAnalyzing(lane));
                }
                ScheduledAction::Resolve(lane, bias) => {
                    let status = if self.rng.gen_bool(bias) {
                        LaneStatus::Verified
                    } else {
                        LaneStatus::Failed
                    };
                    self.statuses[lane.index()] = status;
                    events.push(VerificationEvent::LaneResolved(lane, status));
                }
            }
        }

        let all_terminal = self.statuses.iter().all(|s| s.is_terminal());
        if all_terminal && self.report.is_none() {
            let report = VerificationReport {
                face_match_score: self.rng.gen_range(80..100),
                document_quality_score: self.rng.gen_range(85..100),
                overall_score: self.rng.gen_range(1..=100),
            };
            self.report = Some(report);
            events.push(VerificationEvent::Completed(report));
        }

        events
    }

    fn lane_status(&self, lane: Lane) -> LaneStatus {
        self.statuses[lane.index()]
    }

    fn report(&self) -> Option<VerificationReport> {
        self.report
    }

    fn progress(&self, now: Instant) -> f64 {
        if self.report.is_some() {
            return 1.0;
        }
        match self.started_at {
            Some(started) => {
                let elapsed = now.saturating_duration_since(started).as_millis() as f64;
                (elapsed / RUN_DURATION_MS as f64).min(1.0)
            }
            None => 0.0,
        }
    }
}

/// Application identifier: fixed prefix plus the trailing eight digits of
/// the Unix-millisecond timestamp. Temporally distinct, not globally
/// unique.
pub fn generate_application_number(timestamp_millis: i64) -> String {
    let digits = timestamp_millis.unsigned_abs().to_string();
    let start = digits.len().saturating_sub(8);
    format!("BP-{}", &digits[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn test_lanes_start_pending() {
        let verifier = SimulatedVerifier::new();
        for lane in Lane::all() {
            assert_eq!(verifier.lane_status(lane), LaneStatus::Pending);
        }
        assert!(!verifier.is_complete());
        assert!(verifier.report().is_none());
    }

    #[test]
    fn test_poll_before_start_is_inert() {
        let mut verifier = SimulatedVerifier::new();
        assert!(verifier.poll(Instant::now()).is_empty());
        assert!(!verifier.is_complete());
    }

    #[test]
    fn test_staged_lane_progression() {
        let t0 = Instant::now();
        let mut verifier = SimulatedVerifier::new();
        verifier.start(t0);

        assert!(verifier.poll(at(t0, 100)).is_empty());

        let events = verifier.poll(at(t0, 600));
        assert_eq!(
            events,
            vec![VerificationEvent::LaneAnalyzing(Lane::BusinessDocument)]
        );
        assert_eq!(
            verifier.lane_status(Lane::BusinessDocument),
            LaneStatus::Analyzing
        );
        assert_eq!(verifier.lane_status(Lane::IdDocument), LaneStatus::Pending);

        verifier.poll(at(t0, 2600));
        assert!(verifier.lane_status(Lane::BusinessDocument).is_terminal());
        assert!(!verifier.is_complete());

        verifier.poll(at(t0, 5100));
        assert!(verifier.lane_status(Lane::IdDocument).is_terminal());
        assert_eq!(verifier.lane_status(Lane::Selfie), LaneStatus::Pending);
        assert!(!verifier.is_complete());
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let t0 = Instant::now();
        let mut verifier = SimulatedVerifier::new();
        verifier.start(t0);

        let events = verifier.poll(at(t0, 8000));
        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, VerificationEvent::Completed(_)))
            .collect();
        assert_eq!(completions.len(), 1);
        assert!(verifier.is_complete());
        for lane in Lane::all() {
            assert!(verifier.lane_status(lane).is_terminal());
        }

        // A later poll finds nothing left to do.
        assert!(verifier.poll(at(t0, 10000)).is_empty());
        assert!(verifier.is_complete());
    }

    #[test]
    fn test_report_scores_within_ranges() {
        let t0 = Instant::now();
        let mut verifier = SimulatedVerifier::new();
        verifier.start(t0);
        verifier.poll(at(t0, 8000));

        let report = verifier.report().unwrap();
        assert!((80..100).contains(&report.face_match_score));
        assert!((85..100).contains(&report.document_quality_score));
        assert!((1..=100).contains(&report.overall_score));
    }

    #[test]
    fn test_completion_regardless_of_lane_failures() {
        // Run many times so both verified and failed outcomes appear; the
        // run always completes with a report either way.
        let t0 = Instant::now();
        for _ in 0..50 {
            let mut verifier = SimulatedVerifier::new();
            verifier.start(t0);
            verifier.poll(at(t0, 8000));
            assert!(verifier.is_complete());
        }
    }

    #[test]
    fn test_restart_resets_lane_state() {
        let t0 = Instant::now();
        let mut verifier = SimulatedVerifier::new();
        verifier.start(t0);
        verifier.poll(at(t0, 8000));
        assert!(verifier.is_complete());

        let t1 = at(t0, 20000);
        verifier.start(t1);
        assert!(!verifier.is_complete());
        for lane in Lane::all() {
            assert_eq!(verifier.lane_status(lane), LaneStatus::Pending);
        }
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let t0 = Instant::now();
        let mut verifier = SimulatedVerifier::new();
        assert_eq!(verifier.progress(t0), 0.0);

        verifier.start(t0);
        let early = verifier.progress(at(t0, 1500));
        let late = verifier.progress(at(t0, 6000));
        assert!(early > 0.0 && early < late && late < 1.0);
        assert_eq!(verifier.progress(at(t0, 9000)), 1.0);
    }

    #[test]
    fn test_application_number_uses_trailing_digits() {
        assert_eq!(generate_application_number(1700000000123), "BP-00000123");
        assert_eq!(generate_application_number(99999999), "BP-99999999");
    }

    #[test]
    fn test_application_number_short_timestamp() {
        assert_eq!(generate_application_number(42), "BP-42");
    }

    #[test]
    fn test_auto_approval_threshold() {
        let mut report = VerificationReport {
            face_match_score: 90,
            document_quality_score: 90,
            overall_score: 80,
        };
        assert!(report.auto_approved());
        report.overall_score = 79;
        assert!(!report.auto_approved());
    }
}
