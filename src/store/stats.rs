// src/store/stats.rs - Per-channel statistics derived from run results
//
// Never persisted: always recomputed from `results` when a run is listed.

use serde::{Deserialize, Serialize};

use crate::core::types::{ManualStatus, RunResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    /// Results carrying this channel (including skipped, for manual).
    pub validated: usize,
    pub success: usize,
    pub failed: usize,
    /// Manual channel only; always 0 for the judge.
    pub skipped: usize,
    /// validated / total, in percent.
    pub progress: f64,
    /// success / decided, in percent. Skipped entries are not decided.
    pub success_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total: usize,
    pub manual: ChannelStats,
    #[serde(rename = "openai")]
    pub judge: ChannelStats,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl ChannelStats {
    fn finish(mut self, total: usize) -> Self {
        self.progress = percent(self.validated, total);
        self.success_rate = percent(self.success, self.validated - self.skipped);
        self
    }

    /// Results that received a pass/fail decision.
    pub fn decided(&self) -> usize {
        self.success + self.failed
    }
}

pub fn compute(results: &[RunResult]) -> RunStats {
    let total = results.len();
    let mut manual = ChannelStats::default();
    let mut judge = ChannelStats::default();

    for r in results {
        if let Some(m) = &r.validations.manual {
            manual.validated += 1;
            match m.status {
                ManualStatus::Success => manual.success += 1,
                ManualStatus::Failure => manual.failed += 1,
                ManualStatus::Skipped => manual.skipped += 1,
            }
        }
        if let Some(j) = &r.validations.judge {
            judge.validated += 1;
            if j.status {
                judge.success += 1;
            } else {
                judge.failed += 1;
            }
        }
    }

    RunStats {
        total,
        manual: manual.finish(total),
        judge: judge.finish(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{JudgeValidation, ManualValidation};
    use chrono::Utc;

    fn result(manual: Option<ManualStatus>, judge: Option<bool>) -> RunResult {
        let mut r = RunResult::new("c".into(), "r".into());
        r.validations.manual = manual.map(|status| ManualValidation {
            status,
            timestamp: Utc::now(),
        });
        r.validations.judge = judge.map(|status| JudgeValidation {
            status,
            reason: "x".into(),
            model: "m".into(),
            response: None,
            timestamp: Utc::now(),
        });
        r
    }

    #[test]
    fn test_empty_run() {
        let s = compute(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.manual, ChannelStats::default());
        assert_eq!(s.judge.progress, 0.0);
    }

    #[test]
    fn test_manual_rate_excludes_skipped() {
        let results = vec![
            result(Some(ManualStatus::Success), None),
            result(Some(ManualStatus::Skipped), None),
            result(Some(ManualStatus::Failure), None),
            result(Some(ManualStatus::Success), None),
            result(None, None),
        ];
        let s = compute(&results);
        assert_eq!(s.manual.validated, 4);
        assert_eq!(s.manual.success, 2);
        assert_eq!(s.manual.failed, 1);
        assert_eq!(s.manual.skipped, 1);
        assert_eq!(s.manual.decided(), 3);
        assert!((s.manual.progress - 80.0).abs() < 1e-9);
        assert!((s.manual.success_rate - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_skipped_has_zero_rate() {
        let s = compute(&[result(Some(ManualStatus::Skipped), None)]);
        assert_eq!(s.manual.success_rate, 0.0);
        assert_eq!(s.manual.progress, 100.0);
    }

    #[test]
    fn test_judge_rate_over_all_validated() {
        let results = vec![
            result(None, Some(true)),
            result(Some(ManualStatus::Failure), Some(false)),
            result(None, Some(true)),
            result(None, None),
        ];
        let s = compute(&results);
        assert_eq!(s.judge.validated, 3);
        assert_eq!(s.judge.success, 2);
        assert_eq!(s.judge.failed, 1);
        assert_eq!(s.judge.skipped, 0);
        assert!((s.judge.progress - 75.0).abs() < 1e-9);
        assert!((s.judge.success_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.manual.validated, 1);
    }

    #[test]
    fn test_serialized_channel_keys() {
        let v = serde_json::to_value(compute(&[result(None, Some(true))])).unwrap();
        assert_eq!(v["openai"]["successRate"], 100.0);
        assert_eq!(v["manual"]["validated"], 0);
        assert_eq!(v["total"], 1);
    }
}
