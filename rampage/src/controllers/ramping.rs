use crate::controllers::Controller;
use rampage_core::Stage;
use std::time::Duration;

/// Moves the VU count linearly from one stage target to the next.
///
/// Within a stage the count is `from + (to - from) * t / d`, truncated toward zero, where `from`
/// is the previous target (or the starting VUs) and `t` is the time spent in the stage. A stage
/// of zero length jumps straight to its target. Once every stage is over the last target holds.
pub(crate) struct RampingController {
    start_vus: usize,
    stages: Vec<Stage>,
}

impl RampingController {
    pub fn new(start_vus: usize, stages: Vec<Stage>) -> Self {
        Self { start_vus, stages }
    }
}

impl Controller for RampingController {
    fn initial_vus(&self) -> usize {
        self.target_vus(Duration::ZERO)
    }

    fn target_vus(&self, elapsed: Duration) -> usize {
        let mut from = self.start_vus;
        let mut stage_start = Duration::ZERO;

        for stage in &self.stages {
            let stage_end = stage_start + stage.duration;
            if elapsed < stage_end {
                let into = (elapsed - stage_start).as_nanos() as i128;
                let len = stage.duration.as_nanos() as i128;
                let delta = stage.target as i128 - from as i128;
                return (from as i128 + delta * into / len) as usize;
            }

            from = stage.target;
            stage_start = stage_end;
        }

        from
    }

    fn duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}
