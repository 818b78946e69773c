mod constant;
mod ramping;

pub(crate) use constant::ConstantController;
pub(crate) use ramping::RampingController;

use rampage_core::{Executor, ScenarioConfig};
use std::time::Duration;

/// Decides how many VUs should be running at a point of the scenario.
pub(crate) trait Controller: Send {
    fn initial_vus(&self) -> usize;
    fn target_vus(&self, elapsed: Duration) -> usize;
    fn duration(&self) -> Duration;
}

pub(crate) fn from_config(config: &ScenarioConfig) -> Box<dyn Controller> {
    match &config.executor {
        Executor::RampingVus { start_vus, stages } => {
            Box::new(RampingController::new(*start_vus, stages.clone()))
        }
        Executor::ConstantVus { vus, duration } => {
            Box::new(ConstantController::new(*vus, *duration))
        }
    }
}
