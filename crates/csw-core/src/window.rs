use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Time window of one time-domain run, in seconds.
///
/// `t_start` is usually negative: the engine settles to the pre-event
/// operating point before the fault onset at t = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationWindow {
    pub t_start: f64,
    pub t_step: f64,
    pub t_stop: f64,
}

impl SimulationWindow {
    pub fn validate(&self) -> Result<()> {
        if !(self.t_step > 0.0) {
            return Err(anyhow!("simulation step must be positive, got {}", self.t_step));
        }
        if self.t_stop <= self.t_start {
            return Err(anyhow!(
                "simulation stop time {} must be after start time {}",
                self.t_stop,
                self.t_start
            ));
        }
        Ok(())
    }
}
