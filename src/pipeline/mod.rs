use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage10_spectra;
pub mod stage11_summary;
pub mod stage12_output;
pub mod stage1_input;
pub mod stage2_normalize;
pub mod stage3_missingness;
pub mod stage4_mass_error;
pub mod stage5_intensity;
pub mod stage6_drift;
pub mod stage7_monotonicity;
pub mod stage8_replicates;
pub mod stage9_overlap;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

/// Every stage of a full quality-control run, in order.
pub fn full_run() -> Pipeline {
    Pipeline::new(vec![
        Box::new(stage0_scaffold::Stage0Scaffold::new()),
        Box::new(stage1_input::Stage1Input::new()),
        Box::new(stage2_normalize::Stage2Normalize::new()),
        Box::new(stage3_missingness::Stage3Missingness::new()),
        Box::new(stage4_mass_error::Stage4MassError::new()),
        Box::new(stage5_intensity::Stage5Intensity::new()),
        Box::new(stage6_drift::Stage6Drift::new()),
        Box::new(stage7_monotonicity::Stage7Monotonicity::new()),
        Box::new(stage8_replicates::Stage8Replicates::new()),
        Box::new(stage9_overlap::Stage9Overlap::new()),
        Box::new(stage10_spectra::Stage10Spectra::new()),
        Box::new(stage11_summary::Stage11Summary::new()),
        Box::new(stage12_output::Stage12Output::new()),
    ])
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
