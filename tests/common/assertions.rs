//! Event collection helpers

use quiz_report::{Event, Stage};
use tokio::sync::broadcast;

/// Everything observed on an event receiver so far
#[derive(Debug, Default)]
pub struct Observed {
    /// Stage transitions in arrival order
    pub stages: Vec<Stage>,
    /// Pages reported delivered
    pub delivered: Vec<usize>,
    /// Pages reported failed
    pub failed: Vec<usize>,
}

/// Drain every event currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Observed {
    let mut observed = Observed::default();
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::StageChanged { stage, .. } => observed.stages.push(stage),
            Event::UnitDelivered { page_number, .. } => observed.delivered.push(page_number),
            Event::UnitFailed { page_number, .. } => observed.failed.push(page_number),
        }
    }
    observed.delivered.sort_unstable();
    observed.failed.sort_unstable();
    observed
}

/// Assert the stages end with `terminal` and contain exactly one terminal stage
pub fn assert_terminal(observed: &Observed, terminal: Stage) {
    assert_eq!(observed.stages.first(), Some(&Stage::Fetching));
    assert_eq!(observed.stages.last(), Some(&terminal));
    assert_eq!(
        observed.stages.iter().filter(|s| s.is_terminal()).count(),
        1,
        "exactly one terminal stage expected, got {:?}",
        observed.stages
    );
}
