//! Periodic refresh loop.
//!
//! [`run_refresh_loop`] runs one [`RefreshController::refresh`] per timer
//! tick and one extra cycle whenever the control parameters change. Cycles
//! never overlap: the next trigger is only awaited once the previous cycle
//! has finished and its outcome was handed to the callback.

use std::time::Duration;

use octoscope_types::PositionIndex;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::controller::{RefreshController, RefreshOutcome};
use crate::controls::ControlParams;
use crate::store::StoreConnector;

/// Shortest accepted refresh period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Callback invoked after every refresh cycle.
///
/// Implementations publish the outcome to whatever displays it.
pub trait RefreshCallback: Send {
    /// Called once per completed cycle, published or not.
    fn on_refresh(&mut self, outcome: &RefreshOutcome);
}

/// A callback that ignores every outcome.
pub struct NoOpCallback;

impl RefreshCallback for NoOpCallback {
    fn on_refresh(&mut self, _outcome: &RefreshOutcome) {}
}

/// Externally supplied inputs of the refresh loop.
pub struct RefreshInputs {
    /// Current control parameters. Dropping the sender stops the loop.
    pub controls: watch::Receiver<ControlParams>,
    /// Node positions reported by the rendering shell.
    pub positions: watch::Receiver<PositionIndex>,
}

/// Run refresh cycles until the control channel closes.
///
/// Returns the number of cycles run.
pub async fn run_refresh_loop<C: StoreConnector>(
    controller: &mut RefreshController<C>,
    mut inputs: RefreshInputs,
    callback: &mut dyn RefreshCallback,
    period: Duration,
) -> u64 {
    let period = period.max(MIN_PERIOD);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles: u64 = 0;

    info!(
        period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        node = controller.node(),
        default_node = controller.default_node(),
        "Refresh loop starting"
    );

    loop {
        tokio::select! {
            biased;
            _ = ticker.tick() => {}
            changed = inputs.controls.changed() => {
                if changed.is_err() {
                    info!(cycles, "Control channel closed, stopping refresh loop");
                    return cycles;
                }
                debug!("controls changed, refreshing now");
            }
        }

        let params = inputs.controls.borrow_and_update().clone();
        let positions = inputs.positions.borrow().clone();
        let outcome = controller.refresh(&params, &positions).await;
        cycles = cycles.saturating_add(1);
        callback.on_refresh(&outcome);
    }
}
