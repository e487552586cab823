use tracing::{debug, instrument};

use crate::app_state::SharedAppState;

/// Periodic housekeeping, run until the stop flag is set.
pub async fn setup_scheduler(
    app_state: SharedAppState,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    let stop_flag = app_state.stop_flag.clone();
    let mut scheduler = clokwerk::AsyncScheduler::new();

    {
        // Forget flood-control histories that can no longer deny anything.
        let app_state = app_state.clone();
        scheduler
            .every(app_state.settings.scheduler.tracker_sweep.into())
            .run(move || {
                let app_state = app_state.clone();
                async move {
                    sweep_trackers(app_state);
                }
            });
    }

    let handle = tokio::spawn(async move {
        while !stop_flag.is_stopped() {
            scheduler.run_pending().await;
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }

        Ok(())
    });

    Ok(handle)
}

#[instrument(skip(app_state))]
fn sweep_trackers(app_state: SharedAppState) {
    let evicted = app_state.flood_control.sweep();
    debug!(
        "Tracker sweep evicted {} event(s), {} client(s) still tracked",
        evicted,
        app_state.flood_control.tracked_clients()
    );
}
