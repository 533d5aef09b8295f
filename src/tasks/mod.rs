//! Background scheduled tasks for the application.
//!
//! The only recurring job is the draw sweep: it periodically looks for
//! active giveaways whose draw time has passed and runs the draw for each.
//! Call `spawn_all` once during startup to launch it.

use crate::services::DrawService;

const SWEEP_INTERVAL_SECS: u64 = 60;

/// Spawn all background tasks.
///
/// Notes
/// - The sweep shares the draw entry point with the manual trigger; the
///   draw's own guards make duplicate invocations harmless.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(draw_service: DrawService) {
    // 每分钟扫描到期活动并开奖
    {
        let svc = draw_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.sweep_due_giveaways().await {
                    Ok(n) if n > 0 => log::info!("Draw sweep completed, {n} giveaways drawn"),
                    Ok(_) => {}
                    Err(e) => log::error!("Draw sweep failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS)).await;
            }
        });
    }
}
