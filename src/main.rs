mod telemetry;

use remindd_infra::{run_migration, setup_context, WebhookDeliverySink};
use remindd_scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("remindd".into(), "info".into());
    init_subscriber(subscriber);

    run_migration().await.expect("To run database migrations");
    let context = setup_context().await;

    let webhook_url = context
        .config
        .delivery_webhook_url
        .clone()
        .unwrap_or_else(|| panic!("DELIVERY_WEBHOOK_URL env var to be present."));
    let sink = Arc::new(WebhookDeliverySink::new(
        webhook_url,
        Duration::from_secs(context.config.delivery_timeout_secs),
    ));

    let scheduler = Scheduler::new(context, sink);
    scheduler.start().await;
    info!("remindd scheduler is running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down, canceling pending timers");
    scheduler.stop();
    Ok(())
}
