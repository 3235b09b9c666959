use lambda_runtime::{service_fn, Error, LambdaEvent};
use relay_core::channel::{InboundEvent, OutboundMessage};
use relay_core::config::load_config;
use relay_core::relay::Relay;
use relay_core::telemetry::init_tracing;
use tracing::info;

/// The Lambda event is the device event; the response is the reply for the device.
pub async fn lambda_handler(
    relay: &Relay,
    event: LambdaEvent<InboundEvent>,
) -> Result<OutboundMessage, Error> {
    let request_id = event.context.request_id;
    let reply = relay.reply_for(&event.payload).await;
    info!(%request_id, "Relayed device event");
    Ok(reply)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = load_config(None).await?;
    let relay = Relay::new(&config)?;
    let relay = &relay;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<InboundEvent>| async move {
        lambda_handler(relay, event).await
    }))
    .await
}
