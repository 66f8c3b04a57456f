use anyhow::Result;

use skywatch_core::Config;
use skywatch_relay::{AppState, MessageGateway};
use skywatch_weather::{ForecastClient, GeocodeClient};

#[tokio::main]
async fn main() -> Result<()> {
    skywatch_core::init()?;

    let (config, _validation) = Config::load_validated()?;

    let state = AppState {
        geocode: GeocodeClient::new()?,
        provider: ForecastClient::new()?,
        gateway: MessageGateway::new(&config.relay.gateway)?,
    };

    skywatch_relay::serve(config.relay.port, state).await
}
