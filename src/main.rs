mod adda_board;
mod calibration;
mod common;
mod compiler;
mod config;
mod device;
mod engine;
mod formatter;
mod parser;
mod session;

use anyhow::bail;
use log::{error, warn, LevelFilter};
use syslog::Facility;

extern crate serde;
#[macro_use]
extern crate clap;

use crate::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = clap_app!(HvacAddaServer =>
        (version: crate_version!())
        (@arg CONFIG: -c --config +takes_value "Sets a custom config file")
        (@arg PORT: "Listening port (default 60606)"))
    .get_matches();

    let config = match matches.value_of("CONFIG") {
        Some(path) => Config::read_from_file(path, true)?,
        None => Config::read_from_file(DEFAULT_CONFIG_PATH, false)?,
    };
    let port = if matches.is_present("PORT") {
        value_t!(matches, "PORT", u16).unwrap_or_else(|e| e.exit())
    } else {
        config.port
    };

    init_logging(config.log_level);

    if config.settle_delay > config.max_delay {
        bail!(
            "settle_delay {:?} exceeds max_delay {:?}",
            config.settle_delay,
            config.max_delay
        );
    }

    if let Err(e) = serve(&config, port).await {
        error!("Fatal Error: {:?}", e);
        return Err(e);
    }
    Ok(())
}

fn init_logging(level: LevelFilter) {
    if let Err(e) = syslog::init(Facility::LOG_USER, level, None) {
        env_logger::Builder::new().filter_level(level).init();
        warn!("syslog unavailable ({:?}), logging to stderr", e);
    }
}

#[cfg(feature = "linux")]
async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    use crate::adda_board::{AddaBoard, GpioIndicator};
    use crate::compiler::Compiler;
    use crate::engine::Engine;
    use crate::session::Server;
    use anyhow::Context;
    use log::info;
    use linux_embedded_hal::sysfs_gpio::Direction;
    use linux_embedded_hal::{I2cdev, SysfsPin};
    use tokio::net::TcpListener;

    let output_pin = |number: u64| -> anyhow::Result<SysfsPin> {
        let pin = SysfsPin::new(number);
        pin.export()
            .with_context(|| format!("export gpio {}", number))?;
        pin.set_direction(Direction::Out)
            .with_context(|| format!("gpio {} as output", number))?;
        Ok(pin)
    };

    let bus = I2cdev::new(&config.i2c_bus)
        .with_context(|| format!("open i2c bus {}", config.i2c_bus))?;
    let board = AddaBoard::new(bus, config.adc_address, config.dac_address)
        .with_context(|| "adda board initialization failed")?;
    let ready_led = GpioIndicator::new("ready", output_pin(config.ready_led_pin)?);
    let client_led = GpioIndicator::new("client", output_pin(config.client_led_pin)?);

    let mut listener = TcpListener::bind((config.bind_address.as_str(), port))
        .await
        .with_context(|| format!("bind {}:{}", config.bind_address, port))?;
    info!("server successfully started on port {}", port);

    let mut server = Server::new(
        board,
        ready_led,
        client_led,
        Compiler::new(config.settle_delay),
        Engine::new(config.max_delay),
    );
    server.run(&mut listener).await
}

#[cfg(not(feature = "linux"))]
async fn serve(_config: &Config, _port: u16) -> anyhow::Result<()> {
    bail!("built without the `linux` feature, no ADDA board to drive")
}
