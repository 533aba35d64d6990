//! wndbridge - window-procedure to application-thread event bridge
//!
//! Replays a scripted host session: a producer thread plays the windowing system and drives
//! the dispatcher, while the main thread consumes the queue in `wait` or `poll` mode.
//!
//! Usage: wndbridge [--config PATH] [--mode wait|poll] SCRIPT.json

mod config;
mod pump;
mod script;

use bridge_dispatch::{Bridge, EventKind};
use config::{BridgeConfig, ConsumerMode};
use log::{error, info};
use script::{Script, ScriptHost};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

struct Args {
    config: Option<PathBuf>,
    mode: Option<ConsumerMode>,
    script: PathBuf,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut config = None;
    let mut mode = None;
    let mut script = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().ok_or("--config needs a path")?)),
            "--mode" => mode = Some(args.next().ok_or("--mode needs a value")?.parse::<ConsumerMode>()?),
            _ if script.is_none() => script = Some(PathBuf::from(&arg)),
            other => return Err(format!("unexpected argument '{}'", other).into()),
        }
    }

    Ok(Args {
        config,
        mode,
        script: script.ok_or("usage: wndbridge [--config PATH] [--mode wait|poll] SCRIPT.json")?,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = BridgeConfig::load(args.config.as_deref(), args.mode)?;
    let script = Script::load(&args.script)?;

    info!("Starting wndbridge ({:?} mode)...", config.mode);

    let bridge = Arc::new(Bridge::init(
        ScriptHost::new(),
        bridge_kinds::default_registrar(),
        config.bridge_options()?,
    ));
    let consumer = bridge.consumer();

    // Host event loop
    let producer = {
        let bridge = bridge.clone();
        thread::spawn(move || {
            let _shutdown = bridge.shutdown_guard();
            script::replay(&bridge, &script)
        })
    };

    let report = match config.mode {
        ConsumerMode::Wait => pump::run_wait(&consumer, bridge.kinds()),
        ConsumerMode::Poll => pump::run_poll(&consumer, bridge.kinds(), config.poll_interval())?,
    };

    let dispatched = match producer.join() {
        Ok(dispatched) => dispatched,
        Err(_) => {
            error!("Host thread panicked");
            return Err("host thread panicked".into());
        }
    };

    let host = bridge.dispatcher().host();
    let stats = bridge.queue().stats();
    info!(
        "Dispatched {} host messages: {} re-posted, {} to default procedure",
        dispatched,
        host.posted().len(),
        host.default_calls()
    );
    for kind in EventKind::ALL {
        let count = report.count(kind);
        if count > 0 {
            info!("  {}: {}", kind, count);
        }
    }
    info!(
        "Consumed {} queued records ({} dropped on overflow)",
        report.delivered, stats.dropped
    );

    Ok(())
}
