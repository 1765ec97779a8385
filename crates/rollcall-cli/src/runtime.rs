//! Live scheduler loop.
//!
//! One `interval` tick drives one controller cycle. Commands arrive on
//! stdin, events leave on stdout, both as newline-delimited lines.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use rollcall_controller::{Controller, Devices};
use rollcall_core::ReaderId;
use rollcall_hardware::devices::AnyReaderBus;
use rollcall_hardware::mock::MockBus;
use rollcall_hardware::{BusArbiter, CardPoller, GateActuator, Indicator, NoticeDisplay};
use rollcall_protocol::{CommandCodec, EventCodec};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::console::{ConsoleDisplay, ConsoleGate, ConsoleIndicator};

/// Run the controller on stdin/stdout until stopped by Ctrl-C.
///
/// # Errors
/// Fails on invalid configuration or if stdout is closed.
pub async fn run(config: Config) -> Result<()> {
    let timing = config.timing()?;
    let roster = config.roster()?;

    warn!("No reader driver compiled in, using the mock reader bus");
    let (bus, readers) = MockBus::new();
    for reader in ReaderId::ALL.into_iter().filter(|r| config.is_absent(*r)) {
        readers.fail_probe(reader);
    }

    let poller = BusArbiter::new(AnyReaderBus::Mock(bus), timing.settle);
    info!(available = poller.available_count(), "Readers probed");

    let devices = Devices {
        poller,
        gate: ConsoleGate::default(),
        indicator: ConsoleIndicator::default(),
        display: ConsoleDisplay,
    };
    let controller = Controller::new(devices, roster, timing).context("building controller")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    serve(controller, tokio::io::stdin(), tokio::io::stdout(), shutdown).await
}

/// Drive `controller` until `shutdown` completes.
///
/// Reaching the end of `input` stops command intake; the loop keeps
/// running.
///
/// # Errors
/// Fails if writing to `output` fails.
pub async fn serve<P, G, I, D, R, W, S>(
    mut controller: Controller<P, G, I, D>,
    input: R,
    output: W,
    shutdown: S,
) -> Result<()>
where
    P: CardPoller,
    G: GateActuator,
    I: Indicator,
    D: NoticeDisplay,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut commands = FramedRead::new(input, CommandCodec::new());
    let mut events = FramedWrite::new(output, EventCodec::new());
    let mut input_open = true;

    let mut ticker = tokio::time::interval(controller.timing().tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    controller.boot(Instant::now().into_std());
    flush_events(&mut controller, &mut events).await?;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            tick = ticker.tick() => {
                controller.tick(tick.into_std());
            }
            command = commands.next(), if input_open => match command {
                Some(Ok(command)) => {
                    debug!(command = %command, "Command received");
                    controller.handle_command(command, Instant::now().into_std());
                }
                Some(Err(e)) => warn!(error = %e, "Command input error"),
                None => {
                    info!("Command input closed");
                    input_open = false;
                }
            },
        }

        flush_events(&mut controller, &mut events).await?;
    }

    Ok(())
}

async fn flush_events<P, G, I, D, W>(
    controller: &mut Controller<P, G, I, D>,
    events: &mut FramedWrite<W, EventCodec>,
) -> Result<()>
where
    P: CardPoller,
    G: GateActuator,
    I: Indicator,
    D: NoticeDisplay,
    W: AsyncWrite + Unpin,
{
    let pending: Vec<_> = controller.drain_events().collect();
    if pending.is_empty() {
        return Ok(());
    }
    for event in pending {
        events.feed(event).await.context("writing event")?;
    }
    events.flush().await.context("flushing events")?;
    Ok(())
}
