//! `threatwatch console`: the single-threaded operator loop.
//!
//! One task owns the store, the render engine, and the command session.
//! Stream events, stdin lines, animation frames, and dispatch results are
//! all multiplexed into it with `select!`, so nothing here needs a lock.
//! Destination commands run on spawned tasks and report back over a channel.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use threatwatch_console::{
    CommandLog, CommandSession, DestinationIntent, EntityStore, HealthSummary, alert_line,
    rank_by_risk, unit_line,
};
use threatwatch_core::StreamEvent;
use threatwatch_link::{CommandGateway, LinkConfig, LinkError, StreamClient, Subscription};
use threatwatch_render::{GeoRenderEngine, MapEvent, RenderConfig};

use crate::operator::{HELP, OperatorCommand, parse_command};

/// About 60 frames per second while any marker is moving.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ─── Console state ────────────────────────────────────────────────

/// What the loop must do after an operator command.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Continue,
    Dispatch(DestinationIntent),
    Reconfigure {
        stream_url: String,
        api_url: Option<String>,
    },
    Quit,
}

/// Result of one spawned destination command.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub unit_id: String,
    pub result: Result<(), LinkError>,
}

/// Everything the loop owns apart from the network handles. Output lines
/// are buffered and drained by the loop.
pub struct Console {
    store: EntityStore,
    engine: GeoRenderEngine,
    session: CommandSession,
    log: CommandLog,
    output: Vec<String>,
}

impl Console {
    pub fn new(render: RenderConfig) -> Self {
        Self {
            store: EntityStore::new(),
            engine: GeoRenderEngine::new(render),
            session: CommandSession::new(),
            log: CommandLog::new(),
            output: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn engine(&self) -> &GeoRenderEngine {
        &self.engine
    }

    #[cfg(test)]
    pub fn session(&self) -> &CommandSession {
        &self.session
    }

    #[cfg(test)]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    pub fn on_stream_event(&mut self, event: StreamEvent, now_ms: u64) {
        let change = self.store.apply(event);

        if change.connectivity {
            if self.store.is_connected() {
                self.say("UPLINK ACTIVE");
            } else {
                self.say("NO UPLINK (showing last known picture)");
            }
        }

        if change.units {
            let units = self.store.units();
            let report = self.engine.sync(&units, now_ms);
            if !report.created.is_empty() || !report.removed.is_empty() {
                self.say(format!(
                    "units: {} tracked (+{} -{})",
                    units.len(),
                    report.created.len(),
                    report.removed.len()
                ));
            }
            if report.fitted {
                if let Some(bounds) = self.engine.viewport().bounds() {
                    self.say(format!(
                        "view fitted: {:.4},{:.4} .. {:.4},{:.4}",
                        bounds.south, bounds.west, bounds.north, bounds.east
                    ));
                }
            }
        }

        if change.alerts {
            let alerts = self.store.alerts();
            if let Some(top) = alerts.iter().max_by_key(|a| a.severity) {
                let line = format!("alerts: {} active, top: {}", alerts.len(), alert_line(top));
                self.say(line);
            }
        }
    }

    pub fn on_command(&mut self, command: OperatorCommand, at: DateTime<Utc>) -> Action {
        match command {
            OperatorCommand::Select(unit_id) => {
                match self.engine.select_unit(&unit_id) {
                    Some(event) => {
                        self.session.handle(event);
                        self.say(format!("{unit_id} armed: pick <lat> <lon> or cancel"));
                    }
                    None => self.say(format!("unknown unit {unit_id}")),
                }
                Action::Continue
            }
            OperatorCommand::Pick(position) => {
                let event = self.engine.pick_point(position);
                let Some(intent) = self.session.handle(event) else {
                    self.say("no unit armed (select <unit-id> first)");
                    return Action::Continue;
                };
                let origin = self.store.unit(&intent.unit_id).map(|u| u.position);
                self.engine.clear_destination();
                self.engine.show_destination(&intent.unit_id, origin, intent.destination);
                let line = self.log.record_assign(at, &intent).to_string();
                self.say(line);
                Action::Dispatch(intent)
            }
            OperatorCommand::Cancel => {
                let armed = self.session.armed_unit().map(str::to_string);
                self.session.handle(MapEvent::Cancel);
                match armed {
                    Some(unit_id) => self.say(format!("{unit_id} disarmed")),
                    None => self.say("nothing armed"),
                }
                Action::Continue
            }
            OperatorCommand::Status => {
                self.say(HealthSummary::from_store(&self.store).to_string());
                let units = self.store.units();
                for unit in units.iter() {
                    self.say(unit_line(unit));
                }
                if let Some(unit_id) = self.session.armed_unit() {
                    let line = format!("armed: {unit_id}");
                    self.say(line);
                }
                if let Some(dest) = self.engine.destination() {
                    let line = format!("pending destination: {} -> {}", dest.unit_id, dest.target);
                    self.say(line);
                }
                let corridors = self.engine.corridors().len();
                if corridors > 0 {
                    self.say(format!("threat corridors: {corridors}"));
                }
                Action::Continue
            }
            OperatorCommand::Alerts => {
                let alerts = self.store.alerts();
                if alerts.is_empty() {
                    self.say("no active alerts");
                }
                for alert in alerts.iter() {
                    self.say(alert_line(alert));
                }
                Action::Continue
            }
            OperatorCommand::Risk => {
                let units = self.store.units();
                let ranked = rank_by_risk(&units);
                if ranked.is_empty() {
                    self.say("no risk data");
                }
                let lines: Vec<String> = ranked
                    .iter()
                    .map(|u| format!("{:<12} {:.2} {}", u.display_name(), u.risk_score, u.risk_level()))
                    .collect();
                self.output.extend(lines);
                Action::Continue
            }
            OperatorCommand::Endpoint {
                stream_url,
                api_url,
            } => Action::Reconfigure {
                stream_url,
                api_url,
            },
            OperatorCommand::Help => {
                self.say(HELP);
                Action::Continue
            }
            OperatorCommand::Quit => Action::Quit,
        }
    }

    pub fn on_dispatch_outcome(&mut self, outcome: DispatchOutcome, at: DateTime<Utc>) {
        let line = match outcome.result {
            Ok(()) => self.log.record_confirmed(at, &outcome.unit_id).to_string(),
            Err(e) => {
                tracing::warn!(unit_id = %outcome.unit_id, error = %e, "destination command failed");
                self.log.record_failure(at, &e).to_string()
            }
        };
        self.say(line);
    }

    /// Drains what the retired link had queued, then marks the uplink down
    /// until the new link reports in.
    pub fn on_link_replaced(&mut self, leftover: Vec<StreamEvent>, now_ms: u64) {
        for event in leftover {
            self.on_stream_event(event, now_ms);
        }
        self.on_stream_event(StreamEvent::Disconnected, now_ms);
    }

    /// Advance marker animations; `true` while any is still running.
    pub fn on_frame(&mut self, now_ms: u64) -> bool {
        self.engine.tick(now_ms)
    }
}

// ─── Network handles ──────────────────────────────────────────────

struct Link {
    config: LinkConfig,
    client: StreamClient,
    subscription: Subscription,
    gateway: CommandGateway,
}

impl Link {
    fn open(config: LinkConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let gateway = CommandGateway::new(config.clone())?;
        let mut client = StreamClient::new(config.clone());
        let subscription = client.subscribe();
        client.connect();
        tracing::info!(stream_url = %config.stream_url, api_url = %config.api_url, "link opened");
        Ok(Self {
            config,
            client,
            subscription,
            gateway,
        })
    }
}

fn elapsed_ms(clock: Instant) -> u64 {
    u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn spawn_dispatch(
    gateway: CommandGateway,
    intent: DestinationIntent,
    tx: mpsc::UnboundedSender<DispatchOutcome>,
) {
    tokio::spawn(async move {
        let result = gateway
            .assign_destination(&intent.unit_id, intent.destination)
            .await;
        let _ = tx.send(DispatchOutcome {
            unit_id: intent.unit_id,
            result,
        });
    });
}

fn flush(console: &mut Console) {
    for line in console.drain_output() {
        println!("{line}");
    }
}

/// Entry point for `threatwatch console`.
pub async fn cmd_console(config: LinkConfig) -> anyhow::Result<()> {
    let mut link = Link::open(config)?;
    let mut console = Console::new(RenderConfig::default());
    let (dispatch_tx, mut dispatch_rx) = mpsc::unbounded_channel::<DispatchOutcome>();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let clock = Instant::now();

    println!("threatwatch console: {} (type help)", link.config.stream_url);

    loop {
        tokio::select! {
            event = link.subscription.recv() => {
                let Some(event) = event else {
                    tracing::warn!("stream subscription closed");
                    break;
                };
                console.on_stream_event(event, elapsed_ms(clock));
            }
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("stdin closed, leaving console");
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match console.on_command(command, Utc::now()) {
                    Action::Continue => {}
                    Action::Dispatch(intent) => {
                        spawn_dispatch(link.gateway.clone(), intent, dispatch_tx.clone());
                    }
                    Action::Reconfigure { stream_url, api_url } => {
                        let next = link.config.with_endpoints(&stream_url, api_url.as_deref());
                        match Link::open(next) {
                            Ok(fresh) => {
                                let mut old = std::mem::replace(&mut link, fresh);
                                old.client.disconnect();
                                let mut leftover = Vec::new();
                                while let Some(event) = old.subscription.try_recv() {
                                    leftover.push(event);
                                }
                                console.on_link_replaced(leftover, elapsed_ms(clock));
                                println!("endpoint: {} / {}", link.config.stream_url, link.config.api_url);
                            }
                            Err(e) => println!("endpoint unchanged: {e}"),
                        }
                    }
                    Action::Quit => break,
                }
            }
            Some(outcome) = dispatch_rx.recv() => {
                console.on_dispatch_outcome(outcome, Utc::now());
            }
            _ = frames.tick(), if console.engine().is_animating() => {
                console.on_frame(elapsed_ms(clock));
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received ctrl-c, leaving console");
                break;
            }
        }
        flush(&mut console);
    }

    link.client.disconnect();
    flush(&mut console);
    Ok(())
}
