use crate::config::TrackerConfig;
use crate::tracker::*;
use crate::util::*;
use async_trait::async_trait;
use chrono::Utc;
use num_enum::TryFromPrimitive;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type StdinLines = Lines<BufReader<Stdin>>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
enum MenuChoice {
    Exit = 0,
    TrackSun = 1,
    Manual = 2,
    TrackBody = 3,
    DaySimulation = 4,
    Retrograde = 5,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive)]
#[repr(u8)]
enum TrackingStyle {
    Live = 1,
    FastSimulation = 2,
}

fn parse_numbered<E: TryFrom<u8>>(line: &str) -> Option<E> {
    let n: u8 = line.trim().parse().ok()?;
    E::try_from(n).ok()
}

fn parse_choice(line: &str) -> Option<MenuChoice> {
    parse_numbered(line)
}

/// Bodies offered by "Track a celestial body". The Sun has its own menu entries.
fn celestial_bodies(registry: &Registry) -> impl Iterator<Item = Body> + '_ {
    registry.bodies().iter().copied().filter(|b| !b.is_sun())
}

async fn read_line(lines: &mut StdinLines, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
    // A broken stdin is treated like a closed one
    lines.next_line().await.ok().flatten()
}

/// Interactive front end. Ctrl-C stops the running session and returns to the menu.
pub struct Console<'a, T: Transport> {
    config: &'a TrackerConfig,
    provider: &'a dyn PositionProvider,
    transport: T,
    lines: StdinLines,
}

impl<'a, T: Transport> Console<'a, T> {
    pub fn new(config: &'a TrackerConfig, provider: &'a dyn PositionProvider, transport: T) -> Self {
        Self {
            config,
            provider,
            transport,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Returns on exit, end of input or a transport failure
    pub async fn run(mut self) -> TrackerResult<()> {
        loop {
            println!();
            println!("=== SKY TRACKER ===");
            println!("1. Track the Sun");
            println!("2. Manual control");
            println!("3. Track a celestial body");
            println!("4. Simulate today's solar path");
            println!("5. Retrograde playback");
            println!("0. Exit");

            let Some(line) = self.prompt("Choice: ").await else {
                return Ok(());
            };
            let Some(choice) = parse_choice(&line) else {
                println!("Invalid option");
                continue;
            };

            let mode = match choice {
                MenuChoice::Exit => return Ok(()),
                MenuChoice::TrackSun => match self.choose_site().await {
                    Some(site) => RunMode::AutomaticTracking {
                        site,
                        body: Body::Sun,
                    },
                    None => continue,
                },
                MenuChoice::Manual => {
                    println!("Enter 'q' to stop");
                    RunMode::ManualOverride {
                        site: self.config.manual_site,
                    }
                }
                MenuChoice::TrackBody => {
                    let Some(site) = self.choose_site().await else {
                        continue;
                    };
                    let Some(body) = self.choose_body().await else {
                        continue;
                    };
                    println!("1. Live");
                    println!(
                        "2. Fast simulation (next {} h)",
                        self.config.simulation.look_ahead.num_hours()
                    );
                    let Some(line) = self.prompt("Mode: ").await else {
                        continue;
                    };
                    match parse_numbered(&line) {
                        Some(TrackingStyle::Live) => RunMode::AutomaticTracking { site, body },
                        Some(TrackingStyle::FastSimulation) => RunMode::LookAhead {
                            site,
                            body,
                            from: Utc::now(),
                        },
                        None => {
                            println!("Invalid option");
                            continue;
                        }
                    }
                }
                MenuChoice::DaySimulation => {
                    let Some(site) = self.choose_site().await else {
                        continue;
                    };
                    let Ok(timezone) = self.config.registry.site(site).map(|s| s.timezone) else {
                        continue;
                    };
                    RunMode::DaySimulation {
                        site,
                        body: Body::Sun,
                        date: Utc::now().with_timezone(&timezone).date_naive(),
                    }
                }
                MenuChoice::Retrograde => RunMode::retrograde(&self.config.simulation),
            };

            self.run_session(mode).await?;
        }
    }

    /// Reads a line, or None on end of input or Ctrl-C
    async fn prompt(&mut self, prompt: &str) -> Option<String> {
        tokio::select! {
            line = read_line(&mut self.lines, prompt) => line,
            _ = tokio::signal::ctrl_c() => None,
        }
    }

    async fn choose_site(&mut self) -> Option<SiteId> {
        for site in self.config.registry.sites() {
            println!("{}. {}", site.id, site.name);
        }
        let line = self.prompt("Site: ").await?;
        match line.trim().parse::<SiteId>() {
            Ok(id) if self.config.registry.site(id).is_ok() => Some(id),
            _ => {
                println!("Unknown site {:?}", line.trim());
                None
            }
        }
    }

    async fn choose_body(&mut self) -> Option<Body> {
        for body in celestial_bodies(&self.config.registry) {
            println!("{}. {}", u8::from(body), body);
        }
        let line = self.prompt("Body: ").await?;
        let body = line
            .trim()
            .parse::<u8>()
            .map_err(TrackerError::input)
            .and_then(|n| self.config.registry.body(n));
        match body {
            Ok(body) if body.is_sun() => {
                println!("The Sun has its own menu entries");
                None
            }
            Ok(body) => Some(body),
            Err(e) => {
                println!("{}", e);
                None
            }
        }
    }

    async fn run_session(&mut self, mode: RunMode) -> TrackerResult<()> {
        let cancel = CancelSignal::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };
        println!("Running {}, press Ctrl-C to stop", mode.kind());

        let mut input = ConsoleInput {
            lines: &mut self.lines,
        };
        let mut session = TrackingSession::new(self.config, self.provider, &mut self.transport)
            .with_operator_input(&mut input);
        let result = session.run(mode, &cancel).await;
        watcher.abort();

        match result {
            Ok(outcome) => {
                let how = if outcome.is_cancelled() {
                    "Stopped"
                } else {
                    "Finished"
                };
                println!("{} after {} frames", how, outcome.frames_sent());
                Ok(())
            }
            Err(e @ TrackerError::Transport(_)) => Err(e),
            Err(e) => {
                println!("{}", e);
                Ok(())
            }
        }
    }
}

struct ConsoleInput<'l> {
    lines: &'l mut StdinLines,
}

#[async_trait]
impl OperatorInput for ConsoleInput<'_> {
    async fn next_entry(&mut self) -> Option<ManualEntry> {
        let azimuth = read_line(self.lines, "Servo azimuth: ").await?;
        if azimuth.trim().eq_ignore_ascii_case("q") {
            return None;
        }
        let elevation = read_line(self.lines, "Servo elevation (0-90): ").await?;
        Some(ManualEntry::new(azimuth, elevation))
    }

    fn rejected(&mut self, error: &TrackerError) {
        println!("{}", error);
    }

    fn sent(&mut self, frame: &Frame) {
        println!("Sent {}", frame);
    }
}
