//! Command-line interface and REPL
//!
//! Drives a [`Scene`] from typed commands, either interactively or by
//! replaying a script file, and prints every reading the joysticks emit.

use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::json;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use joystick_controller::config::SceneConfig;
use joystick_controller::input::{Point, PointerPhase, TouchId};
use joystick_controller::joystick::{MoveHandler, Reading, Response};
use joystick_controller::scene::{JoystickStatus, Scene};

const HELP: &str = "\
Commands:
  down X Y [BUTTON]          press a mouse button (default 0) at X,Y
  move X Y                   move the mouse to X,Y
  up [BUTTON]                release a mouse button at the cursor
  touch start|move|end ID X Y
  menu X Y                   open the context menu at X,Y
  resize W H                 resize the viewport
  list                       show every joystick
  destroy NAME               remove a joystick
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Down { x: f64, y: f64, button: i16 },
    Move { x: f64, y: f64 },
    Up { button: i16 },
    Touch { phase: PointerPhase, id: TouchId, x: f64, y: f64 },
    Menu { x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    List,
    Destroy { name: String },
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

fn number<T: FromStr>(token: &str) -> Result<T, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = tokens.split_first() else {
            return Err(CommandError::Empty);
        };

        match (head.to_ascii_lowercase().as_str(), args) {
            ("down", [x, y]) => Ok(Command::Down { x: number(x)?, y: number(y)?, button: 0 }),
            ("down", [x, y, button]) => Ok(Command::Down {
                x: number(x)?,
                y: number(y)?,
                button: number(button)?,
            }),
            ("down", _) => Err(CommandError::Usage("down X Y [BUTTON]")),
            ("move", [x, y]) => Ok(Command::Move { x: number(x)?, y: number(y)? }),
            ("move", _) => Err(CommandError::Usage("move X Y")),
            ("up", []) => Ok(Command::Up { button: 0 }),
            ("up", [button]) => Ok(Command::Up { button: number(button)? }),
            ("up", _) => Err(CommandError::Usage("up [BUTTON]")),
            ("touch", [phase, id, x, y]) => {
                let phase = match phase.to_ascii_lowercase().as_str() {
                    "start" => PointerPhase::Down,
                    "move" => PointerPhase::Move,
                    "end" => PointerPhase::Up,
                    _ => return Err(CommandError::Usage("touch start|move|end ID X Y")),
                };
                Ok(Command::Touch { phase, id: number(id)?, x: number(x)?, y: number(y)? })
            }
            ("touch", _) => Err(CommandError::Usage("touch start|move|end ID X Y")),
            ("menu", [x, y]) => Ok(Command::Menu { x: number(x)?, y: number(y)? }),
            ("menu", _) => Err(CommandError::Usage("menu X Y")),
            ("resize", [w, h]) => Ok(Command::Resize { width: number(w)?, height: number(h)? }),
            ("resize", _) => Err(CommandError::Usage("resize W H")),
            ("list" | "ls", []) => Ok(Command::List),
            ("destroy", [name]) => Ok(Command::Destroy { name: name.to_string() }),
            ("destroy", _) => Err(CommandError::Usage("destroy NAME")),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit", _) => Ok(Command::Quit),
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Result of executing one command
#[derive(Debug, Default)]
pub struct Outcome {
    pub response: Option<Response>,
    pub readings: Vec<(String, Reading)>,
    pub status: Option<Vec<JoystickStatus>>,
    pub message: Option<String>,
    pub quit: bool,
}

/// Scene plus the console's own state (cursor, reading feed)
pub struct Console {
    scene: Scene,
    cursor: Point,
    json: bool,
    readings: mpsc::UnboundedReceiver<(String, Reading)>,
}

impl Console {
    pub fn new(config: &SceneConfig, json: bool) -> Result<Self> {
        let (tx, readings) = mpsc::unbounded_channel();

        let scene = Scene::from_config(config, |name| -> MoveHandler {
            let tx = tx.clone();
            let name = name.to_string();
            Box::new(move |reading: &Reading| {
                if tx.send((name.clone(), *reading)).is_err() {
                    trace!("Console closed, dropping reading for {}", name);
                }
            })
        })
        .context("Failed to build scene")?;

        Ok(Self {
            scene,
            cursor: Point::default(),
            json,
            readings,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Readings emitted while building the scene
    pub fn drain(&mut self) -> Vec<(String, Reading)> {
        let mut drained = Vec::new();
        while let Ok(item) = self.readings.try_recv() {
            drained.push(item);
        }
        drained
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!("Executing {:?}", command);
        let mut outcome = Outcome::default();

        let response = match command {
            Command::Down { x, y, button } => {
                self.cursor = Point::new(x, y);
                Some(self.scene.mouse_down(x, y, button))
            }
            Command::Move { x, y } => {
                self.cursor = Point::new(x, y);
                Some(self.scene.mouse_move(x, y))
            }
            Command::Up { button } => Some(self.scene.mouse_up(self.cursor.x, self.cursor.y, button)),
            Command::Touch { phase, id, x, y } => Some(match phase {
                PointerPhase::Down => self.scene.touch_start(id, x, y),
                PointerPhase::Move => self.scene.touch_move(id, x, y),
                PointerPhase::Up => self.scene.touch_end(id, x, y),
            }),
            Command::Menu { x, y } => Some(self.scene.context_menu(x, y)),
            Command::Resize { width, height } => {
                if !(width > 0.0 && height > 0.0) {
                    anyhow::bail!("Viewport must have a positive size");
                }
                Some(self.scene.resize(width, height))
            }
            Command::List => {
                outcome.status = Some(self.scene.status());
                None
            }
            Command::Destroy { name } => {
                self.scene.destroy_named(&name)?;
                outcome.message = Some(format!("Destroyed joystick '{}'", name));
                None
            }
            Command::Help => {
                outcome.message = Some(HELP.to_string());
                None
            }
            Command::Quit => {
                outcome.quit = true;
                None
            }
        };

        outcome.response = response;
        outcome.readings = self.drain();
        Ok(outcome)
    }

    /// Print an outcome in the configured format
    pub fn render(&self, outcome: &Outcome) {
        for (name, reading) in &outcome.readings {
            println!("{}", self.format_reading(name, reading));
        }

        if let Some(status) = &outcome.status {
            if self.json {
                println!("{}", json!({ "joysticks": status }));
            } else {
                for entry in status {
                    println!("{}", format_status(entry));
                }
            }
        }

        if let Some(message) = &outcome.message {
            println!("{}", message);
        }

        if let Some(response) = outcome.response {
            if response.prevent_default() {
                println!("{}", "  (default action prevented)".dimmed());
            } else if response == Response::Ignored && !self.json {
                println!("{}", "  (ignored)".dimmed());
            }
        }
    }

    fn format_reading(&self, name: &str, reading: &Reading) -> String {
        if self.json {
            return json!({ "joystick": name, "reading": reading }).to_string();
        }
        format!(
            "{} x={} y={} level=({}, {}) angle={} distance={}",
            format!("[{}]", name).cyan().bold(),
            reading.x.to_string().green(),
            reading.y.to_string().green(),
            reading.leveled_x.to_string().yellow(),
            reading.leveled_y.to_string().yellow(),
            reading.angle,
            reading.distance
        )
    }
}

fn format_status(status: &JoystickStatus) -> String {
    let center = status
        .center
        .map(|c| format!("({}, {})", c.x, c.y))
        .unwrap_or_else(|| "-".to_string());
    let owner = status
        .owner
        .map(|o| o.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "  {} #{} {} {:?} center={} owner={} x={} y={}",
        status.name.bright_white().bold(),
        status.id,
        if status.dynamic { "dynamic".magenta() } else { "anchored".blue() },
        status.phase,
        center,
        owner,
        status.reading.x,
        status.reading.y
    )
}

/// Parse and run one input line; returns `false` once the user quits
fn handle_line(console: &mut Console, line: &str) -> bool {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(CommandError::Empty) => return true,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return true;
        }
    };

    match console.execute(command) {
        Ok(outcome) => {
            console.render(&outcome);
            !outcome.quit
        }
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            true
        }
    }
}

pub async fn run_repl(console: &mut Console) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "Joystick console - type 'help' for commands".bold());
    let initial = Outcome {
        readings: console.drain(),
        ..Default::default()
    };
    console.render(&initial);

    loop {
        match rl.readline("joystick> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                if !handle_line(console, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Replay a file of commands; blank lines and `#` comments are skipped
pub async fn run_script(console: &mut Console, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script: {}", path.display()))?;

    let initial = Outcome {
        readings: console.drain(),
        ..Default::default()
    };
    console.render(&initial);

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !console.json {
            println!("{} {}", "joystick>".dimmed(), line);
        }
        if !handle_line(console, line) {
            break;
        }
    }

    Ok(())
}
