// Keyhid CLI
// Replays keystroke logs or forwards a live keyboard to a USB HID gadget

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use keyhid_core::{
    Config, EngineConfig, EngineStats, EvdevSource, HidEmitter, LayoutName, LayoutTable,
    LogTokenizer, ReadMode, StartAt, TranslationEngine,
};

/// Keystroke logs and live keyboards to USB HID reports
#[derive(Parser, Debug)]
#[command(name = "keyhid")]
#[command(version)]
#[command(
    about = "Types keystrokes on a host through a USB HID keyboard gadget",
    long_about = None
)]
struct Args {
    /// TOML configuration file (default: ~/.config/keyhid/config.toml)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type the contents of a keystroke log
    Replay {
        /// Log file to read
        #[arg(short, long, value_name = "FILE")]
        log: Option<PathBuf>,

        /// HID gadget device
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<PathBuf>,

        /// Seconds to wait after each press and each release
        #[arg(long, value_name = "SECONDS")]
        delay: Option<f64>,

        /// Layout configured on the target host
        #[arg(long, value_name = "LAYOUT")]
        layout: Option<LayoutName>,

        /// Start at the beginning of the log instead of its end
        #[arg(long)]
        from_start: bool,

        /// Read the log once and exit instead of following it
        #[arg(long)]
        once: bool,
    },

    /// Forward a local keyboard to the gadget
    Live {
        /// Input device, e.g. /dev/input/event3
        #[arg(short, long, value_name = "DEVICE")]
        input: Option<PathBuf>,

        /// HID gadget device
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<PathBuf>,

        /// Seconds to wait after each press and each release
        #[arg(long, value_name = "SECONDS")]
        delay: Option<f64>,

        /// Layout configured on the target host
        #[arg(long, value_name = "LAYOUT")]
        layout: Option<LayoutName>,

        /// Leave the input device shared with the local session
        #[arg(long)]
        no_grab: bool,
    },

    /// Rewrite a QWERTY key log with AZERTY key names
    Translate {
        /// Key log to read
        input: PathBuf,

        /// Output file (default: stdout)
        output: Option<PathBuf>,
    },
}

/// Main application state
struct Application {
    config: Config,
    args: Args,
    /// Raised by SIGINT or SIGTERM
    stop: Arc<AtomicBool>,
}

impl Application {
    fn new(args: Args) -> Result<Self> {
        let config = Config::load(args.config.as_deref()).with_context(|| match &args.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load default configuration".to_string(),
        })?;
        match config.source_path() {
            Some(path) => log::debug!("Using configuration {}", path.display()),
            None => log::debug!("No configuration file, using defaults"),
        }

        Ok(Self {
            config,
            args,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        EngineConfig::from_config(&self.config)?;
        println!("Configuration is valid");
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let Some(command) = self.args.command.take() else {
            bail!("No command given; try 'keyhid --help'");
        };
        self.install_signal_handler();

        match command {
            Command::Replay {
                log,
                device,
                delay,
                layout,
                from_start,
                once,
            } => {
                self.apply_output_overrides(device, delay, layout)?;
                if let Some(log) = log {
                    self.config.replay.log = Some(log);
                }
                if from_start {
                    self.config.replay.from_start = true;
                }
                if once {
                    self.config.replay.follow = false;
                }
                self.replay()
            }
            Command::Live {
                input,
                device,
                delay,
                layout,
                no_grab,
            } => {
                self.apply_output_overrides(device, delay, layout)?;
                if let Some(input) = input {
                    self.config.capture.input = Some(input);
                }
                if no_grab {
                    self.config.capture.grab = false;
                }
                self.live()
            }
            Command::Translate { input, output } => translate(&input, output.as_deref()),
        }
    }

    /// CLI values win over the configuration file
    fn apply_output_overrides(
        &mut self,
        device: Option<PathBuf>,
        delay: Option<f64>,
        layout: Option<LayoutName>,
    ) -> Result<()> {
        if let Some(device) = device {
            self.config.output.device = device;
        }
        if let Some(delay) = delay {
            self.config.output.delay = delay;
        }
        if let Some(layout) = layout {
            self.config.layout.name = layout;
        }
        self.config.validate().context("Invalid command line value")?;
        Ok(())
    }

    fn open_engine(&self) -> Result<(EngineConfig, TranslationEngine<File>)> {
        let engine_config = EngineConfig::from_config(&self.config)?;
        let emitter = HidEmitter::open(&self.config.output.device, engine_config.hold)?;
        let engine = TranslationEngine::with_emitter(&engine_config, emitter);
        log::info!(
            "Typing on {} with the {} layout, {:?} hold",
            self.config.output.device.display(),
            engine_config.layout,
            engine.emitter().hold()
        );
        Ok((engine_config, engine))
    }

    fn replay(&self) -> Result<()> {
        let replay = &self.config.replay;
        let Some(log_path) = replay.log.as_deref() else {
            bail!("No log file given; use --log or set [replay] log");
        };

        let (mode, start) = if replay.follow {
            let start = if replay.from_start {
                StartAt::Beginning
            } else {
                StartAt::End
            };
            (ReadMode::Follow, start)
        } else {
            (ReadMode::Finite, StartAt::Beginning)
        };

        let (_, mut engine) = self.open_engine()?;
        let tokens = LogTokenizer::open(log_path, start, mode)?
            .with_poll_interval(replay.poll_interval())
            .with_stop_flag(Arc::clone(&self.stop));

        if mode == ReadMode::Follow {
            println!("Following {}. Press Ctrl+C to exit.", log_path.display());
        }
        let stats = engine.replay(tokens, &self.stop)?;
        report(&stats);
        Ok(())
    }

    fn live(&self) -> Result<()> {
        let capture = &self.config.capture;
        let Some(input) = capture.input.as_deref() else {
            bail!("No input device given; use --input or set [capture] input");
        };

        let (engine_config, mut engine) = self.open_engine()?;
        let table = Arc::new(LayoutTable::for_name(engine_config.layout));
        let mut source = EvdevSource::open(input, table, engine_config.scan_codes.clone())?;
        if capture.grab {
            source
                .grab()
                .with_context(|| format!("Failed to grab {}", input.display()))?;
        }

        println!("keyhid is running. Press Ctrl+C to exit.");
        let stats = engine.run_live(&mut source, &self.stop)?;
        source.ungrab();
        report(&stats);
        Ok(())
    }

    /// Set up signal handler for graceful shutdown
    fn install_signal_handler(&self) {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let stop = Arc::clone(&self.stop);
        match Signals::new([SIGINT, SIGTERM]) {
            Ok(mut signals) => {
                std::thread::spawn(move || {
                    if let Some(signal) = signals.forever().next() {
                        log::info!("Received signal {}, shutting down", signal);
                        stop.store(true, Ordering::SeqCst);
                    }
                });
            }
            Err(e) => log::warn!("Could not install signal handler: {}", e),
        }
    }
}

fn translate(input: &Path, output: Option<&Path>) -> Result<()> {
    let qwerty = LayoutTable::for_name(LayoutName::Qwerty);
    let Some(cross) = qwerty.cross() else {
        bail!("No cross-layout table for {}", qwerty.name());
    };

    let reader = File::open(input)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let stats = cross
        .translate_log(reader, &mut writer)
        .context("Translation failed")?;
    writer.flush()?;
    log::info!("Translated {} of {} lines", stats.translated, stats.lines);
    Ok(())
}

fn report(stats: &EngineStats) {
    println!(
        "{} taps sent, {} unmapped, {} modifier events",
        stats.taps, stats.unresolved, stats.consumed
    );
    if stats.truncated {
        println!("Log ended inside an unterminated [token]");
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut app = Application::new(args)?;

    // Handle check-config flag
    if app.args.check_config {
        return app.validate();
    }

    app.run()
}
