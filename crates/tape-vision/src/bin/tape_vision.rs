use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use crossbeam_channel::unbounded;
use log::LevelFilter;

use tape_vision::config::{CameraConfig, ConfigError, VisionConfig};
use tape_vision::core::FrameError;
use tape_vision::detect::{detect_targets_in_file, DetectError};
use tape_vision::io::{ImageSequenceSource, JsonLinesTelemetry, PngDirectorySink};
use tape_vision::pipeline::{ConfigKey, ConfigState, FilterMode};
use tape_vision::runner::{
    ConfigEvent, ConfigListener, CrosshairAnnotator, Orchestrator, PipelineRunner, Telemetry,
};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("no camera named {0:?} in config")]
    UnknownCamera(String),
    #[error("config has no cameras")]
    NoCameras,
    #[error("config channel for {0} closed early")]
    ChannelClosed(String),
    #[error("{0} runner(s) panicked")]
    RunnersPanicked(usize),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tape-vision", version, about = "Retroreflective target detection")]
struct Cli {
    /// Shorthand for `--log-level debug`.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,
    /// Emit JSON log lines (requires the `tracing` feature).
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect targets in one image and print its telemetry.
    Detect {
        image: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Camera whose pipeline settings to use (default: the first one).
        #[arg(long)]
        camera: Option<String>,
        /// Apply every geometric criterion, not only the area.
        #[arg(long)]
        full_filter: bool,
    },
    /// Run every configured camera, printing telemetry as JSON lines.
    Run(RunArgs),
    /// Print the default application config.
    DefaultConfig,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    config: PathBuf,
    /// Stop each camera after this many iterations (default: run forever).
    #[arg(long)]
    iterations: Option<u64>,
    /// `KEY=VALUE` tuning event sent to every camera before it starts.
    #[arg(long = "set", value_parser = parse_event)]
    set: Vec<ConfigEvent>,
    /// Do not create the config file when it is missing.
    #[arg(long)]
    no_write_default: bool,
}

fn parse_event(raw: &str) -> Result<ConfigEvent, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {key}: {e}"))?;
    Ok(ConfigEvent::new(key.trim(), value))
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug.max(cli.log_level)
    } else {
        cli.log_level
    };
    #[cfg(feature = "tracing")]
    tape_vision::core::init_tracing(cli.json_logs, level);
    #[cfg(not(feature = "tracing"))]
    let _ = tape_vision::core::init_with_level(level);
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.cmd {
        Commands::Detect {
            image,
            config,
            camera,
            full_filter,
        } => detect(image, config, camera, full_filter),
        Commands::Run(args) => run(args),
        Commands::DefaultConfig => {
            println!("{}", VisionConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn detect(
    image: PathBuf,
    config: Option<PathBuf>,
    camera: Option<String>,
    full_filter: bool,
) -> CliResult<()> {
    let vision = match config {
        Some(path) => VisionConfig::load(path)?,
        None => VisionConfig::default(),
    };
    let mut pipeline = match camera.as_deref() {
        Some(name) => {
            vision
                .camera(name)
                .ok_or_else(|| CliError::UnknownCamera(name.to_owned()))?
                .pipeline
        }
        None => vision
            .cameras
            .first()
            .map(|c| c.pipeline)
            .unwrap_or_default(),
    };
    if full_filter {
        pipeline.filter.mode = FilterMode::Full;
    }

    let result = detect_targets_in_file(&image, &pipeline)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&Telemetry::from_result(&result))?
    );
    Ok(())
}

fn run(args: RunArgs) -> CliResult<()> {
    let vision = VisionConfig::load_or_init(&args.config, !args.no_write_default)?;
    if vision.cameras.is_empty() {
        return Err(CliError::NoCameras);
    }
    for event in &args.set {
        if ConfigKey::parse(&event.key).is_none() {
            log::warn!("ignoring unknown key {:?}", event.key);
        }
    }

    // Dropping the orchestrator on an early return also stops and joins.
    let mut orchestrator = Orchestrator::new();
    let stop = orchestrator.stop_signal();
    if let Err(err) = ctrlc::set_handler(move || stop.raise()) {
        log::warn!("failed to install the interrupt handler: {err}");
    }

    let mut senders = Vec::with_capacity(vision.cameras.len());
    for camera in &vision.cameras {
        let state = Arc::new(ConfigState::new(camera.pipeline));
        let (tx, rx) = unbounded();
        let listener = ConfigListener::new(camera.name.clone(), rx, Arc::clone(&state));
        for event in &args.set {
            tx.send(event.clone())
                .map_err(|_| CliError::ChannelClosed(camera.name.clone()))?;
        }
        listener.drain();

        orchestrator.spawn_listener(listener)?;
        orchestrator.spawn_runner(build_runner(&vision, camera, state, args.iterations)?)?;
        senders.push(tx);
    }

    let reports = orchestrator.join();
    drop(senders);

    let mut panicked = 0;
    for named in &reports {
        match named.report {
            Some(report) => log::info!("{}: {:?}", named.name, report),
            None => panicked += 1,
        }
    }
    if panicked > 0 {
        return Err(CliError::RunnersPanicked(panicked));
    }
    Ok(())
}

fn build_runner(
    vision: &VisionConfig,
    camera: &CameraConfig,
    state: Arc<ConfigState>,
    iterations: Option<u64>,
) -> CliResult<PipelineRunner> {
    let (w, h) = vision.resolution();
    let source = ImageSequenceSource::new(camera.frames.clone(), (w, h));
    let telemetry = JsonLinesTelemetry::new(std::io::stdout()).with_camera(camera.name.clone());

    let mut runner = PipelineRunner::new(
        camera.name.clone(),
        (w as usize, h as usize),
        state,
        Box::new(source),
        Box::new(telemetry),
    )?;
    if let Some(dir) = &camera.output_dir {
        runner = runner
            .with_frame_sink(Box::new(PngDirectorySink::new(dir, camera.name.clone())?))
            .with_annotator(Box::new(CrosshairAnnotator::default()));
    }
    if let Some(delay) = vision.iteration_delay() {
        runner = runner.with_iteration_delay(delay);
    }
    if let Some(n) = iterations {
        runner = runner.with_max_iterations(n);
    }
    Ok(runner)
}
