use std::ffi::OsString;
use std::path::PathBuf;

use hop_engine::{key_bindings_help, load_config, SimConfig, CONFIG_ENV_VAR};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::script::Script;
use super::AppError;

const USAGE: &str = "\
usage: hop [--config <path>] [--script <path>] [--seed <u64>] [--slowmo <factor>]

  --config <path>    JSON simulation config (falls back to $HOP_CONFIG)
  --script <path>    console command script; the built-in demo runs otherwise
  --seed <u64>       override the color ring seed
  --slowmo <factor>  start with wall time divided by <factor>
  -h, --help         print this message";

pub(crate) struct AppWiring {
    pub(crate) config: SimConfig,
    pub(crate) script: Script,
}

pub(crate) enum Launch {
    Run(AppWiring),
    Help,
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    config_path: Option<PathBuf>,
    script_path: Option<PathBuf>,
    seed: Option<u64>,
    slow_motion: Option<f32>,
    help: bool,
}

pub(crate) fn build_app() -> Result<Launch, AppError> {
    init_tracing();

    let options = parse_cli_args(std::env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(Launch::Help);
    }

    info!("=== Hop Startup ===");
    for line in key_bindings_help().lines() {
        info!("{line}");
    }

    let config_path = resolve_config_path(
        options.config_path.clone(),
        std::env::var_os(CONFIG_ENV_VAR),
    );
    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };
    apply_overrides(&mut config, &options);

    let script = match &options.script_path {
        Some(path) => Script::load(path)?,
        None => Script::demo(),
    };
    let config_label = config_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    info!(
        config = %config_label,
        script = script.origin(),
        seed = config.seed,
        slow_motion = config.clock.slow_motion,
        "app_configured"
    );

    Ok(Launch::Run(AppWiring { config, script }))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliOptions, AppError> {
    let mut options = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-h" | "--help" => options.help = true,
            "--config" => options.config_path = Some(PathBuf::from(flag_value(&mut args, &flag)?)),
            "--script" => options.script_path = Some(PathBuf::from(flag_value(&mut args, &flag)?)),
            "--seed" => {
                let raw = flag_value(&mut args, &flag)?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| AppError::Usage(format!("invalid --seed '{raw}'")))?;
                options.seed = Some(seed);
            }
            "--slowmo" => {
                let raw = flag_value(&mut args, &flag)?;
                let factor = raw
                    .parse::<f32>()
                    .ok()
                    .filter(|value| value.is_finite() && *value > 0.0)
                    .ok_or_else(|| AppError::Usage(format!("invalid --slowmo '{raw}'")))?;
                options.slow_motion = Some(factor);
            }
            other => {
                return Err(AppError::Usage(format!(
                    "unknown argument '{other}'\n{USAGE}"
                )));
            }
        }
    }

    Ok(options)
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, AppError> {
    args.next()
        .ok_or_else(|| AppError::Usage(format!("missing value for {flag}")))
}

fn resolve_config_path(cli: Option<PathBuf>, env: Option<OsString>) -> Option<PathBuf> {
    cli.or_else(|| {
        env.filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    })
}

fn apply_overrides(config: &mut SimConfig, options: &CliOptions) {
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    if let Some(factor) = options.slow_motion {
        config.clock.slow_motion = factor;
    }
}
