//! activitygen: activity wrapper generator
//!
//! Reads a service descriptor (`.toml` or `.json`), synthesizes the wrapper
//! IR for every activity method and renders it as JSON:
//! - `generate`: render and write (or print) the IR
//! - `check`: validate only and report rejected methods
//! - `config`: print the effective configuration

use std::path::{Path, PathBuf};

use activity_codegen::{
    write_output, CodegenPipeline, DescriptorReader, GenerationOutput, JsonBackend,
    WrapperSynthesizer,
};
use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::GeneratorConfig;

/// activitygen CLI
#[derive(Parser)]
#[command(name = "activitygen")]
#[command(about = "Generate activity wrapper IR from service descriptors", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ACTIVITYGEN_CONFIG")]
    config: Option<String>,

    /// Log level (overrides configuration)
    #[arg(long, env = "ACTIVITYGEN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "ACTIVITYGEN_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize and render wrapper IR
    Generate {
        /// Service descriptor
        descriptor: PathBuf,

        /// Output file; stdout when neither this nor `output.directory` is set
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render compact JSON
        #[arg(long)]
        compact: bool,

        /// Fail if any method is rejected
        #[arg(long)]
        strict: bool,
    },

    /// Validate a descriptor without rendering
    Check {
        /// Service descriptor
        descriptor: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = GeneratorConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json;

    init_tracing(&config);

    match cli.command {
        Commands::Generate {
            descriptor,
            output,
            compact,
            strict,
        } => {
            config.output.pretty &= !compact;
            config.output.strict |= strict;
            generate(&config, &descriptor, output)
        }
        Commands::Check { descriptor } => check(&config, &descriptor),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(config: &GeneratorConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    // Logs go to stderr so rendered output can be piped
    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn pipeline(config: &GeneratorConfig) -> CodegenPipeline {
    CodegenPipeline::new()
        .with_reader(DescriptorReader::new().with_config(config.descriptor.clone()))
        .with_synthesizer(WrapperSynthesizer::new().with_naming(config.naming.clone()))
        .with_backend(Box::new(JsonBackend::new().with_pretty(config.output.pretty)))
}

fn report(descriptor: &Path, output: &GenerationOutput) {
    for rejection in &output.synthesis.rejected {
        eprintln!(
            "{}: method {} rejected: {}",
            descriptor.display(),
            rejection.method_label(),
            rejection.error
        );
    }
}

fn generate(config: &GeneratorConfig, descriptor: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let result = pipeline(config)
        .run(descriptor)
        .with_context(|| format!("failed to generate from {}", descriptor.display()))?;
    report(descriptor, &result);

    if config.output.strict && !result.synthesis.is_clean() {
        bail!(
            "{} method(s) rejected in {}",
            result.synthesis.rejected.len(),
            descriptor.display()
        );
    }

    match resolve_output_path(config, descriptor, output) {
        Some(path) => write_output(&path, &result.rendered)?,
        None => println!("{}", result.rendered),
    }
    Ok(())
}

fn check(config: &GeneratorConfig, descriptor: &Path) -> anyhow::Result<()> {
    let result = pipeline(config)
        .run(descriptor)
        .with_context(|| format!("failed to read {}", descriptor.display()))?;
    report(descriptor, &result);

    let ir = &result.synthesis.ir;
    println!(
        "{}: {} activity method(s) ok, {} rejected",
        descriptor.display(),
        ir.methods.len(),
        result.synthesis.rejected.len()
    );
    if !result.synthesis.is_clean() {
        bail!("descriptor has rejected methods");
    }
    Ok(())
}

/// Explicit path, else `<directory>/<descriptor stem>.json`, else stdout
fn resolve_output_path(
    config: &GeneratorConfig,
    descriptor: &Path,
    explicit: Option<PathBuf>,
) -> Option<PathBuf> {
    explicit.or_else(|| {
        let dir = config.output.directory.as_ref()?;
        let stem = descriptor.file_stem()?;
        Some(dir.join(stem).with_extension("json"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "activitygen",
            "generate",
            "mutex.toml",
            "-o",
            "out/mutex.json",
            "--compact",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                descriptor,
                output,
                compact,
                strict,
            } => {
                assert_eq!(descriptor, PathBuf::from("mutex.toml"));
                assert_eq!(output, Some(PathBuf::from("out/mutex.json")));
                assert!(compact);
                assert!(!strict);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn output_path_resolution() {
        let mut config = GeneratorConfig::default();
        let descriptor = Path::new("protos/mutex.toml");
        assert_eq!(resolve_output_path(&config, descriptor, None), None);

        config.output.directory = Some(PathBuf::from("gen"));
        assert_eq!(
            resolve_output_path(&config, descriptor, None),
            Some(PathBuf::from("gen/mutex.json"))
        );
        assert_eq!(
            resolve_output_path(&config, descriptor, Some(PathBuf::from("x.json"))),
            Some(PathBuf::from("x.json"))
        );
    }

    #[test]
    fn generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = dir.path().join("svc.json");
        std::fs::write(
            &descriptor,
            r#"{"service": "Svc", "methods": [{"name": "Ping", "activity": {}}]}"#,
        )
        .unwrap();
        let out = dir.path().join("svc.ir.json");

        generate(&GeneratorConfig::default(), &descriptor, Some(out.clone())).unwrap();

        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.contains("AsyncPing"));
    }

    #[test]
    fn strict_mode_fails_on_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = dir.path().join("svc.json");
        std::fs::write(
            &descriptor,
            r#"{"service": "Svc", "methods": [{"name": "bad name", "activity": {}}]}"#,
        )
        .unwrap();

        let mut config = GeneratorConfig::default();
        config.output.strict = true;
        assert!(generate(&config, &descriptor, Some(dir.path().join("o.json"))).is_err());
        assert!(check(&GeneratorConfig::default(), &descriptor).is_err());
    }
}
