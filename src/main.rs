//! Command-line entry point
//!
//! ```text
//! stratum-choreo [generate] --mp3 <PATH> --output <DIR> [--model <ONNX>] [--config <JSON>]
//! ```
//!
//! Progress is written to stdout as JSON lines; logs go to stderr
//! (`RUST_LOG` controls the level, default `warn`).

use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stratum_choreo::progress::ProgressEvent;
use stratum_choreo::{ChoreoError, GenerationConfig, JsonLinesSink, Pipeline, ProgressSink};

#[derive(Parser, Debug)]
#[command(name = "stratum-choreo", version, about)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a choreography for an audio file (default)
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Input audio file
    #[arg(long, value_name = "PATH")]
    mp3: Option<PathBuf>,

    /// Output directory; its name becomes the song id
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// ONNX pose model (overrides the config file and STRATUM_CHOREO_MODEL)
    #[arg(long, value_name = "ONNX")]
    model: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>, model: Option<PathBuf>) -> Result<GenerationConfig, ChoreoError> {
    let mut config = match path {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    if model.is_some() {
        config.model.model_path = model;
    }
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Command::Generate(args)) => args,
        None => cli.generate,
    };

    let (audio_path, output_dir) = match (args.mp3, args.output) {
        (Some(mp3), Some(output)) => (mp3, output),
        _ => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--mp3 <PATH> and --output <DIR> are required",
            )
            .exit(),
    };

    let mut progress = JsonLinesSink::stdout();

    let config = match load_config(args.config.as_deref(), args.model) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            progress.emit(ProgressEvent::error(e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let mut pipeline = Pipeline::new(config);
    match pipeline.run(&audio_path, &output_dir, &mut progress) {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_is_default_subcommand() {
        let cli = Cli::try_parse_from(["stratum-choreo", "--mp3", "a.mp3", "--output", "out"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.generate.mp3, Some(PathBuf::from("a.mp3")));

        let cli = Cli::try_parse_from([
            "stratum-choreo",
            "generate",
            "--mp3",
            "a.mp3",
            "--output",
            "out",
            "--model",
            "edge.onnx",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert_eq!(args.model, Some(PathBuf::from("edge.onnx")));
            }
            None => panic!("expected generate subcommand"),
        }
    }

    #[test]
    fn test_cli_model_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model": {"model_path": "from-file.onnx"}}"#).unwrap();

        let config = load_config(Some(&path), Some(PathBuf::from("cli.onnx"))).unwrap();
        assert_eq!(config.model.model_path, Some(PathBuf::from("cli.onnx")));

        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.model.model_path, Some(PathBuf::from("from-file.onnx")));
    }
}
