use anyhow::{bail, Context, Result};
use clap::Parser;
use instacli_rust::options::Options;
use instacli_rust::render::{to_json_pretty, to_yaml};
use instacli_rust::{execute_script, parse_script, script_help};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Global flags. Their help text comes from the embedded option table
/// (`Options::format_help`), so clap's own help is disabled.
#[derive(Parser)]
#[command(name = "instacli", disable_help_flag = true)]
struct Cli {
    #[arg(short = 'h', long)]
    help: bool,

    #[arg(short = 'o', long)]
    output: bool,

    #[arg(short = 'j', long = "output-json")]
    output_json: bool,

    #[arg(short = 'q', long = "non-interactive")]
    non_interactive: bool,

    #[arg(short = 'd', long)]
    debug: bool,

    /// Script file or directory of scripts
    path: Option<PathBuf>,

    /// Script input values: --name value, --name=value or --flag
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        if cli.debug {
            eprintln!("Error: {:?}", err);
        } else {
            eprintln!("Error: {:#}", err);
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.path else {
        let any_flag = cli.output || cli.output_json || cli.non_interactive || cli.debug;
        if cli.help || !any_flag {
            let options = Options::load().context("error loading options")?;
            print!("{}", options.format_help());
            return Ok(());
        }
        bail!("No script or directory specified");
    };

    debug!(path = %path.display(), non_interactive = cli.non_interactive, "starting");

    let meta = fs::metadata(path)
        .with_context(|| format!("error accessing path {}", path.display()))?;
    if meta.is_dir() {
        return list_directory(path);
    }

    let data = fs::read(path).context("error reading script file")?;
    let script = parse_script(&data).context("error parsing script")?;

    if cli.help {
        println!("{}", script_help(&script));
        return Ok(());
    }

    let input = parse_command_options(&cli.args)?;
    let output = execute_script(&script, &input)?;

    if let Some(value) = output {
        if cli.output {
            println!("{}", to_yaml(&value));
        }
        if cli.output_json {
            println!("{}", to_json_pretty(&value));
        }
    }
    Ok(())
}

/// `--name value`, `--name=value`, or a bare `--flag` meaning `true`.
fn parse_command_options(args: &[String]) -> Result<BTreeMap<String, String>> {
    let mut input = BTreeMap::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        let Some(option) = arg.strip_prefix("--").filter(|o| !o.is_empty()) else {
            bail!("unexpected argument '{}'", arg);
        };
        if let Some((name, value)) = option.split_once('=') {
            input.insert(name.to_string(), value.to_string());
        } else if let Some(value) = iter.next_if(|next| !next.starts_with("--")) {
            input.insert(option.to_string(), value.clone());
        } else {
            input.insert(option.to_string(), "true".to_string());
        }
    }
    Ok(input)
}

/// List the `.cli` scripts in a directory with their descriptions.
fn list_directory(dir: &Path) -> Result<()> {
    let mut scripts: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("error reading directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "cli"))
        .collect();
    scripts.sort();

    println!("Available commands:");
    for script in scripts {
        let name = script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let description = match fs::read(&script).map(|data| parse_script(&data)) {
            Ok(Ok(parsed)) => parsed.metadata.description,
            Ok(Err(err)) => {
                warn!(script = %script.display(), %err, "could not parse script");
                String::new()
            }
            Err(err) => {
                warn!(script = %script.display(), %err, "could not read script");
                String::new()
            }
        };
        println!("  {}   {}", name, description);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_options_forms() {
        let input =
            parse_command_options(&args(&["--name", "Alice", "--greeting=Hi", "--loud"])).unwrap();
        assert_eq!(input["name"], "Alice");
        assert_eq!(input["greeting"], "Hi");
        assert_eq!(input["loud"], "true");
    }

    #[test]
    fn test_command_options_flag_before_option() {
        let input = parse_command_options(&args(&["--loud", "--name", "Bob"])).unwrap();
        assert_eq!(input["loud"], "true");
        assert_eq!(input["name"], "Bob");
    }

    #[test]
    fn test_option_table_matches_flags() {
        let options = Options::load().unwrap();
        for (name, option) in &options.0 {
            let long = vec!["instacli".to_string(), format!("--{}", name)];
            assert!(Cli::try_parse_from(long).is_ok(), "--{} not accepted", name);
            if let Some(short) = &option.short_option {
                let short_args = vec!["instacli".to_string(), format!("-{}", short)];
                assert!(Cli::try_parse_from(short_args).is_ok(), "-{} not accepted", short);
            }
        }
    }

    #[test]
    fn test_command_options_rejects_positional() {
        assert!(parse_command_options(&args(&["stray"])).is_err());
    }
}
