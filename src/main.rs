use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sum_seed::config::{self, SeedConfig};
use sum_seed::orchestrator::SeedOrchestrator;
use sum_seed::output;
use sum_seed::store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sum-seed")]
#[command(about = "Seed a site's pages, images and settings from a YAML profile")]
#[command(long_about = "\
Seed a site's pages, images and settings from a YAML profile

Each profile is a directory of YAML files. Seeding is idempotent: running it
again updates what is there instead of duplicating it.

Content structure:

  content/
  └── sage-stone/
      ├── site.yaml                # brand, contact, colors, typography, social
      ├── navigation.yaml          # header and footer menus
      └── pages/
          ├── home.yaml            # page name = file stem
          ├── about.yaml
          ├── blog.yaml            # categories and posts
          └── legal.yaml           # terms, privacy, accessibility

Values may reference each other with ${brand.company_name}-style paths.
Image fields (image, photo, logo) name keys of the placeholder manifest.

Run 'sum-seed gen-config' to generate a documented seed.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "seed.toml", global = true)]
    config: PathBuf,

    /// Content directory, overrides `content_dir` from the config
    #[arg(long, global = true)]
    content_path: Option<PathBuf>,

    /// Store document, overrides `store` from the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a content profile into the store
    Seed {
        /// Profile to seed (defaults to the configured default profile)
        profile: Option<String>,
        /// Remove previously seeded content first
        #[arg(long)]
        clear: bool,
        /// Print the plan without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List available content profiles
    Profiles,
    /// Print a stock seed.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Profiles => {
            let config = load_config(&cli.config, cli.content_path, cli.store)?;
            let orchestrator = SeedOrchestrator::from_config(&config)?;
            let profiles = orchestrator.list_profiles()?;
            output::print_profiles(&profiles, &config.content_dir, &config.default_profile);
        }
        Command::Seed {
            profile,
            clear,
            dry_run,
        } => {
            let config = load_config(&cli.config, cli.content_path, cli.store)?;
            let mut orchestrator = SeedOrchestrator::from_config(&config)?;
            let profile = resolve_profile(
                profile,
                &config.default_profile,
                &orchestrator.list_profiles()?,
            )?;

            if dry_run {
                let plan = orchestrator.plan(&profile)?;
                output::print_plan(&plan);
                return Ok(());
            }

            println!("==> Seeding {} into {}", profile, config.store.display());
            let mut store = MemoryStore::open(&config.store)?;
            let result = orchestrator.seed(&mut store, &profile, clear)?;
            output::print_result(&result, &store);
        }
    }

    Ok(())
}

/// `info` by default, `debug` with `--verbose`. `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default = if verbose { "sum_seed=debug" } else { "sum_seed=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `seed.toml` and apply the CLI overrides.
fn load_config(
    path: &std::path::Path,
    content_path: Option<PathBuf>,
    store: Option<PathBuf>,
) -> Result<SeedConfig, config::ConfigError> {
    let mut config = config::load_config(path)?;
    if let Some(content_path) = content_path {
        config.content_dir = content_path;
    }
    if let Some(store) = store {
        config.store = store;
    }
    Ok(config)
}

/// The profile to seed: the argument, else the configured default when it
/// exists, else the only available profile.
fn resolve_profile(
    requested: Option<String>,
    default: &str,
    available: &[String],
) -> Result<String, String> {
    if let Some(profile) = requested {
        return Ok(profile);
    }
    if available.iter().any(|p| p == default) {
        return Ok(default.to_string());
    }
    match available {
        [only] => Ok(only.clone()),
        [] => Err("No content profiles found".to_string()),
        _ => Err(format!(
            "No profile given and default profile '{}' not found. Available: {}",
            default,
            available.join(", ")
        )),
    }
}
