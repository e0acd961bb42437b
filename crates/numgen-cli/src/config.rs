use clap::{Args, Parser, Subcommand};
use numgen::{EVEN_THRESHOLD, GenerationConfig, TOTAL_LIMIT, UPPER_BOUND};

/// Command line for the `numgen` binary.
///
/// All values are parsed from CLI arguments or environment variables, with
/// defaults matching the production workload.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "numgen",
    version,
    about = "Generate, persist and inspect a concurrently produced set of classified numbers"
)]
pub struct CliArgs {
    /// SQLite database the numbers are persisted to.
    ///
    /// Environment variable: `DATABASE_URL`
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value_t = String::from("sqlite://numbers.db")
    )]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one generation cycle and print its summary.
    Generate(GenerateArgs),

    /// Print the first stored numbers.
    Show {
        /// How many records to print.
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },

    /// Print totals over every stored number.
    Stats,

    /// Delete every stored number.
    Purge,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of values a run produces.
    ///
    /// Environment variable: `TOTAL_LIMIT`
    #[arg(long, env = "TOTAL_LIMIT", default_value_t = TOTAL_LIMIT)]
    pub total_limit: usize,

    /// Buffer length at which even values start being produced. Must not
    /// exceed the total limit.
    ///
    /// Environment variable: `EVEN_THRESHOLD`
    #[arg(long, env = "EVEN_THRESHOLD", default_value_t = EVEN_THRESHOLD)]
    pub even_threshold: usize,

    /// Exclusive upper bound of generated magnitudes.
    ///
    /// Environment variable: `UPPER_BOUND`
    #[arg(long, env = "UPPER_BOUND", default_value_t = UPPER_BOUND)]
    pub upper_bound: i32,

    /// Seed for a reproducible random stream. Thread-local randomness is used
    /// when absent.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,

    /// Persist the result once the run completes.
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Print the summary as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub enum Action {
    Generate {
        generation: GenerationConfig,
        seed: Option<u64>,
        save: bool,
        json: bool,
    },
    Show {
        count: usize,
    },
    Stats,
    Purge,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL must not be empty");
        }

        let action = match args.command {
            Command::Generate(generate) => Action::Generate {
                generation: GenerationConfig::new(
                    generate.total_limit,
                    generate.even_threshold,
                    generate.upper_bound,
                )?,
                seed: generate.seed,
                save: generate.save,
                json: generate.json,
            },
            Command::Show { count } => Action::Show { count },
            Command::Stats => Action::Stats,
            Command::Purge => Action::Purge,
        };

        Ok(Self {
            database_url: args.database_url,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<AppConfig> {
        let args = CliArgs::try_parse_from(std::iter::once("numgen").chain(args.iter().copied()))?;
        AppConfig::try_from(args)
    }

    #[test]
    fn generate_defaults_to_production_workload() {
        let config = parse(&["--database-url", "sqlite://x.db", "generate"]).unwrap();

        assert_eq!(config.database_url, "sqlite://x.db");
        let Action::Generate {
            generation,
            seed,
            save,
            json,
        } = config.action
        else {
            panic!("expected generate, got {:?}", config.action);
        };
        assert_eq!(generation, GenerationConfig::default());
        assert_eq!(seed, None);
        assert!(!save && !json);
    }

    #[test]
    fn generate_overrides() {
        let config = parse(&[
            "generate",
            "--total-limit",
            "1000",
            "--even-threshold",
            "250",
            "--upper-bound",
            "5000",
            "--seed",
            "9",
            "--save",
            "--json",
            "--database-url",
            "sqlite://y.db",
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite://y.db");
        let Action::Generate {
            generation,
            seed,
            save,
            json,
        } = config.action
        else {
            panic!("expected generate, got {:?}", config.action);
        };
        assert_eq!(generation, GenerationConfig::new(1000, 250, 5000).unwrap());
        assert_eq!(seed, Some(9));
        assert!(save && json);
    }

    #[test]
    fn unreachable_threshold_is_rejected() {
        let err = parse(&[
            "generate",
            "--total-limit",
            "10",
            "--even-threshold",
            "11",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("even threshold"));
    }

    #[test]
    fn empty_database_url_is_rejected() {
        assert!(parse(&["--database-url", " ", "stats"]).is_err());
    }

    #[test]
    fn show_count() {
        let config = parse(&["show", "-n", "3"]).unwrap();
        assert!(matches!(config.action, Action::Show { count: 3 }));

        let config = parse(&["show"]).unwrap();
        assert!(matches!(config.action, Action::Show { count: 20 }));
    }
}
