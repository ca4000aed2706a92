use std::path::{Path, PathBuf};

mod draft_args;
mod edit;
mod list;
mod show;
mod submit;
mod terminal;

use clap::ArgAction;
use draft_args::DraftArgs;
use edit::Edit;
use list::List;
use show::Show;
use storydesk::{Client, DraftSession};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The directory holding the `.story` configuration folder
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Path to a config file (defaults to `<root>/.story/config.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the story server, overriding the config file
    #[arg(long, env = "STORY_API_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config_path = self
            .config
            .unwrap_or_else(|| storydesk::Config::default_path(&self.root));

        let context = Context {
            config_path,
            base_url: self.base_url,
        };

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(&context)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// Settings shared by every command.
#[derive(Debug)]
pub struct Context {
    config_path: PathBuf,
    base_url: Option<String>,
}

impl Context {
    /// Loads the config file, applying command-line overrides.
    fn config(&self) -> anyhow::Result<storydesk::Config> {
        let mut config = storydesk::Config::load_or_default(&self.config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        if let Some(url) = &self.base_url {
            config.set_base_url(url.clone());
        }
        Ok(config)
    }

    fn client(&self) -> anyhow::Result<Client> {
        let config = self.config()?;
        tracing::debug!(base_url = config.base_url(), "connecting");
        Ok(Client::new(&config)?)
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List and search stories (default)
    List(List),

    /// Show a story in detail
    Show(Show),

    /// Create a new story
    Create(Create),

    /// Edit an existing story
    Edit(Edit),

    /// Write a default configuration file
    Init,

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    fn run(self, context: &Context) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(context)?,
            Self::Show(command) => command.run(context)?,
            Self::Create(command) => command.run(context)?,
            Self::Edit(command) => command.run(context)?,
            Self::Init => Init::run(&context.config_path)?,
            Self::Config(command) => command.run(&context.config_path)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(config_path: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        if config_path.exists() {
            anyhow::bail!(
                "Configuration already exists at {}",
                config_path.display()
            );
        }

        let config = storydesk::Config::default();
        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config file: {e}"))?;

        println!(
            "{}",
            format!("Created {}", config_path.display()).success()
        );
        println!("  base_url: {}", config.base_url());
        println!();
        println!("Next steps:");
        println!("  story config set-url http://your-server:8000");
        println!("  story create --interactive");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Create {
    #[command(flatten)]
    fields: DraftArgs,

    /// Prompt for any fields not given on the command line
    #[arg(long, short)]
    interactive: bool,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Create {
    #[instrument(level = "debug", skip(context))]
    fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;

        let mut session = DraftSession::create();
        let draft = session
            .draft_mut()
            .ok_or_else(|| anyhow::anyhow!("draft session is not editable"))?;
        self.fields.apply(draft)?;
        if self.interactive {
            draft_args::prompt_missing(draft)?;
        }

        submit::confirm_and_submit(&mut session, &client, self.yes, "Save this story?")
    }
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set the base URL of the story server
    SetUrl {
        /// The server URL, e.g. `http://127.0.0.1:8000`
        url: String,
    },

    /// Set the request timeout
    SetTimeout {
        /// Timeout in whole seconds (0 disables it)
        secs: u64,
    },
}

impl Config {
    #[instrument]
    fn run(self, config_path: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let mut config = storydesk::Config::load_or_default(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        match self.command {
            ConfigCommand::Show => {
                println!("Configuration:");
                println!(
                    "  {}",
                    format!("file: {}", config_path.display()).dim()
                );
                println!("  base_url: {}", config.base_url());
                match config.timeout() {
                    Some(timeout) => println!("  timeout_secs: {}", timeout.as_secs()),
                    None => println!("  timeout_secs: 0 {}", "(disabled)".dim()),
                }
            }
            ConfigCommand::SetUrl { url } => {
                config.set_base_url(url);
                // reject values the client could never use
                Client::new(&config)?;
                Self::save(&config, config_path)?;
                println!(
                    "{}",
                    format!("Updated base_url to {}", config.base_url()).success()
                );
            }
            ConfigCommand::SetTimeout { secs } => {
                config.set_timeout_secs(secs);
                Self::save(&config, config_path)?;
                println!("{}", format!("Updated timeout_secs to {secs}").success());
            }
        }

        Ok(())
    }

    fn save(config: &storydesk::Config, config_path: &Path) -> anyhow::Result<()> {
        config
            .save(config_path)
            .map_err(|e| anyhow::anyhow!("{e}"))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn config_command(args: &[&str]) -> ConfigCommand {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Some(Command::Config(config)) => config.command,
            other => panic!("expected config command, got {other:?}"),
        }
    }

    #[test]
    fn config_subcommands_parse() {
        assert!(matches!(
            config_command(&["story", "config", "show"]),
            ConfigCommand::Show
        ));
        assert!(matches!(
            config_command(&["story", "config", "set-url", "http://localhost:9000"]),
            ConfigCommand::SetUrl { url } if url == "http://localhost:9000"
        ));
        assert!(matches!(
            config_command(&["story", "config", "set-timeout", "5"]),
            ConfigCommand::SetTimeout { secs: 5 }
        ));
    }

    #[test]
    fn config_set_timeout_rejects_non_numbers() {
        assert!(Cli::try_parse_from(["story", "config", "set-timeout", "soon"]).is_err());
        assert!(Cli::try_parse_from(["story", "config", "set", "base_url", "x"]).is_err());
    }

    #[test]
    fn config_changes_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config {
            command: ConfigCommand::SetUrl {
                url: "http://localhost:9000/".to_string(),
            },
        }
        .run(&path)
        .unwrap();
        Config {
            command: ConfigCommand::SetTimeout { secs: 0 },
        }
        .run(&path)
        .unwrap();

        let config = storydesk::Config::load(&path).unwrap();
        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(config.timeout(), None);
    }
}
