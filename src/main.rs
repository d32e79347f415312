use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};

use cardsmith::export::DEFAULT_EXPORT_DIR;
use cardsmith::llm::{clear_api_key, store_api_key, test_configured_api_key};
use cardsmith::palette::Palette;
use cardsmith::{generate, llm};

#[derive(Parser, Debug)]
#[command(
    name = "cardsmith",
    version,
    about = "Turn study notes into flashcards with an LLM.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate flashcards from study material
    Generate {
        /// Read the study text from a file instead of the interactive form.
        #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// How many flashcards to ask for (1-200).
        #[arg(long, value_name = "COUNT", default_value_t = 10)]
        count: u32,
        /// Directory the CSV and JSON exports are written to.
        #[arg(long, value_name = "DIR", default_value = DEFAULT_EXPORT_DIR)]
        output_dir: PathBuf,
        /// Use the built-in sample paragraph as the study text.
        #[arg(long)]
        sample: bool,
    },
    /// Manage the LLM connection
    Llm {
        #[command(subcommand)]
        command: LlmCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LlmCommand {
    /// Store, test, or clear the OpenAI API key
    Key {
        /// Store this key in the local keyring.
        #[arg(long, value_name = "KEY")]
        set: Option<String>,
        /// Remove the stored key from the local keyring.
        #[arg(long)]
        clear: bool,
        /// Check the configured key against the provider.
        #[arg(long)]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run_cli().await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            input,
            count,
            output_dir,
            sample,
        } => {
            generate::run(input, count, output_dir, sample).await?;
        }
        Command::Llm {
            command: LlmCommand::Key { set, clear, test },
        } => {
            run_key_command(set, clear, test).await?;
        }
    }

    Ok(())
}

async fn run_key_command(set: Option<String>, clear: bool, test: bool) -> Result<()> {
    if let Some(key) = set {
        store_api_key(&key)?;
        println!(
            "{} API key stored in the local keyring.",
            Palette::paint(Palette::SUCCESS, "cardsmith:")
        );
        return Ok(());
    }
    if clear {
        if clear_api_key()? {
            println!(
                "{} stored API key removed.",
                Palette::paint(Palette::SUCCESS, "cardsmith:")
            );
        } else {
            println!(
                "{} no stored API key to remove.",
                Palette::paint(Palette::WARNING, "cardsmith:")
            );
        }
        return Ok(());
    }
    if test {
        let source = test_configured_api_key().await?;
        println!(
            "{} API key from the {} is valid.",
            Palette::paint(Palette::SUCCESS, "cardsmith:"),
            source.description()
        );
        return Ok(());
    }

    println!(
        "Set {}, or pass --set, --clear, or --test.",
        Palette::paint(Palette::INFO, llm::secrets::API_KEY_ENV)
    );
    Ok(())
}
