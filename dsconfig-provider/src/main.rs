mod config;
mod logging;
mod operations;
mod provider;
mod resources;

use anyhow::{Context, Result};
use clap::{CommandFactory as _, Parser, Subcommand};
use dsconfig_resource::framework::{run_main, ProviderServer};
use provider::DsConfigProvider;
use std::process::exit;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    handle_result(run_args(args).await);
}

async fn run_args(args: Args) -> Result<()> {
    match &args.command {
        Commands::Run => {
            logging::set_up(args.options.verbose)?;
            run_main(DsConfigProvider::new()).await;
            Ok(())
        }
        Commands::Schema => {
            let schema = ProviderServer::new(DsConfigProvider::new()).schema();
            let json =
                serde_json::to_string_pretty(&schema).context("Could not serialize the schema")?;
            println!("{}", json);
            Ok(())
        }
        Commands::GenerateMan => (|| {
            let cmd = Args::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buffer: Vec<u8> = Default::default();
            man.render(&mut buffer)?;
            println!("{}", String::from_utf8(buffer)?);
            Ok(())
        })(),
        Commands::GenerateMarkdown => {
            let opts = clap_markdown::MarkdownOptions::new().show_footer(false);
            let markdown: String = clap_markdown::help_markdown_custom::<Args>(&opts);
            println!("{}", markdown);
            Ok(())
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Args::command();
            clap_complete::generate(
                *shell,
                &mut cmd,
                "dsconfig-provider",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

fn handle_result(r: Result<()>) {
    match r {
        Ok(()) => {}
        Err(e) => {
            eprintln!("dsconfig-provider error: {}, {}", e.root_cause(), e);
            exit(1);
        }
    }
}

/// Manage directory server configuration objects from an orchestration host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: Options,
}

#[derive(Parser, Debug, Clone)]
struct Options {
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the provider protocol on stdin and stdout
    Run,

    /// Print the provider, resource and data source schemas as JSON
    Schema,

    /// Generate markdown documentation for dsconfig-provider
    #[command(hide = true)]
    GenerateMarkdown,

    /// Generate a manpage for dsconfig-provider
    #[command(hide = true)]
    GenerateMan,

    /// Generate shell completion for dsconfig-provider
    #[command(hide = true)]
    GenerateCompletion {
        /// The shell to generate completion for
        #[arg(long)]
        shell: clap_complete::Shell,
    },
}
