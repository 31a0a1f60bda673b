use crate::demo::{run_demo, run_import, run_template, DemoArgs, ImportArgs, TemplateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use propeval::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Property Evaluation Platform",
    about = "Run and exercise the property evaluation service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Write a question sheet template or export for the demo hierarchy
    Template(TemplateArgs),
    /// Validate or apply a question sheet against the demo hierarchy
    Import(ImportArgs),
    /// Run an end-to-end CLI walkthrough: template, import, evaluation
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Template(args) => run_template(args),
        Command::Import(args) => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
