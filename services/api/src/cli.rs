use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use product_moderation::config::AppConfig;
use product_moderation::error::AppError;
use product_moderation::workflows::products::{ModerationLinks, ProductId};

#[derive(Parser, Debug)]
#[command(
    name = "Product Moderation",
    about = "Run the product submission and moderation service",
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
    /// Print the approve/disapprove links for a pending product
    Links(LinksArgs),
    /// Submit and approve a sample product against an in-memory store
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

#[derive(Args, Debug)]
pub(crate) struct LinksArgs {
    /// Numeric id of the pending product
    #[arg(long)]
    pub(crate) id: u64,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Links(args) => print_links(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn print_links(args: LinksArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let links = ModerationLinks::build(
        &config.site.url,
        &config.moderation.security_hash,
        ProductId(args.id),
    );
    println!("approve:    {}", links.approve_url);
    println!("disapprove: {}", links.disapprove_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["product-moderation-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn links_requires_numeric_id() {
        let cli = Cli::try_parse_from(["product-moderation-api", "links", "--id", "42"])
            .expect("parses");
        assert!(matches!(cli.command, Some(Command::Links(LinksArgs { id: 42 }))));
        assert!(Cli::try_parse_from(["product-moderation-api", "links", "--id", "abc"]).is_err());
    }
}
