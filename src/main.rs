use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use tracing::info;

use dlq_store::comm::config::get_global_config_manager;
use dlq_store::comm::init_tracing;
use dlq_store::command_registry::version_string;
use dlq_store::{build_app, AppBootstrap, AppConfig, ServerArgs};

#[actix_web::main]
async fn main() -> Result<()> {
    let matches: ArgMatches = build_app().get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => handle_server_command(sub_matches).await,
        Some(("migrate", _)) => {
            init_tracing()?;
            AppBootstrap::migrate().await?;
            info!("migrations applied");
            Ok(())
        }
        Some(("version", _)) => {
            println!("{}", version_string());
            Ok(())
        }
        _ => Err(anyhow!("未知命令，请使用 --help 查看可用命令")),
    }
}

async fn handle_server_command(matches: &ArgMatches) -> Result<()> {
    init_tracing()?;

    let args = ServerArgs::from_matches(matches)?;
    let config_manager =
        get_global_config_manager().context("failed to load configuration")?;
    let config = AppConfig::from_config(&config_manager).merge_args(&args);

    AppBootstrap::new().with_config(config).run().await
}
