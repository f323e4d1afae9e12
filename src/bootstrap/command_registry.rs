use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgMatches, Command};

/// `server` 子命令参数，未给出的项沿用配置文件
/// Flags of the `server` subcommand; absent flags fall back to config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
}

impl ServerArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let workers = matches.get_one::<usize>("workers").copied();
        if workers == Some(0) {
            return Err(anyhow!("--workers must be at least 1"));
        }
        Ok(Self {
            host: matches.get_one::<String>("host").cloned(),
            port: matches.get_one::<u16>("port").copied(),
            workers,
        })
    }
}

/// 构建完整的命令行应用 / Build the CLI
pub fn build_app() -> Command {
    Command::new("dlq-store")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dead-letter queue message store over HTTP")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("server")
                .about("启动 Web 服务器 / Start the HTTP server")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("设置服务器主机地址"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("设置服务器端口")
                        .value_parser(value_parser!(u16)),
                )
                .arg(
                    Arg::new("workers")
                        .short('w')
                        .long("workers")
                        .value_name("WORKERS")
                        .help("设置工作线程数")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(Command::new("migrate").about("执行表结构迁移 / Apply schema migrations"))
        .subcommand(Command::new("version").about("显示版本信息"))
}

/// 版本信息 / Version line printed by `version`
pub fn version_string() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
