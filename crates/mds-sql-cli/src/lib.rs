mod cli;
mod config;
mod generate;
mod init;
mod render;
mod write;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    // `${VAR}` references in job files may come from a local `.env`.
    dotenvy::dotenv().ok();

    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Render(args) => render::run(args),
        cli::Command::Gen(cmd) => match cmd {
            cli::GenCommand::Init(args) => init::run(args),
            cli::GenCommand::Run(args) => generate::run(args),
        },
        cli::Command::Versions => render::run_versions(),
    }
}
