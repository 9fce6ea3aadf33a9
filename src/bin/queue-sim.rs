use queue_sim::cli::{self, Command, FormatArg};
use queue_sim::config;
use queue_sim::engine;
use queue_sim::error::Result;
use queue_sim::output::{self, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args()?;
    match args.command {
        Command::Run(args) => {
            let config = config::build_config(&args.source)?;
            let format = args.output_format();
            let result = match format {
                FormatArg::Summary => engine::run_simulation_summary(&config)?,
                FormatArg::Human | FormatArg::Json => engine::run_simulation(&config)?,
            };
            let formatter = formatter_for(&format);
            print!("{}", formatter.write(&result));
        }
        Command::ShowConfig(source) => {
            let config = config::build_config(&source)?;
            print!("{}", output::describe_config(&config));
        }
    }

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
