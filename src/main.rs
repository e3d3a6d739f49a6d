use clap::Parser;
use miette::Result;
use sgt::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => sgt::cli::commands::init::run(args, &global),
        Commands::Market(cmd) => sgt::cli::commands::market::run(cmd, &global),
        Commands::Product(cmd) => sgt::cli::commands::product::run(cmd, &global),
        Commands::Grade(cmd) => sgt::cli::commands::grade::run(cmd, &global),
        Commands::Defect(cmd) => sgt::cli::commands::defect::run(cmd, &global),
        Commands::Insp(cmd) => sgt::cli::commands::insp::run(cmd, &global),
        Commands::Scan(cmd) => sgt::cli::commands::scan::run(cmd, &global),
        Commands::Report(cmd) => sgt::cli::commands::report::run(cmd, &global),
        Commands::Completions(args) => sgt::cli::commands::completions::run(args),
    }
}
