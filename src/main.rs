use clap::Parser;
use miette::Result;
use rrt::cli::{Cli, Commands};

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
        Commands::Init(args) => rrt::cli::commands::init::run(args),
        Commands::Goal(cmd) => rrt::cli::commands::goal::run(cmd, &global),
        Commands::Risk(cmd) => rrt::cli::commands::risk::run(cmd, &global),
        Commands::Cause(cmd) => rrt::cli::commands::cause::run(cmd, &global),
        Commands::Control(cmd) => rrt::cli::commands::control::run(cmd, &global),
        Commands::Session(cmd) => rrt::cli::commands::session::run(cmd, &global),
        Commands::Monitor(cmd) => rrt::cli::commands::monitor::run(cmd, &global),
        Commands::Status(args) => rrt::cli::commands::status::run(args, &global),
        Commands::Completions(args) => rrt::cli::commands::completions::run(args),
    }
}
