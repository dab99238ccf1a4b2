use argh::FromArgs;
use smallsh::Shell;
use smallsh::input::LineReader;
use smallsh::logger::ShellLogger;
use std::io::IsTerminal;
use std::process::ExitCode;

#[derive(FromArgs)]
/// A small interactive shell with I/O redirection and background commands.
struct Args {
    #[argh(switch, short = 'v')]
    /// log parsing, spawning and reaping to stderr
    verbose: bool,

    #[argh(switch)]
    /// read plain lines from stdin even when it is a terminal
    plain: bool,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    if let Err(e) = ShellLogger::new(args.verbose).install() {
        eprintln!("smallsh: cannot set up logging: {}", e);
    }

    let reader = if args.plain || !std::io::stdin().is_terminal() {
        Ok(LineReader::plain())
    } else {
        LineReader::editor()
    };

    let result = reader.and_then(|mut reader| Shell::default().repl(&mut reader));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("smallsh: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
