//! Ccmd CLI
//!
//! Runs custom command templates against in-memory hosts.

use ccmd::commands::{list_functions, run, CliError, RunOptions};

fn print_usage() {
    eprintln!("Usage: ccmd <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <template>   Evaluate a template and print the response");
    eprintln!("  functions        List the built-in functions");
    eprintln!();
    eprintln!("Run options:");
    eprintln!("  --context <file>  Invocation context as JSON");
    eprintln!("  --config <file>   Engine configuration as JSON");
    eprintln!("  --seed <file>     Members, entries and tables for the memory hosts");
    eprintln!("  -- <args>...      Invocation arguments, exposed as .Args");
}

#[tokio::main]
async fn main() {
    ccmd::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => match RunOptions::parse(&args[2..]) {
            Ok(options) => run(&options).await,
            Err(err) => Err(err),
        },
        "functions" => {
            list_functions();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(CliError::Usage(format!("unknown command '{other}'"))),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        if matches!(err, CliError::Usage(_)) {
            eprintln!();
            print_usage();
        }
        std::process::exit(1);
    }
}
