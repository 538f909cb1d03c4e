use clap::{Parser as ClapParser, Subcommand};
use jexl_lang::{
    Jexl, Value,
    cli::{self, CheckOptions, CheckResult, CliError},
};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

#[derive(ClapParser)]
#[command(name = "jexl")]
#[command(about = "Jexl - Evaluate expressions against JSON contexts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and evaluate an expression
    Check {
        /// The expression to evaluate
        expression: String,

        /// JSON context (reads from stdin if not provided)
        #[arg(short, long, conflicts_with = "context_file")]
        input: Option<String>,

        /// Read the JSON context from a file
        #[arg(short, long)]
        context_file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'jexl docs' to list categories)
        category: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            context_file,
            pretty,
            syntax_only,
        } => run_check(expression, input, context_file, pretty, syntax_only),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    expression: String,
    input: Option<String>,
    context_file: Option<PathBuf>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match (input, context_file) {
        (Some(s), _) => Some(s),
        (None, Some(path)) => Some(fs::read_to_string(path)?),
        (None, None) if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        (None, None) => None,
    };

    let options = CheckOptions {
        expression,
        input,
        syntax_only,
    };

    match cli::execute_check(&Jexl::new(), &options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(Value::Undefined) => println!("undefined"),
        CheckResult::Success(output) => {
            let json = output.to_json();
            let text = if pretty {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string(&json)
            }?;
            println!("{}", text);
        }
    }
    Ok(())
}
