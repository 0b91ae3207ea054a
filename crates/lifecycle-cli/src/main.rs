mod cmd;
mod output;
mod root;
mod terminal;

use clap::{ArgGroup, Parser};
use lifecycle_core::executor::ExecOptions;
use lifecycle_core::init::InitPolicy;
use lifecycle_core::runner::RunRequest;
use lifecycle_core::shell::DEFAULT_SHELL;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lifecycle",
    about = "Run lifecycle commands (start, build, test, ...) over the components declared in components.json",
    long_about = "Run lifecycle commands over the components declared in components.json. \
                  Each component names a root directory and a map of command templates; \
                  the chosen command is expanded and run in every selected component's \
                  directory, after a one-time 'initialize' command when the component has one.",
    version,
    group(ArgGroup::new("mode").args(["dry_run", "prompt", "initialize", "skip_initialization"]))
)]
struct Cli {
    /// The command to run over the selected components
    #[arg(required_unless_present = "list")]
    command: Option<String>,

    /// Components to run the command for (default: all components)
    components: Vec<String>,

    /// Replace every `{{ KEY }}` in a command with VALUE (repeatable)
    #[arg(short = 't', long = "template-vars", num_args = 2, value_names = ["KEY", "VALUE"])]
    template_vars: Vec<String>,

    /// Select only the components that carry all of these labels
    #[arg(short, long, num_args = 1..)]
    labels: Vec<String>,

    /// Show each command before running it
    #[arg(short, long)]
    verbose: bool,

    /// Print the commands that would run without running anything
    #[arg(short, long)]
    dry_run: bool,

    /// Confirm each command before it runs
    #[arg(short, long)]
    prompt: bool,

    /// Force the 'initialize' command to run for each component
    #[arg(short, long)]
    initialize: bool,

    /// Never run the 'initialize' command, even for uninitialized components
    #[arg(short, long)]
    skip_initialization: bool,

    /// Arguments appended to the end of the command
    #[arg(short, long, num_args = 1.., allow_hyphen_values = true)]
    args: Vec<String>,

    /// List components and their initialization state, then exit
    #[arg(long, conflicts_with_all = ["components", "mode", "args", "template_vars", "labels"])]
    list: bool,

    /// Project root containing components.json (default: search upward from cwd)
    #[arg(long, env = "LIFECYCLE_ROOT")]
    root: Option<PathBuf>,

    /// Shell used to run commands
    #[arg(long, env = "LIFECYCLE_SHELL", default_value = DEFAULT_SHELL)]
    shell: String,
}

impl Cli {
    fn init_policy(&self) -> InitPolicy {
        if self.skip_initialization {
            InitPolicy::Skip
        } else if self.initialize {
            InitPolicy::Force
        } else {
            InitPolicy::Auto
        }
    }

    fn into_request(self, command: String) -> RunRequest {
        let init = self.init_policy();
        let template_vars = self
            .template_vars
            .chunks(2)
            .filter_map(|pair| match pair {
                [key, value] => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect();

        RunRequest {
            command,
            components: self.components,
            labels: self.labels,
            template_vars,
            args: self.args,
            init,
            exec: ExecOptions {
                verbose: self.verbose,
                dry_run: self.dry_run,
                prompt: self.prompt,
            },
        }
    }
}

fn main() {
    let mut cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };

    // RUST_LOG, when set, replaces the default level entirely.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "project root resolved");

    let result = match cli.command.take() {
        Some(command) if !cli.list => {
            let shell = cli.shell.clone();
            let request = cli.into_request(command);
            cmd::run::run(&root, &request, &shell)
        }
        _ => cmd::list::run(&root),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
