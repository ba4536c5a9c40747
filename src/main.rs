mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use connector_certify::certify::{self, Inputs};
use connector_certify::{checks, config};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Certify {
            path,
            output: output_path,
            config: config_path,
            tree,
            descriptor,
        } => {
            if !path.is_dir() {
                eprintln!("Error: not a directory: {}", path.display());
                std::process::exit(2);
            }

            let config = config::Config::load(config_path.as_deref()).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });

            let inputs = Inputs { tree, descriptor };
            let report = certify::certify_dir(&path, &config, &inputs).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });

            let formatted = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
                eprintln!("Error serializing report: {e}");
                std::process::exit(2);
            });

            if let Some(out_path) = output_path {
                std::fs::write(&out_path, format!("{formatted}\n")).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {e}");
                    std::process::exit(2);
                });
                eprintln!("Output written to {}", out_path.display());
            } else {
                println!("{formatted}");
            }

            for (rule, fault) in report.faults() {
                eprintln!("{} {rule}: {fault}", "incomplete:".yellow().bold());
            }

            std::process::exit(if report.passed { 0 } else { 1 });
        }

        Commands::ListRules => {
            let rules = checks::all_rules();
            println!("{}", "Built-in Rules".bold().underline());
            println!();

            let mut current_context = "";
            for rule in &rules {
                if rule.context != current_context {
                    if !current_context.is_empty() {
                        println!();
                    }
                    println!("  {}", rule.context.bold());
                    current_context = rule.context;
                }

                let priority = match rule.priority {
                    "critical" => "CRITICAL".red().bold().to_string(),
                    "major" => "   MAJOR".yellow().bold().to_string(),
                    "minor" => "   MINOR".blue().to_string(),
                    _ => rule.priority.to_string(),
                };

                println!(
                    "    [{priority}] {key:<38} {name}",
                    key = rule.key,
                    name = rule.name,
                );
            }

            println!();
            println!("  Total: {} rules", rules.len());
        }

        Commands::Explain {
            rule_key,
            config: config_path,
        } => {
            let config = config::Config::load(config_path.as_deref()).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });
            match checks::find_rule(&config, &rule_key) {
                Some(rule) => {
                    println!("{}", rule_key.bold());
                    println!();
                    println!("  Name:         {}", rule.name);
                    println!("  Context:      {}", rule.context);
                    println!("  Priority:     {}", rule.priority);
                    if let Some(entry) = config.layout.iter().find(|l| l.key == rule_key) {
                        println!("  Template:     {}", entry.template);
                    }
                    println!("  Description:  {}", rule.description);
                }
                None => {
                    eprintln!("Unknown rule: {rule_key}");
                    eprintln!("Use 'connector-certify list-rules' to see all available rules.");
                    std::process::exit(2);
                }
            }
        }
    }
}

/// Logs go to stderr so stdout stays a clean JSON report. `RUST_LOG`
/// overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
