use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docket_core::Config;
use docket_llm::{Message, Orchestrator, ProviderId, ProviderResult, Role};

#[derive(Parser)]
#[command(name = "docket", version, about = "Legal assistant over a fallback chain of AI providers")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "docket.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session.
    Chat {
        /// Require one provider instead of the fallback chain.
        #[arg(long)]
        provider: Option<ProviderId>,
    },
    /// Review one or more documents (read as plain text).
    Analyze {
        /// Files to analyze.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Require one provider instead of the fallback chain.
        #[arg(long)]
        provider: Option<ProviderId>,
    },
    /// List the configured fallback chain in attempt order.
    Providers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let orchestrator =
        Orchestrator::from_config(&config.llm).context("invalid provider configuration")?;

    match cli.command {
        Command::Chat { provider } => {
            run_chat(&orchestrator, &config.agent.system_prompt, provider).await
        }
        Command::Analyze { files, provider } => {
            run_analyze(&orchestrator, &config.agent.system_prompt, &files, provider).await
        }
        Command::Providers => {
            for id in orchestrator.providers() {
                println!("{id}");
            }
            Ok(())
        }
    }
}

async fn run_chat(
    orchestrator: &Orchestrator,
    system_prompt: &str,
    provider: Option<ProviderId>,
) -> anyhow::Result<()> {
    println!("docket chat — ask a legal question, 'exit' to quit");
    let stdin = io::stdin();
    let mut transcript: Vec<Message> = Vec::new();

    loop {
        print!("you> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        transcript.push(Message::new(Role::User, input));
        match orchestrator.respond(&transcript, system_prompt, provider).await {
            Ok(result) => {
                transcript.push(Message::new(Role::Assistant, result.text.clone()));
                print_result(&result);
            }
            Err(e) => {
                tracing::error!(error = %e, "no provider produced a response");
                eprintln!("couldn't get a response, please try again");
            }
        }
    }

    Ok(())
}

async fn run_analyze(
    orchestrator: &Orchestrator,
    system_prompt: &str,
    files: &[PathBuf],
    provider: Option<ProviderId>,
) -> anyhow::Result<()> {
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        documents.push(text);
    }

    match orchestrator.analyze(&documents, system_prompt, provider).await {
        Ok(result) => {
            print_result(&result);
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "document analysis failed");
            eprintln!("couldn't get a response, please try again");
            Ok(())
        }
    }
}

fn print_result(result: &ProviderResult) {
    println!("{}", result.text);
    println!(
        "  [{}, ~{} tokens{}]",
        result.provider,
        result.estimated_tokens,
        if result.billed { ", billed" } else { "" }
    );
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn provider_flag_parses() {
        let cli = Cli::parse_from(["docket", "chat", "--provider", "groq"]);
        match cli.command {
            Command::Chat { provider } => assert_eq!(provider, Some(ProviderId::Groq)),
            _ => panic!("expected chat command"),
        }
    }
}
