//! Interactive prompt

use crate::commands;
use anyhow::{Context, bail};
use equity_core::{AnalyzeOptions, ResearchError, ResearchPipeline};
use std::io::{self, BufRead, Write};

const DEFAULT_CAPITAL: f64 = 10_000.0;

fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                   Equity Research Assistant                  ║
║                                                              ║
║  Type a ticker or company name to analyze it, or:            ║
║    /search <query>      - find a ticker                      ║
║    /backtest <ticker>   - dual momentum backtest             ║
║    /macro               - macro backdrop                     ║
║    /help                - all commands                       ║
║    /exit                - quit                               ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

/// Parsed prompt input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Full analysis of a ticker or company name
    Analyze { query: String },
    Search { query: String },
    Backtest { query: String, capital: f64 },
    Macro,
    /// Cache statistics
    Cache,
    /// Drop cached snapshots, for one ticker or all of them
    Clear { ticker: Option<String> },
    Popular,
    Help,
    Exit,
}

impl Command {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Empty input");
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(match input.to_lowercase().as_str() {
                "exit" | "quit" | "q" => Command::Exit,
                "help" => Command::Help,
                _ => Command::Analyze {
                    query: input.to_string(),
                },
            });
        };

        let mut parts = rest.split_whitespace();
        let Some(cmd) = parts.next() else {
            bail!("Empty command");
        };
        let args: Vec<&str> = parts.collect();
        let joined = || {
            if args.is_empty() {
                None
            } else {
                Some(args.join(" "))
            }
        };

        match cmd.to_lowercase().as_str() {
            "analyze" | "a" => {
                let query = joined().context("Missing ticker for /analyze")?;
                Ok(Command::Analyze { query })
            }
            "search" | "s" => {
                let query = joined().context("Missing query for /search")?;
                Ok(Command::Search { query })
            }
            "backtest" | "bt" | "b" => {
                let query = args.first().context("Missing ticker for /backtest")?;
                let capital = match args.get(1) {
                    Some(raw) => raw
                        .trim_start_matches('$')
                        .replace(',', "")
                        .parse::<f64>()
                        .with_context(|| format!("Invalid capital: {raw}"))?,
                    None => DEFAULT_CAPITAL,
                };
                Ok(Command::Backtest {
                    query: (*query).to_string(),
                    capital,
                })
            }
            "macro" | "m" => Ok(Command::Macro),
            "cache" => Ok(Command::Cache),
            "clear" => Ok(Command::Clear {
                ticker: args.first().map(|t| t.to_uppercase()),
            }),
            "popular" | "p" => Ok(Command::Popular),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            other => bail!("Unknown command: /{other}"),
        }
    }

    pub fn help_text() -> &'static str {
        r"
Commands
========

  <ticker or name>        Analyze (typos are auto-corrected)
  /analyze <query>        Same as above
  /search <query>         Fuzzy search the stock database
  /backtest <ticker> [$]  Dual momentum backtest, default $10,000
  /macro                  Rates, inflation, jobs and sentiment (needs FRED_API_KEY)
  /popular                Well-known tickers
  /cache                  Cache statistics
  /clear [ticker]         Drop cached snapshots
  /help                   This help
  /exit                   Quit

Aliases: /a /s /b /m /p /h /q
"
    }
}

/// Read commands from stdin until `/exit` or EOF.
pub async fn run(pipeline: &ResearchPipeline) -> anyhow::Result<()> {
    print_banner();
    commands::print_popular(pipeline.searcher());
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("equity> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}\n");
                continue;
            }
        };

        if command == Command::Exit {
            println!("Goodbye!");
            break;
        }

        let query = match &command {
            Command::Analyze { query } | Command::Backtest { query, .. } => Some(query.clone()),
            _ => None,
        };
        if let Err(e) = execute(pipeline, command).await {
            eprintln!("Error: {e:#}");
            let invalid = matches!(
                e.downcast_ref::<ResearchError>(),
                Some(ResearchError::InvalidSymbol(_))
            );
            if let (true, Some(query)) = (invalid, query) {
                let suggestions = pipeline.searcher().suggestions(&query, 3);
                if !suggestions.is_empty() {
                    eprintln!("Did you mean: {}", suggestions.join(", "));
                }
            }
        }
        println!();
    }

    Ok(())
}

async fn execute(pipeline: &ResearchPipeline, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze { query } => {
            let outcome = pipeline.analyze(&query, &AnalyzeOptions::default()).await?;
            commands::print_summary(&outcome);
        }
        Command::Search { query } => commands::search(pipeline, &query, 5),
        Command::Backtest { query, capital } => {
            let outcome = pipeline.backtest(&query, capital).await?;
            commands::print_backtest(&outcome);
        }
        Command::Macro => commands::macro_snapshot(pipeline).await?,
        Command::Cache => commands::cache_stats(pipeline).await?,
        Command::Clear { ticker } => commands::cache_clear(pipeline, ticker.as_deref()).await?,
        Command::Popular => commands::print_popular(pipeline.searcher()),
        Command::Help => println!("{}", Command::help_text()),
        Command::Exit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_text_is_analyze() {
        let cmd = Command::parse("  johnson & johnson ").unwrap();
        assert_eq!(
            cmd,
            Command::Analyze {
                query: "johnson & johnson".to_string()
            }
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(
            Command::parse("/a aapl").unwrap(),
            Command::Analyze {
                query: "aapl".to_string()
            }
        );
        assert_eq!(
            Command::parse("/s fiserw").unwrap(),
            Command::Search {
                query: "fiserw".to_string()
            }
        );
        assert_eq!(Command::parse("/m").unwrap(), Command::Macro);
        assert_eq!(Command::parse("/?").unwrap(), Command::Help);
        assert_eq!(Command::parse("/Q").unwrap(), Command::Exit);
        assert_eq!(Command::parse("quit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_parse_backtest_capital() {
        assert_eq!(
            Command::parse("/backtest spy").unwrap(),
            Command::Backtest {
                query: "spy".to_string(),
                capital: 10_000.0
            }
        );
        assert_eq!(
            Command::parse("/b spy $25,000").unwrap(),
            Command::Backtest {
                query: "spy".to_string(),
                capital: 25_000.0
            }
        );
        assert!(Command::parse("/b spy lots").is_err());
    }

    #[test]
    fn test_parse_clear() {
        assert_eq!(
            Command::parse("/clear").unwrap(),
            Command::Clear { ticker: None }
        );
        assert_eq!(
            Command::parse("/clear msft").unwrap(),
            Command::Clear {
                ticker: Some("MSFT".to_string())
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("/").is_err());
        assert!(Command::parse("/analyze").is_err());
        assert!(Command::parse("/bogus").is_err());
    }
}
