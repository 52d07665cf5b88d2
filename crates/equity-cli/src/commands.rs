//! Subcommand handlers and terminal output

use crate::{AnalyzeArgs, OutputFormat};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use equity_core::api::MacroSnapshot;
use equity_core::report::{Formatter, TextFormatter};
use equity_core::search::StockSearcher;
use equity_core::{
    AnalyzeOptions, BacktestOutcome, Industry, ResearchOutcome, ResearchPipeline, StockDatabase,
};
use equity_utils::{format_money, format_optional, format_percent, format_ratio};
use std::path::Path;

const RULE_WIDTH: usize = 70;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

pub async fn analyze(pipeline: &ResearchPipeline, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let industry = args
        .industry
        .as_deref()
        .map(str::parse::<Industry>)
        .transpose()?;
    let options = AnalyzeOptions {
        use_cache: !args.no_cache,
        industry,
        save_report: !args.no_save,
    };

    let outcome = pipeline.analyze(&args.ticker, &options).await?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            print_summary(&outcome);
            if args.show_report {
                println!("\n{}", TextFormatter.render(&outcome.report));
            }
        }
    }
    Ok(())
}

fn rsi_label(rsi: f64) -> &'static str {
    if rsi > 70.0 {
        "🔴 overbought"
    } else if rsi < 30.0 {
        "🟢 oversold"
    } else {
        "⚪ normal"
    }
}

/// Headline numbers for one analysis
pub fn print_summary(outcome: &ResearchOutcome) {
    let snapshot = &outcome.snapshot;
    let analysis = &outcome.analysis;
    let latest = &snapshot.price.latest;
    let rule = "=".repeat(RULE_WIDTH);

    println!("\n{rule}");
    println!(
        "📊 {} analysis complete - {}",
        outcome.symbol.symbol,
        outcome.industry.display_name()
    );
    println!("{rule}");

    if let Some(typed) = &outcome.symbol.corrected_from {
        println!("\n🔎 '{typed}' resolved to {}", outcome.symbol.symbol);
    }

    println!("\n⏱️  Performance");
    println!("   Elapsed: {:.2} s", outcome.elapsed.as_secs_f64());
    println!(
        "   Source: {}",
        if outcome.cache_hit { "cache" } else { "network" }
    );

    println!("\n📈 Price");
    println!("   Company: {}", snapshot.company.name);
    println!("   Current: ${:.2}", latest.current);
    println!("   Change: {:+.2}%", latest.change_pct);
    println!(
        "   Market cap: {}",
        format_optional(snapshot.fundamentals.market_cap, format_money)
    );

    let mut scores = table(&["Measure", "Value"]);
    scores
        .add_row(vec![
            "Fundamentals".to_string(),
            format!(
                "{} ({}/{})",
                analysis.fundamentals.rating.label(),
                analysis.fundamentals.score,
                analysis.fundamentals.max_score
            ),
        ])
        .add_row(vec![
            "Technicals".to_string(),
            format!(
                "{} ({:.1}/{:.1})",
                analysis.technicals.rating.label(),
                analysis.technicals.score,
                analysis.technicals.max_score
            ),
        ])
        .add_row(vec![
            "RSI(14)".to_string(),
            format!(
                "{:.1} {}",
                analysis.indicators.momentum.rsi_14,
                rsi_label(analysis.indicators.momentum.rsi_14)
            ),
        ])
        .add_row(vec![
            "MACD".to_string(),
            analysis.indicators.trend.macd_signal.label().to_string(),
        ])
        .add_row(vec![
            "Data".to_string(),
            format!(
                "{} ({} simulated bars)",
                analysis.data_quality.label(),
                snapshot.synthetic_bars
            ),
        ]);
    println!("\n{scores}");

    println!(
        "\n🎯 Signal: {} {}",
        analysis.signal.recommendation.stance().marker(),
        analysis.signal.recommendation
    );
    println!("   Confidence: {:.1}/5.0", analysis.signal.confidence);
    println!("   {}", analysis.signal.reasoning);

    let analyst = outcome.analyst_targets();
    if let Some(target) = analyst.target_mean {
        println!("\n🎯 Analysts");
        println!("   Target: ${target:.2}");
        println!(
            "   Upside: {}",
            format_optional(analyst.upside_pct, |u| format!("{u:+.1}%"))
        );
        println!(
            "   Consensus: {}",
            analyst.recommendation.as_deref().unwrap_or("n/a")
        );
    }

    if !analysis.warnings.is_empty() {
        println!("\n⚠️  Notes");
        for warning in &analysis.warnings {
            println!("   - {warning}");
        }
    }

    if let Some(path) = &outcome.report_path {
        println!("\n📁 Full report: {}", path.display());
    }
    println!("{rule}");
}

pub fn search(pipeline: &ResearchPipeline, query: &str, limit: usize) {
    let searcher = pipeline.searcher();
    let results = searcher.find(query, limit);

    if results.is_empty() {
        println!("No matches for '{query}'.");
        print_popular(searcher);
        return;
    }

    if let Some(best) = searcher.auto_correct(query) {
        if !best.stock.symbol.eq_ignore_ascii_case(query.trim()) {
            println!("Did you mean {} ({})?", best.stock.symbol, best.stock.name);
        }
    }

    let mut out = table(&["Symbol", "Name", "Category", "Match", "Score"]);
    for result in &results {
        out.add_row(vec![
            result.stock.symbol.clone(),
            result.stock.name.clone(),
            result.stock.category.to_string(),
            result.match_type.label().to_string(),
            format!("{:.2}", result.score),
        ]);
    }
    println!("{out}");
}

pub fn print_popular(searcher: &StockSearcher) {
    let symbols: Vec<&str> = searcher.popular().iter().map(|s| s.symbol.as_str()).collect();
    println!("Popular: {}", symbols.join(", "));
}

pub async fn backtest(pipeline: &ResearchPipeline, ticker: &str, capital: f64) -> anyhow::Result<()> {
    let outcome = pipeline.backtest(ticker, capital).await?;
    print_backtest(&outcome);
    Ok(())
}

pub fn print_backtest(outcome: &BacktestOutcome) {
    let r = &outcome.report;
    println!(
        "\n🔍 Dual momentum backtest - {} ({}), {} bars",
        outcome.symbol.symbol, outcome.company_name, r.bars_used
    );
    if outcome.simulated_bars > 0 {
        println!("⚠️  {} of the bars are simulated", outcome.simulated_bars);
    }

    let mut metrics = table(&["Metric", "Value"]);
    metrics
        .add_row(vec!["Initial capital".to_string(), format_money(r.initial_capital)])
        .add_row(vec!["Final equity".to_string(), format_money(r.final_equity)])
        .add_row(vec!["Total return".to_string(), format_percent(r.total_return_pct)])
        .add_row(vec!["Annualized".to_string(), format_percent(r.annualized_return_pct)])
        .add_row(vec!["Max drawdown".to_string(), format_percent(r.max_drawdown_pct)])
        .add_row(vec!["Sharpe".to_string(), format_ratio(r.sharpe_ratio)])
        .add_row(vec!["Win rate".to_string(), format_percent(r.win_rate_pct)])
        .add_row(vec!["Trades".to_string(), r.total_trades.to_string()])
        .add_row(vec!["Buy & hold".to_string(), format_percent(r.buy_hold_return_pct)])
        .add_row(vec!["Outperformance".to_string(), format_percent(r.outperformance_pct)]);
    println!("{metrics}");

    if !r.trades.is_empty() {
        let mut trades = table(&["Date", "Action", "Price", "Shares"]);
        for trade in &r.trades {
            trades.add_row(vec![
                trade.timestamp.format("%Y-%m-%d").to_string(),
                format!("{:?}", trade.action).to_uppercase(),
                format!("${:.2}", trade.price),
                format!("{:.4}", trade.shares),
            ]);
        }
        println!("Recent trades\n{trades}");
    }
}

pub async fn macro_snapshot(pipeline: &ResearchPipeline) -> anyhow::Result<()> {
    let snapshot = pipeline.macro_snapshot().await?;
    print_macro(&snapshot);
    Ok(())
}

fn print_macro(m: &MacroSnapshot) {
    let pct = |v: Option<f64>| format_optional(v, |x| format!("{x:.2}%"));
    let mut out = table(&["Indicator", "Value"]);
    out.add_row(vec!["Fed funds".to_string(), pct(m.rates.fed_funds_rate)])
        .add_row(vec!["10Y treasury".to_string(), pct(m.rates.treasury_10y)])
        .add_row(vec!["2Y treasury".to_string(), pct(m.rates.treasury_2y)])
        .add_row(vec![
            "10Y-2Y spread".to_string(),
            format!(
                "{}{}",
                pct(m.rates.yield_spread),
                if m.rates.yield_curve_inverted { " (inverted)" } else { "" }
            ),
        ])
        .add_row(vec![
            "CPI YoY".to_string(),
            format!("{} ({})", pct(m.inflation.cpi_yoy), m.inflation.trend),
        ])
        .add_row(vec!["Core PCE YoY".to_string(), pct(m.inflation.core_pce_yoy)])
        .add_row(vec![
            "Unemployment".to_string(),
            format!(
                "{} ({})",
                pct(m.employment.unemployment_rate),
                m.employment.labor_market
            ),
        ])
        .add_row(vec![
            "Payrolls change".to_string(),
            format_optional(m.employment.payroll_change, |x| format!("{x:+.0}K")),
        ])
        .add_row(vec![
            "Consumer sentiment".to_string(),
            format_optional(m.sentiment.consumer_sentiment, |x| format!("{x:.1}")),
        ])
        .add_row(vec![
            "VIX".to_string(),
            format!(
                "{} ({})",
                format_optional(m.sentiment.vix, |x| format!("{x:.1}")),
                m.sentiment.mood
            ),
        ]);

    println!("\n🌍 Macro snapshot as of {}\n{out}", m.as_of_date);
    println!("{}", m.assessment);
}

pub async fn cache_stats(pipeline: &ResearchPipeline) -> anyhow::Result<()> {
    let stats = pipeline.cache_stats().await?;
    let config = pipeline.config();

    println!("\n💾 Cache");
    println!("   Files: {}", stats.total_files);
    println!("   Size: {:.2} MB", stats.total_size_mb);
    println!("   Location: {}", config.cache_dir.display());
    println!(
        "   Expiry: {:.1} h",
        config.cache_expiry.as_secs_f64() / 3600.0
    );

    if !stats.tickers.is_empty() {
        let mut out = table(&["Ticker", "Files"]);
        for (ticker, files) in &stats.tickers {
            out.add_row(vec![ticker.clone(), files.to_string()]);
        }
        println!("{out}");
    }
    Ok(())
}

pub async fn cache_clear(pipeline: &ResearchPipeline, ticker: Option<&str>) -> anyhow::Result<()> {
    let removed = pipeline.clear_cache(ticker).await?;
    match ticker {
        Some(ticker) => println!("🗑️  Removed {removed} cache file(s) for {}", ticker.to_uppercase()),
        None => println!("🗑️  Removed {removed} cache file(s)"),
    }
    Ok(())
}

pub async fn cache_cleanup(pipeline: &ResearchPipeline) -> anyhow::Result<()> {
    let removed = pipeline.cleanup_cache().await?;
    println!("🧹 Pruned {removed} old cache file(s)");
    Ok(())
}

pub async fn db_build(path: &Path) -> anyhow::Result<()> {
    let mut database = StockDatabase::load(path).await;
    let changed = database.recategorize();
    database.save(path).await?;
    println!(
        "✅ Wrote {} stocks to {} ({changed} recategorized)",
        database.len(),
        path.display()
    );
    Ok(())
}

pub async fn db_categories(path: &Path) -> anyhow::Result<()> {
    let searcher = StockSearcher::new(StockDatabase::load(path).await);
    let mut out = table(&["Category", "Stocks"]);
    for (category, count) in searcher.categories() {
        out.add_row(vec![category.to_string(), count.to_string()]);
    }
    println!("{out}");
    Ok(())
}
