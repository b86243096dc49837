//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use crate::adapters::alert_sink::{ConsoleAlertSink, LogAlertSink};
use crate::adapters::csv_adapter::{CsvFundamentals, CsvMarketData, read_holdings};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alert::AlertDispatcher;
use crate::domain::config_validation::{
    parse_date, validate_evaluation_config, validate_watch_config,
};
use crate::domain::error::MarketScoreError;
use crate::domain::evaluation::{BatchReport, EvaluationConfig, Evaluator, ScoredSymbol, build_pool};
use crate::domain::indicator::set::IndicatorParams;
use crate::domain::indicator::snapshot::{self, TechnicalRow, technical_snapshot};
use crate::domain::portfolio::{PortfolioValuation, RowOutcome, value_holdings};
use crate::domain::schedule::{self, CancellationToken, IntervalTicker, run_cycles};
use crate::domain::scoring::ScoringPolicy;
use crate::domain::sip::{self, SipInput};
use crate::domain::watchlist::parse_symbols;
use crate::ports::alert_port::AlertSink;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(
    name = "marketscore",
    about = "Score symbols on fundamentals and technicals, alert on changes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the configured symbols once
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluate only this symbol
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Re-evaluate the watchlist every refresh interval, alerting on changes
    Watch {
        #[arg(short, long)]
        config: PathBuf,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Show the latest technical readings for one symbol
    Technicals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value_t = snapshot::DEFAULT_ROWS)]
        rows: usize,
    },
    /// Value a holdings CSV (Symbol,Quantity) at the latest close
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        holdings: PathBuf,
    },
    /// Future value of a monthly investment plan
    Sip {
        #[arg(long, value_parser = non_negative)]
        monthly: f64,
        /// Expected annual return, in percent
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,
        #[arg(long)]
        months: u32,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn non_negative(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err("must be a non-negative number".to_string())
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Evaluate { config, symbol } => run_evaluate(&config, symbol.as_deref()),
        Command::Watch { config, cycles } => run_watch(&config, cycles),
        Command::Technicals {
            config,
            symbol,
            rows,
        } => run_technicals(&config, &symbol, rows),
        Command::Portfolio { config, holdings } => run_portfolio(&config, &holdings),
        Command::Sip {
            monthly,
            rate,
            months,
        } => run_sip(monthly, rate, months),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(e: &MarketScoreError) -> ExitCode {
    eprintln!("error: {e}");
    e.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MarketScoreError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn build_indicator_params(config: &dyn ConfigPort) -> IndicatorParams {
    let defaults = IndicatorParams::default();
    let period = |key: &str, default: usize| -> usize {
        let v = config.get_int("indicators", key, default as i64);
        if v < 1 { default } else { v as usize }
    };
    IndicatorParams {
        rsi_period: period("rsi_period", defaults.rsi_period),
        macd_fast: period("macd_fast", defaults.macd_fast),
        macd_slow: period("macd_slow", defaults.macd_slow),
        macd_signal: period("macd_signal", defaults.macd_signal),
        trend_fast: period("trend_fast", defaults.trend_fast),
        trend_slow: period("trend_slow", defaults.trend_slow),
        overlay_period: period("overlay_period", defaults.overlay_period),
    }
}

pub fn build_evaluation_config(
    config: &dyn ConfigPort,
) -> Result<EvaluationConfig, MarketScoreError> {
    let start_date = parse_date(
        config.get_string("evaluation", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        config.get_string("evaluation", "end_date").as_deref(),
        "end_date",
    )?;

    let policy = match config.get_string("scoring", "policy") {
        Some(s) => s
            .parse::<ScoringPolicy>()
            .map_err(|reason| MarketScoreError::ConfigInvalid {
                section: "scoring".into(),
                key: "policy".into(),
                reason,
            })?,
        None => ScoringPolicy::default(),
    };

    Ok(EvaluationConfig {
        start_date,
        end_date,
        policy,
        indicators: build_indicator_params(config),
    })
}

/// The override symbol if given, otherwise the configured watchlist.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, MarketScoreError> {
    let raw = match symbol_override {
        Some(s) => s.to_string(),
        None => config
            .get_string("evaluation", "symbols")
            .ok_or_else(|| MarketScoreError::ConfigMissing {
                section: "evaluation".into(),
                key: "symbols".into(),
            })?,
    };
    Ok(parse_symbols(&raw)?)
}

fn bars_dir(config: &dyn ConfigPort) -> Result<PathBuf, MarketScoreError> {
    config
        .get_string("data", "bars_dir")
        .map(PathBuf::from)
        .ok_or_else(|| MarketScoreError::ConfigMissing {
            section: "data".into(),
            key: "bars_dir".into(),
        })
}

/// Fundamentals are only read from disk when the policy scores them.
fn open_fundamentals(
    config: &dyn ConfigPort,
    policy: ScoringPolicy,
) -> Result<CsvFundamentals, MarketScoreError> {
    if !policy.needs_fundamentals() {
        return Ok(CsvFundamentals::empty());
    }
    let path = config.get_string("data", "fundamentals").ok_or_else(|| {
        MarketScoreError::ConfigMissing {
            section: "data".into(),
            key: "fundamentals".into(),
        }
    })?;
    CsvFundamentals::from_path(Path::new(&path))
}

/// One batch over the resolved symbols, alerting through `sink`.
pub fn evaluate_once(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    sink: &dyn AlertSink,
) -> Result<BatchReport, MarketScoreError> {
    let eval_config = build_evaluation_config(config)?;
    let symbols = resolve_symbols(symbol_override, config)?;
    let market = CsvMarketData::new(bars_dir(config)?);
    let fundamentals = open_fundamentals(config, eval_config.policy)?;
    let pool = build_pool(workers(config))?;
    let dispatcher = AlertDispatcher::new();

    let evaluator = Evaluator::new(&market, &fundamentals, &dispatcher, sink, eval_config);
    Ok(evaluator.evaluate_batch(&symbols, &pool))
}

/// Runs the watch loop and returns the number of completed cycles.
pub fn watch(
    config: &dyn ConfigPort,
    sink: &dyn AlertSink,
    token: &CancellationToken,
    max_cycles: Option<u64>,
    mut on_report: impl FnMut(u64, &BatchReport),
) -> Result<u64, MarketScoreError> {
    let eval_config = build_evaluation_config(config)?;
    let symbols = resolve_symbols(None, config)?;
    let market = CsvMarketData::new(bars_dir(config)?);
    let fundamentals = open_fundamentals(config, eval_config.policy)?;
    let pool = build_pool(workers(config))?;
    let dispatcher = AlertDispatcher::new();
    let evaluator = Evaluator::new(&market, &fundamentals, &dispatcher, sink, eval_config);

    let refresh = config.get_int(
        "watch",
        "refresh_interval",
        schedule::DEFAULT_REFRESH_SECS as i64,
    );
    let mut ticker = IntervalTicker::from_secs(refresh.max(0) as u64);
    tracing::info!(
        symbols = symbols.len(),
        refresh_secs = ticker.interval().as_secs(),
        workers = pool.current_num_threads(),
        "watch started"
    );

    Ok(run_cycles(&mut ticker, token, max_cycles, |cycle| {
        let report = evaluator.evaluate_batch(&symbols, &pool);
        on_report(cycle, &report);
    }))
}

pub fn load_technicals(
    config: &dyn ConfigPort,
    symbol: &str,
    rows: usize,
) -> Result<Vec<TechnicalRow>, MarketScoreError> {
    let eval_config = build_evaluation_config(config)?;
    let market = CsvMarketData::new(bars_dir(config)?);
    let series = market.fetch_bars(
        &symbol.trim().to_uppercase(),
        eval_config.start_date,
        eval_config.end_date,
    )?;
    Ok(technical_snapshot(&series, &eval_config.indicators, rows))
}

pub fn value_portfolio(
    config: &dyn ConfigPort,
    holdings_path: &Path,
) -> Result<PortfolioValuation, MarketScoreError> {
    let holdings = read_holdings(holdings_path)?;
    let market = CsvMarketData::new(bars_dir(config)?);
    Ok(value_holdings(&holdings, &market))
}

/// Console alerts by default; `[alerts] console = false` sends them to the log.
pub fn alert_sink(config: &dyn ConfigPort) -> Box<dyn AlertSink> {
    if config.get_bool("alerts", "console", true) {
        Box::new(ConsoleAlertSink::stdout(config.get_bool("alerts", "bell", false)))
    } else {
        Box::new(LogAlertSink)
    }
}

fn workers(config: &dyn ConfigPort) -> usize {
    config.get_int("watch", "workers", 4).max(1) as usize
}

fn opt(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_scored(s: &ScoredSymbol, detailed: bool) {
    println!(
        "{:<12} {}  close {:>10.2}  score {:>5.1} ({})  {}",
        s.symbol, s.as_of, s.last_close, s.score.value, s.score.policy, s.recommendation
    );
    if !detailed {
        return;
    }
    if let Some(f) = &s.fundamentals {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {} | {} | {}",
            text(&f.name),
            text(&f.sector),
            text(&f.industry)
        );
        println!(
            "  PE {}  PB {}  ROE% {}  Div% {}  D/E {}",
            opt(f.pe_ratio),
            opt(f.price_to_book),
            opt(f.roe_pct),
            opt(f.dividend_yield_pct),
            opt(f.debt_to_equity)
        );
    }
    for c in &s.score.contributions {
        println!("  {:+6.1}  {}", c.delta, c.rule);
    }
}

fn print_report(report: &BatchReport, detailed: bool) {
    for s in report.scored() {
        print_scored(s, detailed);
    }
    for (symbol, reason) in report.unavailable() {
        println!("{symbol:<12} unavailable: {reason}");
    }
    for (symbol, err) in report.failed() {
        println!("{symbol:<12} failed: {err}");
    }
    if let Some(mean) = report.mean_score() {
        eprintln!("Mean score: {mean:.1}");
    }
}

fn run_evaluate(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_evaluation_config(&adapter) {
        return fail(&e);
    }

    let sink = alert_sink(&adapter);
    match evaluate_once(&adapter, symbol, sink.as_ref()) {
        Ok(report) => {
            print_report(&report, true);
            if report.scored().count() == 0 && report.failed().count() > 0 {
                ExitCode::from(3)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => fail(&e),
    }
}

/// Cancel `token` once `signal` resolves. The future runs on its own
/// single-threaded runtime so the evaluation loop stays synchronous.
pub fn cancel_when<F>(
    token: CancellationToken,
    signal: F,
) -> Result<thread::JoinHandle<()>, MarketScoreError>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let handle = thread::Builder::new()
        .name("marketscore-signal".into())
        .spawn(move || match runtime.block_on(signal) {
            Ok(()) => {
                tracing::info!("interrupt received, stopping after the current cycle");
                token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "could not listen for interrupts"),
        })?;
    Ok(handle)
}

/// Runs until `--cycles` is reached or Ctrl-C stops it at a cycle boundary.
fn run_watch(config_path: &Path, cycles: Option<u64>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_watch_config(&adapter) {
        return fail(&e);
    }

    let sink = alert_sink(&adapter);
    let token = CancellationToken::new();
    if let Err(e) = cancel_when(token.clone(), tokio::signal::ctrl_c()) {
        tracing::warn!(error = %e, "Ctrl-C will end the process without a clean stop");
    }
    let result = watch(&adapter, sink.as_ref(), &token, cycles, |cycle, report| {
        eprintln!("\n=== Cycle {} ===", cycle + 1);
        print_report(report, false);
    });
    match result {
        Ok(n) => {
            eprintln!("{n} cycles completed");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_technicals(config_path: &Path, symbol: &str, rows: usize) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_evaluation_config(&adapter) {
        return fail(&e);
    }

    let table = match load_technicals(&adapter, symbol, rows) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    if table.is_empty() {
        eprintln!("No price data for {}", symbol.to_uppercase());
        return ExitCode::from(3);
    }

    let p = build_indicator_params(&adapter);
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>8} {:>8} {:>8} {:>8}",
        "date",
        "close",
        format!("SMA_{}", p.overlay_period),
        format!("EMA_{}", p.overlay_period),
        "RSI",
        "MACD",
        "signal",
        "hist"
    );
    for row in &table {
        println!(
            "{:<10} {:>10.2} {:>10} {:>10} {:>8} {:>8} {:>8} {:>8}",
            row.date,
            row.close,
            opt(row.sma),
            opt(row.ema),
            opt(row.rsi),
            opt(row.macd),
            opt(row.macd_signal),
            opt(row.macd_hist)
        );
    }
    ExitCode::SUCCESS
}

fn run_portfolio(config_path: &Path, holdings_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = bars_dir(&adapter) {
        return fail(&e);
    }

    let valuation = match value_portfolio(&adapter, holdings_path) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };
    for row in &valuation.rows {
        match &row.outcome {
            RowOutcome::Priced { price, value } => println!(
                "{:<12} {:>10.2} x {:>10.2} = {:>12.2}",
                row.symbol, row.quantity, price, value
            ),
            RowOutcome::Failed { reason } => {
                println!("{:<12} {:>10.2}   failed: {}", row.symbol, row.quantity, reason)
            }
        }
    }
    println!("Total portfolio value: {:.2}", valuation.total);
    let failed = valuation.failed().count();
    if failed > 0 {
        eprintln!("{failed} holdings could not be priced");
    }
    ExitCode::SUCCESS
}

fn run_sip(monthly: f64, rate: f64, months: u32) -> ExitCode {
    let result = sip::future_value(&SipInput {
        monthly_amount: monthly,
        annual_rate_pct: rate,
        months,
    });
    println!("Invested:     {:.2}", result.invested);
    println!("Future value: {:.2}", result.future_value);
    println!("Gain:         {:.2}", result.gain);
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_watch_config(&adapter) {
        return fail(&e);
    }

    let (eval_config, symbols) = match build_evaluation_config(&adapter)
        .and_then(|c| resolve_symbols(None, &adapter).map(|s| (c, s)))
    {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };
    eprintln!("Config: {}", adapter.source());
    eprintln!("  policy:  {}", eval_config.policy);
    eprintln!(
        "  range:   {} .. {}",
        eval_config.start_date, eval_config.end_date
    );
    eprintln!("  symbols: {}", symbols.join(", "));
    eprintln!("  indicators:");
    for ind in eval_config.indicators.required() {
        eprintln!("    {ind}");
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
