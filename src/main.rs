//! VoiceShield CLI
//!
//! Usage:
//!   voiceshield --text "your text here"       # Score one utterance
//!   voiceshield --interactive                 # Simulated call (caller: / receiver:)
//!   voiceshield --serve                       # HTTP API server
//!   voiceshield --text "text" --json          # JSON output

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use voiceshield::core::{
    catalog, load_settings, run_server, CallEngine, CallSession, FraudAnalyzer, HistoryStore,
    RiskScorer, HISTORY_FILE, SETTINGS_FILE,
};
use voiceshield::types::{
    CallEvent, CallLog, CallState, RiskAssessment, Speaker, ToneSignals, TurnOutcome,
};
use voiceshield::{FALLBACK_DELAY_MS, VERSION};

lazy_static! {
    static ref RE_SPEAKER: Regex =
        Regex::new(r"(?i)^\s*(caller|receiver|c|r)\s*:\s*(.*)$").unwrap();
}

#[derive(Parser, Debug)]
#[command(
    name = "voiceshield",
    version = VERSION,
    about = "VoiceShield - Real-time fraud risk scoring for phone calls",
    long_about = "VoiceShield scores a live call transcript for scam tactics.\n\n\
                  Every caller line is matched against a keyword catalog; a\n\
                  remote model (or a local fallback) refines the score.\n\n\
                  Modes:\n  \
                  --interactive  Simulated call (prefix lines with caller: / receiver:)\n  \
                  --serve        HTTP API server mode\n  \
                  --text         Score a single utterance\n\n\
                  States:\n  \
                  IDLE         - No call\n  \
                  ACTIVE       - Call in progress\n  \
                  ALERT_RAISED - High risk, user prompted\n  \
                  ENDED        - Call logged to history"
)]
struct Args {
    /// Text to score (single mode)
    #[arg(short, long)]
    text: Option<String>,

    /// Interactive call simulation - read lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show pattern breakdown and debug logs
    #[arg(long)]
    verbose: bool,

    /// Directory for history.json and settings.json
    #[arg(long, default_value = "./voiceshield-data")]
    data_dir: PathBuf,

    /// Guardian contact to notify on critical risk (overrides settings)
    #[arg(long)]
    guardian: Option<String>,

    /// Remote analysis API key (overrides settings and GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Simulated latency of the local fallback analysis
    #[arg(long, default_value_t = FALLBACK_DELAY_MS)]
    fallback_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Some(ref text) = args.text {
        run_single(text, &args);
        return;
    }

    let session = match build_session(&args) {
        Ok(session) => Arc::new(session),
        Err(e) => {
            error!("failed to open data dir {}: {}", args.data_dir.display(), e);
            std::process::exit(1);
        }
    };

    if args.serve {
        run_serve(&args, session).await;
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args, session).await;
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "voiceshield=debug" } else { "voiceshield=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wire settings, history and analyzer from the data dir and flags
fn build_session(args: &Args) -> Result<CallSession, voiceshield::error::StoreError> {
    let settings_path = args.data_dir.join(SETTINGS_FILE);
    let mut settings = load_settings(&settings_path)?;
    if let Some(ref contact) = args.guardian {
        settings.guardian_contact = Some(contact.clone());
    }
    if let Some(ref key) = args.api_key {
        settings.gemini_api_key = Some(key.clone());
    }

    let history = HistoryStore::open(args.data_dir.join(HISTORY_FILE))?;
    let analyzer =
        FraudAnalyzer::new().with_fallback_delay(Duration::from_millis(args.fallback_delay_ms));

    Ok(CallSession::new(CallEngine::new(history), Arc::new(analyzer), settings)
        .with_settings_path(settings_path))
}

// =============================================================================
// SINGLE
// =============================================================================

#[derive(Serialize)]
struct SingleOutput<'a> {
    assessment: &'a RiskAssessment,
    tone: ToneSignals,
}

/// Score one utterance from a zero baseline
fn run_single(text: &str, args: &Args) {
    let scorer = RiskScorer::new();
    let assessment = scorer.score(text, 0);
    let tone = scorer.detect_tone(text);

    if args.json {
        let out = SingleOutput { assessment: &assessment, tone };
        match serde_json::to_string_pretty(&out) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("failed to encode output: {}", e),
        }
        return;
    }

    println!(
        "{} risk={} | trust={} | labels={}",
        if assessment.score > 0 { "🟠" } else { "🟢" },
        assessment.score,
        CallState::trust_for(assessment.score),
        if assessment.is_empty() {
            "-".to_string()
        } else {
            assessment.detected_labels.join(", ")
        }
    );

    if args.verbose {
        print_breakdown(text);
    }
    if tone.is_urgent {
        println!("{}", "  ! urgent tone".yellow());
    }
    if tone.is_threatening {
        println!("{}", "  ! threatening language".red());
    }
}

/// Per-pattern contribution table
fn print_breakdown(text: &str) {
    let lower = text.to_lowercase();
    println!("┌──────────────────────────────────────────────");
    for pattern in catalog::patterns() {
        let hit = pattern.matches(&lower);
        let mark = if hit { "x" } else { " " };
        let line = format!(
            "│ [{}] {:<20} +{:<3} {}",
            mark, pattern.id, pattern.risk_increment, pattern.category
        );
        if hit {
            println!("{}", line.bold());
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!("└──────────────────────────────────────────────");
}

// =============================================================================
// INTERACTIVE
// =============================================================================

/// Split "caller: text" into speaker and text
fn parse_speaker_prefix(line: &str) -> Option<(Speaker, &str)> {
    let caps = RE_SPEAKER.captures(line)?;
    let speaker = Speaker::parse(caps.get(1)?.as_str())?;
    Some((speaker, caps.get(2)?.as_str().trim()))
}

async fn run_interactive(args: &Args, session: Arc<CallSession>) {
    print_header("Call Simulation");
    println!("Prefix each line with caller: or receiver: (c: / r: also work)");
    println!("Example: caller: This is your bank calling about your account");
    println!("Commands: ignore | end | start | reset | history | quit");
    println!();

    let mut updates = session.subscribe();
    print_outcome(&session.start_call().await, args);
    drain(&mut updates);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let snapshot = session.snapshot().await;
        let prompt = format!(
            "{} [{} | risk={}] > ",
            snapshot.phase.emoji(),
            snapshot.phase,
            snapshot.state.current_risk_score
        );
        let prompt = prompt.color(snapshot.phase.color()).to_string();
        let _ = stdout.write_all(prompt.as_bytes()).await;
        let _ = stdout.flush().await;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("stdin read failed: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" => {
                if let Some(log) = session.end_call().await {
                    print_log(&log);
                }
                break;
            }
            "ignore" => {
                print_outcome(&session.ignore_alert().await, args);
                drain(&mut updates);
                continue;
            }
            "end" => {
                session.settle().await;
                match session.end_call().await {
                    Some(log) => print_log(&log),
                    None => println!("{}", "No live call. Type 'start' to begin.".yellow()),
                }
                drain(&mut updates);
                continue;
            }
            "start" => {
                print_outcome(&session.start_call().await, args);
                drain(&mut updates);
                continue;
            }
            "reset" => {
                print_outcome(&session.reset().await, args);
                drain(&mut updates);
                continue;
            }
            "history" => {
                print_history(&session.history().await);
                continue;
            }
            _ => {}
        }

        let Some((speaker, text)) = parse_speaker_prefix(line) else {
            let hint = "⚠ Please prefix with caller: or receiver: (e.g., 'caller: Hello')";
            println!("{}", hint.yellow());
            continue;
        };

        let out = session.append_turn(speaker, text).await;
        print_outcome(&out, args);

        if out.has(CallEvent::V002_TURN_SCORED) {
            session.settle().await;
            print_analyses(&mut updates, args);
            if args.verbose {
                if let Some(analysis) = session.snapshot().await.state.last_analysis {
                    println!("  {} {}", "analysis:".dimmed(), analysis.reasoning);
                }
            }
        } else {
            drain(&mut updates);
        }
    }
}

/// Discard broadcast copies of outcomes already printed
fn drain(updates: &mut broadcast::Receiver<TurnOutcome>) {
    while updates.try_recv().is_ok() {}
}

/// Print merged analyses; everything else on the channel was already shown
fn print_analyses(updates: &mut broadcast::Receiver<TurnOutcome>, args: &Args) {
    while let Ok(update) = updates.try_recv() {
        if update.has(CallEvent::V002_ANALYSIS_MERGED)
            || update.has(CallEvent::V002_ANALYSIS_BELOW_SCORE)
        {
            print_outcome(&update, args);
        }
    }
}

fn print_header(mode: &str) {
    println!("{}", "══════════════════════════════════════════".bold());
    println!("{}", format!("  VoiceShield v{} - {}", VERSION, mode).bold());
    println!("{}", "══════════════════════════════════════════".bold());
    println!();
}

fn print_outcome(out: &TurnOutcome, args: &Args) {
    if args.json {
        match serde_json::to_string(out) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("failed to encode output: {}", e),
        }
        return;
    }

    if args.no_color {
        println!("{}", out.to_parseable_string());
    } else {
        println!("{}", out.to_terminal_string());
    }

    if let Some(assessment) = &out.assessment {
        if !assessment.is_empty() {
            println!("  {}", assessment.detected_labels.join(" · ").dimmed());
        }
    }

    for event in &out.events {
        match event {
            CallEvent::V003_CAUTION_CROSSED | CallEvent::V003_CRITICAL_CROSSED => {
                if let Some(whisper) = &out.whisper_message {
                    println!("  {}", whisper.yellow().bold());
                }
            }
            CallEvent::V004_GUARDIAN_NOTIFIED => {
                println!("  {}", "✉ Guardian notified".cyan());
            }
            CallEvent::V004_REPORT_FILED => {
                println!("  {}", "⚑ Cyber-cell report filed".cyan());
            }
            CallEvent::V005_ALERT_RAISED => {
                println!(
                    "  {}",
                    "⚠ HIGH RISK - hang up, or type 'ignore' to continue".red().bold()
                );
            }
            _ => {}
        }
    }
}

fn print_log(log: &CallLog) {
    println!();
    println!("{}", format!("Call logged: {}", log.id).bold());
    println!(
        "  {} {} | {}s | risk={} | lines={}",
        log.date,
        log.time,
        log.duration_seconds,
        log.risk_score,
        log.transcript.len()
    );
    if log.has_known_category() {
        println!("  category: {}", log.scam_category.as_deref().unwrap_or_default());
    }
    if let Some(report) = &log.cyber_cell_report_id {
        println!("  cyber-cell report: {}", report);
    }
    if let Some(analysis) = &log.analysis {
        println!("  verdict: {:?} ({}/10)", analysis.classification, analysis.emotional_risk_score);
    }
    println!();
}

fn print_history(history: &[CallLog]) {
    if history.is_empty() {
        println!("No calls logged yet.");
        return;
    }
    for log in history {
        let line = format!(
            "{} {}  risk={:<3} {}",
            log.date,
            log.time,
            log.risk_score,
            log.scam_category.as_deref().unwrap_or("-")
        );
        if log.alert_triggered {
            println!("{}", line.red());
        } else {
            println!("{}", line.green());
        }
    }
}

// =============================================================================
// SERVE
// =============================================================================

async fn run_serve(args: &Args, session: Arc<CallSession>) {
    println!();
    println!("{}", "══════════════════════════════════════════".bold());
    println!("{}", "  VoiceShield API Server".bold());
    println!("  Version: {}", VERSION);
    println!("  Data: {}", args.data_dir.display());
    println!("{}", "══════════════════════════════════════════".bold());
    println!();

    if let Err(e) = run_server(&args.addr, session).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
