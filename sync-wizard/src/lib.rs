// Adflow Sync Wizard
// Main library entry point

pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod tui;
pub mod utils;
pub mod wizard;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::info;

use api::ApiClient;
use config::AppConfig;
use wizard::service::ServiceKind;

/// Initialize logging system with dual format (JSON + human-readable)
fn init_logging(with_stdout: bool) -> Result<()> {
    let log_dir = utils::path_resolver::resolve_log_folder()?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("sync-wizard-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("sync-wizard-{}.txt", timestamp));

    // Dual-format logging:
    // - JSON format to .log file
    // - Human-readable format to .txt file
    // - Optional: human-readable to stdout (disabled for TUI to avoid
    //   corrupting the terminal UI)
    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?;
    Ok(rt.block_on(future))
}

fn build_client() -> Result<ApiClient> {
    let cfg = AppConfig::load()?;
    Ok(ApiClient::new(&cfg))
}

/// Interactive wizard TUI. Create mode unless `edit_sync_id` is given.
pub fn run_wizard(service: Option<&str>, edit_sync_id: Option<&str>) -> Result<()> {
    // Logging is file-only here so the terminal stays clean for the TUI.
    init_logging(false)?;
    info!(
        "[PHASE: initialization] Sync wizard starting at {}",
        chrono::Utc::now()
    );

    let kind = match service {
        Some(s) => Some(
            ServiceKind::parse(s)
                .ok_or_else(|| anyhow!("Unknown service: {} (try e.g. slack, google_ads)", s))?,
        ),
        None => None,
    };

    let client = build_client()?;

    // Plan-limit gate applies to new syncs only.
    if edit_sync_id.is_none() {
        let limit_reached = block_on(client.check_limit_reached())?
            .context("Failed to check the sync limit")?;
        if limit_reached {
            anyhow::bail!(
                "Your plan's sync limit is reached. Remove an existing sync or upgrade to add another."
            );
        }
    }

    tui::run(client, kind, edit_sync_id.map(str::to_string))
}

/// Print aggregate contact counts for a unix-seconds date range.
pub fn run_dashboard(from_date: i64, to_date: i64) -> Result<()> {
    init_logging(true)?;
    utils::validation::validate_date_range(from_date, to_date).map_err(|e| anyhow!(e))?;

    let client = build_client()?;
    let counts = block_on(client.contact_counts(from_date, to_date))?
        .context("Failed to fetch contact counts")?;

    let mut rows: Vec<_> = counts.total_counts.iter().collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    println!("Contact counts ({} - {}):", from_date, to_date);
    for (kind, count) in rows {
        println!("  {:<20} {}", kind, count);
    }
    Ok(())
}

/// Print the reward rows for one partner year.
pub fn run_rewards(year: i32, partner_id: &str, is_master: bool) -> Result<()> {
    init_logging(true)?;

    let client = build_client()?;
    let rows = block_on(client.rewards_history(year, partner_id, is_master))?
        .context("Failed to fetch rewards history")?;

    if rows.is_empty() {
        println!("No rewards recorded for {}.", year);
        return Ok(());
    }
    println!("{:<12} {:>10} {:>12}  {}", "Month", "Referred", "Amount", "Status");
    for row in rows {
        println!(
            "{:<12} {:>10} {:>12.2}  {}",
            row.month.as_deref().unwrap_or("-"),
            row.referred_customers,
            row.amount,
            row.status.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Download the CSV export for the given lead ids.
pub fn run_export_leads(leads_ids: &[String], out: Option<&str>) -> Result<()> {
    init_logging(true)?;
    if leads_ids.is_empty() {
        anyhow::bail!("No lead ids given (use --export-leads=<id,id,...>)");
    }

    let client = build_client()?;
    let bytes = block_on(client.download_leads(leads_ids))?
        .context("Failed to download the leads export")?;

    let path = match out {
        Some(p) => PathBuf::from(p),
        None => {
            let stamp = chrono::Local::now().format("%Y-%m-%d-%H%M%S");
            utils::path_resolver::resolve_run_folder()?.join(format!("leads-{}.csv", stamp))
        }
    };
    let mut file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(&bytes)?;

    info!(
        "[PHASE: export] [STEP: write] Wrote {} bytes to {:?}",
        bytes.len(),
        path
    );
    println!("Exported {} lead(s) to {}", leads_ids.len(), path.display());
    Ok(())
}

/// Non-interactive TUI smoke test mode (for automated checks).
/// Renders a single frame for a specific page and exits.
pub fn run_tui_smoke(target: Option<String>) -> Result<()> {
    init_logging(false)?;
    tui::smoke(target.as_deref().unwrap_or("service"))
}
