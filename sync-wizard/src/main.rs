use std::process::ExitCode;

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    args.iter()
        .find_map(|a| a.strip_prefix(prefix.as_str()))
}

fn print_usage() {
    eprintln!("Usage: sync-wizard [MODE]");
    eprintln!();
    eprintln!("  (default)                      interactive sync wizard");
    eprintln!("  --service=<name>               open the wizard for one integration");
    eprintln!("  --edit=<sync_id>               update an existing sync instead of creating");
    eprintln!("  --dashboard --from=<unix> --to=<unix>");
    eprintln!("                                 print aggregate contact counts");
    eprintln!("  --rewards=<year> [--partner=<id>] [--master]");
    eprintln!("                                 print partner reward rows");
    eprintln!("  --export-leads=<id,id,...> [--out=<path>]");
    eprintln!("                                 download the leads CSV export");
    eprintln!("  --tui-smoke[=page]             render one frame and exit (CI)");
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific page and exits 0.
    // Usage: --tui-smoke or --tui-smoke=service|filter|destination|mapping|saving|complete
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        return report(sync_wizard::run_tui_smoke(target));
    }

    if args.iter().any(|a| a == "--dashboard") {
        let from = flag_value(&args, "--from").and_then(|v| v.parse::<i64>().ok());
        let to = flag_value(&args, "--to").and_then(|v| v.parse::<i64>().ok());
        let (Some(from), Some(to)) = (from, to) else {
            eprintln!("--dashboard requires --from=<unix> and --to=<unix>");
            return ExitCode::from(2);
        };
        return report(sync_wizard::run_dashboard(from, to));
    }

    if let Some(year) = flag_value(&args, "--rewards") {
        let Ok(year) = year.parse::<i32>() else {
            eprintln!("--rewards expects a year, got: {}", year);
            return ExitCode::from(2);
        };
        let partner = flag_value(&args, "--partner").unwrap_or("");
        let is_master = args.iter().any(|a| a == "--master");
        return report(sync_wizard::run_rewards(year, partner, is_master));
    }

    if let Some(ids) = flag_value(&args, "--export-leads") {
        let leads_ids: Vec<String> = ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let out = flag_value(&args, "--out");
        return report(sync_wizard::run_export_leads(&leads_ids, out));
    }

    // Default: the interactive wizard.
    let service = flag_value(&args, "--service");
    let edit = flag_value(&args, "--edit");
    report(sync_wizard::run_wizard(service, edit))
}

fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sync-wizard: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
