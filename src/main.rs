use acore_loot_audit::{
    cli::{Cli, Commands, ReportArgs},
    config::{LevelBand, ScanParams, BATCH_BANDS},
    report::{format_report, ReportWriter},
    scan::Scanner,
    source::DataSource,
    ui::{ConsoleUi, Phase, SilentUi, Ui},
};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose, cli.quiet);

    if cli.quiet {
        run(cli.command, &mut SilentUi::new())
    } else {
        run(cli.command, &mut ConsoleUi::new())
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,acore_loot_audit={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, ui: &mut impl Ui) -> Result<()> {
    let start = Instant::now();

    match command {
        Commands::Scan {
            source,
            min_level,
            max_level,
            report,
        } => {
            let band = LevelBand::new(min_level, max_level)?;

            ui.set_phase(Phase::Connecting);
            let mut db = source.open().context("Failed to open world database")?;
            let writer = ReportWriter::new(&report.out_dir)
                .with_context(|| format!("Failed to create {:?}", report.out_dir))?;

            scan_band(db.as_mut(), &report.params(band), &report, &writer, ui)?;
        }

        Commands::Batch { source, report } => {
            let bands = BATCH_BANDS
                .iter()
                .map(|&(min, max)| LevelBand::new(min, max))
                .collect::<Result<Vec<_>, _>>()?;

            ui.set_phase(Phase::Connecting);
            let mut db = source.open().context("Failed to open world database")?;
            let writer = ReportWriter::new(&report.out_dir)
                .with_context(|| format!("Failed to create {:?}", report.out_dir))?;

            for band in bands {
                scan_band(db.as_mut(), &report.params(band), &report, &writer, ui)?;
            }
        }

        Commands::Resolve { source } => {
            ui.set_phase(Phase::Connecting);
            let db = source.open().context("Failed to open world database")?;

            ui.set_phase(Phase::ResolvingReferences);
            let closure = Scanner::new(db)
                .resolve_references()
                .context("Failed to resolve reference loot tables")?;

            for (table, reached) in closure.sorted() {
                let reached: Vec<String> = reached.iter().map(|id| id.to_string()).collect();
                println!("RLT {} -> {}", table, reached.join(", "));
            }
            println!("\n{} reference tables link to other tables", closure.len());
        }
    }

    ui.set_phase(Phase::Complete);
    println!("Run complete in {:.2} secs.", start.elapsed().as_secs_f64());
    Ok(())
}

fn scan_band(
    db: &mut dyn DataSource,
    params: &ScanParams,
    args: &ReportArgs,
    writer: &ReportWriter,
    ui: &mut impl Ui,
) -> Result<()> {
    let violations = Scanner::new(db)
        .run(params, ui)
        .with_context(|| format!("Scan of level band {} failed", params.band))?;

    ui.set_phase(Phase::Writing);
    let report = format_report(&violations, params.generate_sql);
    let written = writer
        .write(params.band, params.direction(), &report, &violations, args.json)
        .context("Failed to write report")?;

    println!(
        "Level {} ({}level): {} violations across {} NPC/reference table pairs",
        params.band,
        params.direction(),
        violations.len(),
        report.entries
    );
    for path in written {
        println!("  Data written to {:?}", path);
    }

    Ok(())
}
