use courier_server::{Config, MarketStorage, init_logger_with_file, print_banner, run_quick_audit};

fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, config, logging)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    print_banner();

    // 2. Open the marketplace database
    std::fs::create_dir_all(&config.work_dir)?;
    let db_path = config.db_path();
    tracing::info!(db = %db_path.display(), "Running quick audit");
    let storage = MarketStorage::open(&db_path)?;

    // 3. Run the reconciliation battery and report
    let report = run_quick_audit(&storage)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.passed() {
        tracing::error!("Audit FAILED");
        std::process::exit(1);
    }
    tracing::info!("Audit passed");
    Ok(())
}
