use anyhow::Context;
use apartment_hunter::utils::error::{ErrorSeverity, HunterError};
use apartment_hunter::utils::{logger, validation::Validate};
use apartment_hunter::{AppConfig, CliArgs, EtlEngine, HunterPipeline, LocalStorage};
use clap::Parser;
use std::process::Command;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🏠 Starting apartment-hunter");

    // 載入配置並套用命令列覆蓋
    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    if args.dry_run {
        display_config_summary(&config, &args);
        return Ok(());
    }

    if !args.demo {
        if let Err(e) = config.require_api_keys() {
            tracing::error!("❌ No API keys configured");
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Set RENTCAST_API_KEY and/or RAPIDAPI_KEY, or run with --demo to test with sample data.");
            std::process::exit(1);
        }
    }

    let storage = LocalStorage::new(config.output.output_dir.clone());
    let dashboard_file = storage.full_path(&config.output.dashboard_filename);
    let pipeline = HunterPipeline::new(storage, config, args.demo);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(Some(_)) => {
            println!("✅ Dashboard ready: {}", dashboard_file);
            if args.open {
                if let Err(e) = open_in_browser(&dashboard_file) {
                    tracing::warn!("⚠️ Could not open browser: {:#}", e);
                }
            }
        }
        Ok(None) => {
            println!("⚠️ No listings found. Try --demo to test the dashboard.");
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn fail(e: &HunterError) -> ! {
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

fn display_config_summary(config: &AppConfig, args: &CliArgs) {
    let search = &config.search;

    println!("📋 Configuration Summary:");
    println!("  Search: {}BR in {}, {}", search.bedrooms, search.city, search.state);
    println!(
        "  Price: {} - {}",
        search.min_price.map_or("any".to_string(), |p| format!("${}", p)),
        search.max_price.map_or("any".to_string(), |p| format!("${}", p))
    );
    println!("  Output: {}", config.output.output_dir);
    println!("  Dashboard limit: {}", config.output.max_dashboard_listings);
    println!("  New listing window: {} days", config.output.new_listing_days);
    println!(
        "  Link verification: {}",
        if config.fetch.verify_links { "on" } else { "off" }
    );
    println!(
        "  Keys: RentCast {}, RapidAPI {}",
        if config.keys.rentcast.is_empty() { "missing" } else { "set" },
        if config.keys.rapidapi.is_empty() { "missing" } else { "set" }
    );

    println!("  Weights:");
    for (name, weight) in config.scoring.entries() {
        println!("    {:<20} {:.2}", name, weight);
    }

    if args.demo {
        println!("  🎭 DEMO MODE");
    }
    println!("  🔍 DRY RUN MODE ENABLED - nothing fetched or written");
}

fn open_in_browser(path: &str) -> anyhow::Result<()> {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", "", path]).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    }
    .with_context(|| format!("failed to launch a browser for {}", path))?;

    anyhow::ensure!(status.success(), "browser command exited with {}", status);
    Ok(())
}
