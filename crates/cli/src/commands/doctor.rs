//! `locas doctor` — Diagnose configuration and connectivity.

use locas_config::AppConfig;
use locas_providers::ProviderSet;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Locas Doctor — System Diagnostics");
    println!("=================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ⚠️  No config file at {} — using defaults", config_path.display());
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            return Ok(());
        }
    };

    println!("     completion: {} ({})", config.completion.provider, config.completion.model);
    println!("     default radius: {} m", config.maps.default_radius);
    println!("     session backend: {:?}, ttl {}s", config.session.backend, config.session.ttl_secs);

    if config.has_completion_key() {
        println!("  ✅ Completion API key configured");
    } else {
        println!("  ❌ No completion API key — set OPENAI_API_KEY");
        issues += 1;
    }

    if config.maps.usable_api_key().is_some() {
        println!("  ✅ Maps API key configured");
    } else {
        println!("  ⚠️  No maps API key — place and environment data will be empty, geocoding uses Nominatim only");
        issues += 1;
    }

    let store = locas_session::build_store(&config.session);
    if store.ping().await {
        println!("  ✅ Session store reachable ({})", store.name());
    } else {
        println!("  ❌ Session store unreachable ({})", store.name());
        issues += 1;
    }

    if config.has_completion_key() {
        let providers = ProviderSet::from_config(&config)?;
        match providers.completion.health_check().await {
            Ok(true) => println!("  ✅ Completion provider reachable"),
            Ok(false) => {
                println!("  ❌ Completion provider unhealthy");
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Completion provider check failed: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
