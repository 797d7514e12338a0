//! `rekkari doctor` — Diagnose configuration and environment.

use std::path::Path;

use rekkari_config::AppConfig;

pub async fn run(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Rekkari Doctor — Diagnostics");
    println!("===============================\n");

    let mut issues = 0;

    if Path::new(config_path).exists() {
        println!("  ✅ Config file found at {config_path}");
    } else {
        println!("  ⚠️  No config file at {config_path} — using defaults");
    }

    match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Configuration valid");

            if config.provider.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
                println!("  ✅ Completion-service API key configured");
            } else {
                println!("  ⚠️  No API key — set REKKARI_API_KEY or OPENAI_API_KEY");
                issues += 1;
            }

            println!("  ✅ Lookup site: {}", config.lookup.base_url);
            println!(
                "  ✅ Plate shape: {} letters + {} digits",
                config.lookup.plate_shape.letters, config.lookup.plate_shape.digits
            );
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    if chromium_available() {
        println!("  ✅ Chromium/Chrome binary found");
    } else {
        println!("  ❌ No Chromium/Chrome binary on PATH — vehicle lookups will fail");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

fn chromium_available() -> bool {
    let candidates = [
        "chromium",
        "chromium-browser",
        "google-chrome",
        "google-chrome-stable",
        "chrome",
    ];
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path)
        .any(|dir| candidates.iter().any(|name| dir.join(name).is_file()))
}
