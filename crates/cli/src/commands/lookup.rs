//! `rekkari lookup` — Resolve one registration from the command line.
//!
//! Useful for verifying the browser pipeline without starting the server.
//! Prints the resolved record as pretty JSON; a failed resolution prints
//! the `found: false` record rather than erroring.

use rekkari_config::AppConfig;
use rekkari_core::VehicleResolver;
use rekkari_lookup::PlateLookup;

pub async fn run(config_path: &str, registration: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path)?;

    let Some(token) = config.lookup.plate_shape.find_in(registration) else {
        return Err(format!("'{registration}' is not a valid registration").into());
    };

    let resolver = PlateLookup::new(config.lookup.clone());
    let record = resolver.resolve(&token).await;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
