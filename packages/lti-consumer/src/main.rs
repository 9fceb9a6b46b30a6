use anyhow::{Context, bail};
use tracing::info;

use lti_consumer::config::AppConfig;
use lti_consumer::database::init_db;
use lti_consumer::models::LtiConfiguration;
use lti_consumer::utils::endpoints::public_keyset_url;

const USAGE: &str = "usage: lti-consumer keyset <lti-config-id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let lti_config_id: i32 = match args.as_slice() {
        [command, id] if command == "keyset" => id
            .parse()
            .with_context(|| format!("Invalid LTI configuration id: {id}"))?,
        _ => bail!(USAGE),
    };

    let config = AppConfig::load().context("Failed to load config")?;
    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let mut lti_config = LtiConfiguration::find(&db, lti_config_id)
        .await
        .context("Failed to load LTI configuration")?;
    let keyset = lti_config
        .get_public_keyset(&db, &config.keys)
        .await
        .context("Failed to build public keyset")?;

    info!(
        lti_config_id,
        url = %public_keyset_url(&config.lms.base_url, lti_config_id),
        "Public keyset"
    );
    println!("{}", serde_json::to_string_pretty(&keyset)?);
    Ok(())
}
