use anyhow::Result;
use clap::Parser;
use colored::*;

use testing_tools::api_client::ApiClient;
use testing_tools::auth::{login, UserCredentials};
use testing_tools::output::print_test_summary;
use testing_tools::scenarios;
use testing_tools::sse_client::Connection;

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "Appointment notification end-to-end testing tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:8080)
    #[arg(long)]
    base_url: String,

    /// Admin credentials (format: email:password)
    #[arg(long)]
    admin: String,

    /// Customer credentials (format: email:password)
    #[arg(long)]
    customer: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Open both streams and wait for the connected marker
    ConnectionTest,
    /// Admin updates a customer's appointment; only the customer is notified
    StatusUpdate,
    /// Two customer streams both receive the same status change
    MultiDevice,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let admin_creds = UserCredentials::parse(&cli.admin)?;
    let customer_creds = UserCredentials::parse(&cli.customer)?;

    println!("{} Authenticating users...", "→".blue());
    let client = reqwest::Client::new();
    let admin = login(&client, &cli.base_url, &admin_creds).await?;
    let customer = login(&client, &cli.base_url, &customer_creds).await?;

    if !admin.is_admin {
        anyhow::bail!(
            "{} is not an admin; add it to ADMIN_EMAILS and restart the server",
            admin.credentials.email
        );
    }

    println!("{} Admin authenticated (ID: {})", "✓".green(), admin.user_id);
    println!(
        "{} Customer authenticated (ID: {})",
        "✓".green(),
        customer.user_id
    );

    let api_client = ApiClient::new(client.clone(), cli.base_url.clone());

    println!("\n{} Establishing SSE connections...", "→".blue());
    let mut admin_sse =
        Connection::establish(&cli.base_url, &admin.token, "Admin".to_string()).await?;
    let mut customer_sse =
        Connection::establish(&cli.base_url, &customer.token, "Customer".to_string()).await?;

    let mut results = Vec::new();
    results.push(scenarios::test_connection(&mut admin_sse, &mut customer_sse).await?);

    if matches!(cli.scenario, ScenarioChoice::StatusUpdate | ScenarioChoice::All) {
        results.push(
            scenarios::test_status_update(
                &admin,
                &customer,
                &api_client,
                &mut admin_sse,
                &mut customer_sse,
            )
            .await?,
        );
    }

    if matches!(cli.scenario, ScenarioChoice::MultiDevice | ScenarioChoice::All) {
        results.push(
            scenarios::test_multi_device(
                &cli.base_url,
                &admin,
                &customer,
                &api_client,
                &mut customer_sse,
            )
            .await?,
        );
    }

    print_test_summary(&results);

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}
