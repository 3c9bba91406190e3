use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "attrition-cli")]
#[command(about = "Query CLI for the attrition prediction API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// List known employee identifiers
    Employees,
    /// Run a prediction for one employee
    Predict {
        #[arg(short, long)]
        id: i64,
    },
    /// Sample recent audit rows
    Logs {
        #[arg(short, long, default_value = "api_log")]
        table: String,
        #[arg(short, long, default_value_t = 10)]
        n: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Employees => {
            let res = client
                .get(format!("{}/employee_list", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Predict { id } => {
            let res = client
                .get(format!("{}/predict", cli.url))
                .query(&[("id_employee", id)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Logs { table, n } => {
            let res = client
                .get(format!("{}/log_sample", cli.url))
                .query(&[("table", table.as_str()), ("n", &n.to_string())])
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
