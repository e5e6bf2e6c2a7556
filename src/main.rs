use clap::Parser;

use archopinion::cli::Cli;
use archopinion::pipeline::{AnalysisOrchestrator, GeminiClient};
use archopinion::provider::StaticPolicyProvider;
use archopinion::store::GeminiFileStore;
use archopinion::{config, workflow};

fn main() {
    archopinion::init_tracing();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let client = match GeminiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let store = match GeminiFileStore::from_env() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    tracing::info!(model = client.model(), "Using model");
    if !client.test_connection() {
        eprintln!("Cannot connect to the model endpoint. Please check your API key.");
        return 1;
    }

    let output_dir = cli.output_dir.clone().unwrap_or_else(config::output_dir);
    let input = cli.into_session_input();
    let orchestrator = AnalysisOrchestrator::with_defaults(Box::new(client));

    match workflow::run_session(&store, &StaticPolicyProvider, &orchestrator, input, &output_dir) {
        Ok(report_path) => {
            println!("Analysis complete. Report saved to {}", report_path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}
