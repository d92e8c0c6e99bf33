//! Claimgraph CLI: generate record batches and analyze them from the command line

use clap::{Parser, Subcommand};
use claimgraph::view::LayoutRequest;
use claimgraph::{
    AnalyzerConfig, FraudAnalyzer, NodeId, RecordBatch, RiskFilter, SuspiciousPatterns,
};
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "claimgraph", version, about = "Fraud relationship-graph analyzer")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "CLAIMGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for every random draw
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    /// Layout request for the filtered view, sized by the configured forces
    Layout,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic record batch as JSON
    Generate {
        #[arg(long)]
        policies: Option<usize>,
        #[arg(long)]
        claims: Option<usize>,
        #[arg(long)]
        agents: Option<usize>,
        #[arg(long)]
        third_parties: Option<usize>,

        /// Write the batch here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Build, score and analyze a batch (synthetic when no input is given)
    Analyze {
        /// Record batch JSON produced by `generate` or exported from real data
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Risk threshold of the graph view: all, medium or high
        #[arg(long, default_value = "all")]
        threshold: RiskFilter,

        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Generate {
            policies,
            claims,
            agents,
            third_parties,
            output,
        } => {
            let mut config = config;
            let generation = &mut config.generation;
            generation.policies = policies.unwrap_or(generation.policies);
            generation.claims = claims.unwrap_or(generation.claims);
            generation.agents = agents.unwrap_or(generation.agents);
            generation.third_parties = third_parties.unwrap_or(generation.third_parties);
            run_generate(config, cli.seed, output.as_deref())
        }
        Commands::Analyze {
            input,
            threshold,
            format,
        } => run_analyze(config, cli.seed, input.as_deref(), threshold, &format),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(AnalyzerConfig::load(path)?),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn run_generate(
    config: AnalyzerConfig,
    seed: u64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = FraudAnalyzer::try_new(config)?;
    let batch = analyzer.generate(&mut StdRng::seed_from_u64(seed));
    let json = serde_json::to_string_pretty(&batch)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Wrote {} records to {}", batch.total_records(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_analyze(
    config: AnalyzerConfig,
    seed: u64,
    input: Option<&Path>,
    threshold: RiskFilter,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = FraudAnalyzer::try_new(config)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let analysis = match input {
        Some(path) => {
            let batch: RecordBatch = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            info!("Loaded {} records from {}", batch.total_records(), path.display());
            analyzer.analyze(&batch, &mut rng)?
        }
        None => analyzer.analyze_synthetic(&mut rng)?,
    };
    let report = analysis.report(threshold);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Layout => {
            let request = LayoutRequest::from_view(&report.view, analyzer.force_config());
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        OutputFormat::Table => {
            let stats = &report.statistics;
            println!(
                "Graph:   {} nodes, {} edges ({} policies, {} claims, {} agents, {} third parties)",
                stats.node_count,
                stats.edge_count,
                stats.policies,
                stats.claims,
                stats.agents,
                stats.third_parties
            );
            println!(
                "View:    {} nodes, {} edges at threshold '{}'",
                report.view.nodes.len(),
                report.view.edges.len(),
                report.filter
            );
            print_patterns(&report.patterns);
        }
    }
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(", ")
}

fn location_cell(location: &Option<String>) -> String {
    location.clone().unwrap_or_else(|| "-".to_string())
}

fn print_patterns(patterns: &SuspiciousPatterns) {
    println!("\nSuspicious third parties");
    let mut table = new_table(&["Id", "Subtype", "Claims", "Risk", "Location"]);
    for tp in &patterns.suspicious_third_parties {
        table.add_row(vec![
            tp.id.to_string(),
            tp.subtype.clone(),
            tp.claim_connections.to_string(),
            format!("{:.2}", tp.risk_score),
            location_cell(&tp.location),
        ]);
    }
    println!("{}", table);

    println!("\nAgent clusters");
    let mut table = new_table(&["Agent", "Policies", "Claims", "Avg claim", "Risk", "Location", "Specialty"]);
    for agent in &patterns.agent_clusters {
        table.add_row(vec![
            agent.agent_id.to_string(),
            agent.policy_count.to_string(),
            agent.claim_count.to_string(),
            format!("{:.0}", agent.average_claim_amount),
            format!("{:.2}", agent.risk_score),
            location_cell(&agent.location),
            agent.specialty.clone(),
        ]);
    }
    println!("{}", table);

    println!("\nLocation risk");
    let mut table = new_table(&[
        "Location", "Agents", "Policies", "Claims", "Third parties", "High risk", "Avg risk",
    ]);
    for location in &patterns.location_risks {
        table.add_row(vec![
            location.location.clone(),
            location.agents.to_string(),
            location.policies.to_string(),
            location.claims.to_string(),
            location.third_parties.to_string(),
            location.high_risk_nodes.to_string(),
            format!("{:.2}", location.average_risk),
        ]);
    }
    println!("{}", table);

    println!("\nAmount anomalies");
    let mut table = new_table(&["Claim", "Amount", "Type", "Z-score", "Location"]);
    for anomaly in &patterns.amount_anomalies {
        table.add_row(vec![
            anomaly.claim_id.to_string(),
            format!("{:.2}", anomaly.amount),
            anomaly.claim_type.clone(),
            format!("{:.2}", anomaly.z_score),
            location_cell(&anomaly.location),
        ]);
    }
    println!("{}", table);

    println!("\nPolicies with repeated claims");
    let mut table = new_table(&["Policy", "Claims", "Total claimed", "Risk"]);
    for policy in &patterns.policy_claim_patterns {
        table.add_row(vec![
            policy.policy_id.to_string(),
            policy.claim_count.to_string(),
            format!("{:.2}", policy.total_claimed),
            format!("{:.2}", policy.risk_score),
        ]);
    }
    println!("{}", table);

    println!("\nFraud rings");
    let mut table = new_table(&["Agents", "Third parties", "Edges", "Total weight", "Avg risk"]);
    for ring in &patterns.fraud_rings {
        table.add_row(vec![
            join_ids(&ring.agents),
            join_ids(&ring.third_parties),
            ring.edge_count.to_string(),
            format!("{:.1}", ring.total_weight),
            format!("{:.2}", ring.average_risk),
        ]);
    }
    println!("{}", table);
}
