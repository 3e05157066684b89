// fluidize/src/main.rs

use clap::{Parser, Subcommand};

use comfy_table::Table;

// Domain types the CLI assembles from arguments
use fluidize_core::Fluidize;
use fluidize_core::domain::graph::{GraphEdge, GraphNode};
use fluidize_core::domain::project::ProjectSummary;
use fluidize_core::domain::run::{RunFlowPayload, RunStatus};

#[derive(Parser)]
#[command(name = "fluidize")]
#[command(about = "Local simulation graph engine: projects, DAGs and containerized runs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 📁 Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// 🔷 Manage graph nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// 🔗 Manage graph edges
    Edge {
        #[command(subcommand)]
        command: EdgeCommands,
    },

    /// 🕸️  Show a project's graph
    Graph {
        /// Project id
        #[arg(long, short)]
        project: String,
    },

    /// 📚 List the local simulation template library
    Sims,

    /// 🚀 Start a run (executes the whole graph in topological order)
    Run {
        /// Project id
        #[arg(long, short)]
        project: String,

        /// Run name
        #[arg(long, default_value = "")]
        name: String,

        /// Run description
        #[arg(long, default_value = "")]
        description: String,

        /// Tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Per-node timeout in seconds, forwarded to the container runtime
        #[arg(long)]
        timeout: Option<u64>,

        /// Block until the run finishes and report its final status
        #[arg(long)]
        wait: bool,
    },

    /// 📜 List a project's runs
    Runs {
        /// Project id
        #[arg(long, short)]
        project: String,
    },

    /// 🩺 Show the status of one run
    Status {
        run_number: u32,

        /// Project id
        #[arg(long, short)]
        project: String,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Create (or update) a project
    Create {
        id: String,

        #[arg(long, default_value = "")]
        label: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "active")]
        status: String,
    },

    /// List all projects
    List,

    /// Delete a project and everything beneath it
    Delete { id: String },
}

#[derive(Subcommand)]
enum NodeCommands {
    /// Insert a node, materializing its workspace
    Add {
        id: String,

        /// Project id
        #[arg(long, short)]
        project: String,

        #[arg(long, default_value = "")]
        label: String,

        /// Simulation template to clone the workspace from
        #[arg(long, default_value = "")]
        simulation: String,

        #[arg(long, default_value = "0.0")]
        x: f64,

        #[arg(long, default_value = "0.0")]
        y: f64,
    },

    /// Remove a node (cascades its edges, removes its workspace)
    Rm {
        id: String,

        /// Project id
        #[arg(long, short)]
        project: String,
    },
}

#[derive(Subcommand)]
enum EdgeCommands {
    /// Connect two nodes
    Add {
        id: String,

        /// Project id
        #[arg(long, short)]
        project: String,

        #[arg(long)]
        source: String,

        #[arg(long)]
        target: String,
    },

    /// Remove an edge
    Rm {
        id: String,

        /// Project id
        #[arg(long, short)]
        project: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug fluidize run ... for the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = Fluidize::new()?;

    match cli.command {
        // --- USE CASE: PROJECTS ---
        Commands::Project { command } => match command {
            ProjectCommands::Create {
                id,
                label,
                description,
                status,
            } => {
                let project = ProjectSummary::new(&id)
                    .with_label(label)
                    .with_description(description)
                    .with_status(status);
                client.projects().upsert(project)?;
                println!("✨ Project '{id}' ready");
            }
            ProjectCommands::List => {
                let projects = client.projects().list()?;
                let mut table = Table::new();
                table.set_header(vec!["ID", "LABEL", "STATUS"]);
                for project in &projects {
                    table.add_row(vec![&project.id, &project.label, &project.status]);
                }
                println!("{table}");
                println!("📁 {} project(s)", projects.len());
            }
            ProjectCommands::Delete { id } => {
                if let Err(e) = client.projects().delete(&id) {
                    eprintln!("❌ Delete failed: {e}");
                    std::process::exit(1);
                }
                println!("🗑️  Project '{id}' removed");
            }
        },

        // --- USE CASE: NODES ---
        Commands::Node { command } => match command {
            NodeCommands::Add {
                id,
                project,
                label,
                simulation,
                x,
                y,
            } => {
                let handle = client.project(&project)?;
                let mut node = GraphNode::new(&id, label).at(x, y);
                if !simulation.is_empty() {
                    node = node.with_simulation(simulation);
                }
                if let Err(e) = handle.graph().insert_node(node) {
                    eprintln!("❌ Node insert failed: {e}");
                    std::process::exit(1);
                }
                println!("🔷 Node '{id}' added to '{project}'");
            }
            NodeCommands::Rm { id, project } => {
                client.project(&project)?.graph().delete_node(&id)?;
                println!("🗑️  Node '{id}' removed");
            }
        },

        // --- USE CASE: EDGES ---
        Commands::Edge { command } => match command {
            EdgeCommands::Add {
                id,
                project,
                source,
                target,
            } => {
                let handle = client.project(&project)?;
                let edge = GraphEdge::new(&id, source, target);
                if let Err(e) = handle.graph().upsert_edge(edge) {
                    eprintln!("❌ Edge insert failed: {e}");
                    std::process::exit(1);
                }
                println!("🔗 Edge '{id}' added");
            }
            EdgeCommands::Rm { id, project } => {
                client.project(&project)?.graph().delete_edge(&id)?;
                println!("🗑️  Edge '{id}' removed");
            }
        },

        // --- USE CASE: SHOW GRAPH ---
        Commands::Graph { project } => {
            let handle = client.project(&project)?;
            let data = handle.graph().get_graph();

            let mut nodes = Table::new();
            nodes.set_header(vec!["NODE", "LABEL", "SIMULATION"]);
            for node in &data.nodes {
                nodes.add_row(vec![&node.id, &node.data.label, &node.data.simulation_id]);
            }
            println!("{nodes}");

            let mut edges = Table::new();
            edges.set_header(vec!["EDGE", "SOURCE", "TARGET"]);
            for edge in &data.edges {
                edges.add_row(vec![&edge.id, &edge.source, &edge.target]);
            }
            println!("{edges}");
            println!(
                "🕸️  {} node(s), {} edge(s)",
                data.nodes.len(),
                data.edges.len()
            );
        }

        // --- USE CASE: TEMPLATE LIBRARY ---
        Commands::Sims => {
            let templates = client.simulations()?;
            let mut table = Table::new();
            table.set_header(vec!["ID", "LABEL", "DESCRIPTION"]);
            for template in &templates {
                table.add_row(vec![
                    template.id.clone(),
                    template.label.clone().unwrap_or_default(),
                    template.description.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
            println!("📚 {} template(s)", templates.len());
        }

        // --- USE CASE: START RUN ---
        Commands::Run {
            project,
            name,
            description,
            tags,
            timeout,
            wait,
        } => {
            let handle = client.project(&project)?;
            let mut runs = handle.runs();
            if let Some(secs) = timeout {
                runs = runs.with_node_deadline(std::time::Duration::from_secs(secs));
            }
            let payload = RunFlowPayload {
                name,
                description,
                tags,
            };

            match runs.run_flow(payload).await {
                Ok(response) => {
                    println!(
                        "🚀 Run {} started (status: {})",
                        response.run_number, response.flow_status
                    );
                    if wait {
                        runs.wait(response.run_number).await;
                        let finished = runs.get_status(response.run_number)?;
                        match finished.status {
                            RunStatus::Completed => {
                                println!("✨ Run {} completed", response.run_number)
                            }
                            _ => {
                                eprintln!(
                                    "❌ Run {} {}: {}",
                                    response.run_number,
                                    finished.status,
                                    finished.message.unwrap_or_default()
                                );
                                std::process::exit(1);
                            }
                        }
                    }
                }
                Err(e) => {
                    eprintln!("💥 Run failed to start: {e}");
                    std::process::exit(1);
                }
            }
        }

        // --- USE CASE: LIST RUNS ---
        Commands::Runs { project } => {
            let handle = client.project(&project)?;
            let runs = handle.runs();

            let mut table = Table::new();
            table.set_header(vec!["RUN", "NAME", "STATUS", "CREATED"]);
            let numbers = runs.list()?;
            for number in &numbers {
                match runs.get_status(*number) {
                    Ok(metadata) => {
                        table.add_row(vec![
                            number.to_string(),
                            metadata.name,
                            metadata.status.to_string(),
                            metadata.created_at,
                        ]);
                    }
                    Err(_) => {
                        table.add_row(vec![number.to_string(), String::new(), "?".into(), String::new()]);
                    }
                }
            }
            println!("{table}");
            println!("📜 {} run(s)", numbers.len());
        }

        // --- USE CASE: RUN STATUS ---
        Commands::Status {
            run_number,
            project,
        } => {
            let handle = client.project(&project)?;
            match handle.runs().get_status(run_number) {
                Ok(metadata) => {
                    println!("run_{run_number}: {}", metadata.status);
                    if let Some(message) = metadata.message {
                        println!("   {message}");
                    }
                }
                Err(e) => {
                    eprintln!("❌ No status for run_{run_number}: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let args = Cli::parse_from(["fluidize", "run", "--project", "p1"]);
        match args.command {
            Commands::Run {
                project,
                name,
                tags,
                wait,
                ..
            } => {
                assert_eq!(project, "p1");
                assert_eq!(name, "");
                assert!(tags.is_empty());
                assert!(!wait);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_node_add() {
        let args = Cli::parse_from([
            "fluidize", "node", "add", "n1", "--project", "p1", "--simulation", "heat-2d",
            "--x", "10.5",
        ]);
        match args.command {
            Commands::Node {
                command:
                    NodeCommands::Add {
                        id,
                        project,
                        simulation,
                        x,
                        y,
                        ..
                    },
            } => {
                assert_eq!(id, "n1");
                assert_eq!(project, "p1");
                assert_eq!(simulation, "heat-2d");
                assert_eq!(x, 10.5);
                assert_eq!(y, 0.0);
            }
            _ => panic!("Expected Node Add command"),
        }
    }

    #[test]
    fn test_cli_parse_run_tags_repeat() {
        let args = Cli::parse_from([
            "fluidize", "run", "--project", "p1", "--tag", "demo", "--tag", "ci", "--wait",
        ]);
        match args.command {
            Commands::Run { tags, wait, .. } => {
                assert_eq!(tags, vec!["demo", "ci"]);
                assert!(wait);
            }
            _ => panic!("Expected Run command"),
        }
    }
}
