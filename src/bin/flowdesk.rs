use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use flowdesk::config::{AppConfig, StorageConfig};
use flowdesk::dsl::loader::load_flow_document_from_yaml;
use flowdesk::{Flow, FlowEditorSession, FlowId, FlowInterpreter, FlowStore, ValidationError};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Manage and test chatbot conversation flows", long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Flow storage file (overrides the config file)
    #[arg(long, global = true)]
    flows: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored flows in creation order
    List,

    /// Create an empty, inactive flow
    Create {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Create a flow from a YAML flow document
    Import {
        /// Path to the flow document
        file: PathBuf,

        /// Activate the imported flow
        #[arg(long)]
        activate: bool,
    },

    /// Print a stored flow as YAML
    Show { id: FlowId },

    /// Make a flow the single active flow
    Activate { id: FlowId },

    /// Delete a flow
    Delete { id: FlowId },

    /// Report structural problems of a flow
    Validate { id: FlowId },

    /// Replay answers through a flow and print the transcript
    Test {
        /// Stored flow to run (defaults to the active flow)
        #[arg(long, conflicts_with = "file")]
        id: Option<FlowId>,

        /// Run a flow document directly instead of a stored flow
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Answers in order
        #[arg(long = "answer", short = 'a')]
        answers: Vec<String>,

        /// Print the transcript as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_flow_line(flow: &Flow) {
    println!(
        "{}  {:<8}  {:>3} questions  {}",
        flow.id,
        flow.status,
        flow.questions.len(),
        flow.name
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.flows {
        config.storage = StorageConfig::Yaml { path };
    }
    init_logging(&config);

    if cli_needs_store(&cli.command) {
        let store = config.open_store().await?;
        return run_store_command(cli.command, &store).await;
    }

    if let Commands::Test {
        file: Some(file),
        answers,
        json,
        ..
    } = cli.command
    {
        let document = load_flow_document_from_yaml(&file)?;
        info!("Loaded flow document: {}", document.name);
        let flow = document.compile()?.into_flow();
        return run_test(&flow, &answers, json);
    }

    Ok(())
}

fn cli_needs_store(command: &Commands) -> bool {
    !matches!(command, Commands::Test { file: Some(_), .. })
}

async fn run_store_command(command: Commands, store: &FlowStore) -> Result<()> {
    match command {
        Commands::List => {
            let flows = store.list().await;
            if flows.is_empty() {
                println!("No flows stored.");
            }
            for flow in &flows {
                print_flow_line(flow);
            }
        }

        Commands::Create { name, description } => {
            let flow = store.create().await?;
            let flow = if name.is_some() || description.is_some() {
                let mut session = FlowEditorSession::open(&flow);
                session.edit_flow_metadata(flowdesk::FlowMetadata { name, description });
                session.save(store).await?.clone()
            } else {
                flow
            };
            print_flow_line(&flow);
        }

        Commands::Import { file, activate } => {
            let document = load_flow_document_from_yaml(&file)?;
            let draft = document.compile()?;

            let created = store.create().await?;
            let mut session = FlowEditorSession::open(&created);
            session.edit_flow_metadata(draft.metadata());
            session.replace_questions(draft.questions);
            let saved = match session.save(store).await {
                Ok(flow) => flow.clone(),
                Err(e) => {
                    // Do not leave an empty placeholder behind.
                    store.delete(created.id).await?;
                    return Err(e.into());
                }
            };
            if activate {
                store.set_active(saved.id).await?;
            }
            info!(flow_id = %saved.id, "Imported {}", file.display());
            print_flow_line(&store.get(saved.id).await?);
        }

        Commands::Show { id } => {
            let flow = store.get(id).await?;
            print!("{}", serde_yaml::to_string(&flow)?);
        }

        Commands::Activate { id } => {
            store.set_active(id).await?;
            println!("Active flow: {}", id);
        }

        Commands::Delete { id } => {
            store.delete(id).await?;
            println!("Deleted flow: {}", id);
        }

        Commands::Validate { id } => {
            let flow = store.get(id).await?;
            match FlowEditorSession::open(&flow).check() {
                Ok(()) => println!("Flow {} is valid.", id),
                Err(ValidationError::Structural(problems)) => {
                    for problem in &problems {
                        println!("- {}", problem);
                    }
                    warn!(flow_id = %id, problems = problems.len(), "Flow has problems");
                }
                Err(e) => {
                    println!("- {}", e);
                    warn!(flow_id = %id, "Flow has problems");
                }
            }
        }

        Commands::Test {
            id, answers, json, ..
        } => {
            let flow = match id {
                Some(id) => store.get(id).await?,
                None => store
                    .active_flow()
                    .await
                    .ok_or_else(|| anyhow!("no flow is active; pass --id or --file"))?,
            };
            run_test(&flow, &answers, json)?;
        }
    }

    Ok(())
}

fn run_test(flow: &Flow, answers: &[String], json: bool) -> Result<()> {
    let mut interpreter = FlowInterpreter::new(flow)?;
    let transcript = interpreter.run(answers);

    if json {
        println!("{}", serde_json::to_string_pretty(transcript)?);
        return Ok(());
    }

    println!("{}", transcript);
    if let Some(question) = interpreter.current_question() {
        println!(
            "awaiting answer to [{}] {} (expected: {})",
            question.id,
            question.text,
            interpreter.expected_answers().join(", ")
        );
    }
    Ok(())
}
