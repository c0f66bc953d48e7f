use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use atelier::api::{BackendClient, DesignService, ProjectService};
use atelier::config::Config;
use atelier::dashboard::{master_report_file_name, ProjectOverview};
use atelier::format::{format_aed, format_number};
use atelier::logging;
use atelier::types::{
    BudgetRange, ComplianceReport, DesignResult, DesignStyle, Estimation, NewProject,
    PropertyType, RoomEntry, TextDesignRequest,
};
use atelier::wizard::{
    report_file_name, DesignWizard, FileResultCache, ResultCache, WizardOptions,
    REPORT_FAILURE_MESSAGE,
};

mod prompts;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Guided interior design requests for the studio backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the effective configuration to .atelier/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Browse and create projects
    Projects {
        #[command(subcommand)]
        action: ProjectsCommand,
    },

    /// Browse clients
    Clients {
        #[command(subcommand)]
        action: ClientsCommand,
    },

    /// Cost estimation for a project
    Estimate {
        #[command(subcommand)]
        action: EstimateCommand,
    },

    /// Generate design concepts
    Design {
        #[command(subcommand)]
        action: DesignCommand,
    },
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// List all projects
    List,

    /// Show one project with its design, compliance and estimate stages
    Show { id: i64 },

    /// Download the master report for a project
    Report {
        id: i64,

        /// Output file (default: MasterReport_<title>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a project
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Owning client id
        #[arg(long)]
        client: Option<i64>,

        #[arg(long)]
        property_type: Option<String>,

        /// Area in square meters
        #[arg(long)]
        area: Option<f64>,

        #[arg(long)]
        location: Option<String>,

        /// Budget in AED
        #[arg(long)]
        budget: Option<f64>,
    },
}

#[derive(Subcommand)]
enum ClientsCommand {
    /// List all clients
    List,
}

#[derive(Subcommand)]
enum EstimateCommand {
    /// Calculate (or recalculate) the estimation for a project
    Calculate { project_id: i64 },

    /// Show the stored estimation for a project
    Show { project_id: i64 },

    /// Expert audit of the stored estimation
    Audit { project_id: i64 },
}

#[derive(Subcommand)]
enum DesignCommand {
    /// Step through the design wizard interactively
    Wizard {
        /// Prefill from this project
        #[arg(short, long)]
        project: Option<i64>,
    },

    /// Generate a design from presets without prompts
    Generate {
        #[arg(long)]
        property_type: PropertyType,

        #[arg(long)]
        style: DesignStyle,

        /// Room as type[:quantity[:area]], repeatable
        #[arg(long = "room", required = true)]
        rooms: Vec<RoomEntry>,

        #[arg(long)]
        budget: BudgetRange,

        /// Additional preferences
        #[arg(long)]
        details: Option<String>,

        /// Link the design to this project
        #[arg(short, long)]
        project: Option<i64>,
    },

    /// Generate a design from a free-text brief
    Text {
        /// Client preferences
        #[arg(long)]
        preferences: String,

        /// Project details; defaults to the linked project's brief
        #[arg(long)]
        details: Option<String>,

        /// Use the higher quality image model
        #[arg(long)]
        pro: bool,

        /// Run a compliance check alongside generation
        #[arg(long)]
        compliance: bool,

        #[arg(short, long)]
        project: Option<i64>,
    },

    /// Check a brief against building regulations
    Compliance {
        #[arg(long)]
        preferences: String,

        #[arg(long)]
        details: String,
    },

    /// Show the last generated design
    Last,

    /// Download the report for the last generated design
    Report {
        /// Output file (default: Design_Report_<date>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // The interactive wizard owns the terminal, so its logs go to a file
    let interactive = matches!(
        cli.command,
        Commands::Design {
            action: DesignCommand::Wizard { .. }
        }
    );
    let logging_handle = logging::init_logging(&config, interactive, cli.debug)?;

    match cli.command {
        Commands::Init { force } => cmd_init(&config, force)?,
        Commands::Projects { action } => cmd_projects(&config, action).await?,
        Commands::Clients { action } => cmd_clients(&config, action).await?,
        Commands::Estimate { action } => cmd_estimate(&config, action).await?,
        Commands::Design { action } => match action {
            DesignCommand::Wizard { project } => {
                let result = match start_wizard(&config, project).await {
                    Ok(wizard) => prompts::run_wizard(wizard).await,
                    Err(e) => Err(e),
                };
                print_session_log(logging_handle.log_file_path);
                result?;
            }
            DesignCommand::Generate {
                property_type,
                style,
                rooms,
                budget,
                details,
                project,
            } => {
                cmd_generate(&config, property_type, style, rooms, budget, details, project)
                    .await?
            }
            DesignCommand::Text {
                preferences,
                details,
                pro,
                compliance,
                project,
            } => cmd_text(&config, preferences, details, pro, compliance, project).await?,
            DesignCommand::Compliance {
                preferences,
                details,
            } => cmd_compliance(&config, preferences, details).await?,
            DesignCommand::Last => cmd_last(&config)?,
            DesignCommand::Report { output } => cmd_report(&config, output).await?,
        },
    }

    Ok(())
}

/// Print the session log path on exit if anything was written
fn print_session_log(log_file_path: Option<PathBuf>) {
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }
}

fn backend(config: &Config) -> Result<BackendClient> {
    BackendClient::from_config(&config.api).context("Failed to create backend client")
}

/// Build a wizard on the configured backend and state directory
async fn start_wizard(config: &Config, project_id: Option<i64>) -> Result<DesignWizard> {
    let client = backend(config)?;
    let cache: Arc<dyn ResultCache> = Arc::new(FileResultCache::from_config(config));
    let design: Arc<dyn DesignService> = Arc::new(client.clone());
    let options = WizardOptions {
        auto_advance: config.wizard.auto_advance,
        project_id,
    };
    Ok(DesignWizard::start(options, design, &client, cache).await)
}

fn cmd_init(config: &Config, force: bool) -> Result<()> {
    let path = Config::local_config_path();
    if path.exists() && !force {
        println!("{} already exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn cmd_projects(config: &Config, action: ProjectsCommand) -> Result<()> {
    let client = backend(config)?;

    match action {
        ProjectsCommand::List => {
            let projects = client
                .list_projects()
                .await
                .context("Failed to list projects")?;
            if projects.is_empty() {
                println!("No projects");
                return Ok(());
            }

            println!("Projects ({})", projects.len());
            println!("{}", "─".repeat(60));
            for project in &projects {
                println!(
                    "{:>4}  {}  [{}]",
                    project.id,
                    project.title,
                    project.status.as_deref().unwrap_or("-")
                );
            }
        }
        ProjectsCommand::Show { id } => {
            let overview = ProjectOverview::load(&client, id)
                .await
                .with_context(|| format!("Failed to load project {id}"))?;
            let project = &overview.project;

            println!("{} (#{})", project.title, project.id);
            println!("{}", "─".repeat(60));
            if let Some(ref description) = project.description {
                println!("  {description}");
            }
            if let Some(ref property_type) = project.property_type {
                println!("  Type:     {property_type}");
            }
            if let Some(ref location) = project.location {
                println!("  Location: {location}");
            }
            if let Some(area) = project.area {
                println!("  Area:     {} sqm", format_number(area));
            }
            if let Some(budget) = project.budget {
                println!("  Budget:   {}", format_aed(budget));
            }
            if let Some(ref status) = project.status {
                println!("  Status:   {status}");
            }
            println!();
            println!("Design brief: {}", project.design_brief());

            println!();
            println!("Stages");
            for (i, (title, status)) in overview.stages().iter().enumerate() {
                println!("  {}. {title:<11}{status}", i + 1);
            }
            println!();
            match overview.design {
                Some(ref design) => println!("Design:   {}", design.title()),
                None => println!("Design:   none yet"),
            }
            match overview.estimation {
                Some(ref estimation) => {
                    println!("Estimate: {}", format_aed(estimation.total_cost))
                }
                None => println!("Estimate: none yet"),
            }
        }
        ProjectsCommand::Report { id, output } => {
            let path = match output {
                Some(path) => path,
                None => {
                    let project = client
                        .get_project(id)
                        .await
                        .with_context(|| format!("Failed to load project {id}"))?;
                    PathBuf::from(master_report_file_name(&project.title))
                }
            };
            let bytes = client
                .project_master_report(id)
                .await
                .with_context(|| format!("Failed to download master report for project {id}"))?;
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved master report to {}", path.display());
        }
        ProjectsCommand::Create {
            name,
            description,
            client: client_id,
            property_type,
            area,
            location,
            budget,
        } => {
            let new_project = NewProject {
                name,
                description,
                client_id,
                property_type,
                area,
                location,
                budget,
            };
            let project = client
                .create_project(&new_project)
                .await
                .context("Failed to create project")?;
            println!("Created project #{}: {}", project.id, project.title);
        }
    }

    Ok(())
}

async fn cmd_clients(config: &Config, action: ClientsCommand) -> Result<()> {
    let client = backend(config)?;

    match action {
        ClientsCommand::List => {
            let clients = client
                .list_clients()
                .await
                .context("Failed to list clients")?;
            if clients.is_empty() {
                println!("No clients");
                return Ok(());
            }

            println!("Clients ({})", clients.len());
            println!("{}", "─".repeat(60));
            for c in &clients {
                let company = c.company.as_deref().unwrap_or("");
                let segment = c.segment.as_deref().unwrap_or("-");
                println!("{:>4}  {}  {}  [{}]", c.id, c.name, company, segment);
                if let Some(ref email) = c.email {
                    println!("      {email}");
                }
            }
        }
    }

    Ok(())
}

async fn cmd_estimate(config: &Config, action: EstimateCommand) -> Result<()> {
    let client = backend(config)?;

    match action {
        EstimateCommand::Calculate { project_id } => {
            let estimation = client
                .calculate_estimation(project_id)
                .await
                .with_context(|| format!("Failed to calculate estimation for project {project_id}"))?;
            print_estimation(&estimation);
        }
        EstimateCommand::Show { project_id } => {
            match client
                .project_estimation(project_id)
                .await
                .with_context(|| format!("Failed to load estimation for project {project_id}"))?
            {
                Some(estimation) => print_estimation(&estimation),
                None => println!(
                    "No estimation for project {project_id} yet (run 'atelier estimate calculate {project_id}')"
                ),
            }
        }
        EstimateCommand::Audit { project_id } => {
            let audit = client
                .audit_estimation(project_id)
                .await
                .with_context(|| format!("Failed to audit estimation for project {project_id}"))?;

            println!("Estimation audit for project {project_id}");
            println!("{}", "─".repeat(60));
            println!("{}", audit.expert_insight);
            if !audit.risk_factors.is_empty() {
                println!();
                println!("Risk factors:");
                for risk in &audit.risk_factors {
                    println!("  - {risk}");
                }
            }
            println!();
            println!(
                "Buffer:         {}% ({})",
                format_number(audit.buffer_percent),
                format_aed(audit.buffer_amount)
            );
            println!("Adjusted total: {}", format_aed(audit.adjusted_total));
        }
    }

    Ok(())
}

fn print_estimation(estimation: &Estimation) {
    println!("Estimated total: {}", format_aed(estimation.total_cost));
    println!("{}", "─".repeat(60));
    println!("  Materials:  {}", format_aed(estimation.materials_cost));
    println!("  Labor:      {}", format_aed(estimation.labor_cost));
    println!("  Additional: {}", format_aed(estimation.additional_cost));

    let categories = estimation.categories.entries();
    if !categories.is_empty() {
        println!();
        for (label, cost) in categories {
            println!("  {label:<12}{}", format_aed(cost));
        }
    }
    if let Some(ref status) = estimation.status {
        println!();
        println!("Status: {status}");
    }
    if let Some(ref valid_until) = estimation.valid_until {
        println!("Valid until: {valid_until}");
    }
    if !estimation.assumptions.is_empty() {
        println!();
        println!("Assumptions:");
        for assumption in &estimation.assumptions {
            println!("  - {assumption}");
        }
    }
}

async fn cmd_generate(
    config: &Config,
    property_type: PropertyType,
    style: DesignStyle,
    rooms: Vec<RoomEntry>,
    budget: BudgetRange,
    details: Option<String>,
    project: Option<i64>,
) -> Result<()> {
    // With --project the draft is already linked and carries the project brief
    let mut wizard = start_wizard(config, project).await?;

    wizard.select_property_type(property_type);
    wizard.select_style(style);
    for room in rooms {
        wizard.add_room(room);
    }
    wizard.set_budget(budget);
    if let Some(details) = details {
        wizard.set_details(details);
    }

    println!("Generating {} {} design...", style.label(), property_type.label());
    let result = wizard.generate().await?;
    print_result(&result);
    Ok(())
}

async fn cmd_text(
    config: &Config,
    preferences: String,
    details: Option<String>,
    pro: bool,
    compliance: bool,
    project: Option<i64>,
) -> Result<()> {
    let mut wizard = start_wizard(config, project).await?;
    let brief = wizard.brief_mut();
    brief.client_preferences = preferences;
    if let Some(details) = details {
        brief.project_details = details;
    }
    brief.use_pro_for_image = pro;
    brief.check_compliance = compliance;

    if wizard.brief().project_details.is_empty() {
        bail!("Project details are required (pass --details or --project)");
    }

    println!("Generating design from brief...");
    let result = wizard.generate_from_text().await?;
    print_result(&result);
    Ok(())
}

async fn cmd_compliance(config: &Config, preferences: String, details: String) -> Result<()> {
    let client = backend(config)?;
    let request = TextDesignRequest {
        client_preferences: preferences,
        project_details: details,
        ..TextDesignRequest::default()
    };
    let report = client
        .validate_compliance(&request)
        .await
        .context("Compliance check failed")?;
    print_compliance(&report);
    Ok(())
}

fn cmd_last(config: &Config) -> Result<()> {
    let cache = FileResultCache::from_config(config);
    let Some(record) = cache.load()? else {
        println!("No design generated yet");
        return Ok(());
    };

    if let Some(saved_at) = record.saved_at {
        println!("Generated {}", saved_at.format("%Y-%m-%d %H:%M UTC"));
    }
    print_result(&record.result);
    Ok(())
}

async fn cmd_report(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let wizard = start_wizard(config, None).await?;
    let path = output.unwrap_or_else(|| {
        PathBuf::from(report_file_name(chrono::Local::now().date_naive()))
    });

    match wizard
        .save_report(&path)
        .await
        .context(REPORT_FAILURE_MESSAGE)?
    {
        Some(path) => println!("Saved report to {}", path.display()),
        None => println!("No design generated yet"),
    }
    Ok(())
}

fn print_result(result: &DesignResult) {
    println!();
    println!("{}", result.title());
    println!("{}", "─".repeat(60));
    println!("{}", result.description);
    if let Some(ref colors) = result.color_scheme {
        println!();
        println!("Colors: {colors}");
    }
    if let Some(ref url) = result.image_url {
        println!("Image:  {url}");
    }
    if let Some(ref rooms) = result.rooms_designs {
        println!();
        for room in rooms {
            println!(
                "  {} x{} ({} sqm): {}",
                room.room_type,
                room.quantity,
                format_number(room.area),
                room.description
            );
        }
    }
    if let Some(ref compliance) = result.compliance_report {
        if let Ok(report) = serde_json::from_value::<ComplianceReport>(compliance.clone()) {
            println!();
            print_compliance(&report);
        }
    }
}

fn print_compliance(report: &ComplianceReport) {
    println!("Compliance: {}", report.status);
    for issue in report.issue_lines() {
        println!("  - {issue}");
    }
    if let Some(ref recommendation) = report.recommendation {
        println!("Recommendation: {recommendation}");
    }
    if let Some(ref reason) = report.reason {
        println!("({reason})");
    }
}
