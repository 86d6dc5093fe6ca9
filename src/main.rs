//! ComplyTime CLI entrypoint.
//!
//! This is the main entrypoint for the complytime command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use complytime::cli::{Cli, Commands, OutputFormatter};
use complytime::config::{ConfigParser, ScopeConfig, ScopeConfigValidator, find_config_file};
use complytime::error::{ComplyTimeError, PlanError, Result};
use complytime::oscal::{AssessmentPlan, ComponentDefinition};
use complytime::planner::{
    ComponentDefinitionSynthesizer, StructuralValidator, TailoringPipeline, available_frameworks,
    scope_config_from_definitions, tailor_plan,
};
use complytime::scope::{AssessmentScope, ScopeReport, TracingObserver};
use complytime::workspace::{
    ApplicationDirectory, LocalWorkspace, PlanStore, find_component_definitions,
};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.debug);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Plan {
            framework_id,
            dry_run,
            load_config,
        } => {
            cmd_plan(
                &cli.workspace,
                cli.bundle_dir.as_deref(),
                &framework_id,
                dry_run,
                load_config,
                &formatter,
            )
            .await
        }
        Commands::Tailor { config } => {
            cmd_tailor(&cli.workspace, config.as_deref(), &formatter).await
        }
        Commands::Validate { warnings } => cmd_validate(&cli.workspace, warnings, &formatter).await,
        Commands::List => cmd_list(cli.bundle_dir.as_deref(), &formatter).await,
    }
}

/// Generate an assessment plan.
async fn cmd_plan(
    workspace_dir: &Path,
    bundle_dir: Option<&Path>,
    framework_id: &str,
    dry_run: bool,
    load_config: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let definitions = load_definitions(bundle_dir).await?;

    if dry_run {
        let config = scope_config_from_definitions(framework_id, &definitions)?;
        emit(&ConfigParser::to_yaml(&config)?)?;
        return Ok(());
    }

    let scope = if load_config {
        let config = load_scope_config(workspace_dir, None)?;
        let result = ScopeConfigValidator::new()
            .expect_framework(framework_id)
            .validate(&config)?;
        for warning in &result.warnings {
            warn!("{warning}");
        }
        Some(AssessmentScope::from(&config))
    } else {
        None
    };

    let pipeline = TailoringPipeline::new(ComponentDefinitionSynthesizer::new(), StructuralValidator::new());
    let mut report = ScopeReport::new();
    let mut plan = pipeline.run(
        &definitions,
        framework_id,
        scope.as_ref(),
        &mut (TracingObserver, &mut report),
    )?;

    if scope.is_some() {
        emit(&formatter.format_scope_report(&report))?;
    }

    plan.metadata.touch();
    let workspace = LocalWorkspace::new(workspace_dir);
    let lock = workspace.acquire_lock("").await?;
    let saved = workspace.save(&plan).await;
    workspace.release_lock(&lock.lock_id).await?;
    saved?;

    eprintln!(
        "{}",
        formatter.success(&format!(
            "Assessment plan written to {}",
            workspace.plan_path().display()
        ))
    );
    Ok(())
}

/// Tailor the workspace plan to a scope configuration.
async fn cmd_tailor(
    workspace_dir: &Path,
    config_path: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_scope_config(workspace_dir, config_path)?;
    let result = ScopeConfigValidator::new().validate(&config)?;
    for warning in &result.warnings {
        warn!("{warning}");
    }
    let scope = AssessmentScope::from(&config);

    let workspace = LocalWorkspace::new(workspace_dir);
    let lock = workspace.acquire_lock("").await?;
    let tailored = tailor_locked(&workspace, &scope).await;
    workspace.release_lock(&lock.lock_id).await?;
    let report = tailored?;

    emit(&formatter.format_scope_report(&report))?;
    eprintln!(
        "{}",
        formatter.success(&format!(
            "Assessment plan tailored to {} control(s) of {}",
            scope.include_controls().len(),
            scope.framework_id()
        ))
    );
    Ok(())
}

/// Loads, scopes and rewrites the plan while the workspace lock is held.
async fn tailor_locked(workspace: &LocalWorkspace, scope: &AssessmentScope) -> Result<ScopeReport> {
    let mut plan: AssessmentPlan = workspace.require_plan().await?;

    let mut report = ScopeReport::new();
    tailor_plan(
        &StructuralValidator::new(),
        &mut plan,
        scope,
        &mut (TracingObserver, &mut report),
    )?;

    plan.metadata.touch();
    workspace.save(&plan).await?;
    Ok(report)
}

/// Validate the workspace plan.
async fn cmd_validate(
    workspace_dir: &Path,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let workspace = LocalWorkspace::new(workspace_dir);
    let plan = workspace.require_plan().await?;
    info!("Validating assessment plan: {}", workspace.plan_path().display());

    let report = StructuralValidator::new().inspect(&plan);
    emit(&formatter.format_validation(&report, show_warnings))?;

    match report.errors.first() {
        Some(first) => Err(ComplyTimeError::Plan(PlanError::validation(
            first.message.clone(),
            first.path.clone(),
        ))),
        None => Ok(()),
    }
}

/// List available frameworks.
async fn cmd_list(bundle_dir: Option<&Path>, formatter: &OutputFormatter) -> Result<()> {
    let definitions = load_definitions(bundle_dir).await?;
    emit(&formatter.format_frameworks(&available_frameworks(&definitions)))?;
    Ok(())
}

/// Loads component definitions from the bundle directory.
async fn load_definitions(bundle_dir: Option<&Path>) -> Result<Vec<ComponentDefinition>> {
    let app_dir = match bundle_dir {
        Some(dir) => ApplicationDirectory::with_bundle_dir(dir),
        None => ApplicationDirectory::new(true)?,
    };
    debug!("Using application directory: {}", app_dir.root().display());
    debug!("Using bundle directory: {}", app_dir.bundle_dir().display());

    find_component_definitions(app_dir.bundle_dir()).await
}

/// Loads the scope configuration, applying `.env` and environment overrides.
fn load_scope_config(workspace_dir: &Path, config_path: Option<&Path>) -> Result<ScopeConfig> {
    let parser = ConfigParser::new().with_base_path(workspace_dir);
    parser.load_dotenv()?;

    let path: PathBuf = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file(workspace_dir)?,
    };
    parser.load_with_env(std::path::absolute(path)?)
}

/// Writes command output to stdout.
fn emit(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
