use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use school_docs::service::today;
use school_docs::{
    CliArgs, CompanyId, DocumentCode, DocumentRegistry, DocumentService, EngineConfig,
    EngineError, LoggingConfig, StudentId, init_logging,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "school-docs",
    about = "Generate school documents and exchange company surveys as spreadsheets",
    version
)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every registered document for a student as one zip archive
    Generate {
        #[arg(long)]
        student: String,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Generate a single document
    Document {
        #[arg(long)]
        student: String,
        #[arg(long)]
        code: DocumentCode,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Export the survey form for a company
    SurveyExport {
        #[arg(long)]
        company: String,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Read a returned survey form and print it as JSON
    SurveyImport {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Write placeholder templates for every registered document
    ScaffoldTemplates {
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = match init_logging(LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<EngineError>() {
                Some(engine) => eprintln!("{}", engine.report()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::from_args(cli.args)?;

    if let Command::ScaffoldTemplates { out } = &cli.command {
        let dir = out.clone().unwrap_or_else(|| config.template_dir.clone());
        let registry = DocumentRegistry::standard()?;
        let written = school_docs::templates::scaffold_directory(&registry, &dir)?;
        println!("{}", serde_json::to_string_pretty(&written)?);
        return Ok(());
    }

    config.validate()?;
    let service = Arc::new(DocumentService::from_config(&config)?);
    let issued_on = config.issued_on.unwrap_or_else(today);

    match cli.command {
        Command::Generate { student, out } => {
            let set = service
                .generate_document_set_async(StudentId::new(student), issued_on)
                .await?;
            let dir = out.unwrap_or_else(|| config.output_dir.clone());
            let path = write_output(&dir, &set.archive_name, &set.archive)?;
            let summary = json!({
                "archive": path,
                "manifest": set.manifest,
                "failures": set.failures,
                "summary": set.summary,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Document { student, code, out } => {
            let document = service.generate_document(&StudentId::new(student), code, issued_on)?;
            let dir = out.unwrap_or_else(|| config.output_dir.clone());
            let path = write_output(&dir, &document.file_name, &document.content)?;
            let summary = json!({
                "file": path,
                "mappings": document.report,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::SurveyExport { company, out } => {
            let company = CompanyId::parse(&company)
                .with_context(|| format!("invalid company id {company:?}"))?;
            let bytes = service.build_survey_form_async(company, issued_on).await?;
            let path = config.resolve_output(&out);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, bytes).with_context(|| format!("failed to write {:?}", path))?;
            println!("{}", path.display());
        }
        Command::SurveyImport { file } => {
            let bytes = fs::read(&file).with_context(|| format!("failed to read {:?}", file))?;
            let parsed = service.parse_survey_form_async(bytes).await?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::ScaffoldTemplates { .. } => {}
    }
    Ok(())
}

fn write_output(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {:?}", dir))?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).with_context(|| format!("failed to write {:?}", path))?;
    Ok(path)
}
