use crate::model::SchoolProfile;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_TEMPLATE_DIR: &str = "templates";
const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub template_dir: PathBuf,
    pub records_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub school: SchoolProfile,
    /// Fixed issue date; today when unset.
    pub issued_on: Option<NaiveDate>,
}

impl EngineConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            template_dir: cli_template_dir,
            records: cli_records,
            output_dir: cli_output_dir,
            issued_on: cli_issued_on,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            template_dir: file_template_dir,
            records: file_records,
            output_dir: file_output_dir,
            issued_on: file_issued_on,
            school: file_school,
        } = file_config;

        // Paths from a config file are relative to the file itself.
        let base = config
            .as_ref()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let from_file = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };

        let template_dir = cli_template_dir
            .or(file_template_dir.map(from_file))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIR));
        let records_file = cli_records.or(file_records.map(from_file));
        let output_dir = cli_output_dir
            .or(file_output_dir.map(from_file))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let issued_on = cli_issued_on.or(file_issued_on);

        let school = file_school.unwrap_or_default();
        anyhow::ensure!(
            !school.name.trim().is_empty(),
            "school name must not be empty"
        );

        Ok(Self {
            template_dir,
            records_file,
            output_dir,
            school,
            issued_on,
        })
    }

    /// Fails fast on inputs every generation or export needs.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.template_dir.is_dir(),
            "template directory {:?} does not exist or is not a directory",
            self.template_dir
        );
        let records = self
            .records_file
            .as_ref()
            .context("no records file configured (use --records or `records:` in the config)")?;
        anyhow::ensure!(
            records.is_file(),
            "records file {:?} does not exist",
            records
        );
        Ok(())
    }

    pub fn resolve_output<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.output_dir.join(relative)
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "SCHOOL_DOCS_TEMPLATE_DIR",
        value_name = "DIR",
        help = "Directory holding the document templates",
        global = true
    )]
    pub template_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "SCHOOL_DOCS_RECORDS",
        value_name = "FILE",
        help = "Student, company and case records (YAML or JSON)",
        global = true
    )]
    pub records: Option<PathBuf>,

    #[arg(
        long,
        env = "SCHOOL_DOCS_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory generated files are written to",
        global = true
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "SCHOOL_DOCS_ISSUED_ON",
        value_name = "YYYY-MM-DD",
        help = "Issue date printed on documents (defaults to today)",
        global = true
    )]
    pub issued_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    template_dir: Option<PathBuf>,
    records: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    issued_on: Option<NaiveDate>,
    school: Option<SchoolProfile>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
