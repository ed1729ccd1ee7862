//! Configuration for cfdix.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::{Deserialize, Serialize};

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/cfdi-extract.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Command line arguments for cfdix.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    name = "cfdix",
    about = "Extract CFDI 4.0 XML invoices into a spreadsheet-ready table",
    long_about = "Extract CFDI 4.0 XML invoices into a spreadsheet-ready table.\n\n\
        Walks the given directory recursively, parses every .xml document it\n\
        finds, labels each invoice with an expense type taken from its folder\n\
        name, prints a sorted grid and copies a tab-separated payload to the\n\
        clipboard for pasting into a spreadsheet. Invoices that fail to parse\n\
        show up as blank rows and are listed in cfdi-extract.log.\n\n\
        The default directory can be persisted with --save and lives in\n\
        ~/.config/cfdi-extract.toml."
)]
pub struct Args {
    /// Optional input directory containing CFDI XML files
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub path: Option<PathBuf>,

    /// Also write an Excel workbook
    #[arg(short, long)]
    pub excel: bool,

    /// Optional output path for the Excel workbook (default is the input directory)
    #[arg(short, long, name = "OUTPUT_PATH", requires = "excel")]
    pub output: Option<String>,

    /// Only print the table without copying to the clipboard
    #[arg(short, long)]
    pub print: bool,

    /// Save the resolved directory as the default for future runs
    #[arg(short, long)]
    pub save: bool,

    /// Print verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// User configuration from the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CfdixConfig {
    /// Default directory scanned when no path argument is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
    /// Print verbose output.
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UserConfig {
    #[serde(default)]
    cfdix: CfdixConfig,
}

impl CfdixConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> Result<Self> {
        let Some(path) = CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow!("Failed to read config file {}: {error}", path.display())),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.cfdix)
            .map_err(|e| anyhow!("Failed to parse config: {e}"))
    }

    /// Serialize this config to the TOML layout of the config file.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml_string(self) -> Result<String> {
        toml::to_string(&UserConfig { cfdix: self }).map_err(|e| anyhow!("Failed to serialize config: {e}"))
    }

    /// Persist the given directory as the default working directory,
    /// keeping the other values already stored in the config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be written.
    pub fn save_working_directory(directory: &Path) -> Result<()> {
        let Some(path) = CONFIG_PATH.as_deref() else {
            anyhow::bail!("Failed to determine config file location");
        };

        let mut config = Self::get_user_config().unwrap_or_default();
        config.working_directory = Some(directory.to_path_buf());
        let content = config.to_toml_string()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    /// Root directory scanned for invoice documents.
    pub input_dir: PathBuf,
    /// Also write an Excel workbook.
    pub excel: bool,
    /// Output path for the Excel workbook.
    pub output_path: PathBuf,
    /// Only print the table without copying to the clipboard.
    pub print: bool,
    /// Save the resolved directory as the default for future runs.
    pub save: bool,
    /// Print verbose output.
    pub verbose: bool,
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the input directory cannot be resolved.
    pub fn from_args(args: &Args) -> Result<Self> {
        Self::from_args_and_config(args, &CfdixConfig::get_user_config()?)
    }

    /// Create config from given command line args and explicit user config.
    /// This is useful for testing without reading from the config file.
    ///
    /// # Errors
    /// Returns an error if the input directory does not exist or is not a directory.
    pub fn from_args_and_config(args: &Args, user_config: &CfdixConfig) -> Result<Self> {
        // CLI path takes priority over the persisted default directory.
        let requested = args.path.as_deref().or(user_config.working_directory.as_deref());
        let input_dir = crate::resolve_input_path(requested)?;
        if !input_dir.is_dir() {
            anyhow::bail!("Input path is not a directory: '{}'", input_dir.display());
        }
        let output_path = crate::resolve_output_path(args.output.as_deref(), &input_dir);

        // Boolean flags: CLI true overrides config, otherwise use config value
        let verbose = args.verbose || user_config.verbose;

        Ok(Self {
            input_dir,
            excel: args.excel,
            output_path,
            print: args.print,
            save: args.save,
            verbose,
        })
    }
}
