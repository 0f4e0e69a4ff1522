use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// CLI arguments for the sarlz binary.
#[derive(Parser, Debug)]
#[command(
    name = "sarlz",
    version,
    about = "Resolve inherited actions and synthesize default-value overloads of SARL types"
)]
pub struct CliArgs {
    /// Path to sarlz.json. Defaults to ./sarlz.json when present.
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short = 'f', long, value_enum, ignore_case = true, global = true)]
    pub format: Option<OutputFormat>,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the inheritance context of a type.
    Resolve(ResolveArgs),
    /// Print the overloads synthesized for an action of a type.
    Overloads(OverloadsArgs),
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// JSON file holding the list of type declarations.
    #[arg(short = 'm', long)]
    pub model: PathBuf,

    /// Qualified name of the type to resolve.
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Ancestors to skip, together with everything above them.
    #[arg(short = 'x', long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Also walk `java.lang.Object`.
    #[arg(long = "include-object")]
    pub include_object: bool,

    /// Keep compiler-generated operations of ancestors.
    #[arg(long = "include-synthetic")]
    pub include_synthetic: bool,
}

#[derive(Args, Debug)]
pub struct OverloadsArgs {
    /// JSON file holding the list of type declarations.
    #[arg(short = 'm', long)]
    pub model: PathBuf,

    /// Qualified name of the declaring type.
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Name of the action.
    #[arg(short = 'a', long)]
    pub action: String,

    /// Upper bound on default-valued parameters per declaration.
    #[arg(long = "max-default-parameters")]
    pub max_default_parameters: Option<u32>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
