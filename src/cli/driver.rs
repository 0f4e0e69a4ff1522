use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::args::{CliArgs, Command, OutputFormat, OverloadsArgs, ResolveArgs};
use crate::cli::config::{SarlzConfig, discover_config};
use sarlz_common::Diagnostic;
use sarlz_solver::inheritance::OperationDescriptor;
use sarlz_solver::types::{Name, well_known};
use sarlz_solver::{
    ActionPrototype, DeclarationStore, InheritanceContext, InheritanceResolver, OverloadSet,
    OverloadSynthesizer, TypeDeclaration,
};

/// What a run prints, and the diagnostics it raised.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunOutcome> {
    let config = discover_config(args.config.as_deref(), cwd)?;
    let format = args.format.or(config.format).unwrap_or_default();
    let color = !args.no_color && format == OutputFormat::Text;

    match &args.command {
        Command::Resolve(resolve_args) => resolve(resolve_args, &config, format, color, cwd),
        Command::Overloads(overloads_args) => {
            overloads(overloads_args, &config, format, color, cwd)
        }
    }
}

/// Read a model file: a JSON list of type declarations.
pub fn load_model(path: &Path) -> Result<DeclarationStore> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model: {}", path.display()))?;
    let declarations: Vec<TypeDeclaration> = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse model: {}", path.display()))?;
    debug!(path = %path.display(), declarations = declarations.len(), "model loaded");
    Ok(DeclarationStore::from_declarations(declarations))
}

fn resolve_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

// =============================================================================
// resolve
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    context: &'a InheritanceContext,
}

fn resolve(
    args: &ResolveArgs,
    config: &SarlzConfig,
    format: OutputFormat,
    color: bool,
    cwd: &Path,
) -> Result<RunOutcome> {
    let model_path = resolve_path(cwd, &args.model);
    let store = load_model(&model_path)?;
    let root = store.id_of(&args.type_name).with_context(|| {
        format!("unknown type '{}' in {}", args.type_name, model_path.display())
    })?;

    let mut options = config.resolver_options();
    if args.include_object {
        options.excluded_ancestors.remove(well_known::OBJECT);
    }
    if args.include_synthetic {
        options.skip_synthetic = false;
    }
    info!(root = %args.type_name, "resolving inheritance context");
    let context = InheritanceResolver::new(&store)
        .with_options(options)
        .resolve(root, args.exclude.as_slice());

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&ResolveReport {
            type_name: &args.type_name,
            context: &context,
        })?,
        OutputFormat::Text => render_context(&args.type_name, &context, color)?,
    };
    Ok(RunOutcome {
        output,
        diagnostics: context.diagnostics(&model_path.display().to_string()),
    })
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn render_context(type_name: &str, context: &InheritanceContext, color: bool) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", heading(type_name, color))?;
    writeln!(out, "ancestors: {}", join_names(&context.ancestors))?;

    let sections = [
        ("final operations", &context.final_operations),
        ("overridable operations", &context.overridable_operations),
        ("operations to implement", &context.operations_to_implement),
    ];
    for (title, operations) in sections {
        writeln!(out, "{}:", heading(title, color))?;
        if operations.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for operation in operations.values() {
            writeln!(out, "  {}", describe_operation(operation))?;
        }
    }

    writeln!(out, "{}:", heading("inherited fields", color))?;
    if context.inherited_fields.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for field in context.inherited_fields.values() {
        writeln!(out, "  {} : {}  ({})", field.name, field.ty, field.owner)?;
    }

    writeln!(out, "{}:", heading("constructors", color))?;
    if context.constructors.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for constructor in context.constructors.values() {
        writeln!(out, "  {}  ({})", constructor.prototype, constructor.owner)?;
    }

    if !context.unresolved.is_empty() {
        writeln!(out, "{}:", heading("unresolved ancestors", color))?;
        for unresolved in &context.unresolved {
            writeln!(
                out,
                "  {}  (referenced by {})",
                unresolved.reference, unresolved.referenced_by
            )?;
        }
    }
    if let Some(truncated) = &context.truncated {
        writeln!(
            out,
            "{}: stopped after {} super-type edges",
            heading("truncated", color),
            truncated.edge_limit
        )?;
    }
    Ok(out)
}

fn describe_operation(operation: &OperationDescriptor) -> String {
    format!(
        "{} : {}  ({})",
        operation.prototype, operation.return_type, operation.owner
    )
}

fn join_names(names: &[Name]) -> String {
    if names.is_empty() {
        return "(none)".to_string();
    }
    names.iter().map(|n| &**n).collect::<Vec<_>>().join(", ")
}

// =============================================================================
// overloads
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionReport {
    prototype: ActionPrototype,
    #[serde(flatten)]
    set: OverloadSet<()>,
}

fn overloads(
    args: &OverloadsArgs,
    config: &SarlzConfig,
    format: OutputFormat,
    color: bool,
    cwd: &Path,
) -> Result<RunOutcome> {
    let model_path = resolve_path(cwd, &args.model);
    let file = model_path.display().to_string();
    let store = load_model(&model_path)?;
    let decl = store
        .lookup(&args.type_name)
        .with_context(|| format!("unknown type '{}' in {}", args.type_name, file))?;

    let mut options = config.synthesis.clone();
    if let Some(max) = args.max_default_parameters {
        options.max_default_parameters = max;
    }
    let synthesizer = OverloadSynthesizer::with_options(options);

    let mut reports = Vec::new();
    let mut diagnostics = Vec::new();
    let mut declared = 0usize;
    for operation in decl.operations_named(&args.action) {
        if operation.is_synthetic() {
            continue;
        }
        declared += 1;
        let synthesized =
            synthesizer.synthesize_action(&decl.name, &operation.name, &operation.signature, ());
        match synthesized {
            Ok(set) => reports.push(ActionReport {
                prototype: ActionPrototype::from_signature(
                    operation.name.clone(),
                    &operation.signature,
                ),
                set,
            }),
            Err(err) => diagnostics.push(err.to_diagnostic(&operation.name, &file, 0, 0)),
        }
    }
    if declared == 0 {
        bail!(
            "type '{}' declares no action named '{}'",
            args.type_name,
            args.action
        );
    }

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&reports)?,
        OutputFormat::Text => render_overloads(&decl.name, &args.action, &reports, color)?,
    };
    Ok(RunOutcome {
        output,
        diagnostics,
    })
}

fn render_overloads(
    owner: &str,
    action: &str,
    reports: &[ActionReport],
    color: bool,
) -> Result<String> {
    let mut out = String::new();
    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        let canonical = format!("{owner}.{}", report.prototype);
        writeln!(out, "{}  [source of defaults]", heading(&canonical, color))?;
        if report.set.is_empty() {
            writeln!(out, "  (no overloads)")?;
        }
        for overload in &report.set.overloads {
            writeln!(out, "  {action}({})", overload.parameter_types)?;
            writeln!(out, "      delegates: {action}{}", overload.plan)?;
            writeln!(out, "      uses defaults from: {}", overload.uses_defaults_from)?;
        }
    }
    Ok(out)
}
