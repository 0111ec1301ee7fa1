//! Command-line interface for inspecting web client config files.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::evaluator::LookupObject;
use crate::service::{ConfigSection, ConfigService, ConfigSource, LookupContext};

/// CMS web client config - validate and inspect layered config files.
#[derive(Parser)]
#[command(name = "cms-webconfig")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load config files in order and list the resulting sections.
    Check {
        /// Config files, later files override earlier ones
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the effective configuration for a lookup.
    Show {
        /// Config files, later files override earlier ones
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Lookup name matched by the string-compare evaluator
        #[arg(long, conflicts_with = "node_type")]
        name: Option<String>,

        /// Node type matched by the node-type evaluator
        #[arg(long)]
        node_type: Option<String>,

        /// Aspect matched by the aspect-name evaluator (repeatable)
        #[arg(long = "aspect")]
        aspects: Vec<String>,

        /// Also consider sections in this area (repeatable)
        #[arg(long = "area")]
        areas: Vec<String>,

        /// Leave out sections without an evaluator
        #[arg(long)]
        no_global: bool,

        /// Only print this element
        #[arg(short, long)]
        element: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files } => check_command(files),
        Commands::Show {
            files,
            name,
            node_type,
            aspects,
            areas,
            no_global,
            element,
            format,
        } => {
            let query = Query {
                name,
                node_type,
                aspects,
                areas,
                no_global,
            };
            show_command(files, &query, element.as_deref(), format)
        }
    }
}

/// Lookup parameters collected from the command line.
#[derive(Debug, Default)]
struct Query {
    name: Option<String>,
    node_type: Option<String>,
    aspects: Vec<String>,
    areas: Vec<String>,
    no_global: bool,
}

impl Query {
    fn is_global(&self) -> bool {
        self.name.is_none()
            && self.node_type.is_none()
            && self.aspects.is_empty()
            && self.areas.is_empty()
            && !self.no_global
    }

    fn object(&self) -> LookupObject {
        let base = match (&self.name, &self.node_type) {
            (Some(name), _) => LookupObject::named(name),
            (None, Some(node_type)) => LookupObject::node(node_type),
            (None, None) => LookupObject::default(),
        };
        self.aspects
            .iter()
            .fold(base, |object, aspect| object.with_aspect(aspect))
    }

    fn context(&self) -> LookupContext {
        let context = self
            .areas
            .iter()
            .fold(LookupContext::new(), |context, area| context.with_area(area));
        if self.no_global {
            context.without_global()
        } else {
            context
        }
    }
}

fn load(files: Vec<PathBuf>) -> Result<ConfigService> {
    ConfigService::load(files.into_iter().map(ConfigSource::File).collect())
}

/// Execute the check command.
fn check_command(files: Vec<PathBuf>) -> Result<()> {
    let count = files.len();
    let service = load(files)?;
    let snapshot = service.snapshot();

    for section in snapshot.sections() {
        let names: Vec<&str> = section.elements().keys().map(String::as_str).collect();
        println!("  {} {}", style(section_label(section)).cyan(), names.join(", "));
    }
    println!();
    println!(
        "{} {} source(s), {} section(s)",
        style("OK").green().bold(),
        count,
        snapshot.sections().len()
    );
    Ok(())
}

/// Execute the show command.
fn show_command(
    files: Vec<PathBuf>,
    query: &Query,
    element: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let service = load(files)?;
    let config = if query.is_global() {
        service.global_config()?
    } else {
        service.get_config_in(&query.object(), &query.context())?
    };

    let output = match element {
        Some(name) => {
            let element = config
                .config_element(name)
                .ok_or_else(|| ConfigError::MissingElement {
                    element: "config".to_string(),
                    child: name.to_string(),
                })?;
            render(element, format)?
        }
        None => render(&config, format)?,
    };
    print!("{output}");
    Ok(())
}

fn section_label(section: &ConfigSection) -> String {
    let mut label = match (section.evaluator(), section.condition()) {
        (Some(evaluator), Some(condition)) => format!("[{evaluator}={condition}]"),
        _ => "[global]".to_string(),
    };
    if let Some(area) = section.area() {
        label.push_str(&format!(" area={area}"));
    }
    label
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(value)?),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::GenericConfigElement;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::parse_from(["cms-webconfig", "check", "a.xml", "b.xml"]);
        let Commands::Check { files } = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(files, vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")]);
    }

    #[test]
    fn test_cli_parse_show_with_lookup() {
        let cli = Cli::parse_from([
            "cms-webconfig",
            "show",
            "a.xml",
            "--node-type",
            "cm:folder",
            "--aspect",
            "cm:titled",
            "--area",
            "admin",
            "--format",
            "json",
        ]);
        let Commands::Show {
            node_type,
            aspects,
            areas,
            format,
            ..
        } = cli.command
        else {
            panic!("expected show command");
        };
        assert_eq!(node_type.as_deref(), Some("cm:folder"));
        assert_eq!(aspects, vec!["cm:titled"]);
        assert_eq!(areas, vec!["admin"]);
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_name_conflicts_with_node_type() {
        let result = Cli::try_parse_from([
            "cms-webconfig",
            "show",
            "a.xml",
            "--name",
            "Dialogs",
            "--node-type",
            "cm:folder",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_builds_object() {
        let query = Query {
            node_type: Some("cm:content".to_string()),
            aspects: vec!["cm:versionable".to_string()],
            ..Query::default()
        };
        assert!(!query.is_global());
        let object = query.object();
        assert_eq!(object.node_type(), Some("cm:content"));
        assert_eq!(object.aspects(), ["cm:versionable".to_string()]);
        assert!(Query::default().is_global());
    }

    #[test]
    fn test_render_formats() {
        let element = GenericConfigElement::new("dialog-container").with_value("/c.jsp");
        let yaml = render(&element, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("name: dialog-container"));
        let json = render(&element, OutputFormat::Json).unwrap();
        assert!(json.contains("\"value\": \"/c.jsp\""));
    }
}
