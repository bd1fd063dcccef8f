//! Operator CLI: validate catalog/profile config files and project a single
//! product offline, exercising the same projection path the server uses.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use storefront_catalog::{product_computers, product_schema, MemoryCatalog};
use storefront_core::{
    parse_path_list, project, FieldDecision, FieldSelection, MetaSelection, ProfileDefaults,
    ResponseProfile,
};

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a catalog seed file and optional profiles file.
    Validate {
        /// Catalog seed file (JSON).
        #[arg(long, env = "STOREFRONT_CATALOG_PATH")]
        catalog: PathBuf,
        /// Response-profile defaults file (YAML).
        #[arg(long, env = "STOREFRONT_PROFILES_PATH")]
        profiles: Option<PathBuf>,
    },
    /// Project one product to stdout with the given selection.
    Project {
        /// Catalog seed file (JSON).
        #[arg(long, env = "STOREFRONT_CATALOG_PATH")]
        catalog: PathBuf,
        /// Product id to project.
        #[arg(long)]
        id: u64,
        /// Comma-separated dotted paths to include.
        #[arg(long)]
        fields: Option<String>,
        /// Comma-separated dotted paths to exclude.
        #[arg(long)]
        exclude_fields: Option<String>,
        /// Response profile: default | quick_browse | quick_view.
        #[arg(long, default_value = "default")]
        response: String,
        /// Response-profile defaults file (YAML).
        #[arg(long, env = "STOREFRONT_PROFILES_PATH")]
        profiles: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { catalog, profiles } => validate(&catalog, profiles.as_deref()),
        Commands::Project {
            catalog,
            id,
            fields,
            exclude_fields,
            response,
            profiles,
        } => project_one(
            &catalog,
            id,
            fields.as_deref(),
            exclude_fields.as_deref(),
            &response,
            profiles.as_deref(),
        ),
    }
}

fn validate(catalog_path: &std::path::Path, profiles_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let catalog = MemoryCatalog::load(catalog_path)
        .with_context(|| format!("catalog file {} is invalid", catalog_path.display()))?;
    let listed = catalog
        .list(
            &storefront_catalog::ProductFilters::default(),
            storefront_catalog::PageRequest {
                page: 1,
                per_page: catalog.len().max(1),
            },
        )
        .total;
    println!("catalog ok: {} products ({listed} listed)", catalog.len());

    if let Some(path) = profiles_path {
        ProfileDefaults::load(path)
            .with_context(|| format!("profiles file {} is invalid", path.display()))?;
        println!("profiles ok: {}", path.display());
    }

    Ok(())
}

fn project_one(
    catalog_path: &std::path::Path,
    id: u64,
    fields: Option<&str>,
    exclude_fields: Option<&str>,
    response: &str,
    profiles_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let catalog = MemoryCatalog::load(catalog_path)
        .with_context(|| format!("catalog file {} is invalid", catalog_path.display()))?;
    let product = catalog
        .get(id)
        .with_context(|| format!("product {id} not found in catalog"))?;

    let profiles = match profiles_path {
        Some(path) => ProfileDefaults::load(path)
            .with_context(|| format!("profiles file {} is invalid", path.display()))?,
        None => ProfileDefaults::default(),
    };

    let profile: ResponseProfile = response
        .parse()
        .with_context(|| format!("unknown response profile {response:?}"))?;

    let requested = parse_path_list(fields.unwrap_or(""));
    let excluded = parse_path_list(exclude_fields.unwrap_or(""));
    for token in requested.rejected.iter().chain(&excluded.rejected) {
        eprintln!("warning: dropping malformed field path {token:?}");
    }

    let selection = FieldSelection::new(requested.paths, excluded.paths, profile);
    let decision = FieldDecision::resolve(&selection, &profiles);
    let meta = MetaSelection::default();

    let computers = product_computers(product, &catalog, &meta);
    let projected = project(product_schema(), &decision, &computers)?;

    println!("{}", serde_json::to_string_pretty(&projected)?);
    Ok(())
}
