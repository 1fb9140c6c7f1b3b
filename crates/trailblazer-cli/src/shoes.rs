//! `shoes` subcommands. These work against whichever backend the config
//! selects, so they also operate on the mock store.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use trailblazer_core::{filter_shoes, resolve, ProductData, ShoeForm, ShoeRecord};
use trailblazer_db::Catalog;
use uuid::Uuid;

const NAME_WIDTH: usize = 28;

#[derive(Debug, Subcommand)]
pub enum ShoeCommands {
    /// List shoes, newest first
    List {
        /// Case-insensitive search over names, brands and nicknames
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Show one shoe with its resolved specs and reviews
    Show { id: Uuid },
    /// Create a shoe from an admin form JSON file
    Import { file: PathBuf },
    /// Delete a shoe and its reviews
    Delete { id: Uuid },
}

pub(crate) async fn run(catalog: &Catalog, command: ShoeCommands) -> anyhow::Result<()> {
    match command {
        ShoeCommands::List { query } => run_list(catalog, query.as_deref()).await,
        ShoeCommands::Show { id } => run_show(catalog, id).await,
        ShoeCommands::Import { file } => run_import(catalog, &file).await,
        ShoeCommands::Delete { id } => {
            catalog.delete_shoe(id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_list(catalog: &Catalog, query: Option<&str>) -> anyhow::Result<()> {
    let shoes = catalog.list_shoes().await;
    let matched = filter_shoes(query.unwrap_or_default(), &shoes);

    if matched.is_empty() {
        println!(
            "no shoes found{}",
            query.map(|q| format!(" matching '{q}'")).unwrap_or_default()
        );
        return Ok(());
    }

    println!("{}", list_header());
    for shoe in matched {
        println!("{}", list_row(shoe));
    }
    Ok(())
}

fn list_header() -> String {
    format!(
        "{:<38}{:<14}{:<w$}{:<26}{:<8}RELEASE",
        "ID",
        "BRAND",
        "MODEL",
        "STACK",
        "DROP",
        w = NAME_WIDTH
    )
}

fn list_row(shoe: &ShoeRecord) -> String {
    let data = ProductData::from_raw(shoe.product_data.as_ref());
    let specs = resolve::resolve_specs(shoe, &data);
    format!(
        "{:<38}{:<14}{:<w$}{:<26}{:<8}{}",
        shoe.id,
        truncate(resolve::resolve_brand(shoe, &data).unwrap_or(resolve::MISSING), 13),
        truncate(
            resolve::resolve_model_name(shoe, &data).unwrap_or(resolve::MISSING),
            NAME_WIDTH - 1
        ),
        specs.stack_height,
        specs.drop,
        resolve::resolve_release_date(&data),
        w = NAME_WIDTH
    )
}

async fn run_show(catalog: &Catalog, id: Uuid) -> anyhow::Result<()> {
    let shoe = catalog
        .get_shoe(id)
        .await
        .map_err(|e| anyhow::anyhow!("shoe {id}: {e}"))?;
    let data = ProductData::from_raw(shoe.product_data.as_ref());
    let specs = resolve::resolve_specs(&shoe, &data);
    let text = |value: Option<&str>| value.unwrap_or(resolve::MISSING).to_string();

    println!(
        "{} {}",
        text(resolve::resolve_brand(&shoe, &data)),
        text(resolve::resolve_model_name(&shoe, &data))
    );
    if let Some(nickname) = resolve::nickname(&data) {
        println!("Nickname: {nickname}");
    }
    if let Some(slogan) = resolve::slogan(&data) {
        println!("Slogan: {slogan}");
    }
    println!("Release: {}", resolve::resolve_release_date(&data));
    println!(
        "Stack: {}  Drop: {}  Lugs: {}  Weight: {}",
        specs.stack_height, specs.drop, specs.lug_depth, specs.weight
    );
    println!("Image: {}", text(resolve::resolve_image(&shoe, &data)));
    println!("Video: {}", text(resolve::resolve_video(&shoe, &data)));
    if let Some(summary) = resolve::resolve_summary(&shoe, &data) {
        println!();
        println!("{summary}");
    }

    let metrics = resolve::performance_metrics(&data);
    if !metrics.is_empty() {
        println!();
        for metric in &metrics {
            println!("{:<12}{:>5.1}  {:?}", metric.label, metric.score, metric.band);
        }
    }

    let reviews = catalog.list_reviews(id).await;
    println!();
    println!("Reviews ({})", reviews.len());
    for review in &reviews {
        println!(
            "  {} {}: {}",
            review.created_at.format("%Y-%m-%d"),
            review.user_name,
            review.content
        );
    }
    Ok(())
}

async fn run_import(catalog: &Catalog, file: &Path) -> anyhow::Result<()> {
    let form = read_form(file).await?;
    let shoe = form
        .into_submission()
        .map_err(|e| anyhow::anyhow!("{}: {e}", e.field()))?;
    let created = catalog.create_shoe(shoe).await?;
    println!("created {} ({})", created.id, created.name);
    Ok(())
}

async fn read_form(file: &Path) -> anyhow::Result<ShoeForm> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", file.display()))?;
    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {}: {e}", file.display()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        let mut cut: String = value.chars().take(max_chars.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    } else {
        value.to_string()
    }
}
