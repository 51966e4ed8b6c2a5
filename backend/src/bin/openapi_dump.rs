//! Print the OpenAPI document as JSON, or YAML with `--yaml`.

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use scholarships::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Print the scholarships OpenAPI document")]
struct Cli {
    /// Emit YAML instead of pretty-printed JSON.
    #[arg(long)]
    yaml: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let doc = ApiDoc::openapi();
    let rendered = if cli.yaml {
        doc.to_yaml().wrap_err("render OpenAPI YAML")?
    } else {
        doc.to_pretty_json().wrap_err("render OpenAPI JSON")?
    };
    println!("{rendered}");
    Ok(())
}
