//! Index command implementation.

use super::{build_pipeline, load_library, read_document};
use crate::cli::IndexArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use clauseflow_domain::CustomerId;
use tracing::info;

/// Execute the index command.
pub async fn execute_index(args: IndexArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = read_document(&args.file)?;
    let pipeline = build_pipeline(config, &args.engine)?;

    let index = match (&args.customer, &args.library) {
        (Some(customer), Some(path)) => {
            let library = load_library(path)?;
            let customer = CustomerId::new(customer.as_str());
            if args.single_pass {
                pipeline
                    .run_single_pass_reconciled(text, &customer, &library)
                    .await?
            } else {
                pipeline.run_reconciled(text, &customer, &library).await?
            }
        }
        _ if args.single_pass => pipeline.run_single_pass(text).await?,
        _ => pipeline.run(text).await?,
    };

    info!(
        file = %args.file.display(),
        clauses = index.clauses.len(),
        warnings = index.warnings.len(),
        "Indexed document"
    );

    println!("{}", formatter.format_index(&index, args.text)?);
    // JSON output carries warnings inline
    if formatter.format() != OutputFormat::Json && !index.warnings.is_empty() {
        eprintln!("{}", formatter.format_warnings(&index.warnings));
    }
    Ok(())
}
