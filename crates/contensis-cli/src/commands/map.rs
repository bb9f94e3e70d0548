use anyhow::Context;
use clap::Args;
use colored::Colorize;
use contensis_import_types::{FieldPath, Record, CONTENT_TYPE_FIELD};
use contensis_mapping::{dedupe, map_entries_by_field, Mappers};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Args)]
pub struct MapCommand {
    /// JSON file holding an array of records
    #[arg(long, short)]
    pub input: PathBuf,

    /// JSON file holding the mapping table, keyed by discriminator value
    #[arg(long, short)]
    pub mappers: PathBuf,

    /// Field whose value picks the mapper for each record
    #[arg(long, default_value = CONTENT_TYPE_FIELD)]
    pub field: String,

    /// Write mapped records to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Drop structurally identical records from the output
    #[arg(long)]
    pub dedupe: bool,
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

impl MapCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let mapped = self.run()?;
        let rendered = serde_json::to_string_pretty(&mapped)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} {} records written to {}",
                    "✓".bright_green(),
                    mapped.len(),
                    path.display().to_string().bright_cyan()
                );
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }

    /// Load the input and mapping table and run the dispatcher
    fn run(&self) -> anyhow::Result<Vec<Record>> {
        let records = match read_json(&self.input)? {
            Value::Array(records) => records,
            other => anyhow::bail!(
                "Expected an array of records in {}, found {}",
                self.input.display(),
                json_kind(&other)
            ),
        };
        let mappers = Mappers::from_json(&read_json(&self.mappers)?)
            .with_context(|| format!("Invalid mapping table in {}", self.mappers.display()))?;
        debug!(
            "Loaded {} records and {} mappers",
            records.len(),
            mappers.len()
        );

        let field = FieldPath::parse(&self.field);
        let mut mapped = map_entries_by_field(&records, &mappers, &field)?;
        if self.dedupe {
            let before = mapped.len();
            mapped = dedupe(&mapped);
            debug!("Removed {} duplicate records", before - mapped.len());
        }

        info!(
            "Mapped {} of {} records using '{}'",
            mapped.len(),
            records.len(),
            field
        );
        Ok(mapped)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
