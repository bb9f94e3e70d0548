use clap::Args;
use colored::Colorize;
use contensis_import_types::CmsConnection;
use contensis_importer::{is_commit_value, ImporterConfig, COMMIT_ENV};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ConfigCommand {
    /// Importer configuration file (JSON)
    #[arg(long, short, env = "CONTENSIS_IMPORT_CONFIG")]
    pub config: PathBuf,

    /// Commit mode flag, only the exact value `true` enables writes
    #[arg(long, env = COMMIT_ENV, hide_env_values = true)]
    pub commit: Option<String>,
}

impl ConfigCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let config = ImporterConfig::from_file(&self.config)?;
        let commit = is_commit_value(self.commit.as_deref());
        info!("Loaded importer configuration from {}", self.config.display());

        println!();
        for (label, value) in summary(&config, commit) {
            println!("{:<18} {}", format!("{}:", label).bright_white().bold(), value);
        }
        println!();
        if !commit {
            println!(
                "{}",
                format!("Set {}=true to write changes to the target", COMMIT_ENV).bright_yellow()
            );
        }
        Ok(())
    }
}

fn credentials(connection: &CmsConnection) -> String {
    match (&connection.client_id, &connection.username) {
        (Some(client_id), _) => format!(
            "client {} / secret {}",
            client_id,
            secret(&connection.shared_secret)
        ),
        (None, Some(username)) => format!(
            "user {} / password {}",
            username,
            secret(&connection.password)
        ),
        (None, None) => "none".to_string(),
    }
}

fn secret(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "***"
    } else {
        "(missing)"
    }
}

/// Label/value pairs describing the resolved configuration, secrets hidden
fn summary(config: &ImporterConfig, commit: bool) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();

    match &config.source {
        Some(source) => {
            lines.push(("Source", source.connection.url.clone()));
            lines.push(("Source project", source.project.clone()));
            lines.push(("Source auth", credentials(&source.connection)));
        }
        None => lines.push(("Source", "(not configured)".to_string())),
    }
    match &config.target {
        Some(target) => {
            lines.push(("Target", target.connection.url.clone()));
            lines.push(("Target projects", target.target_projects.join(", ")));
            lines.push(("Target auth", credentials(&target.connection)));
        }
        None => lines.push(("Target", "(not configured)".to_string())),
    }

    lines.push((
        "Concurrency",
        config
            .concurrency
            .map(|c| c.to_string())
            .unwrap_or_else(|| "service default".to_string()),
    ));
    lines.push(("Transform GUIDs", config.transform_guids.to_string()));
    lines.push(("Output logs", config.output_logs.to_string()));
    lines.push(("Output progress", config.output_progress.to_string()));
    if !config.content_types.is_empty() || !config.components.is_empty() {
        lines.push((
            "Content models",
            format!(
                "{} content types, {} components",
                config.content_types.len(),
                config.components.len()
            ),
        ));
    }
    if !config.extra_args.is_empty() {
        let keys: Vec<&str> = config.extra_args.keys().map(String::as_str).collect();
        lines.push(("Extra arguments", keys.join(", ")));
    }
    lines.push(("Mode", if commit { "commit" } else { "preview" }.to_string()));
    lines
}
