use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, anyhow};
use cardkit_core::{
    AdaptiveCard, AdaptiveCardGenerator, CardBuilder, DataConnector, DeliveryManager,
    ElementFactory, FormField, NotificationLevel, PayloadEnvelope, TargetPlatform,
    TemplateFactory, ToolkitConfig, ValidationUtility,
};
use clap::{ArgGroup, Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{debug, info};

fn main() -> Result<ExitCode> {
    cardkit_telemetry::install("cardkit")?;
    let cli = Cli::parse();
    let config = ToolkitConfig::from_env().context("reading CARDKIT_* environment")?;
    debug!(target_platform = %config.target, "loaded configuration");

    match cli.command {
        CliCommand::Render { command } => handle_render(command),
        CliCommand::Form {
            title,
            subtitle,
            fields,
            submit_label,
        } => handle_form(&title, subtitle.as_deref(), &fields, &submit_label),
        CliCommand::Data { json, csv, title } => handle_data(json, csv, title.as_deref()),
        CliCommand::Validate { file, target } => {
            handle_validate(&file, target.unwrap_or(config.target))
        }
        CliCommand::Send {
            file,
            webhook_url,
            no_validate,
            teams_envelope,
        } => handle_send(config, &file, webhook_url, !no_validate, teams_envelope),
        CliCommand::Generate { prompt, send } => handle_generate(config, &prompt, send),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "cardkit",
    version,
    about = "Build, validate and deliver Adaptive Cards"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print a templated card as JSON
    Render {
        #[command(subcommand)]
        command: RenderCommand,
    },
    /// Build a form card from a JSON list of fields
    Form {
        #[arg(long)]
        title: String,
        #[arg(long)]
        subtitle: Option<String>,
        /// JSON array of `{ "type", "id", "label", ... }` objects.
        #[arg(long, value_name = "FILE")]
        fields: PathBuf,
        #[arg(long, default_value = "Submit")]
        submit_label: String,
    },
    /// Turn a JSON or CSV file into a card
    #[command(group(ArgGroup::new("input").required(true).args(["json", "csv"])))]
    Data {
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Check a card file against a host's limits; exits 1 when invalid
    Validate {
        file: PathBuf,
        /// teams or generic; defaults to CARDKIT_TARGET, then teams.
        #[arg(long)]
        target: Option<TargetPlatform>,
    },
    /// POST a card file to a webhook
    Send {
        file: PathBuf,
        #[arg(long, env = "CARDKIT_WEBHOOK_URL")]
        webhook_url: Option<String>,
        /// Skip validation before posting.
        #[arg(long)]
        no_validate: bool,
        /// Wrap the card in a Teams message activity.
        #[arg(long)]
        teams_envelope: bool,
    },
    /// Ask the configured LLM to pick and fill a card template
    Generate {
        #[arg(long)]
        prompt: String,
        /// Deliver the generated card to CARDKIT_WEBHOOK_URL.
        #[arg(long)]
        send: bool,
    },
}

#[derive(Subcommand, Debug)]
enum RenderCommand {
    Notification {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "info")]
        level: NotificationLevel,
        #[arg(long)]
        icon_url: Option<String>,
        #[arg(long)]
        action_url: Option<String>,
    },
    Article {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        action_url: Option<String>,
    },
    Confirmation {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "Confirm")]
        confirm: String,
        #[arg(long, default_value = "Cancel")]
        cancel: String,
    },
    Dashboard {
        #[arg(long)]
        title: String,
        /// `label=value`; can be repeated.
        #[arg(long = "metric", value_name = "LABEL=VALUE", value_parser = parse_metric)]
        metrics: Vec<(String, String)>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        chart_url: Option<String>,
    },
}

fn parse_metric(raw: &str) -> Result<(String, String), String> {
    let (label, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{raw}'"))?;
    if label.trim().is_empty() {
        return Err(format!("metric label is empty in '{raw}'"));
    }
    Ok((label.trim().to_string(), value.trim().to_string()))
}

fn handle_render(command: RenderCommand) -> Result<ExitCode> {
    let card = match command {
        RenderCommand::Notification {
            title,
            message,
            level,
            icon_url,
            action_url,
        } => TemplateFactory::create_notification_card(
            &title,
            &message,
            level,
            icon_url.as_deref(),
            action_url.as_deref(),
        )?,
        RenderCommand::Article {
            title,
            content,
            image_url,
            author,
            date,
            action_url,
        } => TemplateFactory::create_article_card(
            &title,
            &content,
            image_url.as_deref(),
            author.as_deref(),
            date.as_deref(),
            action_url.as_deref(),
        )?,
        RenderCommand::Confirmation {
            title,
            message,
            confirm,
            cancel,
        } => TemplateFactory::create_confirmation_card(&title, &message, &confirm, &cancel)?,
        RenderCommand::Dashboard {
            title,
            metrics,
            description,
            chart_url,
        } => TemplateFactory::create_dashboard_card(
            &title,
            metrics,
            description.as_deref(),
            chart_url.as_deref(),
        )?,
    };
    print_card(&card)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_form(
    title: &str,
    subtitle: Option<&str>,
    fields: &Path,
    submit_label: &str,
) -> Result<ExitCode> {
    let fields: Vec<FormField> = serde_json::from_value(read_json(fields)?)
        .with_context(|| format!("{} is not a list of form fields", fields.display()))?;
    let card = TemplateFactory::create_form_card(title, subtitle, &fields, submit_label)?;
    print_card(&card)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_data(
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
    title: Option<&str>,
) -> Result<ExitCode> {
    let elements = match (json, csv) {
        (Some(path), _) => DataConnector::from_json(&read_json(&path)?)?,
        (None, Some(path)) => DataConnector::from_csv(&read_text(&path)?)?,
        (None, None) => return Err(anyhow!("either --json or --csv is required")),
    };
    let mut builder = CardBuilder::new();
    if let Some(title) = title {
        builder = builder.add_item(ElementFactory::create_heading(title, 2)?);
    }
    let card = builder.add_items(elements).build()?;
    print_card(&card)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_validate(file: &Path, target: TargetPlatform) -> Result<ExitCode> {
    let card = read_json(file)?;
    let result = ValidationUtility::new(target).validate_json(&card)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_send(
    config: ToolkitConfig,
    file: &Path,
    webhook_url: Option<String>,
    validate: bool,
    teams_envelope: bool,
) -> Result<ExitCode> {
    let card = read_json(file)?;
    let mut delivery = config.delivery();
    if let Some(url) = webhook_url {
        delivery.webhook_url = Some(url);
    }
    if teams_envelope {
        delivery.envelope = PayloadEnvelope::TeamsMessage;
    }
    let manager = DeliveryManager::new(delivery)?;
    let result = manager.send_json(&card, validate);
    info!(success = result.success, status = ?result.status_code, "send finished");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_generate(config: ToolkitConfig, prompt: &str, send: bool) -> Result<ExitCode> {
    let generator = AdaptiveCardGenerator::new(config.generator()?)?
        .with_validator(ValidationUtility::new(config.target));

    let (generated, delivery) = if send {
        let manager = DeliveryManager::new(config.delivery())?;
        let (generated, delivered) = generator.generate_and_send(prompt, &manager)?;
        (generated, Some(delivered))
    } else {
        (generator.generate(prompt)?, None)
    };

    let mut output = json!({
        "tool": generated.tool,
        "explanation": generated.explanation,
        "card": generated.card.to_value()?,
        "validation": generated.validation,
    });
    let delivered = delivery.as_ref().is_none_or(|result| result.success);
    if let Some(result) = delivery {
        output["delivery"] = serde_json::to_value(result)?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(if delivered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_card(card: &AdaptiveCard) -> Result<()> {
    println!("{}", card.to_json_pretty()?);
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
