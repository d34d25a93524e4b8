#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::time::Duration;

use super::{Config, ConfigError, GeminiConfig, OllamaConfig, ServerConfig};
use crate::embeddings::OllamaClient;
use crate::http::RetryPolicy;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Incident Intel Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Server").bold().yellow());
    configure_server(&mut config.server)?;

    eprintln!();
    eprintln!("{}", style("Ollama Embeddings").bold().yellow());
    eprintln!("Configure the Ollama instance used to embed document chunks.");
    eprintln!();
    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Checking Ollama and the embedding model...").yellow());
    if test_ollama_connection(&config.ollama) {
        eprintln!(
            "{}",
            style(format!("✓ {} is available", config.ollama.model)).green()
        );
    } else {
        eprintln!(
            "{}",
            style("⚠ Ollama is unreachable or the model is not pulled").yellow()
        );
        eprintln!(
            "Uploads will fail until `ollama pull {}` has been run on that host.",
            config.ollama.model
        );
    }

    eprintln!();
    eprintln!("{}", style("Gemini Language Model").bold().yellow());
    configure_gemini(&mut config.gemini)?;

    if config.gemini.api_key_from_env().is_none() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ ${} is not set; questions will fail until it is exported",
                config.gemini.api_key_env
            ))
            .yellow()
        );
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Server Settings:").bold().yellow());
    eprintln!("  Bind: {}", style(config.server.bind_address()).cyan());
    if config.server.cors_origins.is_empty() {
        eprintln!("  CORS Origins: {}", style("any").cyan());
    } else {
        eprintln!(
            "  CORS Origins: {}",
            style(config.server.cors_origins.join(", ")).cyan()
        );
    }

    eprintln!();
    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    match config.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());

    eprintln!();
    eprintln!("{}", style("Gemini Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.gemini.base_url).cyan());
    eprintln!("  Model: {}", style(&config.gemini.model).cyan());
    let key_state = if config.gemini.api_key_from_env().is_some() {
        style("set").green()
    } else {
        style("missing").red()
    };
    eprintln!("  ${}: {}", config.gemini.api_key_env, key_state);

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Chunk Size: {} characters",
        style(config.chunking.chunk_size).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = Config::config_dir().context("Failed to resolve configuration directory")?;

    if config_dir.join("config.toml").exists() {
        let config = Config::load(&config_dir)?;
        eprintln!("{}", style("Found existing configuration.").green());
        Ok(config)
    } else {
        eprintln!(
            "{}",
            style("No existing configuration found. Using defaults.").yellow()
        );
        Config::load(&config_dir)
    }
}

fn configure_server(server: &mut ServerConfig) -> Result<()> {
    let host: String = Input::new()
        .with_prompt("Listen host")
        .default(server.host.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Host cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Listen port")
        .default(server.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    server.host = host;
    server.port = port;
    Ok(())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            };
            temp_config.validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(ollama.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;
    ollama.set_model(model)?;
    ollama.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_gemini(gemini: &mut GeminiConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Gemini API base URL")
        .default(gemini.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            GeminiConfig {
                base_url: input.clone(),
                ..gemini.clone()
            }
            .validate()
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Gemini model")
        .default(gemini.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    gemini.set_base_url(base_url)?;
    gemini.set_model(model)?;
    Ok(())
}

/// Whether Ollama answers and serves the configured embedding model
fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    OllamaClient::new(ollama)
        .map(|client| {
            client
                .with_timeout(Duration::from_secs(5))
                .with_retry_policy(RetryPolicy::new(1))
        })
        .and_then(|client| client.health_check())
        .is_ok()
}
