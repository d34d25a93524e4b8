#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::pipeline::RagPipeline;
use crate::server;

fn load_pipeline() -> Result<(Config, RagPipeline)> {
    let config = Config::load_default().context("Failed to load configuration")?;
    let pipeline = RagPipeline::from_config(&config).context("Failed to initialize pipeline")?;
    Ok((config, pipeline))
}

/// Start the HTTP API, optionally overriding the configured bind address
#[inline]
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let (mut config, pipeline) = load_pipeline()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.server.validate()?;

    match OllamaClient::new(&config.ollama).and_then(|client| client.health_check()) {
        Ok(()) => info!(
            "✅ Ollama connected at {}:{} with model {}",
            config.ollama.host, config.ollama.port, config.ollama.model
        ),
        Err(e) => {
            warn!("⚠️  Ollama is not ready: {}", e);
            println!("Warning: Ollama may not be ready. Uploads and questions may fail.");
        }
    }

    let app = server::router(Arc::new(pipeline), &config.server)?;
    let addr = config.server.bind_address();
    println!("🌐 Serving on http://{}", addr);
    server::serve(app, &addr).await?;

    Ok(())
}

/// Index a local PDF, replacing the current index
#[inline]
pub async fn index_pdf(path: &Path) -> Result<()> {
    let (_config, pipeline) = load_pipeline()?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;

    let outcome = tokio::task::spawn_blocking(move || pipeline.upload(&filename, &bytes))
        .await
        .context("Indexing task failed")??;

    println!("✅ Indexed {}", outcome.filename);
    println!("   📄 Chunks: {}", outcome.chunks);
    println!("   🆔 Build: {}", outcome.build_id);
    Ok(())
}

/// Answer a question against the current index from the terminal
#[inline]
pub async fn ask(question: String, top_k: Option<usize>) -> Result<()> {
    let (config, pipeline) = load_pipeline()?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);

    let answer = tokio::task::spawn_blocking(move || pipeline.ask_with_top_k(&question, top_k))
        .await
        .context("Question task failed")??;

    println!("{}", answer.answer.trim());
    println!();
    println!("📚 Context ({} chunks):", answer.context.len());
    for chunk in &answer.context {
        println!("   #{} (distance {:.4})", chunk.position, chunk.distance);
    }
    Ok(())
}

/// Show the state of the index and the external services
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    println!("📊 Incident Intel Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🤖 Ollama Status:");
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "   ✅ Ollama: Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                println!("   📋 Model: {}", config.ollama.model);
                println!("   🔢 Batch Size: {}", config.ollama.batch_size);
            }
            Err(e) => println!("   ⚠️  Ollama: Unhealthy - {}", e),
        },
        Err(e) => println!("   ❌ Ollama: Failed to connect - {}", e),
    }

    println!("🧠 Gemini Status:");
    if config.gemini.api_key_from_env().is_some() {
        println!("   ✅ API key: ${} is set", config.gemini.api_key_env);
    } else {
        println!("   ❌ API key: ${} is not set", config.gemini.api_key_env);
    }
    println!("   📋 Model: {}", config.gemini.model);

    println!();
    println!("🔍 Index Status:");
    let pipeline = RagPipeline::from_config(&config).context("Failed to initialize pipeline")?;
    match pipeline.status() {
        Ok(Some(status)) => {
            println!(
                "   📄 Document: {}",
                status.filename.as_deref().unwrap_or("unknown")
            );
            println!("   📊 Chunks: {}", status.chunks);
            println!("   🔢 Dimension: {}", status.dimension);
            println!(
                "   🕒 Built: {}",
                status.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("   🆔 Build: {}", status.build_id);
        }
        Ok(None) => println!("   📭 No documents indexed yet"),
        Err(e) => println!("   ❌ Index unreadable - {}", e),
    }
    println!("   📁 Location: {}", pipeline.store().dir().display());

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'incident-intel index <pdf>' to index a report");
    println!("   • Use 'incident-intel ask <question>' to query it");
    println!("   • Use 'incident-intel serve' to start the HTTP API");

    Ok(())
}
