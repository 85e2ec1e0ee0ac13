use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{info, warn};

use rekindle_core::{
    platform_key_from_env, ApiKey, BatchProgress, Config, CredentialResolver, GeminiClient,
    InMemoryPreviews, PhotoLibrary, PhotoStatus, PreviewProvider, RestorationClient,
    RestorationOrchestrator, Session, StaticKeySelector,
};

use crate::cli::RestoreArgs;
use crate::export;
use crate::metrics;

pub async fn run(mut config: Config, args: RestoreArgs) -> Result<()> {
    if let Some(parallel) = args.parallel {
        config.orchestrator.max_parallel = parallel.max(1);
    }
    if let Some(secs) = args.timeout_secs {
        config.orchestrator.timeout_ms = secs.saturating_mul(1000).max(1);
    }

    let credentials = credentials(&config, &args);
    let mode = args.mode.unwrap_or(config.session.default_mode);
    let session = Arc::new(Session::new(mode, credentials.clone()));
    if !session.has_credential() {
        bail!("No API key available: pass --api-key, set GEMINI_API_KEY, or set remote.api_key");
    }

    let previews: Arc<dyn PreviewProvider> = Arc::new(InMemoryPreviews::new());
    let library = Arc::new(PhotoLibrary::new(previews));
    let client: Arc<dyn RestorationClient> = Arc::new(GeminiClient::new(&config.remote, credentials));
    info!(
        "Restoring {} photo(s) in {} mode with {}",
        args.files.len(),
        mode,
        client.model_for(mode)
    );

    let adjustments = args.adjustments();
    let stems = export::output_stems(&args.files);
    let mut sources = HashMap::new();
    for (path, stem) in args.files.iter().zip(stems) {
        let payload = export::read_photo(path).await?;
        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        let id = library.add(payload, name).await;
        for (adjustment, value) in &adjustments {
            library.update_adjustment(id, *adjustment, *value).await?;
        }
        sources.insert(id, (path.clone(), stem));
    }

    let orchestrator = RestorationOrchestrator::new(
        config.orchestrator.clone(),
        Arc::clone(&library),
        client,
        Arc::clone(&session),
    )
    .with_progress(Arc::new(|progress: &BatchProgress| {
        info!(
            "[{}/{}] photo {} {}",
            progress.done,
            progress.total,
            progress.id,
            progress.outcome.as_str()
        );
    }));

    let summary = orchestrator.process_all().await?;

    for photo in library.snapshot().await {
        let Some((source, stem)) = sources.get(&photo.id) else {
            continue;
        };
        match (photo.status, &photo.result) {
            (PhotoStatus::Completed, Some(restored)) => {
                let path = export::write_restored(
                    &args.out,
                    source,
                    stem,
                    restored,
                    &photo.adjustments,
                )
                .await?;
                println!("{} -> {}", source.display(), path.display());
            }
            _ => {
                let message = photo.error.as_deref().unwrap_or("not restored");
                warn!("{}: {}", source.display(), message);
                println!("{} failed: {}", source.display(), message);
            }
        }
    }

    if args.metrics {
        print!("{}", metrics::render()?);
    }

    if !session.has_credential() {
        warn!("The API key was rejected; select a different key before retrying");
    }

    info!(
        "Done: {} restored, {} failed, {} skipped",
        summary.completed, summary.failed, summary.skipped
    );
    if summary.failed > 0 {
        bail!(
            "{} of {} photo(s) failed to restore",
            summary.failed,
            summary.eligible
        );
    }
    Ok(())
}

/// Key from `--api-key` acts as the user's selection; the configured or
/// environment key is the platform default.
fn credentials(config: &Config, args: &RestoreArgs) -> CredentialResolver {
    let platform_key = config
        .remote
        .api_key
        .clone()
        .and_then(ApiKey::new)
        .or_else(platform_key_from_env);
    let selected = args.api_key.clone().and_then(ApiKey::new);

    CredentialResolver::new()
        .with_selector(Arc::new(StaticKeySelector::new(selected)))
        .with_platform_key(platform_key)
}
