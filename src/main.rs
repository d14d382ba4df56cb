// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reconrs::application::context::RunContext;
use reconrs::application::use_cases::recon_run::ReconPipeline;
use reconrs::config::data::{load_allowlist, load_seeds, load_wordlist, SettingsError};
use reconrs::config::settings::{DiscoverySettings, Settings};
use reconrs::domain::discovery::technique::DiscoveryTechnique;
use reconrs::domain::repositories::content_record_repository::ContentRecordRepository;
use reconrs::domain::search::engine::{Platform, PlatformCapability};
use reconrs::domain::services::extraction_service::ExtractionService;
use reconrs::engines::governor::RequestGovernor;
use reconrs::engines::identity::IdentityPool;
use reconrs::engines::reqwest_engine::ReqwestEngine;
use reconrs::engines::traits::PageFetcher;
use reconrs::infrastructure::discovery::aggregator::DiscoveryEngine;
use reconrs::infrastructure::discovery::archive::ArchiveSnapshot;
use reconrs::infrastructure::discovery::build_client;
use reconrs::infrastructure::discovery::cert_transparency::CertTransparency;
use reconrs::infrastructure::discovery::dns_bruteforce::{DnsBruteForce, TokioResolver, DEFAULT_WORDLIST};
use reconrs::infrastructure::discovery::passive_api::PassiveApi;
use reconrs::infrastructure::repositories::jsonl_record_repo::JsonLinesRecordRepository;
use reconrs::infrastructure::repositories::memory_record_repo::InMemoryRecordRepository;
use reconrs::infrastructure::search::{DorkType, PlatformClient};
use reconrs::infrastructure::services::event_publishers::TracingPublisher;
use reconrs::utils::errors::RunError;
use reconrs::utils::telemetry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 主函数
///
/// 加载配置与数据文件，装配各组件并执行一次侦察运行
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new().map_err(SettingsError::from)?;

    // 2. Initialize logging
    telemetry::init_telemetry(settings.telemetry.json);
    info!("Starting reconrs...");

    if let Some(addr) = settings.metrics.listen_addr {
        reconrs::infrastructure::metrics::init_metrics(addr);
    }

    // 3. Load data files
    let seeds = load_seeds(&settings.run.seeds_path)?;
    let wordlist = match &settings.discovery.wordlist_path {
        Some(path) => load_wordlist(path)?,
        None => DEFAULT_WORDLIST.iter().map(|w| w.to_string()).collect(),
    };
    let allowlist = settings
        .run
        .allowlist_path
        .as_deref()
        .map(load_allowlist)
        .transpose()?
        .map(Arc::new);
    info!(
        seeds = seeds.len(),
        words = wordlist.len(),
        allowlist = allowlist.as_ref().map(|a| a.len()),
        "Data files loaded"
    );

    // 4. Build components
    let discovery = DiscoveryEngine::new(
        build_techniques(&settings.discovery, wordlist),
        settings.discovery.technique_timeout(),
    );

    let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestEngine::new());
    let identities = IdentityPool::new(settings.governor.user_agents.clone());
    let governor_config = settings.governor.to_config();
    let governors: Vec<Arc<RequestGovernor>> = (0..settings.run.fetch_streams.max(1))
        .map(|_| {
            Arc::new(RequestGovernor::new(
                fetcher.clone(),
                identities.clone(),
                governor_config.clone(),
            ))
        })
        .collect();

    let repository: Arc<dyn ContentRecordRepository> = match &settings.run.output_path {
        Some(path) => {
            info!(path = %path.display(), "Storing records as JSON lines");
            Arc::new(JsonLinesRecordRepository::new(path))
        }
        None => Arc::new(InMemoryRecordRepository::new()),
    };

    let extraction = ExtractionService::new(settings.extraction);
    let search_governor = Arc::new(RequestGovernor::new(fetcher, identities, governor_config));
    let platforms = build_platforms(&settings, search_governor, &extraction, allowlist.clone());

    let mut pipeline = ReconPipeline::new(discovery, governors, repository)
        .with_extraction(extraction)
        .with_quality(settings.quality.clone())
        .with_search(platforms, settings.run.keywords.clone())
        .with_max_targets(settings.run.max_targets);
    if let Some(allowlist) = allowlist {
        pipeline = pipeline.with_allowlist(allowlist);
    }

    // 5. Run until finished or interrupted
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current work units");
            ctrl_c.cancel();
        }
    });

    let ctx = RunContext::with_cancel(cancel, Arc::new(TracingPublisher));
    let report = match pipeline.run(&seeds, &ctx).await {
        Ok(report) => report,
        Err(RunError::Persistence { failures, stored_ids }) => {
            for failure in &failures {
                error!(url = %failure.url, error = %failure.source, "Accepted record was not persisted");
                // Unsaved records go to stdout so the caller can recover them
                println!("{}", serde_json::to_string(&failure.record)?);
            }
            anyhow::bail!(
                "{} accepted records could not be persisted ({} stored before the failure)",
                failures.len(),
                stored_ids.len()
            );
        }
    };

    info!(
        run_id = %report.run_id,
        targets = report.targets.len(),
        search_urls = report.search_urls,
        fetched = report.stats.fetched,
        blocked = report.stats.blocked,
        accepted = report.stats.accepted,
        stored = report.stats.stored,
        cancelled = report.cancelled,
        "Run finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn build_techniques(settings: &DiscoverySettings, wordlist: Vec<String>) -> Vec<Arc<dyn DiscoveryTechnique>> {
    let client = build_client(settings.http_timeout());

    vec![
        Arc::new(CertTransparency::with_endpoints(
            client.clone(),
            &settings.crtsh_url,
            &settings.certspotter_url,
        )),
        Arc::new(DnsBruteForce::new(
            Arc::new(TokioResolver),
            wordlist,
            settings.dns_workers,
            settings.probe_timeout(),
        )),
        Arc::new(ArchiveSnapshot::new(
            client.clone(),
            &settings.wayback_url,
            settings.wayback_limit,
        )),
        Arc::new(PassiveApi::new(client, &settings.hackertarget_url)),
    ]
}

fn build_platforms(
    settings: &Settings,
    governor: Arc<RequestGovernor>,
    extraction: &ExtractionService,
    allowlist: Option<Arc<reconrs::domain::models::trusted_domains::TrustedDomains>>,
) -> Vec<Arc<dyn PlatformCapability>> {
    let dork_types: Vec<DorkType> = settings
        .run
        .dork_types
        .iter()
        .filter_map(|raw| {
            raw.parse()
                .map_err(|e: String| warn!(dork_type = %raw, error = %e, "Ignoring dork type"))
                .ok()
        })
        .collect();

    settings
        .run
        .platforms
        .iter()
        .filter_map(|raw| {
            raw.parse::<Platform>()
                .map_err(|e| warn!(platform = %raw, error = %e, "Ignoring platform"))
                .ok()
        })
        .map(|platform| {
            let mut client = PlatformClient::new(platform, governor.clone(), extraction.clone());
            if !dork_types.is_empty() {
                client = client.with_dork_types(dork_types.clone());
            }
            if let Some(allowlist) = &allowlist {
                client = client.with_allowlist(allowlist.clone());
            }
            Arc::new(client) as Arc<dyn PlatformCapability>
        })
        .collect()
}
