//! CLI command implementations

use crate::output::{to_json, to_table, OutputFormat};
use anyhow::Context;
use console::style as paint;
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tabled::Tabled;
use tokio::time::{sleep, Instant};
use tracing::info;
use vidbanner_core::fake::{FakeTarget, FakeVimeoSdk, FakeYouTubeSdk};
use vidbanner_core::style::{keyframes_css, StyleBlock};
use vidbanner_core::{
    AspectRatio, BannerConfig, BannerStyle, HostCallbacks, LayoutFlags, LifecycleEvent, PlaybackState,
    ProviderKind, ProviderServices, VideoBanner, VideoId, VideoSource, ViewportSize, VimeoEvent,
    YouTubeApiLoader, YouTubePlayerState, DEFAULT_OVERLAY,
};

fn load_config(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn parse_state(state: &str) -> anyhow::Result<PlaybackState> {
    serde_json::from_value(serde_json::Value::String(state.trim().to_lowercase()))
        .with_context(|| format!("unknown playback state '{}'", state))
}

fn paint_state(state: PlaybackState) -> String {
    match state {
        PlaybackState::Playing => paint(state).green().to_string(),
        PlaybackState::Loading => paint(state).yellow().to_string(),
        PlaybackState::Disposed => paint(state).dim().to_string(),
        PlaybackState::Uninitialized => state.to_string(),
    }
}

// =============================================================================
// embed-url
// =============================================================================

#[derive(Serialize)]
struct EmbedReport {
    provider: ProviderKind,
    video_id: String,
    url: String,
}

/// Print the embed URL for a video
pub fn embed_url(video_id: &str, source: &str, loop_playback: bool, format: &str) -> anyhow::Result<()> {
    let provider: ProviderKind = source.parse()?;
    let source = VideoSource::new(VideoId::new(video_id)?, provider).with_loop(loop_playback);
    let url = vidbanner_core::embed_url(&source)?;

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let report = EmbedReport {
                provider,
                video_id: source.id.to_string(),
                url: url.to_string(),
            };
            println!("{}", to_json(&report));
        }
        OutputFormat::Text | OutputFormat::Table => println!("{}", url),
    }

    Ok(())
}

// =============================================================================
// validate
// =============================================================================

#[derive(Serialize, Default)]
struct ValidationReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn validation_report(json: &str) -> ValidationReport {
    let checked = BannerConfig::from_json(json).and_then(|config| {
        let source = config.validate()?;
        let url = vidbanner_core::embed_url(&source)?;
        Ok((config, source, url))
    });

    match checked {
        Ok((config, source, url)) => ValidationReport {
            valid: true,
            provider: Some(source.provider),
            video_id: Some(source.id.to_string()),
            aspect_ratio: config.aspect().ok(),
            embed_url: Some(url.to_string()),
            ..Default::default()
        },
        Err(e) => ValidationReport {
            error_code: Some(e.error_code()),
            error: Some(e.to_string()),
            ..Default::default()
        },
    }
}

/// Validate a banner config file
pub fn validate(path: &Path, format: &str) -> anyhow::Result<()> {
    let json = load_config(path)?;
    let report = validation_report(&json);

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&report)),
        OutputFormat::Text | OutputFormat::Table => {
            if report.valid {
                println!("{} {}", paint("VALID").green(), path.display());
                if let (Some(provider), Some(id)) = (&report.provider, &report.video_id) {
                    println!("  Video: {} {}", provider, id);
                }
                if let Some(aspect) = &report.aspect_ratio {
                    println!("  Aspect ratio: {}", aspect);
                }
                if let Some(url) = &report.embed_url {
                    println!("  Embed URL: {}", url);
                }
            } else {
                println!("{} {}", paint("INVALID").red(), path.display());
                if let (Some(code), Some(error)) = (report.error_code, &report.error) {
                    println!("  {}: {}", code, error);
                }
            }
        }
    }

    if !report.valid {
        std::process::exit(1);
    }

    Ok(())
}

// =============================================================================
// style
// =============================================================================

#[derive(Tabled)]
struct StyleRow {
    element: &'static str,
    property: &'static str,
    value: String,
}

#[derive(Serialize)]
struct StyleReport {
    viewport: ViewportSize,
    flags: LayoutFlags,
    state: PlaybackState,
    style: BannerStyle,
}

fn elements(style: &BannerStyle) -> [(&'static str, &StyleBlock); 10] {
    [
        ("container", &style.container),
        ("embed", &style.embed),
        ("overlay", &style.overlay),
        ("text", &style.text),
        ("logo", &style.logo),
        ("title", &style.title),
        ("scrollDown", &style.scroll_down),
        ("learnMore", &style.learn_more),
        ("scrollButton", &style.scroll_button),
        ("scrollIcon", &style.scroll_icon),
    ]
}

/// Show the computed banner styles
pub fn style(
    config: Option<&Path>,
    aspect: &str,
    state: &str,
    width: u32,
    height: u32,
    format: &str,
) -> anyhow::Result<()> {
    let (aspect, overlay) = match config {
        Some(path) => {
            let config = BannerConfig::from_json(&load_config(path)?)?;
            (config.aspect()?, config.overlay().to_string())
        }
        None => (aspect.parse::<AspectRatio>()?, DEFAULT_OVERLAY.to_string()),
    };
    let state = parse_state(state)?;
    let viewport = ViewportSize::new(width, height);
    let flags = LayoutFlags::evaluate(viewport);
    let style = BannerStyle::compute(aspect, &overlay, state, flags);

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let report = StyleReport {
                viewport,
                flags,
                state,
                style,
            };
            println!("{}", to_json(&report));
        }
        OutputFormat::Table => {
            let rows: Vec<StyleRow> = elements(&style)
                .into_iter()
                .flat_map(|(element, block)| {
                    block.declarations().iter().map(move |(property, value)| StyleRow {
                        element,
                        property: *property,
                        value: value.clone(),
                    })
                })
                .collect();
            println!("{}", to_table(rows));
        }
        OutputFormat::Text => {
            println!(
                "Viewport {}x{} (short: {}, wide: {}, tall: {}), state {}",
                width,
                height,
                flags.short_viewport,
                flags.wide_aspect,
                flags.tall_aspect,
                paint_state(state)
            );
            for (element, block) in elements(&style) {
                println!("  {}: {}", paint(element).bold(), block.to_css());
            }
            println!("{}", keyframes_css());
        }
    }

    Ok(())
}

// =============================================================================
// simulate
// =============================================================================

/// Runs deferred YouTube construction on the current `LocalSet`
struct TokioLocalSpawner;

impl LocalSpawn for TokioLocalSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        tokio::task::spawn_local(future);
        Ok(())
    }
}

/// Timeline of a simulation; every delay is relative to the previous step
pub struct SimulateOptions {
    pub source: String,
    pub banners: usize,
    pub api_ms: u64,
    pub ready_ms: u64,
    pub play_ms: u64,
    pub unmount_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
struct TransitionRecord {
    banner: usize,
    elapsed_ms: u64,
    from: PlaybackState,
    to: PlaybackState,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    provider: ProviderKind,
    banners: usize,
    script_requests: u32,
    loaded_callbacks: u32,
    transitions: Vec<TransitionRecord>,
    final_states: Vec<PlaybackState>,
}

/// Fire a provider event on every player built so far
fn broadcast(provider: ProviderKind, vimeo: &FakeVimeoSdk, youtube: &FakeYouTubeSdk, ready: bool) {
    match provider {
        ProviderKind::Vimeo => {
            let event = if ready { VimeoEvent::Loaded } else { VimeoEvent::Play };
            for index in 0..vimeo.players_created() {
                vimeo.emit_on(index, event);
            }
        }
        ProviderKind::YouTube => {
            for index in 0..youtube.players_created() {
                if ready {
                    youtube.emit_ready(index);
                } else {
                    youtube.emit_state(index, YouTubePlayerState::Playing);
                }
            }
        }
    }
}

/// Must run inside a tokio `LocalSet`
async fn run_simulation(options: &SimulateOptions) -> anyhow::Result<SimulationReport> {
    let provider: ProviderKind = options.source.parse()?;
    // Sticky handlers so events fired after unmount still reach the banners
    let vimeo = Rc::new(FakeVimeoSdk::with_sticky_handlers());
    let youtube = Rc::new(FakeYouTubeSdk::new());
    let loader = YouTubeApiLoader::new();
    let services = ProviderServices::new(vimeo.clone(), youtube.clone(), Rc::new(TokioLocalSpawner))
        .with_youtube_loader(loader.clone());

    let started = Instant::now();
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let loaded = Rc::new(Cell::new(0u32));

    let mut banners = Vec::with_capacity(options.banners);
    for index in 0..options.banners {
        let sink = transitions.clone();
        let counter = loaded.clone();
        let host = HostCallbacks::new()
            .on_loaded(move || counter.set(counter.get() + 1))
            .on_event(move |event| {
                if let LifecycleEvent::StateChanged { from, to, .. } = event {
                    sink.borrow_mut().push(TransitionRecord {
                        banner: index,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        from: *from,
                        to: *to,
                    });
                }
            });

        let config = BannerConfig::new(VideoId::from(76979871 + index as u64), provider);
        let mut banner = VideoBanner::new(config, services.clone(), host)?;
        banner.mount(FakeTarget::new(format!("banner-{}", index)))?;
        banners.push(banner);
    }
    info!(provider = %provider, banners = options.banners, "Banners mounted");

    if provider == ProviderKind::YouTube {
        sleep(Duration::from_millis(options.api_ms)).await;
        youtube.fire_api_ready();
        info!("IFrame API ready");
    }

    sleep(Duration::from_millis(options.ready_ms)).await;
    broadcast(provider, &vimeo, &youtube, true);

    sleep(Duration::from_millis(options.play_ms)).await;
    broadcast(provider, &vimeo, &youtube, false);

    sleep(Duration::from_millis(options.unmount_ms)).await;
    for banner in &mut banners {
        banner.unmount();
    }

    // Late provider events: the unmounted banners must ignore them
    broadcast(provider, &vimeo, &youtube, true);
    broadcast(provider, &vimeo, &youtube, false);

    let final_states = banners.iter().map(VideoBanner::state).collect();
    let transitions = transitions.borrow().clone();

    Ok(SimulationReport {
        provider,
        banners: options.banners,
        script_requests: youtube.script_requests(),
        loaded_callbacks: loaded.get(),
        transitions,
        final_states,
    })
}

/// Simulate banners and print every transition
pub async fn simulate(options: SimulateOptions, format: &str) -> anyhow::Result<()> {
    let report = run_simulation(&options).await?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&report)),
        OutputFormat::Text | OutputFormat::Table => {
            println!("Simulating {} {} banner(s)", report.banners, report.provider);
            for t in &report.transitions {
                println!(
                    "  [{:>5}ms] banner {}: {} -> {}",
                    t.elapsed_ms,
                    t.banner,
                    paint_state(t.from),
                    paint_state(t.to)
                );
            }
            println!("\nIFrame API script requests: {}", report.script_requests);
            println!("Loaded callbacks: {}", report.loaded_callbacks);
        }
    }

    Ok(())
}
