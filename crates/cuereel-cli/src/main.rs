mod report;
mod workdir;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cuereel_core::config::{AssetErrorPolicy, AudioErrorPolicy, CuereelConfig};
use cuereel_encode::FfmpegEncoder;
use cuereel_render::{CaptionRenderer, CaptionStyle, RenderPipeline, RenderSettings, VideoDecoder};
use cuereel_resolve::{AssetResolver, HttpMediaIndex};
use cuereel_timeline::{
    build_caption_clip, build_visual_clip, AssetKind, Cue, RenderJob, ResolvedAsset, TimedClip,
};

#[derive(Parser)]
#[command(
    name = "cuereel",
    version,
    about = "Cuereel — compile timed-cue scripts into rendered video"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a cue script to a video file
    Render {
        /// Path to the cue script
        #[arg(short = 'i', long, default_value = "./defaults/default-script.txt")]
        script: PathBuf,

        /// Path to the background audio track
        #[arg(short, long, default_value = "./defaults/default-song.mp3")]
        audio: PathBuf,

        /// Output directory (must exist)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Title of the output video (default: cuereel-<timestamp>)
        #[arg(short, long)]
        title: Option<String>,

        /// Keep the per-job working directory after the render
        #[arg(long)]
        keep_workdir: bool,
    },

    /// Parse and validate a cue script without rendering
    Check {
        /// Path to the cue script
        #[arg()]
        script: PathBuf,
    },

    /// Display version and engine info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Render {
            script,
            audio,
            output,
            title,
            keep_workdir,
        } => cmd_render(script, audio, output, title, keep_workdir),
        Commands::Check { script } => cmd_check(script),
        Commands::Info => cmd_info(),
    }
}

fn cmd_render(
    script: PathBuf,
    audio: PathBuf,
    output: PathBuf,
    title: Option<String>,
    keep_workdir: bool,
) -> Result<()> {
    let start = Instant::now();

    // Best-effort config load; a missing file means defaults.
    let config = CuereelConfig::load_from_file(Path::new("cuereel.config.toml")).unwrap_or_default();

    // Explicit path checks before the core runs.
    validate_paths(&script, &audio, &output, &config)?;

    let asset_policy = AssetErrorPolicy::parse(&config.fetch.on_asset_error)?;
    let audio_policy = AudioErrorPolicy::parse(&config.fetch.on_audio_error)?;
    let settings = RenderSettings::from_config(&config.render)?;
    let style = CaptionStyle::from_config(&config.caption)?;
    let captions = CaptionRenderer::from_font_file(Path::new(&config.caption.font_path), style)?;

    println!("🎬 Cuereel v{}", env!("CARGO_PKG_VERSION"));
    println!("   Script: {}", script.display());

    // Phase 1: Parse
    let source = std::fs::read_to_string(&script)
        .with_context(|| format!("failed to read script: {}", script.display()))?;
    let parse_start = Instant::now();
    let cues = cuereel_script::parse_script(&source)?;
    println!(
        "   ✓ Parsed {} cues in {:.1}ms",
        cues.len(),
        parse_start.elapsed().as_secs_f64() * 1000.0
    );
    if cues.is_empty() {
        anyhow::bail!("script {} contains no cues; nothing to render", script.display());
    }

    let title = title.unwrap_or_else(default_title);
    let job = RenderJob::new(title, output, cues, &audio);

    let cache_root = workdir::expand_tilde(&config.resources.cache_dir)?;
    let job_dir = workdir::create_job_workdir(&cache_root, &job.id)?;

    // Phase 2: Resolve assets (bounded fan-out, fan-in in cue order)
    let fetch_start = Instant::now();
    let index = Arc::new(HttpMediaIndex::new(&config.fetch)?);
    let resolver = AssetResolver::new(
        index,
        &job_dir,
        &config.fetch.fallback_asset,
        asset_policy,
    );
    let assets = resolver.resolve_all(&job.cues, config.fetch.concurrency)?;
    println!(
        "   ✓ Resolved {} assets in {:.2}s",
        assets.len(),
        fetch_start.elapsed().as_secs_f64()
    );

    // Phase 3: Build the timeline
    let pipeline = RenderPipeline::new(captions);
    let (clips, credited_tags) = build_timeline(
        &pipeline,
        &job.cues,
        assets,
        asset_policy,
        &config.fetch.fallback_asset,
        settings.frame_height,
    )?;

    // Phase 4: Loop-extend the background audio to the full timeline
    let audio_track = prepare_audio(&job, &job_dir, audio_policy)?;

    // Phase 5: Render frames
    let render_start = Instant::now();
    let result = pipeline.render(&clips, job.total_duration, &settings)?;
    println!(
        "   ✓ Rendered {} frames in {:.2}s",
        result.frame_count,
        render_start.elapsed().as_secs_f64()
    );

    // Phase 6: Encode and publish atomically
    FfmpegEncoder::encode(
        &result.frames,
        audio_track.as_deref(),
        result.width,
        result.height,
        result.fps,
        &job.output_path(),
    )?;
    println!(
        "   ✓ Published {} in {:.2}s total",
        job.output_path().display(),
        start.elapsed().as_secs_f64()
    );

    // Attribution report
    let artists = report::artist_credits(credited_tags.iter().map(|t| t.as_slice()));
    if !artists.is_empty() {
        println!("\nArtists included in this video:");
        for artist in &artists {
            println!("  {}", artist);
        }
    }

    if keep_workdir {
        println!("   Working directory kept at {}", job_dir.display());
    } else {
        workdir::remove_workdir(&job_dir);
    }

    Ok(())
}

/// Probe motion assets and assemble the ordered clip list: per cue, the
/// visual layer then its caption (captions draw above their visual).
/// Returns the clips plus each cue's resolved tag set for attribution.
fn build_timeline(
    pipeline: &RenderPipeline,
    cues: &[Cue],
    assets: Vec<ResolvedAsset>,
    policy: AssetErrorPolicy,
    fallback: &str,
    frame_height: u32,
) -> Result<(Vec<TimedClip>, Vec<Vec<String>>)> {
    let mut clips = Vec::with_capacity(cues.len() * 2);
    let mut credited_tags = Vec::with_capacity(cues.len());

    for (i, (cue, asset)) in cues.iter().zip(assets).enumerate() {
        let (asset, native_duration) = match probe_native(pipeline, asset, i) {
            Ok(pair) => pair,
            Err(err) => match policy {
                AssetErrorPolicy::Fallback => {
                    tracing::warn!("cue {}: {}; using fallback asset", i, err);
                    (ResolvedAsset::fallback(fallback), None)
                }
                AssetErrorPolicy::Abort => return Err(err.into()),
            },
        };

        credited_tags.push(asset.tags.clone());
        clips.push(build_visual_clip(asset, native_duration, cue, frame_height));
        clips.push(build_caption_clip(cue));
    }

    Ok((clips, credited_tags))
}

/// Probe a motion asset's native duration (needed for loop arithmetic);
/// stills have none.
fn probe_native(
    pipeline: &RenderPipeline,
    asset: ResolvedAsset,
    cue_index: usize,
) -> cuereel_core::CuereelResult<(ResolvedAsset, Option<f64>)> {
    if asset.kind != AssetKind::Motion {
        return Ok((asset, None));
    }
    let info = pipeline.decoder().probe(&asset.path)?;
    tracing::debug!(
        "cue {}: motion source {} is {:.2}s native",
        cue_index,
        asset.path.display(),
        info.duration_secs
    );
    Ok((asset, Some(info.duration_secs)))
}

/// Loop-extend the background track into the working directory, honoring
/// the explicit audio-error policy: silent render or abort.
fn prepare_audio(
    job: &RenderJob,
    job_dir: &Path,
    policy: AudioErrorPolicy,
) -> Result<Option<PathBuf>> {
    let extended = job_dir.join("audio-extended.wav");
    match cuereel_encode::extend_audio(
        &job.audio_path,
        job.total_duration.as_seconds(),
        &extended,
    ) {
        Ok(()) => Ok(Some(extended)),
        Err(err) => match policy {
            AudioErrorPolicy::Silent => {
                tracing::warn!("audio track unusable ({}); rendering without audio", err);
                Ok(None)
            }
            AudioErrorPolicy::Abort => Err(err.into()),
        },
    }
}

fn cmd_check(script: PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(&script)
        .with_context(|| format!("failed to read script: {}", script.display()))?;
    let cues = cuereel_script::parse_script(&source)?;

    println!("✓ {} parses cleanly: {} cues", script.display(), cues.len());
    for (i, cue) in cues.iter().enumerate() {
        println!(
            "  [{}] {}  text={:?}  tags={:?}",
            i,
            cue.range(),
            cue.text,
            cue.tags
        );
    }
    let total = cues.iter().map(|c| c.end.as_seconds()).fold(0.0, f64::max);
    println!("  timeline length: {:.3}s", total);
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("cuereel v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  ffmpeg:  {}",
        if FfmpegEncoder::is_available() {
            "available"
        } else {
            "NOT FOUND"
        }
    );
    println!(
        "  decoder: {}",
        if VideoDecoder::is_available() {
            "available"
        } else {
            "NOT FOUND"
        }
    );
    Ok(())
}

/// Timestamped default title, like `cuereel-20260807-153000`.
fn default_title() -> String {
    format!("cuereel-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}

/// Explicit result-based path validation; the core never sees a bad path.
fn validate_paths(
    script: &Path,
    audio: &Path,
    output: &Path,
    config: &CuereelConfig,
) -> Result<()> {
    use cuereel_core::CuereelError;

    if !script.is_file() {
        return Err(CuereelError::Config(format!("script not found: {}", script.display())).into());
    }
    if !audio.is_file() {
        return Err(CuereelError::Config(format!("audio not found: {}", audio.display())).into());
    }
    if !output.is_dir() {
        return Err(CuereelError::Config(format!(
            "output directory not found: {}",
            output.display()
        ))
        .into());
    }
    let font = Path::new(&config.caption.font_path);
    if !font.is_file() {
        return Err(CuereelError::Config(format!(
            "caption font not found: {}",
            font.display()
        ))
        .into());
    }
    let fallback = Path::new(&config.fetch.fallback_asset);
    if !fallback.is_file() {
        return Err(CuereelError::Config(format!(
            "fallback asset not found: {}",
            fallback.display()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_shape() {
        let title = default_title();
        assert!(title.starts_with("cuereel-"));
        // cuereel-YYYYMMDD-HHMMSS
        assert_eq!(title.len(), "cuereel-".len() + 15);
    }

    #[test]
    fn test_validate_paths_rejects_missing_script() {
        let config = CuereelConfig::default();
        let err = validate_paths(
            Path::new("/nonexistent/script.txt"),
            Path::new("/nonexistent/song.mp3"),
            Path::new("/"),
            &config,
        )
        .unwrap_err();
        assert!(err.to_string().contains("script not found"));
    }
}
