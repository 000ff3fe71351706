use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use vibe_seg::capture::{CaptureSource, ImageSequence};
use vibe_seg::output::{ForegroundLog, ImageSequenceWriter, OutputSink};
use vibe_seg::segmentation::{self, Preprocessor, SegmentationModel, ViBeParams};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of input frames (png, jpg, bmp, tif)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for result frames
    #[arg(short, long, default_value = "result")]
    output: PathBuf,

    /// Only read input files whose name starts with this
    #[arg(long)]
    prefix: Option<String>,

    /// Working resolution width
    #[arg(long, default_value_t = 720)]
    width: u32,

    /// Working resolution height
    #[arg(long, default_value_t = 576)]
    height: u32,

    /// Samples kept per pixel
    #[arg(long, default_value_t = 20)]
    samples: usize,

    /// Matching samples needed to call a pixel background
    #[arg(long, default_value_t = 3)]
    min_matches: usize,

    /// Intensity distance under which a sample matches
    #[arg(long, default_value_t = 20)]
    radius: u32,

    /// Update probability is 1 / subsampling
    #[arg(long, default_value_t = 16)]
    subsampling: u32,

    /// Process every N-th input frame
    #[arg(long, default_value_t = 1)]
    frame_interval: usize,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Remove the output directory before writing
    #[arg(long)]
    clean: bool,

    /// Write the bare mask instead of frame and mask side by side
    #[arg(long)]
    mask_only: bool,

    /// Write per-frame foreground counts to this CSV file
    #[arg(long)]
    counts: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("vibe-seg starting");
    tracing::info!("Working resolution: {}x{}", args.width, args.height);

    ensure!(args.frame_interval >= 1, "--frame-interval must be at least 1");

    let params = ViBeParams {
        num_samples: args.samples,
        min_matches: args.min_matches,
        match_radius: args.radius,
        subsampling: args.subsampling,
    };
    let model = segmentation::create_default_model(args.width, args.height, params, args.seed)
        .context("Failed to create segmentation model")?;

    let mut capture = ImageSequence::open_with_prefix(&args.input, args.prefix.as_deref())
        .context("Failed to open input frames")?;
    tracing::info!(
        "Source: {}x{}, {} frames",
        capture.resolution().0,
        capture.resolution().1,
        capture.frame_count().unwrap_or_default()
    );

    let output_width = if args.mask_only {
        args.width
    } else {
        args.width
            .checked_mul(2)
            .context("Side-by-side output width overflows")?
    };
    let mut output = ImageSequenceWriter::new(&args.output, output_width, args.height, args.clean)
        .context("Failed to prepare output directory")?;

    let mut counts = args
        .counts
        .as_ref()
        .map(ForegroundLog::create)
        .transpose()?;

    let preprocessor = Preprocessor::new(args.width, args.height);

    let processed = run_pipeline(
        &mut capture,
        &mut output,
        model,
        &preprocessor,
        counts.as_mut(),
        args.frame_interval,
        args.mask_only,
    )?;

    if let Some(counts) = counts {
        counts.finish()?;
    }

    tracing::info!(
        "Done: {} frames written to {}",
        processed,
        args.output.display()
    );

    Ok(())
}

fn run_pipeline<C, O, W>(
    capture: &mut C,
    output: &mut O,
    mut model: Box<dyn SegmentationModel>,
    preprocessor: &Preprocessor,
    mut counts: Option<&mut ForegroundLog<W>>,
    frame_interval: usize,
    mask_only: bool,
) -> Result<usize>
where
    C: CaptureSource,
    O: OutputSink,
    W: Write,
{
    let mut source_index = 0usize;
    let mut frame_count = 0usize;
    let mut total_capture_time = Duration::ZERO;
    let mut total_segment_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    ensure!(
        model.input_size() == preprocessor.target_size(),
        "Model expects {:?} frames but preprocessor produces {:?}",
        model.input_size(),
        preprocessor.target_size()
    );
    let (width, height) = preprocessor.target_size();
    let composite_width = if mask_only { width } else { width.saturating_mul(2) };
    ensure!(
        output.resolution() == (composite_width, height),
        "Output expects {:?} frames but the pipeline produces {:?}",
        output.resolution(),
        (composite_width, height)
    );

    tracing::info!("Starting pipeline, frame_interval={}", frame_interval);

    loop {
        // Capture frame
        let capture_start = Instant::now();
        let Some(frame) = capture
            .capture_frame()
            .context("Failed to capture frame")?
        else {
            break;
        };
        source_index += 1;
        if source_index % frame_interval != 0 {
            continue;
        }
        let gray = preprocessor.preprocess(&frame);
        total_capture_time += capture_start.elapsed();

        // Segmentation
        let segment_start = Instant::now();
        let result = model
            .segment(&gray)
            .with_context(|| format!("Failed to segment frame {}", frame_count))?;
        total_segment_time += segment_start.elapsed();

        tracing::debug!(
            "Frame {}: {} foreground pixels",
            frame_count,
            result.foreground_count
        );

        // Output frame
        let output_start = Instant::now();
        let mask = Preprocessor::mask_to_image(&result.mask)?;
        let output_frame = if mask_only {
            mask
        } else {
            Preprocessor::side_by_side(&gray, &mask)?
        };
        output
            .write_frame(&output_frame)
            .context("Failed to write frame")?;
        if let Some(log) = counts.as_deref_mut() {
            log.record(frame_count, result.foreground_count)?;
        }
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_segment_ms = total_segment_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_segment_ms + avg_output_ms;
            let actual_fps = 1000.0 / total_ms;

            tracing::info!(
                "Frame {}: read={:.1}ms, segment={:.1}ms, write={:.1}ms, total={:.1}ms, fps={:.1}",
                frame_count,
                avg_capture_ms,
                avg_segment_ms,
                avg_output_ms,
                total_ms,
                actual_fps
            );
            tracing::info!(
                "Frame {}: foreground={} ({:.1}%)",
                frame_count,
                result.foreground_count,
                result.foreground_ratio() * 100.0
            );
        }
    }

    Ok(frame_count)
}
