//! Headless runner for the particle field
//!
//! Drives the same field and frame loop the page uses, against a recording
//! surface and a timer standing in for the display refresh.
//!
//! Run with: cargo run --features cli --bin field-cli -- --frames 300 --pointer 400,300

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use clap::Parser;
    use neural_field::core::FrameScheduler;
    use serde::Serialize;

    #[derive(Parser, Debug)]
    #[command(name = "field-cli", about = "Run the particle field without a browser")]
    pub struct Args {
        /// Surface width
        #[arg(long, default_value_t = 800.0)]
        pub width: f64,

        /// Surface height
        #[arg(long, default_value_t = 600.0)]
        pub height: f64,

        /// Frames to render before exiting
        #[arg(long, default_value_t = 600)]
        pub frames: u64,

        /// Frame cadence
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=240))]
        pub fps: u32,

        /// RNG seed (entropy if omitted)
        #[arg(long)]
        pub seed: Option<u64>,

        /// Fixed pointer position as `x,y`
        #[arg(long, value_parser = parse_point)]
        pub pointer: Option<(f64, f64)>,

        #[arg(long, default_value = "light", value_parser = ["light", "dark"])]
        pub theme: String,

        /// JSON file overriding field constants
        #[arg(long)]
        pub config: Option<std::path::PathBuf>,

        /// Resize mid-run, as `frame:WIDTHxHEIGHT`
        #[arg(long, value_parser = parse_resize)]
        pub resize_at: Option<ResizeAt>,

        /// Print a JSON summary to stdout when done
        #[arg(long)]
        pub json: bool,
    }

    #[derive(Clone, Copy, Debug)]
    pub struct ResizeAt {
        pub frame: u64,
        pub width: f64,
        pub height: f64,
    }

    fn parse_point(s: &str) -> Result<(f64, f64), String> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected x,y, got {s:?}"))?;
        let x = x.trim().parse::<f64>().map_err(|e| format!("bad x: {e}"))?;
        let y = y.trim().parse::<f64>().map_err(|e| format!("bad y: {e}"))?;
        Ok((x, y))
    }

    fn parse_resize(s: &str) -> Result<ResizeAt, String> {
        let (frame, size) = s
            .split_once(':')
            .ok_or_else(|| format!("expected frame:WxH, got {s:?}"))?;
        let (width, height) = size
            .split_once('x')
            .ok_or_else(|| format!("expected WxH, got {size:?}"))?;
        Ok(ResizeAt {
            frame: frame.parse().map_err(|e| format!("bad frame: {e}"))?,
            width: width.parse().map_err(|e| format!("bad width: {e}"))?,
            height: height.parse().map_err(|e| format!("bad height: {e}"))?,
        })
    }

    /// Single-slot scheduler; the runner's interval tick fires the pending frame
    #[derive(Default)]
    pub struct TickScheduler {
        next: u64,
        pending: Option<u64>,
    }

    impl TickScheduler {
        pub fn take_due(&mut self) -> Option<u64> {
            self.pending.take()
        }
    }

    impl FrameScheduler for TickScheduler {
        type Handle = u64;

        fn request_frame(&mut self) -> Option<u64> {
            self.next += 1;
            self.pending = Some(self.next);
            self.pending
        }

        fn cancel_frame(&mut self, handle: u64) {
            if self.pending == Some(handle) {
                self.pending = None;
            }
        }
    }

    #[derive(Debug, Default, Serialize)]
    pub struct RunSummary {
        pub frames: u64,
        pub nodes: usize,
        pub width: f64,
        pub height: f64,
        pub edges: usize,
        pub near_nodes: usize,
        pub glow_links: usize,
        pub elapsed_secs: f64,
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;
    use neural_field::core::{Animator, FieldConfig, FrameStats, ParticleField, RecordingSurface};
    use neural_field::theme::Theme;
    use runner::{Args, RunSummary, TickScheduler};
    use std::time::{Duration, Instant};
    use tracing::{debug, info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,neural_field=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            FieldConfig::from_json(&json)?
        }
        None => FieldConfig::default(),
    };
    debug!(?config, "Field config");

    let field = match args.seed {
        Some(seed) => ParticleField::with_seed(config, seed),
        None => ParticleField::new(config),
    };
    let theme = Theme::from_attr(&args.theme);
    let mut animator = Animator::new(field, TickScheduler::default());
    let mut surface = RecordingSurface::new();

    animator.resize(args.width, args.height);
    animator.set_visible(true);
    if let Some((x, y)) = args.pointer {
        animator.pointer_move(x, y);
    }

    info!(
        width = args.width,
        height = args.height,
        frames = args.frames,
        fps = args.fps,
        theme = theme.as_str(),
        "Running particle field"
    );

    let start_time = Instant::now();
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(args.fps)));
    let mut resize = args.resize_at;
    let mut totals = FrameStats::default();
    let mut window = FrameStats::default();

    while animator.frames_rendered() < args.frames {
        interval.tick().await;

        if let Some(r) = resize.filter(|r| r.frame <= animator.frames_rendered()) {
            info!(frame = animator.frames_rendered(), width = r.width, height = r.height, "Resizing");
            animator.resize(r.width, r.height);
            resize = None;
        }

        if animator.scheduler_mut().take_due().is_none() {
            warn!(state = ?animator.state(), "No frame scheduled, stopping");
            break;
        }
        let Some(stats) = animator.on_frame(&mut surface, theme) else {
            break;
        };
        totals += stats;
        window += stats;

        let frame = animator.frames_rendered();
        if frame % u64::from(args.fps) == 0 {
            let per_frame = f64::from(args.fps);
            info!(
                frame,
                edges = format!("{:.1}", window.edges as f64 / per_frame),
                near = format!("{:.1}", window.near_nodes as f64 / per_frame),
                glow = format!("{:.1}", window.glow_links as f64 / per_frame),
                commands = surface.commands().len(),
                "stats"
            );
            window = FrameStats::default();
        }
    }

    let (width, height) = animator.field().dimensions();
    let summary = RunSummary {
        frames: animator.frames_rendered(),
        nodes: animator.field().nodes().len(),
        width,
        height,
        edges: totals.edges,
        near_nodes: totals.near_nodes,
        glow_links: totals.glow_links,
        elapsed_secs: start_time.elapsed().as_secs_f64(),
    };
    info!(frames = summary.frames, elapsed = format!("{:.2}s", summary.elapsed_secs), "Done");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
