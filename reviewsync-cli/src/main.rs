use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reviewsync::{
    JsonDirSource, NullSyncSink, PlaybackMode, RenderOutcome, ReviewSession, ReviewSessionOpts,
    SurfaceSize,
};

#[derive(Parser, Debug)]
#[command(name = "reviewsync", version)]
struct Cli {
    /// JSON file overriding review options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active annotations and draw commands at one time.
    Query(QueryArgs),
    /// Simulate playback over a range and print one JSON line per rendered frame.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Directory holding `<session>/session.json` and `<session>/annotations.json`.
    #[arg(long)]
    root: PathBuf,

    /// Session id.
    #[arg(long)]
    session: String,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

#[derive(Parser, Debug)]
struct QueryArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Playback time in seconds.
    #[arg(long)]
    time: f64,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Start time in seconds.
    #[arg(long, default_value_t = 0.0)]
    from: f64,

    /// Stop time in seconds (defaults to the session duration).
    #[arg(long)]
    to: Option<f64>,

    /// Host frame interval in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    step: f64,

    /// Playback rate.
    #[arg(long, default_value_t = 1.0)]
    rate: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let opts = load_opts(cli.config.as_ref())?;
    tracing::debug!(?opts, "review options");
    match cli.cmd {
        Command::Query(args) => cmd_query(args, opts),
        Command::Replay(args) => cmd_replay(args, opts),
    }
}

fn load_opts(path: Option<&PathBuf>) -> anyhow::Result<ReviewSessionOpts> {
    let Some(path) = path else {
        return Ok(ReviewSessionOpts::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    ReviewSessionOpts::from_json_str(&text)
        .with_context(|| format!("parse config '{}'", path.display()))
}

fn open(args: &SessionArgs, opts: ReviewSessionOpts) -> anyhow::Result<ReviewSession> {
    let source = JsonDirSource::new(&args.root);
    let mut sess = ReviewSession::new(opts);
    sess.set_surface(SurfaceSize::new(args.width, args.height));
    let report = sess
        .open_from_source(&source, &args.session, &mut reviewsync::thread_sleep)
        .with_context(|| format!("open session '{}'", args.session))?;
    for skipped in &report.skipped {
        eprintln!(
            "skipped {:?} #{}: {}",
            skipped.kind, skipped.index, skipped.reason
        );
    }
    Ok(sess)
}

fn seek_settled(sess: &mut ReviewSession, t: f64) -> anyhow::Result<()> {
    sess.seek(t)?;
    sess.on_seek_complete();
    Ok(())
}

fn cmd_query(args: QueryArgs, opts: ReviewSessionOpts) -> anyhow::Result<()> {
    let mut sess = open(&args.session, opts)?;
    seek_settled(&mut sess, args.time)?;
    if sess.render(&mut NullSyncSink) != RenderOutcome::Rendered {
        anyhow::bail!("nothing rendered (surface {}x{})", args.session.width, args.session.height);
    }

    let out = serde_json::to_string_pretty(&sess.snapshot())?;
    println!("{out}");
    Ok(())
}

fn cmd_replay(args: ReplayArgs, opts: ReviewSessionOpts) -> anyhow::Result<()> {
    if !(args.step.is_finite() && args.step > 0.0) {
        anyhow::bail!("--step must be positive");
    }
    let mut sess = open(&args.session, opts)?;
    let to = args.to.unwrap_or(sess.playback_state().duration);
    let frame = Duration::from_secs_f64(args.step);

    sess.set_rate(args.rate);
    seek_settled(&mut sess, args.from)?;
    sess.play()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut rendered = 0u64;
    loop {
        if sess.render(&mut NullSyncSink) == RenderOutcome::Rendered {
            serde_json::to_writer(&mut out, &sess.snapshot())?;
            writeln!(out)?;
            rendered += 1;
        }
        let state = sess.playback_state();
        if state.mode == PlaybackMode::Ended || state.current_time >= to {
            break;
        }
        sess.advance(frame);
    }
    out.flush()?;

    let stats = sess.sync_stats();
    eprintln!(
        "rendered {rendered} frame(s); {} tick(s) superseded",
        stats.superseded
    );
    Ok(())
}
