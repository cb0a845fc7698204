use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use concordance::{
    ActivePosition, CategoryCatalog, MatchConfig, NormalizeConfig, OccurrenceReport,
    PatternTermProvider, ResolverConfig, Segment, SessionConfig, SnippetConfig,
    StaticTermProvider, TermProvider, TimeSnap, TimedWordIndex, TranscriptRenderer,
    TranscriptSession, TranscriptStats, Word, build_index, normalize, parse_segments_file,
    parse_terms_file, write_json,
};

#[derive(Parser)]
#[command(name = "concordance")]
#[command(author, version, about = "Timed transcript index: term occurrences and playback positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Input segments file (JSON array, or object with a `transcription` array)
    #[arg(short, long)]
    input: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep fractional seconds read from `start`/`end`
    #[arg(long)]
    no_round: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct MatchArgs {
    /// Ignore terms shorter than this many characters
    #[arg(long, default_value = "2")]
    min_term_chars: usize,

    /// Words of context shown either side of each occurrence
    #[arg(long, default_value = "10")]
    context: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum SnapArg {
    Floor,
    Nearest,
    Exact,
}

impl From<SnapArg> for TimeSnap {
    fn from(arg: SnapArg) -> Self {
        match arg {
            SnapArg::Floor => TimeSnap::Floor,
            SnapArg::Nearest => TimeSnap::Nearest,
            SnapArg::Exact => TimeSnap::Exact,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize segments and dump the timed word index
    Index {
        #[command(flatten)]
        common: CommonArgs,

        /// Also write a human-readable transcript (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,
    },

    /// Report the active segment and word at a playback time
    Resolve {
        #[command(flatten)]
        common: CommonArgs,

        /// Playback time in seconds
        #[arg(short, long)]
        time: f64,

        /// Snapping applied before segment lookup
        #[arg(long, value_enum, default_value = "floor")]
        snap: SnapArg,
    },

    /// List occurrences of a category's terms
    Match {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        matching: MatchArgs,

        /// Category name, e.g. Person, Place, Unit
        #[arg(short, long)]
        category: String,

        /// Term lists file: JSON object of category -> [terms]
        #[arg(long, conflicts_with = "term")]
        terms: Option<PathBuf>,

        /// Term to look for (repeatable)
        #[arg(long)]
        term: Vec<String>,
    },

    /// List measurement, duration and currency expressions
    Units {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Find a free-text phrase
    Search {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        matching: MatchArgs,

        /// Phrase to search for
        #[arg(short, long)]
        query: String,
    },

    /// Summarize a transcript without matching
    Analyze {
        #[command(flatten)]
        common: CommonArgs,

        /// Term lists file used for per-category term counts
        #[arg(long)]
        terms: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            common,
            human_readable,
        } => {
            setup_logging(common.verbose);
            index_transcript(&common, human_readable.as_deref())
        }
        Commands::Resolve { common, time, snap } => {
            setup_logging(common.verbose);
            resolve_position(&common, time, snap.into())
        }
        Commands::Match {
            common,
            matching,
            category,
            terms,
            term,
        } => {
            setup_logging(common.verbose);
            let provider: Box<dyn TermProvider> = if !term.is_empty() {
                let refs: Vec<&str> = term.iter().map(String::as_str).collect();
                Box::new(StaticTermProvider::default().with(category.as_str(), &refs))
            } else if let Some(path) = terms {
                Box::new(parse_terms_file(&path).context("Failed to parse term lists")?)
            } else {
                Box::new(StaticTermProvider::default())
            };
            match_category(&common, &matching, &category, provider)
        }
        Commands::Units { common, matching } => {
            setup_logging(common.verbose);
            match_category(&common, &matching, "Unit", Box::new(PatternTermProvider))
        }
        Commands::Search {
            common,
            matching,
            query,
        } => {
            setup_logging(common.verbose);
            search_transcript(&common, &matching, &query)
        }
        Commands::Analyze { common, terms } => {
            setup_logging(common.verbose);
            analyze_transcript(&common, terms.as_deref())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn normalize_config(common: &CommonArgs) -> NormalizeConfig {
    NormalizeConfig {
        round_derived_times: !common.no_round,
    }
}

fn load(common: &CommonArgs) -> Result<Vec<Segment>> {
    info!("Loading segments from {:?}", common.input);
    let raw = parse_segments_file(&common.input).context("Failed to parse input segments")?;
    let result = normalize(&raw, &normalize_config(common));

    if !result.malformed_segments.is_empty() {
        warn!(
            "{} segments had no usable text: {:?}",
            result.malformed_segments.len(),
            result.malformed_segments
        );
    }
    if !result.defaulted_starts.is_empty() {
        warn!(
            "{} segments had no readable start and were placed at 0s",
            result.defaulted_starts.len()
        );
    }
    info!("Loaded {} segments", result.segments.len());
    Ok(result.segments)
}

fn session_for(
    common: &CommonArgs,
    matching: &MatchArgs,
    provider: Box<dyn TermProvider>,
) -> Result<TranscriptSession> {
    let segments = load(common)?;
    let config = SessionConfig {
        normalize: normalize_config(common),
        matching: MatchConfig {
            min_term_chars: matching.min_term_chars,
        },
        resolver: ResolverConfig::default(),
    };
    let mut session = TranscriptSession::new(CategoryCatalog::builtin(), provider, config);
    session.load_segments(segments);
    Ok(session)
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, value).context("Failed to write output")?;
            info!("Output written to {:?}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

#[derive(Serialize)]
struct IndexDump<'a> {
    segments: &'a [Segment],
    duration_seconds: f64,
    index: &'a TimedWordIndex,
}

fn index_transcript(common: &CommonArgs, human_readable: Option<&Path>) -> Result<()> {
    let segments = load(common)?;
    let index = build_index(&segments);
    info!("Indexed {} words", index.len());

    if let Some(path) = human_readable {
        TranscriptRenderer::new(&segments)
            .write_file(path)
            .context("Failed to write human-readable transcript")?;
        info!("Human-readable output written to {:?}", path);
    }

    emit(
        &IndexDump {
            segments: &segments,
            duration_seconds: index.duration_seconds(),
            index: &index,
        },
        common.output.as_deref(),
    )
}

#[derive(Serialize)]
struct ResolveDump<'a> {
    time_seconds: f64,
    snap: TimeSnap,
    #[serde(flatten)]
    position: ActivePosition,
    active_word: Option<&'a Word>,
    active_text: Option<&'a str>,
}

fn resolve_position(common: &CommonArgs, time: f64, snap: TimeSnap) -> Result<()> {
    if !time.is_finite() {
        bail!("Playback time must be a finite number of seconds");
    }
    let segments = load(common)?;
    let index = build_index(&segments);
    let position =
        concordance::resolve_active(time, &segments, &index, &ResolverConfig { snap });

    emit(
        &ResolveDump {
            time_seconds: time,
            snap,
            position,
            active_word: position.word.and_then(|w| index.get(w)),
            active_text: position
                .segment
                .and_then(|s| segments.get(s))
                .map(|s| s.text.as_str()),
        },
        common.output.as_deref(),
    )
}

fn match_category(
    common: &CommonArgs,
    matching: &MatchArgs,
    category: &str,
    provider: Box<dyn TermProvider>,
) -> Result<()> {
    let mut session = session_for(common, matching, provider)?;
    session
        .select_category(category)
        .with_context(|| format!("Failed to match category {category}"))?;

    let report = OccurrenceReport::new(
        category,
        session.occurrences(),
        session.index(),
        &SnippetConfig {
            context_words: matching.context,
        },
    );
    info!("{} occurrences of {}", report.total, category);
    emit(&report, common.output.as_deref())
}

fn search_transcript(common: &CommonArgs, matching: &MatchArgs, query: &str) -> Result<()> {
    let mut session = session_for(common, matching, Box::new(StaticTermProvider::default()))?;
    session.select_search(query);

    let report = OccurrenceReport::new(
        query,
        session.occurrences(),
        session.index(),
        &SnippetConfig {
            context_words: matching.context,
        },
    );
    info!("{} matches for {:?}", report.total, query);
    emit(&report, common.output.as_deref())
}

#[derive(Serialize)]
struct AnalysisDump {
    #[serde(flatten)]
    stats: TranscriptStats,
    indexed_words: usize,
    term_counts: Vec<(String, usize)>,
}

fn analyze_transcript(common: &CommonArgs, terms: Option<&Path>) -> Result<()> {
    let provider = match terms {
        Some(path) => parse_terms_file(path).context("Failed to parse term lists")?,
        None => StaticTermProvider::default(),
    };
    let matching = MatchArgs {
        min_term_chars: MatchConfig::default().min_term_chars,
        context: SnippetConfig::default().context_words,
    };
    let session = session_for(common, &matching, Box::new(provider))?;

    let stats = TranscriptStats::from_segments(session.segments());
    info!(
        "{} segments, {} words, {:.1}s",
        stats.segment_count, stats.word_count, stats.duration_seconds
    );

    emit(
        &AnalysisDump {
            indexed_words: session.index().len(),
            term_counts: session.term_counts(),
            stats,
        },
        common.output.as_deref(),
    )
}
