//! rhythm-demo - Rhythm-driven error generation demo
//!
//! Plays a song (simulated, or a real Spotify track) beat by beat and asks
//! the error generator for an error every 16 beats.
//!
//! ```text
//! rhythm-demo
//! rhythm-demo --track "Where Is My Mind?" --artist "Pixies" --realtime
//! rhythm-demo --spotify-uri spotify:track:5EWPGh7jbTNO2wakv8LjUI
//! TEMPO=128 ERROR_GENERATOR_URL=http://localhost:9090 rhythm-demo
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use gbeat_common::logging::init_tracing;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gbeat_rc::demo::{spotify_plan, DemoDriver, TrackSelection, DEMO_TRIGGER_TIMEOUT};
use gbeat_rc::beats::AudioFeatures;
use gbeat_rc::plan::{BeatPlan, BEATS_PER_TRIGGER};
use gbeat_rc::spotify::{SpotifyClient, SpotifySettings, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
use gbeat_rc::structure::{estimate_structure, visualize};
use gbeat_rc::trigger::{service_healthy, ErrorGeneratorClient, DEFAULT_ERROR_GENERATOR_URL};

const DEFAULT_SLOGAN_SERVER_URL: &str = "http://localhost:8080";

/// Command-line arguments for rhythm-demo
#[derive(Parser, Debug)]
#[command(name = "rhythm-demo")]
#[command(about = "Simulate a song and trigger errors every 16 beats")]
#[command(version)]
struct Args {
    /// Sleep one beat between beats (real playback speed)
    #[arg(short, long)]
    realtime: bool,

    /// Spotify track name to search for
    #[arg(long)]
    track: Option<String>,

    /// Artist name for the Spotify search
    #[arg(long, requires = "track")]
    artist: Option<String>,

    /// Spotify URI (e.g. spotify:track:5EWPGh7jbTNO2wakv8LjUI)
    #[arg(long, conflicts_with = "track")]
    spotify_uri: Option<String>,

    /// Don't ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Song tempo in BPM for the simulated song
    #[arg(long, env = "TEMPO", default_value_t = 120.0)]
    tempo: f64,

    /// Beats between triggers
    #[arg(long, default_value_t = BEATS_PER_TRIGGER)]
    beats_per_trigger: u64,

    #[arg(long, env = "ERROR_GENERATOR_URL", default_value = DEFAULT_ERROR_GENERATOR_URL)]
    error_generator_url: String,

    #[arg(long, env = "SLOGAN_SERVER_URL", default_value = DEFAULT_SLOGAN_SERVER_URL)]
    slogan_server_url: String,

    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    spotify_client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    spotify_client_secret: Option<String>,

    #[arg(long, env = "SPOTIFY_API_URL", default_value = DEFAULT_API_URL)]
    spotify_api_url: String,

    #[arg(long, env = "SPOTIFY_ACCOUNTS_URL", default_value = DEFAULT_ACCOUNTS_URL)]
    spotify_accounts_url: String,
}

impl Args {
    fn track_selection(&self) -> Option<TrackSelection> {
        if let Some(uri) = &self.spotify_uri {
            return Some(TrackSelection::Uri(uri.clone()));
        }
        self.track.as_ref().map(|track| TrackSelection::Search {
            track: track.clone(),
            artist: self.artist.clone(),
        })
    }

    fn spotify_client(&self) -> Option<SpotifyClient> {
        let (Some(id), Some(secret)) = (
            self.spotify_client_id.as_deref().filter(|s| !s.trim().is_empty()),
            self.spotify_client_secret.as_deref().filter(|s| !s.trim().is_empty()),
        ) else {
            warn!("Spotify credentials not set (SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET)");
            return None;
        };

        let settings = SpotifySettings {
            api_url: self.spotify_api_url.clone(),
            accounts_url: self.spotify_accounts_url.clone(),
            ..SpotifySettings::new(id, secret)
        };
        match SpotifyClient::new(settings) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Failed to create Spotify client");
                None
            }
        }
    }
}

/// Console prompts reading from one shared input
struct Prompt<R> {
    input: R,
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    fn new(input: R) -> Self {
        Self { input }
    }

    async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        self.input.read_line(&mut line).await.ok().map(|_| line)
    }

    /// Ask a yes/no question; true only for "y"
    async fn confirm(&mut self, question: &str) -> bool {
        print!("{}", question);
        let _ = std::io::stdout().flush();
        self.read_line()
            .await
            .is_some_and(|line| line.trim().eq_ignore_ascii_case("y"))
    }

    /// Wait for Enter; false on Ctrl+C
    async fn wait_for_enter(&mut self) -> bool {
        println!("\nPress Enter to start, or Ctrl+C to cancel...");
        tokio::select! {
            line = self.read_line() => line.is_some(),
            _ = tokio::signal::ctrl_c() => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(None, "rhythm_demo=info,gbeat_rc=info");

    println!("\n{}", "🎼".repeat(35));
    println!("  RHYTHM-DRIVEN ERROR GENERATOR DEMO");
    println!("{}\n", "🎼".repeat(35));

    let selection = args.track_selection();
    if selection.is_some() {
        println!("🎵 Spotify mode: using real track data\n");
    } else {
        println!("🎼 Simulation mode: using generated song structure\n");
    }

    let mut prompt = Prompt::new(BufReader::new(tokio::io::stdin()));
    let error_generator =
        ErrorGeneratorClient::with_timeout(&args.error_generator_url, DEMO_TRIGGER_TIMEOUT);

    println!("📡 Checking service health...\n");
    if error_generator.check_health().await {
        info!("✓ Error generator service is healthy");
    } else {
        warn!(
            "❌ Cannot reach error generator at {}",
            args.error_generator_url
        );
        println!("ERROR GENERATOR NOT RUNNING! No errors will be generated.\n");
        if !args.yes && !prompt.confirm("Continue anyway? [y/N]: ").await {
            println!("Demo cancelled.");
            return Ok(());
        }
    }

    let http_client = reqwest::Client::new();
    if service_healthy(&http_client, &args.slogan_server_url).await {
        info!("✓ Slogan server is healthy");
    } else {
        println!("📝 INFO: Slogan server not running - errors will generate without slogans\n");
    }

    let mut track = None;
    let mut plan = None;
    if let Some(selection) = &selection {
        println!("🎵 Fetching track data from Spotify...\n");
        match args.spotify_client() {
            Some(spotify) => match spotify_plan(&spotify, selection).await {
                Some((built, info)) => {
                    plan = Some(built);
                    track = Some(info);
                }
                None => println!("❌ Failed to fetch track from Spotify, using simulated structure\n"),
            },
            None => println!("❌ Spotify unavailable, using simulated structure\n"),
        }
    }

    let plan = match plan {
        Some(plan) => plan,
        None => BeatPlan::canonical(args.tempo).context("Invalid TEMPO")?,
    };

    match &track {
        Some(track) => {
            println!(
                "📀 Now Playing: {} by {} ({:.1}s)\n",
                track.name,
                track.artist,
                track.duration_ms as f64 / 1000.0
            );
            println!("{}", track.timeline());
        }
        None => {
            let duration = plan.total_duration();
            let structure = estimate_structure(&AudioFeatures::default(), duration);
            println!("{}", visualize(&structure, duration));
        }
    }
    println!("\n🎵 SONG STRUCTURE ({:?})", plan.source());
    println!("{}\n", plan.render());

    if args.realtime {
        println!("⏱️  Real-time mode: demo will take {:.1} seconds", plan.total_duration());
    } else {
        println!("⚡ Fast mode: demo will run as fast as possible");
    }

    if !args.yes && !prompt.wait_for_enter().await {
        println!("\nDemo cancelled.");
        return Ok(());
    }

    let stop = CancellationToken::new();
    let interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    println!("\n▶️  STARTING DEMO\n");
    let driver = DemoDriver::new(error_generator)
        .realtime(args.realtime)
        .beats_per_trigger(args.beats_per_trigger);
    let summary = driver.run(&plan, stop).await;

    println!("\n{}\n", summary.render(plan.tempo(), args.beats_per_trigger.max(1)));
    println!("✅ Demo complete! Check your error logs for the generated errors.\n");

    Ok(())
}
