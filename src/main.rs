//! profile-frame command line
//!
//! ```bash
//! # Run the resolver endpoint
//! profile-frame serve --bind 127.0.0.1:8080
//!
//! # Resolve one avatar and print the JSON payload
//! profile-frame resolve --platform github --username octocat
//!
//! # Frame a local picture, or a resolved avatar, into ./out
//! profile-frame compose --image me.jpg --out out
//! profile-frame compose --platform github --username octocat --server http://127.0.0.1:8080
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use profile_frame::composer::host::mime_from_name;
use profile_frame::{
    ApiServer, Composer, ComposerConfig, FrameGeometry, Outcome, Platform, ProfileResolver,
    ResolverConfig, ScriptedHost, ServerConfig, UploadedFile, UserAgent,
};

#[derive(Parser)]
#[command(name = "profile-frame")]
#[command(version)]
#[command(about = "Frame a profile picture and export it as PNG")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// User agent for outbound requests
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Client-side timeout for outbound requests in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve GET /api/retrieve-profile-pic
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Resolve a username to an avatar URL
    Resolve {
        #[arg(long, value_parser = parse_platform)]
        platform: Platform,

        #[arg(long)]
        username: String,
    },

    /// Compose a framed picture and save it
    Compose {
        /// Local image to frame
        #[arg(long, conflicts_with = "platform")]
        image: Option<PathBuf>,

        /// Fetch the avatar from this platform instead
        #[arg(long, value_parser = parse_platform, requires = "username")]
        platform: Option<Platform>,

        #[arg(long)]
        username: Option<String>,

        /// Origin of the resolver endpoint
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        server: String,

        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Edge length of the output in pixels
        #[arg(long, default_value_t = 300)]
        size: u32,

        /// Frame image to use instead of the built-in one
        #[arg(long)]
        frame: Option<PathBuf>,

        /// Browser user agent to run the capability check against
        #[arg(long)]
        browser: Option<String>,
    },
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse().map_err(|e: profile_frame::Error| e.to_string())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn serve(resolver: ResolverConfig, bind: String, workers: Option<usize>) -> anyhow::Result<()> {
    let config = ServerConfig {
        bind,
        workers: workers.unwrap_or_else(|| ServerConfig::default().workers),
    };
    let resolver = ProfileResolver::new(resolver)?;
    let handle = ApiServer::bind(&config, resolver)?.start();
    println!("listening on {}", handle.base_url());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start signal runtime")?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .context("could not register ctrl+c handler")?;

    log::info!("shutting down");
    handle.shutdown();
    Ok(())
}

fn resolve(resolver: ResolverConfig, platform: Platform, username: &str) -> anyhow::Result<()> {
    let resolver = ProfileResolver::new(resolver)?;
    let pic = resolver.resolve(platform, username)?;
    println!("{}", serde_json::to_string_pretty(&pic)?);
    Ok(())
}

struct ComposeArgs {
    image: Option<PathBuf>,
    platform: Option<Platform>,
    username: Option<String>,
    out: PathBuf,
    browser: Option<String>,
}

fn compose(config: ComposerConfig, args: ComposeArgs) -> anyhow::Result<()> {
    let mut host = ScriptedHost::new(&args.out);
    if let Some(username) = &args.username {
        host = host.answer(username.clone());
    }
    let capabilities = UserAgent::new(args.browser.unwrap_or_default());
    let mut composer = Composer::with_http(config, &capabilities, host)?;
    if let Some(banner) = composer.banner() {
        eprintln!("warning: {} {}", banner.title, banner.message);
    }

    let outcome = match (&args.image, args.platform) {
        (Some(path), _) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mime = mime_from_name(&name).to_string();
            composer.upload(&UploadedFile { name, mime, bytes })
        }
        (None, Some(platform)) => composer.request_profile_pic(platform),
        (None, None) => Outcome::Applied,
    };
    match outcome {
        Outcome::Aborted => bail!("input was not usable; nothing to compose"),
        Outcome::Failed(_) => bail!("{}", composer.host().alerts().join("\n")),
        _ => {}
    }

    match composer.download() {
        Outcome::Exported { file_name } => {
            println!("{}", args.out.join(file_name).display());
            Ok(())
        }
        _ => bail!("{}", composer.host().alerts().join("\n")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut resolver_config = ResolverConfig {
        timeout_ms: cli.timeout_ms,
        ..Default::default()
    };
    if let Some(ua) = &cli.user_agent {
        resolver_config.user_agent = ua.clone();
    }

    match cli.command {
        Commands::Serve { bind, workers } => serve(resolver_config, bind, workers),
        Commands::Resolve { platform, username } => resolve(resolver_config, platform, &username),
        Commands::Compose {
            image,
            platform,
            username,
            server,
            out,
            size,
            frame,
            browser,
        } => {
            let config = ComposerConfig {
                geometry: FrameGeometry {
                    size,
                    ..Default::default()
                },
                frame_path: frame,
                resolver_base_url: server,
                user_agent: resolver_config.user_agent,
                timeout_ms: cli.timeout_ms,
                ..Default::default()
            };
            let args = ComposeArgs {
                image,
                platform,
                username,
                out,
                browser,
            };
            compose(config, args)
        }
    }
}
