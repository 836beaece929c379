use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use repomirror::api::HttpContentApi;
use repomirror::context::SyncContext;
use repomirror::logging::*;
use repomirror::secrets::{EnvSecretStore, SecretStore};
use repomirror::session::{self, SessionHandle, SessionOptions, SessionOutcome};
use repomirror::{events, Config, SyncEvent};

///////////////////////
// Utility functions //
///////////////////////

/// Config file, then environment, then command-line flags
fn build_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
	let path = matches.get_one::<PathBuf>("config");
	let mut config = Config::load(path.map(|p| p.as_path()))?;

	if let Some(owner) = matches.get_one::<String>("owner") {
		config.owner = owner.clone();
	}
	if let Some(repo) = matches.get_one::<String>("repo") {
		config.repo = repo.clone();
	}
	if let Some(branch) = matches.get_one::<String>("branch") {
		config.branch = branch.clone();
	}
	if let Some(folder) = matches.get_one::<PathBuf>("folder") {
		config.folder = folder.clone();
	}
	if let Some(ms) = matches.get_one::<u64>("debounce-ms") {
		config.debounce_ms = *ms;
	}
	Ok(config)
}

/// Ctrl-C / SIGTERM request a cancel; a second signal exits immediately
fn setup_signal_handlers(handle: SessionHandle) {
	tokio::spawn(async move {
		use tokio::signal;

		let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(stream) => stream,
			Err(e) => {
				warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
				return;
			}
		};

		let mut sigint = match signal::unix::signal(signal::unix::SignalKind::interrupt()) {
			Ok(stream) => stream,
			Err(e) => {
				warn!("Failed to setup SIGINT handler: {}. Process will not handle SIGINT gracefully.", e);
				return;
			}
		};

		loop {
			let code = tokio::select! {
				_ = sigterm.recv() => 143, // 128 + SIGTERM(15)
				_ = sigint.recv() => 130,  // 128 + SIGINT(2)
			};
			if handle.is_cancelled() {
				debug!("Second signal, exiting");
				std::process::exit(code);
			}
			eprintln!("Stopping...");
			handle.request_cancel();
		}
	});
}

/// Ask on the terminal whether a detected batch should be uploaded
fn prompt_batch(description: &str, paths: &[PathBuf]) -> bool {
	eprintln!("{}:", description);
	for path in paths {
		eprintln!("  {}", path.display());
	}
	eprint!("Upload these files? [y/N] ");
	let _ = io::stderr().flush();

	let mut answer = String::new();
	match io::stdin().lock().read_line(&mut answer) {
		Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
		Err(_) => false,
	}
}

fn session_target(config: &Config) -> Result<(repomirror::RepositoryTarget, Arc<HttpContentApi>), Box<dyn Error>> {
	let token = EnvSecretStore.require_token(config.owner.trim())?;
	let target = config.to_target(token)?;
	let api = Arc::new(HttpContentApi::new(&config.api_base_url, &target)?);
	Ok((target, api))
}

//////////////////
// Subcommands  //
//////////////////

async fn run_sync(config: Config) -> Result<i32, Box<dyn Error>> {
	let (target, api) = session_target(&config)?;
	let (handle, mut events) = session::start(api, &target, SessionOptions::from_config(&config));
	setup_signal_handlers(handle.clone());

	let mut waiter = tokio::spawn({
		let handle = handle.clone();
		async move { handle.wait().await }
	});

	let outcome = loop {
		tokio::select! {
			Some(event) = events.recv() => render_event(&handle, event),
			result = &mut waiter => break result.ok().flatten(),
		}
	};
	for event in events.drain() {
		render_event(&handle, event);
	}

	Ok(match outcome {
		Some(SessionOutcome::Completed(report)) => {
			eprintln!(
				"Done: {} uploaded, {} recycled, {} failed",
				report.uploaded,
				report.recycled,
				report.upload_failed + report.recycle_failed
			);
			0
		}
		Some(SessionOutcome::CancelledBeforeWatch(_)) => 130,
		Some(SessionOutcome::Aborted(e)) => {
			error!("{}", e);
			1
		}
		None => 1,
	})
}

fn render_event(handle: &SessionHandle, event: SyncEvent) {
	match event {
		SyncEvent::Log(line) => println!("{}", line),
		SyncEvent::SingleFileDetected { name } => println!("Change detected: {}", name),
		SyncEvent::BatchDetected { description, paths } => {
			let handle = handle.clone();
			tokio::spawn(async move {
				let confirmed = {
					let paths = paths.clone();
					tokio::task::spawn_blocking(move || prompt_batch(&description, &paths))
						.await
						.unwrap_or(false)
				};
				if confirmed && !handle.is_cancelled() {
					let _ = handle.confirm_batch(paths).await;
				} else {
					println!("Batch skipped");
				}
			});
		}
		SyncEvent::StopMonitoring => println!("Monitoring stopped"),
	}
}

async fn run_plan(config: Config) -> Result<i32, Box<dyn Error>> {
	let (target, api) = session_target(&config)?;
	let (sink, _receiver) = events::channel();
	let ctx = SyncContext::new(api, sink, &target, &config.recycle_dir);

	let plan = session::plan(&ctx).await?;
	if plan.is_empty() {
		println!("Already in sync");
		return Ok(0);
	}
	for path in &plan.recycles {
		println!("recycle  {}", path);
	}
	for path in &plan.uploads {
		println!("upload   {}", path);
	}
	println!("{} to recycle, {} to upload", plan.recycles.len(), plan.uploads.len());
	Ok(0)
}

fn run_config(config: Config, matches: &ArgMatches, save: bool) -> Result<i32, Box<dyn Error>> {
	print!("{}", toml::to_string_pretty(&config)?);
	if save {
		let path = matches
			.get_one::<PathBuf>("config")
			.cloned()
			.unwrap_or_else(|| Config::default_dir().join("config.toml"));
		config.save(&path)?;
		eprintln!("Saved to {}", path.display());
	}
	Ok(0)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let matches = Command::new("RepoMirror")
		.version(env!("CARGO_PKG_VERSION"))
		.author("Szilard Hajba <szilard@symbion.hu>")
		.about("Mirror a local folder into a hosted Git repository branch")
		.subcommand_required(true)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.value_parser(value_parser!(PathBuf))
				.global(true)
				.help("Config file (TOML, or JSON with a .json extension)"),
		)
		.arg(Arg::new("owner").long("owner").value_name("OWNER").global(true).help("Repository owner"))
		.arg(Arg::new("repo").long("repo").value_name("REPO").global(true).help("Repository name"))
		.arg(Arg::new("branch").long("branch").value_name("BRANCH").global(true).help("Branch"))
		.arg(
			Arg::new("folder")
				.long("folder")
				.value_name("DIR")
				.value_parser(value_parser!(PathBuf))
				.global(true)
				.help("Local folder to mirror"),
		)
		.arg(
			Arg::new("debounce-ms")
				.long("debounce-ms")
				.value_name("MS")
				.value_parser(value_parser!(u64))
				.global(true)
				.help("Quiet period before changes are uploaded"),
		)
		.subcommand(Command::new("sync").about("Reconcile, then watch the folder until interrupted"))
		.subcommand(Command::new("plan").about("Show what the initial sync would do"))
		.subcommand(
			Command::new("config").about("Print the effective configuration").arg(
				Arg::new("save")
					.long("save")
					.action(ArgAction::SetTrue)
					.help("Write it to the config file (the token is never saved)"),
			),
		)
		.get_matches();

	let (name, sub) = matches.subcommand().ok_or("a subcommand is required")?;
	// Global flags are propagated into the subcommand's matches
	let config = build_config(sub)?;
	init_tracing(&config.log_level);

	let code = match name {
		"sync" => run_sync(config).await?,
		"plan" => run_plan(config).await?,
		"config" => run_config(config, sub, sub.get_flag("save"))?,
		_ => 0,
	};

	// A pending batch prompt may still be blocked on stdin
	std::process::exit(code);
}

// vim: ts=4
