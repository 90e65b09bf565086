//! Courier demo binary.
//!
//! Starts an arithmetic service under one execution strategy, sends it a
//! batch of `Square` requests and prints results in completion order. Each
//! request takes `input * unit_ms` milliseconds to handle, so the pool shows
//! latency-ordered completion while the cooperative strategies stay FIFO.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use clap::Parser;
use courier_actor::{
	Actor, ActorConfig, ActorSpec, Context, ExecutionStrategy, FullMailboxPolicy, Handler, Message, Runtime, ShutdownMode,
};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::info;

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "courier-demo")]
#[command(about = "Square numbers on an actor under a chosen execution strategy")]
struct Args {
	/// Execution strategy: blocking, suspending or pool
	#[arg(short, long, default_value = "blocking")]
	strategy: ExecutionStrategy,

	/// TOML file with actor options; flags below override it
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Mailbox capacity
	#[arg(long)]
	capacity: Option<usize>,

	/// Pool worker count
	#[arg(short, long)]
	workers: Option<usize>,

	/// Full-mailbox policy: wait, reject or drop
	#[arg(long)]
	policy: Option<FullMailboxPolicy>,

	/// Handling latency per unit of input, in milliseconds
	#[arg(long, default_value_t = 100)]
	unit_ms: u64,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	/// Numbers to square
	#[arg(default_values_t = [5_i64, 2, 3])]
	inputs: Vec<i64>,
}

struct Square {
	input: i64,
}

impl Message for Square {
	type Result = i64;
}

struct ArithmeticService {
	unit: Duration,
}

#[async_trait]
impl Actor for ArithmeticService {
	async fn on_start(&mut self, ctx: &mut Context<Self>) {
		info!(strategy = %ctx.strategy(), worker = ctx.worker(), "arithmetic service started");
	}

	async fn on_stop(&mut self, ctx: &mut Context<Self>) {
		info!(strategy = %ctx.strategy(), worker = ctx.worker(), "arithmetic service stopped");
	}
}

#[async_trait]
impl Handler<Square> for ArithmeticService {
	async fn handle(&mut self, msg: Square, ctx: &mut Context<Self>) -> i64 {
		let latency = self.unit.saturating_mul(u32::try_from(msg.input.unsigned_abs()).unwrap_or(u32::MAX));
		ctx.sleep(latency).await;
		msg.input.saturating_mul(msg.input)
	}
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let mut config = match &args.config {
		Some(path) => ActorConfig::load(path)?,
		None => ActorConfig::default(),
	};
	if let Some(capacity) = args.capacity {
		config.mailbox_capacity = capacity;
	}
	if let Some(workers) = args.workers {
		config.worker_count = workers;
	}
	if let Some(policy) = args.policy {
		config.full_mailbox_policy = policy;
	}

	let runtime = Runtime::new()?;
	let unit = Duration::from_millis(args.unit_ms);
	let addr = runtime.spawn(
		ActorSpec::new("arithmetic", move || ArithmeticService { unit })
			.strategy(args.strategy)
			.config(config),
	)?;

	info!(
		strategy = %args.strategy,
		capacity = addr.capacity(),
		inputs = ?args.inputs,
		"sending requests"
	);

	let started = Instant::now();
	runtime.block_on(async {
		let mut pending: FuturesUnordered<_> = args
			.inputs
			.iter()
			.map(|&input| {
				let request = addr.send(Square { input });
				async move { (input, request.await) }
			})
			.collect();

		while let Some((input, result)) = pending.next().await {
			let elapsed = started.elapsed().as_millis();
			match result {
				Ok(square) => println!("{input}^2 = {square} ({elapsed} ms)"),
				Err(err) => println!("{input}^2 failed: {err} ({elapsed} ms)"),
			}
		}
	});

	let report = runtime.shutdown(ShutdownMode::Graceful {
		timeout: Duration::from_secs(5),
	});
	info!(completed = report.completed(), timed_out = report.timed_out(), "runtime shut down");
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("courier_actor=trace,courier_demo=debug,info")
		} else {
			EnvFilter::new("courier_demo=info,warn")
		}
	});

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
