//! Ordering and concurrency behavior of each execution strategy.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use courier_actor::{Actor, ActorConfig, ActorSpec, Context, ExecutionStrategy, Handler, Message, Runtime, SendError};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
	Begin(i64),
	End(i64),
}

#[derive(Default, Clone)]
struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
	fn push(&self, event: Event) {
		self.0.lock().push(event);
	}

	fn events(&self) -> Vec<Event> {
		self.0.lock().clone()
	}
}

struct Square(i64);

impl Message for Square {
	type Result = i64;
}

/// Squares its input after waiting `input * unit`.
struct Arithmetic {
	unit: Duration,
	log: EventLog,
	started: Arc<AtomicUsize>,
}

impl Arithmetic {
	fn factory(unit: Duration, log: EventLog, started: Arc<AtomicUsize>) -> impl Fn() -> Self + Send + Sync + 'static {
		move || Self {
			unit,
			log: log.clone(),
			started: Arc::clone(&started),
		}
	}
}

#[async_trait]
impl Actor for Arithmetic {
	async fn on_start(&mut self, _ctx: &mut Context<Self>) {
		self.started.fetch_add(1, Ordering::SeqCst);
	}
}

#[async_trait]
impl Handler<Square> for Arithmetic {
	async fn handle(&mut self, msg: Square, ctx: &mut Context<Self>) -> i64 {
		self.log.push(Event::Begin(msg.0));
		ctx.sleep(self.unit * msg.0 as u32).await;
		self.log.push(Event::End(msg.0));
		msg.0 * msg.0
	}
}

#[test]
fn blocking_answers_in_send_order_with_full_mailbox() {
	let rt = Runtime::new().unwrap();
	let log = EventLog::default();
	let addr = rt
		.start(
			Arithmetic::factory(Duration::from_millis(5), log.clone(), Arc::default()),
			ExecutionStrategy::Blocking,
			ActorConfig::with_capacity(2),
		)
		.unwrap();

	let results = rt.block_on(async {
		let five = addr.send(Square(5));
		let two = addr.send(Square(2));
		let three = addr.send(Square(3));
		futures::join!(five, two, three)
	});

	assert_eq!(results, (Ok(25), Ok(4), Ok(9)));
	assert_eq!(
		log.events(),
		vec![
			Event::Begin(5),
			Event::End(5),
			Event::Begin(2),
			Event::End(2),
			Event::Begin(3),
			Event::End(3),
		]
	);
}

#[test]
fn pool_completes_in_latency_order() {
	let rt = Runtime::new().unwrap();
	let started = Arc::new(AtomicUsize::new(0));
	let addr = rt
		.spawn(
			ActorSpec::new("arithmetic", Arithmetic::factory(Duration::from_millis(40), EventLog::default(), Arc::clone(&started)))
				.strategy(ExecutionStrategy::Pool)
				.workers(3),
		)
		.unwrap();

	let completed = rt.block_on(async {
		while started.load(Ordering::SeqCst) < 3 {
			tokio::time::sleep(Duration::from_millis(1)).await;
		}

		let mut pending: FuturesUnordered<_> = [5, 2, 3]
			.into_iter()
			.map(|input| {
				let request = addr.send(Square(input));
				async move { (input, request.await) }
			})
			.collect();

		let mut completed = Vec::new();
		while let Some(outcome) = pending.next().await {
			completed.push(outcome);
		}
		completed
	});

	assert_eq!(completed, vec![(2, Ok(4)), (3, Ok(9)), (5, Ok(25))]);
}

#[rstest]
#[case::blocking(ExecutionStrategy::Blocking)]
#[case::suspending(ExecutionStrategy::Suspending)]
fn cooperative_strategies_never_overlap_handlers(#[case] strategy: ExecutionStrategy) {
	let rt = Runtime::new().unwrap();
	let log = EventLog::default();
	let addr = rt
		.start(Arithmetic::factory(Duration::from_millis(2), log.clone(), Arc::default()), strategy, ActorConfig::default())
		.unwrap();

	let results = rt.block_on(async {
		let requests: Vec<_> = [3, 1, 2].into_iter().map(|input| addr.send(Square(input))).collect();
		futures::future::join_all(requests).await
	});

	assert_eq!(results, vec![Ok(9), Ok(1), Ok(4)]);
	for pair in log.events().chunks(2) {
		let [Event::Begin(begin), Event::End(end)] = pair else {
			panic!("handlers overlapped: {:?}", log.events());
		};
		assert_eq!(begin, end);
	}
}

struct Ticker {
	ticks: Arc<AtomicUsize>,
}

impl Actor for Ticker {}

struct Nap(Duration);

impl Message for Nap {
	type Result = usize;
}

#[async_trait]
impl Handler<Nap> for Ticker {
	async fn handle(&mut self, msg: Nap, ctx: &mut Context<Self>) -> usize {
		let before = self.ticks.load(Ordering::SeqCst);
		ctx.sleep(msg.0).await;
		self.ticks.load(Ordering::SeqCst) - before
	}
}

/// Returns how many times a sibling task ran while the handler waited.
fn ticks_during_handler(strategy: ExecutionStrategy) -> usize {
	let rt = Runtime::new().unwrap();
	let ticks = Arc::new(AtomicUsize::new(0));
	let addr = rt
		.start(
			{
				let ticks = Arc::clone(&ticks);
				move || Ticker { ticks: Arc::clone(&ticks) }
			},
			strategy,
			ActorConfig::default(),
		)
		.unwrap();

	rt.block_on(async {
		let ticker = {
			let ticks = Arc::clone(&ticks);
			tokio::spawn(async move {
				loop {
					tokio::time::sleep(Duration::from_millis(2)).await;
					ticks.fetch_add(1, Ordering::SeqCst);
				}
			})
		};
		let observed = addr.send(Nap(Duration::from_millis(60))).await.unwrap();
		ticker.abort();
		observed
	})
}

#[test]
fn suspending_wait_lets_other_tasks_run() {
	assert!(ticks_during_handler(ExecutionStrategy::Suspending) > 0);
}

#[test]
fn blocking_wait_stalls_the_runtime_thread() {
	assert_eq!(ticks_during_handler(ExecutionStrategy::Blocking), 0);
}

/// Records the order it handles messages in.
#[derive(Default)]
struct Recorder {
	seen: Vec<u32>,
}

impl Actor for Recorder {}

struct Record(u32);

impl Message for Record {
	type Result = u32;
}

struct Seen;

impl Message for Seen {
	type Result = Vec<u32>;
}

#[async_trait]
impl Handler<Record> for Recorder {
	async fn handle(&mut self, msg: Record, _ctx: &mut Context<Self>) -> u32 {
		self.seen.push(msg.0);
		msg.0
	}
}

#[async_trait]
impl Handler<Seen> for Recorder {
	async fn handle(&mut self, _msg: Seen, _ctx: &mut Context<Self>) -> Vec<u32> {
		std::mem::take(&mut self.seen)
	}
}

#[rstest]
#[case::blocking(ExecutionStrategy::Blocking)]
#[case::suspending(ExecutionStrategy::Suspending)]
fn sends_parked_on_full_mailbox_keep_their_order(#[case] strategy: ExecutionStrategy) {
	let rt = Runtime::new().unwrap();
	let addr = rt.start(Recorder::default, strategy, ActorConfig::with_capacity(1)).unwrap();

	let (results, seen) = rt.block_on(async {
		let first = addr.send(Record(1));
		let second = addr.send(Record(2));
		assert_eq!(addr.len(), 2);
		// Lets the actor dequeue the first message, freeing a slot that the
		// parked second message must claim before the third.
		tokio::task::yield_now().await;
		let third = addr.send(Record(3));
		let results = futures::join!(first, second, third);
		(results, addr.send(Seen).await)
	});

	assert_eq!(results, (Ok(1), Ok(2), Ok(3)));
	assert_eq!(seen, Ok(vec![1, 2, 3]));
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	#[test]
	fn cooperative_handling_follows_send_order(
		inputs in prop::collection::vec(any::<u32>(), 1..48),
		capacity in 1..8_usize,
		suspending in any::<bool>(),
	) {
		let strategy = if suspending { ExecutionStrategy::Suspending } else { ExecutionStrategy::Blocking };
		let rt = Runtime::new().unwrap();
		let addr = rt.start(Recorder::default, strategy, ActorConfig::with_capacity(capacity)).unwrap();

		let (results, seen) = rt.block_on(async {
			let requests: Vec<_> = inputs.iter().map(|&input| addr.send(Record(input))).collect();
			let results = futures::future::join_all(requests).await;
			(results, addr.send(Seen).await)
		});

		let expected: Vec<Result<u32, SendError>> = inputs.iter().copied().map(Ok).collect();
		prop_assert_eq!(results, expected);
		prop_assert_eq!(seen, Ok(inputs));
	}
}

/// Forwards squares to another actor and adds one.
struct Forwarder {
	target: courier_actor::Addr<Arithmetic>,
}

impl Actor for Forwarder {}

#[async_trait]
impl Handler<Square> for Forwarder {
	async fn handle(&mut self, msg: Square, ctx: &mut Context<Self>) -> i64 {
		let request = self.target.send(msg);
		ctx.wait(request).await.map_or(-1, |square| square + 1)
	}
}

#[rstest]
#[case::suspending(ExecutionStrategy::Suspending)]
#[case::pool(ExecutionStrategy::Pool)]
fn handler_can_wait_on_another_actor(#[case] strategy: ExecutionStrategy) {
	let rt = Runtime::new().unwrap();
	let target = rt
		.start(
			Arithmetic::factory(Duration::from_millis(1), EventLog::default(), Arc::default()),
			ExecutionStrategy::Suspending,
			ActorConfig::default(),
		)
		.unwrap();
	let forwarder = rt
		.start(
			move || Forwarder { target: target.clone() },
			strategy,
			ActorConfig::default(),
		)
		.unwrap();

	let results = rt.block_on(async { futures::join!(forwarder.send(Square(4)), forwarder.send(Square(3))) });
	assert_eq!(results, (Ok(17), Ok(10)));
}
