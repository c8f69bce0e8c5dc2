//! Tokio actor around [`Engine`].
//!
//! One task owns the engine and drains a command channel, the completion
//! channel fed by worker jobs and a poll interval. Every input becomes an
//! [`EngineEvent`]; every [`Effect`] is executed here. Analyzer and mutation
//! jobs run on bounded [`WorkerPool`]s and report back through the completion
//! channel, so the engine itself is only ever touched by this task.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant as StdInstant;

use proofline_config::{ConfigProvider, EngineConfig};
use proofline_primitives::{Finding, SurfaceId};
use proofline_worker::{TaskClass, WorkerPool};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::analyzer::{AnalysisJob, AnalysisTier, Analyzer};
use crate::engine::{Effect, Engine, EngineEvent, SurfaceView};
use crate::error::{AnalyzerError, CoordinatorError, MutationError};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::mutation::{MutationBackend, MutationChain, MutationOutcome, MutationRequest, MutationTicket};
use crate::pipeline::RejectionReason;
use crate::presentation::{GeometryProbe, PresentationState, RenderFrame, Renderer, SurfaceEvent};
use crate::zones::ZoneProvider;


/// Collaborators injected into the coordinator.
#[derive(Clone)]
pub struct CoordinatorDeps {
	pub fast: Arc<dyn Analyzer>,
	pub slow: Arc<dyn Analyzer>,
	pub renderer: Arc<dyn Renderer>,
	pub backend: Arc<dyn MutationBackend>,
	pub config: Arc<dyn ConfigProvider>,
	pub zones: Arc<dyn ZoneProvider>,
	pub probe: Option<Arc<dyn GeometryProbe>>,
}

enum Command {
	Event(EngineEvent),
	Accept {
		surface: SurfaceId,
		finding: Finding,
		suggestion: String,
		reply: oneshot::Sender<MutationOutcome>,
	},
	View {
		surface: SurfaceId,
		reply: oneshot::Sender<Option<SurfaceView>>,
	},
	Settled {
		reply: oneshot::Sender<()>,
	},
	Shutdown,
}

enum Wake {
	Stop,
	Command(Command),
	Completion(EngineEvent),
	Poll,
}

/// Cheap, cloneable entry point into a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
	tx: mpsc::UnboundedSender<Command>,
	metrics: Arc<EngineMetrics>,
	cancel: CancellationToken,
}

impl CoordinatorHandle {
	fn send(&self, command: Command) -> Result<(), CoordinatorError> {
		self.tx.send(command).map_err(|_| CoordinatorError::Closed)
	}

	fn event(&self, event: EngineEvent) -> Result<(), CoordinatorError> {
		self.send(Command::Event(event))
	}

	/// Reports the full current text of a surface.
	pub fn edit(&self, surface: SurfaceId, text: impl Into<String>) -> Result<(), CoordinatorError> {
		self.event(EngineEvent::Edit {
			surface,
			text: text.into(),
		})
	}

	pub fn focus(&self, surface: SurfaceId, focused: bool) -> Result<(), CoordinatorError> {
		self.event(EngineEvent::Focus { surface, focused })
	}

	pub fn surface_event(&self, surface: SurfaceId, event: SurfaceEvent) -> Result<(), CoordinatorError> {
		self.event(EngineEvent::Surface { surface, event })
	}

	pub fn dismiss(&self, surface: SurfaceId, finding: Finding, reason: RejectionReason) -> Result<(), CoordinatorError> {
		self.event(EngineEvent::Dismiss { surface, finding, reason })
	}

	/// The [`ConfigProvider`] now returns different settings.
	pub fn config_changed(&self) -> Result<(), CoordinatorError> {
		self.event(EngineEvent::ConfigChanged)
	}

	/// Writes `suggestion` over `finding` and waits for the outcome.
	pub async fn accept(&self, surface: SurfaceId, finding: Finding, suggestion: impl Into<String>) -> Result<MutationOutcome, CoordinatorError> {
		let (reply, rx) = oneshot::channel();
		self.send(Command::Accept {
			surface,
			finding,
			suggestion: suggestion.into(),
			reply,
		})?;
		rx.await.map_err(|_| CoordinatorError::Closed)
	}

	pub async fn view(&self, surface: SurfaceId) -> Result<Option<SurfaceView>, CoordinatorError> {
		let (reply, rx) = oneshot::channel();
		self.send(Command::View { surface, reply })?;
		rx.await.map_err(|_| CoordinatorError::Closed)
	}

	/// Resolves once no analysis job, semantic timer, mutation or settle
	/// window is outstanding.
	pub async fn settled(&self) -> Result<(), CoordinatorError> {
		let (reply, rx) = oneshot::channel();
		self.send(Command::Settled { reply })?;
		rx.await.map_err(|_| CoordinatorError::Closed)
	}

	pub fn metrics(&self) -> MetricsSnapshot {
		self.metrics.snapshot()
	}

	/// Stops the coordinator. Jobs already running finish but their results
	/// are dropped; pending `accept` calls resolve to [`CoordinatorError::Closed`].
	pub fn shutdown(&self) {
		let _ = self.tx.send(Command::Shutdown);
		self.cancel.cancel();
	}
}

/// The actor. Construct with [`Coordinator::spawn`].
pub struct Coordinator {
	engine: Engine,
	deps: CoordinatorDeps,
	chain: Arc<MutationChain>,
	fast_pool: WorkerPool,
	slow_pool: WorkerPool,
	mutation_pool: WorkerPool,
	commands: mpsc::UnboundedReceiver<Command>,
	completions_tx: mpsc::UnboundedSender<EngineEvent>,
	completions: mpsc::UnboundedReceiver<EngineEvent>,
	replies: FxHashMap<MutationTicket, oneshot::Sender<MutationOutcome>>,
	settle_waiters: Vec<oneshot::Sender<()>>,
	next_ticket: u64,
	in_flight: usize,
	metrics: Arc<EngineMetrics>,
	cancel: CancellationToken,
	poll_every: std::time::Duration,
}

impl Coordinator {
	/// Starts the actor on the current tokio runtime.
	pub fn spawn(deps: CoordinatorDeps, config: EngineConfig) -> CoordinatorHandle {
		let (tx, commands) = mpsc::unbounded_channel();
		let (completions_tx, completions) = mpsc::unbounded_channel();
		let engine = Engine::new(config.clone(), Arc::clone(&deps.config), Arc::clone(&deps.zones));
		let metrics = engine.metrics();
		let cancel = CancellationToken::new();

		let coordinator = Self {
			engine,
			chain: Arc::new(MutationChain::new(config.mutation)),
			fast_pool: WorkerPool::new(TaskClass::FastAnalysis, config.fast_workers),
			slow_pool: WorkerPool::new(TaskClass::SlowAnalysis, config.slow_workers),
			mutation_pool: WorkerPool::new(TaskClass::Mutation, 1),
			deps,
			commands,
			completions_tx,
			completions,
			replies: FxHashMap::default(),
			settle_waiters: Vec::new(),
			next_ticket: 0,
			in_flight: 0,
			metrics: Arc::clone(&metrics),
			cancel: cancel.clone(),
			poll_every: config.geometry_poll(),
		};
		proofline_worker::spawn(TaskClass::Coordinator, coordinator.run());
		CoordinatorHandle { tx, metrics, cancel }
	}

	async fn run(mut self) {
		tracing::info!(
			fast_workers = self.fast_pool.size(),
			slow_workers = self.slow_pool.size(),
			"coordinator.started"
		);
		let mut poll = tokio::time::interval(self.poll_every);
		poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let cancel = self.cancel.clone();

		loop {
			let wake = tokio::select! {
				biased;
				_ = cancel.cancelled() => Wake::Stop,
				Some(event) = self.completions.recv() => Wake::Completion(event),
				command = self.commands.recv() => match command {
					Some(Command::Shutdown) | None => Wake::Stop,
					Some(command) => Wake::Command(command),
				},
				_ = poll.tick() => Wake::Poll,
			};

			match wake {
				Wake::Stop => break,
				Wake::Completion(event) => {
					if matches!(event, EngineEvent::AnalysisFinished(_)) {
						self.in_flight = self.in_flight.saturating_sub(1);
					}
					self.dispatch(event);
				}
				Wake::Command(command) => self.command(command),
				Wake::Poll => {
					self.poll_geometry();
					self.dispatch(EngineEvent::Tick);
				}
			}
			self.notify_settled();
		}

		self.stop();
	}

	fn now() -> StdInstant {
		Instant::now().into_std()
	}

	fn command(&mut self, command: Command) {
		match command {
			Command::Event(event) => self.dispatch(event),
			Command::Accept {
				surface,
				finding,
				suggestion,
				reply,
			} => {
				self.next_ticket += 1;
				let ticket = MutationTicket(self.next_ticket);
				self.replies.insert(ticket, reply);
				self.dispatch(EngineEvent::Accept {
					surface,
					finding,
					suggestion,
					ticket,
				});
			}
			Command::View { surface, reply } => {
				let _ = reply.send(self.engine.view(surface, Self::now()));
			}
			Command::Settled { reply } => self.settle_waiters.push(reply),
			Command::Shutdown => {}
		}
	}

	fn dispatch(&mut self, event: EngineEvent) {
		let effects = self.engine.handle(event, Self::now());
		for effect in effects {
			self.execute(effect);
		}
	}

	fn execute(&mut self, effect: Effect) {
		match effect {
			Effect::Analyze(job) => self.spawn_analysis(job),
			Effect::Render(frame) => self.render(&frame),
			Effect::Mutate { ticket, request } => self.spawn_mutation(ticket, request),
			Effect::MutationResolved { ticket, outcome } => {
				if let Some(reply) = self.replies.remove(&ticket) {
					let _ = reply.send(outcome);
				}
			}
		}
	}

	fn spawn_analysis(&mut self, job: AnalysisJob) {
		let (analyzer, pool, class) = match job.tier {
			AnalysisTier::Fast => (Arc::clone(&self.deps.fast), self.fast_pool.clone(), TaskClass::FastAnalysis),
			AnalysisTier::Slow => (Arc::clone(&self.deps.slow), self.slow_pool.clone(), TaskClass::SlowAnalysis),
		};
		let tx = self.completions_tx.clone();
		let cancel = self.cancel.clone();
		self.in_flight += 1;

		proofline_worker::spawn(class, async move {
			let started = StdInstant::now();
			let name = analyzer.name().to_string();
			// Kept to report a crash; the job itself moves onto the pool.
			let crashed = job.clone();
			let run = pool.run(move || job.run(analyzer.as_ref()));
			let completion = tokio::select! {
				biased;
				_ = cancel.cancelled() => return,
				completion = run => completion,
			};
			let completion = completion.unwrap_or_else(|err| {
				tracing::warn!(analyzer = %name, error = %err, "coordinator.analyzer.crashed");
				crashed.complete(Err(AnalyzerError::Failed(err.to_string())), started.elapsed())
			});
			let _ = tx.send(EngineEvent::AnalysisFinished(completion));
		});
	}

	fn spawn_mutation(&mut self, ticket: MutationTicket, request: MutationRequest) {
		let backend = Arc::clone(&self.deps.backend);
		let chain = Arc::clone(&self.chain);
		let pool = self.mutation_pool.clone();
		let tx = self.completions_tx.clone();
		let cancel = self.cancel.clone();
		let surface = request.surface;

		proofline_worker::spawn(TaskClass::Mutation, async move {
			let run = pool.run(move || chain.apply(backend.as_ref(), &request));
			let outcome = tokio::select! {
				biased;
				_ = cancel.cancelled() => return,
				outcome = run => outcome,
			};
			let outcome = outcome.unwrap_or_else(|err| Err(MutationError::Worker(err.to_string())));
			let _ = tx.send(EngineEvent::MutationFinished { surface, ticket, outcome });
		});
	}

	fn render(&self, frame: &RenderFrame) {
		let renderer = &self.deps.renderer;
		if catch_unwind(AssertUnwindSafe(|| renderer.render(frame))).is_err() {
			self.metrics.inc_render_panic();
			tracing::error!(surface = %frame.surface, state = frame.state.as_str(), "coordinator.render.panicked");
		}
	}

	/// Samples the active surface and turns the result into surface events.
	fn poll_geometry(&mut self) {
		let (Some(probe), Some(surface)) = (self.deps.probe.clone(), self.engine.active()) else {
			return;
		};
		let in_error = self.engine.presentation_state(surface) == Some(PresentationState::Error);
		let events = match probe.sample(surface) {
			Ok(Some(geometry)) if in_error => vec![SurfaceEvent::Available, SurfaceEvent::Geometry(geometry)],
			Ok(Some(geometry)) => vec![SurfaceEvent::Geometry(geometry)],
			Ok(None) => Vec::new(),
			Err(_) if in_error => Vec::new(),
			Err(err) => {
				tracing::debug!(%surface, error = %err, "coordinator.probe.failed");
				vec![SurfaceEvent::Unavailable]
			}
		};
		for event in events {
			self.dispatch(EngineEvent::Surface { surface, event });
		}
	}

	fn notify_settled(&mut self) {
		if self.settle_waiters.is_empty() || self.in_flight > 0 || !self.engine.is_quiescent() {
			return;
		}
		for waiter in self.settle_waiters.drain(..) {
			let _ = waiter.send(());
		}
	}

	fn stop(&mut self) {
		self.cancel.cancel();
		self.fast_pool.close();
		self.slow_pool.close();
		self.mutation_pool.close();
		self.replies.clear();
		self.settle_waiters.clear();
		self.metrics.emit();
		tracing::info!("coordinator.stopped");
	}
}
