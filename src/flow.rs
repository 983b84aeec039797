//! Flow control and the frame loop.
//!
//! A "flow" is a self-contained piece of simulation: it gets initialized once,
//! updated every frame, ticked periodically and may react to custom events.
//! The [`App`] owns all flows together with the shared [`Context`] and the
//! user state and drives them frame by frame. There is no window: frames are
//! stepped explicitly (see [`App::step`]) or by [`run`] with a fixed or
//! measured frame time.
//!
//! # User-facing types
//!
//! - [`Flow<S, E>`] is the trait for scenes/states that handle events and updates
//! - [`Out<S, E>`] is the output type for async event handling and context configuration
//!
//! # Lifecycle Flow
//!
//! Each frame:
//! 1. Deliver queued custom events to the flows (`on_custom_events`)
//! 2. Call `on_update` on all flows with the frame delta
//! 3. Call `on_tick` on all flows once `tick_duration_millis` have passed
//!
//! The output of every hook is handled right away.

use std::{collections::VecDeque, fmt::Debug, pin::Pin};

use instant::Duration;

use crate::context::{Context, InitContext};

///
/// This is the Output Type for every lifecycle hook where the user can pass async events that are
/// handled by the app.
///
/// `Out::FutEvent` can be used to resolve a future of an Event that is put in the Event Queue after
/// being resolved. It is delivered to the flows at the start of the next frame.
///
/// `Out::FutFn` can be used to directly modify the state and the mutation is handled internally with
/// no further action required by the callee.
///
/// `Out::Configure` can be used to modify the Context during runtime for instance to change the tick
/// speed.
///
/// `Empty` is the default output used when no eventing/futures need to be handled.
///
pub enum Out<S, E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    FutFn(Vec<Box<dyn Future<Output = Box<dyn FnOnce(&mut S)>>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<S, E> Default for Out<S, E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a simulated scene or game state.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure the context here
/// 2. `on_update()` is called every frame
/// 3. `on_tick()` is called every `tick_duration_millis`
/// 4. `on_custom_events()` is called for custom application events
///
pub trait Flow<S, E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S, E>;

    /// Update state every frame.
    ///
    /// Called every frame with the elapsed time `dt`. Use for animations
    /// and other per-frame logic.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<S, E>;

    /// Update state periodically.
    ///
    /// Called every `tick_duration_millis` milliseconds (configurable via context).
    /// Use for discrete logic that doesn't need to run every frame.
    fn on_tick(&mut self, ctx: &Context, state: &mut S) -> Out<S, E>;

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;
}

impl<State, Event> Debug for dyn Flow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Flow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `Flow`. This allows lazy initialization and resource loading.
pub type FlowConstructor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn Flow<S, E>>>>>>;

/// How [`run`] drives the frame loop.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Total simulated (or, in real-time mode, wall clock) time.
    pub duration: Duration,
    /// Delta of a single frame. In real-time mode the loop sleeps this long
    /// and passes the measured delta instead.
    pub frame_time: Duration,
    pub real_time: bool,
    pub seed: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            frame_time: Duration::from_micros(16_667),
            real_time: false,
            seed: 0,
        }
    }
}

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    ctx: Context,
    state: State,
    flows: Vec<Box<dyn Flow<State, Event>>>,
    events: VecDeque<Event>,
    time_since_tick: Duration,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: 'static,
{
    /// Resolves all constructors and calls `on_init` on the resulting flows in order.
    pub fn new(
        constructors: Vec<FlowConstructor<State, Event>>,
        ctx: Context,
        state: State,
    ) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let init_ctx = InitContext::from(&ctx);
        let flow_futures: Vec<_> = constructors
            .into_iter()
            .map(|constructor| constructor(init_ctx))
            .collect();
        let init_future = futures::future::join_all(flow_futures);
        #[cfg(not(target_arch = "wasm32"))]
        let flows = async_runtime.block_on(init_future);
        #[cfg(target_arch = "wasm32")]
        let flows = futures::executor::block_on(init_future);

        let mut app = Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            ctx,
            state,
            flows,
            events: VecDeque::new(),
            time_since_tick: Duration::ZERO,
        };
        for flow in app.flows.iter_mut() {
            let out = flow.on_init(&mut app.ctx, &mut app.state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &app.async_runtime,
                &mut app.state,
                &mut app.ctx,
                &mut app.events,
                out,
            );
        }
        log::info!("Initialized {} flow(s).", app.flows.len());
        Ok(app)
    }

    /// Advances every flow by one frame of length `dt`.
    pub fn step(&mut self, dt: Duration) {
        self.ctx.frame += 1;
        self.ctx.elapsed += dt;
        self.time_since_tick += dt;

        while let Some(event) = self.events.pop_front() {
            let ctx = &self.ctx;
            let state = &mut self.state;
            let result = self
                .flows
                .iter_mut()
                .fold(Some(event), |event, flow| {
                    flow.on_custom_events(ctx, state, event?)
                });
            if result.is_some() {
                log::warn!("Warning! Custom event was not consumed this cycle");
            }
        }

        for flow in self.flows.iter_mut() {
            let out = flow.on_update(&self.ctx, &mut self.state, dt);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut self.state,
                &mut self.ctx,
                &mut self.events,
                out,
            );
        }

        if self.time_since_tick >= Duration::from_millis(self.ctx.tick_duration_millis) {
            for flow in self.flows.iter_mut() {
                let out = flow.on_tick(&self.ctx, &mut self.state);
                handle_flow_output(
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                    &mut self.state,
                    &mut self.ctx,
                    &mut self.events,
                    out,
                );
            }
            self.time_since_tick = Duration::ZERO;
        }
    }

    /// Queues `event`; flows see it at the start of the next frame.
    pub fn send_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }
}

fn handle_flow_output<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    state: &mut State,
    ctx: &mut Context,
    events: &mut VecDeque<Event>,
    out: Out<State, Event>,
) {
    match out {
        // Queue the events passed by the user for the next frame
        Out::FutEvent(futures) => {
            let fut =
                async move { futures::future::join_all(futures.into_iter().map(Pin::from)).await };
            #[cfg(not(target_arch = "wasm32"))]
            let resolved = async_runtime.block_on(fut);
            #[cfg(target_arch = "wasm32")]
            let resolved = futures::executor::block_on(fut);
            events.extend(resolved);
        }
        Out::FutFn(futures) => {
            let mutations: Vec<Pin<Box<dyn Future<Output = Box<dyn FnOnce(&mut State)>>>>> =
                futures.into_iter().map(Pin::from).collect();
            let fut = async move { futures::future::join_all(mutations.into_iter()).await };
            #[cfg(not(target_arch = "wasm32"))]
            let resolved: Vec<Box<dyn FnOnce(&mut State)>> = async_runtime.block_on(fut);
            #[cfg(target_arch = "wasm32")]
            let resolved: Vec<Box<dyn FnOnce(&mut State)>> = futures::executor::block_on(fut);
            resolved.into_iter().for_each(|mutation| {
                mutation(state);
            });
        }
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

/// Initializes logging, builds the app and steps it for `settings.duration`.
///
/// Returns the final user state.
pub fn run<State: 'static + Default, Event: 'static>(
    constructors: Vec<FlowConstructor<State, Event>>,
    settings: RunSettings,
) -> anyhow::Result<State> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    anyhow::ensure!(
        !settings.frame_time.is_zero(),
        "frame_time must be greater than zero"
    );

    let mut app: App<State, Event> =
        App::new(constructors, Context::new(settings.seed), State::default())?;

    #[cfg(not(target_arch = "wasm32"))]
    if settings.real_time {
        let start = instant::Instant::now();
        let mut last_time = start;
        while start.elapsed() < settings.duration {
            std::thread::sleep(settings.frame_time);
            let dt = last_time.elapsed();
            last_time = instant::Instant::now();
            app.step(dt);
        }
        return Ok(app.into_state());
    }
    #[cfg(target_arch = "wasm32")]
    if settings.real_time {
        log::warn!("Real-time stepping is not available on wasm, simulating instead.");
    }

    let frames = (settings.duration.as_secs_f64() / settings.frame_time.as_secs_f64()).ceil() as u64;
    for _ in 0..frames {
        app.step(settings.frame_time);
    }
    log::info!(
        "Simulated {} frames ({:?}).",
        app.context().frame(),
        app.context().elapsed()
    );
    Ok(app.into_state())
}
