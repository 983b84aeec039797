use instant::Duration;

/// Engine-wide state shared with every flow.
///
/// Flows may change the knobs (`tick_duration_millis`, `seed`) during
/// `on_init` or at runtime through [`crate::flow::Out::Configure`]. The
/// counters are maintained by the [`crate::flow::App`].
#[derive(Debug, Clone)]
pub struct Context {
    /// Interval between two `on_tick` invocations.
    pub tick_duration_millis: u64,
    /// Seed handed to flow constructors so runs can be reproduced.
    pub seed: u64,
    pub(crate) frame: u64,
    pub(crate) elapsed: Duration,
}

impl Context {
    pub fn new(seed: u64) -> Self {
        Self {
            tick_duration_millis: 1000,
            seed,
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated time since the app started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(0)
    }
}

/// The part of the [`Context`] that flow constructors get to see.
#[derive(Debug, Clone, Copy)]
pub struct InitContext {
    pub seed: u64,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self { seed: ctx.seed }
    }
}
