use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Single-shot timers owned by the core. The shell arms one timer per
/// `Start` and resolves it with `Fired` when the delay elapses, or with
/// `Cancelled` if a `Cancel` for the same id arrives first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    Start { id: u64, millis: u64 },
    Cancel { id: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Fired { id: u64 },
    Cancelled { id: u64 },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + Copy + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: Send + 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    /// Arms a single-shot timer. The event is delivered only if the shell
    /// reports the timer as fired; a cancelled timer delivers nothing.
    pub fn start(&self, id: u64, millis: u64, event: Ev) {
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;

            if let TimerOutput::Fired { .. } = output {
                context.update_app(event);
            }
        });
    }

    /// Cancels a previously armed timer. Harmless for timers that already
    /// fired.
    pub fn cancel(&self, id: u64) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}
