use crate::{context::ObjectContext, ledger::Ledger};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK: RefCell<Option<Rc<dyn EventSink>>> = const { RefCell::new(None) };
}

///
/// LifecycleEvent
///
/// Fire-and-forget notifications emitted by the box controller. No return
/// value is consulted; a sink that panics is a sink bug.
///

#[derive(Clone, Debug)]
pub enum LifecycleEvent {
    BeforeRender {
        box_id: String,
        ctx: ObjectContext,
    },
    AfterRender {
        box_id: String,
        ctx: ObjectContext,
    },
    FieldsSaved {
        box_id: String,
        ctx: ObjectContext,
        ledger: Ledger,
    },
}

impl LifecycleEvent {
    #[must_use]
    pub fn box_id(&self) -> &str {
        match self {
            Self::BeforeRender { box_id, .. }
            | Self::AfterRender { box_id, .. }
            | Self::FieldsSaved { box_id, .. } => box_id,
        }
    }
}

///
/// EventSink
///

pub trait EventSink {
    fn emit(&self, event: &LifecycleEvent);
}

/// Subscribe a sink for this thread; replaces any previous sink.
pub fn set_sink(sink: Rc<dyn EventSink>) {
    SINK.with_borrow_mut(|slot| *slot = Some(sink));
}

/// Drop the thread's sink; later events go nowhere.
pub fn clear_sink() {
    SINK.with_borrow_mut(|slot| *slot = None);
}

/// Emit one event to the subscribed sink, if any.
pub fn emit(event: &LifecycleEvent) {
    SINK.with_borrow(|slot| {
        if let Some(sink) = slot {
            sink.emit(event);
        }
    });
}

///
/// TESTS
///
