//! Single-threaded publish/subscribe with owned subscription handles.
//! 單執行緒的發佈/訂閱機制，訂閱以持有的控制代碼表示。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Identifies one registered listener within an emitter.
/// 發佈器內單一監聽者的識別碼。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

struct Registered<E> {
    id: SubscriptionId,
    callback: Callback<E>,
}

struct EmitterInner<E> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<Registered<E>>>,
}

/// Event fan-out point shared by cloning.
/// 以複製方式共享的事件發佈點。
///
/// Emission dispatches on a snapshot of the listener list, so a listener may
/// subscribe or cancel re-entrantly while an emit is in flight. A listener
/// cancelled during dispatch still receives the in-flight event.
pub struct Emitter<E> {
    inner: Rc<EmitterInner<E>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EmitterInner {
                next_id: Cell::new(1),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Registers a listener and returns the handle that owns it.
    /// 註冊監聽者並回傳持有該訂閱的控制代碼。
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription<E> {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(Registered {
            id,
            callback: Rc::new(callback),
        });
        Subscription {
            id,
            emitter: Rc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every listener registered at the time of the call.
    /// 將事件傳遞給呼叫當下已註冊的所有監聽者。
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|registered| Rc::clone(&registered.callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Owned handle for one registered listener.
/// 代表單一監聽註冊的持有式控制代碼。
///
/// The listener stays attached exactly as long as the handle lives: dropping
/// it detaches exactly the listener it installed. The subscription set is
/// never re-derived, so repeated subscribe/cancel cycles cannot leave a
/// stale listener behind.
#[must_use = "dropping the handle detaches the listener"]
pub struct Subscription<E> {
    id: SubscriptionId,
    emitter: Weak<EmitterInner<E>>,
}

impl<E> Subscription<E> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Detaches the listener this handle owns; equivalent to dropping the
    /// handle, but explicit at the call site. A no-op when the emitter is
    /// already gone.
    /// 解除此控制代碼持有的監聽，等同於釋放控制代碼；若發佈器已不存在則不做任何事。
    pub fn cancel(self) {
        drop(self);
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(inner) = self.emitter.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|registered| registered.id != self.id);
        }
    }
}
