//! Per-unit-of-work operation context.
//!
//! One [`OperationContext`] is created per request or transaction and passed
//! to every node service call. It carries:
//!
//! - **Identity** - the current user, switchable with [`OperationContext::run_as`]
//! - **Transaction id** - stamped on cascade bookkeeping
//! - **Restriction scopes** - nested guards that lift the content-property
//!   restriction for the duration of a block
//! - **Trust** - an optional [`TrustedOperation`] token carried by internal
//!   callers that may write content properties directly
//!
//! # Scope guards
//!
//! [`OperationContext::disable_content_restriction`] returns a guard; the
//! restriction is lifted while any guard is alive. Guards borrow the context,
//! so they are released in reverse order of acquisition.
//!
//! ```
//! use cms_repo::OperationContext;
//!
//! let ctx = OperationContext::new("admin");
//! assert!(!ctx.is_content_restriction_disabled());
//! {
//!     let _outer = ctx.disable_content_restriction();
//!     let _inner = ctx.disable_content_restriction();
//!     assert_eq!(ctx.restriction_disable_depth(), 2);
//! }
//! assert!(!ctx.is_content_restriction_disabled());
//! ```

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::content_model::SYSTEM_USER;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Capability token for callers allowed to write content properties directly.
///
/// Created explicitly by the trusted code path and attached to its context;
/// the reason is logged when the token lets a write through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedOperation {
    reason: String,
}

impl TrustedOperation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// State of one unit of work.
#[derive(Debug)]
pub struct OperationContext {
    user: RefCell<String>,
    transaction_id: u64,
    restriction_disabled: Cell<u32>,
    trusted: Option<TrustedOperation>,
}

impl OperationContext {
    /// New context for `user` with a fresh transaction id.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: RefCell::new(user.into()),
            transaction_id: NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed),
            restriction_disabled: Cell::new(0),
            trusted: None,
        }
    }

    /// New context running as the system user.
    pub fn system() -> Self {
        Self::new(SYSTEM_USER)
    }

    #[must_use]
    pub fn with_transaction_id(mut self, transaction_id: u64) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    #[must_use]
    pub fn with_trusted(mut self, token: TrustedOperation) -> Self {
        self.trusted = Some(token);
        self
    }

    pub fn current_user(&self) -> String {
        self.user.borrow().clone()
    }

    pub fn transaction_id(&self) -> u64 {
        self.transaction_id
    }

    pub fn trusted(&self) -> Option<&TrustedOperation> {
        self.trusted.as_ref()
    }

    pub fn is_trusted(&self) -> bool {
        self.trusted.is_some()
    }

    /// Lift the content-property restriction until the guard is dropped.
    pub fn disable_content_restriction(&self) -> RestrictionGuard<'_> {
        self.restriction_disabled
            .set(self.restriction_disabled.get() + 1);
        RestrictionGuard { ctx: self }
    }

    pub fn restriction_disable_depth(&self) -> u32 {
        self.restriction_disabled.get()
    }

    pub fn is_content_restriction_disabled(&self) -> bool {
        self.restriction_disabled.get() > 0
    }

    /// Run `f` as `user`, restoring the current user afterwards.
    pub fn run_as<T>(&self, user: &str, f: impl FnOnce(&Self) -> T) -> T {
        let previous = self.user.replace(user.to_string());
        let _restore = RunAsGuard {
            ctx: self,
            previous: Some(previous),
        };
        tracing::debug!(user, "Running as");
        f(self)
    }

    /// Run `f` as the system user.
    pub fn run_as_system<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        self.run_as(SYSTEM_USER, f)
    }
}

/// Keeps the content-property restriction lifted while alive.
#[derive(Debug)]
#[must_use = "the restriction is re-enabled as soon as the guard is dropped"]
pub struct RestrictionGuard<'a> {
    ctx: &'a OperationContext,
}

impl Drop for RestrictionGuard<'_> {
    fn drop(&mut self) {
        let depth = self.ctx.restriction_disabled.get();
        self.ctx.restriction_disabled.set(depth.saturating_sub(1));
    }
}

struct RunAsGuard<'a> {
    ctx: &'a OperationContext,
    previous: Option<String>,
}

impl Drop for RunAsGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.ctx.user.replace(previous);
        }
    }
}
