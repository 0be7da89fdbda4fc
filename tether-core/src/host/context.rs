//! Render Context
//!
//! The render context tracks which components are currently rendering on
//! this thread. A component rendered from inside another component's render
//! closure pushes a second entry, so the stack mirrors the component nesting.
//!
//! # Implementation
//!
//! A thread-local stack of component ids. Entering a render pushes the id;
//! the returned guard pops it on drop, so the stack stays balanced even if
//! the render closure panics.

use std::cell::RefCell;

use super::component::ComponentId;

thread_local! {
    static RENDER_STACK: RefCell<Vec<ComponentId>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the render context when dropped.
pub struct RenderContext {
    component: ComponentId,
}

impl RenderContext {
    /// Mark `component` as rendering until the guard is dropped.
    pub fn enter(component: ComponentId) -> Self {
        RENDER_STACK.with(|stack| stack.borrow_mut().push(component));
        Self { component }
    }

    /// Whether any component is rendering.
    pub fn is_active() -> bool {
        RENDER_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The innermost component being rendered, if any.
    pub fn current() -> Option<ComponentId> {
        RENDER_STACK.with(|stack| stack.borrow().last().copied())
    }

    /// Number of nested renders in progress.
    pub fn depth() -> usize {
        RENDER_STACK.with(|stack| stack.borrow().len())
    }

    /// Whether `component` is anywhere on the stack.
    pub fn is_rendering(component: ComponentId) -> bool {
        RENDER_STACK.with(|stack| stack.borrow().contains(&component))
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        RENDER_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(
                popped,
                Some(self.component),
                "RenderContext mismatch: expected {:?}, got {:?}",
                self.component,
                popped
            );
        });
    }
}
