//! Domain layer: entities, repository contracts and pure business rules.
//!
//! Nothing here depends on HTTP or SQL. Infrastructure implements the
//! traits declared in [`repositories`], [`geo`] and [`click_worker`].
//!
//! # Click Processing Flow
//!
//! 1. The redirect resolver grants access and builds a [`click_event::ClickEvent`]
//! 2. The handler offers it to the bounded click queue with `try_send`
//! 3. [`click_worker::run_click_worker`] records it with retries and fires webhooks
//! 4. Failures end up on the `dead_letter` log target

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod geo;
pub mod repositories;
pub mod rotation;
pub mod targeting;
pub mod user_agent;
