//! Phase 1: Configuration
//!
//! Resolves the plugin configuration of every reactor project up front, so
//! that a missing `strategy` node or an unknown hint anywhere in the reactor
//! aborts the run before a single version has been computed.

use log::debug;

use super::InferenceContext;
use crate::error::Result;
use crate::reactor::Reactor;

/// Execute Phase 1: resolve and cache every project's configuration.
///
/// Returns the number of opted-in projects.
pub fn execute(reactor: &Reactor, ctx: &mut InferenceContext) -> Result<usize> {
    let mut configured = 0;
    for index in 0..reactor.len() {
        let config = ctx
            .configs
            .get_for_project(reactor, index, &ctx.strategies)?;
        match config {
            Some(config) => {
                debug!(
                    "{} uses the '{}' version strategy",
                    reactor.node(index).coordinates(),
                    config.strategy.name()
                );
                configured += 1;
            }
            None => debug!(
                "{} is not configured for version inference",
                reactor.node(index).coordinates()
            ),
        }
    }
    Ok(configured)
}
