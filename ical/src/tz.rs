// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Timezone engines derived from `VTIMEZONE` components.
//!
//! An engine converts between the wall-clock times of one zone and
//! instants. It is either a fixed offset or a two-transition yearly rule.
//! Wall-clock times skipped by a forward transition are rejected, and times
//! repeated by a backward transition always resolve to the standard offset.

mod derive;
mod engine;
mod rule;

pub use derive::{Rejection, derive};
pub use engine::{EngineKind, InvalidLocalTime, TimezoneEngine};
pub use rule::{AnnualRule, TransitionRule};
