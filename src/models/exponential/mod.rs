//! Exponential smoothing models.
//!
//! Only the additive Holt-Winters variant is provided: daily demand is
//! modelled with a linear trend and an additive weekly cycle.

mod holt_winters;

pub use holt_winters::{
    fit_params, fit_state, project, FittedState, HoltWinters, HoltWintersState, SmoothingParams,
    WEEKLY_PERIOD,
};
