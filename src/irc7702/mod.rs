//! Federal tax definitions of life insurance: guideline premiums (7702) and
//! modified-endowment testing (7702A)

mod gpt;
mod mec;

pub use gpt::{gpt_corridor_factor, GptHistory, Irc7702, Irc7702Params};
pub use mec::{Irc7702A, MecStatus, SEVEN_PAY_YEARS};

/// Statutory interest floor for guideline level premiums
pub const GLP_INTEREST_FLOOR: f64 = 0.04;

/// Statutory interest floor for guideline single premiums
pub const GSP_INTEREST_FLOOR: f64 = 0.06;
