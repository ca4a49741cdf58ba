// src/rollcall/mod.rs

pub mod answer;
pub mod bruteforce;
pub mod endpoint;
pub mod list;

pub use answer::{RollcallAnswerer, classify_radar, report_outcome};
pub use bruteforce::{BruteForcer, CancellationSignal};
pub use endpoint::{AnswerEndpoint, HttpAnswerEndpoint, is_accepted};
