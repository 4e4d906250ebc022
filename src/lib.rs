//! Mandi Bridge — AI-assisted mandi price discovery and voice negotiation.
//!
//! Two independent pipelines share the same AI text-generation collaborator:
//!
//! ```text
//! Market query:  query ──▶ prompt ──▶ TextGenerator ──▶ parser ──▶ results
//!                                                          │
//!                                                          └──▶ 7-day series
//!
//! Negotiation:   capture ──▶ final utterance ──▶ prompt ──▶ TextGenerator
//!                    ▲                                          │
//!                    └───────────── synthesis ◀── reply ◀───────┘
//! ```
//!
//! The [`market`] module covers search, response parsing, the synthetic
//! price-series deriver and the favorites watchlist.  The [`negotiation`]
//! module holds the turn-taking session state machine and its async engine.
//! Speech capture and playback are trait seams in [`speech`]; the Gemini
//! client lives in [`ai`].

pub mod ai;
pub mod config;
pub mod market;
pub mod negotiation;
pub mod speech;
