//! Algorithm implementations for paired-specimen datasets
//!
//! This module contains report preparation and the pairing engine that
//! narrows each subject's specimen reports down to one complementary,
//! closely dated pair.

pub mod pairing;
pub mod preparation;
