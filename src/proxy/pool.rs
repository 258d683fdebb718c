//! Candidate pool: dedupe and ordering of sourced candidates

use crate::proxy::models::Candidate;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Build the working pool from all sourced candidates.
///
/// Deduplicates by exact (host, port) equality while preserving the order
/// candidates first appeared, so the bulk strategy's stable filter follows
/// feed-append order. When `shuffle` is set the pool is reordered with a
/// uniform Fisher-Yates shuffle instead, which matters because validation
/// may stop early and would otherwise always favor the first feed.
pub fn build_pool(candidates: Vec<Candidate>, shuffle: bool) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut pool: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert((c.host.clone(), c.port)))
        .collect();

    if shuffle {
        pool.shuffle(&mut rand::thread_rng());
    }

    pool
}
