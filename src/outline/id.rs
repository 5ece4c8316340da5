//! Node id generation
//!
//! Two strategies:
//! - `ContentHash`: `nid-{hexHash}-{base36Timestamp}` where the hash covers the
//!   title, the timestamp and a process-wide sequence number
//! - `Random`: `nid-{timestamp}-{random4digits}`
//!
//! Both only produce `[a-z0-9-]`, so ids are always safe as an IRI path segment.
//! The store still checks candidates against existing ids before use.

use super::types::NodeId;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    ContentHash,
    Random,
}

#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    strategy: IdStrategy,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Produce a candidate id for a node with the given title
    pub fn generate(&self, title: &str) -> NodeId {
        match self.strategy {
            IdStrategy::ContentHash => content_hash_id(title),
            IdStrategy::Random => random_id(),
        }
    }
}

fn content_hash_id(title: &str) -> NodeId {
    let millis = Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(millis.to_le_bytes());
    hasher.update(seq.to_le_bytes());
    let digest = hasher.finalize();

    let hex: String = digest[..6].iter().map(|b| format!("{:02x}", b)).collect();
    NodeId::new(format!("nid-{}-{}", hex, to_base36(millis.max(0) as u64)))
}

fn random_id() -> NodeId {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    NodeId::new(format!("nid-{}-{}", millis, suffix))
}

pub(crate) fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
