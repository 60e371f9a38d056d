//! Pooled byte buffers and the bounded manifest-text encoder.
//!
//! Buffers are checked out of a [`BufferPool`] by exactly one task and go
//! back to the pool when the [`PooledBuffer`] guard drops. A buffer is never
//! shared between tasks; handing one to the next pipeline stage moves it.
//!
//! [`Encoder`] converts raw text (paths, names, defines) into manifest text
//! (XML-escaped, optionally with `\` separators) inside a pooled scratch
//! buffer with a hard limit. On overflow the limit grows once, per the
//! [`GrowthPolicy`], and the conversion is retried; a second overflow is
//! [`RenderError::EncodingOverflow`].

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use manifestor_core::GrowthPolicy;

use crate::error::RenderError;

/// Upper bound on idle buffers kept for reuse.
const MAX_POOLED: usize = 64;

// ---------------------------------------------------------------------------
// BufferPool
// ---------------------------------------------------------------------------

/// Checkout/return pool of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    policy: GrowthPolicy,
}

impl BufferPool {
    pub fn new(policy: GrowthPolicy) -> Self {
        BufferPool {
            free: Mutex::new(Vec::new()),
            policy,
        }
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Take an empty buffer out of the pool, allocating if none is idle.
    pub fn checkout(&self) -> PooledBuffer<'_> {
        let recycled = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let mut buf =
            recycled.unwrap_or_else(|| Vec::with_capacity(self.policy.initial_capacity));
        buf.clear();
        PooledBuffer { buf, pool: self }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn give_back(&self, mut buf: Vec<u8>) {
        buf.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < MAX_POOLED {
            free.push(buf);
        }
    }
}

/// A buffer checked out of a [`BufferPool`]; returned to it on drop.
#[derive(Debug)]
pub struct PooledBuffer<'pool> {
    buf: Vec<u8>,
    pool: &'pool BufferPool,
}

impl PooledBuffer<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// How path separators are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separators {
    /// Leave `/` and `\` as they are.
    Keep,
    /// Write every `/` as `\` (MSBuild item paths).
    Backslash,
}

/// Bounded manifest-text encoder over a pooled scratch buffer.
pub struct Encoder<'pool> {
    scratch: PooledBuffer<'pool>,
    limit: usize,
    policy: GrowthPolicy,
}

impl<'pool> Encoder<'pool> {
    pub fn new(pool: &'pool BufferPool) -> Self {
        let policy = pool.policy();
        let mut scratch = pool.checkout();
        scratch.reserve(policy.initial_capacity);
        Encoder {
            scratch,
            limit: policy.initial_capacity,
            policy,
        }
    }

    /// Current byte limit of the scratch buffer.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Encode `text`, growing the scratch limit at most once.
    pub fn encode(&mut self, text: &str, separators: Separators) -> Result<String, RenderError> {
        let needed = match self.try_encode(text, separators) {
            Ok(encoded) => return Ok(encoded),
            Err(needed) => needed,
        };

        let grown = self.policy.grown_capacity(needed);
        if grown > self.limit {
            tracing::debug!(
                "encoder buffer grows {} -> {} bytes for {} needed",
                self.limit,
                grown,
                needed
            );
            self.scratch.reserve(grown);
            self.limit = grown;
        }

        self.try_encode(text, separators)
            .map_err(|needed| RenderError::EncodingOverflow {
                needed,
                capacity: self.limit,
            })
    }

    /// One conversion attempt. `Err` carries the full encoded length.
    fn try_encode(&mut self, text: &str, separators: Separators) -> Result<String, usize> {
        self.scratch.clear();
        let mut utf8 = [0u8; 4];
        for ch in text.chars() {
            let piece = escape(ch, separators, &mut utf8);
            if self.scratch.len() + piece.len() > self.limit {
                self.scratch.clear();
                return Err(encoded_len(text, separators));
            }
            self.scratch.extend_from_slice(piece);
        }
        Ok(String::from_utf8_lossy(&self.scratch).into_owned())
    }
}

/// Length in bytes of `text` once encoded.
pub fn encoded_len(text: &str, separators: Separators) -> usize {
    let mut utf8 = [0u8; 4];
    text.chars()
        .map(|ch| escape(ch, separators, &mut utf8).len())
        .sum()
}

fn escape(ch: char, separators: Separators, utf8: &mut [u8; 4]) -> &[u8] {
    match ch {
        '&' => b"&amp;",
        '<' => b"&lt;",
        '>' => b"&gt;",
        '"' => b"&quot;",
        '\'' => b"&apos;",
        '/' if separators == Separators::Backslash => b"\\",
        _ => ch.encode_utf8(utf8).as_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(initial: usize, max: usize) -> BufferPool {
        BufferPool::new(GrowthPolicy {
            initial_capacity: initial,
            max_capacity: max,
        })
    }

    #[test]
    fn escapes_xml_and_separators() {
        let pool = pool(64, 64);
        let mut enc = Encoder::new(&pool);
        let out = enc
            .encode("Assets/A&B/<T>.cs", Separators::Backslash)
            .unwrap();
        assert_eq!(out, "Assets\\A&amp;B\\&lt;T&gt;.cs");

        let kept = enc.encode("/opt/lib's", Separators::Keep).unwrap();
        assert_eq!(kept, "/opt/lib&apos;s");
    }

    #[test]
    fn encoded_len_counts_escapes_and_multibyte() {
        assert_eq!(encoded_len("a&b", Separators::Keep), 7);
        assert_eq!(encoded_len("é", Separators::Keep), 2);
    }

    #[test]
    fn overflow_grows_once_then_succeeds() {
        let pool = pool(8, 64);
        let mut enc = Encoder::new(&pool);
        let text = "0123456789abcdef0123";
        let out = enc.encode(text, Separators::Keep).unwrap();
        assert_eq!(out, text);
        assert_eq!(enc.limit(), 32);
    }

    #[test]
    fn overflow_after_growth_is_an_error() {
        let pool = pool(8, 16);
        let mut enc = Encoder::new(&pool);
        let err = enc.encode(&"x".repeat(40), Separators::Keep).unwrap_err();
        match err {
            RenderError::EncodingOverflow { needed, capacity } => {
                assert_eq!(needed, 40);
                assert_eq!(capacity, 16);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
        // The encoder stays usable for text that fits.
        assert_eq!(enc.encode("short", Separators::Keep).unwrap(), "short");
    }

    #[test]
    fn buffers_return_to_pool_on_drop() {
        let pool = pool(16, 16);
        assert_eq!(pool.idle(), 0);
        {
            let mut a = pool.checkout();
            a.extend_from_slice(b"abc");
            let _b = pool.checkout();
        }
        assert_eq!(pool.idle(), 2);
        let reused = pool.checkout();
        assert!(reused.is_empty(), "recycled buffers are reset");
        assert_eq!(pool.idle(), 1);
    }
}
