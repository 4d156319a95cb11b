/// A fixed repeating merge ratio: `a` items from the first source, then
/// `b` items from the second, repeating until both are drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleaveRatio {
    a: u32,
    b: u32,
}

impl InterleaveRatio {
    /// Build a ratio. Zero components are clamped to 1 so the merge
    /// always consumes from both sources.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            a: a.max(1),
            b: b.max(1),
        }
    }
}

impl Default for InterleaveRatio {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

/// Merge two ordered sequences into one by the repeating ratio.
///
/// Take up to `a` remaining items from `source_a`, then up to `b` from
/// `source_b`, repeating until both are exhausted. Never reorders
/// within a source and never drops items: the result length is always
/// `source_a.len() + source_b.len()`. An empty source degrades the
/// merge to a pass-through of the other.
pub fn interleave<T>(source_a: Vec<T>, source_b: Vec<T>, ratio: InterleaveRatio) -> Vec<T> {
    let mut out = Vec::with_capacity(source_a.len() + source_b.len());
    let mut a = source_a.into_iter();
    let mut b = source_b.into_iter();

    loop {
        let before = out.len();
        out.extend(a.by_ref().take(ratio.a as usize));
        out.extend(b.by_ref().take(ratio.b as usize));
        if out.len() == before {
            break;
        }
    }

    out
}
