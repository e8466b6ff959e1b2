//! Stack growth for the recursive parser and matcher.
//!
//! Both recurse once per nested object pattern. The parser caps nesting, but
//! a deep pattern still costs several frames per level, so recursive entry
//! points run through [`ensure_sufficient_stack`].

/// If less than this remains, grow the stack.
const RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_down(n: u32) -> u32 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { 1 + count_down(n - 1) })
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        assert_eq!(count_down(100_000), 100_000);
    }
}
