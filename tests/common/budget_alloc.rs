use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Heap usage observed while a closure ran.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocStats {
    /// Bytes live at the high-water mark, above the starting baseline.
    pub peak_bytes: usize,
    /// Allocation calls, reallocations included.
    pub allocations: usize,
}

/// Counting allocator for allocation-budget tests.
///
/// Tests in one binary share the allocator, so budget files keep a single
/// `#[test]` each.
pub struct BudgetAlloc {
    live: AtomicUsize,
    high_water: AtomicUsize,
    calls: AtomicUsize,
}

impl BudgetAlloc {
    pub const fn new() -> Self {
        Self {
            live: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Run `f` and report the heap it needed beyond what was already live.
    pub fn measure<R>(&self, f: impl FnOnce() -> R) -> (R, AllocStats) {
        let baseline = self.live.load(Ordering::Relaxed);
        self.high_water.store(baseline, Ordering::Relaxed);
        let calls_before = self.calls.load(Ordering::Relaxed);
        let out = f();
        let stats = AllocStats {
            peak_bytes: self
                .high_water
                .load(Ordering::Relaxed)
                .saturating_sub(baseline),
            allocations: self
                .calls
                .load(Ordering::Relaxed)
                .saturating_sub(calls_before),
        };
        (out, stats)
    }

    fn grow(&self, bytes: usize) {
        let live = self.live.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.high_water.fetch_max(live, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn shrink(&self, bytes: usize) {
        // Frees of memory allocated before a `measure` baseline may undershoot.
        let _ = self
            .live
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |live| {
                Some(live.saturating_sub(bytes))
            });
    }
}

unsafe impl GlobalAlloc for BudgetAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        self.shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                self.grow(new_size - layout.size());
            } else {
                self.shrink(layout.size() - new_size);
            }
        }
        new_ptr
    }
}
